//! Bulk import and post-import verification.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite};
use tracing::info;

use crate::db::models::ImportRecord;
use crate::db::sqlite::DirectoryStorage;
use crate::error::AspenError;

/// Students per multi-row INSERT; 9 bound columns each keeps a batch well
/// under SQLite's host-parameter limit.
pub const IMPORT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub schools: usize,
    pub students: usize,
    pub elapsed: Duration,
}

impl ImportSummary {
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.students as f64 / secs
        } else {
            self.students as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    pub school_count: i64,
    pub student_count: i64,
    /// Up to five `(name, students)` pairs, largest first.
    pub top_schools: Vec<(String, i64)>,
    pub indexes: Vec<String>,
    pub last_import_at: Option<NaiveDateTime>,
    /// `(description, elapsed, rows)` for each representative read query.
    pub query_timings: Vec<(String, Duration, usize)>,
}

/// Read patterns the API relies on, timed by `verify`. `?` is the lowest
/// school id.
const VERIFY_QUERIES: [(&str, &str); 4] = [
    ("List all schools", "SELECT * FROM schools"),
    (
        "Get 50 students from one school",
        "SELECT * FROM students WHERE school_id = ? LIMIT 50",
    ),
    (
        "Filter by grade",
        "SELECT * FROM students WHERE grade = 9 AND school_id = ?",
    ),
    (
        "Search by last name",
        "SELECT * FROM students WHERE last_name LIKE 'S%' LIMIT 50",
    ),
];

impl DirectoryStorage {
    /// Insert-or-ignore every distinct school name, then insert all students
    /// in batches inside a single transaction. Any failure (e.g. a duplicate
    /// `studentId`) rolls the whole import back.
    pub async fn import_records(
        &self,
        records: &[ImportRecord],
    ) -> Result<ImportSummary, AspenError> {
        let started = Instant::now();
        let names: BTreeSet<&str> = records.iter().map(|r| r.school.as_str()).collect();
        info!(
            students = records.len(),
            schools = names.len(),
            "starting import"
        );

        let mut tx = self.pool().begin().await?;

        for name in &names {
            sqlx::query("INSERT OR IGNORE INTO schools (name) VALUES (?)")
                .bind(*name)
                .execute(&mut *tx)
                .await?;
        }

        let school_ids: HashMap<String, i64> =
            sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM schools")
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .map(|(id, name)| (name, id))
                .collect();
        info!(schools = school_ids.len(), "schools in place");

        let total = records.len();
        let mut inserted = 0usize;
        for batch in records.chunks(IMPORT_BATCH_SIZE) {
            let mut qb = QueryBuilder::<Sqlite>::new(
                "INSERT INTO students (student_id, first_name, last_name, grade, gender, \
                 ethnicity, school_id, address, zip_code) ",
            );
            qb.push_values(batch, |mut b, r| {
                b.push_bind(r.student_id.clone())
                    .push_bind(r.first_name.clone())
                    .push_bind(r.last_name.clone())
                    .push_bind(r.grade)
                    .push_bind(r.gender.clone())
                    .push_bind(r.ethnicity.clone())
                    .push_bind(school_ids.get(&r.school).copied())
                    .push_bind(r.address.clone())
                    .push_bind(r.zip_code.clone());
            });
            qb.build().execute(&mut *tx).await?;

            inserted += batch.len();
            let pct = inserted as f64 * 100.0 / total as f64;
            info!(progress = inserted, total, pct, "imported batch");
        }

        tx.commit().await?;

        Ok(ImportSummary {
            schools: names.len(),
            students: inserted,
            elapsed: started.elapsed(),
        })
    }

    pub async fn verify(&self) -> Result<VerifyReport, AspenError> {
        let (student_count, school_count) = self.table_counts().await?;

        let top_schools = sqlx::query_as::<_, (String, i64)>(
            r#"SELECT s.name, COUNT(st.id) AS count
               FROM schools s
               LEFT JOIN students st ON s.id = st.school_id
               GROUP BY s.id
               ORDER BY count DESC, s.name
               LIMIT 5"#,
        )
        .fetch_all(self.pool())
        .await?;

        let indexes = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;

        let last_import_at = sqlx::query_scalar::<_, Option<NaiveDateTime>>(
            "SELECT MAX(created_at) FROM students",
        )
        .fetch_one(self.pool())
        .await?;

        let query_timings = self.time_queries().await?;

        Ok(VerifyReport {
            school_count,
            student_count,
            top_schools,
            indexes,
            last_import_at,
            query_timings,
        })
    }

    async fn time_queries(&self) -> Result<Vec<(String, Duration, usize)>, AspenError> {
        let school_id = sqlx::query_scalar::<_, Option<i64>>("SELECT MIN(id) FROM schools")
            .fetch_one(self.pool())
            .await?
            .unwrap_or(0);

        let mut timings = Vec::with_capacity(VERIFY_QUERIES.len());
        for (description, sql) in VERIFY_QUERIES {
            let mut query = sqlx::query::<Sqlite>(sql);
            if sql.contains('?') {
                query = query.bind(school_id);
            }
            let started = Instant::now();
            let rows = query.fetch_all(self.pool()).await?;
            timings.push((description.to_string(), started.elapsed(), rows.len()));
        }
        Ok(timings)
    }
}
