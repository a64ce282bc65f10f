use crate::db::filter::FilterSet;
use crate::db::models::{SchoolRef, SchoolSummary, StudentDetail};
use crate::db::schema::SQLITE_INIT;
use crate::error::AspenError;
use crate::types::PageRequest;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Pool, QueryBuilder, Sqlite};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Select list shared by every school listing: the row plus its derived count.
pub const SCHOOL_SELECT: &str = "SELECT s.id, s.name, COALESCE(c.student_count, 0) AS student_count \
     FROM schools s LEFT JOIN school_student_counts c ON s.id = c.school_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Serving: the file must exist, connections never write.
    ReadOnly,
    /// Import/verify against an existing file.
    ReadWrite,
    /// `init`: create the file if it is missing.
    Create,
}

#[derive(Clone)]
pub struct DirectoryStorage {
    pool: SqlitePool,
}

impl DirectoryStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a pool on `database_url`. [`OpenMode::Create`] also creates the
    /// file's parent directories. Outside it a missing or unreadable file is
    /// reported as [`AspenError::StorageUnavailable`].
    pub async fn connect(
        database_url: &str,
        mode: OpenMode,
        max_connections: u32,
    ) -> Result<Self, AspenError> {
        let opts = SqliteConnectOptions::from_str(database_url)?;
        if mode == OpenMode::Create {
            if let Some(parent) = sqlite_file(database_url).as_deref().and_then(|p| p.parent()) {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }
        let opts = match mode {
            OpenMode::ReadOnly => opts.read_only(true),
            OpenMode::ReadWrite => opts,
            OpenMode::Create => opts.create_if_missing(true),
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(opts)
            .await
            .map_err(|e| match mode {
                OpenMode::Create => AspenError::DatabaseError(e),
                _ => AspenError::StorageUnavailable(format!("{database_url}: {e}")),
            })?;
        Ok(Self::new(pool))
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), AspenError> {
        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// `SELECT COUNT(*) {from} WHERE ...` with the same predicates as the page query.
    pub async fn count(&self, from: &str, filters: &FilterSet) -> Result<i64, AspenError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) ");
        qb.push(from);
        filters.push_where(&mut qb);
        debug!(sql = qb.sql(), "count query");
        let total: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(total)
    }

    /// `{select} WHERE ... ORDER BY {order_by} LIMIT limit+1 OFFSET offset`.
    pub async fn fetch_page<T>(
        &self,
        select: &str,
        filters: &FilterSet,
        order_by: &str,
        page: PageRequest,
    ) -> Result<Vec<T>, AspenError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut qb = QueryBuilder::<Sqlite>::new(select);
        filters.push_where(&mut qb);
        qb.push(" ORDER BY ");
        qb.push(order_by);
        qb.push(" LIMIT ");
        qb.push_bind(page.fetch_limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.sql_offset());
        debug!(sql = qb.sql(), "page query");
        let rows = qb.build_query_as::<T>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Schools whose id is in `ids`, one placeholder per id, ordered by name.
    pub async fn schools_by_ids(&self, ids: &[i64]) -> Result<Vec<SchoolSummary>, AspenError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(SCHOOL_SELECT);
        qb.push(" WHERE s.id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY s.name");
        let rows = qb
            .build_query_as::<SchoolSummary>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn school_ref(&self, id: i64) -> Result<Option<SchoolRef>, AspenError> {
        let row = sqlx::query_as::<_, SchoolRef>("SELECT id, name FROM schools WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn student_by_external_id(
        &self,
        student_id: &str,
    ) -> Result<Option<StudentDetail>, AspenError> {
        let row = sqlx::query_as::<_, StudentDetail>(
            r#"SELECT s.student_id, s.first_name, s.last_name, s.grade, s.gender,
               s.ethnicity, s.address, s.zip_code, sc.name AS school
               FROM students s
               JOIN schools sc ON s.school_id = sc.id
               WHERE s.student_id = ?"#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn distinct_grades(&self, school_id: i64) -> Result<Vec<i64>, AspenError> {
        let grades = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT grade FROM students WHERE school_id = ? ORDER BY grade",
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(grades)
    }

    pub async fn distinct_genders(&self, school_id: i64) -> Result<Vec<String>, AspenError> {
        let genders = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT gender FROM students WHERE school_id = ? ORDER BY gender",
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genders)
    }

    pub async fn distinct_ethnicities(&self, school_id: i64) -> Result<Vec<String>, AspenError> {
        let ethnicities = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT ethnicity FROM students WHERE school_id = ? ORDER BY ethnicity",
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ethnicities)
    }

    /// `(students, schools)` row counts.
    pub async fn table_counts(&self) -> Result<(i64, i64), AspenError> {
        let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await?;
        let schools: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schools")
            .fetch_one(&self.pool)
            .await?;
        Ok((students, schools))
    }
}

/// Filesystem path behind a `sqlite:` URL, if it names a file.
pub fn sqlite_file(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty() && path != ":memory:").then(|| PathBuf::from(path))
}
