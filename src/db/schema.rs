//! SQL DDL for the student directory.
//! SQLite-first design; statements are idempotent so `init` can be re-run.

/// SQLite schema with:
/// - `schools.name` UNIQUE, the import key for insert-or-ignore
/// - `students.student_id` UNIQUE external identifier
/// - `students.school_id` FK with cascading delete
/// - lookup indexes for every filterable/sortable student column
/// - `school_student_counts` view, the derived per-school student count
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS schools (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    address TEXT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    grade INTEGER NOT NULL,
    gender TEXT NOT NULL,
    ethnicity TEXT NOT NULL,
    school_id INTEGER NOT NULL,
    address TEXT NULL,
    zip_code TEXT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (school_id) REFERENCES schools(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_students_school_id ON students(school_id);
CREATE INDEX IF NOT EXISTS idx_students_student_id ON students(student_id);
CREATE INDEX IF NOT EXISTS idx_students_name ON students(last_name, first_name);
CREATE INDEX IF NOT EXISTS idx_students_grade ON students(grade);
CREATE INDEX IF NOT EXISTS idx_students_gender ON students(gender);
CREATE INDEX IF NOT EXISTS idx_students_ethnicity ON students(ethnicity);

CREATE VIEW IF NOT EXISTS school_student_counts AS
SELECT school_id, COUNT(*) AS student_count
FROM students
GROUP BY school_id;
"#;
