//! Collection layout and versioned migrations for the document store.
//!
//! Each collection is a `(id, doc)` table holding JSON documents; secondary
//! indexes are expression indexes over `json_extract(doc, '$.field')`. The
//! applied version lives in `PRAGMA user_version`.

/// Latest schema version this build knows how to open.
pub const SCHEMA_VERSION: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Jobs,
    Candidates,
    Assessments,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Jobs,
        Collection::Candidates,
        Collection::Assessments,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Collection::Jobs => "jobs",
            Collection::Candidates => "candidates",
            Collection::Assessments => "assessments",
        }
    }

    /// Document fields that `Store::index` may filter on.
    pub fn indexed_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::Jobs => &["slug", "title", "order", "status"],
            Collection::Candidates => &["name", "email", "jobId", "stage"],
            Collection::Assessments => &["jobId", "title", "createdAt"],
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

pub struct Migration {
    pub version: i64,
    pub statements: &'static [&'static str],
}

/// Append-only. Later versions may only add tables or indexes so documents
/// written under an earlier version stay readable.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        statements: &[
            "CREATE TABLE IF NOT EXISTS jobs (id TEXT PRIMARY KEY NOT NULL, doc TEXT NOT NULL)",
            "CREATE INDEX IF NOT EXISTS idx_jobs_slug ON jobs (json_extract(doc, '$.slug'))",
            "CREATE INDEX IF NOT EXISTS idx_jobs_title ON jobs (json_extract(doc, '$.title'))",
            "CREATE INDEX IF NOT EXISTS idx_jobs_order ON jobs (json_extract(doc, '$.order'))",
            "CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs (json_extract(doc, '$.status'))",
            "CREATE TABLE IF NOT EXISTS candidates (id TEXT PRIMARY KEY NOT NULL, doc TEXT NOT NULL)",
            "CREATE INDEX IF NOT EXISTS idx_candidates_name ON candidates (json_extract(doc, '$.name'))",
            "CREATE INDEX IF NOT EXISTS idx_candidates_email ON candidates (json_extract(doc, '$.email'))",
            "CREATE INDEX IF NOT EXISTS idx_candidates_job_id ON candidates (json_extract(doc, '$.jobId'))",
            "CREATE INDEX IF NOT EXISTS idx_candidates_stage ON candidates (json_extract(doc, '$.stage'))",
            "CREATE TABLE IF NOT EXISTS assessments (id TEXT PRIMARY KEY NOT NULL, doc TEXT NOT NULL)",
        ],
    },
    // v2: assessments became many-per-job, so they gained secondary indexes.
    Migration {
        version: 2,
        statements: &[
            "CREATE INDEX IF NOT EXISTS idx_assessments_job_id ON assessments (json_extract(doc, '$.jobId'))",
            "CREATE INDEX IF NOT EXISTS idx_assessments_title ON assessments (json_extract(doc, '$.title'))",
            "CREATE INDEX IF NOT EXISTS idx_assessments_created_at ON assessments (json_extract(doc, '$.createdAt'))",
        ],
    },
];
