use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: &[&str] = &[
    r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE COLLATE NOCASE,
            name TEXT,
            image TEXT,
            verified INTEGER NOT NULL DEFAULT 0,
            last_seen_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS study_sets (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            visibility TEXT NOT NULL CHECK (visibility IN ('public', 'unlisted', 'private')),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS terms (
            id INTEGER PRIMARY KEY,
            study_set_id INTEGER NOT NULL,
            word TEXT NOT NULL,
            definition TEXT NOT NULL,
            rank INTEGER NOT NULL CHECK (rank >= 0),
            FOREIGN KEY (study_set_id) REFERENCES study_sets(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS folders (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS study_sets_on_folders (
            folder_id INTEGER NOT NULL,
            study_set_id INTEGER NOT NULL,
            PRIMARY KEY (folder_id, study_set_id),
            FOREIGN KEY (folder_id) REFERENCES folders(id) ON DELETE CASCADE,
            FOREIGN KEY (study_set_id) REFERENCES study_sets(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS study_set_experiences (
            user_id INTEGER NOT NULL,
            study_set_id INTEGER NOT NULL,
            rounds_completed INTEGER NOT NULL CHECK (rounds_completed >= 0),
            last_round_at TEXT,
            PRIMARY KEY (user_id, study_set_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (study_set_id) REFERENCES study_sets(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS folder_experiences (
            user_id INTEGER NOT NULL,
            folder_id INTEGER NOT NULL,
            viewed_at TEXT NOT NULL,
            PRIMARY KEY (user_id, folder_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (folder_id) REFERENCES folders(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS studiable_terms (
            user_id INTEGER NOT NULL,
            term_id INTEGER NOT NULL,
            appeared_in_round INTEGER NOT NULL CHECK (appeared_in_round >= 0),
            PRIMARY KEY (user_id, term_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (term_id) REFERENCES terms(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS starred_terms (
            user_id INTEGER NOT NULL,
            term_id INTEGER NOT NULL,
            PRIMARY KEY (user_id, term_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (term_id) REFERENCES terms(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_study_sets_user_created
            ON study_sets (user_id, created_at);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_terms_set_rank
            ON terms (study_set_id, rank);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_users_last_seen
            ON users (last_seen_at);
    ",
];

/// Runs the versioned migrations for the current schema.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: users, study sets, folders and progress tables.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        for statement in SCHEMA_V1.iter().copied() {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
