use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS notifications (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            title      TEXT NOT NULL,
            content    TEXT NOT NULL,
            category   TEXT NOT NULL CHECK(category IN
                       ('salah','events','updates','blog','courses','ramadan','friday')),
            priority   TEXT NOT NULL DEFAULT 'normal'
                       CHECK(priority IN ('normal','high','urgent')),
            posted_at  TEXT NOT NULL,
            read       INTEGER DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS subscriptions (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            name           TEXT NOT NULL,
            email          TEXT NOT NULL,
            phone          TEXT,
            categories     TEXT NOT NULL,
            subscribed_at  TEXT NOT NULL,
            active         INTEGER DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS media (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            title            TEXT NOT NULL,
            media_type       TEXT NOT NULL
                             CHECK(media_type IN ('weekly','audio','video','books','documents')),
            weekly_category  TEXT,
            description      TEXT NOT NULL DEFAULT '',
            teacher          TEXT NOT NULL DEFAULT '',
            file_name        TEXT NOT NULL,
            file_size        INTEGER NOT NULL,
            mime_type        TEXT NOT NULL,
            data             BLOB NOT NULL,
            uploaded_at      TEXT NOT NULL,
            download_count   INTEGER DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS questions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            subject       TEXT NOT NULL,
            content       TEXT NOT NULL,
            category      TEXT,
            teacher       TEXT NOT NULL,
            name          TEXT,
            email         TEXT NOT NULL,
            phone         TEXT,
            submitted_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS enrollments (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            programs      TEXT NOT NULL,
            name          TEXT NOT NULL,
            email         TEXT NOT NULL,
            phone         TEXT NOT NULL,
            level         TEXT NOT NULL,
            year          TEXT,
            message       TEXT,
            submitted_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;
    Ok(())
}
