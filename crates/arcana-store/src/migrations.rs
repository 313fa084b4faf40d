use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS conversations (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            initial_cards TEXT NOT NULL,
            initial_question TEXT NOT NULL,
            revision INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            conversation_id TEXT NOT NULL REFERENCES conversations(id),
            seq INTEGER NOT NULL,
            role TEXT NOT NULL,
            text TEXT NOT NULL,
            token_count INTEGER,
            created_at TEXT NOT NULL,
            PRIMARY KEY (conversation_id, seq)
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_user
            ON conversations (user_id, updated_at);
        "#,
    )?;
    Ok(())
}
