mod migrations;

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tokio::task;
use uuid::Uuid;

use arcana_schema::{Conversation, Message, MessagePart, Role, TarotCard};

use crate::migrations::run_migrations;

/// One row in a per-user conversation listing.
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub id: String,
    pub initial_question: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Document-style persistence for reading sessions. Conversations are
/// created once and then only appended to; no update-in-place, no delete.
/// Ownership checks are the caller's responsibility.
#[derive(Clone)]
pub struct ConversationStore {
    db: Arc<Mutex<Connection>>,
}

impl ConversationStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn)?;
        tracing::debug!(path, "opened conversation store");
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Creates a conversation with the model's initial reading as
    /// `history[0]` and returns its generated id.
    pub async fn create(
        &self,
        user_id: &str,
        cards: &[TarotCard],
        question: &str,
        reading_text: &str,
        token_count: u32,
    ) -> Result<String> {
        let db = Arc::clone(&self.db);
        let id = Uuid::new_v4().to_string();
        let user_id = user_id.to_owned();
        let cards_json = serde_json::to_string(cards)?;
        let question = question.to_owned();
        let reading_text = reading_text.to_owned();

        let created = id.clone();
        task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|_| anyhow!("failed to lock sqlite connection"))?;
            let now = Utc::now().to_rfc3339();
            let tx = conn.transaction()?;
            tx.execute(
                r#"
                INSERT INTO conversations (
                    id, user_id, initial_cards, initial_question, revision, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
                "#,
                params![id, user_id, cards_json, question, now],
            )?;
            tx.execute(
                r#"
                INSERT INTO messages (conversation_id, seq, role, text, token_count, created_at)
                VALUES (?1, 0, 'model', ?2, ?3, ?4)
                "#,
                params![id, reading_text, token_count, now],
            )?;
            tx.commit()?;
            Ok::<(), anyhow::Error>(())
        })
        .await??;

        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();
        task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| anyhow!("failed to lock sqlite connection"))?;
            let mut stmt = conn.prepare(
                r#"
                SELECT id, user_id, initial_cards, initial_question, revision, created_at, updated_at
                FROM conversations
                WHERE id = ?1
                LIMIT 1
                "#,
            )?;
            let mut rows = stmt.query(params![id])?;
            let Some(row) = rows.next()? else {
                return Ok::<Option<Conversation>, anyhow::Error>(None);
            };
            let mut conversation = row_to_conversation(row)?;

            let mut stmt = conn.prepare(
                r#"
                SELECT role, text, token_count, created_at
                FROM messages
                WHERE conversation_id = ?1
                ORDER BY seq ASC
                "#,
            )?;
            let messages = stmt.query_map(params![id], row_to_message)?;
            for message in messages {
                conversation.history.push(message?);
            }
            Ok(Some(conversation))
        })
        .await?
    }

    /// Appends a user/model message pair atomically: both rows land with
    /// one timestamp and `updated_at` is refreshed in the same transaction.
    /// The write is conditional on `expected_revision`; a moved revision
    /// means another append won the race and this one fails.
    pub async fn append_messages(
        &self,
        id: &str,
        user_msg: Message,
        model_msg: Message,
        expected_revision: i64,
    ) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();
        task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|_| anyhow!("failed to lock sqlite connection"))?;
            let now = Utc::now().to_rfc3339();
            let tx = conn.transaction()?;

            let updated = tx.execute(
                "UPDATE conversations SET revision = revision + 1, updated_at = ?1
                 WHERE id = ?2 AND revision = ?3",
                params![now, id, expected_revision],
            )?;
            if updated == 0 {
                return Err(anyhow!(
                    "conversation not found or revision moved: {id}@{expected_revision}"
                ));
            }

            let next_seq: i64 = tx.query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            for (offset, msg) in [user_msg, model_msg].iter().enumerate() {
                tx.execute(
                    r#"
                    INSERT INTO messages (conversation_id, seq, role, text, token_count, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        id,
                        next_seq + offset as i64,
                        msg.role.as_str(),
                        msg.text(),
                        msg.token_count,
                        now
                    ],
                )?;
            }
            tx.commit()?;
            Ok::<(), anyhow::Error>(())
        })
        .await??;

        Ok(())
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_owned();
        task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| anyhow!("failed to lock sqlite connection"))?;
            let mut stmt = conn.prepare(
                r#"
                SELECT id, initial_question, created_at, updated_at
                FROM conversations
                WHERE user_id = ?1
                ORDER BY updated_at DESC
                "#,
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                let created_raw: String = row.get(2)?;
                let updated_raw: String = row.get(3)?;
                Ok(ConversationSummary {
                    id: row.get(0)?,
                    initial_question: row.get(1)?,
                    created_at: parse_datetime_sql(&created_raw)?,
                    updated_at: parse_datetime_sql(&updated_raw)?,
                })
            })?;
            let mut summaries = Vec::new();
            for row in rows {
                summaries.push(row?);
            }
            Ok::<Vec<ConversationSummary>, anyhow::Error>(summaries)
        })
        .await?
    }
}

fn parse_datetime_sql(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_role_sql(raw: &str) -> rusqlite::Result<Role> {
    match raw {
        "user" => Ok(Role::User),
        "model" => Ok(Role::Model),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown message role: {other}").into(),
        )),
    }
}

fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    let cards_raw: String = row.get(2)?;
    let created_raw: String = row.get(5)?;
    let updated_raw: String = row.get(6)?;
    let initial_cards: Vec<TarotCard> = serde_json::from_str(&cards_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        initial_cards,
        initial_question: row.get(3)?,
        history: Vec::new(),
        revision: row.get(4)?,
        created_at: parse_datetime_sql(&created_raw)?,
        updated_at: parse_datetime_sql(&updated_raw)?,
    })
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    let role_raw: String = row.get(0)?;
    let text: String = row.get(1)?;
    let created_raw: String = row.get(3)?;

    Ok(Message {
        role: parse_role_sql(&role_raw)?,
        parts: vec![MessagePart { text }],
        token_count: row.get(2)?,
        timestamp: Some(parse_datetime_sql(&created_raw)?),
    })
}
