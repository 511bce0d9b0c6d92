//! # Message Repository
//!
//! Chat history. Messages are immutable once written.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use victor_core::{MessageSender, NewMessage, VictorMessage};

const SELECT_MESSAGE: &str = "SELECT id, text, sender, timestamp, created_at FROM victor_messages";

#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MessageRepository { pool }
    }

    /// Stores a new message; the timestamp defaults to now.
    pub async fn create(&self, msg: NewMessage) -> DbResult<VictorMessage> {
        let record = msg.into_record(Utc::now());
        let mut conn = self.pool.acquire().await?;
        insert_message(&mut *conn, &record).await?;
        Ok(record)
    }

    /// The newest `limit` messages, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<VictorMessage>> {
        let messages = sqlx::query_as::<_, VictorMessage>(&format!(
            "{SELECT_MESSAGE} ORDER BY timestamp DESC, rowid DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = messages.len(), "Loaded message history");
        Ok(messages)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM victor_messages")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_by_sender(&self, sender: MessageSender) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM victor_messages WHERE sender = ?1")
            .bind(sender)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts a fully built message on any connection (pool or transaction).
pub(crate) async fn insert_message(
    conn: &mut SqliteConnection,
    record: &VictorMessage,
) -> DbResult<()> {
    debug!(id = %record.id, sender = %record.sender, "Inserting message");

    sqlx::query(
        r#"
        INSERT INTO victor_messages (id, text, sender, timestamp, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&record.id)
    .bind(&record.text)
    .bind(record.sender)
    .bind(record.timestamp)
    .bind(record.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::repository::test_support::memory_db;
    use victor_core::{MessageSender, NewMessage};

    fn message(text: &str, sender: MessageSender) -> NewMessage {
        NewMessage {
            text: text.to_string(),
            sender,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_created_message_appears_in_history() {
        let db = memory_db().await;

        let created = db
            .messages()
            .create(message("hello Victor", MessageSender::User))
            .await
            .unwrap();

        let history = db.messages().recent(50).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], created);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let db = memory_db().await;
        let base = Utc::now() - Duration::minutes(10);

        for i in 0..5 {
            let mut msg = message(&format!("m{i}"), MessageSender::User);
            msg.timestamp = Some(base + Duration::seconds(i));
            db.messages().create(msg).await.unwrap();
        }

        let history = db.messages().recent(3).await.unwrap();
        let texts: Vec<_> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m4", "m3", "m2"]);
    }

    #[tokio::test]
    async fn test_count_by_sender() {
        let db = memory_db().await;
        db.messages()
            .create(message("a", MessageSender::User))
            .await
            .unwrap();
        db.messages()
            .create(message("b", MessageSender::Victor))
            .await
            .unwrap();
        db.messages()
            .create(message("c", MessageSender::Victor))
            .await
            .unwrap();

        assert_eq!(db.messages().count().await.unwrap(), 3);
        assert_eq!(
            db.messages()
                .count_by_sender(MessageSender::Victor)
                .await
                .unwrap(),
            2
        );
    }
}
