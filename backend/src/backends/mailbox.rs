//! SQLite-backed mailbox: drafts to merge from and an outbox of sent mail.
//!
//! Sending appends the message to the outbox; handing it to a transport is
//! left to whatever drains the outbox.

use crate::engine::ports::{Attachment, Draft, MailBackend, OutgoingEmail};
use crate::engine::BackendError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Local;
use rusqlite::{params, Connection};
use std::path::Path;
use uuid::Uuid;

pub struct Mailbox {
    conn: Connection,
}

/// A message as recorded in the outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub email: OutgoingEmail,
    pub sent_at: String,
}

impl Mailbox {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS drafts (
                 id      TEXT PRIMARY KEY,
                 subject TEXT NOT NULL,
                 body    TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS outbox (
                 id        INTEGER PRIMARY KEY AUTOINCREMENT,
                 recipient TEXT NOT NULL,
                 cc        TEXT NOT NULL,
                 bcc       TEXT NOT NULL,
                 subject   TEXT NOT NULL,
                 html_body TEXT NOT NULL,
                 sent_at   TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS outbox_attachments (
                 message_id   INTEGER NOT NULL REFERENCES outbox(id),
                 file_name    TEXT NOT NULL,
                 content_type TEXT NOT NULL,
                 base64       TEXT NOT NULL
             );",
        )?;
        Ok(Self { conn })
    }

    pub fn save_draft(&self, subject: &str, body: &str) -> Result<String, BackendError> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO drafts (id, subject, body) VALUES (?1, ?2, ?3)",
            params![id, subject, body],
        )?;
        Ok(id)
    }

    /// Everything in the outbox, oldest first.
    pub fn sent_messages(&self) -> Result<Vec<SentMessage>, BackendError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recipient, cc, bcc, subject, html_body, sent_at FROM outbox ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    OutgoingEmail {
                        to: row.get(1)?,
                        cc: row.get(2)?,
                        bcc: row.get(3)?,
                        subject: row.get(4)?,
                        html_body: row.get(5)?,
                        attachments: Vec::new(),
                    },
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut att_stmt = self.conn.prepare(
            "SELECT file_name, content_type, base64 FROM outbox_attachments
             WHERE message_id = ?1 ORDER BY rowid",
        )?;
        let mut messages = Vec::with_capacity(rows.len());
        for (id, mut email, sent_at) in rows {
            let encoded = att_stmt
                .query_map(params![id], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            for (file_name, content_type, b64) in encoded {
                let bytes = BASE64.decode(b64).map_err(|e| {
                    BackendError::Storage(format!("corrupt attachment {file_name}: {e}"))
                })?;
                email.attachments.push(Attachment {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            messages.push(SentMessage { email, sent_at });
        }
        Ok(messages)
    }
}

impl MailBackend for Mailbox {
    fn list_drafts(&self) -> Result<Vec<Draft>, BackendError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, subject, body FROM drafts ORDER BY rowid")?;
        let drafts = stmt
            .query_map([], |row| {
                Ok(Draft {
                    id: row.get(0)?,
                    subject: row.get(1)?,
                    body: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(drafts)
    }

    fn send_email(&self, email: &OutgoingEmail) -> Result<(), BackendError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO outbox (recipient, cc, bcc, subject, html_body, sent_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                email.to,
                email.cc,
                email.bcc,
                email.subject,
                email.html_body,
                Local::now().to_rfc3339()
            ],
        )?;
        let message_id = tx.last_insert_rowid();
        for attachment in &email.attachments {
            tx.execute(
                "INSERT INTO outbox_attachments (message_id, file_name, content_type, base64)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    message_id,
                    attachment.file_name,
                    attachment.content_type,
                    BASE64.encode(&attachment.bytes)
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
