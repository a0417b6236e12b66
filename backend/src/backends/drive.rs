//! # Local Drive
//!
//! A folder/file store on the local filesystem. A SQLite catalog
//! (`drive.sqlite`) records folders and files; file contents live under
//! `files/<id>`. Documents are UTF-8 text files in the markup understood by
//! [`PdfRenderer`](super::pdf::PdfRenderer); any other file is opaque bytes.
//!
//! Ids are 32-character uuid strings, so links embedding them are found by
//! the generic file id heuristic as well as by the document and folder
//! link patterns.

use super::pdf::PdfRenderer;
use crate::engine::context::FieldMap;
use crate::engine::placeholder::substitute_fields;
use crate::engine::ports::{DocRef, DocumentBackend, FileRef, FileStorage, StoredFile};
use crate::engine::BackendError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

const DOCUMENT_MIME: &str = "text/plain; charset=utf-8";

/// Catalog row of a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveEntry {
    pub id: String,
    pub folder_id: Option<String>,
    pub name: String,
    pub content_type: String,
    pub is_document: bool,
    pub trashed: bool,
}

pub struct LocalDrive {
    root: PathBuf,
    conn: Connection,
    renderer: Box<dyn PdfRenderer>,
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl LocalDrive {
    /// Opens (creating if needed) the drive rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, renderer: Box<dyn PdfRenderer>) -> Result<Self, BackendError> {
        let root = root.into();
        fs::create_dir_all(root.join("files"))?;
        let conn = Connection::open(root.join("drive.sqlite"))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS folders (
                 id   TEXT PRIMARY KEY,
                 name TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS files (
                 id          TEXT PRIMARY KEY,
                 folder_id   TEXT,
                 name        TEXT NOT NULL,
                 mime        TEXT NOT NULL,
                 is_document INTEGER NOT NULL DEFAULT 0,
                 trashed     INTEGER NOT NULL DEFAULT 0
             );",
        )?;
        Ok(Self {
            root,
            conn,
            renderer,
        })
    }

    fn blob_path(&self, id: &str) -> PathBuf {
        self.root.join("files").join(id)
    }

    pub fn create_folder(&self, name: &str) -> Result<String, BackendError> {
        let id = new_id();
        self.conn.execute(
            "INSERT INTO folders (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(id)
    }

    /// Stores a text document, e.g. a template.
    pub fn import_document(
        &self,
        folder_id: Option<&str>,
        name: &str,
        text: &str,
    ) -> Result<String, BackendError> {
        self.insert(folder_id, name, DOCUMENT_MIME, true, text.as_bytes())
    }

    /// Stores an arbitrary file. Its content type is guessed from the name.
    pub fn import_file(
        &self,
        folder_id: Option<&str>,
        name: &str,
        bytes: &[u8],
    ) -> Result<String, BackendError> {
        let mime = mime_guess::from_path(name).first_or_octet_stream();
        self.insert(folder_id, name, mime.as_ref(), false, bytes)
    }

    fn insert(
        &self,
        folder_id: Option<&str>,
        name: &str,
        mime: &str,
        is_document: bool,
        bytes: &[u8],
    ) -> Result<String, BackendError> {
        let id = new_id();
        fs::write(self.blob_path(&id), bytes)?;
        self.conn.execute(
            "INSERT INTO files (id, folder_id, name, mime, is_document) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, folder_id, name, mime, is_document],
        )?;
        debug!("Stored {} ({} bytes) as {}", name, bytes.len(), id);
        Ok(id)
    }

    pub fn entry(&self, id: &str) -> Result<Option<DriveEntry>, BackendError> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, folder_id, name, mime, is_document, trashed FROM files WHERE id = ?1",
                params![id],
                |row| {
                    Ok(DriveEntry {
                        id: row.get(0)?,
                        folder_id: row.get(1)?,
                        name: row.get(2)?,
                        content_type: row.get(3)?,
                        is_document: row.get(4)?,
                        trashed: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    /// Files of a folder, trashed ones included, in creation order.
    pub fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveEntry>, BackendError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, folder_id, name, mime, is_document, trashed FROM files
             WHERE folder_id = ?1 ORDER BY rowid",
        )?;
        let entries = stmt
            .query_map(params![folder_id], |row| {
                Ok(DriveEntry {
                    id: row.get(0)?,
                    folder_id: row.get(1)?,
                    name: row.get(2)?,
                    content_type: row.get(3)?,
                    is_document: row.get(4)?,
                    trashed: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn read_bytes(&self, id: &str) -> Result<Vec<u8>, BackendError> {
        Ok(fs::read(self.blob_path(id))?)
    }

    pub fn read_document(&self, id: &str) -> Result<String, BackendError> {
        String::from_utf8(self.read_bytes(id)?)
            .map_err(|_| BackendError::Message(format!("document {id} is not valid UTF-8")))
    }

    fn live_document(&self, id: &str) -> Result<DriveEntry, BackendError> {
        match self.entry(id)? {
            Some(entry) if entry.is_document && !entry.trashed => Ok(entry),
            _ => Err(BackendError::NotFound(format!("document {id}"))),
        }
    }
}

impl DocumentBackend for LocalDrive {
    fn document_exists(&self, document_id: &str) -> Result<bool, BackendError> {
        Ok(self
            .entry(document_id)?
            .is_some_and(|e| e.is_document && !e.trashed))
    }

    fn duplicate_template(
        &self,
        template_id: &str,
        folder_id: &str,
        name: &str,
    ) -> Result<DocRef, BackendError> {
        self.live_document(template_id)?;
        if !self.folder_exists(folder_id)? {
            return Err(BackendError::NotFound(format!("folder {folder_id}")));
        }
        let text = self.read_document(template_id)?;
        let id = self.import_document(Some(folder_id), name, &text)?;
        Ok(DocRef {
            id,
            name: name.to_string(),
        })
    }

    fn replace_body_text(&self, document: &DocRef, fields: &FieldMap) -> Result<(), BackendError> {
        self.live_document(&document.id)?;
        let text = self.read_document(&document.id)?;
        fs::write(self.blob_path(&document.id), substitute_fields(&text, fields))?;
        Ok(())
    }

    fn export_as_fixed_layout(&self, document: &DocRef) -> Result<Vec<u8>, BackendError> {
        let entry = self.live_document(&document.id)?;
        let text = self.read_document(&document.id)?;
        self.renderer.render(&entry.name, &text)
    }

    fn discard(&self, document: &DocRef) -> Result<(), BackendError> {
        self.conn.execute(
            "UPDATE files SET trashed = 1 WHERE id = ?1",
            params![document.id],
        )?;
        Ok(())
    }
}

impl FileStorage for LocalDrive {
    fn folder_exists(&self, folder_id: &str) -> Result<bool, BackendError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM folders WHERE id = ?1",
            params![folder_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<Option<FileRef>, BackendError> {
        if !self.folder_exists(folder_id)? {
            return Ok(None);
        }
        let id = self.import_file(Some(folder_id), name, bytes)?;
        Ok(Some(FileRef {
            id,
            name: name.to_string(),
        }))
    }

    fn fetch_file(&self, file_id: &str) -> Result<Option<StoredFile>, BackendError> {
        match self.entry(file_id)? {
            Some(entry) if !entry.trashed => Ok(Some(StoredFile {
                bytes: self.read_bytes(&entry.id)?,
                id: entry.id,
                name: entry.name,
                content_type: entry.content_type,
            })),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoRenderer;

    impl PdfRenderer for EchoRenderer {
        fn render(&self, title: &str, text: &str) -> Result<Vec<u8>, BackendError> {
            Ok(format!("%PDF {title}\n{text}").into_bytes())
        }
    }

    fn drive() -> (tempfile::TempDir, LocalDrive) {
        let dir = tempfile::tempdir().unwrap();
        let drive = LocalDrive::open(dir.path(), Box::new(EchoRenderer)).unwrap();
        (dir, drive)
    }

    #[test]
    fn duplicate_fills_and_exports_a_copy() {
        let (_dir, drive) = drive();
        let folder = drive.create_folder("Out").unwrap();
        let template = drive.import_document(None, "Template", "Hi {{Name}}").unwrap();

        let copy = drive.duplicate_template(&template, &folder, "Copy").unwrap();
        let fields: FieldMap = [("Name", "Ada")].into_iter().collect();
        drive.replace_body_text(&copy, &fields).unwrap();

        assert_eq!(drive.read_document(&template).unwrap(), "Hi {{Name}}");
        assert_eq!(drive.read_document(&copy.id).unwrap(), "Hi Ada");
        assert_eq!(
            drive.export_as_fixed_layout(&copy).unwrap(),
            b"%PDF Copy\nHi Ada".to_vec()
        );
        assert_eq!(drive.list_folder(&folder).unwrap().len(), 1);
    }

    #[test]
    fn trashed_documents_disappear() {
        let (_dir, drive) = drive();
        let folder = drive.create_folder("Out").unwrap();
        let template = drive.import_document(None, "Template", "x").unwrap();
        let copy = drive.duplicate_template(&template, &folder, "Copy").unwrap();

        drive.discard(&copy).unwrap();

        assert!(!drive.document_exists(&copy.id).unwrap());
        assert!(drive.fetch_file(&copy.id).unwrap().is_none());
        assert!(drive.entry(&copy.id).unwrap().unwrap().trashed);
    }

    #[test]
    fn create_file_needs_an_existing_folder() {
        let (_dir, drive) = drive();
        assert!(drive.create_file("missing", "a.pdf", b"x").unwrap().is_none());

        let folder = drive.create_folder("Out").unwrap();
        let file = drive.create_file(&folder, "a.pdf", b"x").unwrap().unwrap();
        let stored = drive.fetch_file(&file.id).unwrap().unwrap();
        assert_eq!(stored.name, "a.pdf");
        assert_eq!(stored.content_type, "application/pdf");
        assert_eq!(stored.bytes, b"x".to_vec());
    }

    #[test]
    fn ids_are_long_enough_for_link_lookup() {
        let (_dir, drive) = drive();
        let id = drive.import_file(None, "notes.txt", b"n").unwrap();
        let link = format!("https://drive.local/file/d/{id}/view");
        assert_eq!(crate::engine::identifiers::extract_file_id(&link), Some(id.as_str()));
    }
}
