//! Book table persistence

use crate::error::{PageflipError, Result};
use crate::types::{Book, Category, OwnerId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;

/// A validated book ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub images: Vec<String>,
    pub user_id: OwnerId,
}

/// Storage seam for book rows
///
/// Every read is scoped to an owner; there is no unscoped lookup.
pub trait BookRepository: Send + Sync {
    /// Insert a row, returning its generated id
    fn insert(&self, record: &BookRecord) -> Result<i64>;

    /// Fetch a row matching both id and owner
    fn find_owned(&self, id: i64, owner: &OwnerId) -> Result<Option<Book>>;

    /// All rows belonging to an owner, oldest first
    fn list_owned(&self, owner: &OwnerId) -> Result<Vec<Book>>;
}

fn persistence(context: &str, e: impl std::fmt::Display) -> PageflipError {
    PageflipError::Persistence(format!("{context}: {e}"))
}

/// SQLite-backed book table
#[derive(Clone)]
pub struct SqliteBookStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBookStore {
    /// Open or create the database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| persistence("Failed to create database directory", e))?;
        }

        let conn =
            Connection::open(path).map_err(|e| persistence("Failed to open database", e))?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| persistence("Failed to open database", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT DEFAULT '',
                category TEXT NOT NULL DEFAULT 'general',
                images TEXT NOT NULL DEFAULT '[]',
                user_id TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
                updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
            );

            CREATE INDEX IF NOT EXISTS idx_books_user ON books(user_id);
            "#,
        )
        .map_err(|e| persistence("Failed to initialize schema", e))
    }

    fn row_to_book(row: &Row<'_>) -> rusqlite::Result<Book> {
        let category: String = row.get(3)?;
        let category = category
            .parse::<Category>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        let images: String = row.get(4)?;
        let images: Vec<String> = serde_json::from_str(&images)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        let description: Option<String> = row.get(2)?;
        let user_id: String = row.get(5)?;

        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            description: description.unwrap_or_default(),
            category,
            images,
            user_id: OwnerId::new(user_id),
            created_at: timestamp_to_datetime(row.get(6)?),
            updated_at: timestamp_to_datetime(row.get(7)?),
        })
    }
}

impl BookRepository for SqliteBookStore {
    fn insert(&self, record: &BookRecord) -> Result<i64> {
        let images = serde_json::to_string(&record.images)
            .map_err(|e| persistence("Failed to encode images", e))?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO books (title, description, category, images, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.title,
                record.description,
                record.category.as_str(),
                images,
                record.user_id.as_str(),
            ],
        )
        .map_err(|e| persistence("Failed to insert book", e))?;

        Ok(conn.last_insert_rowid())
    }

    fn find_owned(&self, id: i64, owner: &OwnerId) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, description, category, images, user_id, created_at, updated_at
             FROM books WHERE id = ?1 AND user_id = ?2",
            params![id, owner.as_str()],
            Self::row_to_book,
        )
        .optional()
        .map_err(|e| persistence("Failed to get book", e))
    }

    fn list_owned(&self, owner: &OwnerId) -> Result<Vec<Book>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, title, description, category, images, user_id, created_at, updated_at
                 FROM books WHERE user_id = ?1
                 ORDER BY id",
            )
            .map_err(|e| persistence("Failed to prepare query", e))?;

        let books = stmt
            .query_map(params![owner.as_str()], Self::row_to_book)
            .map_err(|e| persistence("Failed to list books", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| persistence("Failed to collect books", e))?;

        Ok(books)
    }
}

/// Convert a unix timestamp column to a DateTime
fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(owner: &str, title: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            description: String::new(),
            category: Category::Photo,
            images: vec!["u2".to_string(), "u1".to_string()],
            user_id: OwnerId::new(owner),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let store = SqliteBookStore::open_memory().unwrap();
        let owner = OwnerId::new("alice");

        let id = store.insert(&record("alice", "Trip")).unwrap();
        let book = store.find_owned(id, &owner).unwrap().unwrap();

        assert_eq!(book.id, id);
        assert_eq!(book.title, "Trip");
        assert_eq!(book.category, Category::Photo);
        assert_eq!(book.images, vec!["u2", "u1"]);
        assert_eq!(book.user_id, owner);
        assert!(book.created_at.timestamp() > 0);
    }

    #[test]
    fn test_find_is_owner_scoped() {
        let store = SqliteBookStore::open_memory().unwrap();
        let id = store.insert(&record("alice", "Trip")).unwrap();

        assert!(store.find_owned(id, &OwnerId::new("bob")).unwrap().is_none());
        assert!(store.find_owned(id + 1, &OwnerId::new("alice")).unwrap().is_none());
    }

    #[test]
    fn test_list_owned() {
        let store = SqliteBookStore::open_memory().unwrap();
        store.insert(&record("alice", "First")).unwrap();
        store.insert(&record("bob", "Other")).unwrap();
        store.insert(&record("alice", "Second")).unwrap();

        let titles: Vec<String> = store
            .list_owned(&OwnerId::new("alice"))
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert!(store.list_owned(&OwnerId::new("carol")).unwrap().is_empty());
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/pageflip.db");

        let id = {
            let store = SqliteBookStore::open(&path).unwrap();
            store.insert(&record("alice", "Kept")).unwrap()
        };

        let store = SqliteBookStore::open(&path).unwrap();
        let book = store.find_owned(id, &OwnerId::new("alice")).unwrap();
        assert_eq!(book.map(|b| b.title), Some("Kept".to_string()));
    }
}
