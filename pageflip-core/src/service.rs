//! Book record service: validation, defaults and owner scoping over a repository

use crate::db::{BookRecord, BookRepository};
use crate::error::{PageflipError, Result};
use crate::types::{Book, Category, NewBook, OwnerId};
use std::sync::Arc;

/// Creates and reads books on behalf of an authenticated caller
#[derive(Clone)]
pub struct BookService {
    repo: Arc<dyn BookRepository>,
}

fn authenticated(caller: Option<&OwnerId>) -> Result<&OwnerId> {
    caller.ok_or(PageflipError::Authentication)
}

impl BookService {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }

    /// Check a creation request and fill in defaults
    pub fn validate(owner: &OwnerId, request: NewBook) -> Result<BookRecord> {
        let title = request
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PageflipError::Validation("Title is required".to_string()))?;

        let category = match request.category.as_deref() {
            None => Category::default(),
            Some(text) => text
                .parse()
                .map_err(|e| PageflipError::Validation(format!("Invalid category: {e}")))?,
        };

        Ok(BookRecord {
            title,
            description: request.description.unwrap_or_default(),
            category,
            images: request.images.unwrap_or_default(),
            user_id: owner.clone(),
        })
    }

    /// Persist a new book for the caller and return the stored row
    pub fn create(&self, caller: Option<&OwnerId>, request: NewBook) -> Result<Book> {
        let owner = authenticated(caller)?;
        let record = Self::validate(owner, request)?;

        let id = self.repo.insert(&record)?;

        // Read back so the caller sees exactly what was stored
        let book = self.repo.find_owned(id, owner)?.ok_or_else(|| {
            PageflipError::Persistence(format!("Book {id} missing after insert"))
        })?;

        tracing::info!(id = book.id, owner = %owner, pages = book.page_count(), "Created book");
        Ok(book)
    }

    /// All books owned by the caller
    pub fn list(&self, caller: Option<&OwnerId>) -> Result<Vec<Book>> {
        let owner = authenticated(caller)?;
        self.repo.list_owned(owner)
    }

    /// A single book, if the caller owns it
    ///
    /// Someone else's book and a missing id produce the same `NotFound`.
    pub fn get_by_id(&self, caller: Option<&OwnerId>, id: i64) -> Result<Book> {
        let owner = authenticated(caller)?;
        self.repo
            .find_owned(id, owner)?
            .ok_or(PageflipError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteBookStore;
    use parking_lot::Mutex;

    /// Repository that counts inserts and can be told to fail them
    #[derive(Default)]
    struct RecordingRepo {
        inner: Option<SqliteBookStore>,
        inserts: Mutex<usize>,
    }

    impl RecordingRepo {
        fn working() -> Self {
            Self {
                inner: Some(SqliteBookStore::open_memory().unwrap()),
                inserts: Mutex::new(0),
            }
        }

        fn broken() -> Self {
            Self::default()
        }
    }

    impl BookRepository for RecordingRepo {
        fn insert(&self, record: &BookRecord) -> Result<i64> {
            *self.inserts.lock() += 1;
            match &self.inner {
                Some(store) => store.insert(record),
                None => Err(PageflipError::Persistence("database unavailable".into())),
            }
        }

        fn find_owned(&self, id: i64, owner: &OwnerId) -> Result<Option<Book>> {
            match &self.inner {
                Some(store) => store.find_owned(id, owner),
                None => Err(PageflipError::Persistence("database unavailable".into())),
            }
        }

        fn list_owned(&self, owner: &OwnerId) -> Result<Vec<Book>> {
            match &self.inner {
                Some(store) => store.list_owned(owner),
                None => Err(PageflipError::Persistence("database unavailable".into())),
            }
        }
    }

    fn alice() -> OwnerId {
        OwnerId::new("alice")
    }

    #[test]
    fn test_create_applies_defaults() {
        let service = BookService::new(Arc::new(RecordingRepo::working()));

        let book = service
            .create(Some(&alice()), NewBook::titled("Trip"))
            .unwrap();

        assert_eq!(book.title, "Trip");
        assert_eq!(book.description, "");
        assert_eq!(book.category, Category::General);
        assert!(book.images.is_empty());
        assert_eq!(book.user_id, alice());
    }

    #[test]
    fn test_create_keeps_supplied_fields() {
        let service = BookService::new(Arc::new(RecordingRepo::working()));
        let request = NewBook {
            title: Some("Comics".into()),
            description: Some("Sunday strips".into()),
            category: Some("comic".into()),
            images: Some(vec!["p1".into(), "p2".into()]),
        };

        let book = service.create(Some(&alice()), request).unwrap();
        assert_eq!(book.description, "Sunday strips");
        assert_eq!(book.category, Category::Comic);
        assert_eq!(book.images, vec!["p1", "p2"]);
    }

    #[test]
    fn test_create_without_title_writes_nothing() {
        let repo = Arc::new(RecordingRepo::working());
        let service = BookService::new(repo.clone());

        for title in [None, Some(String::new()), Some("   ".to_string())] {
            let request = NewBook {
                title,
                ..NewBook::default()
            };
            let err = service.create(Some(&alice()), request).unwrap_err();
            assert!(matches!(err, PageflipError::Validation(_)));
        }
        assert_eq!(*repo.inserts.lock(), 0);
    }

    #[test]
    fn test_create_rejects_unknown_category() {
        let repo = Arc::new(RecordingRepo::working());
        let service = BookService::new(repo.clone());
        let request = NewBook {
            category: Some("poetry".into()),
            ..NewBook::titled("Verses")
        };

        let err = service.create(Some(&alice()), request).unwrap_err();
        assert!(matches!(err, PageflipError::Validation(_)));
        assert_eq!(*repo.inserts.lock(), 0);
    }

    #[test]
    fn test_unauthenticated_calls_fail() {
        let repo = Arc::new(RecordingRepo::working());
        let service = BookService::new(repo.clone());

        assert!(matches!(
            service.create(None, NewBook::titled("Trip")),
            Err(PageflipError::Authentication)
        ));
        assert!(matches!(service.list(None), Err(PageflipError::Authentication)));
        assert!(matches!(
            service.get_by_id(None, 1),
            Err(PageflipError::Authentication)
        ));
        assert_eq!(*repo.inserts.lock(), 0);
    }

    #[test]
    fn test_other_owner_looks_missing() {
        let service = BookService::new(Arc::new(RecordingRepo::working()));
        let book = service
            .create(Some(&alice()), NewBook::titled("Private"))
            .unwrap();
        let bob = OwnerId::new("bob");

        let foreign = service.get_by_id(Some(&bob), book.id).unwrap_err();
        let missing = service.get_by_id(Some(&bob), book.id + 100).unwrap_err();

        assert!(matches!(foreign, PageflipError::NotFound));
        assert!(matches!(missing, PageflipError::NotFound));
        assert_eq!(foreign.to_string(), missing.to_string());
        assert_eq!(service.get_by_id(Some(&alice()), book.id).unwrap(), book);
    }

    #[test]
    fn test_list_only_returns_own_books() {
        let service = BookService::new(Arc::new(RecordingRepo::working()));
        service.create(Some(&alice()), NewBook::titled("A")).unwrap();
        service
            .create(Some(&OwnerId::new("bob")), NewBook::titled("B"))
            .unwrap();

        let books = service.list(Some(&alice())).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "A");
    }

    #[test]
    fn test_persistence_failure_surfaces() {
        let service = BookService::new(Arc::new(RecordingRepo::broken()));
        let err = service
            .create(Some(&alice()), NewBook::titled("Trip"))
            .unwrap_err();
        assert!(matches!(err, PageflipError::Persistence(_)));
    }
}
