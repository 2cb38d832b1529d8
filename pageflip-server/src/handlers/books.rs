//! Book record handlers

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use pageflip_core::{Book, NewBook, PageflipError};

/// List the caller's books
pub async fn list_books(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Book>>, ApiError> {
    let books = state.books.list(caller.owner())?;
    Ok(Json(books))
}

/// Create a book for the caller
///
/// Serves both `POST /books` and `POST /books/create`. Authentication is
/// checked before the body is looked at.
pub async fn create_book(
    State(state): State<AppState>,
    caller: Caller,
    body: Option<Json<NewBook>>,
) -> Result<Json<Book>, ApiError> {
    let owner = caller.require()?;
    let Json(request) =
        body.ok_or_else(|| ApiError::BadRequest("Invalid request body".to_string()))?;

    let book = state.books.create(Some(owner), request)?;
    Ok(Json(book))
}

/// Fetch one of the caller's books
pub async fn get_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    let owner = caller.require()?;

    // Ids that cannot exist look the same as ids that do not
    let id: i64 = id.parse().map_err(|_| PageflipError::NotFound)?;

    let book = state.books.get_by_id(Some(owner), id)?;
    Ok(Json(book))
}
