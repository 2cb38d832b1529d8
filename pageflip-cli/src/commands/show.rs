//! Show command implementation

use crate::LibraryArgs;
use anyhow::{Context, Result};
use pageflip_core::PageCursor;

/// Run the show command
pub fn show(library: &LibraryArgs, id: i64, page: Option<usize>) -> Result<()> {
    let owner = library.owner();
    let book = library
        .service()?
        .get_by_id(Some(&owner), id)
        .with_context(|| format!("Book {} not found", id))?;

    println!("=== {} ===", book.title);
    if !book.description.is_empty() {
        println!("{}", book.description);
    }
    println!("Category: {}", book.category.as_str());
    println!("Created:  {}", book.created_at.format("%Y-%m-%d %H:%M"));
    println!();

    let mut cursor = PageCursor::new(book.images.len());
    if cursor.is_empty() {
        println!("{}  (no pages)", cursor.label());
        return Ok(());
    }

    if let Some(page) = page {
        cursor.go_to(page.saturating_sub(1));
        if let Some(url) = cursor.page(&book.images) {
            println!("{}  {}", cursor.label(), url);
        }
        return Ok(());
    }

    loop {
        if let Some(url) = cursor.page(&book.images) {
            println!("{}  {}", cursor.label(), url);
        }
        if !cursor.next() {
            break;
        }
    }

    Ok(())
}
