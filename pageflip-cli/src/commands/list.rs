//! List command implementation

use crate::LibraryArgs;
use anyhow::Result;

/// Run the list command
pub fn list(library: &LibraryArgs, json: bool) -> Result<()> {
    let owner = library.owner();
    let books = library.service()?.list(Some(&owner))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&books)?);
        return Ok(());
    }

    if books.is_empty() {
        println!("No books yet");
        return Ok(());
    }

    for book in &books {
        println!(
            "{:>5}  {:<30}  {:<9}  {} pages",
            book.id,
            book.title,
            book.category.as_str(),
            book.page_count()
        );
    }
    println!();
    println!("{} book(s)", books.len());

    Ok(())
}
