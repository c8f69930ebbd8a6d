//! Argument checks for catalogue operations.
//!
//! Every check runs before the operation touches storage, so a rejected
//! invocation writes nothing.

use crate::config::CatalogueConfig;
use crate::error::{CatalogueError, Result};
use crate::model::{AddBookArgs, RateLevel};

fn ensure(condition: bool, msg: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(CatalogueError::validation(msg))
    }
}

/// Validate the fields of a new book.
pub fn validate_add_book(args: &AddBookArgs, config: &CatalogueConfig) -> Result<()> {
    ensure(!args.isbn.is_empty(), "the ISBN is required")?;
    ensure(!args.name.is_empty(), "the name is required")?;
    let description_len = args.description.encode_utf16().count();
    ensure(
        description_len > 0 && description_len < config.max_description_len,
        "the description is required or you exceed the character's number",
    )?;
    ensure(
        args.numpage > 0 && args.numpage < config.max_page_count,
        "the numpage is required or you exceed the page's number",
    )?;
    ensure(!args.author.is_empty(), "the author is required")?;
    ensure(!args.datepublished.is_empty(), "the datepublished is required")?;
    ensure(args.editions > 0, "the editions is required")?;
    Ok(())
}

/// Resolve a caller-supplied book id against the current book count.
pub fn validate_book_id(id: i64, book_count: u32) -> Result<u32> {
    ensure(id >= 0, "id cannot be negative")?;
    ensure(book_count > 0, "we haven't any Books")?;
    ensure(id < i64::from(book_count), "we haven't that Book")?;
    Ok(id as u32)
}

/// Resolve the target of a rating. Only the upper bound is checked, so an
/// empty catalogue reports the missing book rather than the empty list.
pub fn validate_rate_target(id: i64, book_count: u32) -> Result<u32> {
    ensure(id >= 0, "id cannot be negative")?;
    ensure(id < i64::from(book_count), "we haven't that Book")?;
    Ok(id as u32)
}

/// Validate a rating value.
pub fn validate_rate(valor: i64) -> Result<RateLevel> {
    u8::try_from(valor)
        .ok()
        .and_then(|v| RateLevel::try_from(v).ok())
        .ok_or_else(|| CatalogueError::validation("the rate must be between 0 and 3"))
}

/// Validate a comment body.
pub fn validate_comment(text: &str) -> Result<()> {
    ensure(!text.trim().is_empty(), "the comment is required")
}
