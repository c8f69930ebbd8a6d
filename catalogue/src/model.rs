//! Catalogue records.
//!
//! Field names are the wire names: these records are what `getBook` and
//! friends return, and what is persisted inside the books vector.

use serde::{Deserialize, Serialize};
use triekit_collections::{UnorderedMap, Vector};

/// A rating value. Serialized as its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum RateLevel {
    Bad = 0,
    Regular = 1,
    Awesome = 2,
    None = 3,
}

impl TryFrom<u8> for RateLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Bad),
            1 => Ok(Self::Regular),
            2 => Ok(Self::Awesome),
            3 => Ok(Self::None),
            other => Err(format!("invalid rate level {other}, expected 0..=3")),
        }
    }
}

impl From<RateLevel> for u8 {
    fn from(level: RateLevel) -> Self {
        level as u8
    }
}

/// One rating left on a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// Rater's account id followed by the book id.
    pub owner: String,
    pub rate: RateLevel,
}

/// A catalogue entry.
///
/// `rates` and `comments` are container headers; their elements live in
/// their own storage entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u32,
    pub owner: String,
    pub isbn: String,
    pub name: String,
    pub description: String,
    pub numpage: u64,
    pub author: String,
    pub datepublished: String,
    pub editions: u64,
    pub rates: Vector<Rate>,
    pub comments: UnorderedMap<String, String>,
    pub timestamp: u64,
}

/// Arguments of `AddBook`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBookArgs {
    pub isbn: String,
    pub name: String,
    pub description: String,
    pub numpage: u64,
    pub author: String,
    pub datepublished: String,
    pub editions: u64,
}

/// Arguments naming a single book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IdArgs {
    pub id: i64,
}

/// Arguments of `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateArgs {
    pub id: i64,
    pub valor: i64,
}

/// Arguments of `comment`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentArgs {
    pub id: i64,
    pub text: String,
}
