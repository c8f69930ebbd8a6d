//! `triekit-catalogue`: a book catalogue with ratings and comments.
//!
//! The catalogue is the application layer on top of `triekit-collections`:
//! the books live in a `Vector<Book>`, each book owns a `Vector<Rate>` of
//! ratings and an `UnorderedMap<String, String>` of comments. The contract
//! state record (`{"books": ...}`) is stored as JSON under `STATE`.
//!
//! ## Architecture
//!
//! - [`contract::Catalogue`]: load/save of the state record and every operation
//! - [`validation`]: argument checks run before any write
//! - [`runtime::METHODS`]: method name → handler table with read/write flags
//! - [`runtime::Runtime`]: runs one invocation inside an `OverlayStore`,
//!   committing only when a mutating method succeeds

pub mod error;
pub mod config;
pub mod model;
pub mod validation;
pub mod contract;
pub mod runtime;

pub use error::{CatalogueError, Result};
pub use config::{CatalogueConfig, NestedPrefixScheme};
pub use model::{Book, Rate, RateLevel};
pub use contract::Catalogue;
pub use runtime::{Access, InvocationOutcome, MethodEntry, OutcomeStatus, Runtime, METHODS};
