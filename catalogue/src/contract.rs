//! The catalogue contract.
//!
//! `Catalogue` holds the decoded state record. Operations take the store
//! explicitly; mutating operations leave the record changed in memory and
//! the caller persists it with [`Catalogue::save`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use triekit_collections::{UnorderedMap, Vector};
use triekit_hostapi::{InvocationContext, StorageAdapter};

use crate::config::CatalogueConfig;
use crate::error::{CatalogueError, Result};
use crate::model::{AddBookArgs, Book, Rate};
use crate::validation;

const NO_COMMENTS_YET: &str = "no comments yet";

/// The persisted state record.
#[derive(Debug, Serialize, Deserialize)]
struct ContractState {
    books: Vector<Book>,
}

/// A loaded catalogue.
#[derive(Debug, Clone)]
pub struct Catalogue {
    config: CatalogueConfig,
    books: Vector<Book>,
}

impl Catalogue {
    /// An empty catalogue that has not been written anywhere yet.
    pub fn new(config: CatalogueConfig) -> Self {
        let books = Vector::new(config.books_prefix.clone());
        Self { config, books }
    }

    /// Create an empty catalogue and persist its state record.
    pub fn init<S>(store: &mut S, config: CatalogueConfig) -> Result<Self>
    where
        S: StorageAdapter + ?Sized,
    {
        let catalogue = Self::new(config);
        catalogue.save(store)?;
        info!(state_key = %catalogue.config.state_key, "catalogue initialized");
        Ok(catalogue)
    }

    /// Decode the state record.
    pub fn load<S>(store: &S, config: CatalogueConfig) -> Result<Self>
    where
        S: StorageAdapter + ?Sized,
    {
        let raw = store
            .read(config.state_key.as_bytes())?
            .ok_or(CatalogueError::StateMissing)?;
        let state: ContractState = serde_json::from_slice(&raw)?;
        Ok(Self {
            config,
            books: state.books,
        })
    }

    /// Write the state record.
    pub fn save<S>(&self, store: &mut S) -> Result<()>
    where
        S: StorageAdapter + ?Sized,
    {
        let state = ContractState {
            books: self.books.clone(),
        };
        let raw = serde_json::to_vec(&state)?;
        store.write(self.config.state_key.as_bytes(), &raw)?;
        Ok(())
    }

    pub fn config(&self) -> &CatalogueConfig {
        &self.config
    }

    /// Number of books.
    pub fn book_count(&self) -> u32 {
        self.books.len()
    }

    /// Add a book owned by the signer.
    pub fn add_book<S>(
        &mut self,
        store: &mut S,
        ctx: &InvocationContext,
        args: AddBookArgs,
    ) -> Result<Book>
    where
        S: StorageAdapter + ?Sized,
    {
        validation::validate_add_book(&args, &self.config)?;

        let id = self.books.len();
        let mut comments = UnorderedMap::new(self.config.comments_prefix(id));
        comments.set(
            store,
            &ctx.signer_account_id,
            &NO_COMMENTS_YET.to_string(),
        )?;

        let book = Book {
            id,
            owner: ctx.signer_account_id.clone(),
            isbn: args.isbn,
            name: args.name,
            description: args.description,
            numpage: args.numpage,
            author: args.author,
            datepublished: args.datepublished,
            editions: args.editions,
            rates: Vector::new(self.config.rating_prefix(id)),
            comments,
            timestamp: ctx.block_timestamp,
        };
        self.books.push(store, &book)?;
        info!(id, owner = %book.owner, isbn = %book.isbn, "book added");
        Ok(book)
    }

    /// All books in insertion order.
    pub fn books<S>(&self, store: &S) -> Result<Vec<Book>>
    where
        S: StorageAdapter + ?Sized,
    {
        Ok(self.books.to_vec(store)?)
    }

    /// The book with the given id.
    pub fn book<S>(&self, store: &S, id: i64) -> Result<Book>
    where
        S: StorageAdapter + ?Sized,
    {
        let index = validation::validate_book_id(id, self.books.len())?;
        self.read_book(store, index)
    }

    /// Record a rating from the signer and return the updated book.
    pub fn rate<S>(
        &mut self,
        store: &mut S,
        ctx: &InvocationContext,
        id: i64,
        valor: i64,
    ) -> Result<Book>
    where
        S: StorageAdapter + ?Sized,
    {
        let index = validation::validate_rate_target(id, self.books.len())?;
        let level = validation::validate_rate(valor)?;

        let mut book = self.read_book(store, index)?;
        let rate = Rate {
            owner: format!("{}{}", ctx.signer_account_id, index),
            rate: level,
        };
        book.rates.push(store, &rate)?;
        self.books.replace(store, index, &book)?;
        debug!(id = index, rate = ?level, ratings = book.rates.len(), "book rated");
        Ok(book)
    }

    /// Ratings of a book in the order they were left.
    pub fn ratings<S>(&self, store: &S, id: i64) -> Result<Vec<Rate>>
    where
        S: StorageAdapter + ?Sized,
    {
        let book = self.book(store, id)?;
        Ok(book.rates.to_vec(store)?)
    }

    /// Set the signer's comment on a book, returning the one it replaced.
    pub fn comment<S>(
        &mut self,
        store: &mut S,
        ctx: &InvocationContext,
        id: i64,
        text: String,
    ) -> Result<Option<String>>
    where
        S: StorageAdapter + ?Sized,
    {
        let index = validation::validate_book_id(id, self.books.len())?;
        validation::validate_comment(&text)?;

        let mut book = self.read_book(store, index)?;
        let previous = book.comments.set(store, &ctx.signer_account_id, &text)?;
        self.books.replace(store, index, &book)?;
        debug!(id = index, author = %ctx.signer_account_id, replaced = previous.is_some(), "comment set");
        Ok(previous)
    }

    /// All `(account, comment)` pairs of a book.
    pub fn comments<S>(&self, store: &S, id: i64) -> Result<Vec<(String, String)>>
    where
        S: StorageAdapter + ?Sized,
    {
        let book = self.book(store, id)?;
        Ok(book.comments.to_vec(store)?)
    }

    /// Remove the signer's comment from a book and return it.
    pub fn remove_comment<S>(
        &mut self,
        store: &mut S,
        ctx: &InvocationContext,
        id: i64,
    ) -> Result<Option<String>>
    where
        S: StorageAdapter + ?Sized,
    {
        let index = validation::validate_book_id(id, self.books.len())?;
        let mut book = self.read_book(store, index)?;
        let removed = book.comments.remove(store, &ctx.signer_account_id)?;
        if removed.is_some() {
            self.books.replace(store, index, &book)?;
            debug!(id = index, author = %ctx.signer_account_id, "comment removed");
        }
        Ok(removed)
    }

    fn read_book<S>(&self, store: &S, index: u32) -> Result<Book>
    where
        S: StorageAdapter + ?Sized,
    {
        self.books
            .get(store, index)?
            .ok_or_else(|| CatalogueError::validation("we haven't that Book"))
    }
}
