//! Shared helpers for catalogue integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use triekit_catalogue::{CatalogueConfig, InvocationOutcome, Runtime};
use triekit_hostapi::{InvocationContext, MemStore, StoreConfig};

/// A store plus a runtime, invoked with JSON values.
pub struct Harness {
    pub store: MemStore,
    pub runtime: Runtime,
    pub timestamp: u64,
}

impl Harness {
    /// Harness with an initialized catalogue.
    pub fn new() -> Self {
        Self::with_config(CatalogueConfig::default())
    }

    pub fn with_config(config: CatalogueConfig) -> Self {
        let mut harness = Self {
            store: MemStore::new(),
            runtime: Runtime::new(config, StoreConfig::default()),
            timestamp: 1_650_000_000_000_000_000,
        };
        harness.call_ok("deployer", "init", json!({}));
        harness
    }

    /// Invoke `method` as `signer`; advances the block timestamp.
    pub fn call(&mut self, signer: &str, method: &str, args: Value) -> InvocationOutcome {
        self.timestamp += 1_000_000_000;
        let ctx = InvocationContext::new(signer, self.timestamp);
        let payload = serde_json::to_vec(&args).unwrap();
        self.runtime.invoke(&mut self.store, &ctx, method, &payload)
    }

    /// Invoke and assert success, returning the decoded return value.
    pub fn call_ok(&mut self, signer: &str, method: &str, args: Value) -> Value {
        let outcome = self.call(signer, method, args);
        assert!(outcome.is_ok(), "{} failed: {:?}", method, outcome.error);
        outcome.return_json().unwrap()
    }

    /// Invoke and assert failure, returning the error message.
    pub fn call_err(&mut self, signer: &str, method: &str, args: Value) -> String {
        let outcome = self.call(signer, method, args);
        assert!(!outcome.is_ok(), "{} unexpectedly succeeded", method);
        outcome.error.unwrap()
    }

    pub fn add_book(&mut self, signer: &str, isbn: &str) {
        self.call_ok(signer, "AddBook", book_args(isbn));
    }
}

/// Valid `AddBook` arguments.
pub fn book_args(isbn: &str) -> Value {
    json!({
        "isbn": isbn,
        "name": "Test",
        "description": "Description test",
        "numpage": 123,
        "author": "juan perez",
        "datepublished": "marzo 2099",
        "editions": 1,
    })
}

/// `book_args` with one field overridden.
pub fn book_args_with(field: &str, value: Value) -> Value {
    let mut args = book_args("123-4564-54-4");
    args[field] = value;
    args
}
