//! Method dispatch for catalogue invocations.
//!
//! Each invocation runs inside a fresh `OverlayStore`. Mutating methods
//! commit the overlay only after the handler and the state save succeed;
//! everything else, including every failure, discards it. A failed
//! invocation therefore leaves the underlying store untouched.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info_span, warn};
use triekit_hostapi::{ErrorCode, InvocationContext, OverlayStore, StorageAdapter, StoreConfig};

use crate::config::CatalogueConfig;
use crate::contract::Catalogue;
use crate::error::{CatalogueError, Result};
use crate::model::{AddBookArgs, CommentArgs, IdArgs, RateArgs};

/// How a method touches the state record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reads only; the overlay is always discarded.
    View,
    /// Loads the state record, mutates it and saves it back.
    Call,
    /// Replaces the state record with a fresh one.
    Init,
}

impl Access {
    pub fn is_mutating(self) -> bool {
        !matches!(self, Access::View)
    }
}

/// Handler invoked with the loaded catalogue, the invocation's store, the
/// caller context and the raw JSON arguments.
pub type Handler =
    fn(&mut Catalogue, &mut dyn StorageAdapter, &InvocationContext, &[u8]) -> Result<Value>;

/// One row of the method table.
#[derive(Clone, Copy)]
pub struct MethodEntry {
    pub name: &'static str,
    pub access: Access,
    pub handler: Handler,
}

impl std::fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodEntry")
            .field("name", &self.name)
            .field("access", &self.access)
            .finish()
    }
}

/// Every externally callable method.
pub static METHODS: &[MethodEntry] = &[
    MethodEntry { name: "init", access: Access::Init, handler: handle_init },
    MethodEntry { name: "AddBook", access: Access::Call, handler: handle_add_book },
    MethodEntry { name: "getBooks", access: Access::View, handler: handle_get_books },
    MethodEntry { name: "getBook", access: Access::View, handler: handle_get_book },
    MethodEntry { name: "getNBooks", access: Access::View, handler: handle_get_n_books },
    MethodEntry { name: "rate", access: Access::Call, handler: handle_rate },
    MethodEntry { name: "getRateBook", access: Access::View, handler: handle_get_rate_book },
    MethodEntry { name: "comment", access: Access::Call, handler: handle_comment },
    MethodEntry { name: "getComments", access: Access::View, handler: handle_get_comments },
    MethodEntry { name: "removeComment", access: Access::Call, handler: handle_remove_comment },
];

/// Find a method by its external name.
pub fn lookup_method(name: &str) -> Option<&'static MethodEntry> {
    METHODS.iter().find(|entry| entry.name == name)
}

/// Decode JSON arguments; an empty payload reads as `{}`.
pub fn decode_args<T: DeserializeOwned>(args: &[u8]) -> Result<T> {
    if args.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(args)?)
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn handle_init(_: &mut Catalogue, _: &mut dyn StorageAdapter, _: &InvocationContext, _: &[u8]) -> Result<Value> {
    Ok(Value::Null)
}

fn handle_add_book(
    catalogue: &mut Catalogue,
    store: &mut dyn StorageAdapter,
    ctx: &InvocationContext,
    args: &[u8],
) -> Result<Value> {
    let args: AddBookArgs = decode_args(args)?;
    catalogue.add_book(store, ctx, args)?;
    Ok(Value::Null)
}

fn handle_get_books(
    catalogue: &mut Catalogue,
    store: &mut dyn StorageAdapter,
    _: &InvocationContext,
    _: &[u8],
) -> Result<Value> {
    to_value(catalogue.books(&*store)?)
}

fn handle_get_book(
    catalogue: &mut Catalogue,
    store: &mut dyn StorageAdapter,
    _: &InvocationContext,
    args: &[u8],
) -> Result<Value> {
    let IdArgs { id } = decode_args(args)?;
    to_value(catalogue.book(&*store, id)?)
}

fn handle_get_n_books(
    catalogue: &mut Catalogue,
    _: &mut dyn StorageAdapter,
    _: &InvocationContext,
    _: &[u8],
) -> Result<Value> {
    to_value(catalogue.book_count())
}

fn handle_rate(
    catalogue: &mut Catalogue,
    store: &mut dyn StorageAdapter,
    ctx: &InvocationContext,
    args: &[u8],
) -> Result<Value> {
    let RateArgs { id, valor } = decode_args(args)?;
    to_value(catalogue.rate(store, ctx, id, valor)?)
}

fn handle_get_rate_book(
    catalogue: &mut Catalogue,
    store: &mut dyn StorageAdapter,
    _: &InvocationContext,
    args: &[u8],
) -> Result<Value> {
    let IdArgs { id } = decode_args(args)?;
    to_value(catalogue.ratings(&*store, id)?)
}

fn handle_comment(
    catalogue: &mut Catalogue,
    store: &mut dyn StorageAdapter,
    ctx: &InvocationContext,
    args: &[u8],
) -> Result<Value> {
    let CommentArgs { id, text } = decode_args(args)?;
    to_value(catalogue.comment(store, ctx, id, text)?)
}

fn handle_get_comments(
    catalogue: &mut Catalogue,
    store: &mut dyn StorageAdapter,
    _: &InvocationContext,
    args: &[u8],
) -> Result<Value> {
    let IdArgs { id } = decode_args(args)?;
    to_value(catalogue.comments(&*store, id)?)
}

fn handle_remove_comment(
    catalogue: &mut Catalogue,
    store: &mut dyn StorageAdapter,
    ctx: &InvocationContext,
    args: &[u8],
) -> Result<Value> {
    let IdArgs { id } = decode_args(args)?;
    to_value(catalogue.remove_comment(store, ctx, id)?)
}

/// Outcome status of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Ok,
    Failed,
}

/// Result of one invocation as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutcome {
    pub status: OutcomeStatus,
    /// JSON-encoded return value; `null` for methods without one.
    pub return_data: Vec<u8>,
    /// Error message when `status` is `Failed`.
    pub error: Option<String>,
    pub error_code: ErrorCode,
}

impl InvocationOutcome {
    fn success(return_data: Vec<u8>) -> Self {
        Self {
            status: OutcomeStatus::Ok,
            return_data,
            error: None,
            error_code: ErrorCode::Ok,
        }
    }

    fn failure(err: &CatalogueError) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            return_data: Vec::new(),
            error: Some(err.to_string()),
            error_code: err.code(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OutcomeStatus::Ok
    }

    /// Decode the return data.
    pub fn return_json(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.return_data)
    }
}

/// Runs catalogue methods against a store.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    config: CatalogueConfig,
    store_config: StoreConfig,
}

impl Runtime {
    pub fn new(config: CatalogueConfig, store_config: StoreConfig) -> Self {
        Self {
            config,
            store_config,
        }
    }

    pub fn config(&self) -> &CatalogueConfig {
        &self.config
    }

    /// Invoke `method` with JSON `args` on behalf of `ctx`.
    pub fn invoke<S>(
        &self,
        store: &mut S,
        ctx: &InvocationContext,
        method: &str,
        args: &[u8],
    ) -> InvocationOutcome
    where
        S: StorageAdapter + ?Sized,
    {
        let span = info_span!("invoke", method, signer = %ctx.signer_account_id);
        let _enter = span.enter();

        let result = self.run(store, ctx, method, args);
        match result {
            Ok(return_data) => InvocationOutcome::success(return_data),
            Err(err) => {
                warn!(error = %err, code = %err.code(), "invocation failed");
                InvocationOutcome::failure(&err)
            }
        }
    }

    fn run<S>(
        &self,
        store: &mut S,
        ctx: &InvocationContext,
        method: &str,
        args: &[u8],
    ) -> Result<Vec<u8>>
    where
        S: StorageAdapter + ?Sized,
    {
        let entry =
            lookup_method(method).ok_or_else(|| CatalogueError::UnknownMethod(method.to_string()))?;

        let mut overlay = OverlayStore::with_config(store, self.store_config.clone());
        let executed = self.execute(entry, &mut overlay, ctx, args);

        match executed {
            Ok(value) if entry.access.is_mutating() => {
                let applied = overlay.commit()?;
                debug!(applied, "overlay committed");
                Ok(serde_json::to_vec(&value)?)
            }
            Ok(value) => {
                overlay.discard();
                Ok(serde_json::to_vec(&value)?)
            }
            Err(err) => {
                overlay.discard();
                Err(err)
            }
        }
    }

    fn execute(
        &self,
        entry: &MethodEntry,
        store: &mut dyn StorageAdapter,
        ctx: &InvocationContext,
        args: &[u8],
    ) -> Result<Value> {
        let mut catalogue = match entry.access {
            Access::Init => Catalogue::new(self.config.clone()),
            Access::View | Access::Call => Catalogue::load(&*store, self.config.clone())?,
        };
        let value = (entry.handler)(&mut catalogue, store, ctx, args)?;
        if entry.access.is_mutating() {
            catalogue.save(store)?;
        }
        Ok(value)
    }
}
