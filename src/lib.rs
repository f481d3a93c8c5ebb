//! Student Store is a small CRUD service for student records kept in a single JSON file.
//!
//! Every operation loads the whole collection from disk, works on it in memory and,
//! for mutations, rewrites the whole file. Reads and writes of the file are serialized
//! by one lock owned by the store.
//!
//! ## Core Components
//! - [`engine`]: The file-backed store and its persistence handler.
//! - [`model`]: The [`Student`] record and the [`StudentFields`] input.
//! - [`sdk`]: Remote HTTP client and embedded/remote discovery.
//! - [`server`]: HTTP API and static frontend.

pub mod engine;
pub mod model;
pub mod sdk;
pub mod server;

pub use model::{Student, StudentFields};

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by the Student Store.
#[derive(Error, Debug)]
pub enum Error {
    /// A required field (`id` or `name`) is missing or blank.
    #[error("{0}")]
    Validation(String),
    /// A record with this id already exists.
    #[error("student ID already exists: {0}")]
    Conflict(String),
    /// No record with this id exists.
    #[error("student not found: {0}")]
    NotFound(String),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred while writing the backing file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Transport error talking to a remote store.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized Result type for Student Store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Read access to the student collection.
#[async_trait]
pub trait StudentReader: Send + Sync {
    /// Returns every record in insertion order.
    async fn list(&self) -> Result<Vec<Student>>;
    /// Returns the record with the given id.
    async fn get(&self, id: &str) -> Result<Student>;
}

/// Mutations of the student collection.
#[async_trait]
pub trait StudentWriter: Send + Sync {
    /// Validates and appends a new record.
    async fn create(&self, fields: StudentFields) -> Result<Student>;
    /// Replaces the supplied mutable fields of an existing record.
    async fn update(&self, id: &str, fields: StudentFields) -> Result<Student>;
    /// Removes a record and returns it.
    async fn delete(&self, id: &str) -> Result<Student>;
}

/// The primary interface for interacting with a Student Store, local or remote.
pub trait StudentStore: StudentReader + StudentWriter {}

impl<T: StudentReader + StudentWriter> StudentStore for T {}
