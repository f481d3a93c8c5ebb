/// Software Development Kit (SDK) for the Student Store.
///
/// This module provides a high-level API for working with the store, including
/// automatic mode discovery and a remote HTTP client.
pub mod client;
/// Automatic mode discovery and store initialization.
pub mod discovery;

pub use client::Client;
pub use discovery::new;
