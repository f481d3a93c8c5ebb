pub mod filestore;
pub mod persistence;

pub use filestore::FileStore;
pub use persistence::Persistence;
