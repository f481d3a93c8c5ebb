use std::env;
use std::sync::Arc;
use crate::{StudentStore, Result};
use crate::engine::FileStore;
use crate::sdk::Client;

/// Environment variable naming a remote Student Store server.
pub const ADDR_ENV: &str = "STUDENT_STORE_ADDR";

/// Initializes a [`StudentStore`] based on the environment.
///
/// `new` automatically detects whether to talk to a remote server or
/// open the backing file directly:
///
/// 1. If the `STUDENT_STORE_ADDR` environment variable is set and the server
///    answers, it returns a [`Client`] in **Remote Mode**.
/// 2. Otherwise, it opens a [`FileStore`] on `data_file` in **Embedded Mode**.
///
/// # Examples
///
/// ```no_run
/// use student_store::{sdk, StudentReader};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let store = sdk::new("./students.json").await?;
///     println!("{} students", store.list().await?.len());
///     Ok(())
/// }
/// ```
pub async fn new(data_file: &str) -> Result<Arc<dyn StudentStore>> {
    if let Ok(addr) = env::var(ADDR_ENV) {
        if !addr.is_empty() {
            match Client::connect(&addr).await {
                Ok(client) => return Ok(Arc::new(client)),
                Err(e) => log::warn!("Could not reach Student Store at {}: {}. Falling back to embedded mode.", addr, e),
            }
        }
    }

    Ok(Arc::new(FileStore::open(data_file)?))
}
