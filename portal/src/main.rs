// portal/src/main.rs
use std::io;
use std::sync::Arc;

use common::{setup_tracing, Config};
use portal::api::ApiClient;
use portal::session::SessionManager;
use portal::store::SessionStore;

#[tokio::main]
async fn main() -> io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration
    let config = Config::from_env();

    tracing::info!("Portal session core starting against {}", config.api_base_url);

    let api = ApiClient::new(&config.api_base_url)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let store = SessionStore::new(&config.storage_dir);
    let mut session = SessionManager::new(Arc::new(api), store);

    // Restore any persisted session before the UI takes over
    session.hydrate();

    match session.user() {
        Some(identity) => {
            tracing::info!(
                "Restored session for {} ({})",
                identity.username,
                identity.role
            );
        }
        None => tracing::info!("No persisted session; starting logged out"),
    }

    Ok(())
}
