use std::sync::Arc;

use anyhow::Context;
use axum::serve;
use notebase::config::ServiceConfig;
use notebase::store::{SharedNoteStore, SqliteNoteStore};
use notebase::{db, logging, routes};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ServiceConfig::default();

    let pool = db::initialize(&config.database_path)
        .await
        .with_context(|| {
            format!(
                "failed to initialize storage at {}",
                config.database_path.display()
            )
        })?;
    let store: SharedNoteStore = Arc::new(SqliteNoteStore::new(pool));

    let app = routes::create_router(store);

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "Listening");

    serve(listener, app).await?;

    Ok(())
}
