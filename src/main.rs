//! MyUI API Server
//!
//! Run with: cargo run --bin myui
//!
//! Configuration is read from `MYUI_CONFIG`, the default config locations
//! and `MYUI_*` environment variables; see `myui-cli init-config`.

use myui::api::{serve, AppState};
use myui::config::Config;
use myui::graphql::HasuraClient;
use myui::shell::ShellServices;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    myui::logging::init(&config.logging);

    tracing::info!("Starting MyUI server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("GraphQL endpoint: {}", config.graphql.endpoint);
    if config.graphql.admin_secret.is_none() {
        tracing::warn!("No GraphQL admin secret configured");
    }

    let transport = Arc::new(HasuraClient::new(config.graphql.to_hasura())?);
    let mut options = config.ui.to_shell_options();
    options.flush_timeout = config.api.flush_timeout();
    let services = ShellServices::new(transport, options);

    match services.schema.list_base_tables().await {
        Ok(tables) => tracing::info!("GraphQL endpoint reachable, {} base tables", tables.len()),
        Err(e) => tracing::warn!("GraphQL endpoint not reachable yet: {}", e),
    }

    let state = AppState::new(services, config.api.clone());
    serve(state, &config.api).await?;

    Ok(())
}
