//! Application assembly.

use axum::Router;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::error::Result;

/// Connect the database and build the router.
///
/// The database manager inside `state` is connected before any route is
/// served; callers own its teardown.
pub async fn create_app(state: AppState) -> Result<Router> {
    state.database.connect().await?;
    info!(
        "({}) Database Connected 🚀...",
        state.database.database_name()
    );

    Ok(create_router(state))
}
