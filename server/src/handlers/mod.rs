pub mod availability;
pub mod calls;
pub mod connections;
pub mod messages;
pub mod notifications;
pub mod password_resets;
pub mod profiles;
pub mod sessions;
pub mod users;

use axum::http::StatusCode;
use tokio::task;
use tracing::error;

/// Runs a synchronous repository job off the async runtime and folds both
/// database and join failures into a 500.
pub(crate) async fn run_blocking<T, F>(job: F) -> Result<T, (StatusCode, String)>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match task::spawn_blocking(job).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(db_err)) => {
            error!("Database error: {}", db_err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", db_err),
            ))
        }
        Err(join_err) => {
            error!("Task join error: {}", join_err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to execute database query".to_string(),
            ))
        }
    }
}
