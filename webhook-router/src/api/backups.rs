use super::RelayState;
use super::utils;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Serves one allow-listed export file as JSON. Every failure is a 500 that
/// carries the error message and never any file contents.
pub async fn handle(state: &RelayState, folder: &str, filename: &str) -> Response<Bytes> {
    match state.backups.load(folder, filename).await {
        Ok(value) => utils::json(StatusCode::OK, &value),
        Err(e) => {
            tracing::warn!(folder, filename, error = %e, "backup request refused");
            utils::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
