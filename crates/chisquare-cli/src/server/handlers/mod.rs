//! API request handlers.

mod columns;

pub use columns::*;
pub use test::*;

use chisquare::ChiSquareError;

use crate::server::error::ApiError;

/// Run parsing and testing on the blocking pool so large uploads don't hold
/// up the async workers.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ChiSquareError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}

/// Reject empty uploads before parsing.
fn require_body(body: &[u8]) -> Result<(), ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::BadRequest(
            "Request body must contain CSV data".to_string(),
        ));
    }
    Ok(())
}
