//! Failures turned into `500` responses.

use thiserror::Error;

use crate::codec::SetConfigError;
use crate::dispatch::DispatchError;

/// Errors raised while building a response.
#[derive(Debug, Error)]
pub(crate) enum RequestError {
    /// The host loop did not run the request's job.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// The configuration write could not be decoded.
    #[error(transparent)]
    SetConfig(#[from] SetConfigError),
    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[from] hyper::Error),
}
