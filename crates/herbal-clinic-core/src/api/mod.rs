//! REST client for the clinic backend.
//!
//! The core never opens sockets itself: a host-provided [`Transport`]
//! performs each [`ApiRequest`], and [`ClinicClient`] maps endpoints,
//! status codes and bodies.

mod client;
mod transport;

pub use client::*;
pub use transport::*;

use thiserror::Error;

/// API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 401: the access token is missing, invalid or expired
    #[error("Unauthorized")]
    Unauthorized,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
