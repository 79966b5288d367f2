use reqsig::prelude::ReqSigError;
use thiserror::Error;

/// Result type for http signature
pub type HyperSigResult<T> = std::result::Result<T, HyperSigError>;

/// Error type for http signature for hyper
#[derive(Error, Debug)]
pub enum HyperSigError {
  /// No signature headers found
  #[error("No signature headers found: {0}")]
  NoSignatureHeaders(String),

  /// Failed to parse signature headers
  #[error("Failed to stringify header value: {0}")]
  FailedToStrHeader(#[from] http::header::ToStrError),

  /// Failed to parse header value
  #[error("Failed to parse header value: {0}")]
  InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

  /// Inherited from ReqSigError
  #[error("ReqSigError: {0}")]
  ReqSigError(#[from] ReqSigError),
}
