use thiserror::Error;

/// Result type for http request signature
pub type ReqSigResult<T> = std::result::Result<T, ReqSigError>;

/// Error type for http request signature
#[derive(Error, Debug)]
pub enum ReqSigError {
  #[error("Base64 decode error: {0}")]
  Base64DecodeError(#[from] base64::DecodeError),

  /* ----- Crypto errors ----- */
  /// Invalid private key for asymmetric algorithm
  #[error("Failed to parse private key: {0}")]
  ParsePrivateKeyError(String),
  /// Invalid public key for asymmetric algorithm
  #[error("Failed to parse public key: {0}")]
  ParsePublicKeyError(String),
  /// Unknown algorithm tag
  #[error("Invalid algorithm name: {0}")]
  InvalidAlgorithmName(String),
  /// Signing primitive failed
  #[error("Failed to sign: {0}")]
  SigningFailure(String),
  /// Signature did not verify. Carries no detail on purpose.
  #[error("Invalid signature")]
  SignatureInvalid,

  /* ----- Component and parameter errors ----- */
  /// Invalid component identifier
  #[error("Invalid http message component id: {0}")]
  InvalidComponentId(String),
  /// A covered component could not be resolved against the request
  #[error("Missing http message component: {0}")]
  MissingComponent(String),
  /// Invalid signature params
  #[error("Invalid signature params: {0}")]
  InvalidSignatureParams(String),

  /* ----- Header errors ----- */
  /// Structural error in signature-input, signature or content-digest
  #[error("Malformed header: {0}")]
  MalformedHeader(String),
  /// No signature descriptors or no signature for the selected label
  #[error("Missing signature")]
  MissingSignature,
  /// Content-Digest does not match the body
  #[error("Content-Digest mismatch")]
  DigestMismatch,

  /* ----- Verification state machine ----- */
  /// None of the declared key ids are known
  #[error("Unknown key id")]
  UnknownKeyId,
  /// Declared `alg` differs from the algorithm of the resolved key
  #[error("Algorithm mismatch: declared {declared}, key is {actual}")]
  AlgorithmMismatch { declared: String, actual: String },
  /// `created` is in the future
  #[error("Signature is not yet valid")]
  NotYetValid,
  /// `expires` is in the past
  #[error("Signature expired")]
  Expired,

  /* ----- Setup errors ----- */
  /// Same key id registered twice
  #[error("Duplicate key id: {0}")]
  DuplicateKeyId(String),
  /// Invalid signer or verifier configuration
  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),

  /// Failed to read the message body
  #[error("Failed to read body: {0}")]
  Io(String),
}
