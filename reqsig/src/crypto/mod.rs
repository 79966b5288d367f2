mod asymmetric;
mod nonce;
mod symmetric;

use crate::error::{ReqSigError, ReqSigResult};

pub use asymmetric::{PublicKey, SecretKey};
pub use nonce::RandomNonce;
pub use symmetric::SharedKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Algorithm names
pub enum AlgorithmName {
  RsaV1_5Sha256,
  RsaPssSha512,
  EcdsaP256Sha256,
  EcdsaP384Sha384,
  Ed25519,
  HmacSha256,
}

impl AlgorithmName {
  pub fn as_str(&self) -> &'static str {
    match self {
      AlgorithmName::RsaV1_5Sha256 => "rsa-v1_5-sha256",
      AlgorithmName::RsaPssSha512 => "rsa-pss-sha512",
      AlgorithmName::EcdsaP256Sha256 => "ecdsa-p256-sha256",
      AlgorithmName::EcdsaP384Sha384 => "ecdsa-p384-sha384",
      AlgorithmName::Ed25519 => "ed25519",
      AlgorithmName::HmacSha256 => "hmac-sha256",
    }
  }
}

impl std::fmt::Display for AlgorithmName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl core::str::FromStr for AlgorithmName {
  type Err = ReqSigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "rsa-v1_5-sha256" => Ok(Self::RsaV1_5Sha256),
      "rsa-pss-sha512" => Ok(Self::RsaPssSha512),
      "ecdsa-p256-sha256" => Ok(Self::EcdsaP256Sha256),
      "ecdsa-p384-sha384" => Ok(Self::EcdsaP384Sha384),
      "ed25519" => Ok(Self::Ed25519),
      "hmac-sha256" => Ok(Self::HmacSha256),
      _ => Err(ReqSigError::InvalidAlgorithmName(s.to_string())),
    }
  }
}

/// SigningKey trait
///
/// Implemented by [`SecretKey`], [`SharedKey`], [`AnySigningKey`] and [`RandomNonce`].
pub trait SigningKey {
  /// Sign the data. Fails with `SigningFailure` when the primitive fails.
  fn sign(&self, data: &[u8]) -> ReqSigResult<Vec<u8>>;
  /// Algorithm this key is bound to
  fn alg(&self) -> AlgorithmName;
  /// Nonce to embed in the signature params, if the key supplies one
  fn nonce(&self) -> Option<String> {
    None
  }
}

/// VerifyingKey trait
///
/// Implemented by [`PublicKey`], [`SecretKey`], [`SharedKey`] and [`AnyVerifyingKey`].
pub trait VerifyingKey {
  /// Verify the signature. Every failure is reported as `SignatureInvalid`.
  fn verify(&self, data: &[u8], signature: &[u8]) -> ReqSigResult<()>;
  /// Algorithm this key is bound to
  fn alg(&self) -> AlgorithmName;
}

/* -------------------------------- */
/// Any signing key supported by the signer, so that a single key store can mix algorithms
pub enum AnySigningKey {
  /// rsa, ecdsa or ed25519 private key
  Secret(SecretKey),
  /// hmac shared secret
  Shared(SharedKey),
}

impl From<SecretKey> for AnySigningKey {
  fn from(key: SecretKey) -> Self {
    Self::Secret(key)
  }
}

impl From<SharedKey> for AnySigningKey {
  fn from(key: SharedKey) -> Self {
    Self::Shared(key)
  }
}

impl SigningKey for AnySigningKey {
  fn sign(&self, data: &[u8]) -> ReqSigResult<Vec<u8>> {
    match self {
      Self::Secret(key) => key.sign(data),
      Self::Shared(key) => SigningKey::sign(key, data),
    }
  }

  fn alg(&self) -> AlgorithmName {
    match self {
      Self::Secret(key) => SigningKey::alg(key),
      Self::Shared(key) => SigningKey::alg(key),
    }
  }
}

/// Any verifying key supported by the verifier
pub enum AnyVerifyingKey {
  /// rsa, ecdsa or ed25519 public key
  Public(PublicKey),
  /// hmac shared secret
  Shared(SharedKey),
}

impl From<PublicKey> for AnyVerifyingKey {
  fn from(key: PublicKey) -> Self {
    Self::Public(key)
  }
}

impl From<SharedKey> for AnyVerifyingKey {
  fn from(key: SharedKey) -> Self {
    Self::Shared(key)
  }
}

impl VerifyingKey for AnyVerifyingKey {
  fn verify(&self, data: &[u8], signature: &[u8]) -> ReqSigResult<()> {
    match self {
      Self::Public(key) => key.verify(data, signature),
      Self::Shared(key) => VerifyingKey::verify(key, data, signature),
    }
  }

  fn alg(&self) -> AlgorithmName {
    match self {
      Self::Public(key) => key.alg(),
      Self::Shared(key) => VerifyingKey::alg(key),
    }
  }
}
