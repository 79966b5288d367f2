use super::AlgorithmName;
use crate::error::{ReqSigError, ReqSigResult};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};

type HmacSha256 = Hmac<sha2::Sha256>;

/* -------------------------------- */
#[derive(Clone)]
/// Shared key for http signature, usable both for signing and verifying
/// Name conventions follow [RFC 9421](https://datatracker.ietf.org/doc/html/rfc9421#section-3.3)
pub enum SharedKey {
  /// hmac-sha256
  HmacSha256(Vec<u8>),
}

impl SharedKey {
  /// Create a new shared key from base64 encoded string
  pub fn from_base64(key: &str) -> ReqSigResult<Self> {
    let key = general_purpose::STANDARD.decode(key)?;
    Ok(SharedKey::HmacSha256(key))
  }

  /// Create a new shared key from raw secret bytes
  pub fn from_bytes(key: &[u8]) -> Self {
    SharedKey::HmacSha256(key.to_vec())
  }

  fn mac(&self) -> ReqSigResult<HmacSha256> {
    match self {
      SharedKey::HmacSha256(key) => {
        HmacSha256::new_from_slice(key).map_err(|e| ReqSigError::SigningFailure(e.to_string()))
      }
    }
  }
}

impl super::SigningKey for SharedKey {
  /// Sign the data
  fn sign(&self, data: &[u8]) -> ReqSigResult<Vec<u8>> {
    let mut mac = self.mac()?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
  }

  /// Get the algorithm name
  fn alg(&self) -> AlgorithmName {
    use super::VerifyingKey;
    <Self as VerifyingKey>::alg(self)
  }
}

impl super::VerifyingKey for SharedKey {
  /// Verify the mac in constant time
  fn verify(&self, data: &[u8], expected_mac: &[u8]) -> ReqSigResult<()> {
    let mut mac = self.mac().map_err(|_| ReqSigError::SignatureInvalid)?;
    mac.update(data);
    mac.verify_slice(expected_mac).map_err(|_| ReqSigError::SignatureInvalid)
  }

  /// Get the algorithm name
  fn alg(&self) -> AlgorithmName {
    match self {
      SharedKey::HmacSha256(_) => AlgorithmName::HmacSha256,
    }
  }
}
