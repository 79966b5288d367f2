use super::{AlgorithmName, SigningKey};
use crate::error::ReqSigResult;
use base64::{engine::general_purpose, Engine as _};
use rand::Rng;

/// Length of generated nonces in bytes before base64 encoding
const NONCE_LEN: usize = 32;

/// Signing key wrapper that supplies a fresh random nonce for every signature
pub struct RandomNonce<K>(pub K);

impl<K> RandomNonce<K> {
  pub fn new(key: K) -> Self {
    Self(key)
  }
}

impl<K: SigningKey> SigningKey for RandomNonce<K> {
  fn sign(&self, data: &[u8]) -> ReqSigResult<Vec<u8>> {
    self.0.sign(data)
  }

  fn alg(&self) -> AlgorithmName {
    self.0.alg()
  }

  fn nonce(&self) -> Option<String> {
    let nonce = rand::rng().random::<[u8; NONCE_LEN]>();
    Some(general_purpose::STANDARD.encode(nonce))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::crypto::SharedKey;

  #[test]
  fn test_random_nonce() {
    let key = RandomNonce::new(SharedKey::from_bytes(b"secret"));
    assert_eq!(key.alg(), AlgorithmName::HmacSha256);

    let first = key.nonce().unwrap();
    let second = key.nonce().unwrap();
    assert_ne!(first, second);
    assert_eq!(general_purpose::STANDARD.decode(first).unwrap().len(), NONCE_LEN);
  }
}
