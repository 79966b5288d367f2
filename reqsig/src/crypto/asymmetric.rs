use super::AlgorithmName;
use crate::{
  error::{ReqSigError, ReqSigResult},
  trace::*,
};
use ecdsa::{
  elliptic_curve::{PublicKey as EcPublicKey, SecretKey as EcSecretKey},
  signature::{DigestSigner, DigestVerifier},
};
use ed25519_compact::{PublicKey as Ed25519PublicKey, SecretKey as Ed25519SecretKey};
use p256::NistP256;
use p384::NistP384;
use pkcs8::{der::Decode, Document, PrivateKeyInfo};
use rsa::{
  pkcs8::{DecodePrivateKey, DecodePublicKey},
  rand_core::OsRng,
  signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier},
  RsaPrivateKey, RsaPublicKey,
};
use sha2::{Digest, Sha256, Sha384, Sha512};
use spki::SubjectPublicKeyInfoRef;

#[allow(non_upper_case_globals, dead_code)]
/// Algorithm OIDs
mod algorithm_oids {
  /// OID for `rsaEncryption`
  pub const Rsa: &str = "1.2.840.113549.1.1.1";
  /// OID for `id-ecPublicKey`, if you're curious
  pub const EC: &str = "1.2.840.10045.2.1";
  /// OID for `id-Ed25519`, if you're curious
  pub const Ed25519: &str = "1.3.101.112";
}
#[allow(non_upper_case_globals, dead_code)]
/// Params OIDs
mod params_oids {
  // OID for the NIST P-256 elliptic curve.
  pub const Secp256r1: &str = "1.2.840.10045.3.1.7";
  // OID for the NIST P-384 elliptic curve.
  pub const Secp384r1: &str = "1.3.132.0.34";
}

/// Fails unless the algorithm requested by the caller is the one the key material is bound to
fn ensure_alg(requested: &AlgorithmName, found: AlgorithmName, err: fn(String) -> ReqSigError) -> ReqSigResult<()> {
  if *requested != found {
    return Err(err(format!("key material is for {found}, not {requested}")));
  }
  Ok(())
}

/* -------------------------------- */
/// Secret key for http signature
/// Name conventions follow [RFC 9421](https://datatracker.ietf.org/doc/html/rfc9421#section-3.3)
pub enum SecretKey {
  /// rsa-v1_5-sha256
  RsaV1_5Sha256(RsaPrivateKey),
  /// rsa-pss-sha512
  RsaPssSha512(RsaPrivateKey),
  /// ecdsa-p384-sha384
  EcdsaP384Sha384(EcSecretKey<NistP384>),
  /// ecdsa-p256-sha256
  EcdsaP256Sha256(EcSecretKey<NistP256>),
  /// ed25519
  Ed25519(Ed25519SecretKey),
}

impl SecretKey {
  /// Derive secret key from pkcs8 der bytes.
  /// RSA key material carries no hash or padding, so `alg` selects between the two RSA algorithms.
  pub fn from_der(alg: &AlgorithmName, der: &[u8]) -> ReqSigResult<Self> {
    let pki = PrivateKeyInfo::from_der(der).map_err(|e| ReqSigError::ParsePrivateKeyError(e.to_string()))?;

    match pki.algorithm.oid.to_string().as_ref() {
      // rsa
      algorithm_oids::Rsa => {
        debug!("Read RSA private key");
        let sk = RsaPrivateKey::from_pkcs8_der(der).map_err(|e| ReqSigError::ParsePrivateKeyError(e.to_string()))?;
        match alg {
          AlgorithmName::RsaV1_5Sha256 => Ok(Self::RsaV1_5Sha256(sk)),
          AlgorithmName::RsaPssSha512 => Ok(Self::RsaPssSha512(sk)),
          _ => Err(ReqSigError::ParsePrivateKeyError(format!("RSA key cannot be used for {alg}"))),
        }
      }
      // ec
      algorithm_oids::EC => {
        debug!("Read EC private key");
        let param = pki
          .algorithm
          .parameters_oid()
          .map_err(|e| ReqSigError::ParsePrivateKeyError(e.to_string()))?;
        let sk_bytes = sec1::EcPrivateKey::try_from(pki.private_key)
          .map_err(|e| ReqSigError::ParsePrivateKeyError(format!("Error decoding EcPrivateKey: {e}")))?
          .private_key;
        match param.to_string().as_ref() {
          params_oids::Secp256r1 => {
            ensure_alg(alg, AlgorithmName::EcdsaP256Sha256, ReqSigError::ParsePrivateKeyError)?;
            let sk = p256::SecretKey::from_slice(sk_bytes).map_err(|e| ReqSigError::ParsePrivateKeyError(e.to_string()))?;
            Ok(Self::EcdsaP256Sha256(sk))
          }
          params_oids::Secp384r1 => {
            ensure_alg(alg, AlgorithmName::EcdsaP384Sha384, ReqSigError::ParsePrivateKeyError)?;
            let sk = p384::SecretKey::from_slice(sk_bytes).map_err(|e| ReqSigError::ParsePrivateKeyError(e.to_string()))?;
            Ok(Self::EcdsaP384Sha384(sk))
          }
          _ => Err(ReqSigError::ParsePrivateKeyError("Unsupported curve".to_string())),
        }
      }
      // ed25519
      algorithm_oids::Ed25519 => {
        debug!("Read Ed25519 private key");
        ensure_alg(alg, AlgorithmName::Ed25519, ReqSigError::ParsePrivateKeyError)?;
        // OCTET STRING wrapping the 32 byte seed
        if pki.private_key.len() != 34 {
          return Err(ReqSigError::ParsePrivateKeyError("Invalid Ed25519 private key".to_string()));
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&pki.private_key[2..]);
        let sk = ed25519_compact::KeyPair::from_seed(ed25519_compact::Seed::new(seed)).sk;
        Ok(Self::Ed25519(sk))
      }
      _ => Err(ReqSigError::ParsePrivateKeyError(
        "Unsupported algorithm that supports PEM format keys".to_string(),
      )),
    }
  }

  /// Derive secret key from pem string
  pub fn from_pem(alg: &AlgorithmName, pem: &str) -> ReqSigResult<Self> {
    let (tag, doc) = Document::from_pem(pem).map_err(|e| ReqSigError::ParsePrivateKeyError(e.to_string()))?;
    if tag != "PRIVATE KEY" {
      return Err(ReqSigError::ParsePrivateKeyError("Invalid tag".to_string()));
    };
    Self::from_der(alg, doc.as_bytes())
  }

  /// Get public key from secret key
  pub fn public_key(&self) -> PublicKey {
    match &self {
      Self::RsaV1_5Sha256(key) => PublicKey::RsaV1_5Sha256(key.to_public_key()),
      Self::RsaPssSha512(key) => PublicKey::RsaPssSha512(key.to_public_key()),
      Self::EcdsaP256Sha256(key) => PublicKey::EcdsaP256Sha256(key.public_key()),
      Self::EcdsaP384Sha384(key) => PublicKey::EcdsaP384Sha384(key.public_key()),
      Self::Ed25519(key) => PublicKey::Ed25519(key.public_key()),
    }
  }
}

impl super::SigningKey for SecretKey {
  /// Sign data
  fn sign(&self, data: &[u8]) -> ReqSigResult<Vec<u8>> {
    match &self {
      Self::RsaV1_5Sha256(sk) => {
        let sk = rsa::pkcs1v15::SigningKey::<Sha256>::new(sk.clone());
        let sig = sk.try_sign(data).map_err(|e| ReqSigError::SigningFailure(e.to_string()))?;
        Ok(sig.to_vec())
      }
      Self::RsaPssSha512(sk) => {
        let sk = rsa::pss::BlindedSigningKey::<Sha512>::new(sk.clone());
        let sig = sk
          .try_sign_with_rng(&mut OsRng, data)
          .map_err(|e| ReqSigError::SigningFailure(e.to_string()))?;
        Ok(sig.to_vec())
      }
      Self::EcdsaP256Sha256(sk) => {
        let sk = ecdsa::SigningKey::from(sk);
        let mut digest = <Sha256 as Digest>::new();
        digest.update(data);
        let sig: ecdsa::Signature<NistP256> = sk
          .try_sign_digest(digest)
          .map_err(|e| ReqSigError::SigningFailure(e.to_string()))?;
        Ok(sig.to_bytes().to_vec())
      }
      Self::EcdsaP384Sha384(sk) => {
        let sk = ecdsa::SigningKey::from(sk);
        let mut digest = <Sha384 as Digest>::new();
        digest.update(data);
        let sig: ecdsa::Signature<NistP384> = sk
          .try_sign_digest(digest)
          .map_err(|e| ReqSigError::SigningFailure(e.to_string()))?;
        Ok(sig.to_bytes().to_vec())
      }
      Self::Ed25519(sk) => {
        let sig = sk.sign(data, Some(ed25519_compact::Noise::default()));
        Ok(sig.as_ref().to_vec())
      }
    }
  }

  fn alg(&self) -> AlgorithmName {
    use super::VerifyingKey;
    self.public_key().alg()
  }
}

impl super::VerifyingKey for SecretKey {
  fn verify(&self, data: &[u8], signature: &[u8]) -> ReqSigResult<()> {
    self.public_key().verify(data, signature)
  }

  fn alg(&self) -> AlgorithmName {
    self.public_key().alg()
  }
}

/* -------------------------------- */
/// Public key for http signature, only for asymmetric algorithm
/// Name conventions follow [RFC 9421](https://datatracker.ietf.org/doc/html/rfc9421#section-3.3)
pub enum PublicKey {
  /// rsa-v1_5-sha256
  RsaV1_5Sha256(RsaPublicKey),
  /// rsa-pss-sha512
  RsaPssSha512(RsaPublicKey),
  /// ecdsa-p256-sha256
  EcdsaP256Sha256(EcPublicKey<NistP256>),
  /// ecdsa-p384-sha384
  EcdsaP384Sha384(EcPublicKey<NistP384>),
  /// ed25519
  Ed25519(Ed25519PublicKey),
}

impl PublicKey {
  /// Derive public key from spki der bytes
  pub fn from_der(alg: &AlgorithmName, der: &[u8]) -> ReqSigResult<Self> {
    let spki_ref = SubjectPublicKeyInfoRef::from_der(der)
      .map_err(|e| ReqSigError::ParsePublicKeyError(format!("Error decoding SubjectPublicKeyInfo: {e}")))?;
    match spki_ref.algorithm.oid.to_string().as_ref() {
      // rsa
      algorithm_oids::Rsa => {
        debug!("Read RSA public key");
        let pk = RsaPublicKey::from_public_key_der(der).map_err(|e| ReqSigError::ParsePublicKeyError(e.to_string()))?;
        match alg {
          AlgorithmName::RsaV1_5Sha256 => Ok(Self::RsaV1_5Sha256(pk)),
          AlgorithmName::RsaPssSha512 => Ok(Self::RsaPssSha512(pk)),
          _ => Err(ReqSigError::ParsePublicKeyError(format!("RSA key cannot be used for {alg}"))),
        }
      }
      // ec
      algorithm_oids::EC => {
        debug!("Read EC public key");
        let param = spki_ref
          .algorithm
          .parameters_oid()
          .map_err(|e| ReqSigError::ParsePublicKeyError(e.to_string()))?;
        let public_key = spki_ref
          .subject_public_key
          .as_bytes()
          .ok_or(ReqSigError::ParsePublicKeyError("Invalid public key".to_string()))?;
        match param.to_string().as_ref() {
          params_oids::Secp256r1 => {
            ensure_alg(alg, AlgorithmName::EcdsaP256Sha256, ReqSigError::ParsePublicKeyError)?;
            let pk = EcPublicKey::<NistP256>::from_sec1_bytes(public_key)
              .map_err(|e| ReqSigError::ParsePublicKeyError(e.to_string()))?;
            Ok(Self::EcdsaP256Sha256(pk))
          }
          params_oids::Secp384r1 => {
            ensure_alg(alg, AlgorithmName::EcdsaP384Sha384, ReqSigError::ParsePublicKeyError)?;
            let pk = EcPublicKey::<NistP384>::from_sec1_bytes(public_key)
              .map_err(|e| ReqSigError::ParsePublicKeyError(e.to_string()))?;
            Ok(Self::EcdsaP384Sha384(pk))
          }
          _ => Err(ReqSigError::ParsePublicKeyError("Unsupported curve".to_string())),
        }
      }
      // ed25519
      algorithm_oids::Ed25519 => {
        debug!("Read Ed25519 public key");
        ensure_alg(alg, AlgorithmName::Ed25519, ReqSigError::ParsePublicKeyError)?;
        let public_key = spki_ref
          .subject_public_key
          .as_bytes()
          .ok_or(ReqSigError::ParsePublicKeyError("Invalid public key".to_string()))?;
        let pk =
          ed25519_compact::PublicKey::from_slice(public_key).map_err(|e| ReqSigError::ParsePublicKeyError(e.to_string()))?;
        Ok(Self::Ed25519(pk))
      }
      _ => Err(ReqSigError::ParsePublicKeyError(
        "Unsupported algorithm that supports PEM format keys".to_string(),
      )),
    }
  }

  /// Convert from pem string
  pub fn from_pem(alg: &AlgorithmName, pem: &str) -> ReqSigResult<Self> {
    let (tag, doc) = Document::from_pem(pem).map_err(|e| ReqSigError::ParsePublicKeyError(e.to_string()))?;
    if tag != "PUBLIC KEY" {
      return Err(ReqSigError::ParsePublicKeyError("Invalid tag".to_string()));
    };
    Self::from_der(alg, doc.as_bytes())
  }
}

impl super::VerifyingKey for PublicKey {
  /// Verify signature. Malformed signature bytes and bad signatures are indistinguishable to the caller.
  fn verify(&self, data: &[u8], signature: &[u8]) -> ReqSigResult<()> {
    match self {
      Self::RsaV1_5Sha256(pk) => {
        let signature = rsa::pkcs1v15::Signature::try_from(signature).map_err(|_| ReqSigError::SignatureInvalid)?;
        let vk = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(pk.clone());
        vk.verify(data, &signature).map_err(|_| ReqSigError::SignatureInvalid)
      }
      Self::RsaPssSha512(pk) => {
        let signature = rsa::pss::Signature::try_from(signature).map_err(|_| ReqSigError::SignatureInvalid)?;
        let vk = rsa::pss::VerifyingKey::<Sha512>::new(pk.clone());
        vk.verify(data, &signature).map_err(|_| ReqSigError::SignatureInvalid)
      }
      Self::EcdsaP256Sha256(pk) => {
        let signature = ecdsa::Signature::<NistP256>::from_slice(signature).map_err(|_| ReqSigError::SignatureInvalid)?;
        let vk = ecdsa::VerifyingKey::from(pk);
        let mut digest = <Sha256 as Digest>::new();
        digest.update(data);
        vk.verify_digest(digest, &signature)
          .map_err(|_| ReqSigError::SignatureInvalid)
      }
      Self::EcdsaP384Sha384(pk) => {
        let signature = ecdsa::Signature::<NistP384>::from_slice(signature).map_err(|_| ReqSigError::SignatureInvalid)?;
        let vk = ecdsa::VerifyingKey::from(pk);
        let mut digest = <Sha384 as Digest>::new();
        digest.update(data);
        vk.verify_digest(digest, &signature)
          .map_err(|_| ReqSigError::SignatureInvalid)
      }
      Self::Ed25519(pk) => {
        let sig = ed25519_compact::Signature::from_slice(signature).map_err(|_| ReqSigError::SignatureInvalid)?;
        pk.verify(data, &sig).map_err(|_| ReqSigError::SignatureInvalid)
      }
    }
  }

  /// Get the algorithm name
  fn alg(&self) -> AlgorithmName {
    match self {
      Self::RsaV1_5Sha256(_) => AlgorithmName::RsaV1_5Sha256,
      Self::RsaPssSha512(_) => AlgorithmName::RsaPssSha512,
      Self::EcdsaP256Sha256(_) => AlgorithmName::EcdsaP256Sha256,
      Self::EcdsaP384Sha384(_) => AlgorithmName::EcdsaP384Sha384,
      Self::Ed25519(_) => AlgorithmName::Ed25519,
    }
  }
}
