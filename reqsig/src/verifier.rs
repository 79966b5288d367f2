use crate::{
  clock::{Clock, SystemClock},
  content_digest,
  crypto::{AnyVerifyingKey, VerifyingKey},
  error::{ReqSigError, ReqSigResult},
  key_store::{KeyStore, KeyStoreBuilder},
  message_view::RequestView,
  signature_base::{parse_signature, parse_signature_input, HttpSignatureBase},
  trace::*,
  CONTENT_DIGEST_HEADER, SIGNATURE_HEADER, SIGNATURE_INPUT_HEADER,
};
use std::sync::Arc;

/* -------------------------------- */
/// Dynamic lookup of verifying keys that are not in the key store
pub trait VerifyingKeyResolver<K> {
  /// Resolve the key for the key id and the algorithm declared with it, if any
  fn resolve(&self, key_id: &str, declared_alg: &str) -> Option<K>;
}

impl<K, F> VerifyingKeyResolver<K> for F
where
  F: Fn(&str, &str) -> Option<K>,
{
  fn resolve(&self, key_id: &str, declared_alg: &str) -> Option<K> {
    self(key_id, declared_alg)
  }
}

/// Key chosen for verification, either borrowed from the store or handed out by the resolver
enum SelectedKey<'a, K> {
  Stored(&'a K),
  Resolved(K),
}

impl<K> SelectedKey<'_, K> {
  fn get(&self) -> &K {
    match self {
      Self::Stored(key) => key,
      Self::Resolved(key) => key,
    }
  }
}

/* -------------------------------- */
/// Verifies signed requests.
///
/// Only the first signature whose key id is known (in the store or through the resolver) is checked;
/// later signatures are never looked at, even when their key ids are known too.
pub struct Verifier<K = AnyVerifyingKey> {
  keys: KeyStore<K>,
  resolver: Option<Box<dyn VerifyingKeyResolver<K> + Send + Sync>>,
  clock: Arc<dyn Clock + Send + Sync>,
}

impl<K> Verifier<K> {
  /// Start building a verifier
  pub fn builder() -> VerifierBuilder<K> {
    VerifierBuilder::default()
  }

  pub fn keys(&self) -> &KeyStore<K> {
    &self.keys
  }
}

impl<K: VerifyingKey> Verifier<K> {
  /// Verify the signature of the request and return the key id it was made with.
  /// The Content-Digest header is not compared with the body here, see [`Verifier::verify`].
  pub fn verify_signature(&self, view: &RequestView) -> ReqSigResult<String> {
    let inputs = view.header_values(SIGNATURE_INPUT_HEADER);
    if inputs.is_empty() {
      return Err(ReqSigError::MissingSignature);
    }
    let inputs = parse_signature_input(&inputs.join(", "))?;
    if inputs.is_empty() {
      return Err(ReqSigError::MissingSignature);
    }

    let mut selected = None;
    for (label, params) in inputs.iter() {
      if let Some(key) = self.keys.get(&params.keyid) {
        selected = Some((label, params, SelectedKey::Stored(key)));
        break;
      }
      if let Some(key) = self.resolver.as_ref().and_then(|r| r.resolve(&params.keyid, &params.alg)) {
        selected = Some((label, params, SelectedKey::Resolved(key)));
        break;
      }
      debug!("Skip signature `{label}` with unknown key id");
    }
    let Some((label, params, key)) = selected else {
      debug!("No signature with a known key id");
      return Err(ReqSigError::UnknownKeyId);
    };
    let key = key.get();
    debug!("Verify signature `{label}` with key `{}`", params.keyid);

    let actual = key.alg();
    if params.alg != actual.as_str() {
      debug!("Declared algorithm does not match the key");
      return Err(ReqSigError::AlgorithmMismatch {
        declared: params.alg.clone(),
        actual: actual.to_string(),
      });
    }

    if let Err(e) = params.check_freshness(self.clock.now()) {
      debug!("Stale signature `{label}`: {e}");
      return Err(e);
    }

    let base = HttpSignatureBase::try_build(view, params)?;

    let signatures = view.header_values(SIGNATURE_HEADER);
    if signatures.is_empty() {
      return Err(ReqSigError::MissingSignature);
    }
    let signature = parse_signature(&signatures.join(", "), label)?;

    base.verify(key, &signature)?;
    Ok(params.keyid.clone())
  }

  /// Verify the signature and then, if the request carries a Content-Digest, check it against the body
  pub fn verify(&self, view: &RequestView) -> ReqSigResult<String> {
    let key_id = self.verify_signature(view)?;
    let digests = view.header_values(CONTENT_DIGEST_HEADER);
    if !digests.is_empty() && !content_digest::verify(view.body(), &digests.join(", ")) {
      debug!("Content-Digest does not match the body");
      return Err(ReqSigError::DigestMismatch);
    }
    Ok(key_id)
  }
}

/* -------------------------------- */
/// Builder of [`Verifier`]
pub struct VerifierBuilder<K> {
  keys: KeyStoreBuilder<K>,
  resolver: Option<Box<dyn VerifyingKeyResolver<K> + Send + Sync>>,
  clock: Arc<dyn Clock + Send + Sync>,
}

impl<K> Default for VerifierBuilder<K> {
  fn default() -> Self {
    Self {
      keys: KeyStore::builder(),
      resolver: None,
      clock: Arc::new(SystemClock),
    }
  }
}

impl<K> VerifierBuilder<K> {
  /// Add a verifying key under the given key id
  pub fn verifying_key(mut self, key_id: impl Into<String>, key: impl Into<K>) -> Self {
    self.keys = self.keys.add(key_id, key);
    self
  }

  /// Resolver consulted for key ids missing from the key store
  pub fn resolver(mut self, resolver: impl VerifyingKeyResolver<K> + Send + Sync + 'static) -> Self {
    self.resolver = Some(Box::new(resolver));
    self
  }

  /// Clock used for freshness checks
  pub fn clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  pub fn build(self) -> ReqSigResult<Verifier<K>> {
    let keys = self.keys.build()?;
    if keys.is_empty() && self.resolver.is_none() {
      return Err(ReqSigError::InvalidConfig(
        "at least one verifying key or a resolver is required".to_string(),
      ));
    }
    Ok(Verifier {
      keys,
      resolver: self.resolver,
      clock: self.clock,
    })
  }
}
