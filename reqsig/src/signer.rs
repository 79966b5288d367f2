use crate::{
  clock::{Clock, SystemClock},
  content_digest,
  crypto::{AnySigningKey, SigningKey},
  error::{ReqSigError, ReqSigResult},
  key_store::{KeyStore, KeyStoreBuilder},
  message_component::HttpMessageComponentId,
  message_view::RequestView,
  signature_base::{with_fixed_head, HttpSignatureBase, HttpSignatureHeaders},
  signature_params::HttpSignatureParams,
  trace::*,
  util::{is_sf_key, is_sf_string},
  CONTENT_DIGEST_HEADER, SIGNATURE_HEADER, SIGNATURE_INPUT_HEADER,
};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Headers covered after the fixed head when none are configured
pub const DEFAULT_COVERED_HEADERS: [&str; 2] = ["content-type", "content-length"];

/* -------------------------------- */
/// Signs requests with every key of its key store.
///
/// Each signature covers `content-digest`, `@query`, `@path` and `@method`, followed by the configured headers
/// that are present on the request.
pub struct Signer<K = AnySigningKey> {
  covered_headers: Vec<HttpMessageComponentId>,
  keys: KeyStore<K>,
  expires_in: Option<u64>,
  clock: Arc<dyn Clock + Send + Sync>,
}

impl<K> Signer<K> {
  /// Start building a signer
  pub fn builder() -> SignerBuilder<K> {
    SignerBuilder::default()
  }

  pub fn keys(&self) -> &KeyStore<K> {
    &self.keys
  }
}

impl<K: SigningKey> Signer<K> {
  /// Produce the Content-Digest and one labeled signature per key, in key store order.
  /// Nothing is returned unless every key signed successfully.
  pub fn sign(&self, view: &RequestView) -> ReqSigResult<SignedHeaders> {
    let content_digest = content_digest::compute(view.body());
    let mut working = view.clone();
    working.set_header(CONTENT_DIGEST_HEADER, content_digest.as_str());

    let present = self
      .covered_headers
      .iter()
      .filter(|id| working.has_header(id.name()))
      .cloned()
      .collect::<Vec<_>>();
    let covered = with_fixed_head(&present);
    let created = self.clock.now();

    let mut used_labels = FxHashSet::default();
    let mut entries = Vec::with_capacity(self.keys.len());
    for (index, (key_id, key)) in self.keys.iter().enumerate() {
      let alg = key.alg();
      let mut params = HttpSignatureParams::try_new(&covered, created, &alg, key_id)?;
      if let Some(secs) = self.expires_in {
        params.set_expires_with_duration(secs);
      }
      if let Some(nonce) = key.nonce() {
        params.set_nonce(&nonce)?;
      }
      let base = HttpSignatureBase::try_build(&working, &params)?;
      let label = choose_label(key_id, index, &mut used_labels);
      debug!("Sign request with key `{key_id}` ({alg}) as `{label}`");
      entries.push(base.build_signature_headers(key, &label)?);
    }

    Ok(SignedHeaders { content_digest, entries })
  }

  /// Sign and write the resulting headers onto the request. The request is left untouched on failure.
  pub fn sign_request(&self, view: &mut RequestView) -> ReqSigResult<()> {
    let signed = self.sign(view)?;
    signed.apply_to(view);
    Ok(())
  }
}

/// Label is the key id when it is a usable dictionary key not taken yet, otherwise `sig<N>`
fn choose_label(key_id: &str, index: usize, used: &mut FxHashSet<String>) -> String {
  if is_sf_key(key_id) && used.insert(key_id.to_string()) {
    return key_id.to_string();
  }
  let mut n = index + 1;
  loop {
    let label = format!("sig{n}");
    if used.insert(label.clone()) {
      return label;
    }
    n += 1;
  }
}

/* -------------------------------- */
#[derive(Debug, Clone)]
/// Header values produced by one signing call
pub struct SignedHeaders {
  content_digest: String,
  entries: Vec<HttpSignatureHeaders>,
}

impl SignedHeaders {
  /// Content-Digest header value
  pub fn content_digest(&self) -> &str {
    &self.content_digest
  }

  /// Labeled signatures in key store order
  pub fn entries(&self) -> &[HttpSignatureHeaders] {
    &self.entries
  }

  /// Signature-Input header value
  pub fn signature_input(&self) -> String {
    self
      .entries
      .iter()
      .map(|e| e.signature_input_header_value())
      .collect::<Vec<_>>()
      .join(", ")
  }

  /// Signature header value
  pub fn signature(&self) -> String {
    self
      .entries
      .iter()
      .map(|e| e.signature_header_value())
      .collect::<Vec<_>>()
      .join(", ")
  }

  /// Replace Content-Digest, Signature-Input and Signature on the request
  pub fn apply_to(&self, view: &mut RequestView) {
    view.set_header(CONTENT_DIGEST_HEADER, self.content_digest.as_str());
    view.set_header(SIGNATURE_INPUT_HEADER, self.signature_input());
    view.set_header(SIGNATURE_HEADER, self.signature());
  }
}

/* -------------------------------- */
/// Builder of [`Signer`]
pub struct SignerBuilder<K> {
  covered_headers: Option<Vec<String>>,
  keys: KeyStoreBuilder<K>,
  expires_in: Option<u64>,
  clock: Arc<dyn Clock + Send + Sync>,
}

impl<K> Default for SignerBuilder<K> {
  fn default() -> Self {
    Self {
      covered_headers: None,
      keys: KeyStore::builder(),
      expires_in: None,
      clock: Arc::new(SystemClock),
    }
  }
}

impl<K> SignerBuilder<K> {
  /// Header names to cover after the fixed head. An empty list falls back to the defaults.
  pub fn covered_headers<I, S>(mut self, headers: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    self.covered_headers = Some(headers.into_iter().map(|h| h.as_ref().to_string()).collect());
    self
  }

  /// Add a signing key under the given key id
  pub fn signing_key(mut self, key_id: impl Into<String>, key: impl Into<K>) -> Self {
    self.keys = self.keys.add(key_id, key);
    self
  }

  /// Emit `expires` this many seconds after `created`
  pub fn expires_in(mut self, secs: u64) -> Self {
    self.expires_in = Some(secs);
    self
  }

  /// Clock used for `created`
  pub fn clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  pub fn build(self) -> ReqSigResult<Signer<K>> {
    let keys = self.keys.build()?;
    if keys.is_empty() {
      return Err(ReqSigError::InvalidConfig("at least one signing key is required".to_string()));
    }
    if let Some(key_id) = keys.key_ids().find(|id| !is_sf_string(id)) {
      return Err(ReqSigError::InvalidConfig(format!(
        "key id must be printable ASCII: {key_id:?}"
      )));
    }

    let names = match self.covered_headers {
      Some(headers) if !headers.is_empty() => headers,
      _ => DEFAULT_COVERED_HEADERS.iter().map(|h| h.to_string()).collect(),
    };
    let mut covered_headers = Vec::with_capacity(names.len());
    for name in names {
      let id = HttpMessageComponentId::header(&name)?;
      if !covered_headers.contains(&id) {
        covered_headers.push(id);
      }
    }

    Ok(Signer {
      covered_headers,
      keys,
      expires_in: self.expires_in,
      clock: self.clock,
    })
  }
}
