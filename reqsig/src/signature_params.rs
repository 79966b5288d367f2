use crate::{
  crypto::AlgorithmName,
  error::{ReqSigError, ReqSigResult},
  message_component::HttpMessageComponentId,
  trace::*,
  util::{has_unique_elements, is_sf_string},
};
use sfv::{ListEntry, Parser, SerializeValue};
use std::borrow::Cow;

/* ---------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Struct defining Http message signature parameters
/// https://datatracker.ietf.org/doc/html/rfc9421#name-signature-parameters
///
/// `Display` always writes the canonical order. Params read from a Signature-Input header also keep
/// the serialization they arrived with, which is what their signature base is built from.
pub struct HttpSignatureParams {
  /// created unix timestamp.
  pub created: u64,
  /// signature expires unix timestamp.
  pub expires: Option<u64>,
  /// nonce
  pub nonce: Option<String>,
  /// algorithm name as declared. Kept as a string since a received one may name an unsupported algorithm.
  pub alg: String,
  /// key id.
  pub keyid: String,
  /// ordered message components, i.e., http fields and derived components
  pub covered_components: Vec<HttpMessageComponentId>,
  /// serialization as received, parameter order and unknown parameters included. Cleared by the setters.
  received: Option<String>,
}

impl HttpSignatureParams {
  /// Create new HttpSignatureParams object for the given covered components and mandatory fields.
  pub fn try_new(
    covered_components: &[HttpMessageComponentId],
    created: u64,
    alg: &AlgorithmName,
    keyid: &str,
  ) -> ReqSigResult<Self> {
    if !has_unique_elements(covered_components.iter()) {
      return Err(ReqSigError::InvalidSignatureParams(
        "duplicate covered component ids".to_string(),
      ));
    }
    if keyid.is_empty() || !is_sf_string(keyid) {
      return Err(ReqSigError::InvalidSignatureParams(format!("invalid keyid: {keyid:?}")));
    }

    Ok(Self {
      created,
      expires: None,
      nonce: None,
      alg: alg.to_string(),
      keyid: keyid.to_string(),
      covered_components: covered_components.to_vec(),
      received: None,
    })
  }

  /// Set `expires` timestamp
  pub fn set_expires(&mut self, expires: u64) -> &mut Self {
    self.expires = Some(expires);
    self.received = None;
    self
  }

  /// Set `expires` timestamp `duration_secs` after `created`
  pub fn set_expires_with_duration(&mut self, duration_secs: u64) -> &mut Self {
    self.expires = Some(self.created.saturating_add(duration_secs));
    self.received = None;
    self
  }

  /// Set `nonce`. It must be serializable as a structured field string.
  pub fn set_nonce(&mut self, nonce: &str) -> ReqSigResult<&mut Self> {
    if !is_sf_string(nonce) {
      return Err(ReqSigError::InvalidSignatureParams("invalid nonce".to_string()));
    }
    self.nonce = Some(nonce.to_string());
    self.received = None;
    Ok(self)
  }

  /// Value of the `"@signature-params"` line of the signature base
  pub fn signature_base_value(&self) -> Cow<'_, str> {
    match &self.received {
      Some(received) => Cow::Borrowed(received),
      None => Cow::Owned(self.to_string()),
    }
  }

  /// Declared algorithm, if it is one of the supported ones
  pub fn declared_alg(&self) -> Option<AlgorithmName> {
    self.alg.parse().ok()
  }

  /// Check `created` and `expires` against the current unix timestamp. Both boundaries are inclusive.
  pub fn check_freshness(&self, now: u64) -> ReqSigResult<()> {
    if now < self.created {
      return Err(ReqSigError::NotYetValid);
    }
    if self.expires.is_some_and(|exp| now > exp) {
      return Err(ReqSigError::Expired);
    }
    Ok(())
  }
}

/// Serialize as a structured field string
fn quote(val: &str) -> String {
  format!("\"{}\"", val.replace('\\', "\\\\").replace('"', "\\\""))
}

impl std::fmt::Display for HttpSignatureParams {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let joined = self
      .covered_components
      .iter()
      .map(|v| v.to_string())
      .collect::<Vec<_>>()
      .join(" ");
    write!(f, "({joined});created={}", self.created)?;
    if let Some(expires) = self.expires {
      write!(f, ";expires={expires}")?;
    }
    if let Some(nonce) = &self.nonce {
      write!(f, ";nonce={}", quote(nonce))?;
    }
    write!(f, ";alg={};keyid={}", quote(&self.alg), quote(&self.keyid))
  }
}

fn malformed(msg: impl std::fmt::Display) -> ReqSigError {
  ReqSigError::MalformedHeader(msg.to_string())
}

/// Read a non-negative integer parameter
fn as_timestamp(key: &str, value: &sfv::BareItem) -> ReqSigResult<u64> {
  value
    .as_int()
    .and_then(|v| u64::try_from(v).ok())
    .ok_or_else(|| malformed(format!("`{key}` must be a non-negative integer")))
}

/// Read a string parameter
fn as_string(key: &str, value: &sfv::BareItem) -> ReqSigResult<String> {
  value
    .as_str()
    .map(|v| v.to_string())
    .ok_or_else(|| malformed(format!("`{key}` must be a string")))
}

impl TryFrom<&ListEntry> for HttpSignatureParams {
  type Error = ReqSigError;
  /// Convert from ListEntry to HttpSignatureParams
  fn try_from(value: &ListEntry) -> ReqSigResult<Self> {
    let ListEntry::InnerList(inner_list_with_params) = value else {
      return Err(malformed("signature params must be an inner list"));
    };
    let covered_components = inner_list_with_params
      .items
      .iter()
      .map(|v| HttpMessageComponentId::try_from(v).map_err(malformed))
      .collect::<Result<Vec<_>, _>>()?;

    if !has_unique_elements(covered_components.iter()) {
      return Err(malformed("duplicate covered component ids"));
    }

    let (mut created, mut expires, mut nonce, mut alg, mut keyid) = (None, None, None, None, None);
    for (key, bare_item) in inner_list_with_params.params.iter() {
      match key.as_str() {
        "created" => created = Some(as_timestamp(key, bare_item)?),
        "expires" => expires = Some(as_timestamp(key, bare_item)?),
        "nonce" => nonce = Some(as_string(key, bare_item)?),
        "alg" => alg = Some(as_string(key, bare_item)?),
        "keyid" => keyid = Some(as_string(key, bare_item)?),
        _ => debug!("Ignore unsupported signature parameter: {key}"),
      }
    }

    let received = vec![value.clone()].serialize_value().map_err(malformed)?;

    Ok(Self {
      created: created.ok_or_else(|| malformed("`created` is required"))?,
      expires,
      nonce,
      alg: alg.ok_or_else(|| malformed("`alg` is required"))?,
      keyid: keyid.ok_or_else(|| malformed("`keyid` is required"))?,
      covered_components,
      received: Some(received),
    })
  }
}

impl TryFrom<&str> for HttpSignatureParams {
  type Error = ReqSigError;
  /// Convert from string to HttpSignatureParams
  fn try_from(value: &str) -> ReqSigResult<Self> {
    let sfv_parsed = Parser::parse_list(value.as_bytes()).map_err(malformed)?;
    if sfv_parsed.len() != 1 {
      return Err(malformed("signature params must be a single inner list"));
    }
    HttpSignatureParams::try_from(&sfv_parsed[0])
  }
}
