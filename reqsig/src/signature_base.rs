use crate::{
  crypto::{SigningKey, VerifyingKey},
  error::{ReqSigError, ReqSigResult},
  message_component::{resolve, DerivedComponentName, HttpMessageComponent, HttpMessageComponentId},
  message_view::RequestView,
  signature_params::HttpSignatureParams,
};
use base64::{engine::general_purpose, Engine as _};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use sfv::{BareItem, Item, ListEntry, Parser};

/// Signature-Input entries keyed by label, in header order
pub type HttpSignatureInputMap = IndexMap<String, HttpSignatureParams, FxBuildHasher>;
/// Signature entries keyed by label, in header order
pub type HttpSignatureMap = IndexMap<String, Vec<u8>, FxBuildHasher>;

/// Components that head every signature produced by the signer, in this order
pub const FIXED_HEAD_COMPONENTS: [HttpMessageComponentId; 4] = [
  HttpMessageComponentId::ContentDigest,
  HttpMessageComponentId::Derived(DerivedComponentName::Query),
  HttpMessageComponentId::Derived(DerivedComponentName::Path),
  HttpMessageComponentId::Derived(DerivedComponentName::Method),
];

/// Prepend the fixed head to the caller's components, dropping caller entries that duplicate the head or each other
pub fn with_fixed_head(components: &[HttpMessageComponentId]) -> Vec<HttpMessageComponentId> {
  let mut covered = FIXED_HEAD_COMPONENTS.to_vec();
  for id in components {
    if !covered.contains(id) {
      covered.push(id.clone());
    }
  }
  covered
}

/* ---------------------------------------- */
/// Signature Base
/// https://datatracker.ietf.org/doc/html/rfc9421#name-creating-the-signature-base
pub struct HttpSignatureBase {
  /// HTTP message field and derived components ordered as in the vector in signature params
  component_lines: Vec<HttpMessageComponent>,
  /// signature params
  signature_params: HttpSignatureParams,
}

impl HttpSignatureBase {
  /// Build the signature base by resolving every covered component of the params against the request.
  /// Fails with `MissingComponent` if any of them cannot be resolved.
  pub fn try_build(view: &RequestView, signature_params: &HttpSignatureParams) -> ReqSigResult<Self> {
    let component_lines = signature_params
      .covered_components
      .iter()
      .map(|id| resolve(view, id))
      .collect::<ReqSigResult<Vec<_>>>()?;
    Ok(Self {
      component_lines,
      signature_params: signature_params.clone(),
    })
  }

  /// Returns the signature base string as bytes to be signed
  pub fn as_bytes(&self) -> Vec<u8> {
    self.to_string().into_bytes()
  }

  pub fn signature_params(&self) -> &HttpSignatureParams {
    &self.signature_params
  }

  /// Sign the base and bundle the result with its params under the given label
  pub fn build_signature_headers<K: SigningKey + ?Sized>(&self, key: &K, label: &str) -> ReqSigResult<HttpSignatureHeaders> {
    let signature = key.sign(&self.as_bytes())?;
    Ok(HttpSignatureHeaders {
      label: label.to_string(),
      signature_params: self.signature_params.clone(),
      signature,
    })
  }

  /// Verify the signature over the base
  pub fn verify<K: VerifyingKey + ?Sized>(&self, key: &K, signature: &[u8]) -> ReqSigResult<()> {
    key.verify(&self.as_bytes(), signature)
  }
}

impl std::fmt::Display for HttpSignatureBase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for component_line in &self.component_lines {
      writeln!(f, "{component_line}")?;
    }
    write!(f, "\"@signature-params\": {}", self.signature_params.signature_base_value())
  }
}

/* ---------------------------------------- */
#[derive(Debug, Clone)]
/// One labeled signature, i.e., a member of both Signature-Input and Signature
pub struct HttpSignatureHeaders {
  label: String,
  signature_params: HttpSignatureParams,
  signature: Vec<u8>,
}

impl HttpSignatureHeaders {
  pub fn label(&self) -> &str {
    &self.label
  }

  pub fn signature_params(&self) -> &HttpSignatureParams {
    &self.signature_params
  }

  pub fn signature(&self) -> &[u8] {
    &self.signature
  }

  /// Dictionary member for the Signature-Input header, i.e., `<label>=<params>`
  pub fn signature_input_header_value(&self) -> String {
    format!("{}={}", self.label, self.signature_params)
  }

  /// Dictionary member for the Signature header, i.e., `<label>=:<base64>:`
  pub fn signature_header_value(&self) -> String {
    format!("{}=:{}:", self.label, general_purpose::STANDARD.encode(&self.signature))
  }
}

/* ---------------------------------------- */
/// Parse the Signature-Input header value into labeled params in header order
pub fn parse_signature_input(value: &str) -> ReqSigResult<HttpSignatureInputMap> {
  let dict = Parser::parse_dictionary(value.as_bytes())
    .map_err(|e| ReqSigError::MalformedHeader(format!("signature-input: {e}")))?;
  dict
    .iter()
    .map(|(label, entry)| Ok((label.clone(), HttpSignatureParams::try_from(entry)?)))
    .collect()
}

/// Parse the Signature header value into labeled signature bytes in header order
pub fn parse_signatures(value: &str) -> ReqSigResult<HttpSignatureMap> {
  let dict =
    Parser::parse_dictionary(value.as_bytes()).map_err(|e| ReqSigError::MalformedHeader(format!("signature: {e}")))?;
  dict
    .iter()
    .map(|(label, entry)| Ok((label.clone(), signature_bytes(label, entry)?)))
    .collect()
}

/// Signature bytes under a single label of the Signature header. Entries of other labels are not inspected.
pub fn parse_signature(value: &str, label: &str) -> ReqSigResult<Vec<u8>> {
  let dict =
    Parser::parse_dictionary(value.as_bytes()).map_err(|e| ReqSigError::MalformedHeader(format!("signature: {e}")))?;
  let entry = dict.get(label).ok_or(ReqSigError::MissingSignature)?;
  signature_bytes(label, entry)
}

fn signature_bytes(label: &str, entry: &ListEntry) -> ReqSigResult<Vec<u8>> {
  match entry {
    ListEntry::Item(Item {
      bare_item: BareItem::ByteSeq(bytes),
      ..
    }) => Ok(bytes.clone()),
    _ => Err(ReqSigError::MalformedHeader(format!(
      "signature `{label}` must be a byte sequence"
    ))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::crypto::{AlgorithmName, SharedKey};

  fn params(covered: &[&str]) -> HttpSignatureParams {
    let covered = covered
      .iter()
      .map(|v| HttpMessageComponentId::try_from(*v).unwrap())
      .collect::<Vec<_>>();
    HttpSignatureParams::try_new(&covered, 1618884473, &AlgorithmName::HmacSha256, "test-shared-secret").unwrap()
  }

  #[test]
  fn test_signature_base_lines() {
    let view = RequestView::new("get", "/").with_header("Date", "Tue, 07 Jun 2014 20:51:35 GMT");
    let signature_base = HttpSignatureBase::try_build(&view, &params(&["@method", "@path", "date"])).unwrap();
    assert_eq!(
      signature_base.to_string(),
      r##""@method": GET
"@path": /
"date": Tue, 07 Jun 2014 20:51:35 GMT
"@signature-params": ("@method" "@path" "date");created=1618884473;alg="hmac-sha256";keyid="test-shared-secret""##
    );
  }

  #[test]
  fn test_signature_base_uses_received_params() {
    let view = RequestView::new("GET", "/foo");
    let received = r##"("@method" "@path");created=100;keyid="k";alg="hmac-sha256""##;
    let params = parse_signature_input(&format!("sig1={received}")).unwrap()["sig1"].clone();
    let signature_base = HttpSignatureBase::try_build(&view, &params).unwrap();
    assert_eq!(
      signature_base.to_string(),
      format!("\"@method\": GET\n\"@path\": /foo\n\"@signature-params\": {received}")
    );
  }

  #[test]
  fn test_try_build_from_view() {
    let view = RequestView::from_request_target("get", "/foo?bar=1")
      .with_header("Content-Type", "application/json")
      .with_header("Content-Digest", "sha-512=:AAAA:");
    let ids = with_fixed_head(&[HttpMessageComponentId::try_from("content-type").unwrap()]);
    let params = HttpSignatureParams::try_new(&ids, 1618884473, &AlgorithmName::HmacSha256, "test-key").unwrap();
    let base = HttpSignatureBase::try_build(&view, &params).unwrap();
    assert_eq!(
      base.to_string(),
      r##""content-digest": sha-512=:AAAA:
"@query": ?bar=1
"@path": /foo
"@method": GET
"content-type": application/json
"@signature-params": ("content-digest" "@query" "@path" "@method" "content-type");created=1618884473;alg="hmac-sha256";keyid="test-key""##
    );

    let params = params_with_missing();
    assert!(matches!(
      HttpSignatureBase::try_build(&view, &params),
      Err(ReqSigError::MissingComponent(_))
    ));
  }

  fn params_with_missing() -> HttpSignatureParams {
    params(&["@method", "date"])
  }

  #[test]
  fn test_fixed_head_dedup() {
    let ids = ["@method", "content-type", "content-digest", "content-type", "date"]
      .into_iter()
      .map(|v| HttpMessageComponentId::try_from(v).unwrap())
      .collect::<Vec<_>>();
    let covered = with_fixed_head(&ids).iter().map(|v| v.to_string()).collect::<Vec<_>>();
    assert_eq!(
      covered,
      vec![
        "\"content-digest\"",
        "\"@query\"",
        "\"@path\"",
        "\"@method\"",
        "\"content-type\"",
        "\"date\""
      ]
    );
  }

  #[test]
  fn test_signature_headers_round_trip() {
    let key = SharedKey::from_bytes(b"secret");
    let view = RequestView::new("GET", "/");
    let base = HttpSignatureBase::try_build(&view, &params(&["@method", "@path"])).unwrap();
    let headers = base.build_signature_headers(&key, "sig1").unwrap();

    let inputs = parse_signature_input(&headers.signature_input_header_value()).unwrap();
    let signatures = parse_signatures(&headers.signature_header_value()).unwrap();
    assert_eq!(inputs["sig1"].to_string(), base.signature_params().to_string());
    let signature = signatures.get("sig1").unwrap();
    assert!(base.verify(&key, signature).is_ok());
    assert!(matches!(
      base.verify(&SharedKey::from_bytes(b"other"), signature),
      Err(ReqSigError::SignatureInvalid)
    ));
  }

  #[test]
  fn test_parse_multiple_labels_in_order() {
    let value = r##"b=("@method");created=1;alg="ed25519";keyid="k2", a=("@path");created=2;alg="hmac-sha256";keyid="k1""##;
    let inputs = parse_signature_input(value).unwrap();
    assert_eq!(inputs.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(inputs["a"].keyid, "k1");

    let signatures = parse_signatures("b=:AAEC:, a=:AwQF:").unwrap();
    assert_eq!(signatures["b"], vec![0, 1, 2]);
    assert_eq!(signatures["a"], vec![3, 4, 5]);
  }

  #[test]
  fn test_parse_malformed_headers() {
    assert!(matches!(
      parse_signature_input("sig1=\"not a list\""),
      Err(ReqSigError::MalformedHeader(_))
    ));
    assert!(matches!(parse_signature_input("=("), Err(ReqSigError::MalformedHeader(_))));
    assert!(matches!(
      parse_signatures("sig1=\"not bytes\""),
      Err(ReqSigError::MalformedHeader(_))
    ));
  }

  #[test]
  fn test_parse_single_signature() {
    let value = "k1=:AAEC:, k2=\"corrupt\"";
    assert_eq!(parse_signature(value, "k1").unwrap(), vec![0, 1, 2]);
    assert!(matches!(
      parse_signature(value, "k2"),
      Err(ReqSigError::MalformedHeader(_))
    ));
    assert!(matches!(parse_signature(value, "k3"), Err(ReqSigError::MissingSignature)));
  }
}
