use crate::{
  error::{HyperSigError, HyperSigResult},
  hyper_content_digest::buffer_body,
  BoxError,
};
use bytes::Bytes;
use http::{request::Parts, HeaderMap, HeaderValue, Request};
use http_body::Body;
use http_body_util::Full;
use indexmap::IndexMap;
use reqsig::prelude::{
  parse_signature_input, AlgorithmName, HttpSignatureParams, RequestView, Signer, SigningKey, Verifier, VerifyingKey,
  CONTENT_DIGEST_HEADER, SIGNATURE_HEADER, SIGNATURE_INPUT_HEADER,
};
use std::future::Future;
use tracing::debug;

/// A type alias for the signature name
type SignatureName = String;
/// A type alias for the key id
type KeyId = String;

/* --------------------------------------- */
/// A trait about the http message signature headers of a request
pub trait MessageSignature {
  type Error;

  /// Check if the request has signature and signature-input headers
  fn has_message_signature(&self) -> bool;

  /// Extract the declared algorithm and key id of every signature in header order.
  /// Unknown or unsupported algorithm strings are mapped to `None`.
  fn get_alg_key_ids(&self) -> Result<IndexMap<SignatureName, (Option<AlgorithmName>, KeyId)>, Self::Error>;

  /// Extract all signature params contained in the request headers
  fn get_signature_params(&self) -> Result<IndexMap<SignatureName, HttpSignatureParams>, Self::Error>;
}

/// A trait to sign and verify a request. The body is buffered once and handed back re-readable.
pub trait MessageSignatureReq {
  type Error;

  /// Sign the request with every key of the signer, setting Content-Digest, Signature-Input and Signature.
  /// On failure no header is touched and the request is dropped.
  fn sign_message<K>(self, signer: &Signer<K>) -> impl Future<Output = Result<Request<Full<Bytes>>, Self::Error>> + Send
  where
    Self: Sized,
    K: SigningKey + Sync;

  /// Verify the request signature and its Content-Digest, returning the request together with the verified key id
  fn verify_message<K>(
    self,
    verifier: &Verifier<K>,
  ) -> impl Future<Output = Result<(Request<Full<Bytes>>, KeyId), Self::Error>> + Send
  where
    Self: Sized,
    K: VerifyingKey + Sync;
}

/* --------------------------------------- */
impl<D> MessageSignature for Request<D> {
  type Error = HyperSigError;

  fn has_message_signature(&self) -> bool {
    has_message_signature_inner(self.headers())
  }

  fn get_alg_key_ids(&self) -> HyperSigResult<IndexMap<SignatureName, (Option<AlgorithmName>, KeyId)>> {
    let res = self
      .get_signature_params()?
      .into_iter()
      .map(|(name, params)| (name, (params.declared_alg(), params.keyid)))
      .collect();
    Ok(res)
  }

  fn get_signature_params(&self) -> HyperSigResult<IndexMap<SignatureName, HttpSignatureParams>> {
    let headers = self.headers();
    if !headers.contains_key(SIGNATURE_INPUT_HEADER) {
      return Err(HyperSigError::NoSignatureHeaders(
        "The request does not have signature-input header".to_string(),
      ));
    }
    let signature_input = joined_header_values(headers, SIGNATURE_INPUT_HEADER)?;
    let res = parse_signature_input(&signature_input)?.into_iter().collect();
    Ok(res)
  }
}

impl<D> MessageSignatureReq for Request<D>
where
  D: Body + Send,
  <D as Body>::Data: Send,
  <D as Body>::Error: Into<BoxError>,
{
  type Error = HyperSigError;

  async fn sign_message<K>(self, signer: &Signer<K>) -> HyperSigResult<Request<Full<Bytes>>>
  where
    Self: Sized,
    K: SigningKey + Sync,
  {
    let (mut parts, body) = self.into_parts();
    let body_bytes = buffer_body(body).await?;
    let view = request_view(&parts, body_bytes.clone())?;
    let signed = signer.sign(&view)?;

    // all values are validated before any header is replaced
    let content_digest = HeaderValue::from_str(signed.content_digest())?;
    let signature_input = HeaderValue::from_str(&signed.signature_input())?;
    let signature = HeaderValue::from_str(&signed.signature())?;
    parts.headers.insert(CONTENT_DIGEST_HEADER, content_digest);
    parts.headers.insert(SIGNATURE_INPUT_HEADER, signature_input);
    parts.headers.insert(SIGNATURE_HEADER, signature);

    Ok(Request::from_parts(parts, Full::new(body_bytes)))
  }

  async fn verify_message<K>(self, verifier: &Verifier<K>) -> HyperSigResult<(Request<Full<Bytes>>, KeyId)>
  where
    Self: Sized,
    K: VerifyingKey + Sync,
  {
    let (parts, body) = self.into_parts();
    let body_bytes = buffer_body(body).await?;
    let view = request_view(&parts, body_bytes.clone())?;
    let key_id = verifier.verify(&view)?;
    Ok((Request::from_parts(parts, Full::new(body_bytes)), key_id))
  }
}

/* --------------------------------------- */
// inner functions
/// has message signature inner function
fn has_message_signature_inner(headers: &HeaderMap) -> bool {
  headers.contains_key(SIGNATURE_HEADER) && headers.contains_key(SIGNATURE_INPUT_HEADER)
}

/// Join every value of the header with `, `
fn joined_header_values(headers: &HeaderMap, name: &str) -> HyperSigResult<String> {
  let joined = headers
    .get_all(name)
    .iter()
    .map(|v| v.to_str())
    .collect::<Result<Vec<_>, _>>()?
    .join(", ");
  Ok(joined)
}

/// Adapt request parts and the buffered body into the transport-independent view.
/// Header values that are not visible ASCII only fail the call if a signature covers them.
pub(crate) fn request_view(parts: &Parts, body: Bytes) -> HyperSigResult<RequestView> {
  let uri = &parts.uri;
  let mut view = RequestView::new(parts.method.as_str(), uri.path()).with_body(body);
  if let Some(query) = uri.query() {
    view = view.with_query(query);
  }
  if let Some(authority) = uri.authority() {
    view = view.with_authority(authority.as_str());
  }
  for (name, value) in parts.headers.iter() {
    match value.to_str() {
      Ok(value) => view.append_header(name.as_str(), value),
      Err(_) => {
        debug!("Header `{name}` has a value that is not visible ASCII");
        view.append_opaque_header(name.as_str());
      }
    }
  }
  Ok(view)
}

/* --------------------------------------- */
#[cfg(test)]
#[path = "hyper_http_tests.rs"]
mod tests;
