use crate::{error::HyperSigResult, BoxError};
use bytes::{Buf, Bytes};
use http::{HeaderValue, Request};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use reqsig::prelude::{content_digest, ReqSigError, CONTENT_DIGEST_HEADER};
use std::future::Future;

/* --------------------------------------- */
/// Buffer the whole body once
pub trait ContentDigest: http_body::Body {
  /// Returns the bytes object of the body
  fn into_bytes(self) -> impl Future<Output = Result<Bytes, Self::Error>> + Send
  where
    Self: Sized + Send,
    Self::Data: Send,
  {
    async {
      let mut body_buf = self.collect().await?.aggregate();
      Ok(body_buf.copy_to_bytes(body_buf.remaining()))
    }
  }
}

impl<T: ?Sized> ContentDigest for T where T: http_body::Body {}

/// Read the body into memory, reporting a failure as an io error
pub(crate) async fn buffer_body<B>(body: B) -> Result<Bytes, ReqSigError>
where
  B: Body + Send,
  B::Data: Send,
  B::Error: Into<BoxError>,
{
  body
    .into_bytes()
    .await
    .map_err(|e| ReqSigError::Io(e.into().to_string()))
}

/* --------------------------------------- */
/// A trait to set and verify the sha-512 content digest of a request
pub trait RequestContentDigest {
  type Error;
  /// Buffer the body and set its Content-Digest, replacing any existing one
  fn set_content_digest(self) -> impl Future<Output = Result<Request<Full<Bytes>>, Self::Error>> + Send
  where
    Self: Sized;
  /// Check the body against Content-Digest. A request without the header never matches.
  fn verify_content_digest(self) -> impl Future<Output = Result<bool, Self::Error>> + Send
  where
    Self: Sized;
}

impl<B> RequestContentDigest for Request<B>
where
  B: Body + Send,
  <B as Body>::Data: Send,
  <B as Body>::Error: Into<BoxError>,
{
  type Error = crate::error::HyperSigError;

  async fn set_content_digest(self) -> HyperSigResult<Request<Full<Bytes>>>
  where
    Self: Sized,
  {
    let (mut parts, body) = self.into_parts();
    let body_bytes = buffer_body(body).await?;
    let digest = HeaderValue::from_str(&content_digest::compute(&body_bytes))?;
    parts.headers.insert(CONTENT_DIGEST_HEADER, digest);
    Ok(Request::from_parts(parts, Full::new(body_bytes)))
  }

  async fn verify_content_digest(self) -> HyperSigResult<bool>
  where
    Self: Sized,
  {
    let header_value = self
      .headers()
      .get_all(CONTENT_DIGEST_HEADER)
      .iter()
      .map(|v| v.to_str())
      .collect::<Result<Vec<_>, _>>()?
      .join(", ");
    if header_value.is_empty() {
      return Ok(false);
    }
    let body_bytes = buffer_body(self.into_body()).await?;
    Ok(content_digest::verify(&body_bytes, &header_value))
  }
}
