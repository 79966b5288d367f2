use crate::{hyper_http::MessageSignatureReq, BoxError};
use bytes::Bytes;
use futures::future::BoxFuture;
use http::{header::CONTENT_TYPE, HeaderValue, Request, Response, StatusCode};
use http_body::Body;
use http_body_util::Full;
use reqsig::prelude::{Signer, SigningKey, Verifier, VerifyingKey};
use std::{
  sync::Arc,
  task::{Context, Poll},
};
use tower_layer::Layer;
use tower_service::Service;
use tracing::debug;

/// Body of the response returned for every rejected request
const REJECTION_BODY: &[u8] = b"invalid required signature";

/* --------------------------------------- */
/// Layer signing every outbound request before handing it to the wrapped service
pub struct SignLayer<K> {
  signer: Arc<Signer<K>>,
}

impl<K> SignLayer<K> {
  pub fn new(signer: Signer<K>) -> Self {
    Self::from_shared(Arc::new(signer))
  }

  /// Share a signer between several layers
  pub fn from_shared(signer: Arc<Signer<K>>) -> Self {
    Self { signer }
  }
}

impl<K> Clone for SignLayer<K> {
  fn clone(&self) -> Self {
    Self {
      signer: self.signer.clone(),
    }
  }
}

impl<S, K> Layer<S> for SignLayer<K> {
  type Service = SignService<S, K>;

  fn layer(&self, inner: S) -> Self::Service {
    SignService {
      inner,
      signer: self.signer.clone(),
    }
  }
}

/// Service produced by [`SignLayer`]. A signing failure aborts the call and the inner service is never invoked.
pub struct SignService<S, K> {
  inner: S,
  signer: Arc<Signer<K>>,
}

impl<S: Clone, K> Clone for SignService<S, K> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
      signer: self.signer.clone(),
    }
  }
}

impl<S, K, B> Service<Request<B>> for SignService<S, K>
where
  S: Service<Request<Full<Bytes>>> + Clone + Send + 'static,
  S::Future: Send,
  S::Error: Into<BoxError>,
  K: SigningKey + Send + Sync + 'static,
  B: Body + Send + 'static,
  B::Data: Send,
  B::Error: Into<BoxError>,
{
  type Response = S::Response;
  type Error = BoxError;
  type Future = BoxFuture<'static, Result<S::Response, BoxError>>;

  fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
    self.inner.poll_ready(cx).map_err(Into::into)
  }

  fn call(&mut self, req: Request<B>) -> Self::Future {
    // the ready service is taken and its clone left behind
    let clone = self.inner.clone();
    let mut inner = std::mem::replace(&mut self.inner, clone);
    let signer = self.signer.clone();

    Box::pin(async move {
      let req = req.sign_message(signer.as_ref()).await.map_err(|e| {
        debug!("Failed to sign outbound request: {e}");
        e
      })?;
      inner.call(req).await.map_err(Into::into)
    })
  }
}

/* --------------------------------------- */
/// Key id of the signature that authenticated the request, available in the request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedKeyId(pub String);

/// Layer verifying every inbound request before handing it to the wrapped service
pub struct VerifyLayer<K> {
  verifier: Arc<Verifier<K>>,
}

impl<K> VerifyLayer<K> {
  pub fn new(verifier: Verifier<K>) -> Self {
    Self::from_shared(Arc::new(verifier))
  }

  /// Share a verifier between several layers
  pub fn from_shared(verifier: Arc<Verifier<K>>) -> Self {
    Self { verifier }
  }
}

impl<K> Clone for VerifyLayer<K> {
  fn clone(&self) -> Self {
    Self {
      verifier: self.verifier.clone(),
    }
  }
}

impl<S, K> Layer<S> for VerifyLayer<K> {
  type Service = VerifyService<S, K>;

  fn layer(&self, inner: S) -> Self::Service {
    VerifyService {
      inner,
      verifier: self.verifier.clone(),
    }
  }
}

/// Service produced by [`VerifyLayer`].
///
/// Any failure, whichever check it comes from, is answered with the same `400 Bad Request`
/// and the inner service is not invoked.
pub struct VerifyService<S, K> {
  inner: S,
  verifier: Arc<Verifier<K>>,
}

impl<S: Clone, K> Clone for VerifyService<S, K> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
      verifier: self.verifier.clone(),
    }
  }
}

impl<S, K, B, ResBody> Service<Request<B>> for VerifyService<S, K>
where
  S: Service<Request<Full<Bytes>>, Response = Response<ResBody>> + Clone + Send + 'static,
  S::Future: Send,
  S::Error: Into<BoxError>,
  ResBody: From<Bytes>,
  K: VerifyingKey + Send + Sync + 'static,
  B: Body + Send + 'static,
  B::Data: Send,
  B::Error: Into<BoxError>,
{
  type Response = Response<ResBody>;
  type Error = BoxError;
  type Future = BoxFuture<'static, Result<Response<ResBody>, BoxError>>;

  fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
    self.inner.poll_ready(cx).map_err(Into::into)
  }

  fn call(&mut self, req: Request<B>) -> Self::Future {
    let clone = self.inner.clone();
    let mut inner = std::mem::replace(&mut self.inner, clone);
    let verifier = self.verifier.clone();

    Box::pin(async move {
      let (mut req, key_id) = match req.verify_message(verifier.as_ref()).await {
        Ok(verified) => verified,
        Err(e) => {
          debug!("Rejected inbound request: {e}");
          return Ok(rejection());
        }
      };
      debug!("Verified inbound request signed by {key_id}");
      req.extensions_mut().insert(VerifiedKeyId(key_id));
      inner.call(req).await.map_err(Into::into)
    })
  }
}

/// Uniform response for any verification failure
fn rejection<ResBody: From<Bytes>>() -> Response<ResBody> {
  let mut res = Response::new(ResBody::from(Bytes::from_static(REJECTION_BODY)));
  *res.status_mut() = StatusCode::BAD_REQUEST;
  res
    .headers_mut()
    .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
  res
}
