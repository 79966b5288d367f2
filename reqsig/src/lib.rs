mod clock;
mod content_digest;
mod crypto;
mod error;
mod key_store;
mod message_component;
mod message_view;
mod signature_base;
mod signature_params;
mod signer;
#[cfg(test)]
mod test_keys;
mod trace;
mod util;
mod verifier;

/// Header carrying the body digest
pub const CONTENT_DIGEST_HEADER: &str = "content-digest";
/// Header carrying the covered components and params of each signature
pub const SIGNATURE_INPUT_HEADER: &str = "signature-input";
/// Header carrying the signature bytes
pub const SIGNATURE_HEADER: &str = "signature";

pub mod prelude {
  pub mod message_component {
    pub use crate::message_component::{resolve, DerivedComponentName, HttpMessageComponent, HttpMessageComponentId};
  }

  pub mod content_digest {
    pub use crate::content_digest::{compute, verify, CONTENT_DIGEST_ALG};
  }

  pub use crate::{
    clock::{Clock, MockClock, SystemClock},
    crypto::{
      AlgorithmName, AnySigningKey, AnyVerifyingKey, PublicKey, RandomNonce, SecretKey, SharedKey, SigningKey, VerifyingKey,
    },
    error::{ReqSigError, ReqSigResult},
    key_store::{KeyStore, KeyStoreBuilder},
    message_view::RequestView,
    signature_base::{
      parse_signature, parse_signature_input, parse_signatures, with_fixed_head, HttpSignatureBase, HttpSignatureHeaders, HttpSignatureInputMap,
      HttpSignatureMap, FIXED_HEAD_COMPONENTS,
    },
    signature_params::HttpSignatureParams,
    signer::{SignedHeaders, Signer, SignerBuilder, DEFAULT_COVERED_HEADERS},
    verifier::{Verifier, VerifierBuilder, VerifyingKeyResolver},
    CONTENT_DIGEST_HEADER, SIGNATURE_HEADER, SIGNATURE_INPUT_HEADER,
  };
}

/* ----------------------------------------------------------------- */
