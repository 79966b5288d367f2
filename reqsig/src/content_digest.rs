use crate::trace::*;
use base64::{engine::general_purpose, Engine as _};
use sfv::{BareItem, Item, ListEntry, Parser};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

/// Digest algorithm tag in Content-Digest
pub const CONTENT_DIGEST_ALG: &str = "sha-512";

/// Returns the sha-512 digest of the given body
fn derive_digest(body: &[u8]) -> Vec<u8> {
  let mut hasher = Sha512::new();
  hasher.update(body);
  hasher.finalize().to_vec()
}

/// Compute the Content-Digest header value of the body, i.e., `sha-512=:<base64>:`
pub fn compute(body: &[u8]) -> String {
  format!(
    "{CONTENT_DIGEST_ALG}=:{}:",
    general_purpose::STANDARD.encode(derive_digest(body))
  )
}

/// Check the Content-Digest header value against the body.
/// An unparsable header or one without a `sha-512` member never matches.
pub fn verify(body: &[u8], header_value: &str) -> bool {
  let Ok(dict) = Parser::parse_dictionary(header_value.as_bytes()) else {
    debug!("Unparsable content-digest header");
    return false;
  };
  let Some(entry) = dict.get(CONTENT_DIGEST_ALG) else {
    debug!("No supported digest algorithm in content-digest header");
    return false;
  };
  let ListEntry::Item(Item {
    bare_item: BareItem::ByteSeq(expected),
    ..
  }) = entry
  else {
    debug!("Content-digest value is not a byte sequence");
    return false;
  };
  derive_digest(body).as_slice().ct_eq(expected.as_slice()).into()
}
