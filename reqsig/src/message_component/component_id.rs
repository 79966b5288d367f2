use super::component_name::DerivedComponentName;
use crate::error::{ReqSigError, ReqSigResult};
use sfv::{BareItem, Item, Parser};

/// Header carrying the body digest
pub(crate) const CONTENT_DIGEST: &str = "content-digest";

/* ---------------------------------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Http message component id, i.e., one entry of the covered component list
pub enum HttpMessageComponentId {
  /// `@method`, `@path`, `@query` or `@authority`
  Derived(DerivedComponentName),
  /// `content-digest` header
  ContentDigest,
  /// Any other header field, with a lower-cased name
  HttpField(String),
}

impl HttpMessageComponentId {
  /// Component id for a header field name. `content-digest` maps to [`HttpMessageComponentId::ContentDigest`].
  pub fn header(name: &str) -> ReqSigResult<Self> {
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() || name.starts_with('@') || !name.bytes().all(is_tchar) {
      return Err(ReqSigError::InvalidComponentId(format!(
        "Invalid http field name: {name}"
      )));
    }
    if name == CONTENT_DIGEST {
      return Ok(Self::ContentDigest);
    }
    Ok(Self::HttpField(name))
  }

  /// Component name without quotations
  pub fn name(&self) -> &str {
    match self {
      Self::Derived(d) => d.as_ref(),
      Self::ContentDigest => CONTENT_DIGEST,
      Self::HttpField(name) => name,
    }
  }
}

/// RFC 9110 token characters
fn is_tchar(c: u8) -> bool {
  c.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&c)
}

impl std::fmt::Display for HttpMessageComponentId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "\"{}\"", self.name())
  }
}

impl TryFrom<&Item> for HttpMessageComponentId {
  type Error = ReqSigError;
  /// Convert from an item of the covered component inner list. Component parameters are not supported.
  fn try_from(item: &Item) -> Result<Self, Self::Error> {
    if !item.params.is_empty() {
      return Err(ReqSigError::InvalidComponentId(
        "Component parameters are not supported".to_string(),
      ));
    }
    let BareItem::String(name) = &item.bare_item else {
      return Err(ReqSigError::InvalidComponentId(format!(
        "Invalid http message component id: {:?}",
        item.bare_item
      )));
    };
    if name.starts_with('@') {
      Ok(Self::Derived(DerivedComponentName::try_from(name.as_str())?))
    } else {
      Self::header(name)
    }
  }
}

impl TryFrom<&str> for HttpMessageComponentId {
  type Error = ReqSigError;
  /// Parse http message component id from string
  /// Accept `"<name>"` (with double quotations) or `<name>` (without double quotations).
  fn try_from(val: &str) -> Result<Self, Self::Error> {
    let val = val.trim();
    let quoted = if val.starts_with('"') {
      val.to_string()
    } else {
      format!("\"{val}\"")
    };
    let item = Parser::parse_item(quoted.as_bytes()).map_err(|e| ReqSigError::InvalidComponentId(e.to_string()))?;
    Self::try_from(&item)
  }
}
