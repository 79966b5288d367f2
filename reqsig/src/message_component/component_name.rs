use crate::error::ReqSigError;

/* ---------------------------------------------------------------- */
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
/// Derived components supported in covered component lists, expressed as @method, @path, @query and @authority
/// https://datatracker.ietf.org/doc/html/rfc9421#name-derived-components
pub enum DerivedComponentName {
  Method,
  Path,
  Query,
  Authority,
}

impl AsRef<str> for DerivedComponentName {
  fn as_ref(&self) -> &str {
    match self {
      Self::Method => "@method",
      Self::Path => "@path",
      Self::Query => "@query",
      Self::Authority => "@authority",
    }
  }
}

impl TryFrom<&str> for DerivedComponentName {
  type Error = ReqSigError;
  fn try_from(val: &str) -> Result<Self, Self::Error> {
    match val {
      "@method" => Ok(Self::Method),
      "@path" => Ok(Self::Path),
      "@query" => Ok(Self::Query),
      "@authority" => Ok(Self::Authority),
      _ => Err(ReqSigError::InvalidComponentId(format!(
        "Unsupported derived component: {val}"
      ))),
    }
  }
}

impl std::fmt::Display for DerivedComponentName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", AsRef::<str>::as_ref(self))
  }
}
