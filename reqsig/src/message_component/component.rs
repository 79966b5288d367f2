use super::{component_id::HttpMessageComponentId, component_name::DerivedComponentName};
use crate::{
  error::{ReqSigError, ReqSigResult},
  message_view::RequestView,
};

/* ---------------------------------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Http message component, i.e., a component id paired with its canonical value
pub struct HttpMessageComponent {
  /// Http message component id
  pub id: HttpMessageComponentId,
  /// Canonical value
  pub value: String,
}

impl std::fmt::Display for HttpMessageComponent {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    // an empty value still gets the single trailing space after the colon
    write!(f, "{}: {}", self.id, self.value)
  }
}

/* ---------------------------------------------------------------- */
/// Resolve the canonical value of a component against the request
pub fn resolve(view: &RequestView, id: &HttpMessageComponentId) -> ReqSigResult<HttpMessageComponent> {
  let value = match id {
    HttpMessageComponentId::Derived(derived) => resolve_derived(view, derived)?,
    HttpMessageComponentId::ContentDigest | HttpMessageComponentId::HttpField(_) => {
      if view.is_opaque_header(id.name()) {
        return Err(ReqSigError::MissingComponent(format!(
          "{} (value is not visible ASCII)",
          id.name()
        )));
      }
      let values = view.header_values(id.name());
      if values.is_empty() {
        return Err(ReqSigError::MissingComponent(id.name().to_string()));
      }
      values.iter().map(|v| v.trim()).collect::<Vec<_>>().join(", ")
    }
  };
  Ok(HttpMessageComponent { id: id.clone(), value })
}

fn resolve_derived(view: &RequestView, derived: &DerivedComponentName) -> ReqSigResult<String> {
  let value = match derived {
    DerivedComponentName::Method => view.method().to_ascii_uppercase(),
    DerivedComponentName::Path => view.path().to_string(),
    DerivedComponentName::Query => format!("?{}", view.query().unwrap_or_default()),
    DerivedComponentName::Authority => view
      .authority()
      .ok_or_else(|| ReqSigError::MissingComponent(derived.to_string()))?
      .to_ascii_lowercase(),
  };
  Ok(value)
}

/* ---------------------------------------------------------------- */
#[cfg(test)]
mod tests {
  use super::*;

  fn view() -> RequestView {
    RequestView::from_request_target("post", "/foo/%7Ebar/?a=1&b=%20")
      .with_authority("Example.COM:8443")
      .with_header("Content-Type", "application/json")
      .with_header("x-multi", " first ")
      .with_header("X-Multi", "second")
      .with_header("x-empty", "")
  }

  fn resolve_str(view: &RequestView, id: &str) -> ReqSigResult<String> {
    resolve(view, &HttpMessageComponentId::try_from(id)?).map(|c| c.to_string())
  }

  #[test]
  fn test_resolve_derived_components() {
    let view = view();
    assert_eq!(resolve_str(&view, "@method").unwrap(), "\"@method\": POST");
    assert_eq!(resolve_str(&view, "@path").unwrap(), "\"@path\": /foo/%7Ebar/");
    assert_eq!(resolve_str(&view, "@query").unwrap(), "\"@query\": ?a=1&b=%20");
    assert_eq!(resolve_str(&view, "@authority").unwrap(), "\"@authority\": example.com:8443");
  }

  #[test]
  fn test_resolve_empty_query() {
    let view = RequestView::new("GET", "/");
    assert_eq!(resolve_str(&view, "@query").unwrap(), "\"@query\": ?");
    let view = RequestView::from_request_target("GET", "/?");
    assert_eq!(resolve_str(&view, "@query").unwrap(), "\"@query\": ?");
  }

  #[test]
  fn test_resolve_http_fields() {
    let view = view();
    assert_eq!(
      resolve_str(&view, "content-type").unwrap(),
      "\"content-type\": application/json"
    );
    assert_eq!(resolve_str(&view, "x-multi").unwrap(), "\"x-multi\": first, second");
    assert_eq!(resolve_str(&view, "x-empty").unwrap(), "\"x-empty\": ");
  }

  #[test]
  fn test_resolve_missing_component() {
    let view = RequestView::new("GET", "/");
    assert!(matches!(
      resolve_str(&view, "content-digest"),
      Err(ReqSigError::MissingComponent(name)) if name == "content-digest"
    ));
    assert!(matches!(
      resolve_str(&view, "date"),
      Err(ReqSigError::MissingComponent(_))
    ));
    assert!(matches!(
      resolve_str(&view, "@authority"),
      Err(ReqSigError::MissingComponent(_))
    ));

    let mut view = view.with_header("x-note", "readable");
    view.append_opaque_header("x-note");
    assert!(matches!(
      resolve_str(&view, "x-note"),
      Err(ReqSigError::MissingComponent(_))
    ));
  }
}
