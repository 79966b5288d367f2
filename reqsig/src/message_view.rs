use bytes::Bytes;

/* -------------------------------- */
#[derive(Debug, Clone, Default)]
/// Transport-independent view of an http request.
///
/// Header names are stored lower-cased, in the order they were added, and a name may appear several times.
/// The query is kept without its leading `?`; `None` means the request target had no query at all.
/// Headers whose values are not visible ASCII are tracked by name only: they count as present but
/// cannot be resolved as covered components.
pub struct RequestView {
  method: String,
  path: String,
  query: Option<String>,
  authority: Option<String>,
  headers: Vec<(String, String)>,
  opaque_headers: Vec<String>,
  body: Bytes,
}

impl RequestView {
  /// Create a view for the given method and path with no query, headers or body
  pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
    Self {
      method: method.into(),
      path: path.into(),
      ..Default::default()
    }
  }

  /// Create a view from a request target like `/foo?bar=1`. The part after the first `?` becomes the query.
  pub fn from_request_target(method: impl Into<String>, target: &str) -> Self {
    let (path, query) = match target.split_once('?') {
      Some((path, query)) => (path, Some(query.to_string())),
      None => (target, None),
    };
    Self {
      method: method.into(),
      path: path.to_string(),
      query,
      ..Default::default()
    }
  }

  /// Set the raw query string (without the leading `?`)
  pub fn with_query(mut self, query: impl Into<String>) -> Self {
    self.query = Some(query.into());
    self
  }

  /// Set the authority (host and optional port)
  pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
    self.authority = Some(authority.into());
    self
  }

  /// Append a header value
  pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
    self.append_header(name, value);
    self
  }

  /// Set the body bytes
  pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
    self.body = body.into();
    self
  }

  /// Replace every value of the header with a single one
  pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
    let name = name.to_ascii_lowercase();
    self.headers.retain(|(n, _)| *n != name);
    self.opaque_headers.retain(|n| *n != name);
    self.headers.push((name, value.into()));
  }

  /// Append a header value, keeping existing ones
  pub fn append_header(&mut self, name: &str, value: impl Into<String>) {
    self.headers.push((name.to_ascii_lowercase(), value.into()));
  }

  /// Record a header whose value is not visible ASCII
  pub fn append_opaque_header(&mut self, name: &str) {
    let name = name.to_ascii_lowercase();
    if !self.opaque_headers.contains(&name) {
      self.opaque_headers.push(name);
    }
  }

  /// Remove every value of the header
  pub fn remove_header(&mut self, name: &str) {
    let name = name.to_ascii_lowercase();
    self.headers.retain(|(n, _)| *n != name);
    self.opaque_headers.retain(|n| *n != name);
  }

  pub fn method(&self) -> &str {
    &self.method
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn query(&self) -> Option<&str> {
    self.query.as_deref()
  }

  /// Authority of the request, falling back to the `host` header
  pub fn authority(&self) -> Option<&str> {
    self
      .authority
      .as_deref()
      .or_else(|| self.header_values("host").into_iter().next())
  }

  pub fn body(&self) -> &Bytes {
    &self.body
  }

  /// All values of the header in their original order. Name matching is case-insensitive.
  pub fn header_values(&self, name: &str) -> Vec<&str> {
    self
      .headers
      .iter()
      .filter(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
      .collect()
  }

  pub fn has_header(&self, name: &str) -> bool {
    self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) || self.is_opaque_header(name)
  }

  /// Whether some value of the header is not visible ASCII
  pub fn is_opaque_header(&self, name: &str) -> bool {
    self.opaque_headers.iter().any(|n| n.eq_ignore_ascii_case(name))
  }

  /// Iterate all `(name, value)` pairs in order
  pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
    self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
  }
}
