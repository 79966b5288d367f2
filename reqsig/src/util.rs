/// Check duplicate elements in a vector
pub(crate) fn has_unique_elements<T>(iter: T) -> bool
where
  T: IntoIterator,
  T::Item: Eq + std::hash::Hash,
{
  let mut uniq = rustc_hash::FxHashSet::default();
  iter.into_iter().all(move |x| uniq.insert(x))
}

/// Check if the string is usable as a structured field dictionary key (RFC 8941 section 3.1.2)
pub(crate) fn is_sf_key(key: &str) -> bool {
  let mut chars = key.chars();
  match chars.next() {
    Some(c) if c.is_ascii_lowercase() || c == '*' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.' | '*'))
}

/// Check if the string fits in a structured field string, i.e., printable ASCII only (RFC 8941 section 3.3.3)
pub(crate) fn is_sf_string(val: &str) -> bool {
  val.bytes().all(|c| (0x20..=0x7e).contains(&c))
}
