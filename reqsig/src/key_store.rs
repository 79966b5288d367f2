use crate::error::{ReqSigError, ReqSigResult};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};

type KeyMap<K> = IndexMap<String, K, FxBuildHasher>;

/* -------------------------------- */
/// Immutable, insertion-ordered mapping from key id to key.
/// A `KeyStore` is only obtainable from [`KeyStoreBuilder::build`] and exposes no mutating methods,
/// so a signer or verifier holding one can be shared freely across threads.
pub struct KeyStore<K> {
  keys: KeyMap<K>,
}

impl<K> KeyStore<K> {
  /// Start building a key store
  pub fn builder() -> KeyStoreBuilder<K> {
    KeyStoreBuilder::default()
  }

  /// Look up a key by id
  pub fn get(&self, key_id: &str) -> Option<&K> {
    self.keys.get(key_id)
  }

  /// Whether the key id is registered
  pub fn contains(&self, key_id: &str) -> bool {
    self.keys.contains_key(key_id)
  }

  /// Iterate `(key id, key)` in insertion order
  pub fn iter(&self) -> impl Iterator<Item = (&str, &K)> {
    self.keys.iter().map(|(k, v)| (k.as_str(), v))
  }

  /// Key ids in insertion order
  pub fn key_ids(&self) -> impl Iterator<Item = &str> {
    self.keys.keys().map(|k| k.as_str())
  }

  pub fn len(&self) -> usize {
    self.keys.len()
  }

  pub fn is_empty(&self) -> bool {
    self.keys.is_empty()
  }
}

/* -------------------------------- */
/// Builder collecting keys before freezing them into a [`KeyStore`]
pub struct KeyStoreBuilder<K> {
  entries: Vec<(String, K)>,
}

impl<K> Default for KeyStoreBuilder<K> {
  fn default() -> Self {
    Self { entries: Vec::new() }
  }
}

impl<K> KeyStoreBuilder<K> {
  /// Register a key under the given id
  pub fn add(mut self, key_id: impl Into<String>, key: impl Into<K>) -> Self {
    self.entries.push((key_id.into(), key.into()));
    self
  }

  /// Freeze into an immutable store. Fails on an empty or duplicate key id.
  pub fn build(self) -> ReqSigResult<KeyStore<K>> {
    if self.entries.iter().any(|(id, _)| id.is_empty()) {
      return Err(ReqSigError::InvalidConfig("key id must not be empty".to_string()));
    }
    let mut seen = FxHashSet::default();
    if let Some((dup, _)) = self.entries.iter().find(|(id, _)| !seen.insert(id.as_str())) {
      return Err(ReqSigError::DuplicateKeyId(dup.clone()));
    }
    let keys = self.entries.into_iter().collect::<KeyMap<K>>();
    Ok(KeyStore { keys })
  }
}
