//! Ordered, duplicate-free set of cache reference tokens.

use std::collections::HashMap;

use super::traits::CacheRef;

/// Members of a cached collection, in order.
///
/// Keeps an explicit token → position index so a single member can be found,
/// replaced or removed by identity without scanning for a matching field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefSet {
  refs: Vec<CacheRef>,
  positions: HashMap<CacheRef, usize>,
}

impl RefSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.refs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.refs.is_empty()
  }

  pub fn contains(&self, cache_ref: &CacheRef) -> bool {
    self.positions.contains_key(cache_ref)
  }

  pub fn position(&self, cache_ref: &CacheRef) -> Option<usize> {
    self.positions.get(cache_ref).copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = &CacheRef> {
    self.refs.iter()
  }

  /// Append a token. Returns false if it was already a member.
  pub fn push(&mut self, cache_ref: CacheRef) -> bool {
    if self.positions.contains_key(&cache_ref) {
      return false;
    }
    self.positions.insert(cache_ref.clone(), self.refs.len());
    self.refs.push(cache_ref);
    true
  }

  /// Remove a token. Returns false if it wasn't a member.
  pub fn remove(&mut self, cache_ref: &CacheRef) -> bool {
    let Some(index) = self.positions.remove(cache_ref) else {
      return false;
    };
    self.refs.remove(index);
    for (i, r) in self.refs.iter().enumerate().skip(index) {
      self.positions.insert(r.clone(), i);
    }
    true
  }

  /// Swap the token of one member in place, keeping its position.
  ///
  /// Returns false if `old` isn't a member. If `new` already belongs to a
  /// different position, that duplicate is dropped.
  pub fn replace(&mut self, old: &CacheRef, new: CacheRef) -> bool {
    let Some(index) = self.position(old) else {
      return false;
    };
    if old == &new {
      return true;
    }
    if self.contains(&new) {
      self.remove(&new);
    }
    // Removal may have shifted the member left
    let index = self.position(old).unwrap_or(index);
    self.positions.remove(old);
    self.positions.insert(new.clone(), index);
    self.refs[index] = new;
    true
  }
}

impl FromIterator<CacheRef> for RefSet {
  fn from_iter<I: IntoIterator<Item = CacheRef>>(iter: I) -> Self {
    let mut set = RefSet::new();
    for r in iter {
      set.push(r);
    }
    set
  }
}
