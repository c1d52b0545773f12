//! Keyed containers backing the [`World`](crate::World).
//!
//! Regions and airports have globally unique identifiers and live in a
//! [`UniqueIndex`]. Fixes and airways share identifiers across regions or
//! levels, so they live in a [`MultiIndex`] where the disambiguating field is
//! checked at lookup time.

use std::collections::HashMap;

/// Map holding at most one value per key.
#[derive(Debug, Clone)]
pub struct UniqueIndex<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for UniqueIndex<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> UniqueIndex<T> {
    /// Return the value for `key`, inserting `create()` first if absent.
    pub fn get_or_insert_with<F>(&mut self, key: &str, create: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.entries.entry(key.to_string()).or_insert_with(create)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Map from a key to an ordered list of candidates sharing that key.
#[derive(Debug, Clone)]
pub struct MultiIndex<T> {
    entries: HashMap<String, Vec<T>>,
    len: usize,
}

impl<T> Default for MultiIndex<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            len: 0,
        }
    }
}

impl<T> MultiIndex<T> {
    /// Append `value` to the candidates of `key`.
    pub fn insert(&mut self, key: &str, value: T) {
        self.entries.entry(key.to_string()).or_default().push(value);
        self.len += 1;
    }

    /// All candidates for `key` in insertion order.
    pub fn candidates(&self, key: &str) -> &[T] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First candidate for `key` accepted by `predicate`.
    pub fn find<P>(&self, key: &str, predicate: P) -> Option<&T>
    where
        P: Fn(&T) -> bool,
    {
        self.candidates(key).iter().find(|value| predicate(value))
    }

    pub fn find_mut<P>(&mut self, key: &str, predicate: P) -> Option<&mut T>
    where
        P: Fn(&T) -> bool,
    {
        self.entries
            .get_mut(key)?
            .iter_mut()
            .find(|value| predicate(value))
    }

    /// First candidate accepted by `predicate`, inserting `create()` if none is.
    pub fn find_or_insert_with<P, F>(&mut self, key: &str, predicate: P, create: F) -> &mut T
    where
        P: Fn(&T) -> bool,
        F: FnOnce() -> T,
    {
        let candidates = self.entries.entry(key.to_string()).or_default();
        let position = match candidates.iter().position(|value| predicate(value)) {
            Some(position) => position,
            None => {
                candidates.push(create());
                self.len += 1;
                candidates.len() - 1
            }
        };
        &mut candidates[position]
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values().flatten()
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of stored values across all keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
