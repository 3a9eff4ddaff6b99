//! Ordered option storage.
//!
//! Render order is the order in which each key first appeared. Multi-valued
//! keys keep their values in insertion order.

use indexmap::map::Entry as Slot;
use indexmap::IndexMap;

use crate::value::Value;

/// A stored option: one value or an append-only list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Single-valued key; last write wins.
    Single(String),
    /// Multi-valued key.
    Multi(Vec<String>),
}

impl Entry {
    /// Iterates the values of the entry.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multi(values) => values,
        };
        values.iter().map(String::as_str)
    }
}

/// Ordered mapping from option key to value(s).
///
/// # Example
///
/// ```
/// use uwsgiconf_core::{OptionStore, Value};
///
/// let mut store = OptionStore::new();
/// store.set("workers", Value::from(4u32), false);
/// store.set("env", Value::from("A=1"), true);
/// store.set("env", Value::from("B=2"), true);
/// store.set("workers", Value::from(8u32), false);
///
/// let lines: Vec<_> = store.iter().collect();
/// assert_eq!(lines, vec![("workers", "8"), ("env", "A=1"), ("env", "B=2")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionStore {
    entries: IndexMap<String, Entry>,
}

impl OptionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a value.
    ///
    /// A disabled flag removes the key (or does nothing when absent). A
    /// multi write appends; a single write replaces while keeping the key's
    /// first-insertion position. Switching a key between single and multi is
    /// a re-set: the previous values are discarded.
    pub fn set(&mut self, key: &str, value: Value, multi: bool) {
        let Some(rendered) = value.render() else {
            self.entries.shift_remove(key);
            return;
        };
        match self.entries.entry(key.to_string()) {
            Slot::Occupied(mut slot) => {
                let entry = slot.get_mut();
                match (entry, multi) {
                    (Entry::Multi(values), true) => values.push(rendered),
                    (entry, true) => *entry = Entry::Multi(vec![rendered]),
                    (entry, false) => *entry = Entry::Single(rendered),
                }
            }
            Slot::Vacant(slot) => {
                slot.insert(if multi {
                    Entry::Multi(vec![rendered])
                } else {
                    Entry::Single(rendered)
                });
            }
        }
    }

    /// Moves `key` right behind `anchor` when it currently renders before it.
    pub fn place_after(&mut self, key: &str, anchor: &str) {
        let (Some(from), Some(to)) = (
            self.entries.get_index_of(key),
            self.entries.get_index_of(anchor),
        ) else {
            return;
        };
        if from < to {
            self.entries.move_index(from, to);
        }
    }

    /// Removes a key, returning its entry.
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.entries.shift_remove(key)
    }

    /// Returns the entry stored for a key.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Returns true if the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no options.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(key, value)` pairs in render order, flattening lists.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(key, entry)| entry.values().map(move |value| (key.as_str(), value)))
    }
}
