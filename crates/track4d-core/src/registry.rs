//! Named registry for structures produced during a run.

use std::collections::BTreeMap;

use crate::error::{Result, Track4dError};
use crate::structure::Structure;

/// Registry of named structures owned by a single benchmark run.
///
/// Names are unique: registering a second structure under an existing name is an
/// error rather than an overwrite.
#[derive(Debug)]
pub struct Registry<T: Structure> {
    entries: BTreeMap<String, T>,
}

impl<T: Structure> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: Structure> Registry<T> {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a structure under its own name.
    ///
    /// Returns an error if a structure with the same name already exists.
    pub fn register(&mut self, structure: T) -> Result<()> {
        let name = structure.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(Track4dError::DuplicateTrack(name));
        }
        log::debug!("registered {} '{}'", structure.type_name(), name);
        self.entries.insert(name, structure);
        Ok(())
    }

    /// Gets a structure by name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Gets a structure by name, failing if it is absent.
    pub fn require(&self, name: &str) -> Result<&T> {
        self.get(name)
            .ok_or_else(|| Track4dError::TrackNotFound(name.to_string()))
    }

    /// Checks if a structure with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns all registered names, ordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of registered structures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
