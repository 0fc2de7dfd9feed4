use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{check_key, ObjectStore, PersistenceError};

/// In-memory object store, for tests and for callers that handle the bytes themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RefCell<BTreeMap<(String, String), Vec<u8>>>,
    writes: Cell<usize>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail with [`PersistenceError::Unavailable`].
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl ObjectStore for MemoryStore {
    fn write(&self, container: &str, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        check_key(key)?;
        if self.fail_writes {
            return Err(PersistenceError::Unavailable(format!(
                "write to {container}/{key} refused"
            )));
        }
        self.objects
            .borrow_mut()
            .insert((container.to_owned(), key.to_owned()), bytes.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn read(&self, container: &str, key: &str) -> Result<Vec<u8>, PersistenceError> {
        self.objects
            .borrow()
            .get(&(container.to_owned(), key.to_owned()))
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(container.to_owned(), key.to_owned()))
    }

    fn exists(&self, container: &str, key: &str) -> Result<bool, PersistenceError> {
        Ok(self
            .objects
            .borrow()
            .contains_key(&(container.to_owned(), key.to_owned())))
    }

    fn list(&self, container: &str) -> Result<Vec<String>, PersistenceError> {
        // BTreeMap keeps (container, key) sorted, so keys come out in order.
        Ok(self
            .objects
            .borrow()
            .keys()
            .filter(|(c, _)| c == container)
            .map(|(_, k)| k.clone())
            .collect())
    }
}
