use std::fs;
use std::path::{Path, PathBuf};

use util::PathEncodingError;

use super::{check_key, ObjectStore, PersistenceError};

/// All filesystem access for stored objects goes through this struct.
///
/// Each container is a directory under `root`, and each key a relative path
/// inside it. Writes are only performed under `root`; in dry-run mode they are
/// logged and skipped.
#[derive(Debug)]
pub struct LocalStore {
    /// The directory we are allowed to modify
    root: PathBuf,
    /// if true, prevents all writes
    dry_run: bool,
}

impl LocalStore {
    /// Create a new `LocalStore` rooted at the given directory.
    pub fn new(root: &Path, dry_run: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            dry_run,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check whether the root dir exists, and create it if not.
    pub fn ensure_root_exists(&mut self, verbose: bool) -> Result<(), PersistenceError> {
        if !self.root.exists() {
            if self.dry_run {
                eprintln!("Dry run. Not creating store directory {:?}", self.root);
                return Ok(());
            }
            if verbose {
                eprintln!("Store directory {:?} doesn't exist. Creating.", self.root);
            }
            fs::create_dir_all(&self.root).map_err(io_err("creating store directory"))?;
        } else if !self.root.is_dir() {
            return Err(PersistenceError::Unavailable(format!(
                "store root \"{}\" is not a directory",
                self.root.to_str().ok_or(PathEncodingError)?
            )));
        }

        self.root = self
            .root
            .canonicalize()
            .map_err(io_err("resolving store directory"))?;
        Ok(())
    }

    fn container_path(&self, container: &str) -> Result<PathBuf, PersistenceError> {
        if container.is_empty() || container.contains(['/', '\\']) || container.starts_with('.') {
            return Err(PersistenceError::InvalidKey(container.to_owned()));
        }
        Ok(self.root.join(container))
    }

    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf, PersistenceError> {
        check_key(key)?;
        let mut path = self.container_path(container)?;
        path.extend(key.split('/'));
        Ok(path)
    }

    fn check_whitelist(&self, path: &Path) -> Result<(), PersistenceError> {
        if path.starts_with(&self.root) {
            Ok(())
        } else {
            Err(PersistenceError::NotWhitelisted(
                path.to_str().ok_or(PathEncodingError)?.to_owned(),
            ))
        }
    }

    /// Recursively collect keys below `dir`, relative to `prefix`.
    fn collect_keys(
        &self,
        dir: &Path,
        prefix: &str,
        keys: &mut Vec<String>,
    ) -> Result<(), PersistenceError> {
        for entry in fs::read_dir(dir).map_err(io_err("listing container"))? {
            let entry = entry.map_err(io_err("listing container"))?;
            let name = entry.file_name();
            let name = name.to_str().ok_or(PathEncodingError)?;
            let key = if prefix.is_empty() {
                name.to_owned()
            } else {
                format!("{prefix}/{name}")
            };
            let path = entry.path();
            if path.is_dir() {
                self.collect_keys(&path, &key, keys)?;
            } else {
                keys.push(key);
            }
        }
        Ok(())
    }
}

impl ObjectStore for LocalStore {
    fn write(&self, container: &str, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        let path = self.object_path(container, key)?;
        self.check_whitelist(&path)?;

        if self.dry_run {
            eprintln!("Dry run. Not writing {} bytes to {:?}", bytes.len(), path);
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err("creating parent dir"))?;
        }
        log::debug!("writing {} bytes to {:?}", bytes.len(), path);
        fs::write(&path, bytes).map_err(io_err("writing object"))
    }

    fn read(&self, container: &str, key: &str) -> Result<Vec<u8>, PersistenceError> {
        let path = self.object_path(container, key)?;
        if !path.is_file() {
            return Err(PersistenceError::NotFound(container.to_owned(), key.to_owned()));
        }
        fs::read(&path).map_err(io_err("reading object"))
    }

    fn exists(&self, container: &str, key: &str) -> Result<bool, PersistenceError> {
        Ok(self.object_path(container, key)?.is_file())
    }

    fn list(&self, container: &str) -> Result<Vec<String>, PersistenceError> {
        let dir = self.container_path(container)?;
        let mut keys = Vec::new();
        if dir.is_dir() {
            self.collect_keys(&dir, "", &mut keys)?;
        }
        keys.sort();
        Ok(keys)
    }
}

fn io_err(context: &'static str) -> impl Fn(std::io::Error) -> PersistenceError {
    move |source| PersistenceError::Io {
        context: context.to_owned(),
        source,
    }
}
