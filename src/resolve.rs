use expand::{DataFormatError, ExclusionSet};
use model::ExclusionsRef;

use crate::store::ObjectStore;
use crate::Error;

const BLOB_SCHEME: &str = "az://";

/// Where a set of exclusions comes from.
#[derive(Debug, Clone, Copy)]
pub enum ExclusionSource<'a> {
    /// A CSV file: `az://<container>/<blob>` in object storage, or a local path.
    Path(&'a str),
    /// Explicit `unit:disease` tokens.
    Tokens(&'a [String]),
}

/// Resolve an exclusion source into a set of (unit, disease) pairs.
///
/// Blob paths are read through `store`; anything else is read from the local filesystem.
pub fn resolve_exclusions<S: ObjectStore + ?Sized>(
    source: ExclusionSource,
    store: &S,
) -> Result<ExclusionSet, Error> {
    match source {
        ExclusionSource::Tokens(tokens) => Ok(ExclusionSet::from_tokens(tokens)?),
        ExclusionSource::Path(path) if path.starts_with(BLOB_SCHEME) => {
            let (container, blob) = syntax::blob_path(path)?;
            log::debug!("reading exclusions from blob {blob} in container {container}");
            let bytes = store
                .read(container, blob)
                .map_err(|e| DataFormatError::Read(path.to_owned(), e.to_string()))?;
            Ok(ExclusionSet::from_csv_reader(bytes.as_slice(), path)?)
        }
        ExclusionSource::Path(path) => {
            log::debug!("reading exclusions from local file {path}");
            let file = std::fs::File::open(path)
                .map_err(|e| DataFormatError::Read(path.to_owned(), e.to_string()))?;
            Ok(ExclusionSet::from_csv_reader(file, path)?)
        }
    }
}

/// The reference recorded in each task config for an exclusions file.
pub(crate) fn exclusions_ref(path: &str) -> Result<ExclusionsRef, Error> {
    if path.starts_with(BLOB_SCHEME) {
        let (container, blob) = syntax::blob_path(path)?;
        Ok(ExclusionsRef::blob(container, blob))
    } else {
        Ok(ExclusionsRef::local(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use anyhow::Result;

    #[test]
    fn test_tokens() -> Result<()> {
        let tokens = vec!["NY:COVID-19".to_owned()];
        let set = resolve_exclusions(ExclusionSource::Tokens(&tokens), &MemoryStore::new())?;
        assert!(set.contains("NY", "COVID-19"));

        let bad = vec!["NY".to_owned()];
        assert!(matches!(
            resolve_exclusions(ExclusionSource::Tokens(&bad), &MemoryStore::new()),
            Err(Error::Validation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_blob() -> Result<()> {
        let store = MemoryStore::new();
        store.write("nssp-etl", "outliers-v2/2024-12-17.csv", b"state,disease\nNY,Influenza\n")?;
        let set = resolve_exclusions(
            ExclusionSource::Path("az://nssp-etl/outliers-v2/2024-12-17.csv"),
            &store,
        )?;
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![("NY", "Influenza")]);

        assert!(matches!(
            resolve_exclusions(ExclusionSource::Path("az://nssp-etl/missing.csv"), &store),
            Err(Error::DataFormat(DataFormatError::Read(..)))
        ));
        Ok(())
    }

    #[test]
    fn test_local_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("exclusions.csv");
        std::fs::write(&path, "state,disease\nTX,COVID-19\n")?;
        let path = path.to_str().ok_or(util::PathEncodingError)?;

        let set = resolve_exclusions(ExclusionSource::Path(path), &MemoryStore::new())?;
        assert!(set.contains("TX", "COVID-19"));

        let missing = dir.path().join("missing.csv");
        let missing = missing.to_str().ok_or(util::PathEncodingError)?;
        assert!(matches!(
            resolve_exclusions(ExclusionSource::Path(missing), &MemoryStore::new()),
            Err(Error::DataFormat(_))
        ));
        Ok(())
    }

    #[test]
    fn test_exclusions_ref() -> Result<()> {
        assert_eq!(
            exclusions_ref("az://nssp-etl/outliers-v2/2024-12-17.csv")?,
            ExclusionsRef::blob("nssp-etl", "outliers-v2/2024-12-17.csv")
        );
        assert_eq!(exclusions_ref("local.csv")?, ExclusionsRef::local("local.csv"));
        assert!(exclusions_ref("az://no-blob").is_err());
        Ok(())
    }
}
