use std::collections::BTreeSet;
use std::io::Read;

use model::ValidationError;

const STATE_COLUMN: &str = "state";
const DISEASE_COLUMN: &str = "disease";

/// Unreadable or schema-mismatched exclusion file.
#[derive(Debug, thiserror::Error)]
pub enum DataFormatError {
    #[error("Unable to read exclusions from {0}: {1}")]
    Read(String, String),
    #[error("Exclusions file {0} is missing required column \"{1}\"")]
    MissingColumn(String, &'static str),
    #[error("Exclusions file {0} has an empty \"{2}\" on line {1}")]
    EmptyCell(String, u64, &'static str),
}

/// A set of (unit, disease) pairs to leave out of a batch.
///
/// Membership is exact string equality on both halves.
/// Iteration is sorted, so anything derived from a set is reproducible.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    pairs: BTreeSet<(String, String)>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse explicit `unit:disease` tokens.
    /// Each token may itself hold several comma-separated pairs.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ValidationError> {
        let mut set = Self::new();
        for token in tokens {
            for (unit, disease) in syntax::pairs(token.as_ref())? {
                set.insert(unit, disease);
            }
        }
        log::debug!("parsed {} exclusion(s) from {} token(s)", set.len(), tokens.len());
        Ok(set)
    }

    /// Read a CSV document with a header row containing at least `state` and
    /// `disease` columns. Every row is one pair; repeated rows collapse.
    ///
    /// `source` only labels error messages.
    pub fn from_csv_reader<R: Read>(reader: R, source: &str) -> Result<Self, DataFormatError> {
        let read_err = |e: csv::Error| DataFormatError::Read(source.to_owned(), e.to_string());

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(read_err)?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataFormatError::MissingColumn(source.to_owned(), name))
        };
        let state_idx = column(STATE_COLUMN)?;
        let disease_idx = column(DISEASE_COLUMN)?;

        let mut set = Self::new();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let cell = |idx: usize, name: &'static str| match record.get(idx) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => Err(DataFormatError::EmptyCell(source.to_owned(), line, name)),
            };
            set.insert(cell(state_idx, STATE_COLUMN)?, cell(disease_idx, DISEASE_COLUMN)?);
        }
        log::debug!("read {} exclusion(s) from {source}", set.len());
        Ok(set)
    }

    /// Every pair of the `units` x `diseases` cross product that is *not* in this set.
    pub fn complement<U, D>(&self, units: &[U], diseases: &[D]) -> Self
    where
        U: AsRef<str>,
        D: AsRef<str>,
    {
        let mut set = Self::new();
        for unit in units.iter().map(AsRef::as_ref) {
            for disease in diseases.iter().map(AsRef::as_ref) {
                if !self.contains(unit, disease) {
                    set.insert(unit, disease);
                }
            }
        }
        set
    }

    pub fn union(mut self, other: Self) -> Self {
        self.pairs.extend(other.pairs);
        self
    }

    pub fn insert(&mut self, unit: &str, disease: &str) {
        self.pairs.insert((unit.to_owned(), disease.to_owned()));
    }

    pub fn contains(&self, unit: &str, disease: &str) -> bool {
        // BTreeSet<(String, String)> can't be queried with borrowed halves.
        self.pairs.iter().any(|(u, d)| u == unit && d == disease)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(u, d)| (u.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
