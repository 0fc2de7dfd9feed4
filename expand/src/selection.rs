use model::{Catalog, ValidationError};

/// Which units (or diseases) to generate configs for.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every member of the reference set.
    #[default]
    All,
    /// Only these values. Order and repetition don't matter.
    Only(Vec<String>),
}

impl Selection {
    /// Parse `all`, `*`, a single value, or a comma-separated list.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        Ok(match syntax::options(text)? {
            syntax::Options::All => Self::All,
            syntax::Options::Listed(values) => {
                Self::Only(values.into_iter().map(str::to_owned).collect())
            }
        })
    }

    /// Resolve against the reference set `members`, returning the selected
    /// values in reference-set order. `check` rejects values that aren't members.
    fn resolve<'a, F>(&self, members: &'a [String], check: F) -> Result<Vec<&'a str>, ValidationError>
    where
        F: Fn(&str) -> Result<(), ValidationError>,
    {
        match self {
            Self::All => Ok(members.iter().map(String::as_str).collect()),
            Self::Only(values) => {
                for value in values {
                    check(value)?;
                }
                Ok(members
                    .iter()
                    .filter(|m| values.iter().any(|v| v == *m))
                    .map(String::as_str)
                    .collect())
            }
        }
    }

    /// The selected units, in catalog order.
    pub fn units<'a>(&self, catalog: &'a Catalog) -> Result<Vec<&'a str>, ValidationError> {
        self.resolve(catalog.units(), |u| catalog.check_unit(u))
    }

    /// The selected diseases, in catalog order.
    pub fn diseases<'a>(&self, catalog: &'a Catalog) -> Result<Vec<&'a str>, ValidationError> {
        self.resolve(catalog.diseases(), |d| catalog.check_disease(d))
    }
}
