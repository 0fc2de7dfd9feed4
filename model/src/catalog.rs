use crate::ValidationError;

/// Literal value meaning "every recognized unit" or "every recognized disease"
/// when selecting what to generate. Never a wildcard in exclusion entries.
pub const WILDCARD: &str = "all";

const ALL_STATES: &[&str] = &[
    "AK", "AL", "AR", "AS", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI", "IA", "ID",
    "IL", "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND",
    "NE", "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX",
    "UT", "VA", "VT", "WA", "WI", "WV", "WY", "US",
];

// territories and states without usable NSSP coverage:
const NSSP_STATES_OMIT: &[&str] = &["AS", "FM", "MH", "NP", "PR", "PW", "VI", "MO", "GU"];

const DISEASES: &[&str] = &["COVID-19", "Influenza"];

const DATA_SOURCES: &[&str] = &["nhsn", "nssp"];

/// The recognized reference sets of units, diseases and data sources.
///
/// Ordering is significant: batches are always enumerated in catalog order,
/// so that the same inputs produce the same, diffable output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    units: Vec<String>,
    diseases: Vec<String>,
    data_sources: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::nssp()
    }
}

impl Catalog {
    /// Create a catalog from explicit reference sets.
    pub fn new(units: Vec<String>, diseases: Vec<String>, data_sources: Vec<String>) -> Self {
        Self {
            units,
            diseases,
            data_sources,
        }
    }

    /// Units covered by NSSP data, plus the two diseases we model.
    pub fn nssp() -> Self {
        let units = ALL_STATES
            .iter()
            .filter(|s| !NSSP_STATES_OMIT.contains(*s))
            .map(|s| s.to_string())
            .collect();
        Self::new(
            units,
            DISEASES.iter().map(|s| s.to_string()).collect(),
            DATA_SOURCES.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn diseases(&self) -> &[String] {
        &self.diseases
    }

    pub fn is_unit(&self, unit: &str) -> bool {
        self.units.iter().any(|u| u == unit)
    }

    pub fn is_disease(&self, disease: &str) -> bool {
        self.diseases.iter().any(|d| d == disease)
    }

    /// Fail unless `unit` is a recognized unit.
    pub fn check_unit(&self, unit: &str) -> Result<(), ValidationError> {
        if self.is_unit(unit) {
            Ok(())
        } else {
            Err(ValidationError::UnknownUnit(unit.to_owned()))
        }
    }

    /// Fail unless `disease` is a recognized disease.
    pub fn check_disease(&self, disease: &str) -> Result<(), ValidationError> {
        if self.is_disease(disease) {
            Ok(())
        } else {
            Err(ValidationError::UnknownDisease(
                disease.to_owned(),
                self.diseases.join(", "),
            ))
        }
    }

    /// Fail unless `source` is a recognized data source tag.
    pub fn check_data_source(&self, source: &str) -> Result<(), ValidationError> {
        if self.data_sources.iter().any(|s| s == source) {
            Ok(())
        } else {
            Err(ValidationError::UnknownDataSource(
                source.to_owned(),
                self.data_sources.join(", "),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nssp_units() {
        let catalog = Catalog::nssp();
        assert_eq!(catalog.units().len(), 51);
        assert_eq!(catalog.units().first().map(String::as_str), Some("AK"));
        assert_eq!(catalog.units().last().map(String::as_str), Some("US"));
        assert!(!catalog.is_unit("MO"));
        assert!(!catalog.is_unit("AS"));
        assert!(catalog.is_unit("NY"));
    }

    #[test]
    fn test_checks() {
        let catalog = Catalog::default();
        assert!(catalog.check_disease("Influenza").is_ok());
        assert!(matches!(
            catalog.check_disease("RSV"),
            Err(ValidationError::UnknownDisease(..))
        ));
        assert!(matches!(
            catalog.check_unit(WILDCARD),
            Err(ValidationError::UnknownUnit(..))
        ));
        assert!(catalog.check_data_source("nssp").is_ok());
        assert!(catalog.check_data_source("hhs").is_err());
    }
}
