//! Turning a unit/disease selection and a set of exclusions into an ordered
//! list of task configs.
//!
//! Expansion happens in 3 steps:
//! 1. Exclusions are resolved up front into an [`ExclusionSet`], either from
//!    `unit:disease` tokens or from a CSV file with `state` and `disease` columns.
//! 2. The unit and disease [`Selection`]s are resolved against the catalog,
//!    substituting the full reference set for `all`.
//! 3. The cross product is walked unit-major, excluded pairs are dropped,
//!    and a task config is built for each remaining pair.
//!
//! Wildcards only exist in selections. An exclusion entry of `all` matches
//! nothing but a unit or disease literally named `all`.

/// exclusion sets and their sources
mod exclusions;
pub use exclusions::{DataFormatError, ExclusionSet};

/// `all` vs. explicit lists of units or diseases
mod selection;
pub use selection::Selection;

/// the expander itself
mod batch;
pub use batch::expand_batch;
