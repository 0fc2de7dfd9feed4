mod clock;
pub use clock::{Clock, FixedClock, SystemClock};

mod timer;
pub use timer::Timer;

#[derive(thiserror::Error, Debug)]
#[error("Filesystem path is not valid UTF-8")]
pub struct PathEncodingError;

pub type Hasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;
pub type HashSet<T> = std::collections::HashSet<T, Hasher>;
