use expand::DataFormatError;
use model::ValidationError;

use crate::store::PersistenceError;

/// Everything that can go wrong in a generation run, by kind.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    DataFormat(#[from] DataFormatError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<syntax::Error> for Error {
    fn from(e: syntax::Error) -> Self {
        Self::Validation(e.into())
    }
}
