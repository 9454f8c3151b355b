use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] stemma_core::Error),

    #[error("No authenticated session; load/save refused")]
    AuthRequired,

    #[error(transparent)]
    Persistence(#[from] StoreError),
}
