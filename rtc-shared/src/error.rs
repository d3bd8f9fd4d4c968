use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("ssrc: registry used after destroy")]
    ErrSsrcRegistryDestroyed,
    #[error("ssrc: registry already destroyed")]
    ErrSsrcRegistryAlreadyDestroyed,
}
