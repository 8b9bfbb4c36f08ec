use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("store error: {0}")]
    Store(#[from] dsr_store::StoreError),

    #[error("identifier error: {0}")]
    Type(#[from] dsr_types::TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ContentResult<T> = Result<T, ContentError>;
