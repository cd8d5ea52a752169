use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Message text is required")]
    EmptyText,

    #[error("Could not write messages file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not serialize messages: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Local storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt local message list: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("File is too large: {name} is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("Could not read attachment: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
