pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The page height is not positive or does not fit the cache format.
    #[error("page height must be in 1..=65535, got {0}")]
    InvalidPageHeight(i32),

    #[error("page list magic mismatch at {at}")]
    BadMagic { at: &'static str },

    #[error("page list checksum mismatch: stored {expected:#010x}, computed {found:#010x}")]
    ChecksumMismatch { expected: u32, found: u32 },

    #[error("page list data ends in the middle of a record")]
    Truncated,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("event script: {0}")]
    Script(String),
}
