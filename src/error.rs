use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Element access outside the matrix bounds.
    #[error("index ({row}, {col}) out of range for a {rows}x{cols} matrix")]
    Index {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Two shapes that cannot be combined by `op`.
    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("the network has to be compiled before use")]
    NotCompiled,

    #[error("the network is already compiled; its structure is fixed")]
    AlreadyCompiled,

    #[error("failed to deserialize network: {0}")]
    Deserialization(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn mismatch(op: &'static str, left: (usize, usize), right: (usize, usize)) -> Self {
        Error::DimensionMismatch { op, left, right }
    }
}
