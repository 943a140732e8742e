use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encode error: {0}")]
    Encode(#[from] bincode::Error),
    #[error("snapshot format version {found} unsupported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}
