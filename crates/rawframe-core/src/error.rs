use std::path::PathBuf;

use thiserror::Error;

use crate::mode::OpenMode;

#[derive(Error, Debug)]
pub enum RawFileError {
    #[error("Unsupported open mode {mode:?}: raw files are write-only and cannot be appended")]
    UnsupportedMode { mode: OpenMode },

    #[error("Invalid number of frames to capture: {0} (must be >= 0)")]
    InvalidCaptureCount(i32),

    #[error("Invalid writer configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to create output file {}: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No raw file is open")]
    NotOpen,

    #[error("Write to {} failed: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to allocate {size} byte buffer aligned to {alignment}")]
    AllocationFailed { size: usize, alignment: usize },

    #[error("Frame payload of {size} bytes exceeds scratch buffer capacity of {capacity} bytes")]
    PayloadTooLarge { size: usize, capacity: usize },

    #[error("Reading raw files is not supported")]
    ReadUnsupported,

    #[error("Invalid raw header: {0}")]
    InvalidHeader(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RawFileError>;
