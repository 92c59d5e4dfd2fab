use serde::{Deserialize, Serialize};

use crate::aligned::round_up;
use crate::consts::{DEFAULT_ALIGNMENT, DEFAULT_BUFFER_CAPACITY, HEADER_SIZE};
use crate::error::{RawFileError, Result};

/// Whether raw files are opened with `O_DIRECT`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectIo {
    /// Fail the open if the filesystem refuses direct I/O.
    Required,
    /// Use direct I/O when the filesystem supports it, buffered I/O otherwise.
    #[default]
    Preferred,
    /// Always use the page cache.
    Disabled,
}

impl std::fmt::Display for DirectIo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectIo::Required => write!(f, "Required"),
            DirectIo::Preferred => write!(f, "Preferred"),
            DirectIo::Disabled => write!(f, "Disabled"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Alignment unit for buffer addresses and transfer sizes.
    pub alignment: usize,
    /// Scratch buffer size: the largest payload a session accepts.
    pub buffer_capacity: usize,
    pub direct_io: DirectIo,
    /// `fsync` the file before closing it.
    pub sync_on_close: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            direct_io: DirectIo::default(),
            sync_on_close: false,
        }
    }
}

impl WriterConfig {
    /// Page-cache writer with a small scratch buffer.
    pub fn buffered(buffer_capacity: usize) -> Self {
        Self {
            buffer_capacity,
            direct_io: DirectIo::Disabled,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.alignment.is_power_of_two() {
            return Err(RawFileError::InvalidConfig(format!(
                "alignment must be a power of two, got {}",
                self.alignment
            )));
        }
        if self.buffer_capacity < self.padded_header_size() {
            return Err(RawFileError::InvalidConfig(format!(
                "buffer capacity {} is smaller than the {} byte header",
                self.buffer_capacity,
                self.padded_header_size()
            )));
        }
        Ok(())
    }

    /// Bytes the header occupies on disk.
    pub fn padded_header_size(&self) -> usize {
        round_up(HEADER_SIZE, self.alignment)
    }

    /// Bytes a payload of `data_size` occupies on disk.
    pub fn padded_frame_size(&self, data_size: usize) -> usize {
        round_up(data_size, self.alignment)
    }
}
