use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::consts::LEGACY_DUMMY_HEADER_SIZE;
use crate::control::CaptureControl;
use crate::error::{RawFileError, Result};
use crate::frame::Frame;
use crate::mode::OpenMode;
use crate::writer::{check_open_request, FrameFileWriter, SessionStats};

/// Counting sink: goes through the full open/write/close state machine but
/// never touches the filesystem.
///
/// Useful for measuring pipeline throughput without storage in the loop.
/// This is not the legacy dummy writer, which did write a buffered file;
/// `bytes_written` is only the size that legacy format would occupy for the
/// same frames (an 8 KiB zero header followed by each payload, unpadded).
#[derive(Debug, Default)]
pub struct DiscardWriter {
    path: Option<PathBuf>,
    stats: SessionStats,
}

impl DiscardWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl FrameFileWriter for DiscardWriter {
    fn open_file(
        &mut self,
        path: &Path,
        mode: OpenMode,
        _frame: &Frame<'_>,
        control: &mut CaptureControl,
    ) -> Result<()> {
        debug!(path = %path.display(), ?mode, "Opening discard sink");
        if let Err(e) = check_open_request(mode, control) {
            error!("{e}");
            return Err(e);
        }
        self.close_file()?;

        self.path = Some(path.to_path_buf());
        self.stats = SessionStats {
            frames_written: 0,
            bytes_written: LEGACY_DUMMY_HEADER_SIZE as u64,
        };
        Ok(())
    }

    fn write_file(&mut self, frame: &Frame<'_>) -> Result<()> {
        if self.path.is_none() {
            debug!("Discard sink is not open");
            return Err(RawFileError::NotOpen);
        }
        self.stats.frames_written += 1;
        self.stats.bytes_written += frame.data_size() as u64;
        Ok(())
    }

    fn close_file(&mut self) -> Result<()> {
        match self.path.take() {
            Some(path) => debug!(path = %path.display(), "Discard sink closed"),
            None => debug!("Discard sink was not open, ignoring close"),
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.path.is_some()
    }

    fn stats(&self) -> SessionStats {
        self.stats
    }
}
