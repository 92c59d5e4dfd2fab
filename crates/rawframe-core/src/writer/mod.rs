pub mod direct;
pub mod discard;

use std::path::Path;

use crate::control::CaptureControl;
use crate::error::{RawFileError, Result};
use crate::frame::Frame;
use crate::mode::OpenMode;

pub use direct::DirectRawWriter;
pub use discard::DiscardWriter;

/// Bytes and frames accepted during the current (or last) session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_written: u64,
    /// Bytes on disk, including the header and alignment padding.
    pub bytes_written: u64,
}

/// Lifecycle the acquisition framework drives a file writer through:
/// `open_file`, any number of `write_file`, then `close_file`.
///
/// Calls for one writer are always sequential.
pub trait FrameFileWriter {
    /// Start a new file, closing any file already open. `frame` describes the
    /// arrays that will follow and is used to build the file header.
    fn open_file(
        &mut self,
        path: &Path,
        mode: OpenMode,
        frame: &Frame<'_>,
        control: &mut CaptureControl,
    ) -> Result<()>;

    /// Append one frame's payload.
    fn write_file(&mut self, frame: &Frame<'_>) -> Result<()>;

    /// Raw files cannot be read back.
    fn read_file(&mut self) -> Result<Vec<u8>> {
        Err(RawFileError::ReadUnsupported)
    }

    /// Finish the current file. Closing when nothing is open succeeds.
    fn close_file(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Whether the open file bypasses the page cache.
    fn is_direct(&self) -> bool {
        false
    }

    fn stats(&self) -> SessionStats;
}

/// Checks every writer performs before touching the filesystem.
pub(crate) fn check_open_request(mode: OpenMode, control: &mut CaptureControl) -> Result<()> {
    if !mode.is_supported() {
        control.halt();
        return Err(RawFileError::UnsupportedMode { mode });
    }
    if control.num_capture < 0 {
        return Err(RawFileError::InvalidCaptureCount(control.num_capture));
    }
    Ok(())
}
