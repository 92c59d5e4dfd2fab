use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::aligned::AlignedBuffer;
use crate::config::{DirectIo, WriterConfig};
use crate::control::CaptureControl;
use crate::error::{RawFileError, Result};
use crate::frame::Frame;
use crate::header::RawHeader;
use crate::mode::OpenMode;
use crate::writer::{check_open_request, FrameFileWriter, SessionStats};

/// Everything owned between a successful open and the matching close.
/// Dropping it closes the descriptor and frees the scratch buffer.
struct Session {
    file: File,
    buffer: AlignedBuffer,
    path: PathBuf,
    header: RawHeader,
    direct: bool,
    stats: SessionStats,
}

impl Session {
    /// Write the first `len` bytes of the scratch buffer. `write_all` keeps
    /// going after short writes and retries on `EINTR`.
    ///
    /// With `O_DIRECT` only the `EINTR` retry can succeed: resubmitting the
    /// tail of a short write uses an unaligned offset and length, which the
    /// kernel rejects with `EINVAL`, surfacing as `WriteFailed`.
    fn write_staged(&mut self, len: usize) -> Result<()> {
        self.file
            .write_all(&self.buffer.as_slice()[..len])
            .map_err(|source| RawFileError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        self.stats.bytes_written += len as u64;
        Ok(())
    }
}

/// Streams frames into a raw file through an aligned scratch buffer,
/// bypassing the page cache where the filesystem allows it.
///
/// File layout: the [`RawHeader`] padded to the alignment unit, then each
/// frame's payload padded to the alignment unit. Padding is zero.
pub struct DirectRawWriter {
    config: WriterConfig,
    session: Option<Session>,
    last_stats: SessionStats,
}

impl DirectRawWriter {
    pub fn new(config: WriterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            session: None,
            last_stats: SessionStats::default(),
        })
    }

    /// Path of the open file.
    pub fn path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.path.as_path())
    }

    /// Header written for the open file.
    pub fn header(&self) -> Option<&RawHeader> {
        self.session.as_ref().map(|s| &s.header)
    }

    /// Largest payload `write_file` accepts.
    pub fn capacity(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.buffer.capacity())
    }

    fn create(&self, path: &Path) -> Result<(File, bool)> {
        open_with_policy(self.config.direct_io, path, |direct| {
            open_options(direct).open(path)
        })
        .map_err(|source| {
            error!(path = %path.display(), %source, "Failed to create a new output file");
            RawFileError::OpenFailed {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

/// Run `open` with or without `O_DIRECT` as `policy` dictates. Returns the
/// opened handle and whether direct I/O is in effect.
fn open_with_policy<T>(
    policy: DirectIo,
    path: &Path,
    mut open: impl FnMut(bool) -> std::io::Result<T>,
) -> std::io::Result<(T, bool)> {
    let mut attempt = |direct: bool| open(direct).map(|f| (f, direct));
    match policy {
        DirectIo::Disabled => attempt(false),
        DirectIo::Required => attempt(true),
        DirectIo::Preferred => match attempt(true) {
            Err(e) if direct_io_refused(&e) => {
                warn!(
                    path = %path.display(),
                    "Filesystem refused direct I/O, falling back to buffered writes"
                );
                attempt(false)
            }
            other => other,
        },
    }
}

impl FrameFileWriter for DirectRawWriter {
    fn open_file(
        &mut self,
        path: &Path,
        mode: OpenMode,
        frame: &Frame<'_>,
        control: &mut CaptureControl,
    ) -> Result<()> {
        debug!(path = %path.display(), ?mode, "Opening raw file");
        if let Err(e) = check_open_request(mode, control) {
            error!("{e}");
            return Err(e);
        }

        if self.session.is_some() {
            if let Err(e) = self.close_file() {
                warn!("Error closing previous raw file: {e}");
            }
        }

        // Allocate first so a failed allocation leaves the target path alone.
        let mut buffer = AlignedBuffer::new(self.config.buffer_capacity, self.config.alignment)?;
        let header = RawHeader::from_frame(frame);
        let padded = buffer.stage(&header.encode())?;
        let (file, direct) = self.create(path)?;

        let mut session = Session {
            file,
            buffer,
            path: path.to_path_buf(),
            header,
            direct,
            stats: SessionStats::default(),
        };
        session.write_staged(padded)?;

        info!(
            path = %path.display(),
            direct,
            unique_id = session.header.unique_id,
            flat = session.header.flat,
            dark = session.header.dark,
            "Raw file opened"
        );
        self.session = Some(session);
        Ok(())
    }

    fn write_file(&mut self, frame: &Frame<'_>) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            debug!("Raw file is not open");
            return Err(RawFileError::NotOpen);
        };

        let padded = session.buffer.stage(frame.data)?;
        if let Err(e) = session.write_staged(padded) {
            error!(unique_id = frame.unique_id, "{e}");
            return Err(e);
        }
        session.stats.frames_written += 1;
        Ok(())
    }

    fn close_file(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            debug!("Raw file was not open, ignoring close");
            return Ok(());
        };

        self.last_stats = session.stats;
        let result = if self.config.sync_on_close {
            session
                .file
                .sync_all()
                .map_err(|source| RawFileError::WriteFailed {
                    path: session.path.clone(),
                    source,
                })
        } else {
            Ok(())
        };

        info!(
            path = %session.path.display(),
            frames = session.stats.frames_written,
            bytes = session.stats.bytes_written,
            "Raw file closed"
        );
        drop(session);
        result
    }

    fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn is_direct(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.direct)
    }

    fn stats(&self) -> SessionStats {
        self.session
            .as_ref()
            .map_or(self.last_stats, |s| s.stats)
    }
}

fn open_options(direct: bool) -> OpenOptions {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o777);
    }
    if direct {
        request_direct_io(&mut opts);
    }
    opts
}

#[cfg(target_os = "linux")]
fn request_direct_io(opts: &mut OpenOptions) {
    use std::os::unix::fs::OpenOptionsExt;
    opts.custom_flags(libc::O_DIRECT);
}

#[cfg(not(target_os = "linux"))]
fn request_direct_io(_opts: &mut OpenOptions) {
    debug!("Direct I/O is not available on this platform");
}

/// `open(2)` reports `EINVAL` when the filesystem cannot do `O_DIRECT`.
#[cfg(target_os = "linux")]
fn direct_io_refused(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(libc::EINVAL)
}

#[cfg(not(target_os = "linux"))]
fn direct_io_refused(_err: &std::io::Error) -> bool {
    false
}
