/// Control values shared with the acquisition framework.
///
/// The framework owns these; writers read `num_capture` when a file is opened
/// and clear `capture` / `write_file` when an open request is refused, so the
/// pipeline stops handing them frames.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureControl {
    /// Streaming capture is enabled.
    pub capture: bool,
    /// A single-shot write has been requested.
    pub write_file: bool,
    /// Frames to capture; zero means unbounded.
    pub num_capture: i32,
}

impl CaptureControl {
    pub fn new(num_capture: i32) -> Self {
        Self {
            capture: true,
            write_file: true,
            num_capture,
        }
    }

    /// Stop the framework from calling into the writer again.
    pub fn halt(&mut self) {
        self.capture = false;
        self.write_file = false;
    }
}
