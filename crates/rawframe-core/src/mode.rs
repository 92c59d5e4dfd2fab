bitflags::bitflags! {
    /// How the acquisition framework asks for a file to be opened.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpenMode: u32 {
        const READ = 0x01;
        const WRITE = 0x02;
        const APPEND = 0x04;
        /// Several frames will be written between open and close.
        const MULTIPLE = 0x08;
    }
}

impl OpenMode {
    /// Raw files can only be created fresh and written.
    pub fn is_supported(self) -> bool {
        !self.intersects(OpenMode::READ | OpenMode::APPEND)
    }
}
