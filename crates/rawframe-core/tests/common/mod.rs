#![allow(dead_code)]

use rawframe_core::attributes::{AttributeList, AttributeValue};
use rawframe_core::config::WriterConfig;
use rawframe_core::frame::{DataType, Frame};

/// Scratch capacity used by tests: room for 4 KiB payloads.
pub const TEST_CAPACITY: usize = 4096;

/// Page-cache writer config, independent of the host filesystem's
/// direct-I/O support.
pub fn test_config() -> WriterConfig {
    WriterConfig::buffered(TEST_CAPACITY)
}

/// Deterministic payload of `len` bytes.
pub fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

/// A 16-bit mono frame of `width` x `height` over `data`.
pub fn mono16_frame(width: usize, height: usize, data: &[u8]) -> Frame<'_> {
    Frame::new(DataType::UInt16, &[width, height], data)
}

pub fn flat_dark(flat: i32, dark: i32) -> AttributeList {
    AttributeList::new()
        .with("flat", AttributeValue::Int32(flat))
        .with("dark", AttributeValue::Int32(dark))
}

pub fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
}
