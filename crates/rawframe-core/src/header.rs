use std::io::Cursor;

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use tracing::warn;

use crate::consts::{
    DARK_ATTRIBUTE, FLAT_ATTRIBUTE, HEADER_FILLER_WORDS, HEADER_SENTINELS, HEADER_SIZE,
};
use crate::error::{RawFileError, Result};
use crate::frame::{EpicsTimestamp, Frame};

/// Byte offset of `unique_id` within the header.
pub const UNIQUE_ID_OFFSET: usize = 64;
/// Byte offset of `data_size` within the header.
pub const DATA_SIZE_OFFSET: usize = 68;
/// Byte offset of the floating-point timestamp within the header.
pub const TIME_STAMP_OFFSET: usize = 72;
/// Byte offset of the flat flag within the header.
pub const FLAT_OFFSET: usize = 88;
/// Byte offset of the dark flag within the header.
pub const DARK_OFFSET: usize = 92;

/// Fixed 512-byte record written once at the start of every raw file.
///
/// All fields are stored in native byte order, in declaration order, with
/// `i32` filler words padding the record out to [`HEADER_SIZE`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawHeader {
    pub data_type: i32,
    pub ndims: i32,
    pub dim_size: [i32; 2],
    pub dim_offset: [i32; 2],
    pub dim_binning: [i32; 2],
    pub dim_reverse: [i32; 2],
    pub sentinels: [i32; 6],
    pub unique_id: i32,
    pub data_size: i32,
    pub time_stamp: f64,
    pub epics_ts: EpicsTimestamp,
    pub flat: i32,
    pub dark: i32,
}

impl RawHeader {
    /// Capture the geometry and identity of `frame`, plus its flat/dark
    /// attributes (zero when absent).
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        let d0 = frame.dim(0);
        let d1 = frame.dim(1);
        Self {
            data_type: frame.data_type.tag(),
            ndims: header_word("ndims", frame.ndims()),
            dim_size: [header_word("dim0_size", d0.size), header_word("dim1_size", d1.size)],
            dim_offset: [
                header_word("dim0_offset", d0.offset),
                header_word("dim1_offset", d1.offset),
            ],
            dim_binning: [
                header_word("dim0_binning", d0.binning),
                header_word("dim1_binning", d1.binning),
            ],
            dim_reverse: [d0.reverse as i32, d1.reverse as i32],
            sentinels: HEADER_SENTINELS,
            unique_id: frame.unique_id,
            data_size: header_word("data_size", frame.data_size()),
            time_stamp: frame.time_stamp,
            epics_ts: frame.epics_ts,
            flat: frame.attributes.get_i32(FLAT_ATTRIBUTE).unwrap_or(0),
            dark: frame.attributes.get_i32(DARK_ATTRIBUTE).unwrap_or(0),
        }
    }

    /// Serialize into the on-disk layout. Filler words are zero.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        let mut w = Cursor::new(&mut buf[..]);
        // Writes into a fixed array of the exact record size cannot fail.
        self.write_fields(&mut w)
            .expect("header fields fit in HEADER_SIZE");
        debug_assert_eq!(w.position() as usize, HEADER_SIZE - HEADER_FILLER_WORDS * 4);
        buf
    }

    fn write_fields(&self, w: &mut impl WriteBytesExt) -> std::io::Result<()> {
        w.write_i32::<NativeEndian>(self.data_type)?;
        w.write_i32::<NativeEndian>(self.ndims)?;
        for field in [self.dim_size, self.dim_offset, self.dim_binning, self.dim_reverse] {
            w.write_i32::<NativeEndian>(field[0])?;
            w.write_i32::<NativeEndian>(field[1])?;
        }
        for s in self.sentinels {
            w.write_i32::<NativeEndian>(s)?;
        }
        w.write_i32::<NativeEndian>(self.unique_id)?;
        w.write_i32::<NativeEndian>(self.data_size)?;
        w.write_f64::<NativeEndian>(self.time_stamp)?;
        w.write_u32::<NativeEndian>(self.epics_ts.sec)?;
        w.write_u32::<NativeEndian>(self.epics_ts.nsec)?;
        w.write_i32::<NativeEndian>(self.flat)?;
        w.write_i32::<NativeEndian>(self.dark)?;
        Ok(())
    }

    /// Parse a header previously produced by [`RawHeader::encode`].
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(RawFileError::InvalidHeader(format!(
                "need {} bytes, got {}",
                HEADER_SIZE,
                buf.len()
            )));
        }

        let mut r = Cursor::new(&buf[..HEADER_SIZE]);
        let mut pair = || -> std::io::Result<[i32; 2]> {
            Ok([r.read_i32::<NativeEndian>()?, r.read_i32::<NativeEndian>()?])
        };
        let [data_type, ndims] = pair()?;
        let dim_size = pair()?;
        let dim_offset = pair()?;
        let dim_binning = pair()?;
        let dim_reverse = pair()?;

        let mut sentinels = [0i32; 6];
        for s in sentinels.iter_mut() {
            *s = r.read_i32::<NativeEndian>()?;
        }
        if sentinels != HEADER_SENTINELS {
            return Err(RawFileError::InvalidHeader(format!(
                "sentinel words {:?} do not match",
                sentinels
            )));
        }

        let unique_id = r.read_i32::<NativeEndian>()?;
        let data_size = r.read_i32::<NativeEndian>()?;
        let time_stamp = r.read_f64::<NativeEndian>()?;
        let epics_ts = EpicsTimestamp {
            sec: r.read_u32::<NativeEndian>()?,
            nsec: r.read_u32::<NativeEndian>()?,
        };
        let flat = r.read_i32::<NativeEndian>()?;
        let dark = r.read_i32::<NativeEndian>()?;

        Ok(Self {
            data_type,
            ndims,
            dim_size,
            dim_offset,
            dim_binning,
            dim_reverse,
            sentinels,
            unique_id,
            data_size,
            time_stamp,
            epics_ts,
            flat,
            dark,
        })
    }
}

/// Header words are `i32`; larger values saturate instead of wrapping.
fn header_word(field: &str, value: usize) -> i32 {
    i32::try_from(value).unwrap_or_else(|_| {
        warn!(field, value, "Value does not fit a header word, storing i32::MAX");
        i32::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttributeList, AttributeValue};
    use crate::frame::{DataType, Dimension};

    fn word(buf: &[u8], offset: usize) -> i32 {
        i32::from_ne_bytes(buf[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_field_offsets() {
        let data = [0u8; 32];
        let mut frame = Frame::new(DataType::UInt8, &[4, 4], &data);
        frame.dims[1] = Dimension {
            size: 4,
            offset: 7,
            binning: 2,
            reverse: true,
        };
        frame.unique_id = 42;
        frame.time_stamp = 1000.5;
        frame.epics_ts = EpicsTimestamp { sec: 11, nsec: 22 };
        frame.attributes = AttributeList::new().with("dark", AttributeValue::Int32(1));

        let buf = RawHeader::from_frame(&frame).encode();
        assert_eq!(word(&buf, 0), 1);
        assert_eq!(word(&buf, 4), 2);
        assert_eq!(word(&buf, 8), 4);
        assert_eq!(word(&buf, 12), 4);
        assert_eq!(word(&buf, 20), 7);
        assert_eq!(word(&buf, 28), 2);
        assert_eq!(word(&buf, 36), 1);
        assert_eq!(word(&buf, 40), 123_456);
        assert_eq!(word(&buf, 60), 678_901);
        assert_eq!(word(&buf, UNIQUE_ID_OFFSET), 42);
        assert_eq!(word(&buf, DATA_SIZE_OFFSET), 32);
        let ts = f64::from_ne_bytes(buf[TIME_STAMP_OFFSET..TIME_STAMP_OFFSET + 8].try_into().unwrap());
        assert_eq!(ts, 1000.5);
        assert_eq!(word(&buf, 80), 11);
        assert_eq!(word(&buf, 84), 22);
        assert_eq!(word(&buf, FLAT_OFFSET), 0);
        assert_eq!(word(&buf, DARK_OFFSET), 1);
        assert!(buf[96..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_one_dimensional_frame() {
        let data = [0u8; 8];
        let frame = Frame::new(DataType::Float64, &[1], &data);
        let header = RawHeader::from_frame(&frame);
        assert_eq!(header.ndims, 1);
        assert_eq!(header.dim_size, [1, 0]);
        assert_eq!(header.dim_binning, [1, 0]);
    }

    #[test]
    fn test_oversized_geometry_saturates() {
        let data = [0u8; 4];
        let mut frame = Frame::new(DataType::UInt8, &[2, 2], &data);
        frame.dims[0].size = i32::MAX as usize + 1;
        frame.dims[1].offset = usize::MAX;
        let header = RawHeader::from_frame(&frame);
        assert_eq!(header.dim_size, [i32::MAX, 2]);
        assert_eq!(header.dim_offset, [0, i32::MAX]);
        assert_eq!(header.data_size, 4);
        assert_eq!(header_word("data_size", 3 << 30), i32::MAX);
        assert_eq!(header_word("data_size", 4096), 4096);
    }

    #[test]
    fn test_decode_rejects_foreign_bytes() {
        assert!(matches!(
            RawHeader::decode(&[0u8; 100]),
            Err(RawFileError::InvalidHeader(_))
        ));
        assert!(matches!(
            RawHeader::decode(&[0u8; HEADER_SIZE]),
            Err(RawFileError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_decode_inverts_encode() {
        let data = [0u8; 16];
        let mut frame = Frame::new(DataType::Int16, &[2, 4], &data);
        frame.unique_id = 9;
        frame.attributes = AttributeList::new().with("flat", AttributeValue::Int32(1));
        let header = RawHeader::from_frame(&frame);
        assert_eq!(RawHeader::decode(&header.encode()).unwrap(), header);
    }
}
