use crate::attributes::AttributeList;

/// Element type of a frame, numbered as the acquisition framework numbers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    Int8 = 0,
    UInt8 = 1,
    Int16 = 2,
    UInt16 = 3,
    Int32 = 4,
    UInt32 = 5,
    Int64 = 6,
    UInt64 = 7,
    Float32 = 8,
    Float64 = 9,
}

impl DataType {
    /// Bytes per element.
    pub fn size(self) -> usize {
        match self {
            DataType::Int8 | DataType::UInt8 => 1,
            DataType::Int16 | DataType::UInt16 => 2,
            DataType::Int32 | DataType::UInt32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::UInt64 | DataType::Float64 => 8,
        }
    }

    /// Tag stored in the raw header.
    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        Some(match tag {
            0 => DataType::Int8,
            1 => DataType::UInt8,
            2 => DataType::Int16,
            3 => DataType::UInt16,
            4 => DataType::Int32,
            5 => DataType::UInt32,
            6 => DataType::Int64,
            7 => DataType::UInt64,
            8 => DataType::Float32,
            9 => DataType::Float64,
            _ => return None,
        })
    }
}

/// Geometry of one frame axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dimension {
    pub size: usize,
    /// Offset of this region on the sensor, in unbinned pixels.
    pub offset: usize,
    pub binning: usize,
    pub reverse: bool,
}

impl Dimension {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            offset: 0,
            binning: 1,
            reverse: false,
        }
    }
}

/// Wall-clock timestamp split into seconds and nanoseconds past the
/// control-system epoch (1990-01-01).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpicsTimestamp {
    pub sec: u32,
    pub nsec: u32,
}

/// Read-only view of one frame handed to a writer.
///
/// The payload is borrowed from the caller for the duration of a single call;
/// writers copy what they need and never keep the slice.
#[derive(Clone, Debug)]
pub struct Frame<'a> {
    pub data_type: DataType,
    pub dims: Vec<Dimension>,
    pub data: &'a [u8],
    pub unique_id: i32,
    /// Seconds, as a float.
    pub time_stamp: f64,
    pub epics_ts: EpicsTimestamp,
    pub attributes: AttributeList,
}

impl<'a> Frame<'a> {
    pub fn new(data_type: DataType, dims: &[usize], data: &'a [u8]) -> Self {
        Self {
            data_type,
            dims: dims.iter().map(|&s| Dimension::new(s)).collect(),
            data,
            unique_id: 0,
            time_stamp: 0.0,
            epics_ts: EpicsTimestamp::default(),
            attributes: AttributeList::default(),
        }
    }

    pub fn ndims(&self) -> usize {
        self.dims.len()
    }

    /// Payload length in bytes.
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Axis `index`, or an empty axis if the frame has fewer dimensions.
    pub fn dim(&self, index: usize) -> Dimension {
        self.dims.get(index).copied().unwrap_or_default()
    }
}
