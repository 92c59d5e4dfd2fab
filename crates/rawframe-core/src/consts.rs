/// Alignment unit for buffer addresses and transfer sizes on the direct-I/O path.
pub const DEFAULT_ALIGNMENT: usize = 512;

/// Size of the logical header record in bytes.
pub const HEADER_SIZE: usize = 512;

/// Number of `i32` filler words that pad the header record to `HEADER_SIZE`.
pub const HEADER_FILLER_WORDS: usize = 104;

/// Fixed sentinel words stored at header offsets 40..64.
/// Readers of the format match on these; they carry no other meaning.
pub const HEADER_SENTINEL_1: i32 = 123_456;
pub const HEADER_SENTINEL_2: i32 = 234_567;
pub const HEADER_SENTINEL_3: i32 = 345_678;
pub const HEADER_SENTINEL_4: i32 = 456_789;
pub const HEADER_SENTINEL_5: i32 = 567_890;
pub const HEADER_SENTINEL_6: i32 = 678_901;

/// All six sentinels in on-disk order.
pub const HEADER_SENTINELS: [i32; 6] = [
    HEADER_SENTINEL_1,
    HEADER_SENTINEL_2,
    HEADER_SENTINEL_3,
    HEADER_SENTINEL_4,
    HEADER_SENTINEL_5,
    HEADER_SENTINEL_6,
];

/// Default scratch buffer capacity: the largest frame the detector emits,
/// with slop. Rounded up to the alignment unit at allocation time.
pub const DEFAULT_BUFFER_CAPACITY: usize = 251_666_336;

/// Header size written by the legacy dummy writer (all zeroes).
pub const LEGACY_DUMMY_HEADER_SIZE: usize = 8192;

/// Attribute consulted for the header's flat-field flag.
pub const FLAT_ATTRIBUTE: &str = "flat";

/// Attribute consulted for the header's dark-frame flag.
pub const DARK_ATTRIBUTE: &str = "dark";
