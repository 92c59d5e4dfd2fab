use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rawframe_core::aligned::round_up;
use rawframe_core::consts::{DEFAULT_ALIGNMENT, HEADER_SIZE};
use rawframe_core::frame::DataType;
use rawframe_core::header::RawHeader;

#[derive(Args)]
pub struct InfoArgs {
    /// Input raw file
    pub file: PathBuf,

    /// Alignment unit the file was written with
    #[arg(long, default_value_t = DEFAULT_ALIGNMENT)]
    pub alignment: usize,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    anyhow::ensure!(
        args.alignment.is_power_of_two(),
        "alignment must be a power of two"
    );

    let mut file = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let file_len = file.metadata()?.len();
    let mut buf = [0u8; HEADER_SIZE];
    file.read_exact(&mut buf)
        .with_context(|| format!("{} is too short for a raw header", args.file.display()))?;
    let header = RawHeader::decode(&buf)?;

    let data_type = DataType::from_tag(header.data_type)
        .map(|t| format!("{:?}", t))
        .unwrap_or_else(|| format!("unknown ({})", header.data_type));

    println!("File:        {}", args.file.display());
    println!("Data type:   {}", data_type);
    println!("Dimensions:  {} ({}x{})", header.ndims, header.dim_size[0], header.dim_size[1]);
    println!("Offset:      {}, {}", header.dim_offset[0], header.dim_offset[1]);
    println!("Binning:     {}, {}", header.dim_binning[0], header.dim_binning[1]);
    println!("Reverse:     {}, {}", header.dim_reverse[0], header.dim_reverse[1]);
    println!("Unique ID:   {}", header.unique_id);
    println!("Frame size:  {} bytes", header.data_size);
    println!("Timestamp:   {:.6}", header.time_stamp);
    println!("EPICS time:  {}.{:09}", header.epics_ts.sec, header.epics_ts.nsec);
    println!("Flat:        {}", header.flat);
    println!("Dark:        {}", header.dark);

    // Frame count is not stored; infer it from the first frame's size.
    let padded_header = round_up(HEADER_SIZE, args.alignment) as u64;
    if header.data_size > 0 && file_len >= padded_header {
        let padded_frame = round_up(header.data_size as usize, args.alignment) as u64;
        let body = file_len - padded_header;
        println!("Frames:      {} (if all frames match the first)", body / padded_frame);
        if body % padded_frame != 0 {
            println!("Trailing:    {} bytes", body % padded_frame);
        }
    }

    let total_mb = file_len as f64 / (1024.0 * 1024.0);
    println!("File size:   {:.1} MB", total_mb);

    Ok(())
}
