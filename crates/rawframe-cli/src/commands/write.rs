use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use rawframe_core::attributes::{AttributeList, AttributeValue};
use rawframe_core::config::{DirectIo, WriterConfig};
use rawframe_core::consts::{DARK_ATTRIBUTE, FLAT_ATTRIBUTE};
use rawframe_core::control::CaptureControl;
use rawframe_core::frame::{DataType, EpicsTimestamp, Frame};
use rawframe_core::mode::OpenMode;
use rawframe_core::writer::{DirectRawWriter, DiscardWriter, FrameFileWriter, SessionStats};
use tracing::debug;

/// Seconds between the Unix epoch and the control-system epoch (1990-01-01).
const EPICS_EPOCH_OFFSET: u64 = 631_152_000;

#[derive(Clone, Copy, ValueEnum)]
pub enum DataTypeArg {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl From<DataTypeArg> for DataType {
    fn from(arg: DataTypeArg) -> Self {
        match arg {
            DataTypeArg::Int8 => DataType::Int8,
            DataTypeArg::Uint8 => DataType::UInt8,
            DataTypeArg::Int16 => DataType::Int16,
            DataTypeArg::Uint16 => DataType::UInt16,
            DataTypeArg::Int32 => DataType::Int32,
            DataTypeArg::Uint32 => DataType::UInt32,
            DataTypeArg::Float32 => DataType::Float32,
            DataTypeArg::Float64 => DataType::Float64,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DirectIoArg {
    Required,
    Preferred,
    Disabled,
}

impl From<DirectIoArg> for DirectIo {
    fn from(arg: DirectIoArg) -> Self {
        match arg {
            DirectIoArg::Required => DirectIo::Required,
            DirectIoArg::Preferred => DirectIo::Preferred,
            DirectIoArg::Disabled => DirectIo::Disabled,
        }
    }
}

#[derive(Args)]
pub struct WriteArgs {
    /// Output raw file
    pub output: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value = "1024")]
    pub width: usize,

    /// Frame height in pixels
    #[arg(long, default_value = "1024")]
    pub height: usize,

    /// Pixel data type
    #[arg(long, value_enum, default_value = "uint16")]
    pub data_type: DataTypeArg,

    /// Number of frames to write
    #[arg(short = 'n', long, default_value = "100")]
    pub frames: usize,

    /// Tag the file as a flat field
    #[arg(long)]
    pub flat: bool,

    /// Tag the file as a dark frame
    #[arg(long)]
    pub dark: bool,

    /// TOML writer config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the alignment unit
    #[arg(long)]
    pub alignment: Option<usize>,

    /// Override the direct I/O policy
    #[arg(long, value_enum)]
    pub direct_io: Option<DirectIoArg>,

    /// fsync before closing
    #[arg(long)]
    pub sync: bool,

    /// Count frames without writing anything
    #[arg(long)]
    pub discard: bool,
}

pub fn run(args: &WriteArgs) -> Result<()> {
    let config = load_config(args)?;
    let data_type = DataType::from(args.data_type);
    let frame_bytes = args
        .width
        .checked_mul(args.height)
        .and_then(|p| p.checked_mul(data_type.size()))
        .context("Frame size overflow")?;
    anyhow::ensure!(
        args.discard || frame_bytes <= config.buffer_capacity,
        "{} byte frames exceed the {} byte buffer capacity",
        frame_bytes,
        config.buffer_capacity
    );

    let mut writer: Box<dyn FrameFileWriter> = if args.discard {
        Box::new(DiscardWriter::new())
    } else {
        Box::new(DirectRawWriter::new(config.clone())?)
    };

    let mut attributes = AttributeList::new();
    attributes.set(FLAT_ATTRIBUTE, AttributeValue::Int32(args.flat as i32));
    attributes.set(DARK_ATTRIBUTE, AttributeValue::Int32(args.dark as i32));

    let num_capture = i32::try_from(args.frames).context("Too many frames")?;
    let mut control = CaptureControl::new(num_capture);
    let mut data = vec![0u8; frame_bytes];
    fill_pattern(&mut data, 0);

    let mode = OpenMode::WRITE | OpenMode::MULTIPLE;
    {
        let first = synthetic_frame(args, data_type, &data, 0, &attributes);
        writer
            .open_file(&args.output, mode, &first, &mut control)
            .with_context(|| format!("Failed to open {}", args.output.display()))?;
    }
    let direct = writer.is_direct();

    let pb = ProgressBar::new(args.frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Writing frames");

    let start = Instant::now();
    for i in 0..args.frames {
        fill_pattern(&mut data, i);
        let frame = synthetic_frame(args, data_type, &data, i, &attributes);
        writer.write_file(&frame)?;
        pb.set_position(i as u64 + 1);
    }
    let stats = writer.stats();
    writer.close_file()?;
    let elapsed = start.elapsed();
    pb.finish_with_message("Done");

    print_summary(args, &config, direct, stats, elapsed);
    Ok(())
}

fn load_config(args: &WriteArgs) -> Result<WriterConfig> {
    let mut config = if let Some(ref path) = args.config {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).context("Invalid writer config")?
    } else {
        WriterConfig::default()
    };

    if let Some(alignment) = args.alignment {
        config.alignment = alignment;
    }
    if let Some(direct_io) = args.direct_io {
        config.direct_io = direct_io.into();
    }
    if args.sync {
        config.sync_on_close = true;
    }
    config.validate()?;
    debug!(?config, "Writer config");
    Ok(config)
}

fn synthetic_frame<'a>(
    args: &WriteArgs,
    data_type: DataType,
    data: &'a [u8],
    index: usize,
    attributes: &AttributeList,
) -> Frame<'a> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let mut frame = Frame::new(data_type, &[args.width, args.height], data);
    frame.unique_id = index as i32 + 1;
    frame.time_stamp = now.as_secs_f64();
    frame.epics_ts = EpicsTimestamp {
        sec: now.as_secs().saturating_sub(EPICS_EPOCH_OFFSET) as u32,
        nsec: now.subsec_nanos(),
    };
    frame.attributes = attributes.clone();
    frame
}

/// Byte ramp offset by the frame index.
fn fill_pattern(data: &mut [u8], index: usize) {
    for (i, b) in data.iter_mut().enumerate() {
        *b = (i + index) as u8;
    }
}

fn print_summary(
    args: &WriteArgs,
    config: &WriterConfig,
    direct: bool,
    stats: SessionStats,
    elapsed: Duration,
) {
    let label = Style::new().dim();
    let value = Style::new().bold().white();
    let path = Style::new().underlined();

    let mb = stats.bytes_written as f64 / (1024.0 * 1024.0);
    let secs = elapsed.as_secs_f64().max(f64::EPSILON);

    println!();
    if args.discard {
        println!("  {:<14}{}", label.apply_to("Output"), value.apply_to("discarded"));
    } else {
        println!(
            "  {:<14}{}",
            label.apply_to("Output"),
            path.apply_to(args.output.display())
        );
        println!(
            "  {:<14}{} / {} B aligned",
            label.apply_to("Direct I/O"),
            value.apply_to(if direct { "on" } else { "off" }),
            value.apply_to(config.alignment)
        );
    }
    println!(
        "  {:<14}{}",
        label.apply_to("Frames"),
        value.apply_to(stats.frames_written)
    );
    println!(
        "  {:<14}{}",
        label.apply_to("Data"),
        value.apply_to(format!("{:.1} MB", mb))
    );
    println!(
        "  {:<14}{}",
        label.apply_to("Throughput"),
        value.apply_to(format!("{:.1} MB/s", mb / secs))
    );
}
