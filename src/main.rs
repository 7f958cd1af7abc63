use clap::Parser;
use glob::glob;
use log::{error, info, LevelFilter};
use rawstrip::logger::Logger;
use rawstrip::writer::Writer;
use rawstrip::{
    ByteOrder, Compression, DecodedImage, ImageLayout, ImageReader, PixelSource, SampleFormat, Seekable,
    Sequential,
};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[clap(name = "rawstrip", about = "Decode raw strip-based pixel data")]
struct Cli {
    #[arg(required = true, help = "Input file or glob pattern")]
    path: String,

    #[arg(long)]
    width: u32,

    #[arg(long)]
    height: u32,

    #[arg(short, long, default_value = "gray8", help = "Sample format, e.g. gray16, rgb, cmyk, rgb48-planar")]
    format: String,

    #[arg(short, long, default_value = "none", help = "none, packbits, lzw, lzw-predictor or deflate")]
    compression: String,

    #[arg(long)]
    little_endian: bool,

    #[arg(long, default_value_t = 0, help = "Bytes before the first image")]
    offset: u64,

    #[arg(long, default_value_t = 0, help = "Bytes between consecutive images")]
    gap: u64,

    #[arg(short = 'n', long, default_value_t = 1, help = "Number of images to decode")]
    images: usize,

    #[arg(long, value_delimiter = ',')]
    strip_offsets: Vec<u64>,

    #[arg(long, value_delimiter = ',')]
    strip_lengths: Vec<u64>,

    #[arg(long, default_value_t = 0)]
    rows_per_strip: u32,

    #[arg(long, help = "Read the input without seeking")]
    sequential: bool,

    #[arg(short = 'o', long = "output-dir", help = "Output directory for converted files")]
    output_dir: Option<String>,

    #[arg(long = "output-format", value_parser = ["ppm", "pam", "png"], help = "Output format")]
    output_format: Option<String>,

    #[arg(long, help = "Decode the image without writing to a file")]
    void: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn build_layout(cli: &Cli) -> Result<ImageLayout, Box<dyn std::error::Error>> {
    let format = SampleFormat::try_from(cli.format.as_str())?;
    let compression = Compression::try_from(cli.compression.as_str())?;
    let byte_order = if cli.little_endian {
        ByteOrder::LittleEndian
    } else {
        ByteOrder::BigEndian
    };

    let mut layout = ImageLayout::new(cli.width, cli.height, format)
        .with_compression(compression)
        .with_byte_order(byte_order)
        .with_offset(cli.offset)
        .with_gap(cli.gap)
        .with_rows_per_strip(cli.rows_per_strip);

    if !cli.strip_offsets.is_empty() {
        layout.strip_offsets = Some(cli.strip_offsets.clone());
    }
    if !cli.strip_lengths.is_empty() {
        layout.strip_lengths = Some(cli.strip_lengths.clone());
    }

    layout.validate()?;
    Ok(layout)
}

fn get_files(path: &str) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let absolute_pattern = if Path::new(path).is_relative() {
        base_dir.join(path).to_string_lossy().into_owned()
    } else {
        path.to_string()
    };

    for entry in glob(&absolute_pattern)? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => error!("{}", e),
        }
    }

    Ok(files)
}

fn get_output_path(
    file: &Path,
    output_dir: Option<&str>,
    index: Option<usize>,
    format: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let file_stem = file
        .file_stem()
        .ok_or("Invalid file name")?
        .to_str()
        .ok_or("Invalid file stem")?;

    let file_name = match index {
        Some(i) => format!("{}_{:03}.{}", file_stem, i, format),
        None => format!("{}.{}", file_stem, format),
    };

    let output_path = match output_dir {
        Some(dir) => {
            let output_dir = Path::new(dir);
            if !output_dir.exists() {
                fs::create_dir_all(output_dir)?;
            }
            output_dir.join(file_name)
        }
        None => file.parent().unwrap_or_else(|| Path::new(".")).join(file_name),
    };

    Ok(output_path)
}

fn decode_stack(file: &Path, layout: &ImageLayout, cli: &Cli) -> Result<Vec<DecodedImage>, Box<dyn std::error::Error>> {
    let input = BufReader::new(File::open(file)?);
    let mut reader = ImageReader::new(layout);

    let mut source: Box<dyn PixelSource> = if cli.sequential {
        Box::new(Sequential::new(input))
    } else {
        Box::new(Seekable::new(input))
    };

    Ok(reader.read_stack(source.as_mut(), cli.images)?)
}

fn process_file(file: &Path, layout: &ImageLayout, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    info!("File: {}", file.display());

    let start = Instant::now();
    let images = decode_stack(file, layout, cli)?;
    info!("Decoded {} image(s) in {:?}", images.len(), start.elapsed());

    for (i, image) in images.iter().enumerate() {
        if let Some((min, max)) = image.range() {
            info!("Image {}: sample range {}..{}", i, min, max);
        }
    }

    if cli.void {
        return Ok(());
    }

    let format = cli.output_format.as_deref().unwrap_or("ppm");

    for (i, image) in images.iter().enumerate() {
        let index = if images.len() > 1 { Some(i) } else { None };
        let output_path = get_output_path(file, cli.output_dir.as_deref(), index, format)?;

        info!("Writing to: {}", output_path.display());
        match format {
            "pam" => Writer::write_pam(&output_path, image)?,
            "png" => Writer::write_png(&output_path, image)?,
            _ => Writer::write_ppm(&output_path, image)?,
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    Logger::init(level).map_err(|e| e.to_string())?;

    let layout = build_layout(&cli)?;
    let files = get_files(&cli.path)?;

    if files.is_empty() {
        error!("No files match {}", cli.path);
        std::process::exit(1);
    }

    for file in files {
        if let Err(e) = process_file(&file, &layout, &cli) {
            error!("{}: {}", file.display(), e);
        }
    }

    Ok(())
}
