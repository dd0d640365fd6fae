// bdgr -- a lossless raster image codec
// Licensed under the Apache License, Version 2.0.

//! The `bdgr` command-line encoder/decoder, reading and writing PGM
//! (`P5`) files on either end of the codec.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bdgr", version, about = "A lossless raster image codec")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compresses a PGM image into a `.bdgr` bitstream.
    Encode {
        /// Input PGM (`P5`) file.
        input: PathBuf,
        /// Output bitstream file.
        output: PathBuf,

        /// Uses the median edge detector predictor instead of the minimal
        /// left-neighbor predictor. Requires the `med` feature.
        #[arg(long)]
        med: bool,

        /// Enables run-length mode over flat regions. Implies --med.
        #[arg(long)]
        rle: bool,

        /// Near-lossless tolerance; 0 is lossless. Implies --med.
        #[arg(long, default_value_t = 0)]
        near: u8,
    },
    /// Decompresses a `.bdgr` bitstream back into a PGM image.
    Decode {
        /// Input bitstream file.
        input: PathBuf,
        /// Output PGM (`P5`) file.
        output: PathBuf,
        /// Expected image width, as a sanity check against the header.
        width: u16,
        /// Expected image height, as a sanity check against the header.
        height: u16,

        #[arg(long)]
        med: bool,
        #[arg(long)]
        rle: bool,
        #[arg(long, default_value_t = 0)]
        near: u8,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Encode { input, output, med, rle, near } => run_encode(&input, &output, med, rle, near),
        Command::Decode { input, output, width, height, med, rle, near } => {
            run_decode(&input, &output, width, height, med, rle, near)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_encode(input: &PathBuf, output: &PathBuf, med: bool, rle: bool, near: u8) -> Result<(), bdgr::CodecError> {
    let file = fs::File::open(input)?;
    let image = bdgr::pgm::read(file)?;
    log::info!("read {}x{} image from {}", image.width, image.height, input.display());

    let packed = encode_with(&image, med, rle, near);

    fs::write(output, &packed)?;
    log::info!("wrote {} bytes to {}", packed.len(), output.display());
    Ok(())
}

fn run_decode(
    input: &PathBuf,
    output: &PathBuf,
    width: u16,
    height: u16,
    med: bool,
    rle: bool,
    near: u8,
) -> Result<(), bdgr::CodecError> {
    let packed = fs::read(input)?;
    let image = decode_with(&packed, width, height, med, rle, near)?;

    let file = fs::File::create(output)?;
    bdgr::pgm::write(file, &image)?;
    log::info!("wrote {}x{} image to {}", image.width, image.height, output.display());
    Ok(())
}

#[cfg(feature = "med")]
fn encode_with(image: &bdgr::GrayImage, med: bool, rle: bool, near: u8) -> Vec<u8> {
    if med || rle || near > 0 {
        bdgr::encode_extended(image, bdgr::ExtendedOptions { rle, near })
    } else {
        bdgr::encode(image)
    }
}

#[cfg(not(feature = "med"))]
fn encode_with(image: &bdgr::GrayImage, med: bool, rle: bool, near: u8) -> Vec<u8> {
    if med || rle || near > 0 {
        log::warn!("--med/--rle/--near were requested but this binary was built without the `med` feature");
    }
    bdgr::encode(image)
}

#[cfg(feature = "med")]
fn decode_with(
    data: &[u8],
    width: u16,
    height: u16,
    med: bool,
    rle: bool,
    near: u8,
) -> bdgr::CodecResult<bdgr::GrayImage> {
    if med || rle || near > 0 {
        bdgr::decode_extended(data, width, height, bdgr::ExtendedOptions { rle, near })
    } else {
        bdgr::decode(data, width, height)
    }
}

#[cfg(not(feature = "med"))]
fn decode_with(
    data: &[u8],
    width: u16,
    height: u16,
    med: bool,
    rle: bool,
    near: u8,
) -> bdgr::CodecResult<bdgr::GrayImage> {
    if med || rle || near > 0 {
        log::warn!("--med/--rle/--near were requested but this binary was built without the `med` feature");
    }
    bdgr::decode(data, width, height)
}
