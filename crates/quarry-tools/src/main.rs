mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use commands::RngMethod;
use log::{error, LevelFilter};
use quarry_common::Result;
use quarry_region::Compression;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "quarry", about = "Inspect and rewrite NBT and Anvil region files")]
struct Cli {
    /// Log at debug level regardless of QUARRY_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print an NBT file (gzip or raw) as JSON
    Nbt2json { file: PathBuf },
    /// Print every chunk of a region file as JSON
    Mca2json { file: PathBuf },
    /// Write JSON beside every .dat and .mca file under a world directory
    World2json { dir: PathBuf },
    /// Re-encode a region file with the given chunk compression
    Recompress {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, value_enum, default_value_t = CompressionArg::Zlib)]
        compression: CompressionArg,
    },
    /// Remove unused sectors from a region file without decoding chunks
    Compact { input: PathBuf, output: PathBuf },
    /// Print an NBT file in human readable form
    Dump { file: PathBuf },
    /// Print values from the seeded generator
    Rng {
        #[arg(allow_negative_numbers = true)]
        seed: i64,
        #[arg(value_enum)]
        method: RngMethod,
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        /// Upper bound for `int`, array length for `bytes`
        #[arg(short, long, allow_negative_numbers = true)]
        bound: Option<i32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CompressionArg {
    Gzip,
    Zlib,
    Raw,
}

impl From<CompressionArg> for Compression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Gzip => Compression::Gzip,
            CompressionArg::Zlib => Compression::Zlib,
            CompressionArg::Raw => Compression::Raw,
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Nbt2json { file } => println!("{}", commands::nbt_to_json(&file)?),
        Command::Mca2json { file } => println!("{}", commands::region_to_json(&file)?),
        Command::World2json { dir } => {
            let converted = commands::world_to_json(&dir)?;
            log::info!("{} files converted", converted);
        }
        Command::Recompress {
            input,
            output,
            compression,
        } => commands::recompress(&input, &output, compression.into())?,
        Command::Compact { input, output } => commands::compact(&input, &output)?,
        Command::Dump { file } => print!("{}", commands::dump(&file)?),
        Command::Rng {
            seed,
            method,
            count,
            bound,
        } => {
            for value in commands::rng(seed, method, count, bound)? {
                println!("{}", value);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let installed = if cli.verbose {
        quarry_logger::init_with_level(LevelFilter::Debug)
    } else {
        quarry_logger::init()
    };
    if let Err(e) = installed {
        eprintln!("Failed to install logger: {}", e);
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
