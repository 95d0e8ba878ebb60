use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use blockdb::storage::BlockNumber;

mod validators;

#[derive(Parser)]
#[command(name = "BlockDB")]
#[command(about = "Block-granular storage for a disk-resident database", long_about = None)]
#[command(version = "0.1.0")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory. Falls back to BLOCKDB_DIRECTORY.
    #[arg(short = 'D', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Block size in bytes. Falls back to BLOCKDB_BLOCK_SIZE.
    #[arg(short = 'B', long, global = true, value_parser = validators::validate_block_size)]
    pub block_size: Option<usize>,

    /// Log debug messages.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Writes a string and an integer to a block and reads them back.
    Demo(DemoArgs),
    /// Appends zero-filled blocks to a file.
    Append(AppendArgs),
    /// Prints content of one block.
    Inspect(InspectArgs),
    /// Prints block size and block count of a file.
    Info(InfoArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    #[arg(short, long, default_value = "1.dat", value_parser = validators::validate_file_name)]
    pub file: String,
}

#[derive(Args)]
pub struct AppendArgs {
    #[arg(short, long, value_parser = validators::validate_file_name)]
    pub file: String,

    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=1024))]
    pub count: u32,
}

#[derive(Args)]
pub struct InspectArgs {
    #[arg(short, long, value_parser = validators::validate_file_name)]
    pub file: String,

    #[arg(short, long)]
    pub block: BlockNumber,
}

#[derive(Args)]
pub struct InfoArgs {
    #[arg(short, long, value_parser = validators::validate_file_name)]
    pub file: String,
}
