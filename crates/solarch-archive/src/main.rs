use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solarch_archive::{local, ArchiveConfig};
use solarch_codec::{pack_blocks, unpack_blocks, Block};
use solarch_compress::CompressionProvider;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "solarch", about = "Packed Solana block archive tool", version)]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(long, env = "SOLARCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pack a JSON array of blocks into a compressed scratch file
    Pack {
        /// JSON file holding an array of blocks
        #[arg(long)]
        input: PathBuf,
        /// Scratch file name, without suffix
        #[arg(long)]
        name: String,
    },
    /// Decode a compressed scratch file back to JSON blocks
    Unpack {
        /// Scratch file name, without suffix
        #[arg(long)]
        name: String,
        /// Output path; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a summary of a compressed scratch file
    Inspect {
        /// Scratch file name, without suffix
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ArchiveConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ArchiveConfig::default(),
    };
    let provider = CompressionProvider::new(config.compressor.clone())?;

    match cli.command {
        Command::Pack { input, name } => {
            let raw = local::read_file(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let blocks: Vec<Block> = serde_json::from_slice(&raw)
                .with_context(|| format!("parsing blocks from {}", input.display()))?;
            let list = pack_blocks(&blocks);
            let path = provider.block_list_to_file(&list, &name).await?;
            println!(
                "packed {} blocks ({} keys) into {}",
                list.blocks.len(),
                list.encoded_keys.len(),
                path.display()
            );
        }
        Command::Unpack { name, output } => {
            let list = provider.file_to_block_list(&name).await?;
            let blocks = unpack_blocks(&list)?;
            let json = serde_json::to_vec_pretty(&blocks)?;
            match output {
                Some(path) => local::write_file(&path, &json).await?,
                None => println!("{}", String::from_utf8_lossy(&json)),
            }
        }
        Command::Inspect { name } => {
            let list = provider.file_to_block_list(&name).await?;
            println!("file:         {}", provider.file_path(&name).display());
            println!("blocks:       {}", list.blocks.len());
            println!("transactions: {}", list.transaction_count());
            println!("keys:         {}", list.encoded_keys.len());
            match list.height_range() {
                Some((lo, hi)) => println!("heights:      {}..={}", lo, hi),
                None => println!("heights:      -"),
            }
        }
    }

    Ok(())
}
