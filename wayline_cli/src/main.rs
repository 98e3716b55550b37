use clap::{Parser, Subcommand};

use crate::{matrix::MatrixArgs, pairs::PairsArgs};

mod file_utils;
mod matrix;
mod pairs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a many-to-many duration/distance matrix
    #[command(visible_alias = "m")]
    Matrix {
        #[command(flatten)]
        args: MatrixArgs,
    },
    /// Annotate tables of origin-destination pairs with travel times
    #[command(visible_alias = "p")]
    Pairs {
        #[command(flatten)]
        args: PairsArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Matrix { args } => matrix::run(args).await?,
        Commands::Pairs { args } => pairs::run(args).await?,
    }

    Ok(())
}
