use clap::{Parser, Subcommand};

mod get_matrix;
mod optimize;
mod parsers;

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
    /// Plan a route for one vehicle against the hosted optimizer.
    Optimize {
        #[command(flatten)]
        args: optimize::OptimizeArgs,
    },
    /// Fetch a travel matrix for a list of locations.
    Matrix {
        #[command(flatten)]
        args: get_matrix::GetMatrixArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Optimize { args } => optimize::run(args).await,
        Commands::Matrix { args } => get_matrix::run(args).await,
    }
}
