use std::path::PathBuf;

use clap::Args;

use drover_core::coordinates::Coordinates;
use drover_matrix_providers::travel_matrix_client::TravelMatrixProvider;

use crate::optimize::{matrix_client_from_env, read_json};

#[derive(Args)]
pub struct GetMatrixArgs {
    /// JSON file with a list of `{ "latitude": .., "longitude": .. }` entries.
    #[arg(short = 'i', long)]
    locations: PathBuf,

    /// Skip the matrix API and compute great-circle estimates.
    #[arg(long)]
    great_circle: bool,
}

pub async fn run(args: GetMatrixArgs) -> anyhow::Result<()> {
    let locations: Vec<Coordinates> = read_json(&args.locations)?;

    let (client, provider) = matrix_client_from_env();
    let provider = if args.great_circle {
        TravelMatrixProvider::GreatCircle {
            speed_kmh: drover_matrix_providers::great_circle::FALLBACK_SPEED_KMH,
        }
    } else {
        provider
    };

    let matrix = client.fetch_matrix(&locations, &provider).await;
    println!("{}", serde_json::to_string_pretty(&matrix)?);

    Ok(())
}
