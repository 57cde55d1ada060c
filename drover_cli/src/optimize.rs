use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use clap::Args;
use jiff::SignedDuration;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use drover_core::{delivery::Delivery, vehicle::VehicleConstraints};
use drover_matrix_providers::{
    matrix_api::{MatrixApiClient, MatrixApiClientParams},
    travel_matrix_client::{TravelMatrixClient, TravelMatrixProvider},
};
use drover_optimizer_client::{
    cuopt_api::{CuoptClient, CuoptClientParams},
    payload_builder::{PayloadBuilder, PayloadDefaults},
    translate::translate,
};

use crate::parsers;

#[derive(Args)]
pub struct OptimizeArgs {
    /// JSON file with the pending deliveries.
    #[arg(short = 'i', long)]
    deliveries: PathBuf,

    /// JSON file with the vehicle constraints.
    #[arg(short = 'v', long)]
    vehicle: PathBuf,

    #[arg(long, default_value = "cli-vehicle")]
    vehicle_id: String,

    /// Solver time limit (e.g., "10s", "2m").
    #[arg(short = 't', long, value_parser = parsers::parse_duration, default_value = "10s")]
    time_limit: SignedDuration,

    /// Build the request with the great-circle matrix and print it instead
    /// of submitting.
    #[arg(long)]
    offline: bool,
}

pub fn read_json<T: DeserializeOwned>(path: &PathBuf) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

pub fn matrix_client_from_env() -> (TravelMatrixClient, TravelMatrixProvider) {
    let configured = std::env::var("MATRIX_API_URL")
        .ok()
        .zip(std::env::var("MATRIX_API_KEY").ok());

    match configured {
        Some((base_url, api_key)) => (
            TravelMatrixClient::new(MatrixApiClient::new(MatrixApiClientParams {
                base_url,
                api_key,
            })),
            TravelMatrixProvider::MatrixApi,
        ),
        None => {
            warn!("MATRIX_API_URL/MATRIX_API_KEY not set, using great-circle estimates");
            (
                TravelMatrixClient::offline(),
                TravelMatrixProvider::GreatCircle {
                    speed_kmh: drover_matrix_providers::great_circle::FALLBACK_SPEED_KMH,
                },
            )
        }
    }
}

pub async fn run(args: OptimizeArgs) -> anyhow::Result<()> {
    let deliveries: Vec<Delivery> = read_json(&args.deliveries)?;
    let constraints: VehicleConstraints = read_json(&args.vehicle)?;

    let (matrix_client, provider) = if args.offline {
        (
            TravelMatrixClient::offline(),
            TravelMatrixProvider::GreatCircle {
                speed_kmh: drover_matrix_providers::great_circle::FALLBACK_SPEED_KMH,
            },
        )
    } else {
        matrix_client_from_env()
    };

    let builder = PayloadBuilder::new(matrix_client, provider).with_defaults(PayloadDefaults {
        solve_time_limit: args.time_limit,
        ..Default::default()
    });

    info!("building routing request for {} deliveries", deliveries.len());
    let (payload, index) = builder.build(&deliveries, &constraints).await?;

    if args.offline {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let api_key = std::env::var("CUOPT_API_KEY").context("CUOPT_API_KEY is not set")?;
    let mut params = CuoptClientParams::new(api_key);
    if let Ok(base_url) = std::env::var("CUOPT_API_URL") {
        params.base_url = base_url;
    }

    let solver = CuoptClient::new(params);
    let result = solver.solve(&payload).await?;
    let route = translate(&result, &index, &args.vehicle_id)?;

    info!(
        "route for {}: {} stops, profit {:.2}, feasible={}",
        route.vehicle_id,
        route.stops.len(),
        route.total_cost,
        route.feasible
    );
    println!("{}", serde_json::to_string_pretty(&route)?);

    Ok(())
}
