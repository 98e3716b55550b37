use std::path::PathBuf;

use clap::Args;
use comfy_table::Table;
use tracing::info;

use wayline_osrm::client::{DEFAULT_BASE_URL, OsrmClient, OsrmClientParams};
use wayline_osrm::profile::Profile;
use wayline_osrm::travel_matrix::TravelMatrix;

use crate::file_utils;

// Past this many rows or columns the preview stops being readable.
const PREVIEW_LIMIT: usize = 12;

#[derive(Args)]
pub struct MatrixArgs {
    /// CSV file of origin coordinates (headered, lat/lon columns)
    #[arg(long)]
    origins: PathBuf,

    /// CSV file of destination coordinates (headered, lat/lon columns)
    #[arg(long)]
    destinations: PathBuf,

    /// Routing profile: driving, walking or cycling
    #[arg(short, long, default_value = "driving")]
    profile: Profile,

    /// OSRM server base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Split table requests so each URL stays under this many characters
    #[arg(long, default_value_t = 8000)]
    url_length_limit: usize,

    /// Directory for the output files
    #[arg(short, long, default_value = "results")]
    out: PathBuf,
}

pub async fn run(args: MatrixArgs) -> anyhow::Result<()> {
    let origins = file_utils::read_coordinates(&args.origins)?;
    let destinations = file_utils::read_coordinates(&args.destinations)?;

    info!(
        "Requesting {} x {} {} matrix from {}",
        origins.len(),
        destinations.len(),
        args.profile,
        args.base_url
    );

    let client = OsrmClient::new(OsrmClientParams {
        base_url: args.base_url,
        url_length_limit: args.url_length_limit,
        ..OsrmClientParams::default()
    });

    let matrices = client
        .fetch_matrix(&origins, &destinations, args.profile)
        .await?;

    std::fs::create_dir_all(&args.out)?;
    file_utils::write_matrix(&args.out.join("durations.csv"), &matrices.durations)?;
    file_utils::write_matrix(&args.out.join("distances.csv"), &matrices.distances)?;

    if matrices.durations.num_origins() <= PREVIEW_LIMIT
        && matrices.durations.num_destinations() <= PREVIEW_LIMIT
    {
        println!("Durations (minutes):\n{}", preview(&matrices.durations));
    }

    info!("Wrote durations.csv and distances.csv to {}", args.out.display());

    Ok(())
}

fn preview(matrix: &TravelMatrix) -> Table {
    let mut table = Table::new();

    let mut header = vec![String::new()];
    header.extend((0..matrix.num_destinations()).map(|j| format!("Dest_{}", j + 1)));
    table.set_header(header);

    for (i, row) in matrix.iter_rows().enumerate() {
        let mut cells = vec![format!("Origin_{}", i + 1)];
        cells.extend(
            row.iter()
                .map(|cell| cell.map(|value| format!("{value:.1}")).unwrap_or_default()),
        );
        table.add_row(cells);
    }

    table
}
