use std::{path::PathBuf, time::Duration};

use clap::Args;
use indicatif::ProgressBar;
use tracing::{error, info};

use wayline_osrm::client::{DEFAULT_BASE_URL, OsrmClient, OsrmClientParams, PairColumns};
use wayline_osrm::profile::Profile;

use crate::file_utils;

#[derive(Args)]
pub struct PairsArgs {
    /// CSV file of OD pairs, or a folder of them
    #[arg(short, long)]
    input: PathBuf,

    /// Column holding the origin latitude
    #[arg(long, default_value = "origin_lat")]
    origin_lat_col: String,

    /// Column holding the origin longitude
    #[arg(long, default_value = "origin_lon")]
    origin_lon_col: String,

    /// Column holding the destination latitude
    #[arg(long, default_value = "dest_lat")]
    dest_lat_col: String,

    /// Column holding the destination longitude
    #[arg(long, default_value = "dest_lon")]
    dest_lon_col: String,

    /// Routing profile: driving, walking or cycling
    #[arg(short, long, default_value = "driving")]
    profile: Profile,

    /// Pause between route requests, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// OSRM server base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory for the output files
    #[arg(short, long, default_value = "results")]
    out: PathBuf,
}

pub async fn run(args: PairsArgs) -> anyhow::Result<()> {
    let paths = if args.input.is_file() {
        vec![args.input.clone()]
    } else {
        file_utils::csv_files(&args.input)?
    };

    if paths.is_empty() {
        anyhow::bail!("No .csv files found under {}", args.input.display());
    }

    let client = OsrmClient::new(OsrmClientParams {
        base_url: args.base_url,
        pair_delay: Duration::from_millis(args.delay_ms),
        ..OsrmClientParams::default()
    });

    let columns = PairColumns {
        origin_lat: args.origin_lat_col,
        origin_lon: args.origin_lon_col,
        dest_lat: args.dest_lat_col,
        dest_lon: args.dest_lon_col,
    };

    std::fs::create_dir_all(&args.out)?;

    let progress = ProgressBar::new(paths.len() as u64);
    for path in &paths {
        if let Err(err) = annotate_file(&client, path, &columns, args.profile, &args.out).await {
            error!("{}: {}", path.display(), err);
        }
        progress.inc(1);
    }
    progress.finish();

    Ok(())
}

async fn annotate_file(
    client: &OsrmClient,
    path: &PathBuf,
    columns: &PairColumns,
    profile: Profile,
    out: &PathBuf,
) -> anyhow::Result<()> {
    let table = file_utils::read_table(path)?;
    let annotated = client.annotate_pairs(&table, columns, profile).await?;

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("pairs");
    let target = out.join(format!("{stem}_travel_times.csv"));
    file_utils::write_table(&target, &annotated)?;

    info!("Wrote {}", target.display());

    Ok(())
}
