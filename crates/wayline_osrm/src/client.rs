use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    batch::plan_batches,
    error::OsrmError,
    latlng::LatLng,
    od_table::OdTable,
    profile::Profile,
    travel_matrix::{TravelMatrices, TravelMatrix},
};

pub const DEFAULT_BASE_URL: &str = "http://router.project-osrm.org";

pub const OSRM_TABLE_API_PATH: &str = "/table/v1/";
pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/";

pub struct OsrmClientParams {
    /// Base URL of the OSRM server, without a trailing slash.
    pub base_url: String,

    pub request_timeout: Duration,

    /// Table requests are split into batches so each URL stays under this
    /// many characters.
    pub url_length_limit: usize,

    /// Pause between successive `/route` requests.
    pub pair_delay: Duration,
}

impl Default for OsrmClientParams {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            url_length_limit: 8000,
            pair_delay: Duration::from_millis(500),
        }
    }
}

/// Column names locating the coordinates in an OD-pair table.
pub struct PairColumns {
    pub origin_lat: String,
    pub origin_lon: String,
    pub dest_lat: String,
    pub dest_lon: String,
}

impl Default for PairColumns {
    fn default() -> Self {
        Self {
            origin_lat: "origin_lat".to_string(),
            origin_lon: "origin_lon".to_string(),
            dest_lat: "dest_lat".to_string(),
            dest_lon: "dest_lon".to_string(),
        }
    }
}

/// Duration and distance of a single routed pair.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RouteSummary {
    /// Travel time in minutes
    pub duration_minutes: f64,

    /// Distance in kilometers
    pub distance_km: f64,
}

#[derive(Deserialize)]
struct TableResponse {
    code: String,

    /// Travel times in seconds, per cell; null where unreachable
    durations: Option<Vec<Vec<Option<f64>>>>,

    /// Distances in meters, per cell; null where unreachable
    distances: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Deserialize)]
struct RouteResponse {
    code: String,

    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Deserialize)]
struct RouteEntry {
    /// Travel time in seconds
    duration: f64,

    /// Distance in meters
    distance: f64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    code: String,
}

pub struct OsrmClient {
    params: OsrmClientParams,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(params: OsrmClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    /// Many-to-many travel times (minutes) and distances (kilometers) via
    /// the `/table` endpoint.
    ///
    /// Requests too long for one URL are split into rectangular batches and
    /// reassembled, so rows follow `origins` and columns follow
    /// `destinations` exactly as given. A failed batch aborts the call with
    /// [`OsrmError::Batch`] naming the batch; it never returns partial data.
    pub async fn fetch_matrix(
        &self,
        origins: &[LatLng],
        destinations: &[LatLng],
        profile: Profile,
    ) -> Result<TravelMatrices, OsrmError> {
        if origins.is_empty() || destinations.is_empty() {
            return Err(OsrmError::EmptyInput);
        }

        let max_coords = self.max_table_coords(origins, destinations, profile);
        let batches = plan_batches(origins.len(), destinations.len(), max_coords);

        let mut durations = TravelMatrix::empty(origins.len(), destinations.len());
        let mut distances = TravelMatrix::empty(origins.len(), destinations.len());

        for (index, batch) in batches.iter().enumerate() {
            debug!("Requesting table batch {}/{}", index + 1, batches.len());

            let (batch_durations, batch_distances) = self
                .table_request(
                    &origins[batch.origins.clone()],
                    &destinations[batch.destinations.clone()],
                    profile,
                )
                .await
                .map_err(|source| OsrmError::Batch {
                    index,
                    origins: batch.origins.clone(),
                    destinations: batch.destinations.clone(),
                    source: Box::new(source),
                })?;

            durations.paste(batch.origins.start, batch.destinations.start, &batch_durations);
            distances.paste(batch.origins.start, batch.destinations.start, &batch_distances);
        }

        Ok(TravelMatrices {
            durations,
            distances,
        })
    }

    /// Route a single origin/destination pair.
    ///
    /// `Ok(None)` means OSRM reported it cannot route the pair; transport and
    /// server errors are `Err`.
    pub async fn fetch_route(
        &self,
        origin: LatLng,
        destination: LatLng,
        profile: Profile,
    ) -> Result<Option<RouteSummary>, OsrmError> {
        let mut url = self.params.base_url.clone();
        url.push_str(OSRM_ROUTE_API_PATH);
        url.push_str(&profile.to_string());
        url.push('/');
        url.push_str(&coords_path(&[origin, destination]));

        let response = self
            .client
            .get(url)
            .query(&[("overview", "false"), ("steps", "false")])
            .timeout(self.params.request_timeout)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // OSRM delivers routing failures as a 400 with a code; only
            // treat the rest as API errors.
            if let Ok(payload) = serde_json::from_str::<ErrorResponse>(&text) {
                debug!("Route request rejected with code {}", payload.code);
                return Ok(None);
            }
            return Err(OsrmError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let route: RouteResponse = serde_json::from_str(&text)?;
        if route.code != "Ok" {
            return Ok(None);
        }

        Ok(route.routes.first().map(|entry| RouteSummary {
            duration_minutes: entry.duration / 60.0,
            distance_km: entry.distance / 1000.0,
        }))
    }

    /// Route every origin/destination pair of `table` and return a copy with
    /// `duration_minutes` and `distance_km` columns appended.
    ///
    /// Failures are row-scoped: a pair that cannot be parsed or routed leaves
    /// missing cells and the remaining rows are still processed. The
    /// configured `pair_delay` is observed between successive requests.
    pub async fn annotate_pairs(
        &self,
        table: &OdTable,
        columns: &PairColumns,
        profile: Profile,
    ) -> Result<OdTable, OsrmError> {
        let origin_lat = column_index(table, &columns.origin_lat)?;
        let origin_lon = column_index(table, &columns.origin_lon)?;
        let dest_lat = column_index(table, &columns.dest_lat)?;
        let dest_lon = column_index(table, &columns.dest_lon)?;

        let total = table.len();
        info!("Calculating travel times for {} OD pairs", total);

        let mut durations = Vec::with_capacity(total);
        let mut distances = Vec::with_capacity(total);

        for (i, row) in table.rows().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.params.pair_delay).await;
            }

            let summary = match parse_pair(row, origin_lat, origin_lon, dest_lat, dest_lon) {
                Ok((origin, destination)) => {
                    match self.fetch_route(origin, destination, profile).await {
                        Ok(summary) => summary,
                        Err(err) => {
                            warn!("Route request for row {} failed: {}", i, err);
                            None
                        }
                    }
                }
                Err(err) => {
                    warn!("Skipping row {}: {}", i, err);
                    None
                }
            };

            durations.push(summary.map(|s| s.duration_minutes));
            distances.push(summary.map(|s| s.distance_km));

            if (i + 1) % 10 == 0 {
                info!("Processed {}/{} pairs", i + 1, total);
            }
        }

        let found = durations.iter().filter(|cell| cell.is_some()).count();
        info!("Complete: {}/{} routes found", found, total);

        let mut result = table.clone();
        result.push_column("duration_minutes", durations)?;
        result.push_column("distance_km", distances)?;
        Ok(result)
    }

    async fn table_request(
        &self,
        origins: &[LatLng],
        destinations: &[LatLng],
        profile: Profile,
    ) -> Result<(Vec<Vec<Option<f64>>>, Vec<Vec<Option<f64>>>), OsrmError> {
        let mut url = self.params.base_url.clone();
        url.push_str(OSRM_TABLE_API_PATH);
        url.push_str(&profile.to_string());
        url.push('/');

        let all: Vec<LatLng> = origins.iter().chain(destinations).copied().collect();
        url.push_str(&coords_path(&all));

        let sources = join_indices(0..origins.len());
        let dest_indices = join_indices(origins.len()..all.len());

        let response = self
            .client
            .get(url)
            .query(&[
                ("annotations", "duration,distance"),
                ("sources", sources.as_str()),
                ("destinations", dest_indices.as_str()),
            ])
            .timeout(self.params.request_timeout)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(payload) = serde_json::from_str::<ErrorResponse>(&text) {
                return Err(OsrmError::NoRoute(payload.code));
            }
            return Err(OsrmError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let table: TableResponse = serde_json::from_str(&text)?;
        if table.code != "Ok" {
            return Err(OsrmError::NoRoute(table.code));
        }

        let durations = table.durations.ok_or(OsrmError::IncompleteResponse)?;
        let distances = table.distances.ok_or(OsrmError::IncompleteResponse)?;

        // Seconds to minutes, meters to kilometers; unreachable cells stay
        // missing rather than becoming zero.
        let durations = convert_cells(durations, origins.len(), destinations.len(), 60.0)?;
        let distances = convert_cells(distances, origins.len(), destinations.len(), 1000.0)?;

        Ok((durations, distances))
    }

    /// How many coordinates fit a single table request without pushing the
    /// URL past the configured limit.
    fn max_table_coords(
        &self,
        origins: &[LatLng],
        destinations: &[LatLng],
        profile: Profile,
    ) -> usize {
        let overhead = self.params.base_url.len()
            + OSRM_TABLE_API_PATH.len()
            + profile.to_string().len()
            + 1
            + "?annotations=duration,distance&sources=&destinations=".len();

        let coord_len = origins
            .iter()
            .chain(destinations)
            .map(|coord| {
                let point: geo_types::Point = coord.into();
                format!("{},{}", point.x(), point.y()).len()
            })
            .max()
            .unwrap_or(0)
            + 1;

        // Every coordinate also appears once as a source or destination
        // index; the ';' separators are percent-encoded in query values.
        let index_len = (origins.len() + destinations.len()).to_string().len() + 3;

        let budget = self.params.url_length_limit.saturating_sub(overhead);
        (budget / (coord_len + index_len)).max(2)
    }
}

/// Encode coordinates the way OSRM paths want them: `lon,lat` joined by ';'.
fn coords_path(coords: &[LatLng]) -> String {
    let mut path = String::new();
    for (i, coord) in coords.iter().enumerate() {
        let point: geo_types::Point = coord.into();
        if i > 0 {
            path.push(';');
        }
        path.push_str(&format!("{},{}", point.x(), point.y()));
    }
    path
}

fn join_indices(range: std::ops::Range<usize>) -> String {
    range
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

fn convert_cells(
    raw: Vec<Vec<Option<f64>>>,
    num_rows: usize,
    num_cols: usize,
    divisor: f64,
) -> Result<Vec<Vec<Option<f64>>>, OsrmError> {
    if raw.len() != num_rows || raw.iter().any(|row| row.len() != num_cols) {
        return Err(OsrmError::IncompleteResponse);
    }

    Ok(raw
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map(|value| value / divisor))
                .collect()
        })
        .collect())
}

fn column_index(table: &OdTable, name: &str) -> Result<usize, OsrmError> {
    table
        .column_index(name)
        .ok_or_else(|| OsrmError::MissingColumn(name.to_string()))
}

fn parse_pair(
    row: &[String],
    origin_lat: usize,
    origin_lon: usize,
    dest_lat: usize,
    dest_lon: usize,
) -> Result<(LatLng, LatLng), OsrmError> {
    let origin = LatLng::new(parse_cell(&row[origin_lat])?, parse_cell(&row[origin_lon])?)?;
    let destination = LatLng::new(parse_cell(&row[dest_lat])?, parse_cell(&row[dest_lon])?)?;
    Ok((origin, destination))
}

fn parse_cell(cell: &str) -> Result<f64, OsrmError> {
    cell.trim()
        .parse()
        .map_err(|_| OsrmError::BadNumber(cell.to_string()))
}
