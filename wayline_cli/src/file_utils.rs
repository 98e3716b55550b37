use std::path::{Path, PathBuf};

use anyhow::Context;

use wayline_osrm::{latlng::LatLng, od_table::OdTable, travel_matrix::TravelMatrix};

/// Recursively collect the .csv files under `folder_path`, sorted.
pub fn csv_files(folder_path: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder_path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            if path.extension().map(|ext| ext == "csv").unwrap_or(false) {
                files.push(path);
            }
        } else if path.is_dir() {
            files.extend(csv_files(&path)?);
        }
    }

    files.sort();

    Ok(files)
}

fn coordinate_column(headers: &csv::StringRecord, names: &[&str], fallback: usize) -> usize {
    headers
        .iter()
        .position(|header| names.iter().any(|name| header.eq_ignore_ascii_case(name)))
        .unwrap_or(fallback)
}

/// Read a headered coordinate file. Columns named lat/lon (or longer
/// variants) are used when present, otherwise the first two columns.
pub fn read_coordinates(path: &Path) -> anyhow::Result<Vec<LatLng>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let lat_column = coordinate_column(&headers, &["lat", "latitude"], 0);
    let lon_column = coordinate_column(&headers, &["lon", "lng", "longitude"], 1);

    let mut coords = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let lat: f64 = record
            .get(lat_column)
            .with_context(|| format!("{}: row {} has no latitude cell", path.display(), line + 1))?
            .trim()
            .parse()?;
        let lon: f64 = record
            .get(lon_column)
            .with_context(|| format!("{}: row {} has no longitude cell", path.display(), line + 1))?
            .trim()
            .parse()?;
        coords.push(LatLng::new(lat, lon)?);
    }

    Ok(coords)
}

/// Persist a matrix with Origin_i row labels and Dest_j column headers.
/// Missing cells are written empty.
pub fn write_matrix(path: &Path, matrix: &TravelMatrix) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![String::new()];
    header.extend((0..matrix.num_destinations()).map(|j| format!("Dest_{}", j + 1)));
    writer.write_record(&header)?;

    for (i, row) in matrix.iter_rows().enumerate() {
        let mut record = vec![format!("Origin_{}", i + 1)];
        record.extend(
            row.iter()
                .map(|cell| cell.map(|value| value.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn read_table(path: &Path) -> anyhow::Result<OdTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns = reader.headers()?.iter().map(str::to_string).collect();

    let mut table = OdTable::new(columns);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(str::to_string).collect())?;
    }

    Ok(table)
}

pub fn write_table(path: &Path, table: &OdTable) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_csv_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(dir.path().join("b.csv"), "lat,lon\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "lat,lon\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(sub.join("c.csv"), "lat,lon\n").unwrap();

        let files = csv_files(dir.path()).unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("a.csv"),
                dir.path().join("b.csv"),
                sub.join("c.csv"),
            ]
        );
    }

    #[test]
    fn test_read_coordinates_by_header_name() {
        let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "name,Longitude,Latitude").unwrap();
        writeln!(file, "delhi,77.210,28.689").unwrap();
        writeln!(file, "south,77.220,28.593").unwrap();

        let coords = read_coordinates(file.path()).unwrap();

        assert_eq!(coords.len(), 2);
        assert_eq!(coords[0].lat, 28.689);
        assert_eq!(coords[0].lng, 77.210);
    }

    #[test]
    fn test_read_coordinates_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "lat,lon").unwrap();
        writeln!(file, "95.0,77.210").unwrap();

        assert!(read_coordinates(file.path()).is_err());
    }

    #[test]
    fn test_table_round_trip() {
        let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "name,origin_lat,origin_lon,dest_lat,dest_lon").unwrap();
        writeln!(file, "home,28.689,77.210,28.593,77.220").unwrap();

        let table = read_table(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 0), "home");

        let out = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        write_table(out.path(), &table).unwrap();
        let reread = read_table(out.path()).unwrap();
        assert_eq!(reread, table);
    }
}
