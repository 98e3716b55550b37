use crate::error::OsrmError;

/// Dense origin-row by destination-column matrix.
///
/// This matrix uses a flat structure: to find the index for a pair, use
/// `index = origin * num_destinations + destination`. A `None` cell is the
/// missing/unreachable marker, never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrix {
    values: Vec<Option<f64>>,
    num_origins: usize,
    num_destinations: usize,
}

impl TravelMatrix {
    pub(crate) fn empty(num_origins: usize, num_destinations: usize) -> Self {
        Self {
            values: vec![None; num_origins * num_destinations],
            num_origins,
            num_destinations,
        }
    }

    /// Build a matrix from origin-major rows; every row must have
    /// `num_destinations` cells.
    pub fn from_rows(
        num_destinations: usize,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, OsrmError> {
        if let Some(row) = rows.iter().find(|row| row.len() != num_destinations) {
            return Err(OsrmError::RowLength {
                expected: num_destinations,
                got: row.len(),
            });
        }

        Ok(Self {
            num_origins: rows.len(),
            num_destinations,
            values: rows.into_iter().flatten().collect(),
        })
    }

    #[inline(always)]
    fn index(&self, origin: usize, destination: usize) -> usize {
        origin * self.num_destinations + destination
    }

    pub fn get(&self, origin: usize, destination: usize) -> Option<f64> {
        self.values[self.index(origin, destination)]
    }

    /// Copy a rectangular block of cells in at the given offsets.
    pub(crate) fn paste(
        &mut self,
        origin_offset: usize,
        destination_offset: usize,
        block: &[Vec<Option<f64>>],
    ) {
        for (i, row) in block.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let index = self.index(origin_offset + i, destination_offset + j);
                self.values[index] = *value;
            }
        }
    }

    pub fn num_origins(&self) -> usize {
        self.num_origins
    }

    pub fn num_destinations(&self) -> usize {
        self.num_destinations
    }

    pub fn row(&self, origin: usize) -> &[Option<f64>] {
        let start = self.index(origin, 0);
        &self.values[start..start + self.num_destinations]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.values.chunks(self.num_destinations.max(1))
    }
}

/// Duration and distance matrices for one origin/destination grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrices {
    /// Travel times in minutes
    pub durations: TravelMatrix,

    /// Distances in kilometers
    pub distances: TravelMatrix,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_out_missing() {
        let matrix = TravelMatrix::empty(2, 3);
        assert_eq!(matrix.num_origins(), 2);
        assert_eq!(matrix.num_destinations(), 3);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), None);
            }
        }
    }

    #[test]
    fn test_paste_at_offset() {
        let mut matrix = TravelMatrix::empty(3, 3);
        matrix.paste(1, 2, &[vec![Some(5.0)], vec![Some(7.0)]]);

        assert_eq!(matrix.get(1, 2), Some(5.0));
        assert_eq!(matrix.get(2, 2), Some(7.0));
        assert_eq!(matrix.get(0, 0), None);
        assert_eq!(matrix.get(1, 1), None);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let ragged = vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0)]];
        assert!(matches!(
            TravelMatrix::from_rows(2, ragged),
            Err(OsrmError::RowLength {
                expected: 2,
                got: 1
            })
        ));

        let matrix = TravelMatrix::from_rows(2, vec![vec![Some(1.0), None]]).unwrap();
        assert_eq!(matrix.num_origins(), 1);
        assert_eq!(matrix.get(0, 1), None);
    }

    #[test]
    fn test_rows_follow_origin_order() {
        let mut matrix = TravelMatrix::empty(2, 2);
        matrix.paste(0, 0, &[vec![Some(1.0), None], vec![Some(3.0), Some(4.0)]]);

        assert_eq!(matrix.row(0), &[Some(1.0), None]);
        assert_eq!(matrix.row(1), &[Some(3.0), Some(4.0)]);

        let rows: Vec<_> = matrix.iter_rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], &[Some(3.0), Some(4.0)]);
    }
}
