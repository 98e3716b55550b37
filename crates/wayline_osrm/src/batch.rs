use std::ops::Range;

/// One rectangular slice of the origin/destination grid, small enough for a
/// single `/table` request.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub origins: Range<usize>,
    pub destinations: Range<usize>,
}

/// Tile the full grid with batches whose combined coordinate count stays
/// under `max_coords`, walking origins then destinations so the caller's
/// ordering is preserved when the slices are pasted back.
pub(crate) fn plan_batches(
    num_origins: usize,
    num_destinations: usize,
    max_coords: usize,
) -> Vec<Batch> {
    // One origin plus one destination is the smallest request that still
    // means anything.
    let max_coords = max_coords.max(2);

    if num_origins + num_destinations <= max_coords {
        return vec![Batch {
            origins: 0..num_origins,
            destinations: 0..num_destinations,
        }];
    }

    let dest_half = num_destinations.min((max_coords / 2).max(1));
    let origin_chunk = num_origins.min((max_coords - dest_half).max(1));
    let dest_chunk = num_destinations.min((max_coords - origin_chunk).max(1));

    let mut batches = Vec::new();
    let mut origin = 0;
    while origin < num_origins {
        let origin_end = (origin + origin_chunk).min(num_origins);
        let mut dest = 0;
        while dest < num_destinations {
            let dest_end = (dest + dest_chunk).min(num_destinations);
            batches.push(Batch {
                origins: origin..origin_end,
                destinations: dest..dest_end,
            });
            dest = dest_end;
        }
        origin = origin_end;
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every cell of the grid must be covered by exactly one batch, and
    // batches must appear in row-major input order.
    fn assert_tiles_exactly(batches: &[Batch], num_origins: usize, num_destinations: usize) {
        let mut covered = vec![0u32; num_origins * num_destinations];
        for batch in batches {
            for i in batch.origins.clone() {
                for j in batch.destinations.clone() {
                    covered[i * num_destinations + j] += 1;
                }
            }
        }
        assert!(covered.iter().all(|&count| count == 1));
    }

    #[test]
    fn test_single_batch_when_everything_fits() {
        let batches = plan_batches(3, 4, 100);
        assert_eq!(
            batches,
            vec![Batch {
                origins: 0..3,
                destinations: 0..4,
            }]
        );
    }

    #[test]
    fn test_splits_respect_the_cap() {
        let batches = plan_batches(50, 50, 40);
        assert!(batches.len() > 1);
        for batch in &batches {
            assert!(batch.origins.len() + batch.destinations.len() <= 40);
        }
        assert_tiles_exactly(&batches, 50, 50);
    }

    #[test]
    fn test_one_origin_many_destinations() {
        let batches = plan_batches(1, 500, 100);
        assert_tiles_exactly(&batches, 1, 500);
        for batch in &batches {
            assert_eq!(batch.origins, 0..1);
            assert!(batch.destinations.len() <= 99);
        }
    }

    #[test]
    fn test_many_origins_one_destination() {
        let batches = plan_batches(500, 1, 100);
        assert_tiles_exactly(&batches, 500, 1);
        for batch in &batches {
            assert!(batch.origins.len() <= 99);
        }
    }

    #[test]
    fn test_tiny_cap_is_clamped() {
        let batches = plan_batches(3, 3, 0);
        assert_tiles_exactly(&batches, 3, 3);
        for batch in &batches {
            assert_eq!(batch.origins.len(), 1);
            assert_eq!(batch.destinations.len(), 1);
        }
    }

    #[test]
    fn test_batches_preserve_input_order() {
        let batches = plan_batches(10, 10, 8);
        let mut last = (0, 0);
        for batch in &batches {
            let key = (batch.origins.start, batch.destinations.start);
            assert!(key >= last);
            last = key;
        }
    }
}
