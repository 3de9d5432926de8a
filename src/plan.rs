/// Half-open range of line (or byte) indices handled as one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkDescriptor {
    pub start: usize,
    pub end: usize,
}

impl ChunkDescriptor {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Splits `[0, total_units)` into consecutive chunks of `chunk_size`.
/// Only the last chunk may be shorter. A zero `chunk_size` is treated as 1.
pub fn plan_chunks(total_units: usize, chunk_size: usize) -> Vec<ChunkDescriptor> {
    let chunk_size = chunk_size.max(1);
    (0..total_units)
        .step_by(chunk_size)
        .map(|start| ChunkDescriptor {
            start,
            end: total_units.min(start + chunk_size),
        })
        .collect()
}

/// Distributes chunks over at most `max_workers` buckets, round-robin.
/// With no more chunks than workers every chunk gets its own bucket.
pub fn assign_buckets(
    chunks: &[ChunkDescriptor],
    max_workers: usize,
) -> Vec<Vec<ChunkDescriptor>> {
    let bucket_count = chunks.len().min(max_workers.max(1));
    let mut buckets = vec![Vec::new(); bucket_count];
    for (i, chunk) in chunks.iter().enumerate() {
        buckets[i % bucket_count].push(*chunk);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(chunks: &[ChunkDescriptor], total: usize) {
        let mut covered = vec![0u8; total];
        for c in chunks {
            for slot in &mut covered[c.start..c.end] {
                *slot += 1;
            }
        }
        assert!(covered.iter().all(|&n| n == 1), "not an exact cover of 0..{total}");
    }

    #[test]
    fn test_plan_partitions_exactly() {
        for total in [0, 1, 7, 999, 1000, 1001, 4321] {
            for size in [1, 3, 1000] {
                let chunks = plan_chunks(total, size);
                assert_partition(&chunks, total);
                assert!(chunks.iter().all(|c| c.len() <= size && !c.is_empty()));
                if let Some((last, rest)) = chunks.split_last() {
                    assert!(rest.iter().all(|c| c.len() == size));
                    assert_eq!(last.end, total);
                }
            }
        }
    }

    #[test]
    fn test_plan_of_nothing_is_empty() {
        assert!(plan_chunks(0, 10).is_empty());
    }

    #[test]
    fn test_zero_chunk_size_plans_single_lines() {
        let chunks = plan_chunks(5, 0);
        assert_eq!(chunks.len(), 5);
        assert_partition(&chunks, 5);
        assert!(chunks.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_buckets_keep_the_partition() {
        let chunks = plan_chunks(2500, 100);
        for workers in [1, 2, 3, 8, 25, 64] {
            let buckets = assign_buckets(&chunks, workers);
            assert_eq!(buckets.len(), workers.min(chunks.len()));
            let flat: Vec<_> = buckets.iter().flatten().copied().collect();
            assert_partition(&flat, 2500);
            for bucket in &buckets {
                assert!(bucket.windows(2).all(|w| w[0].start < w[1].start));
            }
        }
    }

    #[test]
    fn test_buckets_are_round_robin() {
        let chunks = plan_chunks(50, 10);
        let buckets = assign_buckets(&chunks, 2);
        let starts: Vec<Vec<usize>> = buckets
            .iter()
            .map(|b| b.iter().map(|c| c.start).collect())
            .collect();
        assert_eq!(starts, vec![vec![0, 20, 40], vec![10, 30]]);
    }

    #[test]
    fn test_zero_workers_still_gets_one_bucket() {
        let chunks = plan_chunks(30, 10);
        assert_eq!(assign_buckets(&chunks, 0).len(), 1);
        assert!(assign_buckets(&[], 4).is_empty());
    }
}
