use std::{num::NonZeroUsize, ops::Range};

/// Returns the range of indices assigned to worker `id`.
///
/// The range is `[⌊len·id/W⌋, ⌊len·(id+1)/W⌋)`, computed without overflow.
///
/// # Arguments
/// * `len` - The amount of indices to split.
/// * `id` - The worker id, must be at most `workers`.
/// * `workers` - The amount of workers.
pub fn range(len: usize, id: usize, workers: NonZeroUsize) -> Range<usize> {
    bound(len, id, workers)..bound(len, id + 1, workers)
}

/// Returns the ranges of all workers, ordered by worker id.
///
/// The ranges are contiguous, disjoint and cover `[0, len)` exactly.
pub fn ranges(len: usize, workers: NonZeroUsize) -> impl Iterator<Item = Range<usize>> {
    (0..workers.get()).map(move |id| range(len, id, workers))
}

fn bound(len: usize, id: usize, workers: NonZeroUsize) -> usize {
    (len as u128 * id as u128 / workers.get() as u128) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn exact_coverage() {
        for len in 0..64 {
            for w in 1..12 {
                let mut next = 0;

                for range in ranges(len, workers(w)) {
                    assert_eq!(range.start, next, "gap or overlap for len={len} w={w}");
                    assert!(range.start <= range.end);
                    next = range.end;
                }

                assert_eq!(next, len, "incomplete coverage for len={len} w={w}");
            }
        }
    }

    #[test]
    fn remainder_goes_to_later_workers() {
        let got: Vec<_> = ranges(10, workers(4)).collect();
        assert_eq!(got, vec![0..2, 2..5, 5..7, 7..10]);
    }

    #[test]
    fn sizes_differ_by_at_most_one() {
        let sizes: Vec<_> = ranges(1000, workers(7)).map(|r| r.len()).collect();
        let min = sizes.iter().min().unwrap();
        let max = sizes.iter().max().unwrap();

        assert!(max - min <= 1);
        assert_eq!(sizes.iter().sum::<usize>(), 1000);
    }

    #[test]
    fn single_worker_takes_everything() {
        assert_eq!(range(42, 0, workers(1)), 0..42);
    }

    #[test]
    fn no_overflow_on_huge_lengths() {
        let len = usize::MAX;
        let last = ranges(len, workers(3)).last().unwrap();

        assert_eq!(last.end, len);
        assert_eq!(range(len, 0, workers(3)).start, 0);
    }
}
