use rand::Rng;
use rand::seq::index;

/// `count` different members out of `pool_size`, never `exclude`.
pub(crate) fn distinct_indices<R: Rng + ?Sized>(
    exclude: usize,
    count: usize,
    pool_size: usize,
    rng: &mut R,
) -> Vec<usize> {
    debug_assert!(count < pool_size);
    // draw from the pool minus one slot, then step over `exclude`
    let mut picks = index::sample(rng, pool_size - 1, count).into_vec();
    for pick in picks.iter_mut().filter(|p| **p >= exclude) {
        *pick += 1;
    }
    picks
}
