use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

pub(crate) fn get_default_rng_from_seed(seed: u64) -> Pcg64 {
    Pcg64::seed_from_u64(seed)
}

/// Uniform sample of at most `size` items from `iter` (algorithm R).
///
/// The generator is seeded with `seed`, so the same input always produces the
/// same sample.
pub(crate) fn reservoir_sample<T, I>(iter: I, size: usize, seed: u64) -> Vec<T>
where
    I: Iterator<Item = T>,
{
    if size == 0 {
        return Vec::new();
    }
    let mut rng = get_default_rng_from_seed(seed);
    let mut reservoir = Vec::with_capacity(size);
    for (idx, item) in iter.enumerate() {
        if idx < size {
            reservoir.push(item);
        } else {
            let replace = rng.gen_range(0..=idx);
            if replace < size {
                reservoir[replace] = item;
            }
        }
    }
    reservoir
}
