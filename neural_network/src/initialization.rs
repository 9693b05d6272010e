use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Distribution;

/// The standard normal distribution, sampled with the polar rejection method.
///
/// Draws pairs of uniform numbers in `(-1, 1)` until they fall inside the unit circle and
/// transforms the first one.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolarNormal;

impl Distribution<f32> for PolarNormal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        loop {
            let u: f32 = rng.random_range(-1.0..1.0);
            let v: f32 = rng.random_range(-1.0..1.0);
            let s = u * u + v * v;

            if s > 0. && s < 1. {
                return u * (-2. * s.ln() / s).sqrt();
            }
        }
    }
}

/// Creates a generator from `seed`, or from the operating system's entropy if there is none.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
