//! Randomizer helpers over an injected [`rand::Rng`].
//!
//! Nothing in the engine reaches for an ambient random source; every draw
//! goes through the generator owned by the session, so a fixed seed
//! reproduces a layout exactly.
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::tile::Color;

/// Default generator used by sessions.
pub type DefaultRng = Pcg32;

/// Builds the default generator, seeded from `seed` or from the thread RNG.
pub fn seeded_rng(seed: Option<u64>) -> DefaultRng {
    Pcg32::seed_from_u64(seed.unwrap_or_else(rand::random))
}

/// Returns a uniformly shuffled copy of `items` (Fisher–Yates).
///
/// Walks `i` from the last index down to 1 and swaps `i` with a uniform index
/// in `0..=i`. The input is left untouched.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.random_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// Uniform 24-bit RGB color.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color::from_rgb(rng.random_range(0..=0xFF_FF_FF))
}

/// Uniform value in `min..=max`; returns `min` when the range is empty.
pub(crate) fn fraction_between<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// Uniform integer in `min..=max`; returns `min` when the range is empty.
pub(crate) fn count_between<R: Rng + ?Sized>(min: u32, max: u32, rng: &mut R) -> u32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}
