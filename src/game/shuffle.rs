use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

/// Returns a uniformly random permutation of `items` (Fisher-Yates).
///
/// Role assignment, anonymous numbering and turn order all go through this
/// so both game variants draw from the same distribution.
pub fn shuffled<T: Clone>(items: &[T]) -> Vec<T> {
    shuffled_with(items, &mut rand::rng())
}

pub fn shuffled_with<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// Picks one element uniformly, `None` for an empty slice.
pub fn pick<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::rng())
}
