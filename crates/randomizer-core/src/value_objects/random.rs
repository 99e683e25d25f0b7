//! Random sources - injectable uniform randomness for selection

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform values in `[0, 1)`
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

/// Map a unit value onto `[0, len)`.
///
/// Out-of-range or non-finite values are clamped so the index is always valid
/// for a non-empty slice.
pub fn pick_index(unit: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let unit = if unit.is_finite() { unit.clamp(0.0, 1.0) } else { 0.0 };
    ((unit * len as f64).floor() as usize).min(len - 1)
}

/// Choose one item uniformly, `None` for an empty slice
pub fn pick<'a, T>(items: &'a [T], random: &mut dyn RandomSource) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(pick_index(random.next_unit(), items.len()))
}

/// Thread-local generator
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed sequence of values, cycling when exhausted
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    position: usize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            position: 0,
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_index_bounds() {
        assert_eq!(pick_index(0.0, 3), 0);
        assert_eq!(pick_index(0.999_999, 3), 2);
        assert_eq!(pick_index(1.0, 3), 2);
        assert_eq!(pick_index(-0.5, 3), 0);
        assert_eq!(pick_index(f64::NAN, 3), 0);
        assert_eq!(pick_index(0.5, 0), 0);
    }

    #[test]
    fn test_sequence_cycles() {
        let mut random = SequenceRandom::new(vec![0.1, 0.9]);
        assert!((random.next_unit() - 0.1).abs() < f64::EPSILON);
        assert!((random.next_unit() - 0.9).abs() < f64::EPSILON);
        assert!((random.next_unit() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_seeded_is_reproducible_and_in_range() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..100 {
            let value = a.next_unit();
            assert!((0.0..1.0).contains(&value));
            assert!((value - b.next_unit()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_pick() {
        let items = ["a", "b", "c"];
        let mut random = SequenceRandom::new(vec![0.5]);
        assert_eq!(pick(&items, &mut random), Some(&"b"));
        let empty: [&str; 0] = [];
        assert_eq!(pick(&empty, &mut random), None);
    }
}
