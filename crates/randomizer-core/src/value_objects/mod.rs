//! Value objects - date keys and random sources

mod day_key;
mod random;

pub use day_key::{DayKey, HolidayDateKey};
pub use random::{pick, pick_index, RandomSource, SeededRandom, SequenceRandom, ThreadRandom};
