//! Leaf value generators. Each one draws from the RNG it is handed and knows
//! nothing about uniqueness; see [`crate::unique`] for constraint handling.

pub mod lorem;
pub mod primitives;

pub use lorem::lorem_text;
pub use primitives::{
    boolean, choice, date, datetime, date_floor, decimal, integer, pattern_text,
    positive_integer, positive_small_integer, small_integer, variable_text,
};
