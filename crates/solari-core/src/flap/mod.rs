mod board;
mod digit;

pub use board::{split_digits, FlapBoard};
pub use digit::{DigitFlap, FlipPhase, FLIP_DURATION_MS};
