//! Four-digit flap board: the display composer plus its animators.

use chrono::{DateTime, Utc};

use super::digit::{DigitFlap, FLIP_DURATION_MS};

/// Decompose a remaining time into board digits: minute tens, minute ones,
/// second tens, second ones. Each lands in `0..=9`.
pub fn split_digits(remaining_secs: u32) -> [u8; 4] {
    let minutes = remaining_secs / 60;
    let seconds = remaining_secs % 60;
    [
        ((minutes / 10) % 10) as u8,
        (minutes % 10) as u8,
        (seconds / 10) as u8,
        (seconds % 10) as u8,
    ]
}

/// The MM:SS board. Feeding it the remaining time starts flips on exactly
/// the digit positions whose value changed.
#[derive(Debug, Clone)]
pub struct FlapBoard {
    digits: [DigitFlap; 4],
}

impl FlapBoard {
    /// Board seeded to `remaining_secs` with no initial flip.
    pub fn new(remaining_secs: u32) -> Self {
        Self::with_flip_duration(remaining_secs, FLIP_DURATION_MS)
    }

    pub fn with_flip_duration(remaining_secs: u32, flip_duration_ms: u64) -> Self {
        let d = split_digits(remaining_secs);
        Self {
            digits: [
                DigitFlap::with_duration(d[0], flip_duration_ms),
                DigitFlap::with_duration(d[1], flip_duration_ms),
                DigitFlap::with_duration(d[2], flip_duration_ms),
                DigitFlap::with_duration(d[3], flip_duration_ms),
            ],
        }
    }

    /// Feed the current remaining time. Digits already at (or flipping to)
    /// their value are untouched.
    pub fn observe(&mut self, remaining_secs: u32, now: DateTime<Utc>) {
        let targets = split_digits(remaining_secs);
        for (flap, &digit) in self.digits.iter_mut().zip(targets.iter()) {
            flap.set_target(digit, now);
        }
    }

    /// Advance every digit. Returns how many revealed a new value.
    pub fn poll(&mut self, now: DateTime<Utc>) -> usize {
        self.digits
            .iter_mut()
            .map(|flap| flap.poll(now))
            .filter(|&revealed| revealed)
            .count()
    }

    /// The four digits as currently shown.
    pub fn displayed(&self) -> [u8; 4] {
        [
            self.digits[0].displayed(),
            self.digits[1].displayed(),
            self.digits[2].displayed(),
            self.digits[3].displayed(),
        ]
    }

    /// True when every digit is idle at its target.
    pub fn is_settled(&self) -> bool {
        self.digits.iter().all(|flap| !flap.is_flipping())
    }

    pub fn digits(&self) -> &[DigitFlap; 4] {
        &self.digits
    }
}
