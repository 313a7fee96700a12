//! Per-digit split-flap animation.
//!
//! Each digit runs a two-phase mechanical flip: the old card rotates away
//! (`FlippingOut`), the new value is revealed at the midpoint, then the new
//! card settles (`FlippingIn`). Timing is carried as wall-clock deadlines,
//! and `poll` cascades through every deadline that has already passed, so a
//! renderer that stalls catches up in one call instead of leaking a phase.
//!
//! ## Phase Transitions
//!
//! ```text
//! Idle -> FlippingOut -> FlippingIn -> Idle
//!          ^  (re-target restarts from here)
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default full flip duration in milliseconds. The reveal happens at the
/// midpoint.
pub const FLIP_DURATION_MS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipPhase {
    Idle,
    FlippingOut,
    FlippingIn,
}

/// One digit position on the board.
///
/// Holds the digit currently showing and the digit being flipped to.
/// `displayed` only changes at a reveal, never directly on `set_target`.
#[derive(Debug, Clone)]
pub struct DigitFlap {
    displayed: u8,
    target: u8,
    phase: FlipPhase,
    /// Deadline of the current phase; `None` exactly while `Idle`.
    phase_ends_at: Option<DateTime<Utc>>,
    half_duration: Duration,
}

impl DigitFlap {
    pub fn new(digit: u8) -> Self {
        Self::with_duration(digit, FLIP_DURATION_MS)
    }

    /// `flip_duration_ms` covers the full out-and-in transition and is
    /// halved for the two phases.
    pub fn with_duration(digit: u8, flip_duration_ms: u64) -> Self {
        let digit = digit % 10;
        Self {
            displayed: digit,
            target: digit,
            phase: FlipPhase::Idle,
            phase_ends_at: None,
            half_duration: Duration::milliseconds(((flip_duration_ms / 2).max(1)) as i64),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn displayed(&self) -> u8 {
        self.displayed
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn phase(&self) -> FlipPhase {
        self.phase
    }

    pub fn is_flipping(&self) -> bool {
        self.phase != FlipPhase::Idle
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Aim the digit at a new value.
    ///
    /// Repeating the current target is a no-op, so an in-progress flip
    /// plays out exactly once. A different target cancels any pending
    /// deadline and restarts the flip from whatever is displayed now.
    pub fn set_target(&mut self, digit: u8, now: DateTime<Utc>) {
        let digit = digit % 10;
        if digit == self.target {
            return;
        }
        self.target = digit;
        self.phase = FlipPhase::FlippingOut;
        self.phase_ends_at = Some(now + self.half_duration);
    }

    /// Advance through every phase deadline that `now` has passed.
    /// Returns `true` when the displayed value swapped (the reveal).
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        let mut revealed = false;
        while let Some(deadline) = self.phase_ends_at {
            if now < deadline {
                break;
            }
            match self.phase {
                FlipPhase::FlippingOut => {
                    self.displayed = self.target;
                    revealed = true;
                    self.phase = FlipPhase::FlippingIn;
                    // Chained from the out deadline, so a late poll keeps
                    // the full flip duration exact.
                    self.phase_ends_at = Some(deadline + self.half_duration);
                }
                FlipPhase::FlippingIn => {
                    self.phase = FlipPhase::Idle;
                    self.phase_ends_at = None;
                }
                FlipPhase::Idle => {
                    self.phase_ends_at = None;
                }
            }
        }
        revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: DateTime<Utc>, ms: i64) -> DateTime<Utc> {
        base + Duration::milliseconds(ms)
    }

    #[test]
    fn same_target_does_not_flip() {
        let start = Utc::now();
        let mut flap = DigitFlap::new(5);
        flap.set_target(5, start);
        assert_eq!(flap.phase(), FlipPhase::Idle);
        assert!(!flap.poll(at(start, 1000)));
        assert_eq!(flap.displayed(), 5);
    }

    #[test]
    fn full_flip_reveals_at_midpoint() {
        let start = Utc::now();
        let mut flap = DigitFlap::new(3);
        flap.set_target(4, start);
        assert_eq!(flap.phase(), FlipPhase::FlippingOut);
        assert_eq!(flap.displayed(), 3);

        // Just before the midpoint the old digit still shows.
        assert!(!flap.poll(at(start, 299)));
        assert_eq!(flap.displayed(), 3);

        // At the midpoint the new digit is revealed.
        assert!(flap.poll(at(start, 300)));
        assert_eq!(flap.displayed(), 4);
        assert_eq!(flap.phase(), FlipPhase::FlippingIn);

        // At the full duration the flap settles.
        assert!(!flap.poll(at(start, 600)));
        assert_eq!(flap.phase(), FlipPhase::Idle);
        assert_eq!(flap.displayed(), 4);
    }

    #[test]
    fn retarget_mid_flip_skips_the_stale_digit() {
        let start = Utc::now();
        let mut flap = DigitFlap::new(3);
        flap.set_target(4, start);

        // Before the first reveal lands, aim somewhere else.
        flap.poll(at(start, 100));
        flap.set_target(6, at(start, 100));

        // The original midpoint passes without revealing 4.
        assert!(!flap.poll(at(start, 300)));
        assert_eq!(flap.displayed(), 3);

        // The restarted flip reveals 6 and settles.
        assert!(flap.poll(at(start, 400)));
        assert_eq!(flap.displayed(), 6);
        assert!(!flap.poll(at(start, 700)));
        assert_eq!(flap.phase(), FlipPhase::Idle);
    }

    #[test]
    fn repeated_target_during_flip_plays_one_cycle() {
        let start = Utc::now();
        let mut flap = DigitFlap::new(5);
        flap.set_target(7, start);
        flap.set_target(7, at(start, 100));

        assert!(flap.poll(at(start, 300)));
        assert_eq!(flap.displayed(), 7);
        assert!(!flap.poll(at(start, 600)));
        assert_eq!(flap.phase(), FlipPhase::Idle);

        // No second reveal pending.
        assert!(!flap.poll(at(start, 1200)));
    }

    #[test]
    fn late_poll_cascades_to_idle() {
        let start = Utc::now();
        let mut flap = DigitFlap::new(0);
        flap.set_target(9, start);

        // One poll long after both deadlines runs out-reveal-in in order.
        assert!(flap.poll(at(start, 5000)));
        assert_eq!(flap.displayed(), 9);
        assert_eq!(flap.phase(), FlipPhase::Idle);
    }

    #[test]
    fn targets_are_reduced_modulo_ten() {
        let start = Utc::now();
        let mut flap = DigitFlap::new(13);
        assert_eq!(flap.displayed(), 3);
        flap.set_target(27, start);
        assert_eq!(flap.target(), 7);
    }

    #[test]
    fn custom_duration_moves_the_midpoint() {
        let start = Utc::now();
        let mut flap = DigitFlap::with_duration(1, 200);
        flap.set_target(2, start);

        assert!(!flap.poll(at(start, 99)));
        assert!(flap.poll(at(start, 100)));
        assert_eq!(flap.displayed(), 2);
        assert!(!flap.poll(at(start, 200)));
        assert_eq!(flap.phase(), FlipPhase::Idle);
    }
}
