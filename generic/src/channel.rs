//! GPIO channel capability and per-channel debounce state.

use serde::{Deserialize, Serialize};

use crate::encoder_error::EncoderError;

/// Number of input lines feeding the reader.
pub const CHANNEL_COUNT: usize = 3;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelId {
    A,
    B,
    C,
}

impl ChannelId {
    pub const ALL: [ChannelId; CHANNEL_COUNT] = [ChannelId::A, ChannelId::B, ChannelId::C];

    pub fn index(&self) -> usize {
        match self {
            ChannelId::A => 0,
            ChannelId::B => 1,
            ChannelId::C => 2,
        }
    }

    /// Bit of this channel in a raw code: A=bit2, B=bit1, C=bit0.
    pub fn bit(&self) -> u8 {
        match self {
            ChannelId::A => 0b100,
            ChannelId::B => 0b010,
            ChannelId::C => 0b001,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinDirection {
    Input,
    /// Input buffer off, no pulls: the line is left high impedance.
    Disabled,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// Logical level for an electrical level read from the pin.
    pub fn apply(&self, electrical: bool) -> bool {
        match self {
            Polarity::ActiveHigh => electrical,
            Polarity::ActiveLow => !electrical,
        }
    }
}

/// A single digital input line.
///
/// Implemented by the board backend (RP2040 SIO pins in the firmware crate)
/// and by [`SimChannel`](crate::sim_channel::SimChannel) for host tests.
/// Platform failures are reported as [`EncoderError::GpioPinError`].
pub trait InputChannel {
    /// Platform pin number this line is wired to.
    fn pin_id(&self) -> u8;

    fn configure(&mut self, pull: Pull, direction: PinDirection) -> Result<(), EncoderError>;

    /// Instantaneous electrical level, `true` for high.
    fn read_level(&mut self) -> Result<bool, EncoderError>;
}

/// Debounce bookkeeping for one line. Levels stored here are logical,
/// i.e. polarity has already been applied.
#[derive(Debug)]
pub(crate) struct Channel<C> {
    pub(crate) io: C,
    raw_level: bool,
    stable_level: bool,
    pending_ticks: u16,
    last_transition_tick: u32,
}

impl<C> Channel<C> {
    pub(crate) fn new(io: C) -> Self {
        Self {
            io,
            raw_level: false,
            stable_level: false,
            pending_ticks: 0,
            last_transition_tick: 0,
        }
    }

    pub(crate) fn seed(&mut self, level: bool) {
        self.raw_level = level;
        self.stable_level = level;
        self.pending_ticks = 0;
        self.last_transition_tick = 0;
    }

    pub(crate) fn reset(&mut self) {
        self.seed(false);
    }

    /// Feed one sample. Returns `true` when a level change is committed.
    ///
    /// A change is committed once the new level has been seen on `threshold`
    /// consecutive samples; seeing the stable level again drops the pending
    /// change. A threshold of 0 behaves as 1.
    pub(crate) fn debounce(&mut self, level: bool, threshold: u16, tick: u32) -> bool {
        self.raw_level = level;
        if level == self.stable_level {
            self.pending_ticks = 0;
            return false;
        }

        self.pending_ticks = self.pending_ticks.saturating_add(1);
        if self.pending_ticks < threshold.max(1) {
            return false;
        }

        self.stable_level = level;
        self.pending_ticks = 0;
        self.last_transition_tick = tick;
        true
    }

    pub(crate) fn raw_level(&self) -> bool {
        self.raw_level
    }

    pub(crate) fn stable_level(&self) -> bool {
        self.stable_level
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending_ticks != 0
    }

    pub(crate) fn last_transition_tick(&self) -> u32 {
        self.last_transition_tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_glitch_is_dropped() {
        let mut channel = Channel::new(());
        channel.seed(false);

        assert!(!channel.debounce(true, 3, 1));
        assert!(!channel.debounce(true, 3, 2));
        assert!(channel.is_pending());
        // back to the stable level before the threshold
        assert!(!channel.debounce(false, 3, 3));
        assert!(!channel.is_pending());
        assert!(!channel.debounce(true, 3, 4));
        assert!(!channel.stable_level());
    }

    #[test]
    fn test_held_change_commits_once() {
        let mut channel = Channel::new(());
        channel.seed(false);

        let commits = (1..=10u32).filter(|tick| channel.debounce(true, 3, *tick)).count();
        assert_eq!(commits, 1);
        assert!(channel.stable_level());
        assert_eq!(channel.last_transition_tick(), 3);
    }

    #[test]
    fn test_zero_threshold_commits_immediately() {
        let mut channel = Channel::new(());
        channel.seed(true);

        assert!(channel.debounce(false, 0, 7));
        assert!(!channel.stable_level());
        assert_eq!(channel.last_transition_tick(), 7);
    }

    #[test]
    fn test_raw_level_tracks_every_sample() {
        let mut channel = Channel::new(());
        channel.seed(false);

        channel.debounce(true, 5, 1);
        assert!(channel.raw_level());
        assert!(!channel.stable_level());
    }

    #[test]
    fn test_active_low_polarity() {
        assert!(Polarity::ActiveLow.apply(false));
        assert!(!Polarity::ActiveLow.apply(true));
        assert!(Polarity::ActiveHigh.apply(true));
    }

    #[test]
    fn test_channel_bits() {
        let code = ChannelId::ALL.iter().fold(0u8, |acc, ch| acc | ch.bit());
        assert_eq!(code, 0b111);
        assert_eq!(ChannelId::B.index(), 1);
    }
}
