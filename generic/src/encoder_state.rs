use serde::{Deserialize, Serialize};

use crate::channel::ChannelId;
use crate::code_table::Phase;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionDirection {
    /// No step seen since initialization, or the last change skipped phases.
    Unknown,
    Forward,
    Reverse,
}

/// Snapshot of the debounced encoder inputs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderState {
    /// Debounced levels, A=bit2, B=bit1, C=bit0.
    ///
    /// Always a code from the valid-code table, with one exception: the seed
    /// snapshot taken by `initialize()` records whatever the lines showed,
    /// and marks an invalid seed with `phase == None`.
    pub raw: u8,
    /// `None` only while no valid code has been committed since initialization.
    pub phase: Option<Phase>,
    /// Number of successful samples since initialization; 0 for the seed snapshot.
    pub sequence: u32,
    pub position: i32,
    pub direction: MotionDirection,
}

impl EncoderState {
    pub const fn seed(raw: u8, phase: Option<Phase>) -> Self {
        Self {
            raw,
            phase,
            sequence: 0,
            position: 0,
            direction: MotionDirection::Unknown,
        }
    }

    pub fn level(&self, channel: ChannelId) -> bool {
        self.raw & channel.bit() != 0
    }
}

impl Default for EncoderState {
    fn default() -> Self {
        Self::seed(0, None)
    }
}
