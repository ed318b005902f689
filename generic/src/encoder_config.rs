use crate::channel::{ChannelId, Polarity, Pull, CHANNEL_COUNT};
use crate::code_table::CodeTable;

/// Samples a level change must persist before it is committed.
pub const DEFAULT_DEBOUNCE_TICKS: u16 = 3;

/// What `sample()` does with a debounced code outside the valid-code table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultPolicy {
    /// Report `InvalidCode`, keep the last valid snapshot, count the fault.
    #[default]
    HoldLastGood,
    /// As `HoldLastGood`, then shut the reader down.
    Disable,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub pin: u8,
    pub pull: Pull,
    pub polarity: Polarity,
}

impl ChannelConfig {
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            pull: Pull::None,
            polarity: Polarity::ActiveHigh,
        }
    }
}

/// Reader configuration, fixed at construction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderConfig {
    /// Indexed by [`ChannelId::index`].
    pub channels: [ChannelConfig; CHANNEL_COUNT],
    pub debounce_ticks: u16,
    pub code_table: CodeTable,
    pub fault_policy: FaultPolicy,
    /// Count `Reverse` steps as positive movement.
    pub revert_direction: bool,
}

impl EncoderConfig {
    pub const fn new(pin_a: u8, pin_b: u8, pin_c: u8) -> Self {
        Self {
            channels: [
                ChannelConfig::new(pin_a),
                ChannelConfig::new(pin_b),
                ChannelConfig::new(pin_c),
            ],
            debounce_ticks: DEFAULT_DEBOUNCE_TICKS,
            code_table: CodeTable::THREE_PHASE,
            fault_policy: FaultPolicy::HoldLastGood,
            revert_direction: false,
        }
    }

    pub const fn with_debounce_ticks(mut self, ticks: u16) -> Self {
        self.debounce_ticks = ticks;
        self
    }

    pub const fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    pub const fn with_code_table(mut self, table: CodeTable) -> Self {
        self.code_table = table;
        self
    }

    pub const fn with_revert_direction(mut self, revert: bool) -> Self {
        self.revert_direction = revert;
        self
    }

    /// Same pull resistor on all three lines.
    pub fn with_pull(mut self, pull: Pull) -> Self {
        for channel in self.channels.iter_mut() {
            channel.pull = pull;
        }
        self
    }

    pub fn with_polarity(mut self, channel: ChannelId, polarity: Polarity) -> Self {
        self.channels[channel.index()].polarity = polarity;
        self
    }

    pub fn channel(&self, channel: ChannelId) -> &ChannelConfig {
        &self.channels[channel.index()]
    }
}
