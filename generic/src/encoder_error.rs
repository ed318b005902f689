use core::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::ChannelId;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderError {
    /// Sampling or query on a reader that has not been initialized.
    NotInitialized,
    /// Debounced raw code has no entry in the valid-code table.
    InvalidCode(u8),
    /// The platform failed to read or configure a GPIO line.
    GpioPinError,
    /// The backend for this channel is wired to a different pin than configured.
    PinMismatch(ChannelId),
    InvalidCodeTable,
    /// The reader was shut down for faults and stays down until an explicit
    /// `initialize()`.
    FaultShutdown,
}

impl fmt::Display for EncoderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncoderError::NotInitialized => write!(f, "encoder reader is not initialized"),
            EncoderError::InvalidCode(raw) => write!(f, "invalid encoder code {:#05b}", raw),
            EncoderError::GpioPinError => write!(f, "GPIO access failed"),
            EncoderError::PinMismatch(channel) => {
                write!(f, "channel {:?} is wired to an unexpected pin", channel)
            }
            EncoderError::InvalidCodeTable => write!(f, "malformed valid-code table"),
            EncoderError::FaultShutdown => write!(f, "encoder shut down after faults"),
        }
    }
}
