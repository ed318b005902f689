//! In-memory GPIO backend.
//!
//! [`SimLines`] stands in for the three physical lines; each [`SimChannel`]
//! borrows it and implements [`InputChannel`] for one line, so a test keeps a
//! handle to drive levels while the reader owns the channels.

use core::cell::Cell;

use crate::channel::{ChannelId, InputChannel, PinDirection, Pull, CHANNEL_COUNT};
use crate::encoder_error::EncoderError;

#[derive(Debug)]
pub struct SimLines {
    levels: [Cell<bool>; CHANNEL_COUNT],
    pulls: [Cell<Pull>; CHANNEL_COUNT],
    directions: [Cell<PinDirection>; CHANNEL_COUNT],
    fail_reads: Cell<bool>,
    fail_configure: Cell<bool>,
    reads: Cell<u32>,
}

impl Default for SimLines {
    fn default() -> Self {
        Self::new()
    }
}

impl SimLines {
    pub const fn new() -> Self {
        Self {
            levels: [Cell::new(false), Cell::new(false), Cell::new(false)],
            pulls: [Cell::new(Pull::None), Cell::new(Pull::None), Cell::new(Pull::None)],
            directions: [
                Cell::new(PinDirection::Disabled),
                Cell::new(PinDirection::Disabled),
                Cell::new(PinDirection::Disabled),
            ],
            fail_reads: Cell::new(false),
            fail_configure: Cell::new(false),
            reads: Cell::new(0),
        }
    }

    /// Drive all three lines from a raw code (A=bit2, B=bit1, C=bit0).
    pub fn set_code(&self, code: u8) {
        for channel in ChannelId::ALL {
            self.set_level(channel, code & channel.bit() != 0);
        }
    }

    pub fn set_level(&self, channel: ChannelId, level: bool) {
        self.levels[channel.index()].set(level);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_configure(&self, fail: bool) {
        self.fail_configure.set(fail);
    }

    pub fn pull(&self, channel: ChannelId) -> Pull {
        self.pulls[channel.index()].get()
    }

    pub fn direction(&self, channel: ChannelId) -> PinDirection {
        self.directions[channel.index()].get()
    }

    /// Level reads attempted across all lines, failed or not.
    pub fn reads(&self) -> u32 {
        self.reads.get()
    }

    pub fn channel(&self, channel: ChannelId, pin: u8) -> SimChannel<'_> {
        SimChannel { lines: self, channel, pin }
    }

    /// One channel per line, in A, B, C order.
    pub fn channels(&self, pins: [u8; CHANNEL_COUNT]) -> [SimChannel<'_>; CHANNEL_COUNT] {
        [
            self.channel(ChannelId::A, pins[0]),
            self.channel(ChannelId::B, pins[1]),
            self.channel(ChannelId::C, pins[2]),
        ]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimChannel<'a> {
    lines: &'a SimLines,
    channel: ChannelId,
    pin: u8,
}

impl InputChannel for SimChannel<'_> {
    fn pin_id(&self) -> u8 {
        self.pin
    }

    fn configure(&mut self, pull: Pull, direction: PinDirection) -> Result<(), EncoderError> {
        if self.lines.fail_configure.get() {
            return Err(EncoderError::GpioPinError);
        }
        self.lines.pulls[self.channel.index()].set(pull);
        self.lines.directions[self.channel.index()].set(direction);
        Ok(())
    }

    fn read_level(&mut self) -> Result<bool, EncoderError> {
        self.lines.reads.set(self.lines.reads.get() + 1);
        if self.lines.fail_reads.get() {
            return Err(EncoderError::GpioPinError);
        }
        if self.lines.direction(self.channel) == PinDirection::Disabled {
            // input buffer off reads low on real silicon
            return Ok(false);
        }
        Ok(self.lines.levels[self.channel.index()].get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_code_drives_lines() {
        let lines = SimLines::new();
        let [mut a, mut b, mut c] = lines.channels([29, 28, 27]);
        for ch in [&mut a, &mut b, &mut c] {
            ch.configure(Pull::Up, PinDirection::Input).unwrap();
        }

        lines.set_code(0b101);
        assert_eq!(a.read_level(), Ok(true));
        assert_eq!(b.read_level(), Ok(false));
        assert_eq!(c.read_level(), Ok(true));
        assert_eq!(lines.reads(), 3);
        assert_eq!(lines.pull(ChannelId::B), Pull::Up);
    }

    #[test]
    fn test_disabled_line_reads_low() {
        let lines = SimLines::new();
        let mut a = lines.channel(ChannelId::A, 29);
        lines.set_level(ChannelId::A, true);
        assert_eq!(a.read_level(), Ok(false));
        assert_eq!(lines.reads(), 1);
        assert_eq!(a.pin_id(), 29);
    }

    #[test]
    fn test_failure_switches() {
        let lines = SimLines::new();
        let mut c = lines.channel(ChannelId::C, 27);
        lines.set_fail_configure(true);
        assert_eq!(c.configure(Pull::None, PinDirection::Input), Err(EncoderError::GpioPinError));
        lines.set_fail_configure(false);
        c.configure(Pull::None, PinDirection::Input).unwrap();
        lines.set_fail_reads(true);
        assert_eq!(c.read_level(), Err(EncoderError::GpioPinError));
    }
}
