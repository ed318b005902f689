//! Three-channel encoder reader.
//!
//! [`EncoderReader`] owns the three input lines and turns raw pin levels into
//! debounced, decoded [`EncoderState`] snapshots.
//!
//! # Lifecycle
//!
//! ```text
//!                initialize()
//! Uninitialized ─────────────> Active ──┐ sample()
//!       ^                        │  <───┘
//!       └────────── disable() ───┘
//! ```
//!
//! `sample()`, `read_state()` and every query fail with
//! [`EncoderError::NotInitialized`] while Uninitialized. `disable()` never
//! fails and is a no-op when already Uninitialized.
//!
//! # Debounce
//!
//! Debounce time is counted in samples: a level change is committed after it
//! has been read on `debounce_ticks` consecutive `sample()` calls. The caller
//! is expected to sample at a fixed cadence. `sample()` never blocks or
//! allocates.

use crate::channel::{Channel, ChannelId, InputChannel, PinDirection, Pull, CHANNEL_COUNT};
use crate::code_table::PhaseStep;
use crate::encoder_config::{EncoderConfig, FaultPolicy};
use crate::encoder_error::EncoderError;
use crate::encoder_state::{EncoderState, MotionDirection};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReaderState {
    Uninitialized,
    Active,
}

/// Per-channel debounce view, for diagnostics.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStatus {
    pub pin: u8,
    /// Logical level seen on the latest sample.
    pub raw_level: bool,
    /// Last committed logical level.
    pub stable_level: bool,
    /// A change is waiting out the debounce threshold.
    pub pending: bool,
    /// Sample tick of the last committed change, 0 if none since initialization.
    pub last_transition_tick: u32,
}

pub struct EncoderReader<C: InputChannel> {
    config: EncoderConfig,
    channels: [Channel<C>; CHANNEL_COUNT],
    state: ReaderState,
    current: EncoderState,
    tick: u32,
    transitions: u32,
    faults: u32,
    skips: u32,
}

impl<C: InputChannel> EncoderReader<C> {
    /// Create an uninitialized reader. No pin is touched until
    /// [`initialize`](Self::initialize).
    pub fn new(config: EncoderConfig, channel_a: C, channel_b: C, channel_c: C) -> Self {
        Self {
            config,
            channels: [Channel::new(channel_a), Channel::new(channel_b), Channel::new(channel_c)],
            state: ReaderState::Uninitialized,
            current: EncoderState::default(),
            tick: 0,
            transitions: 0,
            faults: 0,
            skips: 0,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ReaderState::Active
    }

    /// Configure the three lines as inputs and seed the stable levels from
    /// one immediate read.
    ///
    /// Resets the sequence number, position and counters. Calling it while
    /// Active re-seeds from the current levels without committing a
    /// transition. On failure every line is released again and the reader
    /// is left Uninitialized.
    pub fn initialize(&mut self) -> Result<(), EncoderError> {
        for (id, channel) in ChannelId::ALL.iter().zip(self.channels.iter()) {
            if channel.io.pin_id() != self.config.channel(*id).pin {
                #[cfg(feature = "defmt")]
                defmt::error!(
                    "encoder channel {} expects pin {}, backend is on pin {}",
                    id,
                    self.config.channel(*id).pin,
                    channel.io.pin_id()
                );
                return Err(EncoderError::PinMismatch(*id));
            }
        }

        let levels = match self.configure_inputs().and_then(|()| self.read_levels()) {
            Ok(levels) => levels,
            Err(e) => {
                // some lines may already be inputs with pulls applied
                self.release_lines();
                self.current = EncoderState::default();
                self.tick = 0;
                self.state = ReaderState::Uninitialized;
                return Err(e);
            }
        };
        for (channel, level) in self.channels.iter_mut().zip(levels) {
            channel.seed(level);
        }

        let raw = self.stable_code();
        self.current = EncoderState::seed(raw, self.config.code_table.decode(raw));
        self.tick = 0;
        self.transitions = 0;
        self.faults = 0;
        self.skips = 0;
        self.state = ReaderState::Active;

        #[cfg(feature = "defmt")]
        defmt::info!("encoder initialized, seed code = {=u8:b}, phase = {}", raw, self.current.phase);
        Ok(())
    }

    /// Read all three lines once, debounce, decode and return the new
    /// snapshot.
    ///
    /// A failed read leaves every channel untouched. A debounced code outside
    /// the valid-code table returns [`EncoderError::InvalidCode`] and is
    /// handled per [`FaultPolicy`]; the last valid snapshot stays current.
    pub fn sample(&mut self) -> Result<EncoderState, EncoderError> {
        if !self.is_active() {
            return Err(EncoderError::NotInitialized);
        }

        let levels = self.read_levels()?;
        self.tick = self.tick.wrapping_add(1);
        let threshold = self.config.debounce_ticks;
        let tick = self.tick;
        for (channel, level) in self.channels.iter_mut().zip(levels) {
            channel.debounce(level, threshold, tick);
        }

        let raw = self.stable_code();
        let mut next = self.current;
        if raw != self.current.raw || self.current.phase.is_none() {
            let Some(phase) = self.config.code_table.decode(raw) else {
                return Err(self.fault(raw));
            };

            if let Some(previous) = self.current.phase {
                let mut step = self.config.code_table.step(previous, phase);
                if self.config.revert_direction {
                    step = step.reversed();
                }
                match step {
                    PhaseStep::Forward => {
                        next.position = next.position.wrapping_add(1);
                        next.direction = MotionDirection::Forward;
                    }
                    PhaseStep::Reverse => {
                        next.position = next.position.wrapping_sub(1);
                        next.direction = MotionDirection::Reverse;
                    }
                    PhaseStep::Skip => {
                        self.skips = self.skips.wrapping_add(1);
                        next.direction = MotionDirection::Unknown;
                        #[cfg(feature = "defmt")]
                        defmt::warn!("encoder skipped phases: {} -> {}", previous, phase);
                    }
                    PhaseStep::Hold => {}
                }
            }

            self.transitions = self.transitions.wrapping_add(1);
            next.raw = raw;
            next.phase = Some(phase);
            #[cfg(feature = "defmt")]
            defmt::debug!("encoder committed code {=u8:b}, position = {}", raw, next.position);
        }

        next.sequence = self.current.sequence.wrapping_add(1);
        self.current = next;
        Ok(next)
    }

    /// Sample and return only the debounced raw code.
    pub fn read_state(&mut self) -> Result<u8, EncoderError> {
        self.sample().map(|state| state.raw)
    }

    /// Last committed snapshot, without reading the hardware.
    pub fn current_state(&self) -> Result<EncoderState, EncoderError> {
        self.ensure_active()?;
        Ok(self.current)
    }

    pub fn channel_status(&self, id: ChannelId) -> Result<ChannelStatus, EncoderError> {
        self.ensure_active()?;
        let channel = &self.channels[id.index()];
        Ok(ChannelStatus {
            pin: channel.io.pin_id(),
            raw_level: channel.raw_level(),
            stable_level: channel.stable_level(),
            pending: channel.is_pending(),
            last_transition_tick: channel.last_transition_tick(),
        })
    }

    /// Zero the tracked position, e.g. at a homing mark.
    pub fn reset_position(&mut self) -> Result<(), EncoderError> {
        self.ensure_active()?;
        self.current.position = 0;
        Ok(())
    }

    /// Committed code changes since initialization.
    pub fn transition_count(&self) -> u32 {
        self.transitions
    }

    /// Samples rejected for an invalid code since initialization.
    pub fn fault_count(&self) -> u32 {
        self.faults
    }

    /// Committed changes that jumped more than one phase.
    pub fn skip_count(&self) -> u32 {
        self.skips
    }

    /// Put the lines into a high-impedance state and return to
    /// Uninitialized.
    ///
    /// Best effort: a platform error on one line is logged and the remaining
    /// lines are still released. Local state is always reset.
    pub fn disable(&mut self) {
        if !self.is_active() {
            return;
        }

        self.release_lines();
        self.current = EncoderState::default();
        self.tick = 0;
        self.state = ReaderState::Uninitialized;
        #[cfg(feature = "defmt")]
        defmt::info!("encoder disabled");
    }

    /// Give the channel backends back, releasing the pins first.
    pub fn release(mut self) -> (C, C, C) {
        self.disable();
        let [a, b, c] = self.channels;
        (a.io, b.io, c.io)
    }

    fn ensure_active(&self) -> Result<(), EncoderError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(EncoderError::NotInitialized)
        }
    }

    fn configure_inputs(&mut self) -> Result<(), EncoderError> {
        for (id, channel) in ChannelId::ALL.iter().zip(self.channels.iter_mut()) {
            channel.io.configure(self.config.channel(*id).pull, PinDirection::Input)?;
        }
        Ok(())
    }

    /// Best effort: a platform error on one line is logged and the
    /// remaining lines are still released.
    fn release_lines(&mut self) {
        for channel in self.channels.iter_mut() {
            if let Err(_err) = channel.io.configure(Pull::None, PinDirection::Disabled) {
                #[cfg(feature = "defmt")]
                defmt::warn!("failed to release encoder pin {}: {}", channel.io.pin_id(), _err);
            }
            channel.reset();
        }
    }

    fn read_levels(&mut self) -> Result<[bool; CHANNEL_COUNT], EncoderError> {
        let mut levels = [false; CHANNEL_COUNT];
        for (id, channel) in ChannelId::ALL.iter().zip(self.channels.iter_mut()) {
            let electrical = channel.io.read_level()?;
            levels[id.index()] = self.config.channel(*id).polarity.apply(electrical);
        }
        Ok(levels)
    }

    fn stable_code(&self) -> u8 {
        ChannelId::ALL
            .iter()
            .zip(self.channels.iter())
            .filter(|(_, channel)| channel.stable_level())
            .fold(0, |code, (id, _)| code | id.bit())
    }

    fn fault(&mut self, raw: u8) -> EncoderError {
        self.faults = self.faults.wrapping_add(1);
        #[cfg(feature = "defmt")]
        defmt::warn!("invalid encoder code {=u8:b}, faults = {}", raw, self.faults);
        if self.config.fault_policy == FaultPolicy::Disable {
            self.disable();
        }
        EncoderError::InvalidCode(raw)
    }
}
