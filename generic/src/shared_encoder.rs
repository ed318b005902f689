//! Interrupt-safe handle to one [`EncoderReader`].
//!
//! The sampling loop and a fault handler (possibly in interrupt context) both
//! reach the reader through a `static SharedEncoder`. Every call runs inside
//! `critical_section::with`, so a `disable()` raised by a fault can never land
//! in the middle of a `sample()`. A `disable()` issued while the reader is
//! already borrowed (from inside [`SharedEncoder::with`]) is deferred to the
//! end of that call.
//!
//! A fault shutdown, either [`SharedEncoder::shutdown`] or an invalid code
//! under `FaultPolicy::Disable`, is latched: [`SharedEncoder::recover`]
//! refuses to bring the reader back until an explicit
//! [`SharedEncoder::initialize`] clears the latch.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;

use crate::channel::InputChannel;
use crate::encoder_error::EncoderError;
use crate::encoder_reader::EncoderReader;
use crate::encoder_state::EncoderState;

pub struct SharedEncoder<C: InputChannel> {
    reader: Mutex<RefCell<Option<EncoderReader<C>>>>,
    disable_requested: AtomicBool,
    fault_latched: AtomicBool,
}

impl<C: InputChannel> Default for SharedEncoder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: InputChannel> SharedEncoder<C> {
    pub const fn new() -> Self {
        Self {
            reader: Mutex::new(RefCell::new(None)),
            disable_requested: AtomicBool::new(false),
            fault_latched: AtomicBool::new(false),
        }
    }

    /// Place a reader in the slot, returning the previous one if any.
    pub fn install(&self, reader: EncoderReader<C>) -> Option<EncoderReader<C>> {
        critical_section::with(|cs| self.reader.borrow(cs).borrow_mut().replace(reader))
    }

    pub fn take(&self) -> Option<EncoderReader<C>> {
        critical_section::with(|cs| self.reader.borrow(cs).borrow_mut().take())
    }

    /// Run `f` against the installed reader inside a critical section.
    pub fn with<R>(&self, f: impl FnOnce(&mut EncoderReader<C>) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut slot = self.reader.borrow(cs).borrow_mut();
            let reader = slot.as_mut()?;
            let result = f(reader);
            if self.disable_requested.load(Ordering::Relaxed) {
                self.disable_requested.store(false, Ordering::Relaxed);
                reader.disable();
            }
            Some(result)
        })
    }

    /// Initialize the installed reader and clear any fault latch.
    pub fn initialize(&self) -> Result<(), EncoderError> {
        self.fault_latched.store(false, Ordering::Relaxed);
        self.with(|reader| reader.initialize()).unwrap_or(Err(EncoderError::NotInitialized))
    }

    /// Automatic restart path: initializes unless a fault shutdown is
    /// latched.
    pub fn recover(&self) -> Result<(), EncoderError> {
        if self.is_fault_latched() {
            return Err(EncoderError::FaultShutdown);
        }
        self.with(|reader| reader.initialize()).unwrap_or(Err(EncoderError::NotInitialized))
    }

    pub fn sample(&self) -> Result<EncoderState, EncoderError> {
        self.with(|reader| {
            let result = reader.sample();
            if matches!(result, Err(EncoderError::InvalidCode(_))) && !reader.is_active() {
                self.fault_latched.store(true, Ordering::Relaxed);
            }
            result
        })
        .unwrap_or(Err(EncoderError::NotInitialized))
    }

    pub fn current_state(&self) -> Result<EncoderState, EncoderError> {
        self.with(|reader| reader.current_state()).unwrap_or(Err(EncoderError::NotInitialized))
    }

    /// Safe from any context; a no-op when no reader is installed or the
    /// reader is already disabled.
    pub fn disable(&self) {
        critical_section::with(|cs| match self.reader.borrow(cs).try_borrow_mut() {
            Ok(mut slot) => {
                if let Some(reader) = slot.as_mut() {
                    reader.disable();
                }
            }
            Err(_) => self.disable_requested.store(true, Ordering::Relaxed),
        });
    }

    /// Disable and latch: [`recover`](Self::recover) will not restart the
    /// reader. Safe from any context.
    pub fn shutdown(&self) {
        self.fault_latched.store(true, Ordering::Relaxed);
        self.disable();
    }

    pub fn is_fault_latched(&self) -> bool {
        self.fault_latched.load(Ordering::Relaxed)
    }

    pub fn is_active(&self) -> bool {
        self.with(|reader| reader.is_active()).unwrap_or(false)
    }

    /// `(transitions, faults, skips)` of the installed reader.
    pub fn counters(&self) -> Option<(u32, u32, u32)> {
        self.with(|reader| (reader.transition_count(), reader.fault_count(), reader.skip_count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder_config::{EncoderConfig, FaultPolicy};
    use crate::sim_channel::{SimChannel, SimLines};

    fn shared(lines: &SimLines) -> SharedEncoder<SimChannel<'_>> {
        let [a, b, c] = lines.channels([29, 28, 27]);
        let shared = SharedEncoder::new();
        shared.install(EncoderReader::new(
            EncoderConfig::new(29, 28, 27).with_debounce_ticks(1),
            a,
            b,
            c,
        ));
        shared
    }

    #[test]
    fn test_empty_slot_behaves_uninitialized() {
        let shared: SharedEncoder<SimChannel<'static>> = SharedEncoder::new();
        assert_eq!(shared.sample(), Err(EncoderError::NotInitialized));
        assert_eq!(shared.initialize(), Err(EncoderError::NotInitialized));
        assert_eq!(shared.current_state(), Err(EncoderError::NotInitialized));
        assert!(!shared.is_active());
        assert_eq!(shared.counters(), None);
        shared.disable();
    }

    #[test]
    fn test_lifecycle_through_handle() {
        let lines = SimLines::new();
        lines.set_code(0b100);
        let shared = shared(&lines);

        shared.initialize().unwrap();
        lines.set_code(0b110);
        assert_eq!(shared.sample().unwrap().position, 1);
        assert_eq!(shared.counters(), Some((1, 0, 0)));

        shared.disable();
        assert!(!shared.is_active());
        assert_eq!(shared.sample(), Err(EncoderError::NotInitialized));
    }

    #[test]
    fn test_disable_from_inside_critical_section() {
        let lines = SimLines::new();
        lines.set_code(0b100);
        let shared = shared(&lines);
        shared.initialize().unwrap();

        // a fault hook firing while the reader is borrowed
        let still_active = shared.with(|reader| {
            shared.disable();
            reader.is_active()
        });
        assert_eq!(still_active, Some(true));
        assert!(!shared.is_active());
        assert_eq!(shared.current_state(), Err(EncoderError::NotInitialized));
    }

    #[test]
    fn test_shutdown_blocks_recover() {
        let lines = SimLines::new();
        lines.set_code(0b100);
        let shared = shared(&lines);
        shared.initialize().unwrap();

        shared.shutdown();
        assert!(!shared.is_active());
        assert!(shared.is_fault_latched());
        assert_eq!(shared.recover(), Err(EncoderError::FaultShutdown));
        assert!(!shared.is_active());

        // an explicit initialize is the only way back
        shared.initialize().unwrap();
        assert!(!shared.is_fault_latched());
        assert!(shared.is_active());
    }

    #[test]
    fn test_fault_policy_disable_latches() {
        let lines = SimLines::new();
        lines.set_code(0b100);
        let [a, b, c] = lines.channels([29, 28, 27]);
        let shared = SharedEncoder::new();
        shared.install(EncoderReader::new(
            EncoderConfig::new(29, 28, 27)
                .with_debounce_ticks(1)
                .with_fault_policy(FaultPolicy::Disable),
            a,
            b,
            c,
        ));
        shared.initialize().unwrap();

        lines.set_code(0b111);
        assert_eq!(shared.sample(), Err(EncoderError::InvalidCode(0b111)));
        assert!(shared.is_fault_latched());
        assert_eq!(shared.recover(), Err(EncoderError::FaultShutdown));
        assert_eq!(shared.sample(), Err(EncoderError::NotInitialized));
    }

    #[test]
    fn test_plain_disable_allows_recover() {
        let lines = SimLines::new();
        lines.set_code(0b100);
        let shared = shared(&lines);
        shared.initialize().unwrap();

        // hold-last-good faults do not latch
        lines.set_code(0b000);
        assert_eq!(shared.sample(), Err(EncoderError::InvalidCode(0b000)));
        assert!(!shared.is_fault_latched());

        lines.set_code(0b100);
        shared.disable();
        assert_eq!(shared.recover(), Ok(()));
        assert!(shared.is_active());
    }

    #[test]
    fn test_take_returns_reader() {
        let lines = SimLines::new();
        let shared = shared(&lines);
        assert!(shared.take().is_some());
        assert!(shared.take().is_none());
    }
}
