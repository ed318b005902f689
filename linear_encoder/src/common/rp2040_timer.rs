use rp2040_hal::Timer;

use crate::common::global_timer::{MonotonicTimer, TimerInstant};

/// The RP2040 64-bit microsecond counter.
pub struct Rp2040Timer(Timer);

impl Rp2040Timer {
    pub fn new(timer: Timer) -> Self {
        Rp2040Timer(timer)
    }
}

impl MonotonicTimer for Rp2040Timer {
    fn now(&self) -> TimerInstant {
        self.0.get_counter()
    }
}
