extern crate alloc;

use alloc::boxed::Box;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use critical_section::Mutex;
use fugit::{TimerDurationU64, TimerInstantU64};

pub type TimerInstant = TimerInstantU64<1_000_000>;
pub type TimerDuration = TimerDurationU64<1_000_000>;

pub trait MonotonicTimer: Sync + Send {
    fn now(&self) -> TimerInstant;
}

static GLOBAL_TIMER: Mutex<RefCell<Option<Box<dyn MonotonicTimer>>>> = Mutex::new(RefCell::new(None));

pub fn init_global_timer(timer: Box<dyn MonotonicTimer>) {
    critical_section::with(|cs| {
        GLOBAL_TIMER.borrow(cs).replace(Some(timer));
    });
}

/// Microseconds since boot, or 0 before [`init_global_timer`].
pub fn now() -> TimerInstant {
    critical_section::with(|cs| match GLOBAL_TIMER.borrow(cs).borrow().as_ref() {
        Some(timer) => timer.now(),
        None => TimerInstant::from_ticks(0),
    })
}

/// Busy-polled delay. Awaiting it yields to the executor until `duration`
/// has passed.
pub struct Delay {
    start: TimerInstant,
    duration: TimerDuration,
}

impl Delay {
    pub fn new(duration: TimerDuration) -> Self {
        Self { start: now(), duration }
    }

    fn expired(&self) -> bool {
        match now().checked_duration_since(self.start) {
            Some(elapsed) => elapsed >= self.duration,
            None => false,
        }
    }

    pub fn wait(&self) {
        while !self.expired() {}
    }
}

impl Future for Delay {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.expired() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}
