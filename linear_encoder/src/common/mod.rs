use crate::common::global_allocator::init_allocator;

pub mod executor;
pub mod global_allocator;
pub mod global_timer;
pub mod rp2040_timer;

/// Boot steps that need no peripherals. Run first thing in `main`.
pub fn async_initialization() {
    init_allocator();
}
