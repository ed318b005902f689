use core::mem::MaybeUninit;
use core::ptr::addr_of_mut;

use alloc_cortex_m::CortexMHeap;

// Boot-time allocations only: the timer box and the spawned task futures.
const HEAP_SIZE: usize = 8 * 1024;

#[global_allocator]
pub static ALLOCATOR: CortexMHeap = CortexMHeap::empty();

static mut HEAP: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];

pub fn init_allocator() {
    unsafe { ALLOCATOR.init(addr_of_mut!(HEAP) as usize, HEAP_SIZE) }
}
