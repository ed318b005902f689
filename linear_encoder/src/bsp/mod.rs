#[cfg(feature = "bsp_rev_a")]
pub mod board_rev_a;
#[cfg(feature = "bsp_rev_a")]
pub use board_rev_a::*;

pub mod config;
