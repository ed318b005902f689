//! Portable core of the linear encoder reader.
//!
//! Everything here is `no_std` and free of any board or HAL dependency. The
//! firmware crate supplies a GPIO backend through [`channel::InputChannel`];
//! host tests use [`sim_channel`] instead.
//!
//! # Features
//!
//! - **`defmt`**: derive [`defmt::Format`] on public types and emit log
//!   events from the reader.

#![no_std]

pub mod channel;
pub mod code_table;
pub mod encoder_config;
pub mod encoder_error;
pub mod encoder_reader;
pub mod encoder_state;
pub mod shared_encoder;
pub mod sim_channel;
