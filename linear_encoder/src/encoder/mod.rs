pub mod encoder_processor;
pub mod rp2040_channel;
