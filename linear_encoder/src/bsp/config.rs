use generic::channel::{ChannelId, Polarity, Pull};
use generic::encoder_config::{EncoderConfig, FaultPolicy};

use crate::bsp::ENCODER_PINS;

macro_rules! config {
    (
        $(
            $key:ident : $value:expr
        ),+ $(,)?
    ) => {
        $(
            pub const $key: bool = $value;
        )+
    };
}

macro_rules! parameters {
    (
        $(
            $key:ident : $type:ty = $value:expr
        ),+ $(,)?
    ) => {
        $(
            pub const $key: $type = $value;
        )+
    };
}

config! {
    // count the scale backwards when it is mounted the other way round
    REVERT_ENCODER_DIRECTION: false,
    // open-collector sensor outputs pull the line low when lit
    ENCODER_CH_A_ACTIVE_LOW: false,
    ENCODER_CH_B_ACTIVE_LOW: false,
    ENCODER_CH_C_ACTIVE_LOW: false,
    // shut the reader down on the first invalid code instead of holding the last good state
    DISABLE_ENCODER_ON_INVALID_CODE: false,
    // bring a disabled reader back up from the sampling task; fault shutdowns stay down
    REINIT_ENCODER_AFTER_DISABLE: true,
}

parameters! {
    ENCODER_PULL: Pull = Pull::Up,
    // consecutive samples a level must hold before it is committed
    ENCODER_DEBOUNCE_TICKS: u16 = 3,
    ENCODER_SAMPLE_PERIOD_US: u64 = 200,
    ENCODER_REPORT_PERIOD_MS: u64 = 500,
    // wait before re-initializing a reader that went down
    ENCODER_REINIT_DELAY_MS: u64 = 100,
    // invalid codes tolerated per report period before the supervisor disables the reader
    ENCODER_FAULT_LIMIT: u32 = 16,
}

fn polarity(active_low: bool) -> Polarity {
    if active_low {
        Polarity::ActiveLow
    } else {
        Polarity::ActiveHigh
    }
}

pub fn encoder_config() -> EncoderConfig {
    let (pin_a, pin_b, pin_c) = ENCODER_PINS;
    let fault_policy = if DISABLE_ENCODER_ON_INVALID_CODE {
        FaultPolicy::Disable
    } else {
        FaultPolicy::HoldLastGood
    };

    EncoderConfig::new(pin_a, pin_b, pin_c)
        .with_debounce_ticks(ENCODER_DEBOUNCE_TICKS)
        .with_fault_policy(fault_policy)
        .with_revert_direction(REVERT_ENCODER_DIRECTION)
        .with_pull(ENCODER_PULL)
        .with_polarity(ChannelId::A, polarity(ENCODER_CH_A_ACTIVE_LOW))
        .with_polarity(ChannelId::B, polarity(ENCODER_CH_B_ACTIVE_LOW))
        .with_polarity(ChannelId::C, polarity(ENCODER_CH_C_ACTIVE_LOW))
}
