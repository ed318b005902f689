use defmt::{error, info, warn};
use fugit::ExtU64;

use generic::encoder_error::EncoderError;
use generic::shared_encoder::SharedEncoder;

use crate::bsp::config::{
    ENCODER_FAULT_LIMIT, ENCODER_REINIT_DELAY_MS, ENCODER_REPORT_PERIOD_MS, ENCODER_SAMPLE_PERIOD_US,
    REINIT_ENCODER_AFTER_DISABLE,
};
use crate::common::global_timer::Delay;
use crate::encoder::rp2040_channel::Rp2040Channel;

pub static ENCODER: SharedEncoder<Rp2040Channel> = SharedEncoder::new();

/// Periodic sampling loop. Invalid codes are logged by the reader itself.
/// A reader that went down is brought back after a short delay, unless it
/// was shut down for faults.
pub async fn sample_encoder() {
    let mut shutdown_reported = false;
    loop {
        match ENCODER.sample() {
            Ok(_) | Err(EncoderError::InvalidCode(_)) => {}
            Err(EncoderError::NotInitialized) => {
                Delay::new(ENCODER_REINIT_DELAY_MS.millis()).await;
                if REINIT_ENCODER_AFTER_DISABLE {
                    match ENCODER.recover() {
                        Ok(()) => {
                            shutdown_reported = false;
                            info!("sample_encoder(): encoder re-initialized");
                        }
                        Err(EncoderError::FaultShutdown) => {
                            if !shutdown_reported {
                                shutdown_reported = true;
                                warn!("sample_encoder(): encoder shut down for faults, not restarting");
                            }
                        }
                        Err(e) => error!("sample_encoder(): re-initialize failed: {}", e),
                    }
                }
                continue;
            }
            Err(e) => warn!("sample_encoder(): sample failed: {}", e),
        }
        Delay::new(ENCODER_SAMPLE_PERIOD_US.micros()).await;
    }
}

/// Reports the decoded state and shuts the reader down when invalid codes
/// pile up faster than `ENCODER_FAULT_LIMIT` per period.
pub async fn supervise_encoder() {
    let mut last_faults = 0u32;
    loop {
        Delay::new(ENCODER_REPORT_PERIOD_MS.millis()).await;

        let Some((transitions, faults, skips)) = ENCODER.counters() else {
            warn!("supervise_encoder(): no encoder installed");
            continue;
        };
        match ENCODER.current_state() {
            Ok(state) => info!(
                "encoder: {}, transitions = {}, faults = {}, skips = {}",
                state, transitions, faults, skips
            ),
            Err(e) => info!("encoder: {}", e),
        }

        // counters restart from zero on every initialize()
        let new_faults = if faults >= last_faults { faults - last_faults } else { faults };
        last_faults = faults;
        if new_faults > ENCODER_FAULT_LIMIT {
            error!("supervise_encoder(): {} invalid codes in one period, disabling", new_faults);
            shutdown_encoder();
        }
    }
}

/// Release the encoder lines and keep them released: the sampling task
/// will not restart the reader. Callable from any context, including
/// exception handlers.
pub fn shutdown_encoder() {
    ENCODER.shutdown();
}
