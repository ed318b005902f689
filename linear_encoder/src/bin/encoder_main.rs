#![no_std]
#![no_main]

extern crate alloc;

use alloc::boxed::Box;

use cortex_m::asm::delay;
use defmt::{error, info};
use rp2040_hal::clocks::init_clocks_and_plls;
use rp2040_hal::gpio::{DynPullType, Pins};
use rp2040_hal::{pac, sio::Sio, watchdog::Watchdog, Timer};
use rp_pico::{entry, XOSC_CRYSTAL_FREQ};

use generic::encoder_reader::EncoderReader;
use linear_encoder::bsp::config::encoder_config;
use linear_encoder::common::async_initialization;
use linear_encoder::common::executor::{spawn_task, start_global_executor};
use linear_encoder::common::global_timer::init_global_timer;
use linear_encoder::common::rp2040_timer::Rp2040Timer;
use linear_encoder::encoder::encoder_processor::{sample_encoder, supervise_encoder, ENCODER};
use linear_encoder::encoder::rp2040_channel::Rp2040Channel;
use linear_encoder::{encoder_ch_a, encoder_ch_b, encoder_ch_c};

#[entry]
fn main() -> ! {
    async_initialization();

    let mut pac = pac::Peripherals::take().unwrap();
    let sio = Sio::new(pac.SIO);
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let clocks = init_clocks_and_plls(
        XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    init_global_timer(Box::new(Rp2040Timer::new(timer)));

    // rp_pico::Pins hides gpio29 behind voltage_monitor, use the raw bank
    let pins = Pins::new(pac.IO_BANK0, pac.PADS_BANK0, sio.gpio_bank0, &mut pac.RESETS);
    let channel_a = Rp2040Channel::new(
        encoder_ch_a!(pins).into_floating_input().into_pull_type::<DynPullType>().into_dyn_pin(),
    );
    let channel_b = Rp2040Channel::new(
        encoder_ch_b!(pins).into_floating_input().into_pull_type::<DynPullType>().into_dyn_pin(),
    );
    let channel_c = Rp2040Channel::new(
        encoder_ch_c!(pins).into_floating_input().into_pull_type::<DynPullType>().into_dyn_pin(),
    );

    ENCODER.install(EncoderReader::new(encoder_config(), channel_a, channel_b, channel_c));
    match ENCODER.initialize() {
        Ok(()) => info!("encoder ready, state = {}", ENCODER.current_state()),
        Err(e) => error!("encoder initialize failed: {}", e),
    }

    spawn_task(sample_encoder());
    spawn_task(supervise_encoder());
    start_global_executor();

    loop {
        info!("executor finished, idling");
        delay(120_000_000);
    }
}
