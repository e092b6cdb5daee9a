//! SFD Vosloh - split-flap display firmware
//!
//! Main firmware binary for RP2040 boards driving Vosloh split-flap
//! modules over a UART bus. The buses and displays are declared in
//! `display.toml`; build.rs validates that file and generates the
//! wiring in `components`.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::BufferedInterruptHandler;
use embassy_time::{Duration, Ticker};
use log::{error, info, warn};
use sfd_core::app::App;
#[cfg(feature = "defmt")]
use {defmt_rtt as _, panic_probe as _};

#[cfg(feature = "defmt")]
mod logger;
mod uart;

#[allow(clippy::all)]
mod components {
    include!(concat!(env!("OUT_DIR"), "/components.rs"));
}

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

/// Main loop period
const LOOP_INTERVAL: Duration = Duration::from_millis(16);

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    #[cfg(feature = "defmt")]
    logger::init(log::LevelFilter::Debug);

    info!("SFD Vosloh firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut app: App<'static, { components::COMPONENT_COUNT }> = App::new();
    if let Err(e) = components::build_components(&mut app, p) {
        error!("Component wiring failed: {:?}", e);
    }
    info!("{} component(s) registered", app.len());

    let failed = app.setup();
    if failed > 0 {
        warn!("{} component(s) failed setup", failed);
    }
    app.dump_config();

    let mut ticker = Ticker::every(LOOP_INTERVAL);
    loop {
        app.loop_once();
        ticker.next().await;
    }
}
