//! Pagewise - OLED Readout Firmware
//!
//! Main firmware binary for RP2040 boards driving a paged monochrome
//! OLED over a bit-banged two-wire bus. Shows the on-die temperature,
//! moves it around now and then against burn-in, and only refreshes the
//! pages that changed.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output, OutputOpenDrain};
use embassy_time::{Delay, Instant, Timer};
use embedded_graphics::mono_font::ascii::FONT_9X18;
use {defmt_rtt as _, panic_probe as _};

use pagewise_core::placement::fold_seed;
use pagewise_core::{EngineConfig, IdlePowerScheduler, Jiggle, LinkEvent, LinkMonitor, XorShift32};
use pagewise_display::{
    clamp_offset_x, random_offset, reset_panel, DisplayEngine, GlyphSource, MonoGlyphs, TextSlot,
};
use pagewise_drivers::SoftI2c;
use pagewise_hal::OpenDrain;

use crate::board::{PanelBus, ScbSleep, FB_SIZE, PANEL_SETTLE_MS, SEED_SAMPLES};
use crate::readout::{format_reading, raw_to_temp_x10, ReadingText};

mod board;
mod readout;

/// Configuration validated and serialized by build.rs from panel.toml
static EMBEDDED_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/engine_config.bin"));

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Pagewise firmware starting...");

    let p = embassy_rp::init(Default::default());

    let config = match EngineConfig::from_bytes(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!("Embedded config rejected ({}), using defaults", e);
            EngineConfig::DEFAULT
        }
    };
    info!(
        "Panel {}x{} at {:#04x}",
        config.panel.width, config.panel.height, config.panel.address
    );

    // Pin assignment is board-specific: SDA GPIO18, SCL GPIO19, RST GPIO20
    let sda = OpenDrain::new(OutputOpenDrain::new(p.PIN_18, Level::High));
    let scl = OpenDrain::new(OutputOpenDrain::new(p.PIN_19, Level::High));
    let mut reset_pin = Output::new(p.PIN_20, Level::High);

    let bus: PanelBus = match SoftI2c::new(sda, scl, Delay, config.bus) {
        Ok(bus) => bus,
        Err(e) => halt("bus setup", e).await,
    };

    let mut engine = match DisplayEngine::<_, FB_SIZE>::new(bus, config.panel) {
        Ok(engine) => engine,
        Err(e) => halt("engine setup", e).await,
    };
    let (width, height) = {
        let geometry = engine.geometry();
        (i32::from(geometry.width), i32::from(geometry.height))
    };

    let mut adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let mut sensor = Channel::new_temp_sensor(p.ADC_TEMP_SENSOR);

    // Sensor noise in the low bit seeds text placement
    let mut noise: heapless::Vec<bool, SEED_SAMPLES> = heapless::Vec::new();
    for _ in 0..SEED_SAMPLES {
        if let Ok(raw) = adc.read(&mut sensor).await {
            let _ = noise.push(raw & 1 != 0);
        }
    }
    let mut rng = XorShift32::new(fold_seed(Instant::now().as_ticks() as u32, noise));

    let glyphs = MonoGlyphs::new(&FONT_9X18);
    let mut idle = IdlePowerScheduler::new(ScbSleep::take(), Delay, config.idle);
    let mut link = LinkMonitor::default();
    let mut jiggle = Jiggle::new(config.jiggle, Instant::now().as_millis());
    let mut slot: TextSlot<16> = TextSlot::new();
    let mut text = ReadingText::new();
    let mut pos = random_offset(
        &mut |n| rng.below(n),
        glyphs.text_width("00.0C"),
        glyphs.char_height(),
        width,
        height,
    );

    info!("Entering refresh loop");

    loop {
        if link.needs_reinit() {
            if reset_panel(&mut reset_pin, idle.delay()).is_err() {
                warn!("Panel reset pin failed");
            }
            Timer::after_millis(PANEL_SETTLE_MS).await;

            let result = engine.init();
            if let Err(e) = &result {
                warn!("Panel init failed: {}", e);
            }
            link.record_init(&result);
            if link.needs_reinit() {
                idle.sleep_poll_interval_async().await;
                continue;
            }
            // init cleared the panel
            slot = TextSlot::new();
        }

        let reading = match adc.read(&mut sensor).await {
            Ok(raw) => Some(raw_to_temp_x10(raw)),
            Err(_) => {
                warn!("Temperature read failed");
                None
            }
        };
        format_reading(&mut text, reading);

        let text_width = glyphs.text_width(&text);
        if jiggle.poll(Instant::now().as_millis()) {
            pos = random_offset(
                &mut |n| rng.below(n),
                text_width,
                glyphs.char_height(),
                width,
                height,
            );
            debug!("Text moved to ({}, {})", pos.x, pos.y);
        }
        pos = clamp_offset_x(pos, text_width, width);
        slot.update(&mut engine, &glyphs, &text, pos);

        let report = engine.flush();
        if report.pages_failed > 0 {
            link.handle(LinkEvent::TransferFailed);
        } else if !report.is_empty() {
            link.handle(LinkEvent::TransferOk);
        }

        idle.sleep_poll_interval_async().await;
    }
}

/// Park forever after an unrecoverable setup error
async fn halt<E: Format>(stage: &str, error: E) -> ! {
    error!("{} failed: {}", stage, error);
    loop {
        Timer::after_secs(60).await;
    }
}
