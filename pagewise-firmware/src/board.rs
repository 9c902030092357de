//! RP2040 board glue
//!
//! Pin assignment and the chip side of the idle power seam.

use cortex_m::peripheral::SCB;
use embassy_rp::gpio::OutputOpenDrain;
use embassy_time::Delay;

use pagewise_drivers::SoftI2c;
use pagewise_hal::{ClockController, LowPowerMode, OpenDrain};

/// Bit-banged bus on two open-drain GPIOs
pub type PanelBus = SoftI2c<BusPin, BusPin, Delay>;

type BusPin = OpenDrain<OutputOpenDrain<'static>>;

/// Framebuffer sized for the largest supported panel (128x64)
pub const FB_SIZE: usize = pagewise_display::buffer_size(128, 64);

/// Settle time after the reset pulse before the first command
pub const PANEL_SETTLE_MS: u64 = 100;

/// ADC samples folded into the placement seed
pub const SEED_SAMPLES: usize = 64;

/// Deep sleep through SCB.SLEEPDEEP
///
/// The executor idles in WFE; with SLEEPDEEP set the RP2040 gates the
/// clocks that SLEEP_EN leaves disabled. `Stop` keeps normal sleep.
pub struct ScbSleep {
    scb: Option<SCB>,
}

impl ScbSleep {
    /// Take the core peripherals; without them every mode is a plain wait
    pub fn take() -> Self {
        Self {
            scb: cortex_m::Peripherals::take().map(|p| p.SCB),
        }
    }
}

impl ClockController for ScbSleep {
    /// Previous SLEEPDEEP state, if it was changed
    type Token = Option<bool>;

    fn enter_low_power(&mut self, mode: LowPowerMode) -> Self::Token {
        let scb = self.scb.as_mut()?;
        if mode != LowPowerMode::Vlps {
            return None;
        }
        let was_deep = scb.scr.read() & SCB_SCR_SLEEPDEEP != 0;
        scb.set_sleepdeep();
        Some(was_deep)
    }

    fn restore(&mut self, token: Self::Token) {
        if let (Some(scb), Some(false)) = (self.scb.as_mut(), token) {
            scb.clear_sleepdeep();
        }
    }
}

const SCB_SCR_SLEEPDEEP: u32 = 1 << 2;
