//! On-die temperature readout
//!
//! Converts RP2040 temperature sensor samples to tenths of a degree and
//! formats them for the panel.

use core::fmt::Write;

/// Text shown while no reading is available
pub const NO_READING: &str = "--";

/// Formatted reading
pub type ReadingText = heapless::String<12>;

const ADC_MAX: i32 = 4096;
const VREF_MV: i32 = 3300;

/// Raw 12-bit sample to tenths of a degree Celsius
///
/// T = 27 - (V - 0.706) / 0.001721
pub fn raw_to_temp_x10(raw: u16) -> i32 {
    let mv = i32::from(raw) * VREF_MV / ADC_MAX;
    270 - (mv - 706) * 10_000 / 1721
}

/// Format a reading as "21.5C"; `None` shows [`NO_READING`]
pub fn format_reading(out: &mut ReadingText, temp_x10: Option<i32>) {
    out.clear();
    let Some(t) = temp_x10 else {
        let _ = out.push_str(NO_READING);
        return;
    };
    let sign = if t < 0 { "-" } else { "" };
    let abs = t.unsigned_abs();
    // At most 8 characters for any 12-bit sample
    let _ = write!(out, "{}{}.{}C", sign, abs / 10, abs % 10);
}
