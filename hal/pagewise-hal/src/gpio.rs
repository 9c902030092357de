//! GPIO pin abstractions
//!
//! The software two-wire bus only needs four things from a pin: pull it
//! low, let it go high, stop driving it so the other side can talk, and
//! read the level on the wire.

/// Open-drain digital line
///
/// Implementations are expected to behave like a line with an external
/// pull-up: `drive_high` and `release` both leave the wire high unless a
/// device on the bus is holding it low.
pub trait OpenDrainPin {
    /// Drive the line to logic 1
    fn drive_high(&mut self);

    /// Drive the line to logic 0
    fn drive_low(&mut self);

    /// Stop driving the line (switch to input)
    fn release(&mut self);

    /// Read the level currently on the wire
    fn is_high(&mut self) -> bool;

    /// Read the level currently on the wire
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }

    /// Drive the line to a specific level
    fn drive(&mut self, high: bool) {
        if high {
            self.drive_high();
        } else {
            self.drive_low();
        }
    }
}

/// Adapter for `embedded-hal` pins that are already open-drain
///
/// Chip HALs usually expose an open-drain output that can also be read
/// (`OutputOpenDrain` and friends). Setting such a pin high releases the
/// wire, so `drive_high` and `release` map to the same call.
///
/// Pin errors are ignored on writes. A failed read reports the line as
/// high, which the bus interprets as a NACK.
pub struct OpenDrain<P> {
    pin: P,
}

impl<P> OpenDrain<P>
where
    P: embedded_hal::digital::OutputPin + embedded_hal::digital::InputPin,
{
    /// Wrap an open-drain pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give the wrapped pin back
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OpenDrainPin for OpenDrain<P>
where
    P: embedded_hal::digital::OutputPin + embedded_hal::digital::InputPin,
{
    fn drive_high(&mut self) {
        let _ = self.pin.set_high();
    }

    fn drive_low(&mut self) {
        let _ = self.pin.set_low();
    }

    fn release(&mut self) {
        let _ = self.pin.set_high();
    }

    fn is_high(&mut self) -> bool {
        self.pin.is_high().unwrap_or(true)
    }
}
