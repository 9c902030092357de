//! Software two-wire master
//!
//! Clocks an I2C-compatible bus entirely from GPIO toggles, with a
//! fixed half-bit delay derived from the configured frequency. There is
//! no clock stretching support: the ack bit is sampled once per byte.
//!
//! Bus sequence for one byte:
//! ```text
//! SDA  ‾‾\_ b7 _ b6 _ ... _ b0 _ [released, device acks low] _/‾‾
//! SCL  ‾‾‾‾\_/‾\_/‾\_ ... _/‾\___/‾\________________________/‾‾‾
//!      START                       ACK                       STOP
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use pagewise_hal::{BusError, I2cBus, I2cConfig, OpenDrainPin};

/// R/W bit appended to the address for reads
const READ_BIT: u8 = 0x01;

/// Bus condition as seen by the master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusState {
    /// Both lines released, no transfer in progress
    Idle,
    /// Start condition issued, no stop yet
    Active,
}

/// Bit-banged I2C master
///
/// Every operation blocks until the transfer is complete. A failed ack
/// always issues a stop before returning, so the bus is idle whenever an
/// error reaches the caller.
pub struct SoftI2c<SDA, SCL, D> {
    sda: SDA,
    scl: SCL,
    delay: D,
    /// Half of one clock period in nanoseconds
    half_period_ns: u32,
    state: BusState,
}

impl<SDA, SCL, D> SoftI2c<SDA, SCL, D>
where
    SDA: OpenDrainPin,
    SCL: OpenDrainPin,
    D: DelayNs,
{
    /// Configure a new bus master
    ///
    /// Both lines are left idle high. A zero frequency is rejected here so
    /// it can never surface mid-transfer.
    pub fn new(sda: SDA, scl: SCL, delay: D, config: I2cConfig) -> Result<Self, BusError> {
        let half_period_ns = config
            .half_period_ns()
            .ok_or(BusError::InvalidFrequency)?;

        let mut bus = Self {
            sda,
            scl,
            delay,
            half_period_ns,
            state: BusState::Idle,
        };
        bus.sda.drive_high();
        bus.scl.drive_high();

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "soft i2c: {=u32} Hz, half period {=u32} ns",
            config.frequency,
            half_period_ns
        );

        Ok(bus)
    }

    /// Current bus condition
    pub fn state(&self) -> BusState {
        self.state
    }

    /// Per-half-bit delay in nanoseconds
    pub fn half_period_ns(&self) -> u32 {
        self.half_period_ns
    }

    /// Give back the pins and the delay provider
    pub fn release(self) -> (SDA, SCL, D) {
        (self.sda, self.scl, self.delay)
    }

    fn tick(&mut self) {
        if self.half_period_ns > 0 {
            self.delay.delay_ns(self.half_period_ns);
        }
    }

    /// Issue a start (or repeated start) condition
    ///
    /// Data falls while the clock is high, then the clock drops.
    pub fn start(&mut self) {
        self.sda.drive_high();
        self.scl.drive_high();
        self.tick();
        self.sda.drive_low();
        self.tick();
        self.scl.drive_low();
        self.state = BusState::Active;
    }

    /// Issue a stop condition
    ///
    /// Data is released while the clock is high.
    pub fn stop(&mut self) {
        self.sda.drive_low();
        self.scl.drive_high();
        self.tick();
        self.sda.release();
        self.tick();
        self.state = BusState::Idle;
    }

    /// Shift one byte out MSB-first and sample the ack bit
    ///
    /// Returns `true` if the receiver pulled the data line low.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        let mut bits = byte;
        for _ in 0..8 {
            self.sda.drive(bits & 0x80 != 0);
            bits <<= 1;
            self.tick();
            self.scl.drive_high();
            self.tick();
            self.scl.drive_low();
        }

        self.sda.release();
        self.tick();
        self.scl.drive_high();
        let ack = self.sda.is_low();
        self.scl.drive_low();
        ack
    }

    /// Shift one byte in MSB-first, then send `ack` (low) or nack (high)
    pub fn read_byte(&mut self, ack: bool) -> u8 {
        let mut byte = 0u8;
        self.sda.release();
        for _ in 0..8 {
            self.scl.drive_high();
            self.tick();
            byte <<= 1;
            if self.sda.is_high() {
                byte |= 1;
            }
            self.scl.drive_low();
            self.tick();
        }

        self.sda.drive(!ack);
        self.scl.drive_high();
        self.tick();
        self.scl.drive_low();
        self.sda.drive_high();
        byte
    }

    /// Send the address byte, stopping the bus if nobody answers
    fn address(&mut self, address: u8, read: bool) -> Result<(), BusError> {
        let mut byte = (address & 0x7F) << 1;
        if read {
            byte |= READ_BIT;
        }

        if self.write_byte(byte) {
            return Ok(());
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("i2c addr {=u8:#x} NACK (read={=bool})", address, read);

        self.stop();
        Err(BusError::AddressNack)
    }

    /// Send data bytes, stopping the bus at the first missing ack
    fn send(&mut self, data: &[u8]) -> Result<(), BusError> {
        for &byte in data {
            if !self.write_byte(byte) {
                #[cfg(feature = "defmt")]
                defmt::debug!("i2c write NACK on {=u8:#x}", byte);

                self.stop();
                return Err(BusError::WriteNack);
            }
        }
        Ok(())
    }

    /// Run one complete transaction
    ///
    /// If `write` is non-empty: start, address with the write bit, every
    /// byte of `write`. If `read` is non-empty: a fresh start, address with
    /// the read bit, then every byte of `read` acked except the last. A
    /// single stop closes the transaction. No retries are attempted.
    pub fn transaction(
        &mut self,
        address: u8,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), BusError> {
        if !write.is_empty() {
            self.start();
            self.address(address, false)?;
            self.send(write)?;
            if read.is_empty() {
                self.stop();
            }
        }

        if !read.is_empty() {
            self.start();
            self.address(address, true)?;
            let last = read.len() - 1;
            for (i, slot) in read.iter_mut().enumerate() {
                *slot = self.read_byte(i < last);
            }
            self.stop();
        }

        Ok(())
    }
}

impl<SDA, SCL, D> I2cBus for SoftI2c<SDA, SCL, D>
where
    SDA: OpenDrainPin,
    SCL: OpenDrainPin,
    D: DelayNs,
{
    type Error = BusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.transaction(address, data, &mut [])
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.transaction(address, &[], buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.transaction(address, write_data, read_buf)
    }
}

impl<SDA, SCL, D> ErrorType for SoftI2c<SDA, SCL, D> {
    type Error = BusError;
}

/// `embedded-hal` view of the bus, so register-level sensor drivers can
/// share the same two wires as the display.
impl<SDA, SCL, D> I2c<SevenBitAddress> for SoftI2c<SDA, SCL, D>
where
    SDA: OpenDrainPin,
    SCL: OpenDrainPin,
    D: DelayNs,
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        // Direction of the current run: Some(true) while reading
        let mut reading: Option<bool> = None;

        for i in 0..operations.len() {
            // Empty operations put nothing on the wire
            let next_is_read = matches!(
                operations[i + 1..].iter().find(|op| !is_empty(op)),
                Some(Operation::Read(_))
            );
            let Some(op) = operations.get_mut(i) else {
                break;
            };
            if is_empty(op) {
                continue;
            }

            match op {
                Operation::Write(bytes) => {
                    if reading != Some(false) {
                        self.start();
                        self.address(address, false)?;
                        reading = Some(false);
                    }
                    self.send(bytes)?;
                }
                Operation::Read(buf) => {
                    if reading != Some(true) {
                        self.start();
                        self.address(address, true)?;
                        reading = Some(true);
                    }
                    // NACK only the final byte before a stop or a direction change
                    let len = buf.len();
                    for (j, slot) in buf.iter_mut().enumerate() {
                        let last_of_run = j + 1 == len && !next_is_read;
                        *slot = self.read_byte(!last_of_run);
                    }
                }
            }
        }

        if reading.is_some() {
            self.stop();
        }
        Ok(())
    }
}

fn is_empty(op: &Operation<'_>) -> bool {
    match op {
        Operation::Write(bytes) => bytes.is_empty(),
        Operation::Read(buf) => buf.is_empty(),
    }
}
