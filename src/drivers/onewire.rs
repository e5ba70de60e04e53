//! Bit-banged one-wire bus and DS18B20 temperature probe commands.
//!
//! Generic over `embedded-hal` 1.0 pin and delay traits so the same code
//! runs on the ESP32 (open-drain `PinDriver` + `Ets` delay) and against
//! scripted pins in host tests.  The pin must be open drain with an
//! external pull-up: driving it high releases the bus.
//!
//! Slot timings follow the Maxim "standard speed" figures.  The
//! timing-critical part of every slot runs with interrupts masked: the flow
//! ISR or a task switch landing inside a 6 µs low pulse would stretch it
//! past the 15 µs sample point and flip the bit.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;
use crate::sensors::temperature::SensorAddress;

// ROM commands
const CMD_MATCH_ROM: u8 = 0x55;
const CMD_SKIP_ROM: u8 = 0xCC;

// DS18B20 function commands
const CMD_CONVERT_T: u8 = 0x44;
const CMD_READ_SCRATCHPAD: u8 = 0xBE;

/// Dallas/Maxim CRC-8 (polynomial x^8 + x^5 + x^4 + 1, LSB first).
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}

/// Validate a 9-byte DS18B20 scratchpad and convert its temperature
/// register (signed, 1/16 °C per LSB at 12-bit resolution).
pub fn decode_scratchpad(scratchpad: &[u8; 9]) -> Result<f32, SensorError> {
    if crc8(&scratchpad[..8]) != scratchpad[8] {
        return Err(SensorError::CrcMismatch);
    }
    let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);
    Ok(f32::from(raw) / 16.0)
}

/// Run `f` with interrupts masked on this core.
#[cfg(target_os = "espidf")]
fn critical<R>(f: impl FnOnce() -> R) -> R {
    esp_idf_hal::interrupt::free(f)
}

#[cfg(not(target_os = "espidf"))]
fn critical<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(test)]
    tests::CRITICAL_SECTIONS.with(|n| n.set(n.get() + 1));
    f()
}

pub struct OneWire<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> OneWire<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Reset pulse; succeeds when at least one device answers with a
    /// presence pulse.
    pub fn reset(&mut self) -> Result<(), SensorError> {
        self.drive_low()?;
        self.delay.delay_us(480);
        let present = critical(|| {
            self.release()?;
            self.delay.delay_us(70);
            self.pin.is_low().map_err(|_| SensorError::BusIo)
        })?;
        self.delay.delay_us(410);
        if present {
            Ok(())
        } else {
            Err(SensorError::NoPresence)
        }
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), SensorError> {
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        Ok(())
    }

    pub fn read_byte(&mut self) -> Result<u8, SensorError> {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit()? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }

    /// Address every device on the bus.
    pub fn skip_rom(&mut self) -> Result<(), SensorError> {
        self.reset()?;
        self.write_byte(CMD_SKIP_ROM)
    }

    /// Address a single device by ROM code.
    pub fn match_rom(&mut self, address: &SensorAddress) -> Result<(), SensorError> {
        self.reset()?;
        self.write_byte(CMD_MATCH_ROM)?;
        for &b in address {
            self.write_byte(b)?;
        }
        Ok(())
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), SensorError> {
        let (low_us, recovery_us) = if bit { (6, 64) } else { (60, 10) };
        critical(|| {
            self.drive_low()?;
            self.delay.delay_us(low_us);
            self.release()
        })?;
        self.delay.delay_us(recovery_us);
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, SensorError> {
        let high = critical(|| {
            self.drive_low()?;
            self.delay.delay_us(6);
            self.release()?;
            self.delay.delay_us(9);
            self.pin.is_high().map_err(|_| SensorError::BusIo)
        })?;
        self.delay.delay_us(55);
        Ok(high)
    }

    fn drive_low(&mut self) -> Result<(), SensorError> {
        self.pin.set_low().map_err(|_| SensorError::BusIo)
    }

    fn release(&mut self) -> Result<(), SensorError> {
        self.pin.set_high().map_err(|_| SensorError::BusIo)
    }
}

/// DS18B20 probes sharing one bus.
pub struct Ds18b20Bus<P, D> {
    wire: OneWire<P, D>,
}

impl<P, D> Ds18b20Bus<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(wire: OneWire<P, D>) -> Self {
        Self { wire }
    }

    /// Start a temperature conversion on every probe.  Returns
    /// immediately; the result is ready about 750 ms later.
    pub fn start_conversion(&mut self) -> Result<(), SensorError> {
        self.wire.skip_rom()?;
        self.wire.write_byte(CMD_CONVERT_T)
    }

    /// Read the last completed conversion of one probe.
    pub fn read_celsius(&mut self, address: &SensorAddress) -> Result<f32, SensorError> {
        self.wire.match_rom(address)?;
        self.wire.write_byte(CMD_READ_SCRATCHPAD)?;
        let mut scratchpad = [0u8; 9];
        for b in scratchpad.iter_mut() {
            *b = self.wire.read_byte()?;
        }
        // A missing probe reads back all ones, which the CRC does not catch
        // when the bus simply floats.
        if scratchpad.iter().all(|&b| b == 0xFF) {
            return Err(SensorError::NoPresence);
        }
        decode_scratchpad(&scratchpad)
    }
}
