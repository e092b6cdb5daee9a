//! RP2040 glue for the generated component wiring
//!
//! Adapts embassy's buffered UART to the blocking [`sfd_hal::uart`] traits
//! and embassy's monotonic timer to [`Clock`].

use embassy_rp::uart::{self, BufferedUart};
use embedded_io::{Read, ReadReady, Write};
use sfd_hal::time::Clock;
use sfd_hal::uart::{DataBits, ErrorType, Parity, StopBits, UartConfig, UartRx, UartTx};

/// Size of each TX and RX ring buffer
pub const BUFFER_SIZE: usize = 256;

/// Buffered RP2040 UART bus
pub struct RpUart {
    inner: BufferedUart,
}

impl RpUart {
    pub fn new(inner: BufferedUart) -> Self {
        Self { inner }
    }
}

impl ErrorType for RpUart {
    type Error = uart::Error;
}

impl UartTx for RpUart {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(&mut self.inner)
    }
}

impl UartRx for RpUart {
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.inner.read(buf)
    }

    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        ReadReady::read_ready(&mut self.inner)
    }
}

/// Milliseconds since boot from the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}

/// Translate bus settings into the RP2040 UART configuration
pub fn rp_config(config: &UartConfig) -> uart::Config {
    let mut cfg = uart::Config::default();
    cfg.baudrate = config.baudrate;
    cfg.data_bits = match config.data_bits {
        DataBits::Five => uart::DataBits::DataBits5,
        DataBits::Six => uart::DataBits::DataBits6,
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    cfg.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    cfg
}
