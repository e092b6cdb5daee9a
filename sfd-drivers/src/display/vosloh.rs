//! Vosloh split-flap display driver
//!
//! A Vosloh display is a chain of flap modules on one UART bus, each with a
//! fixed address between 1 and 127. Characters written to a module are
//! stored until an ADAPT command makes every module flip at once.
//!
//! # Reads
//!
//! READ and STATE requests are answered by the addressed module with a
//! single byte. Absent modules stay silent, so every read waits for at most
//! the reply timeout. Discovering the last module therefore probes all 127
//! addresses once during setup.

use core::fmt::{self, Write as _};

use heapless::Vec;
use log::{debug, info};

use sfd_core::config::LineLength;
use sfd_core::content::{layout_content, row_start, ContentMode, CONTENT_CAPACITY};
use sfd_core::traits::{Component, ComponentError, UartDevice};
use sfd_hal::time::Clock;
use sfd_hal::uart::Uart;
use sfd_protocol::{CharacterReply, Command, ModuleState, ProtocolError, POSITION_MAX, POSITION_MIN};

/// Time a module gets to answer a READ or STATE request
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 50;

/// Split-flap driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SfdError<E> {
    /// Bus transfer failed
    Uart(E),
    /// No UART bus has been attached
    NoUartParent,
    /// Command could not be encoded (address outside 1..=127)
    Protocol(ProtocolError),
    /// Row starts past the last addressable module
    RowOutOfRange(u8),
}

impl<E> From<ProtocolError> for SfdError<E> {
    fn from(e: ProtocolError) -> Self {
        SfdError::Protocol(e)
    }
}

impl<E> SfdError<E> {
    fn component_error(&self) -> ComponentError {
        match self {
            SfdError::NoUartParent => ComponentError::NotConfigured,
            _ => ComponentError::Communication,
        }
    }
}

/// Vosloh split-flap display on a UART bus
pub struct SfdVosloh<U, C> {
    uart: Option<U>,
    clock: C,
    row_length: LineLength,
    current_position: u8,
    last_module: u8,
    current_content: Vec<u8, CONTENT_CAPACITY>,
    module_states: Vec<ModuleState, CONTENT_CAPACITY>,
    reply_timeout_ms: u64,
}

impl<U, C> SfdVosloh<U, C> {
    /// Create a driver without a bus
    ///
    /// The bus is attached later through [`UartDevice::set_uart_parent`].
    pub fn new(clock: C) -> Self {
        Self {
            uart: None,
            clock,
            row_length: LineLength::DEFAULT,
            current_position: POSITION_MIN,
            last_module: 0,
            current_content: Vec::new(),
            module_states: Vec::new(),
            reply_timeout_ms: DEFAULT_REPLY_TIMEOUT_MS,
        }
    }

    /// Set the number of modules per row
    pub fn set_line_length(&mut self, line_length: LineLength) {
        self.row_length = line_length;
    }

    pub fn line_length(&self) -> LineLength {
        self.row_length
    }

    /// Set the reply timeout for reads
    pub fn set_reply_timeout_ms(&mut self, timeout_ms: u64) {
        self.reply_timeout_ms = timeout_ms;
    }

    pub fn reply_timeout_ms(&self) -> u64 {
        self.reply_timeout_ms
    }

    /// Address the next sequential write goes to
    pub fn current_position(&self) -> u8 {
        self.current_position
    }

    /// Highest address that answered during the last discovery, 0 if none
    pub fn last_module(&self) -> u8 {
        self.last_module
    }

    /// Characters read back from modules `1..=last_module`
    pub fn current_content(&self) -> &[u8] {
        &self.current_content
    }

    /// State bytes read back from modules `1..=last_module`
    pub fn module_states(&self) -> &[ModuleState] {
        &self.module_states
    }
}

impl<U: Uart, C: Clock> SfdVosloh<U, C> {
    fn send(&mut self, command: Command) -> Result<(), SfdError<U::Error>> {
        let (bytes, len) = command.to_bytes()?;
        let uart = self.uart.as_mut().ok_or(SfdError::NoUartParent)?;
        uart.write_blocking(&bytes[..len]).map_err(SfdError::Uart)?;
        uart.flush().map_err(SfdError::Uart)
    }

    /// Wait for a single reply byte
    ///
    /// Returns `None` if nothing arrives within the reply timeout.
    fn collect_reply(&mut self) -> Result<Option<u8>, SfdError<U::Error>> {
        let uart = self.uart.as_mut().ok_or(SfdError::NoUartParent)?;
        let start = self.clock.now_ms();

        loop {
            if uart.read_ready().map_err(SfdError::Uart)? {
                return uart.read_byte().map(Some).map_err(SfdError::Uart);
            }
            if self.clock.elapsed_ms(start) > self.reply_timeout_ms {
                return Ok(None);
            }
        }
    }

    /// Store `character` in the module at `position`
    ///
    /// The module only shows it after the next [`adapt`](Self::adapt).
    pub fn set_character(&mut self, character: u8, position: u8) -> Result<(), SfdError<U::Error>> {
        self.send(Command::write(position, character)?)?;
        self.current_position = position + 1;
        Ok(())
    }

    /// Store consecutive characters starting at `position`
    ///
    /// Stops at the last addressable module. Returns the number of
    /// characters written.
    pub fn set_string(&mut self, bytes: &[u8], position: u8) -> Result<usize, SfdError<U::Error>> {
        debug!("set_string: pos {} len {}", position, bytes.len());

        let mut written = 0;
        for (&byte, pos) in bytes.iter().zip(position..=POSITION_MAX) {
            self.set_character(byte, pos)?;
            written += 1;
        }

        if written < bytes.len() {
            debug!("set_string: reached last module, {} dropped", bytes.len() - written);
        }
        Ok(written)
    }

    /// Read the character of the module at `position`
    pub fn get_character(&mut self, position: u8) -> Result<CharacterReply, SfdError<U::Error>> {
        self.send(Command::read(position)?)?;
        let reply = self.collect_reply()?;
        Ok(CharacterReply::from_reply(reply))
    }

    /// Read the state byte of the module at `position`
    pub fn get_state(&mut self, position: u8) -> Result<ModuleState, SfdError<U::Error>> {
        self.send(Command::state(position)?)?;
        let reply = self.collect_reply()?;
        Ok(ModuleState::from_reply(reply))
    }

    /// Flip every module to the characters written since the last adapt
    pub fn adapt(&mut self) -> Result<(), SfdError<U::Error>> {
        self.send(Command::Adapt)
    }

    /// Cycle all flaps, then read back content and state
    pub fn roll(&mut self) -> Result<(), SfdError<U::Error>> {
        debug!("roll");
        self.send(Command::Roll)?;
        self.current_position = POSITION_MIN;

        self.update_current_content()?;
        self.update_current_state()
    }

    /// Write a space to every known module
    pub fn clear(&mut self, adapt: bool) -> Result<(), SfdError<U::Error>> {
        for pos in POSITION_MIN..=self.last_module {
            self.set_character(b' ', pos)?;
        }
        self.current_position = POSITION_MIN;

        if adapt {
            self.adapt()?;
        }
        Ok(())
    }

    /// Clear the display and flip immediately
    pub fn blank(&mut self) -> Result<(), SfdError<U::Error>> {
        self.clear(true)
    }

    /// Lay out `text` starting at `row` and show it
    ///
    /// Rows are 1-based; 0 is treated as 1. The display is cleared first
    /// unless `mode` contains [`ContentMode::OVERWRITE`].
    pub fn set_content(&mut self, text: &[u8], mode: ContentMode, row: u8) -> Result<(), SfdError<U::Error>> {
        debug!("set_content: row {} mode {:#04x}", row, mode.bits());

        if !mode.contains(ContentMode::OVERWRITE) {
            self.clear(false)?;
        }

        let start = row_start(row, self.row_length).ok_or(SfdError::RowOutOfRange(row))?;
        self.current_position = start;

        let layout = layout_content(text, mode, self.row_length);
        if layout.truncated {
            debug!("set_content: text truncated to {} modules", CONTENT_CAPACITY);
        }
        self.set_string(&layout.bytes, start)?;
        self.adapt()?;

        self.update_current_content()?;
        self.update_current_state()
    }

    /// Show `1234567890` repeated over every address
    pub fn test_pattern(&mut self) -> Result<(), SfdError<U::Error>> {
        self.clear(false)?;
        for pos in POSITION_MIN..=POSITION_MAX {
            self.set_character(b'0' + pos % 10, pos)?;
        }
        self.adapt()
    }

    /// Probe every address and remember the highest one that answered
    pub fn update_last_module(&mut self) -> Result<u8, SfdError<U::Error>> {
        let mut last = 0;
        for pos in POSITION_MIN..=POSITION_MAX {
            if self.get_character(pos)?.is_module_present() {
                last = pos;
            }
        }

        debug!("last module: {}", last);
        self.last_module = last;
        Ok(last)
    }

    /// Read back the characters shown by modules `1..=last_module`
    pub fn update_current_content(&mut self) -> Result<(), SfdError<U::Error>> {
        self.current_content.clear();

        for pos in POSITION_MIN..=self.last_module {
            let reply = self.get_character(pos)?;
            match reply {
                CharacterReply::Timeout => debug!("pos {}: timeout", pos),
                CharacterReply::Invalid => debug!("pos {}: flap position unknown", pos),
                CharacterReply::Undefined(b) => debug!("pos {}: undefined reply {:#04x}", pos, b),
                _ => {}
            }
            // last_module never exceeds the capacity
            let _ = self.current_content.push(reply.display_byte());
        }
        Ok(())
    }

    /// Read back the state bytes of modules `1..=last_module`
    pub fn update_current_state(&mut self) -> Result<(), SfdError<U::Error>> {
        self.module_states.clear();

        for pos in POSITION_MIN..=self.last_module {
            let state = self.get_state(pos)?;
            let _ = self.module_states.push(state);
        }
        Ok(())
    }
}

impl<U: Uart, C> UartDevice for SfdVosloh<U, C> {
    type Bus = U;

    fn set_uart_parent(&mut self, bus: U) {
        self.uart = Some(bus);
    }

    fn uart_parent(&mut self) -> Option<&mut U> {
        self.uart.as_mut()
    }

    fn has_uart_parent(&self) -> bool {
        self.uart.is_some()
    }
}

impl<U: Uart, C: Clock> Component for SfdVosloh<U, C> {
    fn setup(&mut self) -> Result<(), ComponentError> {
        self.update_last_module().map_err(|e| e.component_error())?;
        self.roll().map_err(|e| e.component_error())
    }

    fn dump_config(&self) {
        info!("SFD Vosloh:");
        info!("  row length: {}", self.row_length);
        info!("  last module: {}", self.last_module);
        info!("  current content: \"{}\"", Latin1(&self.current_content));
    }
}

/// Formats module bytes as characters
struct Latin1<'a>(&'a [u8]);

impl fmt::Display for Latin1<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0 {
            f.write_char(char::from(b))?;
        }
        Ok(())
    }
}
