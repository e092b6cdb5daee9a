//! Controller → module commands
//!
//! Command bytes:
//! - ADAPT (0x81): latch written characters, all modules flip
//! - ROLL (0x82): cycle every flap once (used as a reset after power-up)
//! - READ (0x84, addr): module answers with its current character
//! - STATE (0x85, addr): module answers with its status byte
//! - WRITE (0x88, addr, char): store a character, shown on the next ADAPT

/// Command byte values
pub mod op {
    /// Latch pending characters
    pub const ADAPT: u8 = 0x81;
    /// Cycle all flaps
    pub const ROLL: u8 = 0x82;
    /// Read the character of one module
    pub const READ: u8 = 0x84;
    /// Read the status byte of one module
    pub const STATE: u8 = 0x85;
    /// Write the character of one module
    pub const WRITE: u8 = 0x88;
}

/// Lowest module address
pub const POSITION_MIN: u8 = 1;

/// Highest module address
pub const POSITION_MAX: u8 = 127;

/// Longest encoded command (WRITE)
pub const MAX_COMMAND_SIZE: usize = 3;

/// Errors that can occur when building or encoding commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Module address outside 1..=127
    InvalidPosition(u8),
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A command addressed to the module bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Latch pending characters
    Adapt,
    /// Cycle all flaps
    Roll,
    /// Read the character of the module at `position`
    Read { position: u8 },
    /// Read the status byte of the module at `position`
    State { position: u8 },
    /// Store `character` in the module at `position`
    Write { position: u8, character: u8 },
}

fn check_position(position: u8) -> Result<u8, ProtocolError> {
    if (POSITION_MIN..=POSITION_MAX).contains(&position) {
        Ok(position)
    } else {
        Err(ProtocolError::InvalidPosition(position))
    }
}

impl Command {
    /// Build a READ command
    pub fn read(position: u8) -> Result<Self, ProtocolError> {
        Ok(Command::Read {
            position: check_position(position)?,
        })
    }

    /// Build a STATE command
    pub fn state(position: u8) -> Result<Self, ProtocolError> {
        Ok(Command::State {
            position: check_position(position)?,
        })
    }

    /// Build a WRITE command
    pub fn write(position: u8, character: u8) -> Result<Self, ProtocolError> {
        Ok(Command::Write {
            position: check_position(position)?,
            character,
        })
    }

    /// Command byte
    pub fn opcode(&self) -> u8 {
        match self {
            Command::Adapt => op::ADAPT,
            Command::Roll => op::ROLL,
            Command::Read { .. } => op::READ,
            Command::State { .. } => op::STATE,
            Command::Write { .. } => op::WRITE,
        }
    }

    /// Whether the addressed module answers this command
    pub fn expects_reply(&self) -> bool {
        matches!(self, Command::Read { .. } | Command::State { .. })
    }

    /// Encoded length in bytes
    pub fn encoded_len(&self) -> usize {
        match self {
            Command::Adapt | Command::Roll => 1,
            Command::Read { .. } | Command::State { .. } => 2,
            Command::Write { .. } => 3,
        }
    }

    /// Encode the command into a buffer
    ///
    /// Returns the number of bytes written. Positions are re-checked so
    /// that hand-built variants cannot put an invalid address on the bus.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
        let len = self.encoded_len();
        if buffer.len() < len {
            return Err(ProtocolError::BufferTooSmall);
        }

        buffer[0] = self.opcode();
        match *self {
            Command::Adapt | Command::Roll => {}
            Command::Read { position } | Command::State { position } => {
                buffer[1] = check_position(position)?;
            }
            Command::Write {
                position,
                character,
            } => {
                buffer[1] = check_position(position)?;
                buffer[2] = character;
            }
        }

        Ok(len)
    }

    /// Encode into a fixed-size array
    pub fn to_bytes(&self) -> Result<([u8; MAX_COMMAND_SIZE], usize), ProtocolError> {
        let mut buffer = [0u8; MAX_COMMAND_SIZE];
        let len = self.encode(&mut buffer)?;
        Ok((buffer, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_single_byte_commands() {
        let (bytes, len) = Command::Adapt.to_bytes().unwrap();
        assert_eq!(&bytes[..len], &[0x81]);

        let (bytes, len) = Command::Roll.to_bytes().unwrap();
        assert_eq!(&bytes[..len], &[0x82]);
    }

    #[test]
    fn test_encode_write() {
        let cmd = Command::write(12, b'A').unwrap();
        let (bytes, len) = cmd.to_bytes().unwrap();
        assert_eq!(&bytes[..len], &[0x88, 12, b'A']);
        assert!(!cmd.expects_reply());
    }

    #[test]
    fn test_encode_read_and_state() {
        let read = Command::read(127).unwrap();
        assert_eq!(read.to_bytes().unwrap(), ([0x84, 127, 0], 2));
        assert!(read.expects_reply());

        let state = Command::state(1).unwrap();
        assert_eq!(state.to_bytes().unwrap(), ([0x85, 1, 0], 2));
    }

    #[test]
    fn test_position_bounds() {
        assert_eq!(Command::write(0, b' '), Err(ProtocolError::InvalidPosition(0)));
        assert_eq!(Command::read(128), Err(ProtocolError::InvalidPosition(128)));

        // Hand-built variants are rejected at encode time
        let cmd = Command::Write {
            position: 200,
            character: b'x',
        };
        assert_eq!(cmd.to_bytes(), Err(ProtocolError::InvalidPosition(200)));
    }

    #[test]
    fn test_buffer_too_small() {
        let cmd = Command::write(5, b'Z').unwrap();
        let mut buffer = [0u8; 2];
        assert_eq!(cmd.encode(&mut buffer), Err(ProtocolError::BufferTooSmall));
    }

    proptest! {
        #[test]
        fn prop_every_address_encodes(position in POSITION_MIN..=POSITION_MAX, ch in any::<u8>()) {
            let (bytes, len) = Command::write(position, ch).unwrap().to_bytes().unwrap();
            prop_assert_eq!(len, 3);
            prop_assert_eq!(bytes, [op::WRITE, position, ch]);
        }

        #[test]
        fn prop_out_of_range_rejected(position in (POSITION_MAX + 1)..=u8::MAX) {
            prop_assert_eq!(Command::read(position), Err(ProtocolError::InvalidPosition(position)));
        }
    }
}
