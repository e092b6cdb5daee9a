//! Module → controller replies

/// Byte a module sends for "no flap card / nothing stored"
pub const REPLY_EMPTY: u8 = 0x00;

/// Byte a module sends when the flap position is unknown
pub const REPLY_INVALID: u8 = 0x10;

/// First byte treated as a printable character
pub const FIRST_PRINTABLE: u8 = 0x20;

/// Answer to a READ request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CharacterReply {
    /// No byte arrived before the reply timeout
    Timeout,
    /// Module answered 0x00 (not fitted or blank)
    Empty,
    /// Module does not know its flap position
    Invalid,
    /// Module shows this character
    Character(u8),
    /// Reserved control byte
    Undefined(u8),
}

impl CharacterReply {
    /// Classify a reply, `None` meaning no reply before the timeout
    pub fn from_reply(reply: Option<u8>) -> Self {
        match reply {
            None => CharacterReply::Timeout,
            Some(REPLY_EMPTY) => CharacterReply::Empty,
            Some(REPLY_INVALID) => CharacterReply::Invalid,
            Some(b) if b >= FIRST_PRINTABLE => CharacterReply::Character(b),
            Some(b) => CharacterReply::Undefined(b),
        }
    }

    /// Whether a module answered at this address
    pub fn is_module_present(&self) -> bool {
        !matches!(self, CharacterReply::Timeout | CharacterReply::Empty)
    }

    /// Byte used when reporting display content
    ///
    /// Unreadable positions show as `_`, reserved bytes as a space.
    pub fn display_byte(&self) -> u8 {
        match *self {
            CharacterReply::Timeout | CharacterReply::Empty | CharacterReply::Invalid => b'_',
            CharacterReply::Character(b) => b,
            CharacterReply::Undefined(_) => b' ',
        }
    }
}

/// Raw answer to a STATE request
///
/// The bit layout is module firmware specific; zero means no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleState(pub u8);

impl ModuleState {
    /// Build from an optional reply byte
    pub fn from_reply(reply: Option<u8>) -> Self {
        ModuleState(reply.unwrap_or(0))
    }

    /// Whether the module answered at all
    pub fn is_responding(&self) -> bool {
        self.0 != 0
    }
}
