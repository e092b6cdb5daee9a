//! Text layout for rows of flap modules
//!
//! Turns a text into the byte stream that is written module by module,
//! starting at the first module of a row. Rows are `row_length` modules
//! wide and the display has at most [`CONTENT_CAPACITY`] modules.

use core::ops::{BitOr, BitOrAssign};

use heapless::Vec;

use crate::config::LineLength;

/// Highest number of modules a display can address
pub const CONTENT_CAPACITY: usize = 127;

/// How `set_content` lays out its text
///
/// A set of bit flags. [`ContentMode::RAW`] is the empty set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContentMode(u8);

impl ContentMode {
    /// Copy the text verbatim, minus line breaks
    pub const RAW: ContentMode = ContentMode(0);
    /// Move words that do not fit to the next row
    pub const WORD_WRAP: ContentMode = ContentMode(1);
    /// Keep the existing content instead of clearing first
    pub const OVERWRITE: ContentMode = ContentMode(2);
    /// Center each row
    pub const ALIGN_CENTER: ContentMode = ContentMode(4);
    /// Right-align each row
    pub const ALIGN_RIGHT: ContentMode = ContentMode(8);

    const ALL: u8 = 0x0F;

    /// Create from raw flag bits, ignoring unknown bits
    pub const fn from_bits(bits: u8) -> Self {
        ContentMode(bits & Self::ALL)
    }

    /// Raw flag bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if every flag in `other` is set
    pub const fn contains(self, other: ContentMode) -> bool {
        self.0 & other.0 == other.0
    }

    /// No flags at all; any flag, even [`ContentMode::OVERWRITE`], selects row layout
    pub const fn is_raw(self) -> bool {
        self.0 == Self::RAW.0
    }
}

impl BitOr for ContentMode {
    type Output = ContentMode;

    fn bitor(self, rhs: ContentMode) -> ContentMode {
        ContentMode(self.0 | rhs.0)
    }
}

impl BitOrAssign for ContentMode {
    fn bitor_assign(&mut self, rhs: ContentMode) {
        self.0 |= rhs.0;
    }
}

/// Result of [`layout_content`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layout {
    /// Bytes to write, one per module
    pub bytes: Vec<u8, CONTENT_CAPACITY>,
    /// Whether output was cut off at [`CONTENT_CAPACITY`]
    pub truncated: bool,
}

impl Layout {
    fn push(&mut self, byte: u8) {
        if self.bytes.push(byte).is_err() {
            self.truncated = true;
        }
    }

    fn push_repeated(&mut self, byte: u8, count: usize) {
        for _ in 0..count {
            self.push(byte);
        }
    }
}

/// Address of the first module of `row`
///
/// Rows are 1-based; row 0 is treated as row 1. Returns `None` if the row
/// starts past the last addressable module.
pub fn row_start(row: u8, row_length: LineLength) -> Option<u8> {
    let row = u16::from(row.max(1));
    let start = u16::from(row_length.get()) * (row - 1) + 1;
    u8::try_from(start)
        .ok()
        .filter(|s| usize::from(*s) <= CONTENT_CAPACITY)
}

/// Lay out `text` for a display with rows of `row_length` modules
pub fn layout_content(text: &[u8], mode: ContentMode, row_length: LineLength) -> Layout {
    let mut layout = Layout::default();

    if mode.is_raw() {
        for &b in text.iter().filter(|&&b| b != b'\n' && b != b'\r') {
            layout.push(b);
        }
        return layout;
    }

    let row_length = usize::from(row_length.get());
    let wrap = mode.contains(ContentMode::WORD_WRAP);

    for line in text.split(|&b| b == b'\n') {
        let mut row: Vec<u8, CONTENT_CAPACITY> = Vec::new();

        for word in line.split(|&b| b == b' ') {
            let len = word.iter().filter(|&&b| b != b'\r').count();
            if wrap && !row.is_empty() && row.len() + 1 + len > row_length {
                finish_row(&mut layout, &row, mode, row_length);
                row.clear();
            }
            if !row.is_empty() && row.push(b' ').is_err() {
                layout.truncated = true;
            }
            for &b in word.iter().filter(|&&b| b != b'\r') {
                if row.push(b).is_err() {
                    layout.truncated = true;
                }
            }
        }

        finish_row(&mut layout, &row, mode, row_length);
    }

    layout
}

/// Pad one row according to the alignment flags and append it
fn finish_row(layout: &mut Layout, row: &[u8], mode: ContentMode, row_length: usize) {
    let rest = row_length.saturating_sub(row.len());
    let left = if mode.contains(ContentMode::ALIGN_RIGHT) {
        rest
    } else if mode.contains(ContentMode::ALIGN_CENTER) {
        rest / 2
    } else {
        0
    };

    layout.push_repeated(b' ', left);
    for &b in row {
        layout.push(b);
    }
    layout.push_repeated(b' ', rest - left);
}
