//! Encoding tags carried by a [`CowBuffer`](super::CowBuffer).

use serde::{Deserialize, Serialize};

/// Number of trailing zero bytes kept after the payload of every buffer.
///
/// Two bytes form a valid terminator whether the payload is read as 8-bit or
/// 16-bit units.
pub const TERMINATOR_LEN: usize = 2;

/// How the bytes of a buffer are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Opaque bytes.
    #[default]
    Binary,
    /// 8-bit code page text.
    Ansi,
    /// Narrow-range text stored in 16-bit units.
    Ansi16,
    /// UTF-16 text.
    Utf16,
}

impl Encoding {
    /// Width in bytes of one code unit.
    pub fn unit_width(self) -> usize {
        match self {
            Encoding::Binary | Encoding::Ansi => 1,
            Encoding::Ansi16 | Encoding::Utf16 => 2,
        }
    }

    /// Returns true for the two 16-bit encodings.
    pub fn is_wide(self) -> bool {
        self.unit_width() == 2
    }

    /// Text encoding a library uses for comments and source content.
    pub fn text(is_unicode: bool) -> Self {
        if is_unicode { Encoding::Utf16 } else { Encoding::Ansi }
    }

    /// Total byte length of a buffer holding `units` code units.
    pub fn byte_len(self, units: usize) -> usize {
        units * self.unit_width() + TERMINATOR_LEN
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Binary => write!(f, "binary"),
            Encoding::Ansi => write!(f, "ansi"),
            Encoding::Ansi16 => write!(f, "ansi16"),
            Encoding::Utf16 => write!(f, "utf-16"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_width() {
        assert_eq!(Encoding::Binary.unit_width(), 1);
        assert_eq!(Encoding::Ansi.unit_width(), 1);
        assert_eq!(Encoding::Ansi16.unit_width(), 2);
        assert_eq!(Encoding::Utf16.unit_width(), 2);
    }

    #[test]
    fn test_byte_len_includes_terminator() {
        assert_eq!(Encoding::Binary.byte_len(0), 2);
        assert_eq!(Encoding::Ansi.byte_len(5), 7);
        assert_eq!(Encoding::Utf16.byte_len(5), 12);
    }

    #[test]
    fn test_text_encoding_for_library() {
        assert_eq!(Encoding::text(true), Encoding::Utf16);
        assert_eq!(Encoding::text(false), Encoding::Ansi);
    }

    #[test]
    fn test_display() {
        assert_eq!(Encoding::Utf16.to_string(), "utf-16");
        assert_eq!(Encoding::Ansi16.to_string(), "ansi16");
    }
}
