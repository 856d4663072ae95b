//! Status word definitions used for scenario expectations

use std::{fmt, str::FromStr};

use crate::Error;

/// Status Word (SW1-SW2) a card returns after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusWord {
    /// First status byte (SW1)
    pub sw1: u8,
    /// Second status byte (SW2)
    pub sw2: u8,
}

impl StatusWord {
    /// Create a new status word
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Create from a u16 value (SW1 | SW2)
    pub const fn from_u16(status: u16) -> Self {
        Self {
            sw1: (status >> 8) as u8,
            sw2: status as u8,
        }
    }

    /// Convert to a u16 value (SW1 | SW2)
    pub const fn to_u16(&self) -> u16 {
        ((self.sw1 as u16) << 8) | (self.sw2 as u16)
    }

    /// Check if this status word indicates success (90 00)
    pub const fn is_success(&self) -> bool {
        self.sw1 == 0x90 && self.sw2 == 0x00
    }

    /// Four upper-case hex digits, the form used in scenario documents
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}", self.sw1, self.sw2)
    }

    /// Get a description of this status word
    pub const fn description(&self) -> &'static str {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => "Success",
            (0x61, _) => "More data available",
            (0x62, 0x82) => "End of file/record reached before reading Le bytes",
            (0x63, n) if (n & 0xF0) == 0xC0 => "Counter value",
            (0x67, 0x00) => "Wrong length",
            (0x69, 0x82) => "Security status not satisfied",
            (0x69, 0x85) => "Conditions of use not satisfied",
            (0x69, 0x86) => "Command not allowed",
            (0x6A, 0x82) => "File not found",
            (0x6A, 0x86) => "Incorrect parameters P1-P2",
            (0x6A, 0x88) => "Referenced data not found",
            (0x6D, 0x00) => "Instruction code not supported or invalid",
            (0x6E, 0x00) => "Class not supported",
            (0x6F, 0x00) => "No precise diagnosis",
            _ => "Unknown status word",
        }
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from(tuple: (u8, u8)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

impl From<u16> for StatusWord {
    fn from(status: u16) -> Self {
        Self::from_u16(status)
    }
}

impl From<StatusWord> for u16 {
    fn from(status: StatusWord) -> Self {
        status.to_u16()
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.sw1, self.sw2)
    }
}

impl FromStr for StatusWord {
    type Err = Error;

    /// Parses `"9000"`, `"6f00"`, `"90 00"` or `"0x9000"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits: String = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidStatusWord(s.to_string()));
        }
        u16::from_str_radix(&digits, 16)
            .map(Self::from_u16)
            .map_err(|_| Error::InvalidStatusWord(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for StatusWord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Accepts hex strings, and integers whose decimal digits are read as hex
/// so an unquoted `9000` from an environment variable still means `90 00`
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for StatusWord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatusWordVisitor;

        impl serde::de::Visitor<'_> for StatusWordVisitor {
            type Value = StatusWord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a status word as four hex digits")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                format!("{v:04}").parse().map_err(E::custom)
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Err(E::custom(Error::InvalidStatusWord(v.to_string()))),
                }
            }
        }

        deserializer.deserialize_any(StatusWordVisitor)
    }
}

/// Common status words
pub mod common {
    use super::StatusWord;

    /// Success (90 00)
    pub const SUCCESS: StatusWord = StatusWord::new(0x90, 0x00);

    /// No precise diagnosis (6F 00)
    pub const NO_PRECISE_DIAGNOSIS: StatusWord = StatusWord::new(0x6F, 0x00);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_word_from_to_u16() {
        let sw = StatusWord::from_u16(0x9000);
        assert_eq!(sw.sw1, 0x90);
        assert_eq!(sw.sw2, 0x00);
        assert_eq!(sw.to_u16(), 0x9000);
        assert!(sw.is_success());
    }

    #[test]
    fn test_status_word_parse() {
        assert_eq!("9000".parse::<StatusWord>().unwrap(), common::SUCCESS);
        assert_eq!(
            "6f00".parse::<StatusWord>().unwrap(),
            common::NO_PRECISE_DIAGNOSIS
        );
        assert_eq!(" 90 00 ".parse::<StatusWord>().unwrap(), common::SUCCESS);
        assert_eq!("0x6A82".parse::<StatusWord>().unwrap().to_u16(), 0x6A82);

        assert!("900".parse::<StatusWord>().is_err());
        assert!("90000".parse::<StatusWord>().is_err());
        assert!("zz00".parse::<StatusWord>().is_err());
        assert!("+900".parse::<StatusWord>().is_err());
        assert!("-900".parse::<StatusWord>().is_err());
    }

    #[test]
    fn test_status_word_renderings() {
        let sw = StatusWord::new(0x6F, 0x00);
        assert_eq!(sw.to_hex(), "6F00");
        assert_eq!(sw.to_string(), "6F 00");
        assert_eq!(sw.description(), "No precise diagnosis");
        assert_eq!(StatusWord::new(0x63, 0xC2).description(), "Counter value");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_status_word_serde() {
        let json = serde_json::to_string(&common::SUCCESS).unwrap();
        assert_eq!(json, "\"9000\"");
        let parsed: StatusWord = serde_json::from_str("\"6f00\"").unwrap();
        assert_eq!(parsed, common::NO_PRECISE_DIAGNOSIS);

        let parsed: Vec<StatusWord> = serde_json::from_str("[9000, 6300]").unwrap();
        assert_eq!(parsed, [common::SUCCESS, StatusWord::new(0x63, 0x00)]);
        assert_eq!(serde_json::from_str::<StatusWord>("900").unwrap().to_hex(), "0900");
        assert!(serde_json::from_str::<StatusWord>("90000").is_err());
        assert!(serde_json::from_str::<StatusWord>("-1").is_err());
    }
}
