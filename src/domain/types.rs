//! Strongly typed values shared by found and lost items.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static CONTACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("contact regex is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("contact number must be exactly 10 digits, got {0:?}")]
    InvalidContact(String),
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("identifier must be positive, got {0}")]
    InvalidId(i32),
    #[error("unknown lost item status {0:?}")]
    UnknownStatus(String),
    #[error("embedding blob of {0} bytes is not a sequence of f32 values")]
    MalformedEmbedding(usize),
}

macro_rules! item_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i32);

        impl $name {
            pub fn new(value: i32) -> Result<Self, ValidationError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(ValidationError::InvalidId(value))
                }
            }

            pub fn get(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

item_id!(FoundItemId);
item_id!(LostItemId);

/// A ten digit phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactNumber(String);

impl ContactNumber {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        if CONTACT_RE.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(ValidationError::InvalidContact(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LostStatus {
    Lost,
    Matched,
}

impl LostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LostStatus::Lost => "lost",
            LostStatus::Matched => "matched",
        }
    }
}

impl FromStr for LostStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "lost" => Ok(LostStatus::Lost),
            "matched" => Ok(LostStatus::Matched),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for LostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn non_empty(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Decodes a stored embedding blob of native-endian `f32` values.
pub(crate) fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>, ValidationError> {
    if blob.len() % std::mem::size_of::<f32>() != 0 {
        return Err(ValidationError::MalformedEmbedding(blob.len()));
    }
    Ok(bytemuck::pod_collect_to_vec::<u8, f32>(blob))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_accepts_ten_digits() {
        let contact = ContactNumber::parse("9000000000").expect("valid contact");
        assert_eq!(contact.as_str(), "9000000000");
    }

    #[test]
    fn contact_rejects_wrong_length_and_non_digits() {
        for value in ["", "123456789", "12345678901", "92345 6789", "12345abcde", "+919000000"] {
            assert_eq!(
                ContactNumber::parse(value),
                Err(ValidationError::InvalidContact(value.to_string())),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!("lost".parse::<LostStatus>(), Ok(LostStatus::Lost));
        assert_eq!(LostStatus::Matched.as_str(), "matched");
        assert!("found".parse::<LostStatus>().is_err());
    }

    #[test]
    fn ids_must_be_positive() {
        assert!(FoundItemId::new(0).is_err());
        assert_eq!(LostItemId::new(7).map(LostItemId::get), Ok(7));
    }

    #[test]
    fn decode_embedding_reads_f32_values() {
        let blob: Vec<u8> = bytemuck::cast_slice(&[1.0_f32, -0.5]).to_vec();
        assert_eq!(decode_embedding(&blob), Ok(vec![1.0, -0.5]));
        assert!(decode_embedding(&blob[..3]).is_err());
    }
}
