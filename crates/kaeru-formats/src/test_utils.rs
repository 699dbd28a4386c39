//! Test utilities for format round-trip testing
//!
//! This module provides shared test utilities to reduce code duplication
//! across format test modules.

use crate::KaeruFormat;
use std::fmt::Debug;

/// Test round-trip serialization for a format instance
///
/// Builds the value, parses the bytes back and compares the result with the
/// original.
pub fn test_round_trip<T>(original: &T) -> Result<(), Box<dyn std::error::Error>>
where
    T: KaeruFormat + PartialEq + Debug,
{
    let data = original.build()?;
    let parsed = T::parse(&data)?;

    if original != &parsed {
        return Err(format!(
            "Round-trip verification failed:\nOriginal: {:?}\nParsed: {:?}",
            original, parsed
        )
        .into());
    }

    Ok(())
}

/// Test that parsing invalid data fails
pub fn test_invalid_data_rejected<T>(invalid_data: &[u8]) -> Result<(), Box<dyn std::error::Error>>
where
    T: KaeruFormat,
{
    match T::parse(invalid_data) {
        Ok(_) => Err("Expected parsing to fail for invalid data, but it succeeded".into()),
        Err(_) => Ok(()),
    }
}

/// Helper to assert round-trip works for a format
#[macro_export]
macro_rules! assert_round_trip {
    ($value:expr) => {
        $crate::test_utils::test_round_trip(&$value).expect("Round-trip should succeed")
    };
}

/// Helper to assert invalid data is rejected
#[macro_export]
macro_rules! assert_invalid_data_rejected {
    ($type:ty, $data:expr) => {
        $crate::test_utils::test_invalid_data_rejected::<$type>($data)
            .expect("Invalid data should be rejected")
    };
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Fixed {
        value: u32,
    }

    impl KaeruFormat for Fixed {
        fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
            if data.len() != 4 {
                return Err("Invalid data length".into());
            }
            Ok(Fixed {
                value: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            })
        }

        fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
            Ok(self.value.to_le_bytes().to_vec())
        }
    }

    #[test]
    fn test_round_trip_utility() {
        test_round_trip(&Fixed { value: 42 }).expect("Round-trip should succeed");
    }

    #[test]
    fn test_invalid_data_rejected_utility() {
        test_invalid_data_rejected::<Fixed>(&[1, 2]).expect("Should reject invalid data");
    }

    #[test]
    fn test_verify_round_trip_detects_mismatch() {
        // Trailing byte is dropped by parse, so rebuilt bytes differ
        struct Lossy;

        impl KaeruFormat for Lossy {
            fn parse(_: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
                Ok(Lossy)
            }

            fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
                Ok(vec![0])
            }
        }

        assert!(Lossy::verify_round_trip(&[0, 1]).is_err());
        assert!(Lossy::verify_round_trip(&[0]).is_ok());
    }
}
