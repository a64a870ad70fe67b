//! Company (bedrift) rules: organisation number normalisation and checksum.

use crate::error::CoreError;

/// Weights of the modulus-11 check applied to the first eight digits.
const ORGNUMMER_WEIGHTS: [u32; 8] = [3, 2, 7, 6, 5, 4, 3, 2];

/// Normalise and validate a Norwegian organisation number.
///
/// Accepts spaces between digit groups (`"923 609 016"`), returns the bare
/// nine-digit string. The ninth digit must match the modulus-11 check digit.
pub fn normalize_orgnummer(raw: &str) -> Result<String, CoreError> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if digits.len() != 9 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Organisation number '{raw}' must be exactly 9 digits"
        )));
    }

    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    let sum: u32 = values
        .iter()
        .zip(ORGNUMMER_WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();

    let check = match 11 - (sum % 11) {
        11 => 0,
        10 => {
            return Err(CoreError::Validation(format!(
                "Organisation number '{raw}' has an invalid check digit"
            )))
        }
        n => n,
    };

    if values[8] != check {
        return Err(CoreError::Validation(format!(
            "Organisation number '{raw}' has an invalid check digit"
        )));
    }

    Ok(digits)
}
