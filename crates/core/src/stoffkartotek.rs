//! Chemical register (stoffkartotek) rules: GHS hazard symbols and CAS numbers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// GHS hazard pictograms, stored by their Norwegian key. Index + 1 is the
/// GHS pictogram number (`eksplosiv` = GHS01, ..., `miljofare` = GHS09).
pub const HAZARD_SYMBOLS: &[&str] = &[
    "eksplosiv",
    "brannfarlig",
    "oksiderende",
    "gass_under_trykk",
    "etsende",
    "giftig",
    "helsefare",
    "kronisk_helsefare",
    "miljofare",
];

/// GHS pictogram code (`GHS01`..`GHS09`) for a symbol key.
pub fn ghs_code(symbol: &str) -> Option<String> {
    HAZARD_SYMBOLS
        .iter()
        .position(|s| *s == symbol)
        .map(|i| format!("GHS{:02}", i + 1))
}

/// Validate hazard symbols and return them de-duplicated in GHS order.
pub fn normalize_symbols(symbols: &[String]) -> Result<Vec<String>, CoreError> {
    for symbol in symbols {
        if !HAZARD_SYMBOLS.contains(&symbol.as_str()) {
            return Err(CoreError::Validation(format!(
                "Unknown hazard symbol '{symbol}'. Must be one of: {}",
                HAZARD_SYMBOLS.join(", ")
            )));
        }
    }
    Ok(HAZARD_SYMBOLS
        .iter()
        .filter(|s| symbols.iter().any(|given| given == *s))
        .map(|s| s.to_string())
        .collect())
}

static CAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2,7})-(\d{2})-(\d)$").expect("valid regex"));

/// Validate a CAS registry number (`NNNNNNN-NN-N`) including its check digit.
pub fn validate_cas_number(cas: &str) -> Result<(), CoreError> {
    let caps = CAS_RE.captures(cas).ok_or_else(|| {
        CoreError::Validation(format!("CAS number '{cas}' must have the form NNNNNNN-NN-N"))
    })?;

    let body = format!("{}{}", &caps[1], &caps[2]);
    let check: u32 = caps[3].parse().unwrap_or(u32::MAX);

    let sum: u32 = body
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| (i as u32 + 1) * d)
        .sum();

    if sum % 10 == check {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "CAS number '{cas}' has an invalid check digit"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghs_codes_follow_list_order() {
        assert_eq!(ghs_code("eksplosiv").as_deref(), Some("GHS01"));
        assert_eq!(ghs_code("miljofare").as_deref(), Some("GHS09"));
        assert_eq!(ghs_code("radioaktiv"), None);
    }

    #[test]
    fn symbols_are_deduplicated_in_ghs_order() {
        let input = vec![
            "miljofare".to_string(),
            "brannfarlig".to_string(),
            "miljofare".to_string(),
        ];
        assert_eq!(
            normalize_symbols(&input).unwrap(),
            vec!["brannfarlig".to_string(), "miljofare".to_string()]
        );
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        assert!(normalize_symbols(&["radioaktiv".to_string()]).is_err());
        assert!(normalize_symbols(&[]).unwrap().is_empty());
    }

    #[test]
    fn cas_numbers_with_valid_check_digit() {
        assert!(validate_cas_number("7732-18-5").is_ok()); // water
        assert!(validate_cas_number("67-64-1").is_ok()); // acetone
        assert!(validate_cas_number("64-17-5").is_ok()); // ethanol
    }

    #[test]
    fn cas_numbers_with_bad_shape_or_digit() {
        assert!(validate_cas_number("7732-18-4").is_err());
        assert!(validate_cas_number("7732185").is_err());
        assert!(validate_cas_number("1-18-5").is_err());
    }
}
