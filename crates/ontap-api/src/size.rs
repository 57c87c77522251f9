//! Human-readable LUN size parsing.
//!
//! Sizes use binary multipliers: `100G` is 100 GiB. A bare number is a
//! byte count. The unit may be followed by `B` or `iB` (`100GB`, `100GiB`)
//! and is case-insensitive.

use crate::error::Error;

const UNITS: [(char, u32); 5] = [('K', 1), ('M', 2), ('G', 3), ('T', 4), ('P', 5)];

/// Parse a size string such as `"100G"`, `"500m"`, or `"4096"` into bytes.
///
/// Fails with [`Error::Validation`] for anything unparseable, zero,
/// negative, or larger than `u64::MAX`.
pub fn parse_size(input: &str) -> Result<u64, Error> {
    let invalid = |reason: &str| Error::Validation {
        field: "size".into(),
        reason: format!("{reason}: {input:?} (expected e.g. 100G, 20M, 4096)"),
    };

    let s = input.trim();
    if s.starts_with('-') {
        return Err(invalid("size must be positive"));
    }

    let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (number, suffix) = s.split_at(digits_end);
    if number.is_empty() {
        return Err(invalid("missing number"));
    }
    let number: u64 = number.parse().map_err(|_| invalid("number out of range"))?;

    let exponent = unit_exponent(suffix.trim_start()).ok_or_else(|| invalid("unknown unit"))?;
    let bytes = 1024_u64
        .checked_pow(exponent)
        .and_then(|multiplier| number.checked_mul(multiplier))
        .ok_or_else(|| invalid("size too large"))?;

    if bytes == 0 {
        return Err(invalid("size must be greater than zero"));
    }
    Ok(bytes)
}

/// Map a unit suffix to its power of 1024; `None` when unrecognized.
fn unit_exponent(suffix: &str) -> Option<u32> {
    let upper = suffix.to_ascii_uppercase();
    if upper.is_empty() || upper == "B" {
        return Some(0);
    }

    let mut chars = upper.chars();
    let unit = chars.next()?;
    let (_, exponent) = UNITS.iter().find(|(u, _)| *u == unit)?;
    match chars.as_str() {
        "" | "B" | "IB" => Some(*exponent),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn binary_units() {
        assert_eq!(parse_size("100G").unwrap(), 107_374_182_400);
        assert_eq!(parse_size("1T").unwrap(), 1_099_511_627_776);
        assert_eq!(parse_size("500M").unwrap(), 524_288_000);
        assert_eq!(parse_size("20K").unwrap(), 20_480);
        assert_eq!(parse_size("2P").unwrap(), 2_251_799_813_685_248);
    }

    #[test]
    fn bare_numbers_are_bytes() {
        assert_eq!(parse_size("4096").unwrap(), 4096);
        assert_eq!(parse_size("4096B").unwrap(), 4096);
    }

    #[test]
    fn case_whitespace_and_suffix_variants() {
        assert_eq!(parse_size(" 100g ").unwrap(), 107_374_182_400);
        assert_eq!(parse_size("100GB").unwrap(), 107_374_182_400);
        assert_eq!(parse_size("100GiB").unwrap(), 107_374_182_400);
        assert_eq!(parse_size("100 G").unwrap(), 107_374_182_400);
    }

    #[test]
    fn rejects_invalid_input() {
        for bad in ["abc", "-5G", "0G", "0", "", "G", "1.5G", "10X", "10GG", "5 G B"] {
            let err = parse_size(bad).unwrap_err();
            assert!(
                matches!(err, Error::Validation { ref field, .. } if field == "size"),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_size("99999999P").is_err());
        assert!(parse_size("99999999999999999999999").is_err());
    }
}
