//! Byte size helpers.

use super::error::{Error, Result};

/// One kibibyte.
const KIB: usize = 1024;
/// One mebibyte.
const MIB: usize = KIB * 1024;
/// One gibibyte.
const GIB: usize = MIB * 1024;

/// Formats bytes as a human-readable string.
pub fn format_bytes(bytes: usize) -> String {
    if bytes >= GIB {
        format!("{:.2} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

/// Parses a byte size such as `4096`, `64K`, `16MiB` or `1g`.
///
/// Suffixes are binary (`K` = 1024) and case-insensitive; an optional
/// trailing `B` or `iB` is accepted.
///
/// # Errors
///
/// Returns [`Error::Config`] if the number or the suffix is not recognized,
/// or if the value does not fit in `usize`.
pub fn parse_size(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split);

    let value: usize = digits
        .parse()
        .map_err(|_| Error::Config(format!("invalid size '{input}'")))?;

    let multiplier = match suffix.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KIB,
        "m" | "mb" | "mib" => MIB,
        "g" | "gb" | "gib" => GIB,
        other => {
            return Err(Error::Config(format!(
                "unknown size suffix '{other}' in '{input}'"
            )));
        }
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| Error::Config(format!("size '{input}' overflows")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(3 * MIB / 2), "1.50 MiB");
        assert_eq!(format_bytes(GIB), "1.00 GiB");
    }

    #[test]
    fn test_parse_plain_and_suffixed() {
        assert_eq!(parse_size("4096").unwrap(), 4096);
        assert_eq!(parse_size("64K").unwrap(), 64 * KIB);
        assert_eq!(parse_size("16MiB").unwrap(), 16 * MIB);
        assert_eq!(parse_size(" 1g ").unwrap(), GIB);
        assert_eq!(parse_size("100b").unwrap(), 100);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_size("").is_err());
        assert!(parse_size("K").is_err());
        assert!(parse_size("12 parsecs").is_err());
        assert!(parse_size("-5").is_err());
    }

    #[test]
    fn test_parse_overflow() {
        let huge = format!("{}G", usize::MAX);
        assert!(matches!(parse_size(&huge), Err(Error::Config(_))));
    }
}
