use anyhow::{bail, Result};
use std::fmt;

/// Binary size units. The discriminant is the power of 1024 the unit stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unit {
    B = 0,
    Kb = 1,
    Mb = 2,
    Gb = 3,
}

impl Unit {
    fn parse(code: &str) -> Option<Unit> {
        Some(match code.to_ascii_lowercase().as_str() {
            "b" => Unit::B,
            "kb" => Unit::Kb,
            "mb" => Unit::Mb,
            "gb" => Unit::Gb,
            _ => return None,
        })
    }

    fn multiplier(self) -> u64 {
        1u64 << (10 * self as u32)
    }

    fn suffix(self) -> &'static str {
        match self {
            Unit::B => "B",
            Unit::Kb => "KB",
            Unit::Mb => "MB",
            Unit::Gb => "GB",
        }
    }
}

/// A file size as given on the command line, e.g. `128B` or `1.5MB`.
///
/// The unit is mandatory and case-insensitive. The magnitude may be fractional; the byte count is
/// truncated toward zero, so `1.0001KB` is 1024 bytes and `0.3B` is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct FileSize {
    num: f64,
    unit: Unit,
    /// `num` scaled by the unit. Checked to fit by the constructor.
    bytes: u64,
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.num, self.unit.suffix())
    }
}

impl std::str::FromStr for FileSize {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let split = input
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
            .unwrap_or(input.len());
        let (num, code) = input.split_at(split);

        let (whole, frac) = match num.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (num, None),
        };
        if whole.is_empty() {
            bail!("the size is supposed to start with a digit");
        }
        if let Some(frac) = frac {
            if frac.is_empty() || frac.contains('.') {
                bail!("malformed fraction in {input}");
            }
        }
        let Some(unit) = Unit::parse(code) else {
            if code.is_empty() {
                bail!("missing unit, expected one of B, KB, MB, GB");
            }
            bail!("unexpected unit {code}");
        };

        FileSize::new(num.parse()?, unit)
    }
}

impl FileSize {
    fn new(num: f64, unit: Unit) -> Result<Self> {
        let scaled = num * unit.multiplier() as f64;
        // `u64::MAX as f64` rounds up to 2^64, which is already out of range.
        if !(scaled < u64::MAX as f64) {
            bail!("{num}{} is too big to fit into u64", unit.suffix());
        }
        Ok(Self {
            num,
            unit,
            bytes: scaled as u64,
        })
    }

    pub fn to_bytes(&self) -> u64 {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::FileSize;

    fn bytes(input: &str) -> u64 {
        input.parse::<FileSize>().unwrap().to_bytes()
    }

    #[test]
    fn whole_units() {
        assert_eq!(bytes("128B"), 128);
        assert_eq!(bytes("1KB"), 1024);
        assert_eq!(bytes("2GB"), 2_147_483_648);
        assert_eq!(bytes("0b"), 0);
    }

    #[test]
    fn fractions() {
        assert_eq!(bytes("1.5MB"), 1_572_864);
        assert_eq!(bytes("0.5KB"), 512);
    }

    #[test]
    fn fractions_truncate() {
        assert_eq!(bytes("1.0001KB"), 1024);
        assert_eq!(bytes("0.3B"), 0);
        assert_eq!(bytes("2.9B"), 2);
    }

    #[test]
    fn unit_letters_are_case_insensitive() {
        for unit in ["mb", "mB", "Mb", "MB"] {
            assert_eq!(bytes(&format!("3{unit}")), 3 * 1024 * 1024);
        }
        assert_eq!(bytes("1gB"), 1u64 << 30);
    }

    #[test]
    fn rejects_malformed() {
        for input in [
            "", "10XB", "abc", "-5MB", "128", "1.MB", ".5MB", "1.2.3KB", "1 KB", "KB", "1KBB",
            "1e3B", "1TB",
        ] {
            assert!(input.parse::<FileSize>().is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!("17179869184GB".parse::<FileSize>().is_err());
        assert_eq!(bytes("17179869183GB"), 17_179_869_183u64 << 30);
    }

    #[test]
    fn display() {
        assert_eq!("1.5mb".parse::<FileSize>().unwrap().to_string(), "1.5MB");
        assert_eq!("128b".parse::<FileSize>().unwrap().to_string(), "128B");
    }
}
