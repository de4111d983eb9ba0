//! CPF (Brazilian taxpayer number) validation.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Cpf`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CpfError {
    /// The input contains no digits.
    #[error("CPF cannot be empty")]
    Empty,
    /// The input does not have exactly 11 digits.
    #[error("CPF must have 11 digits, got {0}")]
    WrongLength(usize),
    /// All 11 digits are identical (e.g. 111.111.111-11), which passes the
    /// checksum but is not a valid assignment.
    #[error("CPF cannot be a repeated digit sequence")]
    RepeatedDigits,
    /// The two verification digits do not match the weighted checksum.
    #[error("CPF verification digits do not match")]
    BadChecksum,
}

/// A validated CPF, stored as its 11 bare digits.
///
/// Parsing accepts masked (`123.456.789-09`) or unmasked input; everything
/// that is not an ASCII digit is stripped first.
///
/// # Examples
///
/// ```
/// use livraria_core::Cpf;
///
/// let cpf = Cpf::parse("529.982.247-25").unwrap();
/// assert_eq!(cpf.as_str(), "52998224725");
/// assert_eq!(cpf.formatted(), "529.982.247-25");
///
/// assert!(Cpf::parse("111.111.111-11").is_err()); // repeated digits
/// assert!(Cpf::parse("123").is_err());            // too short
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cpf(String);

impl Cpf {
    /// Parse and validate a CPF.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit count is wrong, the digits are all
    /// identical, or either verification digit fails the mod-11 checksum.
    pub fn parse(raw: &str) -> Result<Self, CpfError> {
        let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();

        if digits.is_empty() {
            return Err(CpfError::Empty);
        }
        if digits.len() != 11 {
            return Err(CpfError::WrongLength(digits.len()));
        }
        if digits.iter().all(|&d| d == digits[0]) {
            return Err(CpfError::RepeatedDigits);
        }

        if check_digit(&digits, 9) != digits[9] || check_digit(&digits, 10) != digits[10] {
            return Err(CpfError::BadChecksum);
        }

        Ok(Self(digits.iter().map(ToString::to_string).collect()))
    }

    /// The 11 bare digits, as stored in the `usuarios.cpf` column.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The display form `###.###.###-##`.
    #[must_use]
    pub fn formatted(&self) -> String {
        format!(
            "{}.{}.{}-{}",
            &self.0[0..3],
            &self.0[3..6],
            &self.0[6..9],
            &self.0[9..11]
        )
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl std::str::FromStr for Cpf {
    type Err = CpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Compute one verification digit over the first `len` digits.
///
/// Weighted sum with weights descending from `len + 1` to 2, then
/// `(sum * 10) % 11`, with a remainder of 10 mapping to 0.
fn check_digit(digits: &[u32], len: usize) -> u32 {
    let sum: u32 = digits
        .iter()
        .take(len)
        .enumerate()
        .map(|(i, &d)| d * (len as u32 + 1 - i as u32))
        .sum();
    let rem = (sum * 10) % 11;
    if rem == 10 { 0 } else { rem }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // 529.982.247-25 is the canonical valid example CPF
    const VALID: &str = "52998224725";

    #[test]
    fn test_valid_cpf() {
        assert!(Cpf::parse(VALID).is_ok());
        assert!(Cpf::parse("529.982.247-25").is_ok());
    }

    #[test]
    fn test_empty() {
        assert_eq!(Cpf::parse(""), Err(CpfError::Empty));
        assert_eq!(Cpf::parse("abc-def"), Err(CpfError::Empty));
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(Cpf::parse("1234567890"), Err(CpfError::WrongLength(10)));
        assert_eq!(Cpf::parse("123456789012"), Err(CpfError::WrongLength(12)));
    }

    #[test]
    fn test_repeated_digits() {
        assert_eq!(Cpf::parse("111.111.111-11"), Err(CpfError::RepeatedDigits));
        assert_eq!(Cpf::parse("00000000000"), Err(CpfError::RepeatedDigits));
    }

    #[test]
    fn test_bad_checksum() {
        // Flip the last digit of a valid CPF
        assert_eq!(Cpf::parse("52998224726"), Err(CpfError::BadChecksum));
        // Flip the first verification digit
        assert_eq!(Cpf::parse("52998224735"), Err(CpfError::BadChecksum));
    }

    #[test]
    fn test_formatted() {
        let cpf = Cpf::parse(VALID).unwrap();
        assert_eq!(cpf.formatted(), "529.982.247-25");
        assert_eq!(cpf.to_string(), "529.982.247-25");
        assert_eq!(cpf.as_str(), VALID);
    }
}
