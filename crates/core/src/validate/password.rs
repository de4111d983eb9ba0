//! Password strength measurement.

use serde::{Deserialize, Serialize};

/// The result of measuring a candidate password.
///
/// Four independent checks, each worth one point. "Good enough to submit"
/// is the length requirement plus at least two of the other three - the
/// same gate the registration screen uses to enable its button.
///
/// # Examples
///
/// ```
/// use livraria_core::PasswordStrength;
///
/// let s = PasswordStrength::measure("Abcdefg1");
/// assert_eq!(s.score(), 3); // length + uppercase + digit
/// assert!(s.is_acceptable());
///
/// assert!(!PasswordStrength::measure("abcdefgh").is_acceptable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordStrength {
    /// At least 8 characters.
    pub length: bool,
    /// Contains an ASCII uppercase letter.
    pub uppercase: bool,
    /// Contains an ASCII digit.
    pub digit: bool,
    /// Contains a character that is not an ASCII letter or digit.
    pub symbol: bool,
}

impl PasswordStrength {
    /// Measure a candidate password.
    #[must_use]
    pub fn measure(password: &str) -> Self {
        Self {
            length: password.chars().count() >= 8,
            uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            digit: password.chars().any(|c| c.is_ascii_digit()),
            symbol: password.chars().any(|c| !c.is_ascii_alphanumeric()),
        }
    }

    /// Number of satisfied requirements, 0 to 4.
    #[must_use]
    pub const fn score(&self) -> u8 {
        self.length as u8 + self.uppercase as u8 + self.digit as u8 + self.symbol as u8
    }

    /// Whether the password clears the submission gate: the length check
    /// plus at least two of uppercase/digit/symbol.
    #[must_use]
    pub const fn is_acceptable(&self) -> bool {
        let extras = self.uppercase as u8 + self.digit as u8 + self.symbol as u8;
        self.length && extras >= 2
    }

    /// User-facing strength label for the score.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self.score() {
            0 => "Muito fraca",
            1 => "Fraca",
            2 => "Média",
            3 => "Forte",
            _ => "Muito forte",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_trivial() {
        let s = PasswordStrength::measure("abc");
        assert_eq!(s.score(), 0);
        assert!(!s.is_acceptable());
        assert_eq!(s.label(), "Muito fraca");
    }

    #[test]
    fn test_length_only_is_not_enough() {
        let s = PasswordStrength::measure("abcdefgh");
        assert_eq!(s.score(), 1);
        assert!(!s.is_acceptable());
    }

    #[test]
    fn test_length_plus_two_extras() {
        let s = PasswordStrength::measure("Abcdefg1");
        assert_eq!(s.score(), 3);
        assert!(s.is_acceptable());
        assert_eq!(s.label(), "Forte");
    }

    #[test]
    fn test_all_four() {
        let s = PasswordStrength::measure("Abcdef1!");
        assert_eq!(s.score(), 4);
        assert!(s.is_acceptable());
        assert_eq!(s.label(), "Muito forte");
    }

    #[test]
    fn test_extras_without_length() {
        // Strong character mix but too short
        let s = PasswordStrength::measure("Ab1!");
        assert_eq!(s.score(), 3);
        assert!(!s.is_acceptable());
    }

    #[test]
    fn test_non_ascii_counts_as_symbol() {
        let s = PasswordStrength::measure("abcdefgá");
        assert!(s.symbol);
    }
}
