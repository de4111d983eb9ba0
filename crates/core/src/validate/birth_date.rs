//! Birth date validation in the Brazilian `DD/MM/YYYY` form.

use core::fmt;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`BirthDate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BirthDateError {
    /// The input is not exactly `DD/MM/YYYY`.
    #[error("date must be in DD/MM/YYYY form")]
    BadShape,
    /// The day/month/year do not name a real calendar date.
    #[error("not a valid calendar date")]
    NotACalendarDate,
    /// The year is 1900 or earlier.
    #[error("year must be after 1900")]
    YearTooEarly,
    /// The date is after today.
    #[error("birth date cannot be in the future")]
    InFuture,
}

/// A validated birth date.
///
/// # Examples
///
/// ```
/// use livraria_core::BirthDate;
///
/// let date = BirthDate::parse("15/06/1990").unwrap();
/// assert_eq!(date.to_iso(), "1990-06-15");
///
/// assert!(BirthDate::parse("31/02/2020").is_err()); // February 31st
/// assert!(BirthDate::parse("1990-06-15").is_err()); // wrong shape
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    /// Parse and validate a `DD/MM/YYYY` date against today's date.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is wrong, the date does not exist on
    /// the calendar, the year is 1900 or earlier, or the date lies in the
    /// future.
    pub fn parse(raw: &str) -> Result<Self, BirthDateError> {
        Self::parse_with_today(raw, Local::now().date_naive())
    }

    /// [`parse`](Self::parse) with an explicit "today", so the future check
    /// is deterministic under test.
    pub fn parse_with_today(raw: &str, today: NaiveDate) -> Result<Self, BirthDateError> {
        let (dd, mm, yyyy) = split_shape(raw).ok_or(BirthDateError::BadShape)?;

        // from_ymd_opt rejects day 31 in a 30-day month, February 30th, etc.
        let date =
            NaiveDate::from_ymd_opt(yyyy, mm, dd).ok_or(BirthDateError::NotACalendarDate)?;

        if date.year() <= 1900 {
            return Err(BirthDateError::YearTooEarly);
        }
        if date > today {
            return Err(BirthDateError::InFuture);
        }

        Ok(Self(date))
    }

    /// The underlying calendar date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// ISO `YYYY-MM-DD` form, as stored in `usuarios.data_nascimento`.
    #[must_use]
    pub fn to_iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d/%m/%Y"))
    }
}

/// Split `DD/MM/YYYY` into its numeric fields, requiring the exact shape.
fn split_shape(raw: &str) -> Option<(u32, u32, i32)> {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return None;
    }

    let dd: u32 = all_digits(&raw[0..2])?;
    let mm: u32 = all_digits(&raw[3..5])?;
    let yyyy: i32 = all_digits(&raw[6..10])?;
    Some((dd, mm, yyyy))
}

fn all_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}
