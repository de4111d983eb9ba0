//! Form validators.
//!
//! Each validator is a parse-style newtype: invalid input never produces a
//! value, so downstream code can take a `Cpf` or `BirthDate` and stop
//! re-checking. Password strength is the exception - it is a measurement,
//! not a parse.

pub mod birth_date;
pub mod cpf;
pub mod password;

pub use birth_date::{BirthDate, BirthDateError};
pub use cpf::{Cpf, CpfError};
pub use password::PasswordStrength;
