//! CPF (Brazilian taxpayer id) type.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::{FieldError, FieldKind};

/// A customer's CPF, always stored in the `NNN.NNN.NNN-NN` format.
///
/// [`Cpf::parse`] accepts either the formatted value or its 11 raw digits and
/// normalizes to the formatted one. Deserialization trusts its input so that
/// snapshot documents load verbatim.
///
/// ## Examples
///
/// ```
/// use cadastro_core::Cpf;
///
/// let cpf = Cpf::parse("12345678900").unwrap();
/// assert_eq!(cpf.as_str(), "123.456.789-00");
///
/// assert!(Cpf::parse("123.456.789-00").is_ok());
/// assert!(Cpf::parse("1234").is_err());
/// assert!(Cpf::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Cpf(String);

impl Cpf {
    const FIELD: &'static str = "cpf";

    /// Parse a `Cpf` from user input.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Required`] for blank input and
    /// [`FieldError::InvalidFormat`] when the input is neither a formatted CPF
    /// nor exactly 11 digits.
    pub fn parse(s: &str) -> Result<Self, FieldError> {
        let s = s.trim();
        let candidate = if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            FieldKind::Cpf.mask(s)
        } else {
            s.to_owned()
        };

        FieldKind::Cpf.validate(Self::FIELD, &candidate)?;
        Ok(Self(candidate))
    }

    /// Returns the CPF as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Cpf` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The 11 digits without punctuation.
    #[must_use]
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Cpf {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Cpf {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
