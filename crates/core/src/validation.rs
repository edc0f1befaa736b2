//! Field formats and input masks.
//!
//! Every input field belongs to one [`FieldKind`]. Each kind maps statically to
//! a format predicate and an input mask, so callers never look validators up
//! by name at runtime.
//!
//! ```
//! use cadastro_core::validation::FieldKind;
//!
//! assert_eq!(FieldKind::Cpf.mask("12345678900"), "123.456.789-00");
//! assert!(FieldKind::PostalCode.validate("cep", "01310-100").is_ok());
//! assert!(FieldKind::Mobile.validate("celular", "(11) 9999-9999").is_err());
//! ```

use core::fmt;

/// Placeholder for a digit inside a format template.
const DIGIT_SLOT: char = '#';

/// The closed set of field kinds with a known format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Brazilian taxpayer id, `NNN.NNN.NNN-NN`.
    Cpf,
    /// Landline number, `(NN) NNNN-NNNN`.
    Phone,
    /// Mobile number, `(NN) NNNNN-NNNN`.
    Mobile,
    /// Brazilian postal code (CEP), `NNNNN-NNN`.
    PostalCode,
    /// Free text that only has to be non-blank.
    Text,
}

impl FieldKind {
    /// Format template for this kind, `#` standing for a digit.
    #[must_use]
    pub const fn template(self) -> Option<&'static str> {
        match self {
            Self::Cpf => Some("###.###.###-##"),
            Self::Phone => Some("(##) ####-####"),
            Self::Mobile => Some("(##) #####-####"),
            Self::PostalCode => Some("#####-###"),
            Self::Text => None,
        }
    }

    /// Number of digits a complete value of this kind holds.
    #[must_use]
    pub fn max_digits(self) -> Option<usize> {
        self.template()
            .map(|template| template.chars().filter(|&c| c == DIGIT_SLOT).count())
    }

    /// Check a value against this kind's format.
    ///
    /// Leading and trailing whitespace is ignored. Blank values are always
    /// rejected with [`FieldError::Required`].
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Required`] for blank input and
    /// [`FieldError::InvalidFormat`] when the value does not match the template.
    pub fn validate(self, field: &'static str, value: &str) -> Result<(), FieldError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(FieldError::Required { field });
        }

        match self.template() {
            Some(template) if !matches_template(value, template) => {
                Err(FieldError::InvalidFormat {
                    field,
                    expected: template,
                })
            }
            _ => Ok(()),
        }
    }

    /// Format the digits found in `input` according to this kind's template.
    ///
    /// Non-digit characters are discarded and extra digits are truncated.
    /// Partial input produces a partial mask (`"1234"` becomes `"123.4"` for a
    /// CPF). [`FieldKind::Text`] values are returned trimmed.
    #[must_use]
    pub fn mask(self, input: &str) -> String {
        let Some(template) = self.template() else {
            return input.trim().to_owned();
        };

        let mut digits = input.chars().filter(char::is_ascii_digit);
        let mut masked = String::with_capacity(template.len());
        let mut pending = String::new();

        for slot in template.chars() {
            if slot == DIGIT_SLOT {
                let Some(digit) = digits.next() else {
                    break;
                };
                masked.push_str(&pending);
                pending.clear();
                masked.push(digit);
            } else {
                pending.push(slot);
            }
        }

        masked
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpf => write!(f, "cpf"),
            Self::Phone => write!(f, "telefone"),
            Self::Mobile => write!(f, "celular"),
            Self::PostalCode => write!(f, "cep"),
            Self::Text => write!(f, "texto"),
        }
    }
}

impl std::str::FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpf" => Ok(Self::Cpf),
            "telefone" => Ok(Self::Phone),
            "celular" => Ok(Self::Mobile),
            "cep" => Ok(Self::PostalCode),
            "texto" => Ok(Self::Text),
            _ => Err(format!("unknown field kind: {s}")),
        }
    }
}

fn matches_template(value: &str, template: &str) -> bool {
    value.chars().count() == template.chars().count()
        && value.chars().zip(template.chars()).all(|(c, slot)| {
            if slot == DIGIT_SLOT {
                c.is_ascii_digit()
            } else {
                c == slot
            }
        })
}

/// A single field that failed validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field was blank.
    #[error("{field} is required")]
    Required {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The field does not match its format.
    #[error("{field} must match {expected}")]
    InvalidFormat {
        /// Name of the offending field.
        field: &'static str,
        /// Expected template, `#` standing for a digit.
        expected: &'static str,
    },
}

impl FieldError {
    /// Name of the field this error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Required { field } | Self::InvalidFormat { field, .. } => field,
        }
    }
}

/// Every field error found in one form, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// The individual field errors.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether the given field failed.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

/// Accumulates field checks for a whole form.
///
/// Unlike `?` on each field, every check runs and all failures are reported
/// together.
#[derive(Debug, Default)]
#[must_use]
pub struct FormValidator {
    errors: Vec<FieldError>,
}

impl FormValidator {
    /// Start validating a form.
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Check one field.
    pub fn field(mut self, name: &'static str, kind: FieldKind, value: &str) -> Self {
        if let Err(e) = kind.validate(name, value) {
            self.errors.push(e);
        }
        self
    }

    /// Record the outcome of a check done elsewhere, such as a typed parse.
    pub fn check<T>(mut self, outcome: &Result<T, FieldError>) -> Self {
        if let Err(e) = outcome {
            self.errors.push(e.clone());
        }
        self
    }

    /// Finish the form.
    ///
    /// # Errors
    ///
    /// Returns every accumulated field error if any check failed.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}
