//! Struct validation with pt_BR messages.
//!
//! Rules are declared with the `validator` derive. [`Validator`] runs them
//! and turns every failure into a readable sentence keyed by the leaf field
//! name, so nested structs and lists report `street` rather than
//! `address.street`.
//!
//! ```
//! use service_kit::validation::{FieldLabels, Validator};
//! use validator::Validate;
//!
//! #[derive(Validate)]
//! struct SignUp {
//!     #[validate(custom(function = "service_kit::validation::not_blank"))]
//!     name: String,
//!     #[validate(email)]
//!     email: String,
//! }
//!
//! impl FieldLabels for SignUp {
//!     fn label(field: &str) -> Option<&'static str> {
//!         match field {
//!             "name" => Some("Nome"),
//!             "email" => Some("E-mail"),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let input = SignUp { name: String::new(), email: "invalid".into() };
//! let errors = Validator::default()
//!     .validate_labelled(&input)
//!     .expect_err("both fields fail");
//! assert_eq!(
//!     errors.validations(),
//!     ["E-mail deve ser um endereço de e-mail válido", "Nome é um campo obrigatório"]
//! );
//! ```

mod translations;

use std::collections::HashMap;

use validator::{Validate, ValidationError, ValidationErrorsKind};

use crate::domain::{DEFAULT_VALIDATION_MESSAGE, ValidationErrors};

pub use self::translations::FALLBACK_TEMPLATE;

/// Summary used when the rule engine fails without reporting any field.
pub const UNKNOWN_VALIDATION_MESSAGE: &str = "Unknown validation error";

/// Display names for a type's fields.
///
/// Fields without a label are reported by their declared name.
pub trait FieldLabels {
    /// Label for `field`, if it has one.
    fn label(field: &str) -> Option<&'static str>;
}

/// Runs derive-declared rules and translates their failures.
///
/// Cheap to clone; build one at startup and share it.
#[derive(Debug, Clone)]
pub struct Validator {
    translations: HashMap<String, String>,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            translations: translations::default_table(),
        }
    }
}

impl Validator {
    /// Validator with the default pt_BR table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override or add the template for a rule key such as `email` or
    /// `length.min`.
    #[must_use]
    pub fn with_translation(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.translations.insert(key.into(), template.into());
        self
    }

    /// Validate `value`, reporting fields by their declared names.
    pub fn validate<T: Validate>(&self, value: &T) -> Result<(), ValidationErrors> {
        self.run(value, |_| None)
    }

    /// Validate `value`, reporting fields by their [`FieldLabels`] names.
    pub fn validate_labelled<T>(&self, value: &T) -> Result<(), ValidationErrors>
    where
        T: Validate + FieldLabels,
    {
        self.run(value, T::label)
    }

    fn run<T, L>(&self, value: &T, label: L) -> Result<(), ValidationErrors>
    where
        T: Validate,
        L: Fn(&str) -> Option<&'static str>,
    {
        let Err(report) = value.validate() else {
            return Ok(());
        };

        let mut failures = Vec::new();
        collect_leaves(&report, &mut failures);
        if failures.is_empty() {
            return Err(ValidationErrors::new(UNKNOWN_VALIDATION_MESSAGE));
        }
        failures.sort_by(|a, b| {
            a.field
                .cmp(&b.field)
                .then_with(|| a.error.code.cmp(&b.error.code))
        });

        let messages = failures.into_iter().map(|failure| {
            let name = label(&failure.field).unwrap_or(failure.field.as_str());
            self.translate(name, failure.error)
        });
        Err(ValidationErrors::with_validations(
            DEFAULT_VALIDATION_MESSAGE,
            messages.collect::<Vec<_>>(),
        ))
    }

    fn translate(&self, field: &str, error: &ValidationError) -> String {
        let key = translations::translation_key(error);
        let template = self
            .translations
            .get(&key)
            .or_else(|| self.translations.get(&*error.code));
        match (template, &error.message) {
            (Some(template), _) => translations::render(template, field, error),
            (None, Some(message)) => message.to_string(),
            (None, None) => translations::render(FALLBACK_TEMPLATE, field, error),
        }
    }
}

/// Rejects strings that are empty or whitespace only, with code `required`.
///
/// Use through `#[validate(custom(function = "service_kit::validation::not_blank"))]`.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("required"))
    } else {
        Ok(())
    }
}

struct LeafFailure<'a> {
    field: String,
    error: &'a ValidationError,
}

fn collect_leaves<'a>(report: &'a validator::ValidationErrors, out: &mut Vec<LeafFailure<'a>>) {
    for (field, kind) in report.errors() {
        match kind {
            ValidationErrorsKind::Field(errors) => {
                out.extend(errors.iter().map(|error| LeafFailure {
                    field: field.to_string(),
                    error,
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect_leaves(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_leaves(nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
