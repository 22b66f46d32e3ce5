//! Tests for rule translation and field naming.

use super::*;
use rstest::{fixture, rstest};
use validator::Validate;

#[derive(Debug, Validate)]
struct SignUp {
    #[validate(custom(function = "crate::validation::not_blank"))]
    name: String,
    #[validate(email)]
    email: String,
}

impl FieldLabels for SignUp {
    fn label(field: &str) -> Option<&'static str> {
        match field {
            "name" => Some("Nome"),
            _ => None,
        }
    }
}

#[derive(Debug, Validate)]
struct Address {
    #[validate(length(min = 3))]
    street: String,
}

#[derive(Debug, Validate)]
struct Order {
    #[validate(nested)]
    address: Address,
    #[validate(nested)]
    lines: Vec<Line>,
    #[validate(required)]
    reference: Option<String>,
}

#[derive(Debug, Validate)]
struct Line {
    #[validate(length(min = 1, max = 20))]
    sku: String,
}

#[derive(Debug, Validate)]
struct Contact {
    #[validate(url)]
    site: String,
    #[validate(length(equal = 2))]
    state: String,
}

#[fixture]
fn checker() -> Validator {
    Validator::new()
}

fn invalid_sign_up() -> SignUp {
    SignUp {
        name: String::new(),
        email: "invalid".to_owned(),
    }
}

#[rstest]
fn valid_input_passes(checker: Validator) {
    let input = SignUp {
        name: "Ana".to_owned(),
        email: "ana@example.com".to_owned(),
    };
    assert!(checker.validate(&input).is_ok());
}

#[rstest]
fn each_failing_field_yields_one_detail(checker: Validator) {
    let errors = checker
        .validate(&invalid_sign_up())
        .expect_err("name and email fail");
    assert_eq!(errors.message(), DEFAULT_VALIDATION_MESSAGE);
    assert_eq!(
        errors.validations(),
        [
            "email deve ser um endereço de e-mail válido",
            "name é um campo obrigatório",
        ]
    );
}

#[rstest]
fn labels_replace_field_names(checker: Validator) {
    let errors = checker
        .validate_labelled(&invalid_sign_up())
        .expect_err("name and email fail");
    assert_eq!(
        errors.validations(),
        [
            "email deve ser um endereço de e-mail válido",
            "Nome é um campo obrigatório",
        ]
    );
}

#[rstest]
fn nested_failures_report_leaf_names(checker: Validator) {
    let order = Order {
        address: Address {
            street: "ab".to_owned(),
        },
        lines: vec![
            Line {
                sku: "ok".to_owned(),
            },
            Line { sku: String::new() },
        ],
        reference: None,
    };
    let errors = checker.validate(&order).expect_err("three fields fail");
    assert_eq!(
        errors.validations(),
        [
            "reference é um campo obrigatório",
            "sku deve ter entre 1 e 20 caractere(s)",
            "street deve ter pelo menos 3 caractere(s)",
        ]
    );
}

#[rstest]
fn parameters_are_rendered(checker: Validator) {
    let contact = Contact {
        site: "not a url".to_owned(),
        state: "SPX".to_owned(),
    };
    let errors = checker.validate(&contact).expect_err("both fields fail");
    assert_eq!(
        errors.validations(),
        [
            "site deve ser uma URL válida",
            "state deve ter 2 caractere(s)",
        ]
    );
}

#[rstest]
fn translations_can_be_overridden() {
    let validator = Validator::new().with_translation("email", "{field} inválido");
    let errors = validator
        .validate(&invalid_sign_up())
        .expect_err("name and email fail");
    assert_eq!(errors.validations()[0], "email inválido");
}

#[rstest]
fn unknown_rules_fall_back_to_generic_message() {
    let validator = Validator {
        translations: HashMap::new(),
    };
    let errors = validator
        .validate(&invalid_sign_up())
        .expect_err("name and email fail");
    assert_eq!(
        errors.validations(),
        ["email não é válido", "name não é válido"]
    );
}

/// Rule set that fails without naming any field.
struct Opaque;

impl Validate for Opaque {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        Err(validator::ValidationErrors::new())
    }
}

#[rstest]
fn failures_without_fields_use_the_unknown_summary(checker: Validator) {
    let errors = checker.validate(&Opaque).expect_err("rule engine failed");
    assert_eq!(errors.message(), UNKNOWN_VALIDATION_MESSAGE);
    assert!(errors.has_no_validations());
}

#[rstest]
#[case::blank("   ", false)]
#[case::empty("", false)]
#[case::text("x", true)]
fn not_blank_rejects_whitespace(#[case] value: &str, #[case] ok: bool) {
    let result = not_blank(value);
    assert_eq!(result.is_ok(), ok);
    if let Err(error) = result {
        assert_eq!(error.code, "required");
    }
}
