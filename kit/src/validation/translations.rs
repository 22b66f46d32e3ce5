//! Default pt_BR message table.
//!
//! Keys are rule codes, optionally suffixed with the parameter shape the
//! rule was declared with (`length.min_max`, `range.exclusive_min`, ...).
//! Templates use `{field}` plus the rule's parameter names as placeholders.

use std::collections::HashMap;

use validator::ValidationError;

/// Template used when neither a translation nor a rule message exists.
pub const FALLBACK_TEMPLATE: &str = "{field} não é válido";

pub(crate) const DEFAULT_TRANSLATIONS: &[(&str, &str)] = &[
    ("required", "{field} é um campo obrigatório"),
    ("email", "{field} deve ser um endereço de e-mail válido"),
    ("url", "{field} deve ser uma URL válida"),
    ("length.equal", "{field} deve ter {equal} caractere(s)"),
    (
        "length.min_max",
        "{field} deve ter entre {min} e {max} caractere(s)",
    ),
    ("length.min", "{field} deve ter pelo menos {min} caractere(s)"),
    ("length.max", "{field} deve ter no máximo {max} caractere(s)"),
    ("range.min_max", "{field} deve estar entre {min} e {max}"),
    ("range.min", "{field} deve ser {min} ou maior"),
    ("range.max", "{field} deve ser {max} ou menor"),
    ("range.exclusive_min", "{field} deve ser maior que {exclusive_min}"),
    ("range.exclusive_max", "{field} deve ser menor que {exclusive_max}"),
    ("must_match", "{field} deve ser igual a {other}"),
    ("contains", "{field} deve conter o texto '{pattern}'"),
    ("does_not_contain", "{field} não deve conter o texto '{pattern}'"),
    ("regex", "{field} não possui um formato válido"),
    ("ip", "{field} deve ser um endereço de IP válido"),
    ("ipv4", "{field} deve ser um endereço IPv4 válido"),
    ("ipv6", "{field} deve ser um endereço IPv6 válido"),
    (
        "credit_card",
        "{field} deve ser um número de cartão de crédito válido",
    ),
    (
        "non_control_character",
        "{field} não deve conter caracteres de controle",
    ),
];

/// Lookup key for `error`, refined by which bounds were declared.
pub(crate) fn translation_key(error: &ValidationError) -> String {
    let has = |name: &str| error.params.contains_key(name);
    let shape = match &*error.code {
        "length" if has("equal") => Some("equal"),
        "length" | "range" if has("min") && has("max") => Some("min_max"),
        "length" | "range" if has("min") => Some("min"),
        "length" | "range" if has("max") => Some("max"),
        "range" if has("exclusive_min") => Some("exclusive_min"),
        "range" if has("exclusive_max") => Some("exclusive_max"),
        _ => None,
    };
    match shape {
        Some(shape) => format!("{}.{shape}", error.code),
        None => error.code.to_string(),
    }
}

/// Fill `{field}` and `{param}` placeholders in `template`.
pub(crate) fn render(template: &str, field: &str, error: &ValidationError) -> String {
    let mut out = template.replace("{field}", field);
    for (name, value) in &error.params {
        let name = name.to_string();
        if name == "value" {
            continue;
        }
        let placeholder = format!("{{{name}}}");
        if out.contains(&placeholder) {
            let rendered = match value {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            out = out.replace(&placeholder, &rendered);
        }
    }
    out
}

pub(crate) fn default_table() -> HashMap<String, String> {
    DEFAULT_TRANSLATIONS
        .iter()
        .map(|(key, template)| ((*key).to_owned(), (*template).to_owned()))
        .collect()
}
