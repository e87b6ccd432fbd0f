//! Variable interpolation for command templates
//!
//! Tool commands are written with `${var}` placeholders. Substitution is a
//! single pass: a substituted value is never scanned again, so file names
//! that happen to contain `${` stay literal.

use crate::error::{InterpolationError, InterpolationResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z0-9_.\-]+)\}").expect("placeholder regex"))
}

/// Interpolate variables in a string, leaving unknown placeholders untouched
pub fn interpolate(s: &str, vars: &BTreeMap<String, String>) -> String {
    placeholder()
        .replace_all(s, |caps: &regex::Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Interpolate with strict mode - errors on undefined variables
pub fn interpolate_strict(
    s: &str,
    vars: &BTreeMap<String, String>,
) -> InterpolationResult<String> {
    if let Some(missing) = placeholders(s).into_iter().find(|name| !vars.contains_key(name)) {
        return Err(InterpolationError::UndefinedVariable(missing));
    }
    Ok(interpolate(s, vars))
}

/// Names of all placeholders in a template, in order of appearance
pub fn placeholders(s: &str) -> Vec<String> {
    placeholder()
        .captures_iter(s)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Quote a value for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
