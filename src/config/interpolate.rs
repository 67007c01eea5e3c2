//! Variable interpolation for strings
//!
//! This module replaces `${var}` placeholders in configuration values such
//! as the listing URL.

use crate::error::{InterpolationError, InterpolationResult};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

/// Interpolate variables in a string
///
/// Values may themselves contain placeholders; expansion repeats until the
/// string is stable. Every placeholder must name a known variable.
pub fn interpolate(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    let re = placeholder();
    let mut result = s.to_string();
    let mut seen = HashSet::new();

    loop {
        let Some(caps) = re.captures(&result) else {
            return Ok(result);
        };
        let var_name = caps[1].to_string();

        if !seen.insert(var_name.clone()) {
            return Err(InterpolationError::RecursiveInterpolation);
        }

        let value = vars
            .get(&var_name)
            .ok_or_else(|| InterpolationError::UndefinedVariable(var_name.clone()))?;

        result = result.replace(&format!("${{{}}}", var_name), value);
    }
}

/// Names of every placeholder in a string, in order of appearance
pub fn placeholders(s: &str) -> Vec<String> {
    placeholder()
        .captures_iter(s)
        .map(|caps| caps[1].to_string())
        .collect()
}
