//! Variable interpolation for strings
//!
//! This module handles parsing and replacing variables in strings using the ${var} syntax.
//! Settings values go through [`interpolate`], which reads the process
//! environment. Generated files go through [`render`], which only sees the
//! variables it is given and rejects anything left undefined.

use crate::error::{TemplateError, TemplateResult};
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"))
}

/// Expand `${VAR}` references from the process environment
///
/// Each reference is expanded on its own, so a name may appear more than
/// once. Values are inserted verbatim. Unset variables are left as written.
pub fn interpolate(s: &str) -> String {
    var_pattern()
        .replace_all(s, |caps: &regex::Captures| {
            env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Render a template against exactly the given variables
///
/// Values are inserted verbatim (no nested expansion, no environment lookup).
/// Any placeholder without a value is an error.
pub fn render(template: &str, vars: &HashMap<String, String>) -> TemplateResult<String> {
    let re = var_pattern();

    if let Some(missing) = re
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .find(|name| !vars.contains_key(name))
    {
        return Err(TemplateError::UndefinedVariable(missing));
    }

    Ok(re
        .replace_all(template, |caps: &regex::Captures| vars[&caps[1]].clone())
        .into_owned())
}

/// Render a YAML template and check that the result parses
pub fn render_yaml(
    name: &str,
    template: &str,
    vars: &HashMap<String, String>,
) -> TemplateResult<String> {
    let rendered = render(template, vars)?;
    serde_yaml::from_str::<serde_yaml::Value>(&rendered).map_err(|e| {
        TemplateError::MalformedYaml {
            name: name.to_string(),
            error: e.to_string(),
        }
    })?;
    Ok(rendered)
}

/// Format a list of strings as a YAML flow sequence
pub fn yaml_list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}
