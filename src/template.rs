//! Template interpolation for header strings and payload templates
//!
//! Handles `{{ variable }}` interpolation when building requests, so callers
//! can keep one payload template per paginated endpoint and re-render it with
//! the current cursor embedded (`{{ cursor }}`), and keep secrets out of
//! literal header strings (`{{ creds.hubspot_token }}`).

use crate::error::{Error, Result};
use crate::types::JsonValue;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template regex is valid")
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Credential values (`{{ creds.* }}`)
    pub creds: JsonValue,
    /// Current pagination cursor (`{{ cursor }}`)
    pub cursor: JsonValue,
    /// Additional caller variables (`{{ vars.* }}`)
    pub vars: JsonValue,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with credential values
    pub fn with_creds(creds: JsonValue) -> Self {
        Self {
            creds,
            ..Default::default()
        }
    }

    /// Set credential values
    pub fn set_creds(&mut self, creds: JsonValue) -> &mut Self {
        self.creds = creds;
        self
    }

    /// Set the current cursor token
    pub fn set_cursor(&mut self, cursor: impl Into<String>) -> &mut Self {
        self.cursor = JsonValue::String(cursor.into());
        self
    }

    /// Set additional variables
    pub fn set_vars(&mut self, vars: JsonValue) -> &mut Self {
        self.vars = vars;
        self
    }

    /// Get a value by path (e.g., "creds.api_key")
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.is_empty() {
            return None;
        }

        let root = match parts[0] {
            "creds" => &self.creds,
            "cursor" => &self.cursor,
            "vars" => &self.vars,
            // Bare names resolve against vars first, then creds
            _ => {
                if let Some(val) = get_nested_value(&self.vars, &parts) {
                    return Some(val);
                }
                return get_nested_value(&self.creds, &parts);
            }
        };

        if parts.len() == 1 {
            Some(root)
        } else {
            get_nested_value(root, &parts[1..])
        }
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let mut current = value;
    for part in path {
        match current {
            JsonValue::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
///
/// Fails with `UndefinedVariable` when a referenced variable is absent or
/// null; a template that silently renders an empty token would otherwise
/// produce a syntactically valid but wrong request.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut result = template.to_string();

    for cap in TEMPLATE_REGEX.captures_iter(template) {
        let full_match = cap
            .get(0)
            .ok_or_else(|| Error::template("capture without match"))?
            .as_str();
        let var_path = cap
            .get(1)
            .ok_or_else(|| Error::template("capture without variable group"))?
            .as_str();

        let value = match ctx.get(var_path) {
            Some(v) if !v.is_null() => value_to_string(v)?,
            _ => return Err(Error::undefined_var(var_path)),
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

/// Convert a JSON value to its template rendering
fn value_to_string(value: &JsonValue) -> Result<String> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        other => serde_json::to_string(other).map_err(Error::from),
    }
}
