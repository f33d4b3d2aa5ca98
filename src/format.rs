//! Best-effort template rendering over JSON values.
//!
//! Templates use `{field}` placeholders with optional nested lookups and
//! format specifiers:
//!
//! ```text
//! {artist[name]} - {title}        nested object lookup
//! {performer.name}                same, dotted form
//! {tracks_count:d}                integer
//! {maximum_sampling_rate:.1f}     fixed precision float
//! {duration:hms}                  seconds as HH:MM:SS
//! {title:upper} / {title:lower}   case conversion
//! ```
//!
//! A field that is absent, `null` or empty renders as the missing placeholder,
//! and a specifier that does not fit the value renders as the bad-format
//! placeholder. Rendering never fails.

use serde_json::Value;

use crate::utils;

pub const PLACEHOLDER: &str = "n/a";

#[derive(Debug, Clone)]
pub struct PartialFormatter {
    missing: String,
    bad_format: String,
}

impl Default for PartialFormatter {
    fn default() -> Self {
        Self::new(PLACEHOLDER, PLACEHOLDER)
    }
}

impl PartialFormatter {
    pub fn new(missing: &str, bad_format: &str) -> Self {
        Self {
            missing: missing.to_string(),
            bad_format: bad_format.to_string(),
        }
    }

    pub fn render(&self, template: &str, data: &Value) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") {
                out.push('{');
                rest = &tail[2..];
            } else if tail.starts_with("}}") {
                out.push('}');
                rest = &tail[2..];
            } else if tail.starts_with('}') {
                out.push('}');
                rest = &tail[1..];
            } else if let Some(end) = tail.find('}') {
                out.push_str(&self.render_field(&tail[1..end], data));
                rest = &tail[end + 1..];
            } else {
                // unterminated field, keep it literally
                out.push_str(tail);
                rest = "";
            }
        }

        out.push_str(rest);
        out
    }

    fn render_field(&self, field: &str, data: &Value) -> String {
        let (path, spec) = match field.split_once(':') {
            Some((path, spec)) => (path.trim(), spec.trim()),
            None => (field.trim(), ""),
        };

        match lookup(data, path) {
            Some(value) if !is_missing(value) => self.apply_spec(value, spec),
            _ => self.missing.clone(),
        }
    }

    fn apply_spec(&self, value: &Value, spec: &str) -> String {
        let rendered = match spec {
            "" | "s" => Some(plain(value)),
            "d" => value
                .as_i64()
                .map(|n| n.to_string())
                .or_else(|| value.as_u64().map(|n| n.to_string())),
            "hms" => value.as_u64().map(utils::format_duration),
            "upper" => value.as_str().map(str::to_uppercase),
            "lower" => value.as_str().map(str::to_lowercase),
            _ => precision(spec).and_then(|digits| {
                value
                    .as_f64()
                    .filter(|_| value.is_number())
                    .map(|f| format!("{:.*}", digits, f))
            }),
        };

        rendered.unwrap_or_else(|| self.bad_format.clone())
    }
}

/// Renders `template` against `data` with the default placeholders.
pub fn render(template: &str, data: &Value) -> String {
    PartialFormatter::default().render(template, data)
}

/// Resolves `a[b][0]` or `a.b.0` style paths.
fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let keys = path
        .split(['[', ']', '.'])
        .map(str::trim)
        .filter(|k| !k.is_empty());

    let mut current = data;
    for key in keys {
        current = match current {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn precision(spec: &str) -> Option<usize> {
    spec.strip_prefix('.')?.strip_suffix('f')?.parse().ok()
}
