// Ordered-fallback field lookup.
//
// Backend payloads name the same logical attribute differently per platform
// (`author` vs `username`, `post_url` vs `video_url`, ...). Every extraction
// site goes through a FieldChain so the priority order for an attribute is
// declared once, in the adapter table, instead of being re-typed at each use.

use serde_json::Value;

/// A priority-ordered list of JSON field names for one logical attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChain(pub &'static [&'static str]);

impl FieldChain {
    pub const fn new(fields: &'static [&'static str]) -> Self {
        Self(fields)
    }

    /// First non-empty string value among the chain's fields.
    ///
    /// Numbers are stringified (some backends emit numeric ids or epoch
    /// timestamps); blank strings, nulls, arrays and objects are skipped.
    pub fn first_str(&self, item: &Value) -> Option<String> {
        self.0.iter().find_map(|field| match item.get(*field)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// First defined non-negative integer among the chain's fields.
    ///
    /// "Defined" means present and numeric: a field holding `0` wins over a
    /// later field holding `9`. Integral floats and numeric strings are
    /// accepted, anything else is skipped.
    pub fn first_u64(&self, item: &Value) -> Option<u64> {
        self.0.iter().find_map(|field| value_to_u64(item.get(*field)?))
    }
}

fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a string array field, dropping non-string entries.
pub fn string_list(item: &Value, field: &str) -> Vec<String> {
    item.get(field)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
