//! Query-parameter builder for the Technitium HTTP API.
//!
//! Every request parameter travels in the URL query string. Optional values
//! are only emitted when present: `None` means "leave the appliance alone",
//! while `Some("")` and `Some(vec![])` are sent and clear the field.
use std::fmt::Display;

/// Ordered list of `(key, value)` pairs handed to `reqwest::RequestBuilder::query`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Params(Vec<(&'static str, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter that is always sent.
    pub fn push(&mut self, key: &'static str, value: impl Display) -> &mut Self {
        self.0.push((key, value.to_string()));
        self
    }

    /// Append a parameter only when a value is present.
    pub fn push_opt<T: Display>(&mut self, key: &'static str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Append a flat list joined with `,`.
    pub fn push_list(&mut self, key: &'static str, values: Option<&[String]>) -> &mut Self {
        if let Some(values) = values {
            self.push(key, values.join(","));
        }
        self
    }

    /// Append a nested list: each entry contributes its sub-fields in order and
    /// everything is joined with `|`.
    pub fn push_rows<T>(
        &mut self,
        key: &'static str,
        rows: Option<&[T]>,
        fields: impl Fn(&T) -> Vec<String>,
    ) -> &mut Self {
        if let Some(rows) = rows {
            self.push(key, encode_rows(rows, fields));
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(&'static str, String)] {
        &self.0
    }
}

/// Two-level `|` encoding used for exclusions, static routes, vendor info,
/// generic options and reserved leases.
pub fn encode_rows<T>(rows: &[T], fields: impl Fn(&T) -> Vec<String>) -> String {
    rows.iter()
        .map(|row| fields(row).join("|"))
        .collect::<Vec<_>>()
        .join("|")
}

/// Emit `key=current` and, only when the desired value differs,
/// `new_key=desired`. Used by every rename-capable update.
pub fn push_renamed(
    params: &mut Params,
    key: &'static str,
    new_key: &'static str,
    current: impl Display,
    desired: impl Display,
) {
    let current = current.to_string();
    let desired = desired.to_string();
    let changed = current != desired;
    params.push(key, current);
    if changed {
        params.push(new_key, desired);
    }
}
