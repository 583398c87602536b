//! Field formatters.
//!
//! A [`FormatterRegistry`] maps field names to pure functions that turn a raw
//! [`FieldValue`] into display text. Fields without a registered formatter
//! display their natural text. Registries are built once in `main` and
//! handed to commands by reference.

use std::collections::HashMap;

use strato_proto::{FieldValue, Resource};

use crate::output::ShowOutput;

/// A pure, total field formatter.
pub type Formatter = fn(&FieldValue) -> String;

/// Field name to formatter lookup.
#[derive(Debug, Clone, Default)]
pub struct FormatterRegistry {
    formatters: HashMap<&'static str, Formatter>,
}

impl FormatterRegistry {
    /// A registry with no formatters; every field passes through.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Formatters for router fields.
    #[must_use]
    pub fn routers() -> Self {
        Self::empty()
            .with("admin_state_up", format_admin_state)
            .with("external_gateway_info", format_json)
    }

    /// Register a formatter for `field`.
    #[must_use]
    pub fn with(mut self, field: &'static str, formatter: Formatter) -> Self {
        self.formatters.insert(field, formatter);
        self
    }

    /// Format `value` as displayed under `field`.
    #[must_use]
    pub fn format(&self, field: &str, value: &FieldValue) -> String {
        self.formatters
            .get(field)
            .map_or_else(|| value.to_string(), |formatter| formatter(value))
    }

    /// Format `fields` of `resource` into a display row, in order.
    ///
    /// A field the resource does not carry displays as an empty string.
    #[must_use]
    pub fn row(&self, resource: &Resource, fields: &[&str]) -> Vec<String> {
        fields
            .iter()
            .map(|field| {
                resource
                    .get(field)
                    .map_or_else(String::new, |value| self.format(field, value))
            })
            .collect()
    }

    /// Every field of `resource` as columns sorted by raw field name, with
    /// formatted values.
    ///
    /// `tenant_id` keeps its sorted position but is labelled `project_id`.
    #[must_use]
    pub fn show(&self, resource: &Resource) -> ShowOutput {
        let mut pairs: Vec<(&str, &FieldValue)> = resource
            .fields()
            .iter()
            .map(|(field, value)| (field.as_str(), value))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));

        let (columns, values) = pairs
            .into_iter()
            .map(|(field, value)| (display_label(field).to_string(), self.format(field, value)))
            .unzip();
        ShowOutput { columns, values }
    }
}

fn display_label(field: &str) -> &str {
    match field {
        "tenant_id" => "project_id",
        other => other,
    }
}

/// `UP` for a truthy admin state, `DOWN` otherwise.
#[must_use]
pub fn format_admin_state(value: &FieldValue) -> String {
    if value.is_truthy() { "UP" } else { "DOWN" }.to_string()
}

/// Compact JSON, or an empty string if the value is null or cannot be encoded.
#[must_use]
pub fn format_json(value: &FieldValue) -> String {
    if value.is_null() {
        return String::new();
    }
    value.to_json().unwrap_or_default()
}
