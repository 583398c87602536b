//! Remote resources and create-call attribute payloads.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;
use crate::ProtoError;

/// Kinds of remote entity the control plane exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Network router.
    Router,
    /// Security group (a container of rules).
    SecurityGroup,
    /// Compute-style security group rule.
    SecurityGroupRule,
    /// Identity project.
    Project,
}

impl ResourceKind {
    /// Field names a resource of this kind may carry, sorted.
    #[must_use]
    pub const fn known_fields(self) -> &'static [&'static str] {
        match self {
            Self::Router => &[
                "admin_state_up",
                "availability_zone_hints",
                "availability_zones",
                "description",
                "distributed",
                "external_gateway_info",
                "ha",
                "id",
                "name",
                "routes",
                "status",
                "tenant_id",
            ],
            Self::SecurityGroup => &["description", "id", "name", "rules", "tenant_id"],
            Self::SecurityGroupRule => &[
                "from_port",
                "group",
                "id",
                "ip_protocol",
                "ip_range",
                "parent_group_id",
                "port_range",
                "remote_security_group",
                "to_port",
            ],
            Self::Project => &["description", "domain_id", "enabled", "id", "name"],
        }
    }

    /// Returns `true` if `field` belongs to this kind's key set.
    #[must_use]
    pub fn is_known_field(self, field: &str) -> bool {
        self.known_fields().contains(&field)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Router => write!(f, "router"),
            Self::SecurityGroup => write!(f, "security group"),
            Self::SecurityGroupRule => write!(f, "security group rule"),
            Self::Project => write!(f, "project"),
        }
    }
}

/// A remote entity as a mapping from field name to raw value.
///
/// Only fields in the kind's known key set are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawResource")]
pub struct Resource {
    kind: ResourceKind,
    fields: BTreeMap<String, FieldValue>,
}

#[derive(Deserialize)]
struct RawResource {
    kind: ResourceKind,
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
}

impl From<RawResource> for Resource {
    fn from(raw: RawResource) -> Self {
        Self::from_fields(raw.kind, raw.fields)
    }
}

impl Resource {
    /// Build a resource, dropping fields unknown to `kind`.
    pub fn from_fields<I, K>(kind: ResourceKind, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .filter(|(k, _)| kind.is_known_field(k))
            .collect();
        Self { kind, fields }
    }

    /// Build a resource from a nested object value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an object.
    pub fn from_value(kind: ResourceKind, value: &FieldValue) -> Result<Self, ProtoError> {
        let map = value.as_map().ok_or_else(|| ProtoError::InvalidField {
            field: kind.to_string(),
            expected: "an object",
        })?;
        Ok(Self::from_fields(kind, map.clone()))
    }

    /// The `id` field, if present and a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(FieldValue::as_str)
    }

    /// The `name` field, if present and a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(FieldValue::as_str)
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// All fields.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Consume into the field map.
    #[must_use]
    pub fn into_fields(self) -> BTreeMap<String, FieldValue> {
        self.fields
    }
}

/// Key/value payload for a create call.
///
/// Keys appear only for inputs that were actually supplied; a supplied
/// `false` or empty string is still a key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, FieldValue>);

impl Attributes {
    /// Create an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` unconditionally.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set `key` only when `value` was supplied.
    pub fn insert_present<T: Into<FieldValue>>(&mut self, key: impl Into<String>, value: Option<T>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Returns `true` if `key` is set.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over keys and values in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
