//! Control-plane protocol messages.
//!
//! This module defines the protocol between `strato-cli` and the control-plane
//! gateway. Every request is answered by exactly one response; the CLI never
//! pipelines requests.
//!
//! # Message Flow
//!
//! ```text
//! ┌────────────┐     ApiMessage      ┌──────────────────┐
//! │ strato-cli │────────────────────►│ control plane gw │
//! │            │◄────────────────────│                  │
//! └────────────┘     ApiResponse     └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use strato_proto::api::{ApiMessage, ApiResponse};
//!
//! let request = ApiMessage::GetRouter { id: "r-1".into() };
//! let json = request.to_json().unwrap();
//! assert!(json.contains("get_router"));
//!
//! let response = ApiResponse::from_json(r#"{"type": "deleted", "id": "r-1"}"#).unwrap();
//! assert!(matches!(response, ApiResponse::Deleted { .. }));
//! ```

use serde::{Deserialize, Serialize};

use crate::resource::{Attributes, Resource};
use crate::ProtoError;

/// Protocol version spoken by this crate.
pub const PROTOCOL_VERSION: u32 = 1;

/// Wildcard CIDR used when a rule names no remote prefix.
pub const ANY_IPV4_CIDR: &str = "0.0.0.0/0";

/// Messages sent from the CLI to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiMessage {
    /// Handshake to identify as a CLI client.
    Hello {
        /// Client version.
        version: String,
        /// Protocol version.
        protocol_version: u32,
    },

    // =========================================================================
    // Identity
    // =========================================================================

    /// Resolve a project by name or id.
    FindProject {
        /// Project name or id.
        name_or_id: String,
        /// Domain (name or id) scoping the lookup.
        #[serde(skip_serializing_if = "Option::is_none")]
        domain: Option<String>,
    },

    // =========================================================================
    // Routers
    // =========================================================================

    /// Create a router from an attribute payload.
    CreateRouter {
        /// Supplied attributes only.
        attrs: Attributes,
    },

    /// List routers visible to the caller.
    ListRouters,

    /// Fetch one router by id.
    GetRouter {
        /// Router id.
        id: String,
    },

    /// Delete one router by id.
    DeleteRouter {
        /// Router id.
        id: String,
    },

    // =========================================================================
    // Security groups
    // =========================================================================

    /// List security groups, including their rules.
    ListSecurityGroups {
        /// Scope to all projects; omitted means the server default.
        #[serde(skip_serializing_if = "Option::is_none")]
        all_projects: Option<bool>,
    },

    /// Fetch one security group by name or id.
    GetSecurityGroup {
        /// Group name or id.
        name_or_id: String,
    },

    /// Create a rule inside a security group.
    CreateSecurityGroupRule {
        /// Rule definition.
        spec: SecurityGroupRuleSpec,
    },

    /// Delete one rule by id.
    DeleteSecurityGroupRule {
        /// Rule id.
        id: String,
    },
}

/// Positional rule definition accepted by the compute rule API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityGroupRuleSpec {
    /// Id of the group that owns the rule.
    pub parent_group_id: String,
    /// `icmp`, `tcp` or `udp`.
    pub ip_protocol: String,
    /// First port, `-1` for icmp.
    pub from_port: i32,
    /// Last port, `-1` for icmp.
    pub to_port: i32,
    /// Remote prefix.
    pub cidr: String,
    /// Remote security group id, if the rule is group-scoped.
    pub group_id: Option<String>,
}

/// Responses sent from the gateway to the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiResponse {
    /// Handshake accepted.
    Welcome {
        /// Server version.
        server_version: String,
        /// Protocol version.
        protocol_version: u32,
    },

    /// A single resource.
    Resource {
        /// The resource.
        resource: Resource,
    },

    /// A collection of resources.
    Resources {
        /// The resources, in server order.
        resources: Vec<Resource>,
    },

    /// A resource was deleted.
    Deleted {
        /// Id of the deleted resource.
        id: String,
    },

    /// The request failed.
    Error {
        /// Error code.
        code: u32,
        /// Human-readable message.
        message: String,
        /// Type of the failed request.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_type: Option<String>,
    },
}

/// Error codes for gateway responses.
pub mod error_codes {
    /// Malformed or unsupported request.
    pub const INVALID_REQUEST: u32 = 400;
    /// Resource not found.
    pub const NOT_FOUND: u32 = 404;
    /// Resource state conflict (in use, duplicate, ...).
    pub const CONFLICT: u32 = 409;
    /// Protocol version mismatch.
    pub const PROTOCOL_MISMATCH: u32 = 426;
    /// Internal error.
    pub const INTERNAL_ERROR: u32 = 500;
}

impl ApiMessage {
    /// Create a hello message.
    #[must_use]
    pub fn hello(version: impl Into<String>) -> Self {
        Self::Hello {
            version: version.into(),
            protocol_version: PROTOCOL_VERSION,
        }
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::Encoding(e.to_string()))
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(json).map_err(|e| ProtoError::Decoding(e.to_string()))
    }

    /// Get the request type name for error reporting.
    #[must_use]
    pub const fn request_type(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "hello",
            Self::FindProject { .. } => "find_project",
            Self::CreateRouter { .. } => "create_router",
            Self::ListRouters => "list_routers",
            Self::GetRouter { .. } => "get_router",
            Self::DeleteRouter { .. } => "delete_router",
            Self::ListSecurityGroups { .. } => "list_security_groups",
            Self::GetSecurityGroup { .. } => "get_security_group",
            Self::CreateSecurityGroupRule { .. } => "create_security_group_rule",
            Self::DeleteSecurityGroupRule { .. } => "delete_security_group_rule",
        }
    }
}

impl ApiResponse {
    /// Create a welcome response.
    #[must_use]
    pub fn welcome(server_version: impl Into<String>) -> Self {
        Self::Welcome {
            server_version: server_version.into(),
            protocol_version: PROTOCOL_VERSION,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
            request_type: None,
        }
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::Encoding(e.to_string()))
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(json).map_err(|e| ProtoError::Decoding(e.to_string()))
    }
}
