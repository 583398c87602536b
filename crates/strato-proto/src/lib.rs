//! # strato-proto
//!
//! Protocol definitions for communication between the `strato` CLI and the
//! control-plane gateway.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod error;
pub mod resource;
pub mod value;

pub use api::{ApiMessage, ApiResponse, SecurityGroupRuleSpec};
pub use error::ProtoError;
pub use resource::{Attributes, Resource, ResourceKind};
pub use value::FieldValue;
