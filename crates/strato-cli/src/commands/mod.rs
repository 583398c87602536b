//! CLI command implementations.
//!
//! Each submodule implements the verbs of one resource:
//! - [`router`] - Router create, list, show and delete
//! - [`security_group_rule`] - Security group rule create, list, show and delete

pub mod router;
pub mod security_group_rule;

pub use router::RouterCommand;
pub use security_group_rule::SecurityGroupRuleCommand;
