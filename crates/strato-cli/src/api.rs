//! Remote API seams used by the command handlers.
//!
//! [`crate::client::GatewayClient`] implements every trait over the
//! WebSocket protocol; tests substitute a recording fake.

use std::future::Future;

use strato_proto::{Attributes, Resource, SecurityGroupRuleSpec};

use crate::error::CliError;

/// Identity lookups.
pub trait IdentityApi: Send {
    /// Resolve a project by name or id, optionally scoped to a domain.
    fn find_project(
        &mut self,
        name_or_id: &str,
        domain: Option<&str>,
    ) -> impl Future<Output = Result<Resource, CliError>> + Send;
}

/// Router operations.
pub trait RouterApi: Send {
    /// Create a router from supplied attributes.
    fn create_router(
        &mut self,
        attrs: Attributes,
    ) -> impl Future<Output = Result<Resource, CliError>> + Send;

    /// List routers.
    fn list_routers(&mut self) -> impl Future<Output = Result<Vec<Resource>, CliError>> + Send;

    /// Fetch a router by id.
    fn get_router(&mut self, id: &str) -> impl Future<Output = Result<Resource, CliError>> + Send;

    /// Delete a router by id.
    fn delete_router(&mut self, id: &str) -> impl Future<Output = Result<(), CliError>> + Send;
}

/// Compute security group operations.
pub trait SecurityGroupApi: Send {
    /// List security groups with their rules.
    fn list_security_groups(
        &mut self,
        all_projects: Option<bool>,
    ) -> impl Future<Output = Result<Vec<Resource>, CliError>> + Send;

    /// Fetch a security group by name or id.
    fn get_security_group(
        &mut self,
        name_or_id: &str,
    ) -> impl Future<Output = Result<Resource, CliError>> + Send;

    /// Create a rule.
    fn create_security_group_rule(
        &mut self,
        spec: SecurityGroupRuleSpec,
    ) -> impl Future<Output = Result<Resource, CliError>> + Send;

    /// Delete a rule by id.
    fn delete_security_group_rule(
        &mut self,
        id: &str,
    ) -> impl Future<Output = Result<(), CliError>> + Send;
}
