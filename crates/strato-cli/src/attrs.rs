//! Attribute builders.
//!
//! Turn parsed create arguments into the payload for a remote create call.
//! Only inputs the user actually supplied become keys; nothing is defaulted
//! on the router path. Mutually exclusive flags were already rejected by the
//! parser.

use strato_proto::api::ANY_IPV4_CIDR;
use strato_proto::{Attributes, SecurityGroupRuleSpec};
use tracing::debug;

use crate::api::{IdentityApi, SecurityGroupApi};
use crate::cli::{CreateRouterArgs, CreateRuleArgs, Protocol};
use crate::error::CliError;

/// Build the attributes for `router create`.
///
/// `--project` is resolved to its id and sent as `tenant_id`.
///
/// # Errors
///
/// Returns an error if the project cannot be resolved.
pub async fn router_attrs<I: IdentityApi>(
    identity: &mut I,
    args: &CreateRouterArgs,
) -> Result<Attributes, CliError> {
    let mut attrs = Attributes::new();
    attrs.insert("name", args.name.as_str());
    attrs.insert_present("admin_state_up", args.admin_state_up());
    attrs.insert_present("distributed", args.distributed());
    attrs.insert_present("description", args.description.as_deref());

    if let Some(project) = &args.project {
        let project = identity
            .find_project(project, args.project_domain.as_deref())
            .await?;
        let id = project
            .id()
            .ok_or_else(|| CliError::Protocol("project has no id".into()))?;
        debug!(project = id, "Resolved project");
        attrs.insert("tenant_id", id);
    }

    Ok(attrs)
}

/// Build the rule definition for `security-group-rule create`.
///
/// The parent group and any remote group are resolved to ids. The protocol
/// defaults to tcp; icmp rules carry ports `-1:-1`; the remote prefix
/// defaults to `0.0.0.0/0`.
///
/// # Errors
///
/// Returns an error if a group cannot be resolved.
pub async fn rule_spec<S: SecurityGroupApi>(
    api: &mut S,
    args: &CreateRuleArgs,
) -> Result<SecurityGroupRuleSpec, CliError> {
    let parent_group_id = resolve_group_id(api, &args.group).await?;

    let group_id = match args.remote_group() {
        Some(group) => Some(resolve_group_id(api, group).await?),
        None => None,
    };

    let protocol = args.protocol().unwrap_or(Protocol::Tcp);
    let (from_port, to_port) = match protocol {
        Protocol::Icmp => (-1, -1),
        Protocol::Tcp | Protocol::Udp => (
            i32::from(args.dst_port.start),
            i32::from(args.dst_port.end),
        ),
    };

    Ok(SecurityGroupRuleSpec {
        parent_group_id,
        ip_protocol: protocol.as_str().to_string(),
        from_port,
        to_port,
        cidr: args.remote_ip().unwrap_or(ANY_IPV4_CIDR).to_string(),
        group_id,
    })
}

async fn resolve_group_id<S: SecurityGroupApi>(api: &mut S, name_or_id: &str) -> Result<String, CliError> {
    let group = api.get_security_group(name_or_id).await?;
    group
        .id()
        .map(str::to_string)
        .ok_or_else(|| CliError::Protocol(format!("security group '{name_or_id}' has no id")))
}
