//! Security group rule command implementation.
//!
//! Rules live inside compute security groups, so listing and showing go
//! through the group collection. Raw rules are reshaped by [`display_rule`]
//! before they are formatted.

use std::io::Write;

use strato_proto::{FieldValue, Resource, ResourceKind};
use tracing::debug;

use crate::api::SecurityGroupApi;
use crate::attrs::rule_spec;
use crate::bulk::BulkDeleteReport;
use crate::cli::{CreateRuleArgs, ListRuleArgs, RuleCommands};
use crate::error::CliError;
use crate::format::FormatterRegistry;
use crate::output::{ListOutput, OutputFormat, ShowOutput};

/// Listing columns as (header, field).
const LIST_COLUMNS: [(&str, &str); 5] = [
    ("ID", "id"),
    ("IP Protocol", "ip_protocol"),
    ("IP Range", "ip_range"),
    ("Port Range", "port_range"),
    ("Remote Security Group", "remote_security_group"),
];

/// Added when rules from every group are listed together.
const PARENT_COLUMN: (&str, &str) = ("Security Group", "parent_group_id");

/// Security group rule command executor.
pub struct SecurityGroupRuleCommand<'a, C> {
    client: &'a mut C,
    formatters: &'a FormatterRegistry,
}

impl<'a, C: SecurityGroupApi> SecurityGroupRuleCommand<'a, C> {
    /// Create a new security group rule command.
    #[must_use]
    pub fn new(client: &'a mut C, formatters: &'a FormatterRegistry) -> Self {
        Self { client, formatters }
    }

    /// Execute a security group rule subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    pub async fn execute<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        command: &RuleCommands,
    ) -> Result<(), CliError> {
        match command {
            RuleCommands::Create(args) => {
                let show = self.create(args).await?;
                format.write_show(writer, &show)?;
            }
            RuleCommands::List(args) => {
                let list = self.list(args).await?;
                format.write_list(writer, list)?;
            }
            RuleCommands::Show { rule } => {
                let show = self.show(rule).await?;
                format.write_show(writer, &show)?;
            }
            RuleCommands::Delete { rules } => {
                self.delete(rules).await?;
            }
        }
        Ok(())
    }

    /// Create a rule.
    ///
    /// # Errors
    ///
    /// Returns an error if a group cannot be resolved or the create fails.
    pub async fn create(&mut self, args: &CreateRuleArgs) -> Result<ShowOutput, CliError> {
        let spec = rule_spec(self.client, args).await?;
        debug!(group = %spec.parent_group_id, protocol = %spec.ip_protocol, "Creating rule");
        let rule = self.client.create_security_group_rule(spec).await?;
        Ok(self.formatters.show(&display_rule(&rule)))
    }

    /// List rules of one group, or of every visible group.
    ///
    /// # Errors
    ///
    /// Returns an error if the groups cannot be fetched or decoded.
    pub async fn list(
        &mut self,
        args: &ListRuleArgs,
    ) -> Result<ListOutput<impl Iterator<Item = Vec<String>> + use<'a, C>>, CliError> {
        let mut columns = LIST_COLUMNS.to_vec();
        let rules = if let Some(group) = &args.group {
            let group = self.client.get_security_group(group).await?;
            group_rules(&group)?
        } else {
            columns.push(PARENT_COLUMN);
            let groups = self
                .client
                .list_security_groups(Some(args.all_projects))
                .await?;
            let mut rules = Vec::new();
            for group in &groups {
                rules.extend(group_rules(group)?);
            }
            rules
        };

        let (headers, fields): (Vec<&str>, Vec<&str>) = columns.into_iter().unzip();
        let formatters = self.formatters;
        let rows = rules
            .into_iter()
            .map(move |rule| formatters.row(&display_rule(&rule), &fields));
        Ok(ListOutput::new(headers, rows))
    }

    /// Show one rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotFound`] if no visible group holds the rule.
    pub async fn show(&mut self, id: &str) -> Result<ShowOutput, CliError> {
        let groups = self.client.list_security_groups(None).await?;
        for group in &groups {
            if let Some(rule) = group_rules(group)?
                .into_iter()
                .find(|rule| rule_id(rule).as_deref() == Some(id))
            {
                return Ok(self.formatters.show(&display_rule(&rule)));
            }
        }
        Err(CliError::NotFound(format!(
            "Could not find security group rule with ID '{id}'"
        )))
    }

    /// Delete rules by id, attempting every one.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::BulkDelete`] if any rule failed to delete.
    pub async fn delete(&mut self, ids: &[String]) -> Result<(), CliError> {
        let mut report = BulkDeleteReport::new("rules");
        for id in ids {
            debug!(rule = %id, "Deleting rule");
            let result = self.client.delete_security_group_rule(id).await;
            report.record(id, result);
        }
        report.finish()
    }
}

/// Reshape a raw compute rule for display.
///
/// `from_port`/`to_port` collapse into `port_range`, `ip_range` becomes its
/// CIDR, and the remote `group` object becomes `remote_security_group`.
#[must_use]
pub fn display_rule(rule: &Resource) -> Resource {
    let mut fields = rule.fields().clone();

    let from_port = fields.remove("from_port").unwrap_or(FieldValue::Null);
    let to_port = fields.remove("to_port").unwrap_or(FieldValue::Null);
    let ip_protocol = match fields.remove("ip_protocol") {
        None | Some(FieldValue::Null) => FieldValue::from(""),
        Some(protocol) => protocol,
    };
    let ip_range = fields.remove("ip_range");
    let group = fields.remove("group");

    let port_range = if ip_protocol
        .as_str()
        .is_some_and(|p| p.eq_ignore_ascii_case("icmp"))
    {
        String::new()
    } else {
        port_range(&from_port, &to_port)
    };

    fields.insert("ip_protocol".into(), ip_protocol);
    fields.insert("port_range".into(), FieldValue::from(port_range));
    fields.insert("ip_range".into(), FieldValue::from(nested_str(ip_range.as_ref(), "cidr")));
    fields.insert(
        "remote_security_group".into(),
        FieldValue::from(nested_str(group.as_ref(), "name")),
    );

    Resource::from_fields(ResourceKind::SecurityGroupRule, fields)
}

fn port_range(from: &FieldValue, to: &FieldValue) -> String {
    if from.is_null() && to.is_null() {
        String::new()
    } else {
        format!("{from}:{to}")
    }
}

fn nested_str(object: Option<&FieldValue>, key: &str) -> String {
    object
        .and_then(FieldValue::as_map)
        .and_then(|map| map.get(key))
        .and_then(FieldValue::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Rule ids may arrive as strings or integers.
fn rule_id(rule: &Resource) -> Option<String> {
    rule.get("id").map(ToString::to_string)
}

fn group_rules(group: &Resource) -> Result<Vec<Resource>, CliError> {
    group
        .get("rules")
        .and_then(FieldValue::as_list)
        .unwrap_or_default()
        .iter()
        .map(|rule| Resource::from_value(ResourceKind::SecurityGroupRule, rule).map_err(CliError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use clap::Parser;
    use test_case::test_case;

    use super::*;
    use crate::api::fake::FakeCloud;
    use crate::cli::{Cli, Commands, Format};

    fn object<const N: usize>(pairs: [(&str, FieldValue); N]) -> FieldValue {
        FieldValue::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    fn raw_rule(id: &str, parent: &str, protocol: &str, from: i64, to: i64, cidr: &str) -> FieldValue {
        object([
            ("id", FieldValue::from(id)),
            ("parent_group_id", FieldValue::from(parent)),
            ("ip_protocol", FieldValue::from(protocol)),
            ("from_port", FieldValue::from(from)),
            ("to_port", FieldValue::from(to)),
            ("ip_range", object([("cidr", FieldValue::from(cidr))])),
            ("group", object([])),
        ])
    }

    fn cloud() -> FakeCloud {
        FakeCloud::new()
            .with_group(
                "sg-1",
                "web",
                vec![
                    raw_rule("rule-a", "sg-1", "tcp", 80, 80, "0.0.0.0/0"),
                    raw_rule("rule-b", "sg-1", "icmp", -1, -1, "10.0.0.0/8"),
                ],
            )
            .with_group(
                "sg-2",
                "db",
                vec![raw_rule("rule-c", "sg-2", "tcp", 5432, 5433, "10.1.0.0/16")],
            )
    }

    fn rule_command(argv: &[&str]) -> RuleCommands {
        let argv = ["strato", "security-group-rule"].iter().chain(argv).copied();
        match Cli::try_parse_from(argv).expect("valid args").command {
            Commands::SecurityGroupRule { command } => command,
            Commands::Router { .. } => panic!("expected rule command"),
        }
    }

    async fn run(cloud: &mut FakeCloud, format: Format, argv: &[&str]) -> Result<String, CliError> {
        let formatters = FormatterRegistry::empty();
        let mut out = Vec::new();
        SecurityGroupRuleCommand::new(cloud, &formatters)
            .execute(&mut out, &OutputFormat::new(format), &rule_command(argv))
            .await?;
        Ok(String::from_utf8(out).expect("utf8"))
    }

    fn displayed(raw: &FieldValue) -> Resource {
        let rule = Resource::from_value(ResourceKind::SecurityGroupRule, raw).expect("rule");
        display_rule(&rule)
    }

    fn text(rule: &Resource, field: &str) -> String {
        rule.get(field).map(ToString::to_string).unwrap_or_default()
    }

    #[test_case(FieldValue::from(22), FieldValue::from(22), "22:22" ; "single port")]
    #[test_case(FieldValue::from(1), FieldValue::from(65535), "1:65535" ; "range")]
    #[test_case(FieldValue::Null, FieldValue::Null, "" ; "no ports")]
    #[test_case(FieldValue::from(8), FieldValue::Null, "8:" ; "half open")]
    fn port_range_text(from: FieldValue, to: FieldValue, expected: &str) {
        assert_eq!(port_range(&from, &to), expected);
    }

    #[test]
    fn display_rule_flattens_nested_fields() {
        let rule = displayed(&raw_rule("rule-a", "sg-1", "tcp", 80, 81, "10.0.0.0/8"));
        assert_eq!(text(&rule, "port_range"), "80:81");
        assert_eq!(text(&rule, "ip_range"), "10.0.0.0/8");
        assert_eq!(text(&rule, "remote_security_group"), "");
        assert!(rule.get("from_port").is_none());
        assert!(rule.get("to_port").is_none());
        assert!(rule.get("group").is_none());
    }

    #[test]
    fn display_rule_icmp_has_no_ports() {
        let rule = displayed(&raw_rule("rule-b", "sg-1", "ICMP", -1, -1, "0.0.0.0/0"));
        assert_eq!(text(&rule, "port_range"), "");
    }

    #[test]
    fn display_rule_group_scoped() {
        let raw = object([
            ("id", FieldValue::from(7)),
            ("parent_group_id", FieldValue::from("sg-1")),
            ("ip_protocol", FieldValue::Null),
            ("from_port", FieldValue::Null),
            ("to_port", FieldValue::Null),
            ("ip_range", object([])),
            ("group", object([("name", FieldValue::from("db")), ("tenant_id", FieldValue::from("p-1"))])),
        ]);
        let rule = displayed(&raw);
        assert_eq!(text(&rule, "ip_protocol"), "");
        assert_eq!(text(&rule, "port_range"), "");
        assert_eq!(text(&rule, "ip_range"), "");
        assert_eq!(text(&rule, "remote_security_group"), "db");
        assert_eq!(rule_id(&rule).as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn create_defaults_to_tcp_any() {
        let mut cloud = cloud();
        let output = run(&mut cloud, Format::Json, &["create", "web"]).await.expect("create");

        let spec = &cloud.created_rules[0];
        assert_eq!(spec.ip_protocol, "tcp");
        assert_eq!(spec.cidr, "0.0.0.0/0");

        let parsed: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(parsed["port_range"], "0:0");
        assert_eq!(parsed["ip_range"], "0.0.0.0/0");
        assert_eq!(parsed["parent_group_id"], "sg-1");
        assert_eq!(parsed["remote_security_group"], "");
    }

    #[tokio::test]
    async fn create_with_remote_group_shows_its_name() {
        let mut cloud = cloud();
        let formatters = FormatterRegistry::empty();
        let args = match rule_command(&["create", "web", "--src-group", "db", "--dst-port", "22"]) {
            RuleCommands::Create(args) => args,
            other => panic!("unexpected {other:?}"),
        };

        let show = SecurityGroupRuleCommand::new(&mut cloud, &formatters)
            .create(&args)
            .await
            .expect("create");

        assert_eq!(show.value_of("remote_security_group"), Some("db"));
        assert_eq!(show.value_of("port_range"), Some("22:22"));
        assert_eq!(
            show.columns,
            vec!["id", "ip_protocol", "ip_range", "parent_group_id", "port_range", "remote_security_group"]
        );
        assert_eq!(cloud.created_rules[0].group_id.as_deref(), Some("sg-2"));
    }

    #[tokio::test]
    async fn list_all_groups_adds_parent_column() {
        let mut cloud = cloud();
        let formatters = FormatterRegistry::empty();
        let args = match rule_command(&["list", "--all-projects"]) {
            RuleCommands::List(args) => args,
            other => panic!("unexpected {other:?}"),
        };

        let ListOutput { headers, rows } = SecurityGroupRuleCommand::new(&mut cloud, &formatters)
            .list(&args)
            .await
            .expect("list");

        assert_eq!(headers.last().map(String::as_str), Some("Security Group"));
        let rows: Vec<Vec<String>> = rows.collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["rule-a", "tcp", "0.0.0.0/0", "80:80", "", "sg-1"]);
        assert_eq!(rows[1][3], "");
        assert_eq!(rows[2][5], "sg-2");
        assert_eq!(cloud.list_scopes, vec![Some(true)]);
    }

    #[tokio::test]
    async fn list_one_group_omits_parent_column() {
        let mut cloud = cloud();
        let output = run(&mut cloud, Format::Value, &["list", "db", "--long"])
            .await
            .expect("list");
        assert_eq!(output, "rule-c tcp 10.1.0.0/16 5432:5433 \n");
        assert_eq!(cloud.calls, vec!["get_security_group:db"]);
    }

    #[tokio::test]
    async fn show_scans_every_group() {
        let mut cloud = cloud();
        let output = run(&mut cloud, Format::Json, &["show", "rule-c"]).await.expect("show");
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(parsed["port_range"], "5432:5433");
        assert_eq!(cloud.list_scopes, vec![None]);
    }

    #[tokio::test]
    async fn show_unknown_rule() {
        let mut cloud = cloud();
        let err = run(&mut cloud, Format::Table, &["show", "rule-x"])
            .await
            .expect_err("missing");
        assert_eq!(err.to_string(), "Could not find security group rule with ID 'rule-x'");
    }

    #[tokio::test]
    async fn delete_reports_partial_failure() {
        let mut cloud = cloud().failing_delete("rule-a");
        let err = run(&mut cloud, Format::Table, &["delete", "rule-a", "rule-c", "rule-zz"])
            .await
            .expect_err("partial failure");
        assert_eq!(err.to_string(), "2 of 3 rules failed to delete.");
        assert_eq!(cloud.deleted, vec!["rule-c"]);
        assert_eq!(
            cloud.calls,
            vec![
                "delete_security_group_rule:rule-a",
                "delete_security_group_rule:rule-c",
                "delete_security_group_rule:rule-zz",
            ]
        );
    }

    #[tokio::test]
    async fn delete_all_succeed_silently() {
        let mut cloud = cloud();
        let output = run(&mut cloud, Format::Table, &["delete", "rule-a", "rule-b"])
            .await
            .expect("delete");
        assert!(output.is_empty());
    }
}
