//! Command-line argument parsing with clap.
//!
//! Every mutually exclusive flag pair and every value restriction is declared
//! here, so conflicting input is rejected before any gateway connection is
//! opened.

use std::fmt;
use std::str::FromStr;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

/// strato - routers and security group rules on the cloud control plane.
#[derive(Parser, Debug, Clone)]
#[command(name = "strato")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Gateway URL to connect to.
    #[arg(short, long, env = "STRATO_GATEWAY", default_value = "ws://localhost:8080")]
    pub gateway: String,

    /// Output format.
    #[arg(short, long, value_enum, env = "STRATO_FORMAT", default_value_t = Format::Table)]
    pub format: Format,

    /// Request timeout in seconds.
    #[arg(long, env = "STRATO_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
    /// Bare values, one row per line.
    Value,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Router management commands.
    Router {
        /// Router subcommand to execute.
        #[command(subcommand)]
        command: RouterCommands,
    },

    /// Security group rule management commands.
    SecurityGroupRule {
        /// Rule subcommand to execute.
        #[command(subcommand)]
        command: RuleCommands,
    },
}

/// Router subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum RouterCommands {
    /// Create a new router.
    Create(CreateRouterArgs),

    /// List routers.
    List {
        /// List additional fields in output.
        #[arg(long)]
        long: bool,
    },

    /// Display router details.
    Show {
        /// Router to display (name or ID).
        router: String,
    },

    /// Delete router(s).
    Delete {
        /// Router(s) to delete (name or ID).
        #[arg(required = true)]
        routers: Vec<String>,
    },
}

/// Arguments for `router create`.
#[derive(Parser, Debug, Clone)]
pub struct CreateRouterArgs {
    /// New router name.
    pub name: String,

    /// Enable router.
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable router.
    #[arg(long)]
    pub disable: bool,

    /// Create a distributed router.
    #[arg(long, conflicts_with = "centralized")]
    pub distributed: bool,

    /// Create a centralized router.
    #[arg(long)]
    pub centralized: bool,

    /// Router description.
    #[arg(long)]
    pub description: Option<String>,

    /// Owner's project (name or ID).
    #[arg(long, value_name = "PROJECT")]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID).
    #[arg(long, value_name = "PROJECT_DOMAIN")]
    pub project_domain: Option<String>,
}

impl CreateRouterArgs {
    /// `Some(true)` for `--enable`, `Some(false)` for `--disable`.
    #[must_use]
    pub const fn admin_state_up(&self) -> Option<bool> {
        flag_pair(self.enable, self.disable)
    }

    /// `Some(true)` for `--distributed`, `Some(false)` for `--centralized`.
    #[must_use]
    pub const fn distributed(&self) -> Option<bool> {
        flag_pair(self.distributed, self.centralized)
    }
}

const fn flag_pair(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}

/// Security group rule subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum RuleCommands {
    /// Create a new security group rule.
    Create(CreateRuleArgs),

    /// List security group rules.
    List(ListRuleArgs),

    /// Display security group rule details.
    Show {
        /// Security group rule to display (ID only).
        rule: String,
    },

    /// Delete security group rule(s).
    Delete {
        /// Security group rule(s) to delete (ID only).
        #[arg(required = true)]
        rules: Vec<String>,
    },
}

/// Arguments for `security-group-rule create`.
#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("remote")
        .args(["remote_ip", "remote_group", "src_ip", "src_group"])
        .multiple(false)
))]
pub struct CreateRuleArgs {
    /// Create rule in this security group (name or ID).
    pub group: String,

    /// Remote IP address block (CIDR notation).
    #[arg(long, value_name = "IP_ADDRESS")]
    pub remote_ip: Option<String>,

    /// Remote security group (name or ID).
    #[arg(long, value_name = "GROUP")]
    pub remote_group: Option<String>,

    /// Source IP address block, deprecated alias of --remote-ip.
    #[arg(long, value_name = "IP_ADDRESS")]
    pub src_ip: Option<String>,

    /// Source security group, deprecated alias of --remote-group.
    #[arg(long, value_name = "GROUP")]
    pub src_group: Option<String>,

    /// IP protocol (default: tcp).
    #[arg(long, value_enum, conflicts_with = "proto")]
    pub protocol: Option<Protocol>,

    /// IP protocol, alias of --protocol.
    #[arg(long, value_enum)]
    pub proto: Option<Protocol>,

    /// Destination port, a single port or a range such as 137:139
    /// (tcp and udp only).
    #[arg(long, value_name = "PORT_RANGE", default_value = "0:0")]
    pub dst_port: PortRange,
}

impl CreateRuleArgs {
    /// Protocol from either spelling.
    #[must_use]
    pub fn protocol(&self) -> Option<Protocol> {
        self.protocol.or(self.proto)
    }

    /// Remote prefix from either spelling.
    #[must_use]
    pub fn remote_ip(&self) -> Option<&str> {
        self.remote_ip.as_deref().or(self.src_ip.as_deref())
    }

    /// Remote group from either spelling.
    #[must_use]
    pub fn remote_group(&self) -> Option<&str> {
        self.remote_group.as_deref().or(self.src_group.as_deref())
    }
}

/// Arguments for `security-group-rule list`.
#[derive(Parser, Debug, Clone)]
pub struct ListRuleArgs {
    /// List all rules in this security group (name or ID).
    pub group: Option<String>,

    /// Display information from all projects (admin only).
    #[arg(long)]
    pub all_projects: bool,

    /// Accepted for compatibility; rule listings have no extra fields.
    #[arg(long, hide = true)]
    pub long: bool,
}

/// IP protocols accepted by the compute rule API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Protocol {
    /// ICMP.
    Icmp,
    /// TCP.
    Tcp,
    /// UDP.
    Udp,
}

impl Protocol {
    /// Wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Icmp => "icmp",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive port range parsed from `N` or `N:M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    /// First port.
    pub start: u16,
    /// Last port.
    pub end: u16,
}

impl FromStr for PortRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u16>()
                .map_err(|_| format!("invalid range, '{part}' is not a port number"))
        };

        let (start, end) = match s.split_once(':') {
            Some((start, end)) => (parse(start)?, parse(end)?),
            None => {
                let port = parse(s)?;
                (port, port)
            }
        };

        if start > end {
            return Err(format!("invalid range, {start} is not less than {end}"));
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
