//! Router command implementation.
//!
//! Provides subcommands for:
//! - Creating a router
//! - Listing routers
//! - Showing one router
//! - Deleting routers

use std::io::Write;

use strato_proto::Resource;
use tracing::debug;

use crate::api::{IdentityApi, RouterApi};
use crate::attrs::router_attrs;
use crate::bulk::BulkDeleteReport;
use crate::cli::{CreateRouterArgs, RouterCommands};
use crate::error::CliError;
use crate::format::FormatterRegistry;
use crate::output::{ListOutput, OutputFormat, ShowOutput};

/// Default listing columns as (header, field).
const LIST_COLUMNS: [(&str, &str); 7] = [
    ("ID", "id"),
    ("Name", "name"),
    ("Status", "status"),
    ("State", "admin_state_up"),
    ("Distributed", "distributed"),
    ("HA", "ha"),
    ("Project", "tenant_id"),
];

/// Extra columns for `--long`.
const LONG_COLUMNS: [(&str, &str); 2] = [
    ("Routes", "routes"),
    ("External gateway info", "external_gateway_info"),
];

/// Router command executor.
pub struct RouterCommand<'a, C> {
    client: &'a mut C,
    formatters: &'a FormatterRegistry,
}

impl<'a, C: RouterApi + IdentityApi> RouterCommand<'a, C> {
    /// Create a new router command.
    #[must_use]
    pub fn new(client: &'a mut C, formatters: &'a FormatterRegistry) -> Self {
        Self { client, formatters }
    }

    /// Execute a router subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    pub async fn execute<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        command: &RouterCommands,
    ) -> Result<(), CliError> {
        match command {
            RouterCommands::Create(args) => {
                let show = self.create(args).await?;
                format.write_show(writer, &show)?;
            }
            RouterCommands::List { long } => {
                let list = self.list(*long).await?;
                format.write_list(writer, list)?;
            }
            RouterCommands::Show { router } => {
                let show = self.show(router).await?;
                format.write_show(writer, &show)?;
            }
            RouterCommands::Delete { routers } => {
                self.delete(routers).await?;
            }
        }
        Ok(())
    }

    /// Create a router.
    ///
    /// # Errors
    ///
    /// Returns an error if the project cannot be resolved or the create fails.
    pub async fn create(&mut self, args: &CreateRouterArgs) -> Result<ShowOutput, CliError> {
        let attrs = router_attrs(self.client, args).await?;
        debug!(name = %args.name, attrs = attrs.len(), "Creating router");
        let router = self.client.create_router(attrs).await?;
        Ok(self.formatters.show(&router))
    }

    /// List routers; rows are formatted as they are consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the routers cannot be fetched.
    pub async fn list(
        &mut self,
        long: bool,
    ) -> Result<ListOutput<impl Iterator<Item = Vec<String>> + use<'a, C>>, CliError> {
        let routers = self.client.list_routers().await?;

        let extra: &[(&str, &str)] = if long { &LONG_COLUMNS } else { &[] };
        let (headers, fields): (Vec<&str>, Vec<&str>) =
            LIST_COLUMNS.iter().chain(extra).copied().unzip();

        let formatters = self.formatters;
        let rows = routers
            .into_iter()
            .map(move |router| formatters.row(&router, &fields));
        Ok(ListOutput::new(headers, rows))
    }

    /// Show one router by name or id.
    ///
    /// # Errors
    ///
    /// Returns an error if the router cannot be found or the name is ambiguous.
    pub async fn show(&mut self, name_or_id: &str) -> Result<ShowOutput, CliError> {
        let router = find_router(self.client, name_or_id).await?;
        Ok(self.formatters.show(&router))
    }

    /// Delete routers by name or id, attempting every one.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::BulkDelete`] if any router failed to delete.
    pub async fn delete(&mut self, names_or_ids: &[String]) -> Result<(), CliError> {
        let mut report = BulkDeleteReport::new("routers");
        for name_or_id in names_or_ids {
            let result = self.delete_one(name_or_id).await;
            report.record(name_or_id, result);
        }
        report.finish()
    }

    async fn delete_one(&mut self, name_or_id: &str) -> Result<(), CliError> {
        let router = find_router(self.client, name_or_id).await?;
        let id = router
            .id()
            .ok_or_else(|| CliError::Protocol(format!("router '{name_or_id}' has no id")))?;
        debug!(router = id, "Deleting router");
        self.client.delete_router(id).await
    }
}

/// Resolve a router by id, falling back to an exact name match.
///
/// # Errors
///
/// Returns [`CliError::NotFound`] if nothing matches and
/// [`CliError::Ambiguous`] if the name matches more than one router.
pub async fn find_router<C: RouterApi>(client: &mut C, name_or_id: &str) -> Result<Resource, CliError> {
    match client.get_router(name_or_id).await {
        Err(err) if err.is_not_found() => {}
        other => return other,
    }

    let mut matches = client
        .list_routers()
        .await?
        .into_iter()
        .filter(|router| router.name() == Some(name_or_id));

    match (matches.next(), matches.next()) {
        (Some(router), None) => Ok(router),
        (None, _) => Err(CliError::NotFound(format!(
            "No router with a name or ID of '{name_or_id}' exists."
        ))),
        (Some(_), Some(_)) => Err(CliError::Ambiguous(format!(
            "More than one router exists with the name '{name_or_id}'."
        ))),
    }
}
