//! The interactive menu loop.
//!
//! Establishes the state bucket, then repeatedly renders the dispatch
//! table, resolves one line of input and performs the selected action.
//! Any action failure is printed and control returns to the menu; only
//! `Exit` (or end of input) ends the loop.

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::core::credential::CredentialKind;
use crate::core::menu::{Action, DispatchTable, Selection};
use crate::credentials::{fetch_admin_credential, lookup_credential};
use crate::io::aws::Cloud;
use crate::io::config::DashboardConfig;
use crate::io::console::Prompter;
use crate::io::desktop::Desktop;
use crate::io::kops::Provisioner;
use crate::io::kubectl::Inspector;
use crate::reconciler::Reconciler;

pub const CHOICE_PROMPT: &str = "Please enter your choice: ";
pub const INVALID_SELECTION: &str = "Invalid selection";

/// Whether the loop keeps going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Session<P, C, I, D> {
    table: DispatchTable,
    reconciler: Reconciler<P, C>,
    inspector: I,
    desktop: D,
    dashboard: DashboardConfig,
}

impl<P: Provisioner, C: Cloud, I: Inspector, D: Desktop> Session<P, C, I, D> {
    pub fn new(
        reconciler: Reconciler<P, C>,
        inspector: I,
        desktop: D,
        dashboard: DashboardConfig,
    ) -> Self {
        Self {
            table: DispatchTable::standard(),
            reconciler,
            inspector,
            desktop,
            dashboard,
        }
    }

    pub fn reconciler(&self) -> &Reconciler<P, C> {
        &self.reconciler
    }

    /// Run until the operator exits or input ends.
    pub fn run<R: Prompter>(&mut self, prompter: &mut R) -> Result<()> {
        if let Err(err) = self.reconciler.ensure_storage(prompter) {
            warn!(err = %format!("{err:#}"), "state bucket not established");
            prompter.say(&format!("Error: {err:#}"))?;
        }
        loop {
            for line in self.table.render() {
                prompter.say(&line)?;
            }
            let Some(input) = prompter.ask(CHOICE_PROMPT)? else {
                debug!("input closed, leaving menu");
                return Ok(());
            };
            if self.handle_input(&input, prompter)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Resolve and perform one line of input.
    ///
    /// Errors from the action are reported to the operator, not returned;
    /// the `Err` case is reserved for failing to talk to the operator.
    pub fn handle_input<R: Prompter>(&mut self, input: &str, prompter: &mut R) -> Result<Flow> {
        let action = match self.table.resolve(input) {
            Selection::Action(action) => action,
            Selection::Invalid => {
                debug!(input, "invalid selection");
                prompter.say(INVALID_SELECTION)?;
                return Ok(Flow::Continue);
            }
        };
        match self.perform(action, prompter) {
            Ok(flow) => Ok(flow),
            Err(err) => {
                warn!(?action, err = %format!("{err:#}"), "action failed");
                prompter.say(&format!("Error: {err:#}"))?;
                Ok(Flow::Continue)
            }
        }
    }

    #[instrument(skip(self, prompter))]
    pub fn perform<R: Prompter>(&mut self, action: Action, prompter: &mut R) -> Result<Flow> {
        match action {
            Action::Exit => return Ok(Flow::Exit),
            Action::Define => {
                let default_region = self.reconciler.definition().region.clone();
                let region = prompter
                    .ask(&format!("Region [{default_region}]: "))?
                    .unwrap_or_default();
                self.reconciler.define(&region, prompter)?;
                self.show_definition(prompter)?;
            }
            Action::Review => {
                self.reconciler.review(prompter)?;
                self.show_definition(prompter)?;
            }
            Action::Launch => self.reconciler.launch(prompter)?,
            Action::Validate => self.reconciler.validate(prompter)?,
            Action::DeployDashboard => self
                .inspector
                .apply_manifest(&self.dashboard.manifest_url)?,
            Action::AccessDashboard => self.access_dashboard(prompter)?,
            Action::ViewNodes => self.inspector.get_nodes()?,
            Action::AdminPassword => {
                fetch_admin_credential(
                    &self.inspector,
                    &self.desktop,
                    prompter,
                    CredentialKind::Password,
                )?;
            }
            Action::AdminToken => {
                fetch_admin_credential(
                    &self.inspector,
                    &self.desktop,
                    prompter,
                    CredentialKind::Token,
                )?;
            }
            Action::Delete => self.reconciler.delete(prompter)?,
        }
        Ok(Flow::Continue)
    }

    /// Start the proxy detached, copy the login token, open the browser.
    fn access_dashboard<R: Prompter>(&mut self, prompter: &mut R) -> Result<()> {
        self.inspector.start_proxy()?;
        match lookup_credential(&self.inspector, CredentialKind::Token) {
            Ok(token) => {
                if let Err(err) = self.desktop.copy_to_clipboard(&token) {
                    warn!(err = %format!("{err:#}"), "clipboard copy failed");
                }
                prompter.say("Login token copied to clipboard; paste it into the dashboard.")?;
            }
            Err(err) => prompter.say(&format!("Could not fetch login token: {err:#}"))?,
        }
        self.desktop.open_url(&self.dashboard.proxy_url)?;
        prompter.say(&format!("Dashboard: {}", self.dashboard.proxy_url))
    }

    fn show_definition<R: Prompter>(&self, prompter: &mut R) -> Result<()> {
        for line in self.reconciler.definition().summary_lines() {
            prompter.say(&line)?;
        }
        Ok(())
    }
}
