//! Command handlers for the pilar CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod currency;
mod dashboard;
mod goal;
mod init;
mod simulate;
mod transaction;

use crate::convert::DisplayContext;
use crate::Config;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use currency::{currency_set, currency_show};
pub use dashboard::{dashboard, Dashboard, MonthRow};
pub use goal::{goal_add, goal_delete, goal_list, goal_update, GoalRow};
pub use init::init;
pub use simulate::{simulate, Simulation};
pub use transaction::{delete, insert, list, update, TransactionRow};

/// Captures the preferred display currency and a rate matrix snapshot for one
/// command execution. Rates degrade gracefully; this never fails.
pub(crate) async fn display_context(config: &Config) -> DisplayContext {
    let matrix = config.rate_provider().matrix(config.currency()).await;
    DisplayContext::new(config.currency(), matrix)
}

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to the command line interface.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}
