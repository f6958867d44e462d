// User selection domain model
use super::measurement::Parameter;
use super::server::canonical_server_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which sample buffer feeds the line chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Live,
    Historical,
}

/// Date (and optional time window) of a historical query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub date: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl DateRange {
    pub fn day(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            start_time: None,
            end_time: None,
        }
    }

    pub fn window(
        date: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            start_time: Some(start_time.into()),
            end_time: Some(end_time.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Selection {
    pub parameter: Parameter,
    pub country: Option<String>,
    /// Canonical server names. Empty means every server is shown.
    pub selected_servers: BTreeSet<String>,
    pub date_range: Option<DateRange>,
}

impl Selection {
    pub fn with_servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selected_servers = servers
            .into_iter()
            .map(|s| canonical_server_name(s.as_ref()))
            .collect();
        self
    }

    /// True when `raw_name` passes the server filter.
    pub fn includes_server(&self, raw_name: &str) -> bool {
        self.selected_servers.is_empty()
            || self
                .selected_servers
                .contains(&canonical_server_name(raw_name))
    }

    pub fn apply(&mut self, update: SelectionUpdate) {
        if let Some(parameter) = update.parameter {
            self.parameter = parameter;
        }
        if let Some(servers) = update.servers {
            *self = std::mem::take(self).with_servers(servers);
        }
    }
}

/// Partial selection change coming from the front-end.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionUpdate {
    #[serde(default)]
    pub parameter: Option<Parameter>,
    #[serde(default)]
    pub servers: Option<Vec<String>>,
}
