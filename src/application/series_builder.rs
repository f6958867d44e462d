// Series builder - Chart-ready line and bar series from filtered records
use crate::application::colors::ColorAssignment;
use crate::domain::chart::{BarChart, LineChart, LinePoint, LineSeries};
use crate::domain::measurement::{AverageRecord, Parameter, Sample};
use crate::domain::server::{canonical_server_name, short_label};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use std::collections::HashMap;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Renders sample timestamps as X-axis labels in a fixed UTC offset.
#[derive(Debug, Clone)]
pub struct TimeAxis {
    offset: FixedOffset,
    format: String,
    chronological: bool,
}

impl TimeAxis {
    pub fn new(offset: FixedOffset, format: &str, chronological: bool) -> anyhow::Result<Self> {
        if StrftimeItems::new(format).any(|item| item == Item::Error) {
            anyhow::bail!("invalid time label format: {}", format);
        }
        Ok(Self {
            offset,
            format: format.to_string(),
            chronological,
        })
    }

    /// Parse RFC 3339 or RFC 2822 timestamps; naive ones are read in the axis offset.
    fn instant(&self, timestamp: &str) -> Option<DateTime<FixedOffset>> {
        let timestamp = timestamp.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
            return Some(parsed.with_timezone(&self.offset));
        }
        if let Ok(parsed) = DateTime::parse_from_rfc2822(timestamp) {
            return Some(parsed.with_timezone(&self.offset));
        }
        NAIVE_FORMATS.iter().find_map(|fmt| {
            NaiveDateTime::parse_from_str(timestamp, fmt)
                .ok()
                .and_then(|naive| self.offset.from_local_datetime(&naive).single())
        })
    }

    /// Display label and parsed instant for a timestamp.
    ///
    /// Unparseable input is used verbatim as its own label.
    pub fn label(&self, timestamp: &str) -> (String, Option<DateTime<FixedOffset>>) {
        match self.instant(timestamp) {
            Some(instant) => (instant.format(&self.format).to_string(), Some(instant)),
            None => (timestamp.to_string(), None),
        }
    }
}

/// Build the multi-server line chart for `parameter`.
///
/// Labels are the distinct time labels in first-seen order (chronological when the
/// axis asks for it). Each server gets the values that are present and finite, so
/// a series can be shorter than the label list.
pub fn build_line_series(
    samples: &[&Sample],
    parameter: Parameter,
    colors: &ColorAssignment,
    axis: &TimeAxis,
) -> LineChart {
    let mut labels: Vec<(String, Option<DateTime<FixedOffset>>)> = Vec::new();
    let mut label_index: HashMap<String, usize> = HashMap::new();
    let mut servers: Vec<String> = Vec::new();
    let mut series_index: HashMap<String, usize> = HashMap::new();
    let mut points: Vec<Vec<LinePoint>> = Vec::new();

    for sample in samples {
        let (label, instant) = axis.label(&sample.timestamp);
        match label_index.get(&label) {
            Some(&idx) => {
                // keep the earliest instant behind a shared label for sorting
                if let (Some(at), Some(current)) = (instant, labels[idx].1) {
                    if at < current {
                        labels[idx].1 = Some(at);
                    }
                }
            }
            None => {
                label_index.insert(label.clone(), labels.len());
                labels.push((label.clone(), instant));
            }
        }

        let server = canonical_server_name(&sample.servidor);
        let idx = *series_index.entry(server.clone()).or_insert_with(|| {
            servers.push(server);
            points.push(Vec::new());
            points.len() - 1
        });
        if let Some(value) = sample.value(parameter) {
            points[idx].push(LinePoint { x: label, y: value });
        }
    }

    if axis.chronological {
        labels.sort_by_key(|(_, instant)| (instant.is_none(), *instant));
    }

    let series = servers
        .into_iter()
        .zip(points)
        .enumerate()
        .map(|(index, (server, points))| LineSeries {
            color: colors.color_for(&server, index),
            values: points.iter().map(|p| p.y).collect(),
            label: server,
            points,
        })
        .collect();

    LineChart {
        labels: labels.into_iter().map(|(label, _)| label).collect(),
        series,
    }
}

/// One bar per average record, colored by server.
pub fn build_bar_series(
    averages: &[&AverageRecord],
    parameter: Parameter,
    colors: &ColorAssignment,
    separator: Option<&str>,
) -> BarChart {
    let mut labels = Vec::with_capacity(averages.len());
    let mut values = Vec::with_capacity(averages.len());
    let mut bar_colors = Vec::with_capacity(averages.len());

    for (index, record) in averages.iter().enumerate() {
        let name = canonical_server_name(&record.servidor);
        bar_colors.push(colors.color_for(&name, index));
        labels.push(short_label(&name, separator));
        values.push(record.value(parameter));
    }

    BarChart {
        parameter,
        title: parameter.average_title(),
        unit: parameter.unit(),
        labels,
        values,
        colors: bar_colors,
    }
}
