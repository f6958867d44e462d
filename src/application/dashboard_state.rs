// Dashboard state - Single owner of stores, selection and load status
use crate::application::aggregate_store::{distinct_servers, AggregateStore};
use crate::application::colors::ColorAssignment;
use crate::application::sample_store::SampleStore;
use crate::application::selection_filter::{filter_averages, filter_samples};
use crate::application::series_builder::{build_bar_series, build_line_series, TimeAxis};
use crate::domain::chart::{DashboardView, DataStatus};
use crate::domain::measurement::{AverageRecord, Parameter, Sample};
use crate::domain::selection::{DateRange, Selection, SelectionUpdate, ViewMode};
use crate::infrastructure::config::DedupKey;
use std::collections::VecDeque;

/// Tag identifying the mode/selection a request was issued under.
pub type Generation = u64;

#[derive(Debug, Clone)]
pub struct DashboardState {
    mode: ViewMode,
    samples: SampleStore,
    averages: AggregateStore,
    selection: Selection,
    colors: ColorAssignment,
    status: DataStatus,
    generation: Generation,
    revision: u64,
}

impl DashboardState {
    pub fn new(dedup: DedupKey, max_live_samples: usize, palette: Vec<String>) -> Self {
        Self {
            mode: ViewMode::Live,
            samples: SampleStore::new(dedup, max_live_samples),
            averages: AggregateStore::default(),
            selection: Selection::default(),
            colors: ColorAssignment::new(palette),
            status: DataStatus::Loading,
            generation: 0,
            revision: 0,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// Samples feeding the line chart: live or historical, never both.
    pub fn active_samples(&self) -> &VecDeque<Sample> {
        self.samples.active(self.mode)
    }

    /// Merge a live poll. Returns the number of new samples.
    pub fn merge_live(&mut self, incoming: &[Sample]) -> usize {
        self.colors
            .register(distinct_servers(incoming.iter().map(|s| s.servidor.as_str())));
        let added = self.samples.merge_live(incoming);
        if self.mode == ViewMode::Live {
            self.status = status_for(self.samples.live().len());
        }
        self.touch();
        added
    }

    pub fn set_averages(&mut self, records: Vec<AverageRecord>) {
        self.averages.set_averages(records);
        self.colors.register(self.averages.servers());
        self.touch();
    }

    pub fn set_selection(&mut self, update: SelectionUpdate) {
        self.selection.apply(update);
        self.touch();
    }

    /// Start a historical query; any older in-flight query becomes stale.
    pub fn begin_query(&mut self) -> Generation {
        self.generation += 1;
        self.status = DataStatus::Loading;
        self.touch();
        self.generation
    }

    /// Switch to historical mode with the records of a successful query.
    pub fn enter_historical(&mut self, range: DateRange, records: Vec<Sample>) {
        self.colors
            .register(distinct_servers(records.iter().map(|s| s.servidor.as_str())));
        self.status = status_for(records.len());
        self.samples.replace_historical(records);
        self.selection.date_range = Some(range);
        self.mode = ViewMode::Historical;
        self.touch();
    }

    /// Record a failed query; data already on screen stays in place.
    pub fn query_failed(&mut self, message: String) {
        self.status = DataStatus::Failed(message);
        self.touch();
    }

    /// Back to live polling: drop historical data and the date filter.
    pub fn show_live(&mut self) {
        self.generation += 1;
        self.samples.enter_live();
        self.selection.date_range = None;
        self.mode = ViewMode::Live;
        self.status = if self.samples.live().is_empty() {
            DataStatus::Loading
        } else {
            DataStatus::Ready
        };
        self.touch();
    }

    /// A new country starts a fresh measurement cycle with an empty live buffer.
    pub fn select_country(&mut self, country: String) {
        self.generation += 1;
        self.samples.clear_live();
        self.selection.country = Some(country);
        self.selection.selected_servers.clear();
        if self.mode == ViewMode::Live {
            self.status = DataStatus::Loading;
        }
        self.touch();
    }

    pub fn view(&self, axis: &TimeAxis, label_separator: Option<&str>) -> DashboardView {
        let active = self.active_samples();
        let samples = filter_samples(active, &self.selection);
        let averages = filter_averages(self.averages.records(), &self.selection);

        let line = build_line_series(&samples, self.selection.parameter, &self.colors, axis);
        let bars = Parameter::AVERAGE_CHARTS
            .iter()
            .map(|&parameter| build_bar_series(&averages, parameter, &self.colors, label_separator))
            .collect();

        DashboardView {
            revision: self.revision,
            mode: self.mode,
            status: self.status.clone(),
            selection: self.selection.clone(),
            servers: self.known_servers(active),
            line,
            bars,
        }
    }

    /// Servers from the averages first, then any seen only in the active samples.
    fn known_servers(&self, samples: &VecDeque<Sample>) -> Vec<String> {
        let averaged = self.averages.servers().iter().map(String::as_str);
        distinct_servers(averaged.chain(samples.iter().map(|s| s.servidor.as_str())))
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

fn status_for(sample_count: usize) -> DataStatus {
    if sample_count == 0 {
        DataStatus::NoData
    } else {
        DataStatus::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::aggregate_store::tests::average;
    use crate::application::sample_store::tests::sample;
    use chrono::FixedOffset;

    fn state() -> DashboardState {
        DashboardState::new(DedupKey::Timestamp, 1_000, vec!["red".to_string(), "green".to_string()])
    }

    fn axis() -> TimeAxis {
        TimeAxis::new(FixedOffset::east_opt(0).unwrap(), "%H:%M", false).unwrap()
    }

    #[test]
    fn test_initial_view_is_loading_and_empty() {
        let view = state().view(&axis(), None);
        assert_eq!(view.status, DataStatus::Loading);
        assert_eq!(view.mode, ViewMode::Live);
        assert!(view.line.series.is_empty());
        assert!(view.servers.is_empty());
        assert_eq!(view.bars.len(), 5);
    }

    #[test]
    fn test_bar_colors_are_stable_across_refreshes() {
        let mut state = state();
        state.set_averages(vec![average("A", 1.0), average("B", 2.0)]);
        let first = state.view(&axis(), None);
        state.set_averages(vec![average("A", 3.0), average("B", 4.0)]);
        let second = state.view(&axis(), None);

        let bars = &first.bars[0];
        assert_eq!(bars.labels.len(), 2);
        assert_ne!(bars.colors[0], bars.colors[1]);
        assert_eq!(first.bars[0].colors, second.bars[0].colors);
    }

    #[test]
    fn test_colors_survive_reordered_averages() {
        let mut state = state();
        state.set_averages(vec![average("A", 1.0), average("B", 2.0)]);
        state.set_averages(vec![average("B", 2.0), average("A", 1.0)]);

        let view = state.view(&axis(), None);
        assert_eq!(view.bars[0].labels, vec!["B", "A"]);
        assert_eq!(view.bars[0].colors, vec!["green", "red"]);
    }

    #[test]
    fn test_empty_historical_day_reports_no_data() {
        let mut state = state();
        state.merge_live(&[sample("2024-01-01T10:00:00Z", "S1", 50.0)]);

        state.begin_query();
        assert_eq!(state.view(&axis(), None).status, DataStatus::Loading);

        state.enter_historical(DateRange::day("2024-01-02"), Vec::new());
        let view = state.view(&axis(), None);
        assert_eq!(view.mode, ViewMode::Historical);
        assert_eq!(view.status, DataStatus::NoData);
        assert!(view.line.labels.is_empty());
        assert!(view.line.series.is_empty());
    }

    #[test]
    fn test_show_live_resets_date_filter() {
        let mut state = state();
        state.begin_query();
        state.enter_historical(
            DateRange::window("2024-01-02", "10:00", "11:00"),
            vec![sample("2024-01-02T10:30:00Z", "S1", 40.0)],
        );
        assert_eq!(state.active_samples().len(), 1);

        let before = state.generation();
        state.show_live();

        assert!(!state.is_current(before));
        assert_eq!(state.mode(), ViewMode::Live);
        assert!(state.active_samples().is_empty());
        let view = state.view(&axis(), None);
        assert!(view.selection.date_range.is_none());
        assert_eq!(view.status, DataStatus::Loading);
    }

    #[test]
    fn test_failed_query_keeps_prior_data() {
        let mut state = state();
        state.merge_live(&[sample("2024-01-01T10:00:00Z", "S1", 50.0)]);
        state.begin_query();
        state.query_failed("request timed out".to_string());

        let view = state.view(&axis(), None);
        assert_eq!(view.status, DataStatus::Failed("request timed out".to_string()));
        assert_eq!(view.line.series.len(), 1);
    }

    #[test]
    fn test_selection_filters_view() {
        let mut state = state();
        state.merge_live(&[
            sample("2024-01-01T10:00:00Z", "A", 1.0),
            sample("2024-01-01T10:01:00Z", "B", 2.0),
        ]);
        state.set_averages(vec![average("A", 1.0), average("B", 2.0)]);
        state.set_selection(SelectionUpdate {
            parameter: Some(Parameter::Latency),
            servers: Some(vec!["B".to_string()]),
        });

        let view = state.view(&axis(), None);
        assert_eq!(view.line.series.len(), 1);
        assert_eq!(view.line.series[0].label, "B");
        assert_eq!(view.line.series[0].values, vec![10.0]);
        assert_eq!(view.line.series[0].color, "green");
        assert_eq!(view.bars[0].labels, vec!["B"]);
        assert_eq!(view.servers, vec!["A", "B"]);
    }

    #[test]
    fn test_country_change_clears_live_samples() {
        let mut state = state();
        state.merge_live(&[sample("t1", "A", 1.0)]);
        state.set_selection(SelectionUpdate {
            parameter: None,
            servers: Some(vec!["A".to_string()]),
        });

        state.select_country("CL".to_string());

        assert!(state.active_samples().is_empty());
        let view = state.view(&axis(), None);
        assert_eq!(view.selection.country.as_deref(), Some("CL"));
        assert!(view.selection.selected_servers.is_empty());
        assert_eq!(view.status, DataStatus::Loading);
    }

    #[test]
    fn test_revision_advances_on_every_transition() {
        let mut state = state();
        let start = state.revision();
        state.merge_live(&[]);
        state.set_averages(Vec::new());
        assert_eq!(state.revision(), start + 2);
    }

    #[test]
    fn test_servers_include_those_only_seen_in_samples() {
        let mut state = state();
        state.merge_live(&[
            sample("2024-01-01T10:00:00Z", "Speedtest by Ookla - C - 77", 1.0),
            sample("2024-01-01T10:01:00Z", "A", 2.0),
        ]);
        assert_eq!(state.view(&axis(), None).servers, vec!["C", "A"]);

        state.set_averages(vec![average("A", 1.0), average("B", 2.0)]);
        assert_eq!(state.view(&axis(), None).servers, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_historical_servers_listed_without_averages() {
        let mut state = state();
        state.begin_query();
        state.enter_historical(
            DateRange::day("2024-01-02"),
            vec![sample("2024-01-02T10:00:00Z", "H", 1.0)],
        );

        let view = state.view(&axis(), None);
        assert_eq!(view.servers, vec!["H"]);
        assert_eq!(view.line.series[0].label, "H");
    }
}
