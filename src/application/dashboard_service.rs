// Dashboard service - Applies backend responses to the dashboard state
use crate::application::dashboard_state::DashboardState;
use crate::application::measurement_repository::{FetchResult, MeasurementRepository};
use crate::application::series_builder::TimeAxis;
use crate::domain::chart::DashboardView;
use crate::domain::measurement::Sample;
use crate::domain::selection::{DateRange, SelectionUpdate, ViewMode};
use crate::infrastructure::config::DisplaySettings;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// What happened to a refresh response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Applied to the state; carries the number of records received.
    Applied(usize),
    /// Not issued because the current mode does not poll.
    Skipped,
    /// Answered after the selection it was issued for was replaced.
    Stale,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn MeasurementRepository>,
    state: Arc<RwLock<DashboardState>>,
    axis: TimeAxis,
    label_separator: Option<String>,
    revisions: watch::Sender<u64>,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn MeasurementRepository>,
        display: &DisplaySettings,
    ) -> anyhow::Result<Self> {
        let axis = TimeAxis::new(
            display.utc_offset()?,
            &display.time_format,
            display.chronological_labels,
        )?;
        let state = DashboardState::new(
            display.dedup_key,
            display.max_live_samples,
            display.palette.clone(),
        );
        let (revisions, _) = watch::channel(state.revision());

        Ok(Self {
            repository,
            state: Arc::new(RwLock::new(state)),
            axis,
            label_separator: display.label_separator.clone(),
            revisions,
        })
    }

    /// Receiver that changes after every applied update.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revisions.subscribe()
    }

    pub async fn mode(&self) -> ViewMode {
        self.state.read().await.mode()
    }

    pub async fn view(&self) -> DashboardView {
        self.state
            .read()
            .await
            .view(&self.axis, self.label_separator.as_deref())
    }

    /// Merge the backend's recent samples into the live buffer.
    pub async fn refresh_live_samples(&self) -> FetchResult<RefreshOutcome> {
        let generation = {
            let state = self.state.read().await;
            if state.mode() != ViewMode::Live {
                return Ok(RefreshOutcome::Skipped);
            }
            state.generation()
        };

        let samples = self.repository.recent_samples().await?;

        let mut state = self.state.write().await;
        if !state.is_current(generation) || state.mode() != ViewMode::Live {
            tracing::debug!("Discarding stale live poll ({} samples)", samples.len());
            return Ok(RefreshOutcome::Stale);
        }
        let added = state.merge_live(&samples);
        self.publish(&state);
        tracing::debug!("Live poll: {} received, {} new", samples.len(), added);
        Ok(RefreshOutcome::Applied(samples.len()))
    }

    /// Replace the hourly averages. A malformed payload counts as an empty set.
    pub async fn refresh_averages(&self) -> FetchResult<RefreshOutcome> {
        let records = match self.repository.last_hour_averages().await {
            Ok(records) => records,
            Err(e) if e.is_shape_mismatch() => {
                tracing::warn!("Treating hourly averages as empty: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let count = records.len();
        let mut state = self.state.write().await;
        state.set_averages(records);
        self.publish(&state);
        Ok(RefreshOutcome::Applied(count))
    }

    /// Load every sample of `date` and switch to historical mode.
    pub async fn query_day(&self, date: &str) -> FetchResult<DashboardView> {
        let repository = self.repository.clone();
        let date_owned = date.to_string();
        self.historical_query(DateRange::day(date), async move {
            repository.samples_for_day(&date_owned).await
        })
        .await
    }

    /// Load the samples of `date` between two times and switch to historical mode.
    pub async fn query_range(
        &self,
        date: &str,
        start_time: &str,
        end_time: &str,
    ) -> FetchResult<DashboardView> {
        let range = DateRange::window(date, start_time, end_time);
        let repository = self.repository.clone();
        let query = range.clone();
        self.historical_query(range, async move {
            let start = query.start_time.as_deref().unwrap_or_default();
            let end = query.end_time.as_deref().unwrap_or_default();
            repository.samples_in_range(&query.date, start, end).await
        })
        .await
    }

    async fn historical_query<F>(&self, range: DateRange, fetch: F) -> FetchResult<DashboardView>
    where
        F: std::future::Future<Output = FetchResult<Vec<Sample>>>,
    {
        let generation = {
            let mut state = self.state.write().await;
            let generation = state.begin_query();
            self.publish(&state);
            generation
        };

        let result = fetch.await;

        let mut state = self.state.write().await;
        if !state.is_current(generation) {
            tracing::debug!("Discarding stale historical response for {}", range.date);
            return Ok(state.view(&self.axis, self.label_separator.as_deref()));
        }

        match result {
            Ok(records) => {
                tracing::info!("Historical query {}: {} samples", range.date, records.len());
                state.enter_historical(range, records);
                self.publish(&state);
                Ok(state.view(&self.axis, self.label_separator.as_deref()))
            }
            Err(e) => {
                tracing::error!("Historical query {} failed: {}", range.date, e);
                state.query_failed(e.to_string());
                self.publish(&state);
                Err(e)
            }
        }
    }

    /// Leave historical mode and resume live polling.
    pub async fn show_live(&self) -> DashboardView {
        let mut state = self.state.write().await;
        state.show_live();
        self.publish(&state);
        state.view(&self.axis, self.label_separator.as_deref())
    }

    pub async fn update_selection(&self, update: SelectionUpdate) -> DashboardView {
        let mut state = self.state.write().await;
        state.set_selection(update);
        self.publish(&state);
        state.view(&self.axis, self.label_separator.as_deref())
    }

    /// Connect the VPN exit for `country`, pick its servers and restart the live buffer.
    pub async fn select_country(&self, country: &str, server_count: u32) -> FetchResult<DashboardView> {
        self.repository.connect_vpn(country).await?;
        self.repository
            .select_servers_for_country(country, server_count)
            .await?;

        let mut state = self.state.write().await;
        state.select_country(country.to_string());
        self.publish(&state);
        tracing::info!("Measuring through {} with {} servers", country, server_count);
        Ok(state.view(&self.axis, self.label_separator.as_deref()))
    }

    fn publish(&self, state: &DashboardState) {
        self.revisions.send_replace(state.revision());
    }
}
