// Poll scheduler - Periodic live refresh of samples and hourly averages
use crate::application::dashboard_service::{DashboardService, RefreshOutcome};
use crate::domain::selection::ViewMode;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Clone)]
pub struct PollScheduler {
    service: DashboardService,
    samples_every: Duration,
    averages_every: Duration,
}

impl PollScheduler {
    pub fn new(service: DashboardService, samples_every: Duration, averages_every: Duration) -> Self {
        Self {
            service,
            samples_every,
            averages_every,
        }
    }

    /// Start both polling loops. They run until `shutdown` flips to true or its
    /// sender is dropped.
    pub fn start(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let samples = {
            let service = self.service.clone();
            tokio::spawn(run_every(
                "samples",
                self.samples_every,
                shutdown.clone(),
                move || poll_samples(service.clone()),
            ))
        };

        let averages = {
            let service = self.service.clone();
            tokio::spawn(run_every(
                "averages",
                self.averages_every,
                shutdown,
                move || poll_averages(service.clone()),
            ))
        };

        vec![samples, averages]
    }

    /// One immediate refresh of both stores, outside the regular ticks.
    pub fn refresh_now(&self) {
        tokio::spawn(poll_samples(self.service.clone()));
        tokio::spawn(poll_averages(self.service.clone()));
    }
}

/// Fire `tick` on every period without waiting for earlier ticks to finish.
async fn run_every<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    tick: F,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!("Polling {} every {:?}", name, period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                tokio::spawn(tick());
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!("Stopped polling {}", name);
}

async fn poll_samples(service: DashboardService) {
    match service.refresh_live_samples().await {
        Ok(RefreshOutcome::Applied(count)) => {
            tracing::debug!("Sample poll applied {} records", count);
        }
        Ok(outcome) => {
            tracing::debug!("Sample poll not applied: {:?}", outcome);
        }
        Err(e) => {
            tracing::warn!("Error polling recent samples: {}", e);
        }
    }
}

async fn poll_averages(service: DashboardService) {
    // mode is read at tick time, not when the loop was set up
    if service.mode().await != ViewMode::Live {
        return;
    }
    match service.refresh_averages().await {
        Ok(outcome) => {
            tracing::debug!("Average poll: {:?}", outcome);
        }
        Err(e) => {
            tracing::warn!("Error polling hourly averages: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::measurement_repository::fake::FakeRepository;
    use crate::application::sample_store::tests::sample;
    use crate::infrastructure::config::DisplaySettings;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn scheduler(repo: Arc<FakeRepository>) -> (PollScheduler, DashboardService) {
        let service = DashboardService::new(repo, &DisplaySettings::default()).unwrap();
        let scheduler = PollScheduler::new(
            service.clone(),
            Duration::from_secs(60),
            Duration::from_secs(60),
        );
        (scheduler, service)
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_repeat_on_interval() {
        let repo = Arc::new(FakeRepository::default());
        *repo.recent.lock().unwrap() = Some(vec![sample("2024-01-01T10:00:00Z", "S1", 50.0)]);
        *repo.averages.lock().unwrap() = Some(Vec::new());
        let (scheduler, service) = scheduler(repo.clone());
        let (_stop, shutdown) = watch::channel(false);

        scheduler.start(shutdown);
        tokio::time::sleep(Duration::from_secs(125)).await;

        assert_eq!(repo.recent_calls.load(Ordering::SeqCst), 3);
        assert_eq!(repo.averages_calls.load(Ordering::SeqCst), 3);
        assert_eq!(service.view().await.line.series.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_polling() {
        let repo = Arc::new(FakeRepository::default());
        let (scheduler, _service) = scheduler(repo.clone());
        let (_stop, shutdown) = watch::channel(false);

        scheduler.start(shutdown);
        tokio::time::sleep(Duration::from_secs(185)).await;

        assert_eq!(repo.recent_calls.load(Ordering::SeqCst), 4);
        assert_eq!(repo.averages_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_historical_mode_suspends_polling() {
        let repo = Arc::new(FakeRepository::default());
        *repo.day.lock().unwrap() = Some(Vec::new());
        let (scheduler, service) = scheduler(repo.clone());
        service.query_day("2024-01-02").await.unwrap();
        let (_stop, shutdown) = watch::channel(false);

        scheduler.start(shutdown);
        tokio::time::sleep(Duration::from_secs(125)).await;

        assert_eq!(repo.recent_calls.load(Ordering::SeqCst), 0);
        assert_eq!(repo.averages_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_loops() {
        let repo = Arc::new(FakeRepository::default());
        let (scheduler, _service) = scheduler(repo.clone());
        let (stop, shutdown) = watch::channel(false);

        let handles = scheduler.start(shutdown);
        tokio::time::sleep(Duration::from_secs(1)).await;
        stop.send(true).unwrap();
        for handle in handles {
            handle.await.unwrap();
        }

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(repo.recent_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_resumes_after_show_live() {
        let repo = Arc::new(FakeRepository::default());
        *repo.day.lock().unwrap() = Some(Vec::new());
        *repo.recent.lock().unwrap() = Some(vec![sample("2024-01-01T10:00:00Z", "S1", 50.0)]);
        *repo.averages.lock().unwrap() = Some(Vec::new());
        let (scheduler, service) = scheduler(repo.clone());
        service.query_day("2024-01-02").await.unwrap();

        service.show_live().await;
        scheduler.refresh_now();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(repo.recent_calls.load(Ordering::SeqCst), 1);
        assert_eq!(repo.averages_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.view().await.line.series.len(), 1);
    }
}
