// Repository trait for measurement backend access
use crate::application::error::FetchError;
use crate::domain::measurement::{AverageRecord, Sample};
use crate::domain::server::ServerInfo;
use async_trait::async_trait;

pub type FetchResult<T> = Result<T, FetchError>;

#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Most recent samples across all probe servers
    async fn recent_samples(&self) -> FetchResult<Vec<Sample>>;

    /// Rolling last-hour average per server
    async fn last_hour_averages(&self) -> FetchResult<Vec<AverageRecord>>;

    /// All samples recorded on a given date (YYYY-MM-DD)
    async fn samples_for_day(&self, date: &str) -> FetchResult<Vec<Sample>>;

    /// Samples recorded on `date` between two HH:MM times
    async fn samples_in_range(
        &self,
        date: &str,
        start_time: &str,
        end_time: &str,
    ) -> FetchResult<Vec<Sample>>;

    async fn available_countries(&self) -> FetchResult<Vec<String>>;

    async fn available_servers(&self) -> FetchResult<Vec<ServerInfo>>;

    /// Ask the backend to route measurements through a VPN exit in `country`
    async fn connect_vpn(&self, country: &str) -> FetchResult<()>;

    /// Ask the backend to pick `count` probe servers in `country`
    async fn select_servers_for_country(&self, country: &str, count: u32) -> FetchResult<()>;
}
