// Catalog service - Use cases for listing countries and probe servers
use crate::application::measurement_repository::{FetchResult, MeasurementRepository};
use crate::domain::server::Server;
use serde::Serialize;
use std::sync::Arc;

const NO_SERVERS_MESSAGE: &str = "No hay servidores disponibles para la selección actual";

#[derive(Debug, Clone, Serialize)]
pub struct ServerCatalog {
    pub servers: Vec<Server>,
    /// Informational note for the user, set when the list is empty.
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn MeasurementRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn MeasurementRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_countries(&self) -> FetchResult<Vec<String>> {
        self.repository.available_countries().await
    }

    pub async fn list_servers(&self) -> FetchResult<ServerCatalog> {
        let servers: Vec<Server> = self
            .repository
            .available_servers()
            .await?
            .into_iter()
            .map(Server::new)
            .collect();

        let message = servers
            .is_empty()
            .then(|| NO_SERVERS_MESSAGE.to_string());
        Ok(ServerCatalog { servers, message })
    }
}
