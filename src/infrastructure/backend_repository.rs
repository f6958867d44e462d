// Measurement backend repository implementation
use crate::application::error::FetchError;
use crate::application::measurement_repository::{FetchResult, MeasurementRepository};
use crate::domain::measurement::{AverageRecord, Sample};
use crate::domain::server::ServerInfo;
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BackendRepository {
    base_url: String,
    client: reqwest::Client,
}

impl BackendRepository {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> FetchResult<Value> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::json_body(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> FetchResult<Value> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        Self::json_body(response).await
    }

    async fn json_body(response: reqwest::Response) -> FetchResult<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| FetchError::ShapeMismatch(e.to_string()))
    }
}

/// Decode a list payload that may also come wrapped as `{ "<field>": [...] }`.
///
/// Elements that do not decode are skipped with a warning.
pub fn decode_records<T: DeserializeOwned>(payload: Value, wrapper: &str) -> FetchResult<Vec<T>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove(wrapper) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(FetchError::ShapeMismatch(format!(
                    "object without a '{}' list",
                    wrapper
                )))
            }
        },
        other => {
            return Err(FetchError::ShapeMismatch(format!(
                "expected a list, got {}",
                kind_of(&other)
            )))
        }
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if records.len() < total {
        tracing::warn!(
            "Skipped {} of {} malformed '{}' records",
            total - records.len(),
            total,
            wrapper
        );
    }
    Ok(records)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[derive(Serialize)]
struct CountryRequest<'a> {
    pais: &'a str,
}

#[derive(Serialize)]
struct ServerSelectionRequest<'a> {
    pais: &'a str,
    cantidad: u32,
}

#[async_trait]
impl MeasurementRepository for BackendRepository {
    async fn recent_samples(&self) -> FetchResult<Vec<Sample>> {
        let payload = self.get_json("/mediciones-recientes", &[]).await?;
        decode_records(payload, "mediciones")
    }

    async fn last_hour_averages(&self) -> FetchResult<Vec<AverageRecord>> {
        let payload = self.get_json("/promedio-ultima-hora", &[]).await?;
        decode_records(payload, "promedios")
    }

    async fn samples_for_day(&self, date: &str) -> FetchResult<Vec<Sample>> {
        let path = format!("/mediciones-dia/{}", urlencoding::encode(date));
        let payload = self.get_json(&path, &[]).await?;
        decode_records(payload, "mediciones")
    }

    async fn samples_in_range(
        &self,
        date: &str,
        start_time: &str,
        end_time: &str,
    ) -> FetchResult<Vec<Sample>> {
        let query = [
            ("fecha", date),
            ("horaInicio", start_time),
            ("horaFin", end_time),
        ];
        let payload = self.get_json("/mediciones-rango", &query).await?;
        decode_records(payload, "mediciones")
    }

    async fn available_countries(&self) -> FetchResult<Vec<String>> {
        let payload = self.get_json("/paises-disponibles", &[]).await?;
        decode_records(payload, "paises")
    }

    async fn available_servers(&self) -> FetchResult<Vec<ServerInfo>> {
        let payload = self.get_json("/servidores-disponibles", &[]).await?;
        decode_records(payload, "servidores")
    }

    async fn connect_vpn(&self, country: &str) -> FetchResult<()> {
        self.post_json("/conectar-vpn", &CountryRequest { pais: country })
            .await?;
        Ok(())
    }

    async fn select_servers_for_country(&self, country: &str, count: u32) -> FetchResult<()> {
        let body = ServerSelectionRequest {
            pais: country,
            cantidad: count,
        };
        self.post_json("/seleccionar-servidores-por-pais", &body)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_trailing_slash() {
        let repo = BackendRepository::new("http://backend:5000/".to_string(), Duration::from_secs(1))
            .unwrap();
        assert_eq!(repo.url("/mediciones-recientes"), "http://backend:5000/mediciones-recientes");
    }

    #[test]
    fn test_decode_plain_list() {
        let payload = json!([
            {"timestamp": "2024-01-01T10:00:00Z", "servidor": "S1", "descarga": 50.0},
            {"timestamp": "2024-01-01T10:01:00Z", "servidor": "S1", "descarga": 52.0}
        ]);
        let samples: Vec<Sample> = decode_records(payload, "mediciones").unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].descarga, Some(52.0));
    }

    #[test]
    fn test_decode_wrapped_list() {
        let payload = json!({
            "promedios": [
                {"servidor": "A", "latencia_promedio": 12.5},
            ]
        });
        let averages: Vec<AverageRecord> = decode_records(payload, "promedios").unwrap();
        assert_eq!(averages[0].latencia_promedio, Some(12.5));
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        let wrong_wrapper = decode_records::<Sample>(json!({"data": []}), "mediciones");
        assert!(matches!(wrong_wrapper, Err(FetchError::ShapeMismatch(_))));

        let scalar = decode_records::<Sample>(json!("error"), "mediciones");
        assert!(matches!(scalar, Err(FetchError::ShapeMismatch(_))));

        let null = decode_records::<Sample>(Value::Null, "mediciones");
        assert!(matches!(null, Err(FetchError::ShapeMismatch(_))));
    }

    #[test]
    fn test_decode_skips_malformed_elements() {
        let payload = json!([
            {"timestamp": "2024-01-01T10:00:00Z", "servidor": "S1"},
            {"servidor": "missing timestamp"},
            42
        ]);
        let samples: Vec<Sample> = decode_records(payload, "mediciones").unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_decode_country_codes() {
        let countries: Vec<String> = decode_records(json!(["PE", "CL"]), "paises").unwrap();
        assert_eq!(countries, vec!["PE", "CL"]);
    }
}
