// Aggregate store - Latest rolling-hour averages per server
use crate::domain::measurement::AverageRecord;
use crate::domain::server::canonical_server_name;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct AggregateStore {
    records: Vec<AverageRecord>,
    servers: Vec<String>,
}

impl AggregateStore {
    /// Replace every record and recompute the distinct server list.
    pub fn set_averages(&mut self, records: Vec<AverageRecord>) {
        self.servers = distinct_servers(records.iter().map(|r| r.servidor.as_str()));
        self.records = records;
    }

    pub fn records(&self) -> &[AverageRecord] {
        &self.records
    }

    /// Canonical server names in first-occurrence order.
    pub fn servers(&self) -> &[String] {
        &self.servers
    }
}

/// Canonicalize and deduplicate, keeping first occurrence order.
pub fn distinct_servers<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(canonical_server_name)
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn average(server: &str, latency: f64) -> AverageRecord {
        AverageRecord {
            servidor: server.to_string(),
            descarga_promedio: Some(80.0),
            subida_promedio: Some(40.0),
            latencia_promedio: Some(latency),
            jitter_promedio: Some(2.0),
            perdida_promedio: Some(0.1),
        }
    }

    #[test]
    fn test_set_averages_replaces_records() {
        let mut store = AggregateStore::default();
        store.set_averages(vec![average("A", 10.0), average("B", 20.0)]);
        store.set_averages(vec![average("C", 30.0)]);

        assert_eq!(store.records().len(), 1);
        assert_eq!(store.servers(), &["C".to_string()]);
    }

    #[test]
    fn test_servers_are_canonical_and_distinct() {
        let mut store = AggregateStore::default();
        store.set_averages(vec![
            average("Speedtest by Ookla - ACME - 1", 10.0),
            average("Beta", 20.0),
            average("ACME - 2", 30.0),
        ]);

        assert_eq!(store.servers(), &["ACME".to_string(), "Beta".to_string()]);
        assert_eq!(store.records().len(), 3);
    }
}
