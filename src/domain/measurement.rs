// Measurement domain models
use serde::{Deserialize, Serialize};

/// A single speed test result reported by the backend for one probe server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: String,
    pub servidor: String,
    #[serde(default)]
    pub descarga: Option<f64>,
    #[serde(default)]
    pub subida: Option<f64>,
    #[serde(default)]
    pub latencia: Option<f64>,
    #[serde(default)]
    pub jitter: Option<f64>,
    #[serde(default)]
    pub perdida: Option<f64>,
}

impl Sample {
    /// Value of the requested metric, if present and finite.
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        let raw = match parameter {
            Parameter::Download => self.descarga,
            Parameter::Upload => self.subida,
            Parameter::Latency => self.latencia,
            Parameter::Jitter => self.jitter,
            Parameter::Loss => self.perdida,
        };
        raw.filter(|v| v.is_finite())
    }
}

/// Rolling one-hour average for a server, as computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRecord {
    pub servidor: String,
    #[serde(default)]
    pub descarga_promedio: Option<f64>,
    #[serde(default)]
    pub subida_promedio: Option<f64>,
    #[serde(default)]
    pub latencia_promedio: Option<f64>,
    #[serde(default)]
    pub jitter_promedio: Option<f64>,
    #[serde(default)]
    pub perdida_promedio: Option<f64>,
}

impl AverageRecord {
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        let raw = match parameter {
            Parameter::Download => self.descarga_promedio,
            Parameter::Upload => self.subida_promedio,
            Parameter::Latency => self.latencia_promedio,
            Parameter::Jitter => self.jitter_promedio,
            Parameter::Loss => self.perdida_promedio,
        };
        raw.filter(|v| v.is_finite())
    }
}

/// Metric shown on the line chart and keyed on the bar charts.
///
/// Accepts both the English names and the backend's field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    #[default]
    #[serde(alias = "descarga")]
    Download,
    #[serde(alias = "subida")]
    Upload,
    #[serde(alias = "latencia")]
    Latency,
    Jitter,
    #[serde(alias = "perdida")]
    Loss,
}

impl Parameter {
    /// Order in which the hourly average charts are laid out.
    pub const AVERAGE_CHARTS: [Parameter; 5] = [
        Parameter::Latency,
        Parameter::Jitter,
        Parameter::Download,
        Parameter::Upload,
        Parameter::Loss,
    ];

    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Download | Parameter::Upload => "Mbps",
            Parameter::Latency | Parameter::Jitter => "ms",
            Parameter::Loss => "%",
        }
    }

    pub fn average_title(&self) -> String {
        let name = match self {
            Parameter::Download => "Descarga",
            Parameter::Upload => "Subida",
            Parameter::Latency => "Latencia",
            Parameter::Jitter => "Jitter",
            Parameter::Loss => "Pérdida",
        };
        format!("{} Promedio ({}) de la última hora", name, self.unit())
    }
}
