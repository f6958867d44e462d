// Probe server domain model
use serde::{Deserialize, Serialize};

const VENDOR_PREFIX: &str = "Speedtest by Ookla - ";
const SUFFIX_SEPARATOR: &str = " - ";

/// Server entry as listed by the backend's server catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub nombre: String,
    #[serde(default)]
    pub sponsor: Option<String>,
}

/// Server entry handed to the front-end, with its display name resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    pub name: String,
    pub raw_name: String,
    pub sponsor: Option<String>,
}

impl Server {
    pub fn new(info: ServerInfo) -> Self {
        Self {
            name: canonical_server_name(&info.nombre),
            raw_name: info.nombre,
            sponsor: info.sponsor,
        }
    }
}

/// Strip the vendor prefix and the trailing ` - <digits>` server id.
///
/// Applied until nothing changes, so the result is stable under reapplication:
/// "Speedtest by Ookla - ACME - 1234" becomes "ACME".
pub fn canonical_server_name(raw: &str) -> String {
    let mut name = raw.trim();
    loop {
        let before = name;
        if let Some(rest) = name.strip_prefix(VENDOR_PREFIX) {
            name = rest.trim();
        }
        if let Some((head, tail)) = name.rsplit_once(SUFFIX_SEPARATOR) {
            let tail = tail.trim();
            if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
                name = head.trim();
            }
        }
        if name == before {
            return name.to_string();
        }
    }
}

/// Portion of a display name before `separator`, or the whole name.
pub fn short_label(name: &str, separator: Option<&str>) -> String {
    match separator.filter(|s| !s.is_empty()) {
        Some(sep) => match name.split_once(sep) {
            Some((head, _)) if !head.trim().is_empty() => head.trim().to_string(),
            _ => name.to_string(),
        },
        None => name.to_string(),
    }
}
