// ── Streaming domain types ──
//
// Video servers multicast a file into the emulated network; clients are
// players bound to one server's group.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A host currently running a video server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveServer {
    pub host_name: String,
    pub video_path: Option<String>,
    pub multicast_ip: Option<String>,
    pub multicast_port: Option<u16>,
    pub weight: Option<u32>,
    pub status: Option<String>,
    pub last_updated: Option<String>,
}

impl ActiveServer {
    /// `ip:port` of the multicast group, when both halves are known.
    pub fn group(&self) -> Option<String> {
        Some(format!("{}:{}", self.multicast_ip.as_deref()?, self.multicast_port?))
    }

    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.last_updated.as_deref().and_then(parse_timestamp)
    }
}

/// A host currently playing a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveClient {
    pub host: String,
    pub server: Option<String>,
    pub destination_ip: Option<String>,
    pub port: Option<u16>,
    pub video: Option<String>,
    pub started_at: Option<String>,
}

impl ActiveClient {
    pub fn started_at_utc(&self) -> Option<DateTime<Utc>> {
        self.started_at.as_deref().and_then(parse_timestamp)
    }
}

/// The multicast group the backend assigned to a new client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamAssignment {
    pub server_host: String,
    pub multicast_ip: String,
    pub multicast_port: u16,
}

/// Result of starting one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStarted {
    pub host_name: String,
    pub message: String,
    pub multicast_ip: String,
    pub multicast_port: u16,
}

/// Result of starting one client player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStarted {
    pub host: String,
    pub assignment: StreamAssignment,
    pub message: String,
    pub player_pid: Option<u32>,
}

/// Parse the timestamp shapes the backend emits: RFC 2822 (Flask's JSON
/// encoding of datetimes), RFC 3339, and naive `YYYY-MM-DD HH:MM:SS`
/// taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_timestamp_shapes() {
        let rfc2822 = parse_timestamp("Wed, 01 May 2024 10:00:00 GMT").unwrap();
        let naive = parse_timestamp("2024-05-01 10:00:00").unwrap();
        let iso = parse_timestamp("2024-05-01T10:00:00").unwrap();
        assert_eq!(rfc2822, naive);
        assert_eq!(naive, iso);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn group_needs_ip_and_port() {
        let mut server = ActiveServer {
            host_name: "h1".into(),
            video_path: None,
            multicast_ip: Some("239.0.0.1".into()),
            multicast_port: Some(5004),
            weight: Some(1),
            status: None,
            last_updated: None,
        };
        assert_eq!(server.group().as_deref(), Some("239.0.0.1:5004"));
        server.multicast_port = None;
        assert!(server.group().is_none());
    }
}
