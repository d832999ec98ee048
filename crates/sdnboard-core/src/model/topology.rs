// ── Topology domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ids::{Dpid, MacAddress};

/// Switch status as reported by the SDN controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SwitchStatus {
    Connected,
    Disconnected,
}

impl SwitchStatus {
    /// Map the backend's status string. Anything other than a connected
    /// marker counts as disconnected.
    pub fn from_backend(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("conectado" | "connected" | "up" | "online") => Self::Connected,
            _ => Self::Disconnected,
        }
    }
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside the valid latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// An OpenFlow switch placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub id: i64,
    pub name: String,
    /// Datapath id as the backend stores it (hex string).
    pub dpid_hex: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: SwitchStatus,
}

impl Switch {
    /// Position, if both coordinates are present and valid.
    pub fn location(&self) -> Option<GeoPoint> {
        let point = GeoPoint::new(self.latitude?, self.longitude?);
        point.is_valid().then_some(point)
    }

    pub fn dpid(&self) -> Option<Dpid> {
        self.dpid_hex.as_deref().and_then(Dpid::parse_hex)
    }

    pub fn is_connected(&self) -> bool {
        self.status == SwitchStatus::Connected
    }
}

/// An emulated end host attached to one switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub mac: MacAddress,
    pub name: String,
    pub ip: Option<String>,
    pub switch_id: Option<i64>,
}

/// Inter-switch link. The pair is unordered for identity purposes but the
/// backend keeps the direction it was created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: i64,
    pub dest: i64,
    pub bandwidth_mbps: u32,
}

impl Link {
    /// Store key; natural ordering of these keys sorts by source then dest.
    pub fn key(&self) -> String {
        format!("{}-{}", self.source, self.dest)
    }

    pub fn connects(&self, a: i64, b: i64) -> bool {
        (self.source == a && self.dest == b) || (self.source == b && self.dest == a)
    }
}

/// One full topology fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub switches: Vec<Switch>,
    pub hosts: Vec<Host>,
    pub links: Vec<Link>,
}

impl Topology {
    /// The SDN controller is considered online when any switch reports
    /// connected.
    pub fn controller_online(&self) -> bool {
        self.switches.iter().any(Switch::is_connected)
    }

    pub fn switch(&self, id: i64) -> Option<&Switch> {
        self.switches.iter().find(|s| s.id == id)
    }

    pub fn host(&self, mac: &MacAddress) -> Option<&Host> {
        self.hosts.iter().find(|h| &h.mac == mac)
    }

    pub fn host_by_name(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.name == name)
    }

    pub fn host_names(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(|h| h.name.as_str())
    }
}
