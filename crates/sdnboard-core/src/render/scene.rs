// ── Rendered scene ──
//
// A `Scene` is the complete, frontend-agnostic output of one render pass.
// Frontends draw it as-is; nothing in here is recomputed per frame.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::tier::BandwidthTier;
use crate::model::{Dpid, GeoPoint, MacAddress, RoutePath, SwitchStatus};

/// Map centre used when nothing could be placed.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 54.5,
    lon: 15.3,
};

/// Slippy-map zoom level of the default view.
pub const DEFAULT_ZOOM: u8 = 4;

/// Smallest span (degrees) a fitted viewport may have on either axis.
const MIN_FIT_SPAN: f64 = 0.05;

/// Fraction of the bounding box added on every side when fitting.
const FIT_PADDING: f64 = 0.1;

// ── Markers ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchMarker {
    pub id: i64,
    pub name: String,
    pub dpid: Option<Dpid>,
    pub position: GeoPoint,
    pub status: SwitchStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMarker {
    pub mac: MacAddress,
    pub name: String,
    pub ip: Option<String>,
    pub switch_id: i64,
    pub position: GeoPoint,
    /// Position of the attached switch, for drawing the access edge.
    pub anchor: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkLine {
    pub source: i64,
    pub dest: i64,
    pub bandwidth_mbps: u32,
    pub tier: BandwidthTier,
    pub from: GeoPoint,
    pub to: GeoPoint,
}

// ── Viewport ────────────────────────────────────────────────────────

/// Axis-aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for no points.
    pub fn around(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self {
                    south: p.lat,
                    west: p.lon,
                    north: p.lat,
                    east: p.lon,
                },
                Some(b) => Self {
                    south: b.south.min(p.lat),
                    west: b.west.min(p.lon),
                    north: b.north.max(p.lat),
                    east: b.east.max(p.lon),
                },
            })
        })
    }

    /// Grow by `fraction` of the span on every side, enforcing `min_span`.
    pub fn padded(self, fraction: f64, min_span: f64) -> Self {
        let center = self.center();
        let lat_half = ((self.north - self.south) * (1.0 + 2.0 * fraction)).max(min_span) / 2.0;
        let lon_half = ((self.east - self.west) * (1.0 + 2.0 * fraction)).max(min_span) / 2.0;
        Self {
            south: center.lat - lat_half,
            west: center.lon - lon_half,
            north: center.lat + lat_half,
            east: center.lon + lon_half,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.south..=self.north).contains(&p.lat) && (self.west..=self.east).contains(&p.lon)
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }
}

/// Initial camera for a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Viewport {
    /// Nothing was placed; show the default region.
    Default { center: GeoPoint, zoom: u8 },
    /// Fit to everything that was placed.
    Fit(Bounds),
}

impl Default for Viewport {
    fn default() -> Self {
        Self::Default {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Viewport {
    pub(crate) fn fit(points: impl IntoIterator<Item = GeoPoint>) -> Self {
        Bounds::around(points).map_or_else(Self::default, |b| {
            Self::Fit(b.padded(FIT_PADDING, MIN_FIT_SPAN))
        })
    }

    /// Visible box. For the default view this is the area a web map shows
    /// at that zoom level, assuming a roughly 2:1 viewport.
    pub fn bounds(&self) -> Bounds {
        match *self {
            Self::Fit(b) => b,
            Self::Default { center, zoom } => {
                let lon_span = 360.0 / f64::from(1u32 << zoom.min(20));
                let lat_span = lon_span / 2.0;
                Bounds {
                    south: center.lat - lat_span / 2.0,
                    west: center.lon - lon_span / 2.0,
                    north: center.lat + lat_span / 2.0,
                    east: center.lon + lon_span / 2.0,
                }
            }
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default { .. })
    }
}

// ── Warnings ────────────────────────────────────────────────────────

/// An entity the renderer could not place. Rendering always continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderWarning {
    SwitchWithoutCoordinates { id: i64, name: String },
    HostWithoutSwitch {
        mac: MacAddress,
        name: String,
        switch_id: Option<i64>,
    },
    LinkEndpointMissing { source: i64, dest: i64 },
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwitchWithoutCoordinates { id, name } => {
                write!(f, "switch {name} ({id}) has no valid coordinates")
            }
            Self::HostWithoutSwitch {
                name,
                switch_id: Some(sid),
                ..
            } => write!(f, "host {name} references unplaced switch {sid}"),
            Self::HostWithoutSwitch { name, .. } => {
                write!(f, "host {name} is not attached to a switch")
            }
            Self::LinkEndpointMissing { source, dest } => {
                write!(f, "link {source}-{dest} has an unplaced endpoint")
            }
        }
    }
}

// ── Route overlay ───────────────────────────────────────────────────

/// Polyline of a computed route, resolved against a scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOverlay {
    /// Source host, each resolved hop, destination host.
    pub points: Vec<GeoPoint>,
    /// Switch ids the route passes through, in order.
    pub switch_ids: Vec<i64>,
    /// Hops whose datapath id matched no placed switch.
    pub unresolved: Vec<Dpid>,
}

// ── Scene ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub switches: Vec<SwitchMarker>,
    pub hosts: Vec<HostMarker>,
    pub links: Vec<LinkLine>,
    pub viewport: Viewport,
    pub warnings: Vec<RenderWarning>,
    pub controller_online: bool,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.switches.is_empty() && self.hosts.is_empty() && self.links.is_empty()
    }

    pub fn switch(&self, id: i64) -> Option<&SwitchMarker> {
        self.switches.iter().find(|s| s.id == id)
    }

    pub fn host(&self, mac: &MacAddress) -> Option<&HostMarker> {
        self.hosts.iter().find(|h| &h.mac == mac)
    }

    /// Resolve a route's hops to map positions by datapath id.
    pub fn route_overlay(&self, route: &RoutePath) -> RouteOverlay {
        let mut overlay = RouteOverlay::default();

        if let Some(src) = self.host(&route.src_mac) {
            overlay.points.push(src.position);
        }
        for hop in &route.hops {
            match self.switches.iter().find(|s| s.dpid == Some(hop.dpid)) {
                Some(marker) => {
                    overlay.points.push(marker.position);
                    overlay.switch_ids.push(marker.id);
                }
                None => overlay.unresolved.push(hop.dpid),
            }
        }
        if let Some(dst) = self.host(&route.dst_mac) {
            overlay.points.push(dst.position);
        }

        overlay
    }
}
