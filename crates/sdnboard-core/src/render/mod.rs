// ── Topology renderer ──
//
// Turns a `Topology` into a `Scene`: switch markers at their coordinates,
// host markers offset around their switch, and bandwidth-coloured link
// lines. Anything that cannot be placed is skipped with a warning; a
// render never fails.

pub mod scene;
pub mod tier;

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::model::{GeoPoint, Host, MacAddress, Topology};

pub use scene::{
    Bounds, DEFAULT_CENTER, DEFAULT_ZOOM, HostMarker, LinkLine, RenderWarning, RouteOverlay, Scene,
    SwitchMarker, Viewport,
};
pub use tier::BandwidthTier;

/// Distance (degrees) of fanned-out hosts from their switch.
const FAN_RADIUS: f64 = 0.01;

/// Maximum offset (degrees) of a jittered host on either axis.
const JITTER_RADIUS: f64 = 0.005;

/// How host markers are placed around their switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum HostLayout {
    /// Evenly spaced on a circle, ordered by MAC.
    #[default]
    FanOut,
    /// Evenly spaced angles with a per-host radius seeded by the MAC, so
    /// clusters look less regular while staying reproducible.
    Jitter,
}

/// Stateless scene builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyRenderer {
    layout: HostLayout,
}

impl TopologyRenderer {
    pub fn new(layout: HostLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> HostLayout {
        self.layout
    }

    /// Build a fresh scene. The result depends only on `topology`, so
    /// rendering identical data twice yields identical scenes.
    pub fn render(&self, topology: &Topology) -> Scene {
        let mut scene = Scene {
            controller_online: topology.controller_online(),
            ..Scene::default()
        };

        // ── Switches ──
        let mut placed: HashMap<i64, GeoPoint> = HashMap::with_capacity(topology.switches.len());
        for switch in &topology.switches {
            let Some(position) = switch.location() else {
                warn!(id = switch.id, name = %switch.name, "skipping switch without coordinates");
                scene.warnings.push(RenderWarning::SwitchWithoutCoordinates {
                    id: switch.id,
                    name: switch.name.clone(),
                });
                continue;
            };
            // Duplicate ids keep the first placement.
            if placed.insert(switch.id, position).is_some() {
                warn!(id = switch.id, "duplicate switch id in topology");
                continue;
            }
            scene.switches.push(SwitchMarker {
                id: switch.id,
                name: switch.name.clone(),
                dpid: switch.dpid(),
                position,
                status: switch.status,
            });
        }

        // ── Hosts ──
        let mut siblings: BTreeMap<i64, Vec<&Host>> = BTreeMap::new();
        for host in &topology.hosts {
            match host.switch_id.filter(|id| placed.contains_key(id)) {
                Some(switch_id) => siblings.entry(switch_id).or_default().push(host),
                None => {
                    warn!(mac = %host.mac, name = %host.name, "skipping host without a placed switch");
                    scene.warnings.push(RenderWarning::HostWithoutSwitch {
                        mac: host.mac.clone(),
                        name: host.name.clone(),
                        switch_id: host.switch_id,
                    });
                }
            }
        }
        for (switch_id, mut hosts) in siblings {
            let Some(&anchor) = placed.get(&switch_id) else {
                continue;
            };
            hosts.sort_by(|a, b| a.mac.cmp(&b.mac));
            hosts.dedup_by(|a, b| a.mac == b.mac);
            let count = hosts.len();
            for (index, host) in hosts.into_iter().enumerate() {
                scene.hosts.push(HostMarker {
                    mac: host.mac.clone(),
                    name: host.name.clone(),
                    ip: host.ip.clone(),
                    switch_id,
                    position: self.host_position(anchor, switch_id, index, count, &host.mac),
                    anchor,
                });
            }
        }

        // ── Links ──
        for link in &topology.links {
            match (placed.get(&link.source), placed.get(&link.dest)) {
                (Some(&from), Some(&to)) => scene.links.push(LinkLine {
                    source: link.source,
                    dest: link.dest,
                    bandwidth_mbps: link.bandwidth_mbps,
                    tier: BandwidthTier::from_mbps(link.bandwidth_mbps),
                    from,
                    to,
                }),
                _ => {
                    warn!(source = link.source, dest = link.dest, "skipping link with unplaced endpoint");
                    scene.warnings.push(RenderWarning::LinkEndpointMissing {
                        source: link.source,
                        dest: link.dest,
                    });
                }
            }
        }

        scene.viewport = Viewport::fit(
            scene
                .switches
                .iter()
                .map(|s| s.position)
                .chain(scene.hosts.iter().map(|h| h.position)),
        );

        scene
    }

    fn host_position(
        &self,
        anchor: GeoPoint,
        switch_id: i64,
        index: usize,
        count: usize,
        mac: &MacAddress,
    ) -> GeoPoint {
        #[allow(clippy::cast_precision_loss)]
        let step = TAU / count.max(1) as f64;
        #[allow(clippy::cast_precision_loss)]
        let base = -FRAC_PI_2 + step * index as f64;

        let (angle, radius) = match self.layout {
            HostLayout::FanOut => (base, FAN_RADIUS),
            HostLayout::Jitter => {
                // Shared phase per switch keeps sibling angles distinct.
                let phase = unit(stable_hash(&switch_id.to_string())) * step;
                let radius = JITTER_RADIUS * (0.6 + 0.4 * unit(stable_hash(mac.as_str())));
                (base + phase, radius)
            }
        };

        GeoPoint::new(
            anchor.lat + radius * angle.sin(),
            anchor.lon + radius * angle.cos(),
        )
    }
}

/// FNV-1a; stable across builds and platforms.
fn stable_hash(input: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    input
        .bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Map a hash onto `[0, 1)`.
fn unit(hash: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let value = (hash >> 11) as f64 / (1u64 << 53) as f64;
    value
}
