//! Screen implementations. Each screen is a top-level Component.

pub mod clients;
pub mod links;
pub mod map;
pub mod servers;
pub mod stats;

use crate::component::Component;
use crate::screen::ScreenId;

/// One component per tab, in tab-bar order.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Map, Box::new(map::MapScreen::new())),
        (ScreenId::Links, Box::new(links::LinksScreen::new())),
        (ScreenId::Servers, Box::new(servers::ServersScreen::new())),
        (ScreenId::Clients, Box::new(clients::ClientsScreen::new())),
        (ScreenId::Stats, Box::new(stats::StatsScreen::new())),
    ]
}
