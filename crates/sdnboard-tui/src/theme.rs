//! Palette and semantic styling for the dashboard.

use ratatui::style::{Color, Modifier, Style};

use sdnboard_core::{BandwidthTier, DisplayedRole, HostRole, SwitchStatus};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const AMBER: Color = Color::Rgb(255, 184, 108); // #ffb86c

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29
pub const LIGHT_BLUE: Color = Color::Rgb(139, 233, 253); // #8be9fd

// ── Domain colours ────────────────────────────────────────────────────

/// Link colour by bandwidth tier: red, orange, yellow, green.
pub fn tier_color(tier: BandwidthTier) -> Color {
    match tier {
        BandwidthTier::Low => ERROR_RED,
        BandwidthTier::Moderate => AMBER,
        BandwidthTier::Elevated => ELECTRIC_YELLOW,
        BandwidthTier::High => SUCCESS_GREEN,
    }
}

pub fn switch_color(status: SwitchStatus) -> Color {
    if status == SwitchStatus::Connected {
        NEON_CYAN
    } else {
        BORDER_GRAY
    }
}

/// Marker glyph and colour for a host, one per displayed role.
pub fn host_marker(role: DisplayedRole) -> (&'static str, Color) {
    let color = match role.role() {
        HostRole::Plain => LIGHT_BLUE,
        HostRole::Server => CORAL,
        HostRole::Client => SUCCESS_GREEN,
    };
    let glyph = match (role.is_selected(), role.role()) {
        (false, HostRole::Plain) => "○",
        (false, HostRole::Server) => "◇",
        (false, HostRole::Client) => "△",
        (true, HostRole::Plain) => "●",
        (true, HostRole::Server) => "◆",
        (true, HostRole::Client) => "▲",
    };
    let color = if role.is_selected() { ELECTRIC_PURPLE } else { color };
    (glyph, color)
}

/// Route overlay colour.
pub const ROUTE: Color = ELECTRIC_PURPLE;

// ── Semantic Styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_displayed_role_has_a_distinct_glyph() {
        let roles = [
            DisplayedRole::UnselectedPlain,
            DisplayedRole::UnselectedServer,
            DisplayedRole::UnselectedClient,
            DisplayedRole::SelectedPlain,
            DisplayedRole::SelectedServer,
            DisplayedRole::SelectedClient,
        ];
        let mut glyphs: Vec<&str> = roles.iter().map(|r| host_marker(*r).0).collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        assert_eq!(glyphs.len(), roles.len());
    }

    #[test]
    fn tier_colours_follow_bandwidth_hues() {
        assert_eq!(tier_color(BandwidthTier::from_mbps(5)), ERROR_RED);
        assert_eq!(tier_color(BandwidthTier::from_mbps(50)), AMBER);
        assert_eq!(tier_color(BandwidthTier::from_mbps(500)), ELECTRIC_YELLOW);
        assert_eq!(tier_color(BandwidthTier::from_mbps(1000)), SUCCESS_GREEN);
    }
}
