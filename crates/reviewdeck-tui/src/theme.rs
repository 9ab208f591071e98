use ratatui::style::Color;

use reviewdeck_core::feed::NotificationKind;

/// Colors used by the review widgets
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey0: Color,
    pub grey1: Color,
    pub grey2: Color,

    // Palette colors
    pub yellow: Color,
    pub green: Color,
    pub aqua: Color,

    // Semantic colors
    pub star: Color,
    pub error: Color,
    pub success: Color,
    pub info: Color,
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey0: Color::Rgb(0x7c, 0x6f, 0x64),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            yellow: Color::Rgb(0xd8, 0xa6, 0x57),
            green: Color::Rgb(0xa9, 0xb6, 0x65),
            aqua: Color::Rgb(0x89, 0xb4, 0x82),
            star: Color::Rgb(0xd8, 0xa6, 0x57),
            error: Color::Rgb(0xea, 0x69, 0x62),
            success: Color::Rgb(0xa9, 0xb6, 0x65),
            info: Color::Rgb(0x7d, 0xae, 0xa3),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
        }
    }
}

impl Theme {
    pub fn notification(&self, kind: NotificationKind) -> Color {
        match kind {
            NotificationKind::Success => self.success,
            NotificationKind::Error => self.error,
            NotificationKind::Info => self.info,
        }
    }
}
