//! Mapping between feed coordinates and terminal columns.
//!
//! The feed controller measures everything in layout pixels (a card is
//! `card_extent` wide). The terminal draws each card `card_columns` wide with a
//! one-column gap, so one column stands for a fixed number of pixels.

use reviewdeck_core::AppConfig;

const GAP_COLUMNS: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripLayout {
    card_columns: u16,
    px_per_column: f64,
}

impl StripLayout {
    pub fn new(config: &AppConfig) -> Self {
        let card_columns = config.ui.card_columns.max(8);
        let px_per_column = (config.feed.card_extent + config.feed.card_gap)
            / f64::from(card_columns + GAP_COLUMNS);
        Self {
            card_columns,
            px_per_column,
        }
    }

    #[inline]
    pub fn card_columns(&self) -> u16 {
        self.card_columns
    }

    /// Columns from the start of one card to the start of the next
    #[inline]
    pub fn stride(&self) -> u16 {
        self.card_columns + GAP_COLUMNS
    }

    pub fn to_px(&self, columns: u16) -> f64 {
        f64::from(columns) * self.px_per_column
    }

    pub fn to_columns(&self, px: f64) -> u32 {
        if self.px_per_column <= 0.0 {
            return 0;
        }
        (px / self.px_per_column).round().max(0.0) as u32
    }

    /// Pixel distance of one whole card step
    pub fn card_step_px(&self) -> f64 {
        self.to_px(self.stride())
    }

    /// Column range `[start, end)` of card `index` in strip coordinates
    pub fn card_span(&self, index: usize) -> (u32, u32) {
        let start = index as u32 * u32::from(self.stride());
        (start, start + u32::from(self.card_columns))
    }
}
