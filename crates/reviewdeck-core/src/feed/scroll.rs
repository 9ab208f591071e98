//! Horizontal viewport model for the review strip.

/// Scroll state of the viewport, in pixels (or terminal columns)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    pub offset: f64,
    pub viewport_extent: f64,
    pub content_extent: f64,
}

impl ScrollPosition {
    /// Largest valid offset
    #[inline]
    pub fn max_offset(&self) -> f64 {
        (self.content_extent - self.viewport_extent).max(0.0)
    }

    /// Distance from the right edge of the viewport to the end of the content
    #[inline]
    pub fn remaining(&self) -> f64 {
        self.content_extent - (self.offset + self.viewport_extent)
    }

    #[inline]
    pub fn is_scrollable(&self) -> bool {
        self.content_extent > self.viewport_extent
    }
}

/// Who moved the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCause {
    /// A gesture, wheel or arrow from the person looking at the feed
    User,
    /// The auto-advance scheduler
    AutoAdvance,
    /// Layout changes and resets
    Programmatic,
}

/// Emitted for every offset mutation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionChanged {
    pub position: ScrollPosition,
    pub previous_offset: f64,
    pub cause: ScrollCause,
}

#[derive(Debug, Clone)]
pub struct ScrollController {
    position: ScrollPosition,
    affordance_margin: f64,
}

impl ScrollController {
    pub fn new(viewport_extent: f64, affordance_margin: f64) -> Self {
        Self {
            position: ScrollPosition {
                offset: 0.0,
                viewport_extent: viewport_extent.max(0.0),
                content_extent: 0.0,
            },
            affordance_margin,
        }
    }

    #[inline]
    pub fn position(&self) -> ScrollPosition {
        self.position
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.position.offset
    }

    /// Move by `delta`, clamped to `[0, content - viewport]`
    pub fn advance_by(&mut self, delta: f64, cause: ScrollCause) -> Option<PositionChanged> {
        self.scroll_to(self.position.offset + delta, cause)
    }

    /// Jump back to the start (wrap-around)
    pub fn scroll_to_start(&mut self, cause: ScrollCause) -> Option<PositionChanged> {
        self.scroll_to(0.0, cause)
    }

    pub fn scroll_to(&mut self, offset: f64, cause: ScrollCause) -> Option<PositionChanged> {
        let target = if offset.is_finite() {
            offset.clamp(0.0, self.position.max_offset())
        } else {
            self.position.offset
        };
        self.set_offset(target, cause)
    }

    /// True when the end of the content is within `threshold` of the viewport edge
    #[inline]
    pub fn near_end(&self, threshold: f64) -> bool {
        self.position.remaining() <= threshold
    }

    /// True when the offset is within `epsilon` of the largest valid offset
    #[inline]
    pub fn at_end(&self, epsilon: f64) -> bool {
        self.position.offset >= self.position.max_offset() - epsilon
    }

    pub fn set_viewport_extent(&mut self, extent: f64) -> Option<PositionChanged> {
        self.position.viewport_extent = extent.max(0.0);
        self.reclamp()
    }

    pub fn set_content_extent(&mut self, extent: f64) -> Option<PositionChanged> {
        self.position.content_extent = extent.max(0.0);
        self.reclamp()
    }

    pub fn show_left_affordance(&self) -> bool {
        self.position.offset > self.affordance_margin
    }

    pub fn show_right_affordance(&self) -> bool {
        self.position.is_scrollable()
            && self.position.offset < self.position.max_offset() - self.affordance_margin
    }

    /// Keep the offset valid after an extent changed
    fn reclamp(&mut self) -> Option<PositionChanged> {
        let clamped = self.position.offset.min(self.position.max_offset());
        self.set_offset(clamped, ScrollCause::Programmatic)
    }

    fn set_offset(&mut self, offset: f64, cause: ScrollCause) -> Option<PositionChanged> {
        if offset == self.position.offset {
            return None;
        }
        let previous_offset = self.position.offset;
        self.position.offset = offset;
        Some(PositionChanged {
            position: self.position,
            previous_offset,
            cause,
        })
    }
}
