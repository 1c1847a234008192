//! Projection between terminal cells and map coordinates.

use ecoleta_core::model::Coordinate;
use ratatui::layout::Rect;

pub(crate) const DEFAULT_SPAN: f64 = 2.0;
const MIN_SPAN: f64 = 0.005;
const MAX_SPAN: f64 = 90.0;

/// Visible window of the world map: `span` degrees of latitude above and below the
/// center. Longitude is stretched so a terminal cell (about twice as tall as wide)
/// covers the same distance in both directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MapView {
    pub center: Coordinate,
    pub span: f64,
}

impl MapView {
    pub(crate) fn new(center: Coordinate, span: f64) -> Self {
        Self { center, span }
    }

    pub(crate) fn lat_bounds(&self) -> [f64; 2] {
        [self.center.latitude - self.span, self.center.latitude + self.span]
    }

    pub(crate) fn lon_bounds(&self, area: Rect) -> [f64; 2] {
        let half_width = if area.height == 0 {
            self.span
        } else {
            self.span * f64::from(area.width) / (2.0 * f64::from(area.height))
        };
        [
            self.center.longitude - half_width,
            self.center.longitude + half_width,
        ]
    }

    /// Coordinate under the middle of the given cell, or `None` outside `area`.
    pub(crate) fn coordinate_at(&self, area: Rect, column: u16, row: u16) -> Option<Coordinate> {
        if column < area.x || column >= area.right() || row < area.y || row >= area.bottom() {
            return None;
        }

        let [west, east] = self.lon_bounds(area);
        let [south, north] = self.lat_bounds();
        let across = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let down = (f64::from(row - area.y) + 0.5) / f64::from(area.height);

        Some(Coordinate::new(
            (north - down * (north - south)).clamp(-90.0, 90.0),
            (west + across * (east - west)).clamp(-180.0, 180.0),
        ))
    }

    /// Distance moved by one cursor step.
    pub(crate) fn step(&self) -> f64 {
        self.span / 10.0
    }
}

pub(crate) fn zoom_in(span: f64) -> f64 {
    (span / 2.0).max(MIN_SPAN)
}

pub(crate) fn zoom_out(span: f64) -> f64 {
    (span * 2.0).min(MAX_SPAN)
}
