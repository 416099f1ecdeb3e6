//! Rendering surface: pane size, time/price scales and coordinate transforms.
//!
//! The time axis is logical: bar `i` of the merged time scale sits at
//! `x = width - (right_index - i + 0.5) * bar_spacing`, so gaps in wall-clock
//! time (weekends, missing candles) never show up as empty space.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;

use crate::config::plot::PLOT_CONFIG;
use crate::engine::events::Signal;
use crate::engine::layout::ScaleMargins;
use crate::engine::registry::SeriesRegistry;

/// Pixel-space <-> domain-space conversion.
///
/// Every conversion returns `None` when the coordinate is outside the
/// currently visible range or the relevant axis has no data yet. Callers must
/// treat `None` as "abort", never as zero.
pub trait CoordinateSpace {
    fn time_to_x(&self, time: i64) -> Option<f64>;
    fn price_to_y(&self, price: f64) -> Option<f64>;
    fn x_to_time(&self, x: f64) -> Option<i64>;
    fn y_to_price(&self, y: f64) -> Option<f64>;
    fn pane_width(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Identifies one independent vertical axis.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScaleId {
    Main,
    Volume,
    Panel { slot: usize, panel_id: String },
}

impl fmt::Display for ScaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleId::Main => write!(f, "right"),
            ScaleId::Volume => write!(f, "volume"),
            ScaleId::Panel { slot, panel_id } => write!(f, "scale_{}_{}", panel_id, slot),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    pub margins: ScaleMargins,
    /// Autoscaled (min, max); `None` until a visible series has data in view
    pub range: Option<(f64, f64)>,
}

impl PriceScale {
    fn new(margins: ScaleMargins) -> Self {
        Self {
            margins,
            range: None,
        }
    }

    /// Band in pixels as (top_px, bottom_px).
    fn band_px(&self, height: f64) -> Option<(f64, f64)> {
        let top = height * self.margins.top;
        let bottom = height * (1.0 - self.margins.bottom);
        (bottom > top).then_some((top, bottom))
    }

    fn price_to_y(&self, price: f64, height: f64) -> Option<f64> {
        let (min, max) = self.range?;
        let (top, bottom) = self.band_px(height)?;
        if !price.is_finite() {
            return None;
        }
        let y = top + (max - price) / (max - min) * (bottom - top);
        (0.0..=height).contains(&y).then_some(y)
    }

    fn y_to_price(&self, y: f64, height: f64) -> Option<f64> {
        if !(0.0..=height).contains(&y) {
            return None;
        }
        let (min, max) = self.range?;
        let (top, bottom) = self.band_px(height)?;
        Some(max - (y - top) / (bottom - top) * (max - min))
    }
}

/// Logical-index time axis shared by every series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeScale {
    points: Vec<i64>,
    bar_spacing: f64,
    /// Bars of empty space right of the last point (negative = scrolled back)
    right_offset: f64,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            bar_spacing: PLOT_CONFIG.default_bar_spacing,
            right_offset: PLOT_CONFIG.default_right_offset,
        }
    }
}

impl TimeScale {
    pub fn points(&self) -> &[i64] {
        &self.points
    }

    pub fn bar_spacing(&self) -> f64 {
        self.bar_spacing
    }

    pub fn right_offset(&self) -> f64 {
        self.right_offset
    }

    fn right_index(&self) -> f64 {
        (self.points.len() as f64 - 1.0) + self.right_offset
    }

    fn index_to_x(&self, index: f64, width: f64) -> f64 {
        width - (self.right_index() - index + 0.5) * self.bar_spacing
    }

    fn x_to_index(&self, x: f64, width: f64) -> f64 {
        self.right_index() + 0.5 - (width - x) / self.bar_spacing
    }

    fn index_of(&self, time: i64) -> Option<usize> {
        self.points.binary_search(&time).ok()
    }

    /// Inclusive time window covered by the bars currently on screen.
    fn visible_time_range(&self, width: f64) -> Option<(i64, i64)> {
        if self.points.is_empty() || width <= 0.0 {
            return None;
        }
        let last = self.points.len() as f64 - 1.0;
        let left = self.x_to_index(0.0, width).floor().max(0.0);
        let right = self.x_to_index(width, width).ceil().min(last);
        if right < left {
            return None;
        }
        Some((self.points[left as usize], self.points[right as usize]))
    }

    fn clamp_right_offset(&mut self, width: f64) {
        let len = self.points.len() as f64;
        let min = -(len - 1.0).max(0.0);
        let max = (width / self.bar_spacing - 1.0).max(0.0);
        self.right_offset = self.right_offset.clamp(min, max);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverEvent {
    /// Pointer position in pane pixels; `None` once the pointer leaves
    pub position: Option<(f64, f64)>,
    /// Time bucket under the pointer
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewChange {
    Resized(SurfaceSize),
    Panned,
    Zoomed,
    Fitted,
}

pub struct ChartSurface {
    size: SurfaceSize,
    time_scale: TimeScale,
    price_scales: BTreeMap<ScaleId, PriceScale>,
    registry: SeriesRegistry,
    hover: Signal<HoverEvent>,
    view_change: Signal<ViewChange>,
}

impl ChartSurface {
    pub fn create(initial_size: SurfaceSize) -> Self {
        let mut price_scales = BTreeMap::new();
        price_scales.insert(ScaleId::Main, PriceScale::new(ScaleMargins::new(0.1, 0.0)));
        log::info!(
            "Chart surface created ({:.0}x{:.0})",
            initial_size.width,
            initial_size.height
        );
        Self {
            size: initial_size,
            time_scale: TimeScale::default(),
            price_scales,
            registry: SeriesRegistry::new(),
            hover: Signal::new(),
            view_change: Signal::new(),
        }
    }

    /// Tears down every series and listener.
    pub fn destroy(mut self) {
        let released = self.registry.len();
        self.registry.clear();
        self.price_scales.clear();
        self.hover.clear();
        self.view_change.clear();
        log::info!("Chart surface destroyed ({} series released)", released);
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        if size == self.size {
            return;
        }
        self.size = size;
        self.time_scale.clamp_right_offset(size.width);
        self.refresh_scales();
        self.view_change.emit(&ViewChange::Resized(size));
    }

    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SeriesRegistry {
        &mut self.registry
    }

    pub fn time_scale(&self) -> &TimeScale {
        &self.time_scale
    }

    // --- OBSERVERS ---

    pub fn on_hover(&mut self, listener: impl FnMut(&HoverEvent) + 'static) {
        self.hover.register(listener);
    }

    /// Fires on zoom, pan, fit and resize.
    pub fn on_view_change(&mut self, listener: impl FnMut(&ViewChange) + 'static) {
        self.view_change.register(listener);
    }

    pub fn pointer_hover(&mut self, x: f64, y: f64) {
        let event = HoverEvent {
            position: Some((x, y)),
            time: self.x_to_time(x),
        };
        self.hover.emit(&event);
    }

    pub fn pointer_leave(&mut self) {
        self.hover.emit(&HoverEvent {
            position: None,
            time: None,
        });
    }

    // --- NAVIGATION ---

    /// Drags the content by `dx` pixels (positive = towards older bars).
    pub fn pan(&mut self, dx: f64) {
        if dx == 0.0 || self.time_scale.points.is_empty() {
            return;
        }
        self.time_scale.right_offset -= dx / self.time_scale.bar_spacing;
        self.time_scale.clamp_right_offset(self.size.width);
        self.refresh_scales();
        self.view_change.emit(&ViewChange::Panned);
    }

    /// Scales bar spacing by `factor`, keeping the bar under `anchor_x` fixed.
    pub fn zoom(&mut self, factor: f64, anchor_x: f64) {
        if !(factor.is_finite() && factor > 0.0) || self.time_scale.points.is_empty() {
            return;
        }
        let width = self.size.width;
        let anchor_index = self.time_scale.x_to_index(anchor_x, width);
        let spacing = (self.time_scale.bar_spacing * factor)
            .clamp(PLOT_CONFIG.min_bar_spacing, PLOT_CONFIG.max_bar_spacing);
        if spacing == self.time_scale.bar_spacing {
            return;
        }
        self.time_scale.bar_spacing = spacing;
        let right_index = anchor_index - 0.5 + (width - anchor_x) / spacing;
        self.time_scale.right_offset = right_index - (self.time_scale.points.len() as f64 - 1.0);
        self.time_scale.clamp_right_offset(width);
        self.refresh_scales();
        self.view_change.emit(&ViewChange::Zoomed);
    }

    /// Fits every bar into the pane width.
    pub fn fit_content(&mut self) {
        let len = self.time_scale.points.len();
        if len == 0 || !self.size.is_drawable() {
            return;
        }
        let slots = len as f64 + PLOT_CONFIG.default_right_offset;
        self.time_scale.bar_spacing = (self.size.width / slots)
            .clamp(PLOT_CONFIG.min_bar_spacing, PLOT_CONFIG.max_bar_spacing);
        self.time_scale.right_offset = PLOT_CONFIG.default_right_offset;
        self.refresh_scales();
        self.view_change.emit(&ViewChange::Fitted);
    }

    // --- SCALES ---

    pub fn set_scale_margins(&mut self, scale: ScaleId, margins: ScaleMargins) {
        self.price_scales
            .entry(scale)
            .and_modify(|s| s.margins = margins)
            .or_insert_with(|| PriceScale::new(margins));
    }

    pub fn scale_margins(&self, scale: &ScaleId) -> Option<ScaleMargins> {
        self.price_scales.get(scale).map(|s| s.margins)
    }

    pub fn price_scale(&self, scale: &ScaleId) -> Option<&PriceScale> {
        self.price_scales.get(scale)
    }

    /// Drops scales not matching `keep`. The main scale always survives.
    pub fn retain_scales(&mut self, keep: impl Fn(&ScaleId) -> bool) {
        self.price_scales
            .retain(|id, _| *id == ScaleId::Main || keep(id));
    }

    pub fn scale_ids(&self) -> impl Iterator<Item = &ScaleId> {
        self.price_scales.keys()
    }

    /// Rebuilds the time scale as the union of every registered series' times.
    pub fn sync_time_scale(&mut self) {
        let was_empty = self.time_scale.points.is_empty();
        self.time_scale.points = self
            .registry
            .iter()
            .map(|(_, s)| s.data.times())
            .kmerge()
            .dedup()
            .collect();
        if was_empty {
            self.time_scale.right_offset = PLOT_CONFIG.default_right_offset;
        }
        self.time_scale.clamp_right_offset(self.size.width);
    }

    /// Recomputes every price scale's range from visible series in view.
    pub fn refresh_scales(&mut self) {
        let window = self.time_scale.visible_time_range(self.size.width);
        for (id, scale) in self.price_scales.iter_mut() {
            scale.range = window.and_then(|(from, to)| {
                self.registry
                    .on_scale(id)
                    .filter(|(_, s)| s.options.visible)
                    .filter_map(|(_, s)| s.data.value_range(from, to))
                    .reduce(|(a, b), (lo, hi)| (a.min(lo), b.max(hi)))
                    .map(pad_flat_range)
            });
        }
    }

    // --- CONVERSIONS ---

    pub fn price_to_y_on(&self, scale: &ScaleId, price: f64) -> Option<f64> {
        if !self.size.is_drawable() {
            return None;
        }
        self.price_scales.get(scale)?.price_to_y(price, self.size.height)
    }

    pub fn y_to_price_on(&self, scale: &ScaleId, y: f64) -> Option<f64> {
        if !self.size.is_drawable() {
            return None;
        }
        self.price_scales.get(scale)?.y_to_price(y, self.size.height)
    }

    /// Pixel x for a logical index, visible or not. Used by painters that clip.
    pub fn index_to_x(&self, index: usize) -> f64 {
        self.time_scale.index_to_x(index as f64, self.size.width)
    }

    /// Like `time_to_x` but without the pane check. Painters clip.
    pub fn time_to_x_unclipped(&self, time: i64) -> Option<f64> {
        let index = self.time_scale.index_of(time)?;
        Some(self.time_scale.index_to_x(index as f64, self.size.width))
    }

    pub fn visible_time_range(&self) -> Option<(i64, i64)> {
        self.time_scale.visible_time_range(self.size.width)
    }
}

impl CoordinateSpace for ChartSurface {
    fn time_to_x(&self, time: i64) -> Option<f64> {
        if !self.size.is_drawable() {
            return None;
        }
        let index = self.time_scale.index_of(time)?;
        let x = self.time_scale.index_to_x(index as f64, self.size.width);
        (0.0..=self.size.width).contains(&x).then_some(x)
    }

    fn price_to_y(&self, price: f64) -> Option<f64> {
        self.price_to_y_on(&ScaleId::Main, price)
    }

    fn x_to_time(&self, x: f64) -> Option<i64> {
        if !self.size.is_drawable() || !(0.0..=self.size.width).contains(&x) {
            return None;
        }
        let index = self.time_scale.x_to_index(x, self.size.width).round();
        if index < 0.0 {
            return None;
        }
        self.time_scale.points.get(index as usize).copied()
    }

    fn y_to_price(&self, y: f64) -> Option<f64> {
        self.y_to_price_on(&ScaleId::Main, y)
    }

    fn pane_width(&self) -> f64 {
        self.size.width
    }
}

fn pad_flat_range((min, max): (f64, f64)) -> (f64, f64) {
    if max > min {
        return (min, max);
    }
    let pad = if min == 0.0 {
        1.0
    } else {
        min.abs() * PLOT_CONFIG.flat_range_padding_pct
    };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, TimeValue};
    use crate::engine::registry::{SeriesData, SeriesKey, SeriesOptions};
    use eframe::egui::Color32;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn surface_with_bars(n: i64) -> ChartSurface {
        let mut surface = ChartSurface::create(SurfaceSize::new(800.0, 400.0));
        let bars = (0..n)
            .map(|i| Bar::new(i * 60, 10.0, 10.0 + i as f64, 9.0, 10.0, 1.0))
            .collect();
        surface.registry_mut().add(
            SeriesKey::Candles,
            SeriesOptions::new("", Color32::WHITE, ScaleId::Main),
            SeriesData::Candles(bars),
        );
        surface.set_scale_margins(ScaleId::Main, ScaleMargins::new(0.0, 0.0));
        surface.sync_time_scale();
        surface.refresh_scales();
        surface
    }

    #[test]
    fn time_round_trips_through_pixels() {
        let surface = surface_with_bars(20);
        for t in [0, 60 * 5, 60 * 19] {
            let x = surface.time_to_x(t).unwrap();
            assert_eq!(surface.x_to_time(x), Some(t));
            // Snaps to the nearest bar
            assert_eq!(surface.x_to_time(x + 2.0), Some(t));
        }
    }

    #[test]
    fn price_round_trips_through_pixels() {
        let surface = surface_with_bars(20);
        let (min, max) = surface.price_scale(&ScaleId::Main).unwrap().range.unwrap();
        assert_eq!((min, max), (9.0, 29.0));
        assert_eq!(surface.price_to_y(max), Some(0.0));
        assert_eq!(surface.price_to_y(min), Some(400.0));
        let y = surface.price_to_y(15.0).unwrap();
        assert!((surface.y_to_price(y).unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn conversions_outside_the_view_are_none() {
        let surface = surface_with_bars(20);
        assert_eq!(surface.time_to_x(61), None); // not on the scale
        assert_eq!(surface.x_to_time(-1.0), None);
        assert_eq!(surface.x_to_time(801.0), None);
        assert_eq!(surface.x_to_time(0.0), None); // left of the first bar
        assert_eq!(surface.y_to_price(-5.0), None);
        assert_eq!(surface.price_to_y(1_000.0), None);
    }

    #[test]
    fn empty_surface_converts_nothing() {
        let surface = ChartSurface::create(SurfaceSize::new(800.0, 400.0));
        assert_eq!(surface.x_to_time(400.0), None);
        assert_eq!(surface.y_to_price(200.0), None);
        assert_eq!(surface.price_to_y(1.0), None);
    }

    #[test]
    fn pan_and_zoom_fire_view_change_and_move_pixels() {
        let mut surface = surface_with_bars(200);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        surface.on_view_change(move |e| sink.borrow_mut().push(*e));

        let t = 60 * 190;
        let before = surface.time_to_x(t).unwrap();
        surface.pan(40.0);
        let after = surface.time_to_x(t).unwrap();
        assert!((after - before - 40.0).abs() < 1e-9);

        let anchor = surface.time_to_x(t).unwrap();
        surface.zoom(2.0, anchor);
        assert!((surface.time_to_x(t).unwrap() - anchor).abs() < 1e-9);
        assert_eq!(surface.time_scale().bar_spacing(), PLOT_CONFIG.default_bar_spacing * 2.0);

        surface.resize(SurfaceSize::new(600.0, 300.0));
        surface.resize(SurfaceSize::new(600.0, 300.0)); // unchanged: no event
        assert_eq!(
            *events.borrow(),
            vec![
                ViewChange::Panned,
                ViewChange::Zoomed,
                ViewChange::Resized(SurfaceSize::new(600.0, 300.0))
            ]
        );
    }

    #[test]
    fn hover_reports_time_bucket() {
        let mut surface = surface_with_bars(20);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        surface.on_hover(move |e| sink.borrow_mut().push(e.time));
        let x = surface.time_to_x(600).unwrap();
        surface.pointer_hover(x, 100.0);
        surface.pointer_leave();
        assert_eq!(*seen.borrow(), vec![Some(600), None]);
    }

    #[test]
    fn time_scale_is_union_of_series_times() {
        let mut surface = surface_with_bars(3);
        surface.registry_mut().add(
            SeriesKey::Forecast,
            SeriesOptions::new("f", Color32::WHITE, ScaleId::Main),
            SeriesData::Line(vec![TimeValue::new(120, 1.0), TimeValue::new(180, 2.0)]),
        );
        surface.sync_time_scale();
        assert_eq!(surface.time_scale().points(), &[0, 60, 120, 180]);
    }

    #[test]
    fn hidden_series_do_not_drive_autoscale() {
        let mut surface = surface_with_bars(5);
        surface.registry_mut().add(
            SeriesKey::Overlay { index: 0 },
            SeriesOptions::new("o", Color32::WHITE, ScaleId::Main).hidden(),
            SeriesData::Line(vec![TimeValue::new(60, 500.0)]),
        );
        surface.refresh_scales();
        let (_, max) = surface.price_scale(&ScaleId::Main).unwrap().range.unwrap();
        assert_eq!(max, 14.0);
    }

    #[test]
    fn panel_scale_converts_within_its_own_band() {
        let mut surface = surface_with_bars(5);
        let scale = ScaleId::Panel {
            slot: 0,
            panel_id: "rsi".into(),
        };
        surface.set_scale_margins(scale.clone(), ScaleMargins::new(0.5, 0.25));
        surface.registry_mut().add(
            SeriesKey::Panel {
                slot: 0,
                series: 0,
                panel_id: "rsi".into(),
            },
            SeriesOptions::new("RSI", Color32::WHITE, scale.clone()),
            SeriesData::Line(vec![TimeValue::new(0, 30.0), TimeValue::new(60, 70.0)]),
        );
        surface.refresh_scales();
        assert_eq!(surface.price_to_y_on(&scale, 70.0), Some(200.0));
        assert_eq!(surface.price_to_y_on(&scale, 30.0), Some(300.0));
    }

    #[test]
    fn flat_ranges_are_padded() {
        assert_eq!(pad_flat_range((0.0, 0.0)), (-1.0, 1.0));
        let (lo, hi) = pad_flat_range((100.0, 100.0));
        assert!(lo < 100.0 && hi > 100.0);
    }
}
