//! Live set of visual series, keyed by logical role.
//!
//! The registry is the only place series handles are minted or dropped.
//! Everything else refers to a series through its [`SeriesKey`].

use std::collections::BTreeMap;
use std::fmt;

use eframe::egui::Color32;

use crate::config::DF;
use crate::domain::{Bar, TimeValue};
use crate::engine::surface::ScaleId;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKey {
    Candles,
    Volume,
    Forecast,
    Overlay { index: usize },
    // Field order drives Ord: panels iterate by slot, then by series within the slot
    Panel { slot: usize, series: usize, panel_id: String },
}

impl SeriesKey {
    /// Overlay and panel series are rebuilt from scratch on every envelope.
    pub fn is_transient(&self) -> bool {
        matches!(self, SeriesKey::Overlay { .. } | SeriesKey::Panel { .. })
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKey::Candles => write!(f, "candles"),
            SeriesKey::Volume => write!(f, "volume"),
            SeriesKey::Forecast => write!(f, "forecast"),
            SeriesKey::Overlay { index } => write!(f, "overlay:{}", index),
            SeriesKey::Panel {
                slot,
                series,
                panel_id,
            } => write!(f, "panel:{}:{}:{}", panel_id, slot, series),
        }
    }
}

/// Opaque token for one live series. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

/// Horizontal guide attached to a series (support/resistance).
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLine {
    pub price: f64,
    pub color: Color32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOptions {
    pub title: String,
    pub color: Color32,
    pub scale: ScaleId,
    pub visible: bool,
    pub line_style: LineStyle,
    pub line_width: f32,
    pub last_value_visible: bool,
    pub price_lines: Vec<PriceLine>,
}

impl SeriesOptions {
    pub fn new(title: impl Into<String>, color: Color32, scale: ScaleId) -> Self {
        Self {
            title: title.into(),
            color,
            scale,
            visible: true,
            line_style: LineStyle::Solid,
            line_width: 1.0,
            last_value_visible: true,
            price_lines: Vec::new(),
        }
    }

    pub fn dashed(mut self) -> Self {
        self.line_style = LineStyle::Dashed;
        self
    }

    pub fn width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn without_last_value(mut self) -> Self {
        self.last_value_visible = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBar {
    pub time: i64,
    pub value: f64,
    pub color: Color32,
}

/// Value of one series at one time bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesValue {
    Ohlc(Bar),
    Value(f64),
}

impl SeriesValue {
    /// Single representative number (close for candles).
    pub fn scalar(&self) -> f64 {
        match self {
            SeriesValue::Ohlc(bar) => bar.close,
            SeriesValue::Value(v) => *v,
        }
    }
}

/// Time-sorted payload of a series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    Candles(Vec<Bar>),
    Line(Vec<TimeValue>),
    Histogram(Vec<HistogramBar>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Candles(v) => v.len(),
            SeriesData::Line(v) => v.len(),
            SeriesData::Histogram(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn times(&self) -> Vec<i64> {
        match self {
            SeriesData::Candles(v) => v.iter().map(|b| b.time).collect(),
            SeriesData::Line(v) => v.iter().map(|p| p.time).collect(),
            SeriesData::Histogram(v) => v.iter().map(|p| p.time).collect(),
        }
    }

    pub fn value_at(&self, time: i64) -> Option<SeriesValue> {
        match self {
            SeriesData::Candles(v) => v
                .binary_search_by_key(&time, |b| b.time)
                .ok()
                .map(|i| SeriesValue::Ohlc(v[i])),
            SeriesData::Line(v) => v
                .binary_search_by_key(&time, |p| p.time)
                .ok()
                .map(|i| SeriesValue::Value(v[i].value)),
            SeriesData::Histogram(v) => v
                .binary_search_by_key(&time, |p| p.time)
                .ok()
                .map(|i| SeriesValue::Value(v[i].value)),
        }
    }

    /// Min/max of the values with `from <= time <= to`.
    /// Histograms always include their zero baseline.
    pub fn value_range(&self, from: i64, to: i64) -> Option<(f64, f64)> {
        let in_window = |t: i64| t >= from && t <= to;
        let fold = |acc: Option<(f64, f64)>, (lo, hi): (f64, f64)| match acc {
            Some((a, b)) => Some((a.min(lo), b.max(hi))),
            None => Some((lo, hi)),
        };
        match self {
            SeriesData::Candles(v) => v
                .iter()
                .filter(|b| in_window(b.time))
                .map(|b| (b.low.min(b.high), b.high.max(b.low)))
                .fold(None, fold),
            SeriesData::Line(v) => v
                .iter()
                .filter(|p| in_window(p.time))
                .map(|p| (p.value, p.value))
                .fold(None, fold),
            SeriesData::Histogram(v) => v
                .iter()
                .filter(|p| in_window(p.time))
                .map(|p| (p.value.min(0.0), p.value.max(0.0)))
                .fold(None, fold),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Series {
    pub handle: SeriesHandle,
    pub options: SeriesOptions,
    pub data: SeriesData,
}

#[derive(Default)]
pub struct SeriesRegistry {
    next_handle: u64,
    series: BTreeMap<SeriesKey, Series>,
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the series under `key`, tearing down any series already there.
    pub fn add(&mut self, key: SeriesKey, options: SeriesOptions, data: SeriesData) -> SeriesHandle {
        let handle = SeriesHandle(self.next_handle);
        self.next_handle += 1;
        if let Some(old) = self.series.insert(
            key.clone(),
            Series {
                handle,
                options,
                data,
            },
        ) {
            if DF.log_reconcile {
                log::debug!("Replaced series {} ({:?} -> {:?})", key, old.handle, handle);
            }
        }
        handle
    }

    pub fn contains(&self, key: &SeriesKey) -> bool {
        self.series.contains_key(key)
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&Series> {
        self.series.get(key)
    }

    pub fn handle(&self, key: &SeriesKey) -> Option<SeriesHandle> {
        self.series.get(key).map(|s| s.handle)
    }

    /// Re-feeds an existing series. Returns false if `key` is not registered.
    pub fn set_data(&mut self, key: &SeriesKey, data: SeriesData) -> bool {
        match self.series.get_mut(key) {
            Some(series) => {
                series.data = data;
                true
            }
            None => false,
        }
    }

    pub fn set_visible(&mut self, key: &SeriesKey, visible: bool) -> bool {
        self.apply_options(key, |o| o.visible = visible)
    }

    pub fn apply_options(&mut self, key: &SeriesKey, f: impl FnOnce(&mut SeriesOptions)) -> bool {
        match self.series.get_mut(key) {
            Some(series) => {
                f(&mut series.options);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &SeriesKey) -> Option<Series> {
        self.series.remove(key)
    }

    /// Drops every series matching `pred`; returns how many went.
    pub fn remove_where(&mut self, pred: impl Fn(&SeriesKey) -> bool) -> usize {
        let before = self.series.len();
        self.series.retain(|k, _| !pred(k));
        before - self.series.len()
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Ordered by key: candles, volume, forecast, overlays, then panels by slot.
    pub fn iter(&self) -> impl Iterator<Item = (&SeriesKey, &Series)> {
        self.series.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.series.keys()
    }

    pub fn on_scale<'a>(&'a self, scale: &'a ScaleId) -> impl Iterator<Item = (&'a SeriesKey, &'a Series)> {
        self.series.iter().filter(move |(_, s)| &s.options.scale == scale)
    }
}
