use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

use crate::domain::Bar;
use crate::domain::raw::{RawNumber, RawTime, parse_epoch_sec};

/// Volume at or below this is treated as absent.
pub const VOLUME_EPSILON: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeValue {
    pub time: i64,
    pub value: f64,
}

impl TimeValue {
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesKind {
    #[default]
    Line,
    Histogram,
}

/// A line drawn on the main price scale (moving average, bands, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OverlaySeries {
    #[serde(deserialize_with = "de_text")]
    pub name: String,
    #[serde(deserialize_with = "de_text")]
    pub color: String,
    #[serde(deserialize_with = "de_points")]
    pub data: Vec<TimeValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PanelSeries {
    #[serde(deserialize_with = "de_text")]
    pub name: String,
    #[serde(deserialize_with = "de_text")]
    pub color: String,
    #[serde(alias = "type", deserialize_with = "de_kind")]
    pub kind: SeriesKind,
    #[serde(deserialize_with = "de_points")]
    pub data: Vec<TimeValue>,
}

/// One oscillator panel: every series in it shares one vertical scale.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PanelGroup {
    #[serde(deserialize_with = "de_text")]
    pub id: String,
    #[serde(deserialize_with = "de_list")]
    pub series: Vec<PanelSeries>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Prediction {
    /// Forecast points in wire order; not guaranteed sorted.
    #[serde(alias = "forecast_values", deserialize_with = "de_forecast")]
    pub forecast_values: Vec<TimeValue>,
    #[serde(alias = "confidence_score")]
    pub confidence_score: Option<f64>,
}

impl Prediction {
    /// Forecast projected into a time-ascending line.
    pub fn forecast_line(&self) -> Vec<TimeValue> {
        sorted_points(&self.forecast_values)
    }
}

/// One complete market-data payload. Replaces all previously rendered state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketEnvelope {
    #[serde(deserialize_with = "de_history")]
    pub history: Vec<Bar>,
    #[serde(alias = "technical_indicators", deserialize_with = "de_list")]
    pub technical_indicators: Vec<OverlaySeries>,
    #[serde(deserialize_with = "de_list")]
    pub panels: Vec<PanelGroup>,
    #[serde(deserialize_with = "de_list")]
    pub predictions: Vec<Prediction>,
}

impl MarketEnvelope {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("Failed to parse market envelope")
    }

    /// History sorted by time with duplicate times collapsed (last one wins).
    pub fn sorted_history(&self) -> Vec<Bar> {
        collapse_by_time(self.history.clone(), |b| b.time)
    }

    pub fn has_volume_data(&self) -> bool {
        has_volume_data(&self.history)
    }

    /// Only the first prediction is ever rendered.
    pub fn primary_prediction(&self) -> Option<&Prediction> {
        self.predictions.first()
    }
}

pub fn has_volume_data(history: &[Bar]) -> bool {
    history.iter().any(|b| b.volume > VOLUME_EPSILON)
}

/// Points sorted by time with duplicate times collapsed (last one wins).
pub fn sorted_points(points: &[TimeValue]) -> Vec<TimeValue> {
    collapse_by_time(points.to_vec(), |p| p.time)
}

fn collapse_by_time<T>(mut items: Vec<T>, time: impl Fn(&T) -> i64) -> Vec<T> {
    // Stable sort keeps arrival order within equal times
    items.sort_by_key(|item| time(item));
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        match out.last_mut() {
            Some(last) if time(last) == time(&item) => *last = item,
            _ => out.push(item),
        }
    }
    out
}

// --- LENIENT FIELD DESERIALIZERS ---

/// `null` reads as an empty list.
fn de_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn de_history<'de, D>(deserializer: D) -> Result<Vec<Bar>, D::Error>
where
    D: Deserializer<'de>,
{
    // Bars are parsed one by one so a single bad record doesn't sink the envelope
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    let raw = raw.unwrap_or_default();
    let total = raw.len();
    let bars: Vec<Bar> = raw
        .into_iter()
        .filter_map(|v| serde_json::from_value::<Bar>(v).ok())
        .collect();
    if bars.len() < total {
        log::warn!("Dropped {} history bars without a usable time", total - bars.len());
    }
    Ok(bars)
}

#[derive(Deserialize)]
struct RawPoint {
    time: Option<RawTime>,
    value: Option<RawNumber>,
}

fn de_points<'de, D>(deserializer: D) -> Result<Vec<TimeValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawPoint>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| {
            let time = p.time.as_ref()?.to_epoch_sec()?;
            let value = p.value.as_ref()?.finite()?;
            Some(TimeValue::new(time, value))
        })
        .collect())
}

fn de_forecast<'de, D>(deserializer: D) -> Result<Vec<TimeValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<RawNumber>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| {
            let time = parse_epoch_sec(&k)?;
            let value = v?.finite()?;
            Some(TimeValue::new(time, value))
        })
        .collect())
}

fn de_kind<'de, D>(deserializer: D) -> Result<SeriesKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("histogram") => SeriesKind::Histogram,
        _ => SeriesKind::Line,
    })
}
