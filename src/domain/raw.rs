//! Lenient wire primitives shared by the envelope types.

use serde::Deserialize;

/// Epoch seconds as sent by the backend: integer, float or numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTime {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawTime {
    pub(crate) fn to_epoch_sec(&self) -> Option<i64> {
        match self {
            RawTime::Int(t) => Some(*t),
            RawTime::Float(t) if t.is_finite() => Some(t.trunc() as i64),
            RawTime::Float(_) => None,
            RawTime::Text(s) => parse_epoch_sec(s),
        }
    }
}

pub(crate) fn parse_epoch_sec(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .map(|t| t.trunc() as i64)
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawNumber {
    Num(f64),
    Text(String),
}

impl RawNumber {
    pub(crate) fn finite(&self) -> Option<f64> {
        let v = match self {
            RawNumber::Num(v) => *v,
            RawNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    pub(crate) fn finite_or_zero(&self) -> f64 {
        self.finite().unwrap_or(0.0)
    }
}
