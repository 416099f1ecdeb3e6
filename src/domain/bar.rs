use serde::{Deserialize, Serialize};

use crate::domain::raw::{RawNumber, RawTime};

#[derive(Debug, PartialEq)]
pub enum CandleType {
    Bullish,
    Bearish,
}

/// One OHLCV sample. `time` is epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBar")]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Bar {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn get_type(&self) -> CandleType {
        if self.close >= self.open {
            CandleType::Bullish
        } else {
            CandleType::Bearish
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.get_type() == CandleType::Bullish
    }

    // Returns the low and high of the candle body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        match self.get_type() {
            CandleType::Bullish => (self.open, self.close),
            CandleType::Bearish => (self.close, self.open),
        }
    }
}

/// Wire shape of a bar. Every field is optional and numbers may arrive as strings.
#[derive(Deserialize)]
struct RawBar {
    time: Option<RawTime>,
    open: Option<RawNumber>,
    high: Option<RawNumber>,
    low: Option<RawNumber>,
    close: Option<RawNumber>,
    volume: Option<RawNumber>,
}

impl TryFrom<RawBar> for Bar {
    type Error = String;

    fn try_from(raw: RawBar) -> Result<Self, Self::Error> {
        let time = raw
            .time
            .as_ref()
            .and_then(RawTime::to_epoch_sec)
            .ok_or_else(|| "bar has no usable time".to_string())?;

        let num = |v: &Option<RawNumber>| v.as_ref().map(RawNumber::finite_or_zero).unwrap_or(0.0);

        Ok(Bar {
            time,
            open: num(&raw.open),
            high: num(&raw.high),
            low: num(&raw.low),
            close: num(&raw.close),
            volume: num(&raw.volume),
        })
    }
}
