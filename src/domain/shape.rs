use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[strum(to_string = "Trend Line")]
    Trendline,
    #[strum(to_string = "Horz Level")]
    Horizontal,
}

/// A point in chart domain space: epoch seconds and price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainPoint {
    pub time: i64,
    pub price: f64,
}

impl DomainPoint {
    pub fn new(time: i64, price: f64) -> Self {
        Self { time, price }
    }
}

/// A committed two-point annotation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: String,
    #[serde(alias = "type")]
    pub kind: ShapeKind,
    pub p1: DomainPoint,
    pub p2: DomainPoint,
}

impl Shape {
    pub fn new(id: impl Into<String>, kind: ShapeKind, p1: DomainPoint, p2: DomainPoint) -> Self {
        Self {
            id: id.into(),
            kind,
            p1,
            p2,
        }
    }
}
