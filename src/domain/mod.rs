// Domain types and value objects
mod bar;
mod display;
mod envelope;
mod raw;
mod shape;

pub use bar::{Bar, CandleType};
pub use display::{DisplayConfig, DisplayMode};
pub use envelope::{
    MarketEnvelope, OverlaySeries, PanelGroup, PanelSeries, Prediction, SeriesKind, TimeValue,
    VOLUME_EPSILON, has_volume_data, sorted_points,
};
pub use shape::{DomainPoint, Shape, ShapeKind};
