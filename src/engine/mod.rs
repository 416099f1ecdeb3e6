mod annotation;
mod events;
mod layout;
mod legend;
mod reconciler;
mod registry;
mod store;
mod surface;

pub use annotation::{
    AnnotationEngine, AnnotationOutcome, DrawState, PartialShape, ShapeGlyph, decode_shapes,
    encode_shapes,
};
pub use events::Signal;
pub use layout::{PanelLayout, ScaleMargins};
pub use legend::{Legend, LegendReadout, LegendToken, TokenRole};
pub use reconciler::{
    ConfidenceTier, DataReconciler, ForecastBadge, PriceHeader, parse_series_color,
};
pub use registry::{
    HistogramBar, LineStyle, PriceLine, Series, SeriesData, SeriesHandle, SeriesKey,
    SeriesOptions, SeriesRegistry, SeriesValue,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use surface::{
    ChartSurface, CoordinateSpace, HoverEvent, PriceScale, ScaleId, SurfaceSize, TimeScale,
    ViewChange,
};
