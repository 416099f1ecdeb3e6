//! End-to-end flows through the headless engine: envelope in, series,
//! margins, legend and annotations out.

use std::cell::RefCell;
use std::rc::Rc;

use quant_chart::domain::{DisplayConfig, DisplayMode, MarketEnvelope, ShapeKind};
use quant_chart::engine::{
    AnnotationEngine, AnnotationOutcome, ChartSurface, CoordinateSpace, DataReconciler,
    FileStore, LegendReadout, PanelLayout, ScaleId, SeriesKey, SurfaceSize, ViewChange,
};

const ENVELOPE: &str = r##"{
    "history": [
        {"time": "86400",  "open": 10, "high": 12, "low": 9,  "close": 11, "volume": 1000},
        {"time": 172800,   "open": 11, "high": 13, "low": 10, "close": 12, "volume": 2000},
        {"time": 259200,   "open": 12, "high": 14, "low": 11, "close": 13, "volume": 3000},
        {"time": 345600,   "open": 13, "high": 15, "low": 12, "close": 14.5, "volume": 4000}
    ],
    "technicalIndicators": [
        {"name": "EMA 20", "color": "#2962ff", "data": [{"time": 259200, "value": 12.5}, {"time": 345600, "value": 13.25}]}
    ],
    "panels": [
        {"id": "rsi", "series": [{"name": "RSI", "color": "#7e57c2", "type": "line",
            "data": [{"time": 259200, "value": 61.0}, {"time": 345600, "value": 66.0}]}]},
        {"id": "macd", "series": [{"name": "Hist", "color": "#26a69a", "type": "histogram",
            "data": [{"time": 259200, "value": -0.4}, {"time": 345600, "value": 0.3}]}]}
    ],
    "predictions": [
        {"forecast_values": {"432000": 15.0, "518400": 15.5}, "confidence_score": 72.0}
    ]
}"##;

fn envelope() -> MarketEnvelope {
    MarketEnvelope::from_json(ENVELOPE.as_bytes()).unwrap()
}

fn surface() -> ChartSurface {
    ChartSurface::create(SurfaceSize::new(800.0, 600.0))
}

#[test]
fn market_mode_builds_every_layer_and_stacks_panels() {
    let mut surface = surface();
    let mut reconciler = DataReconciler::default();
    reconciler.reconcile(&mut surface, &envelope(), &DisplayConfig::default());
    surface.fit_content();

    let registry = surface.registry();
    assert!(registry.get(&SeriesKey::Candles).unwrap().options.visible);
    assert!(registry.get(&SeriesKey::Volume).unwrap().options.visible);
    assert!(!registry.get(&SeriesKey::Forecast).unwrap().options.visible);
    assert!(registry.contains(&SeriesKey::Overlay { index: 0 }));

    let layout = PanelLayout::default();
    let rsi = surface
        .scale_margins(&ScaleId::Panel {
            slot: 0,
            panel_id: "rsi".into(),
        })
        .unwrap();
    let macd = surface
        .scale_margins(&ScaleId::Panel {
            slot: 1,
            panel_id: "macd".into(),
        })
        .unwrap();
    assert_eq!(rsi, layout.panel_margins(0, 2, true));
    assert_eq!(macd, layout.panel_margins(1, 2, true));

    // Bands never overlap: main above rsi above macd above volume
    let main = surface.scale_margins(&ScaleId::Main).unwrap();
    let (main_lo, _) = main.band();
    let (rsi_lo, rsi_hi) = rsi.band();
    let (macd_lo, macd_hi) = macd.band();
    assert!(main_lo >= rsi_hi - 1e-9);
    assert!(rsi_lo >= macd_hi - 1e-9);
    assert!(macd_lo >= layout.volume_reserved - 1e-9);

    let header = reconciler.last_header().unwrap();
    assert_eq!(header.last_price, 14.5);
    assert!((header.change - 1.5).abs() < 1e-9);
    assert!(reconciler.forecast_badge().is_none());
}

#[test]
fn switching_to_lab_swaps_panels_for_forecast() {
    let mut surface = surface();
    let mut reconciler = DataReconciler::default();
    let env = envelope();
    reconciler.reconcile(&mut surface, &env, &DisplayConfig::default());
    reconciler.reconcile(&mut surface, &env, &DisplayConfig::with_mode(DisplayMode::Lab));

    let registry = surface.registry();
    assert!(registry.get(&SeriesKey::Forecast).unwrap().options.visible);
    assert!(!registry.keys().any(|k| k.is_transient()));
    assert!(
        surface
            .scale_ids()
            .all(|id| !matches!(id, ScaleId::Panel { .. }))
    );
    let badge = reconciler.forecast_badge().unwrap();
    assert_eq!(badge.confidence, 72.0);

    // Forecast times extend the shared time scale
    assert_eq!(surface.time_scale().points().last(), Some(&518400));
}

#[test]
fn legend_follows_the_hovered_bucket() {
    let mut surface = surface();
    let mut reconciler = DataReconciler::default();
    reconciler.reconcile(&mut surface, &envelope(), &DisplayConfig::default());
    surface.fit_content();

    let x = surface.time_to_x(345600).unwrap();
    let hovered = surface.x_to_time(x).unwrap();
    assert_eq!(hovered, 345600);

    let legend = LegendReadout::compose(surface.registry(), hovered).to_string();
    assert_eq!(legend, "14.50 1970-01-05 Vol:4.00K EMA 20:13.25 RSI:66.00 Hist:0.30");
}

#[test]
fn view_changes_are_observed_and_keep_annotations_in_domain_space() {
    let mut surface = surface();
    let mut reconciler = DataReconciler::default();
    reconciler.reconcile(&mut surface, &envelope(), &DisplayConfig::default());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    surface.on_view_change(move |change| sink.borrow_mut().push(*change));
    surface.fit_content();

    let dir = std::env::temp_dir().join(format!("quant_chart_it_{}", uuid::Uuid::new_v4()));
    let mut annotations = AnnotationEngine::load(FileStore::new(&dir));
    annotations.set_active_tool(Some(ShapeKind::Trendline));

    let a = (surface.time_to_x(172800).unwrap(), 300.0);
    let b = (surface.time_to_x(345600).unwrap(), 200.0);
    assert_eq!(annotations.pointer_click(&surface, a.0, a.1), AnnotationOutcome::Started);
    let AnnotationOutcome::Committed(shape) = annotations.pointer_click(&surface, b.0, b.1) else {
        panic!("expected commit");
    };
    assert_eq!(shape.p1.time, 172800);
    assert_eq!(shape.p2.time, 345600);

    surface.zoom(0.5, 400.0);
    surface.resize(SurfaceSize::new(640.0, 480.0));
    assert_eq!(annotations.shapes(), &[shape.clone()]);
    assert_eq!(
        *seen.borrow(),
        vec![
            ViewChange::Fitted,
            ViewChange::Zoomed,
            ViewChange::Resized(SurfaceSize::new(640.0, 480.0))
        ]
    );

    // A fresh engine over the same directory sees the committed shape
    let reloaded = AnnotationEngine::load(FileStore::new(&dir));
    assert_eq!(reloaded.shapes(), &[shape]);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn empty_envelope_leaves_the_chart_blank() {
    let mut surface = surface();
    let mut reconciler = DataReconciler::default();
    let env = MarketEnvelope::from_json(b"{}").unwrap();
    reconciler.reconcile(&mut surface, &env, &DisplayConfig::default());

    assert!(reconciler.last_header().is_none());
    assert!(surface.time_scale().points().is_empty());
    assert_eq!(surface.x_to_time(10.0), None);
    assert_eq!(surface.y_to_price(10.0), None);
}
