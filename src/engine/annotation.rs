//! Two-point drawing tools and the persisted shape list.
//!
//! Shapes live in time/price space. Pixel positions are re-derived from the
//! current scales on every paint, so panning or zooming never touches the
//! stored coordinates.

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::config::{DF, PERSISTENCE};
use crate::domain::{DomainPoint, Shape, ShapeKind};
use crate::engine::store::KeyValueStore;
use crate::engine::surface::CoordinateSpace;
use crate::utils::format_price;

/// Shape being drawn: first point placed, second tracking the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialShape {
    pub kind: ShapeKind,
    pub p1: DomainPoint,
    pub p2: DomainPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing(PartialShape),
}

/// What a pointer event did to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationOutcome {
    /// No tool selected, nothing in progress, or the point didn't convert
    Ignored,
    Started,
    Updated,
    Committed(Shape),
}

/// Pixel-space drawing primitive for one shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGlyph {
    /// Trend line segment with endpoint markers
    Segment {
        from: (f64, f64),
        to: (f64, f64),
        preview: bool,
    },
    /// Full-width dashed level with its price label
    Level {
        y: f64,
        width: f64,
        label: String,
        preview: bool,
    },
}

pub fn encode_shapes(shapes: &[Shape]) -> Result<Vec<u8>> {
    serde_json::to_vec(shapes).context("Failed to encode shapes")
}

pub fn decode_shapes(bytes: &[u8]) -> Result<Vec<Shape>> {
    serde_json::from_slice(bytes).context("Failed to decode shapes")
}

pub struct AnnotationEngine<S: KeyValueStore> {
    store: S,
    key: String,
    shapes: Vec<Shape>,
    state: DrawState,
    active_tool: Option<ShapeKind>,
}

impl<S: KeyValueStore> AnnotationEngine<S> {
    /// Loads the shape list stored under the default annotation key.
    pub fn load(store: S) -> Self {
        Self::load_with_key(store, PERSISTENCE.annotations.key)
    }

    /// A missing or unreadable list starts the engine empty.
    pub fn load_with_key(store: S, key: &str) -> Self {
        let shapes = match store.load(key) {
            Ok(Some(bytes)) => decode_shapes(&bytes).unwrap_or_else(|e| {
                log::warn!("Discarding stored annotations: {:#}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read annotations: {:#}", e);
                Vec::new()
            }
        };
        if DF.log_annotations {
            log::info!("Loaded {} annotations", shapes.len());
        }
        Self {
            store,
            key: key.to_string(),
            shapes,
            state: DrawState::Idle,
            active_tool: None,
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing(_))
    }

    pub fn active_tool(&self) -> Option<ShapeKind> {
        self.active_tool
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Switching tools abandons any shape in progress.
    pub fn set_active_tool(&mut self, tool: Option<ShapeKind>) {
        if tool != self.active_tool {
            self.cancel();
            self.active_tool = tool;
        }
    }

    pub fn cancel(&mut self) {
        if self.is_drawing() && DF.log_annotations {
            log::info!("Annotation cancelled");
        }
        self.state = DrawState::Idle;
    }

    pub fn pointer_click(&mut self, space: &impl CoordinateSpace, x: f64, y: f64) -> AnnotationOutcome {
        let Some(point) = to_domain(space, x, y) else {
            return AnnotationOutcome::Ignored;
        };
        match self.state {
            DrawState::Idle => {
                let Some(kind) = self.active_tool else {
                    return AnnotationOutcome::Ignored;
                };
                self.state = DrawState::Drawing(PartialShape {
                    kind,
                    p1: point,
                    p2: point,
                });
                AnnotationOutcome::Started
            }
            DrawState::Drawing(partial) => {
                let shape = Shape::new(Uuid::new_v4().to_string(), partial.kind, partial.p1, point);
                self.shapes.push(shape.clone());
                self.state = DrawState::Idle;
                self.persist();
                if DF.log_annotations {
                    log::info!("Committed {} {}", shape.kind, shape.id);
                }
                AnnotationOutcome::Committed(shape)
            }
        }
    }

    pub fn pointer_move(&mut self, space: &impl CoordinateSpace, x: f64, y: f64) -> AnnotationOutcome {
        let DrawState::Drawing(partial) = &mut self.state else {
            return AnnotationOutcome::Ignored;
        };
        match to_domain(space, x, y) {
            Some(point) => {
                partial.p2 = point;
                AnnotationOutcome::Updated
            }
            None => AnnotationOutcome::Ignored,
        }
    }

    /// Removes every committed shape and saves the empty list.
    pub fn clear_all(&mut self) {
        self.state = DrawState::Idle;
        self.shapes.clear();
        self.persist();
        if DF.log_annotations {
            log::info!("Cleared all annotations");
        }
    }

    /// Pixel primitives for the committed shapes plus the one in progress.
    /// Shapes whose anchors are off-screen are skipped, not dropped.
    pub fn project(&self, space: &impl CoordinateSpace) -> Vec<ShapeGlyph> {
        let preview = match self.state {
            DrawState::Drawing(p) => Some((p.kind, p.p1, p.p2)),
            DrawState::Idle => None,
        };
        self.shapes
            .iter()
            .map(|s| (s.kind, s.p1, s.p2, false))
            .chain(preview.map(|(k, p1, p2)| (k, p1, p2, true)))
            .filter_map(|(kind, p1, p2, preview)| project_shape(space, kind, p1, p2, preview))
            .collect()
    }

    /// Write-through save. Failures are logged and otherwise ignored.
    fn persist(&mut self) {
        let result = encode_shapes(&self.shapes).and_then(|bytes| self.store.save(&self.key, &bytes));
        if let Err(e) = result {
            log::error!("Failed to save annotations: {:#}", e);
        }
    }
}

fn to_domain(space: &impl CoordinateSpace, x: f64, y: f64) -> Option<DomainPoint> {
    Some(DomainPoint::new(space.x_to_time(x)?, space.y_to_price(y)?))
}

fn project_shape(
    space: &impl CoordinateSpace,
    kind: ShapeKind,
    p1: DomainPoint,
    p2: DomainPoint,
    preview: bool,
) -> Option<ShapeGlyph> {
    match kind {
        ShapeKind::Trendline => Some(ShapeGlyph::Segment {
            from: (space.time_to_x(p1.time)?, space.price_to_y(p1.price)?),
            to: (space.time_to_x(p2.time)?, space.price_to_y(p2.price)?),
            preview,
        }),
        ShapeKind::Horizontal => Some(ShapeGlyph::Level {
            y: space.price_to_y(p1.price)?,
            width: space.pane_width(),
            label: format_price(p1.price),
            preview,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::MemoryStore;

    /// 10px per time unit, 10px per price unit (price 100 at the top).
    /// Pixels outside 0..=1000 don't convert.
    struct GridSpace {
        shift_x: f64,
    }

    impl GridSpace {
        fn new() -> Self {
            Self { shift_x: 0.0 }
        }
    }

    impl CoordinateSpace for GridSpace {
        fn time_to_x(&self, time: i64) -> Option<f64> {
            let x = time as f64 * 10.0 + self.shift_x;
            (0.0..=1000.0).contains(&x).then_some(x)
        }
        fn price_to_y(&self, price: f64) -> Option<f64> {
            let y = (100.0 - price) * 10.0;
            (0.0..=1000.0).contains(&y).then_some(y)
        }
        fn x_to_time(&self, x: f64) -> Option<i64> {
            (0.0..=1000.0)
                .contains(&x)
                .then(|| ((x - self.shift_x) / 10.0).round() as i64)
        }
        fn y_to_price(&self, y: f64) -> Option<f64> {
            (0.0..=1000.0).contains(&y).then(|| 100.0 - y / 10.0)
        }
        fn pane_width(&self) -> f64 {
            1000.0
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn load(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            anyhow::bail!("disk on fire")
        }
        fn save(&mut self, _key: &str, _bytes: &[u8]) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    fn engine() -> AnnotationEngine<MemoryStore> {
        AnnotationEngine::load(MemoryStore::new())
    }

    #[test]
    fn click_move_click_commits_first_and_last_points() {
        let space = GridSpace::new();
        let mut eng = engine();
        eng.set_active_tool(Some(ShapeKind::Trendline));

        assert_eq!(eng.pointer_click(&space, 100.0, 500.0), AnnotationOutcome::Started);
        let a = DomainPoint::new(10, 50.0);
        assert_eq!(
            eng.state(),
            DrawState::Drawing(PartialShape {
                kind: ShapeKind::Trendline,
                p1: a,
                p2: a
            })
        );

        assert_eq!(eng.pointer_move(&space, 200.0, 400.0), AnnotationOutcome::Updated);
        let DrawState::Drawing(partial) = eng.state() else {
            panic!("expected drawing");
        };
        assert_eq!(partial.p2, DomainPoint::new(20, 60.0));

        let AnnotationOutcome::Committed(shape) = eng.pointer_click(&space, 300.0, 300.0) else {
            panic!("expected commit");
        };
        assert_eq!(eng.state(), DrawState::Idle);
        assert_eq!(shape.p1, a);
        assert_eq!(shape.p2, DomainPoint::new(30, 70.0));
        assert_eq!(eng.shapes(), &[shape]);
    }

    #[test]
    fn failed_conversion_never_changes_state() {
        let space = GridSpace::new();
        let mut eng = engine();
        eng.set_active_tool(Some(ShapeKind::Horizontal));

        // Idle: click off the pane stays idle
        assert_eq!(eng.pointer_click(&space, -5.0, 500.0), AnnotationOutcome::Ignored);
        assert_eq!(eng.state(), DrawState::Idle);

        eng.pointer_click(&space, 100.0, 500.0);
        let drawing = eng.state();

        // Drawing: failed move keeps the previous p2, failed click keeps drawing
        assert_eq!(eng.pointer_move(&space, 100.0, 2000.0), AnnotationOutcome::Ignored);
        assert_eq!(eng.state(), drawing);
        assert_eq!(eng.pointer_click(&space, 5000.0, 10.0), AnnotationOutcome::Ignored);
        assert_eq!(eng.state(), drawing);
        assert!(eng.shapes().is_empty());
        assert!(eng.store().get(PERSISTENCE.annotations.key).is_none());
    }

    #[test]
    fn no_tool_means_clicks_do_nothing() {
        let space = GridSpace::new();
        let mut eng = engine();
        assert_eq!(eng.pointer_click(&space, 100.0, 100.0), AnnotationOutcome::Ignored);
        assert_eq!(eng.pointer_move(&space, 100.0, 100.0), AnnotationOutcome::Ignored);
        assert_eq!(eng.state(), DrawState::Idle);
    }

    #[test]
    fn switching_tool_cancels_in_progress_shape() {
        let space = GridSpace::new();
        let mut eng = engine();
        eng.set_active_tool(Some(ShapeKind::Trendline));
        eng.pointer_click(&space, 100.0, 100.0);
        eng.set_active_tool(Some(ShapeKind::Horizontal));
        assert_eq!(eng.state(), DrawState::Idle);
        assert!(eng.shapes().is_empty());
    }

    #[test]
    fn every_commit_is_written_through() {
        let space = GridSpace::new();
        let mut eng = engine();
        eng.set_active_tool(Some(ShapeKind::Trendline));
        for i in 0..2 {
            let x = 100.0 + i as f64 * 100.0;
            eng.pointer_click(&space, x, 100.0);
            eng.pointer_click(&space, x + 50.0, 200.0);
        }
        let saved = eng.store().get(PERSISTENCE.annotations.key).unwrap();
        assert_eq!(decode_shapes(saved).unwrap(), eng.shapes().to_vec());
        assert_eq!(eng.shapes().len(), 2);
        assert_ne!(eng.shapes()[0].id, eng.shapes()[1].id);

        // Reloading from the same store restores the list
        let store = eng.store().clone();
        let reloaded = AnnotationEngine::load(store);
        assert_eq!(reloaded.shapes(), eng.shapes());
    }

    #[test]
    fn clear_all_saves_an_empty_list() {
        let space = GridSpace::new();
        let mut eng = engine();
        eng.set_active_tool(Some(ShapeKind::Horizontal));
        eng.pointer_click(&space, 100.0, 100.0);
        eng.pointer_click(&space, 200.0, 100.0);
        eng.clear_all();
        assert!(eng.shapes().is_empty());
        assert_eq!(eng.store().get(PERSISTENCE.annotations.key), Some(&b"[]"[..]));
    }

    #[test]
    fn serialized_list_round_trips_byte_identical() {
        let shapes = vec![
            Shape::new("b", ShapeKind::Trendline, DomainPoint::new(5, 1.25), DomainPoint::new(9, 3.5)),
            Shape::new("a", ShapeKind::Horizontal, DomainPoint::new(2, 100.0), DomainPoint::new(2, 100.0)),
        ];
        let bytes = encode_shapes(&shapes).unwrap();
        let reloaded = decode_shapes(&bytes).unwrap();
        assert_eq!(reloaded, shapes);
        assert_eq!(encode_shapes(&reloaded).unwrap(), bytes);
    }

    #[test]
    fn corrupt_or_unreadable_store_starts_empty() {
        let store = MemoryStore::new().with_entry(PERSISTENCE.annotations.key, "{not json");
        assert!(AnnotationEngine::load(store).shapes().is_empty());

        let mut eng = AnnotationEngine::load(BrokenStore);
        assert!(eng.shapes().is_empty());
        // Save failures don't block the commit
        let space = GridSpace::new();
        eng.set_active_tool(Some(ShapeKind::Trendline));
        eng.pointer_click(&space, 100.0, 100.0);
        assert!(matches!(
            eng.pointer_click(&space, 200.0, 200.0),
            AnnotationOutcome::Committed(_)
        ));
        assert_eq!(eng.shapes().len(), 1);
    }

    #[test]
    fn view_changes_move_pixels_not_domain_points() {
        let mut space = GridSpace::new();
        let mut eng = engine();
        eng.set_active_tool(Some(ShapeKind::Trendline));
        eng.pointer_click(&space, 100.0, 500.0);
        eng.pointer_click(&space, 300.0, 300.0);
        let stored = eng.shapes().to_vec();

        let before = eng.project(&space);
        space.shift_x = 50.0; // pan
        let after = eng.project(&space);

        assert_eq!(eng.shapes(), stored.as_slice());
        assert_eq!(
            before,
            vec![ShapeGlyph::Segment {
                from: (100.0, 500.0),
                to: (300.0, 300.0),
                preview: false
            }]
        );
        assert_eq!(
            after,
            vec![ShapeGlyph::Segment {
                from: (150.0, 500.0),
                to: (350.0, 300.0),
                preview: false
            }]
        );
    }

    #[test]
    fn off_screen_shapes_are_skipped_but_kept() {
        let mut space = GridSpace::new();
        let mut eng = engine();
        eng.set_active_tool(Some(ShapeKind::Trendline));
        eng.pointer_click(&space, 900.0, 500.0);
        eng.pointer_click(&space, 950.0, 500.0);
        eng.set_active_tool(Some(ShapeKind::Horizontal));
        eng.pointer_click(&space, 950.0, 250.0);
        eng.pointer_click(&space, 960.0, 250.0);

        space.shift_x = 200.0; // trend line endpoints now past the right edge
        let glyphs = eng.project(&space);
        assert_eq!(eng.shapes().len(), 2);
        assert_eq!(
            glyphs,
            vec![ShapeGlyph::Level {
                y: 250.0,
                width: 1000.0,
                label: "75.00".to_string(),
                preview: false
            }]
        );
    }

    #[test]
    fn in_progress_shape_projects_as_preview() {
        let space = GridSpace::new();
        let mut eng = engine();
        eng.set_active_tool(Some(ShapeKind::Trendline));
        eng.pointer_click(&space, 100.0, 100.0);
        eng.pointer_move(&space, 200.0, 200.0);
        assert_eq!(
            eng.project(&space),
            vec![ShapeGlyph::Segment {
                from: (100.0, 100.0),
                to: (200.0, 200.0),
                preview: true
            }]
        );
    }
}
