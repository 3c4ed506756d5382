//! Editor
//!
//! Owns the layer model, the shared scene graph and the history, and keeps
//! them consistent:
//!
//! - every layer-model change runs one forward sync pass (subscription)
//! - user edits on the scene are queued by the reverse listener and flushed
//!   into the layer model once the scene is released
//! - every completed user-level operation records one history entry
//!
//! All of this is single-threaded. The scene is shared through
//! `Rc<RefCell<_>>` and is never borrowed while the layer model notifies.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use chrono::Utc;
use tracing::{debug, info};

use crate::canvas::{Background, CanvasPatch, CanvasSettings, Gradient};
use crate::config::EditorConfig;
use crate::document::{Document, DOCUMENT_VERSION};
use crate::error::{AtelierError, Result};
use crate::export::{export_scene, DownloadSink, ExportReport, ExportRequest, RasterSurface};
use crate::history::{HistoryManager, Restore};
use crate::layers::{Layer, LayerId, LayerKind, LayerModel, LayerPatch, MoveDirection, ShapeKind, TextStyle};
use crate::layout::{apply_auto_layout, LayoutOutcome};
use crate::scene::{SceneGraph, SceneObject, Snapshot, TextProps};
use crate::sync::{capture_layer, ReverseSync, SyncGuard, SyncReport, Synchronizer};
use crate::template::Template;

/// Where new text lands.
const TEXT_INSERT_POSITION: f64 = 100.0;

/// How an inserted image is fitted to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePlacement {
    /// Supporting asset, fitted to 40% of the canvas.
    Asset,
    /// Main image, fitted to 80% of the canvas.
    Primary,
}

impl ImagePlacement {
    fn fit_ratio(self) -> f64 {
        match self {
            ImagePlacement::Asset => 0.4,
            ImagePlacement::Primary => 0.8,
        }
    }

    fn default_name(self) -> &'static str {
        match self {
            ImagePlacement::Asset => "Brand Asset",
            ImagePlacement::Primary => "Image Layer",
        }
    }
}

pub struct Editor {
    config: EditorConfig,
    canvas: CanvasSettings,
    /// Canvas the session started on; undoing past the first entry returns to it.
    base_canvas: CanvasSettings,
    layers: LayerModel,
    scene: Rc<RefCell<SceneGraph>>,
    history: HistoryManager,
    guard: SyncGuard,
    reverse: ReverseSync,
    last_sync: Rc<RefCell<Option<SyncReport>>>,
}

impl Editor {
    /// Empty editor on the configured canvas.
    pub fn new(config: EditorConfig) -> Self {
        let canvas = config.canvas.clone();
        Self::assemble(config, canvas, LayerModel::new())
    }

    fn assemble(config: EditorConfig, canvas: CanvasSettings, mut layers: LayerModel) -> Self {
        let guard = SyncGuard::new();
        let reverse = ReverseSync::new(guard.clone());
        let scene = Rc::new(RefCell::new(SceneGraph::from_settings(&canvas)));
        scene.borrow_mut().add_listener(reverse.listener());

        let last_sync = Rc::new(RefCell::new(None));
        let mut synchronizer = Synchronizer::new(guard.clone());
        let sync_scene = Rc::clone(&scene);
        let sync_report = Rc::clone(&last_sync);
        layers.subscribe(Box::new(move |current: &[Layer]| {
            let report = synchronizer.reconcile(current, &mut sync_scene.borrow_mut());
            *sync_report.borrow_mut() = Some(report);
        }));

        let history = HistoryManager::new(config.history.max_depth);
        Self {
            config,
            base_canvas: canvas.clone(),
            canvas,
            layers,
            scene,
            history,
            guard,
            reverse,
            last_sync,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn canvas(&self) -> &CanvasSettings {
        &self.canvas
    }

    /// Layers, bottom first.
    pub fn layers(&self) -> &[Layer] {
        self.layers.layers()
    }

    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    pub fn next_layer_id(&self) -> u64 {
        self.layers.next_id()
    }

    pub fn scene(&self) -> Ref<'_, SceneGraph> {
        self.scene.borrow()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Report of the most recent forward sync pass.
    pub fn last_sync_report(&self) -> Option<SyncReport> {
        self.last_sync.borrow().clone()
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Insert a text layer near the top-left corner.
    pub fn insert_text(&mut self, style: TextStyle) -> LayerId {
        let id = self.layers.allocate_id(LayerKind::Text);
        let mut object = SceneObject::text(id.clone(), TextProps::from(&style))
            .at(TEXT_INSERT_POSITION, TEXT_INSERT_POSITION)
            .with_fill(style.fill.clone());
        object.shadow = style.shadow;
        self.add_object(object, "Add text");
        id
    }

    /// Insert an image of native size `width`x`height`, scaled to fit the
    /// placement's share of the canvas and centred.
    pub fn insert_image(
        &mut self,
        src: &str,
        width: f64,
        height: f64,
        placement: ImagePlacement,
    ) -> Result<LayerId> {
        if !(width > 0.0 && height > 0.0) {
            return Err(AtelierError::InvalidAsset {
                reason: format!("{src} has no usable size ({width}x{height})"),
            });
        }

        let canvas_w = f64::from(self.canvas.width);
        let canvas_h = f64::from(self.canvas.height);
        let ratio = placement.fit_ratio();
        let scale = (canvas_w * ratio / width).min(canvas_h * ratio / height);

        let id = self.layers.allocate_id(LayerKind::Image);
        let mut object = SceneObject::image(id.clone(), src, width, height).at(
            (canvas_w - width * scale) / 2.0,
            (canvas_h - height * scale) / 2.0,
        );
        object.scale(scale);
        object.name = Some(placement.default_name().to_string());
        self.add_object(object, "Add image");
        Ok(id)
    }

    /// Insert a centred shape.
    pub fn insert_shape(&mut self, shape: ShapeKind, width: f64, height: f64, fill: &str) -> LayerId {
        let id = self.layers.allocate_id(LayerKind::Shape);
        let object = SceneObject::shape(id.clone(), shape, width, height)
            .at(
                (f64::from(self.canvas.width) - width) / 2.0,
                (f64::from(self.canvas.height) - height) / 2.0,
            )
            .with_fill(fill);
        self.add_object(object, "Add shape");
        id
    }

    fn add_object(&mut self, object: SceneObject, label: &str) {
        let id = object.id.clone();
        let layer = capture_layer(&object, None);
        self.scene.borrow_mut().add(object);
        self.reverse.attach(id.clone());
        self.layers.push(layer);
        info!(layer = %id, "{}", label);
        self.save_history(label);
    }

    // ------------------------------------------------------------------
    // Layer operations
    // ------------------------------------------------------------------

    /// Apply a partial update. Returns whether the layer changed.
    pub fn update_layer(&mut self, id: &LayerId, patch: &LayerPatch) -> bool {
        if !self.layers.apply_patch(id, patch) {
            return false;
        }
        self.finish_deletions();
        self.save_history("Update layer");
        true
    }

    /// Tombstone a layer; the sync pass removes its object and the layer is
    /// pruned afterwards.
    pub fn delete_layer(&mut self, id: &LayerId) -> bool {
        if !self.layers.mark_for_deletion(id) {
            return false;
        }
        self.finish_deletions();
        info!(layer = %id, "layer deleted");
        self.save_history("Delete layer");
        true
    }

    /// Move a layer one step in the stack.
    pub fn move_layer(&mut self, id: &LayerId, direction: MoveDirection) -> bool {
        if !self.layers.move_layer(id, direction) {
            return false;
        }
        self.save_history("Reorder layer");
        true
    }

    fn finish_deletions(&mut self) {
        for id in self.layers.prune_deleted() {
            self.reverse.detach(&id);
        }
    }

    // ------------------------------------------------------------------
    // Scene-side edits
    // ------------------------------------------------------------------

    /// Apply an interactive edit directly to a scene object, as a drag or
    /// resize would, and mirror it into the layer model.
    pub fn user_modify<F>(&mut self, id: &LayerId, edit: F) -> bool
    where
        F: FnOnce(&mut SceneObject),
    {
        let modified = self.scene.borrow_mut().mutate(id, edit);
        if !modified {
            return false;
        }
        self.flush_user_edits();
        self.save_history("Modify object");
        true
    }

    /// Write queued user edits into the layer model. Returns how many
    /// layers changed.
    pub fn flush_user_edits(&mut self) -> usize {
        let mut applied = 0;
        for object in self.reverse.drain() {
            let Some(previous) = self.layers.get(&object.id).cloned() else {
                continue;
            };
            let captured = capture_layer(&object, Some(&previous));
            if captured != previous && self.layers.update_layer(&object.id, |layer| *layer = captured) {
                applied += 1;
            }
        }
        if applied > 0 {
            debug!(applied, "user edits mirrored into layers");
        }
        applied
    }

    /// Run an auto-layout pattern and mirror the new geometry into the layers.
    pub fn apply_layout(&mut self, pattern_id: &str) -> LayoutOutcome {
        let outcome = {
            let _token = self.guard.hold();
            let mut scene = self.scene.borrow_mut();
            apply_auto_layout(&mut scene, pattern_id)
        };
        if let LayoutOutcome::Applied { pattern, .. } = &outcome {
            self.refresh_layers_from_scene();
            self.save_history(&format!("Layout: {pattern}"));
        }
        outcome
    }

    fn refresh_layers_from_scene(&mut self) {
        let refreshed: Vec<Layer> = {
            let scene = self.scene.borrow();
            let layers: Vec<Layer> = self
                .layers
                .layers()
                .iter()
                .map(|layer| match scene.get(&layer.id) {
                    Some(object) => capture_layer(object, Some(layer)),
                    None => layer.clone(),
                })
                .collect();
            layers
        };
        if refreshed.as_slice() != self.layers.layers() {
            self.layers.set_layers(refreshed);
        }
    }

    /// Rebuild the layer list from the scene's objects, in paint order.
    fn rebuild_layers_from_scene(&mut self, carry_previous: bool) {
        let rebuilt: Vec<Layer> = {
            let scene = self.scene.borrow();
            let layers: Vec<Layer> = scene
                .objects()
                .map(|object| {
                    let previous = if carry_previous {
                        self.layers.get(&object.id)
                    } else {
                        None
                    };
                    capture_layer(object, previous)
                })
                .collect();
            layers
        };

        self.reverse.detach_all();
        for layer in &rebuilt {
            self.reverse.attach(layer.id.clone());
        }
        self.layers.set_layers(rebuilt);
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Record the current scene. Returns false when it equals the last entry.
    pub fn save_history(&mut self, label: &str) -> bool {
        let snapshot = self.scene.borrow().to_snapshot();
        self.history.save_labeled(snapshot, label)
    }

    /// Step back one entry. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let target = match self.history.undo() {
            None => {
                debug!("nothing to undo");
                return Ok(false);
            }
            Some(Restore::To(snapshot)) => Some(snapshot.clone()),
            Some(Restore::Blank) => None,
        };
        self.restore_scene(target.as_ref())?;
        info!(remaining = self.history.past_len(), "undo");
        Ok(true)
    }

    /// Re-apply the last undone entry. Returns false when there is none.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(snapshot) = self.history.redo().cloned() else {
            debug!("nothing to redo");
            return Ok(false);
        };
        self.restore_scene(Some(&snapshot))?;
        info!(remaining = self.history.future_len(), "redo");
        Ok(true)
    }

    /// Restore the scene from a snapshot (`None` for an empty scene on the
    /// starting canvas) and rebuild the layers from it.
    fn restore_scene(&mut self, snapshot: Option<&Snapshot>) -> Result<()> {
        {
            let _token = self.guard.hold();
            let mut scene = self.scene.borrow_mut();
            match snapshot {
                Some(snapshot) => scene.restore(snapshot)?,
                None => {
                    scene.clear();
                    scene.apply_settings(&self.base_canvas);
                }
            }
            self.canvas.width = scene.width();
            self.canvas.height = scene.height();
            self.canvas.background = scene.background().clone();
        }
        self.rebuild_layers_from_scene(true);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Templates and canvas
    // ------------------------------------------------------------------

    /// Replace the scene with a template.
    pub fn load_template(&mut self, template: &Template) -> Result<()> {
        let mut canvas = self.canvas.clone();
        canvas.apply_format(&template.format)?;
        canvas.background = template.background.clone().unwrap_or_default();

        {
            let _token = self.guard.hold();
            let mut scene = self.scene.borrow_mut();
            scene.clear();
            scene.apply_settings(&canvas);
            for object in &template.objects {
                scene.add(object.clone());
            }
        }
        self.canvas = canvas;
        self.rebuild_layers_from_scene(false);

        info!(template = %template.id, objects = template.objects.len(), "template loaded");
        self.save_history(&format!("Template: {}", template.name));
        Ok(())
    }

    /// Merge canvas settings and apply them to the scene.
    pub fn update_canvas(&mut self, patch: CanvasPatch) {
        self.canvas.apply(patch);
        self.apply_canvas("Canvas settings");
    }

    /// Switch to a `WIDTHxHEIGHT` format.
    pub fn set_format(&mut self, format: &str) -> Result<()> {
        self.canvas.apply_format(format)?;
        self.apply_canvas("Canvas format");
        Ok(())
    }

    /// Use a gradient built from an extracted palette as the background.
    pub fn apply_palette_background(&mut self, palette: &[[u8; 3]]) {
        self.canvas.background = Background::Gradient(Gradient::from_palette(palette));
        self.apply_canvas("Palette background");
    }

    fn apply_canvas(&mut self, label: &str) {
        self.scene.borrow_mut().apply_settings(&self.canvas);
        info!(format = %self.canvas.format(), "canvas updated");
        self.save_history(label);
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Export `surface` (the rendered scene) within the configured budget.
    pub fn export(
        &self,
        surface: &dyn RasterSurface,
        request: &ExportRequest,
        sink: &mut dyn DownloadSink,
    ) -> Result<Option<ExportReport>> {
        export_scene(surface, request, &self.config.export, sink)
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    pub fn to_document(&self) -> Document {
        Document {
            version: DOCUMENT_VERSION.to_string(),
            saved_at: Utc::now(),
            canvas: self.canvas.clone(),
            base_canvas: Some(self.base_canvas.clone()),
            next_layer_id: self.layers.next_id(),
            layers: self.layers.layers().to_vec(),
            scene: self.scene.borrow().to_snapshot(),
            history: self.history.clone(),
        }
    }

    /// Rebuild an editor from a saved document.
    pub fn from_document(config: EditorConfig, document: Document) -> Result<Self> {
        let layers = LayerModel::with_next_id(document.next_layer_id);
        let base_canvas = document
            .base_canvas
            .unwrap_or_else(|| config.canvas.clone());
        let mut editor = Self::assemble(config, document.canvas, layers);
        editor.base_canvas = base_canvas;

        {
            let _token = editor.guard.hold();
            editor.scene.borrow_mut().restore(&document.scene)?;
        }
        for layer in &document.layers {
            if editor.scene.borrow().contains(&layer.id) {
                editor.reverse.attach(layer.id.clone());
            }
        }
        editor.layers.set_layers(document.layers);

        let mut history = document.history;
        history.set_max_depth(editor.config.history.max_depth);
        editor.history = history;

        debug!(layers = editor.layers.len(), "editor restored from document");
        Ok(editor)
    }
}
