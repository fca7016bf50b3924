use std::time::SystemTime;

use crate::assets::source::{AssetRef, AssetSource, MAX_LOGO_UPLOAD_BYTES, validate_logo_upload};
use crate::document::layer::{LayerId, LayerPatch, TextStyle};
use crate::document::model::{CustomizationPatch, Document, GarmentTemplate, LayerDirection};
use crate::export::adapter::{
    CustomClothingStore, ExportOpts, FileSaver, ResourceId, download_filename, download_local,
    export_image, prepare_for_upload, save_design,
};
use crate::foundation::core::Size;
use crate::foundation::error::StudioResult;
use crate::history::{DEFAULT_HISTORY_CAPACITY, History};
use crate::interaction::controller::{Controller, GestureOutcome, Key, PointerEvent};
use crate::interaction::hit::EstimatedExtents;
use crate::interaction::viewport::Viewport;
use crate::render::pipeline::render;
use crate::render::raster::Raster;

/// Environment variable overriding [`EditorOpts`]' history capacity.
pub const HISTORY_CAPACITY_ENV: &str = "GARMENT_STUDIO_HISTORY_CAPACITY";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditorOpts {
    pub(crate) history_capacity: usize,
    pub(crate) export: ExportOpts,
    pub(crate) max_upload_bytes: usize,
}

impl Default for EditorOpts {
    fn default() -> Self {
        let history_capacity = std::env::var(HISTORY_CAPACITY_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_HISTORY_CAPACITY);
        Self {
            history_capacity,
            export: ExportOpts::default(),
            max_upload_bytes: MAX_LOGO_UPLOAD_BYTES,
        }
    }
}

impl EditorOpts {
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    pub fn with_export(mut self, export: ExportOpts) -> Self {
        self.export = export;
        self
    }

    pub fn with_max_upload_bytes(mut self, max: usize) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    pub fn export(&self) -> ExportOpts {
        self.export
    }
}

/// One customization session.
///
/// Owns the working [`Document`], its [`History`], the gesture [`Controller`] and the
/// [`Viewport`]. Discrete edits commit a snapshot immediately; pointer gestures and
/// [`Editor::preview_layer`] edits commit once, when they finish.
pub struct Editor {
    doc: Document,
    history: History,
    controller: Controller,
    viewport: Viewport,
    extents: EstimatedExtents,
    opts: EditorOpts,
    source: Box<dyn AssetSource>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("doc", &self.doc)
            .field("history_len", &self.history.len())
            .field("controller", &self.controller)
            .field("viewport", &self.viewport)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(template: GarmentTemplate, container: Size, source: Box<dyn AssetSource>) -> Self {
        Self::with_opts(template, container, source, EditorOpts::default())
    }

    pub fn with_opts(
        template: GarmentTemplate,
        container: Size,
        source: Box<dyn AssetSource>,
        opts: EditorOpts,
    ) -> Self {
        let doc = Document::new(template);
        Self {
            history: History::with_capacity(doc.clone(), opts.history_capacity),
            doc,
            controller: Controller::new(),
            viewport: Viewport::new(container),
            extents: EstimatedExtents::new(),
            opts,
            source,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn opts(&self) -> &EditorOpts {
        &self.opts
    }

    /// Start over on `template` with default customization and a fresh history.
    pub fn switch_template(&mut self, template: GarmentTemplate) {
        tracing::debug!(template = %template.id, "switch template");
        self.doc = self.doc.fresh_on(template);
        self.history.reset(self.doc.clone());
        self.controller.cancel();
    }

    /// Push the current document as a history snapshot if its content differs from the last one.
    pub fn commit(&mut self) -> bool {
        if self.history.current().content_eq(&self.doc) {
            return false;
        }
        self.history.commit(self.doc.clone());
        true
    }

    fn commit_if(&mut self, changed: bool) -> bool {
        if changed {
            self.commit();
        }
        changed
    }

    // --- layers ---

    pub fn add_text(&mut self, style: TextStyle) -> LayerId {
        let id = self.doc.add_text(style);
        self.commit();
        id
    }

    pub fn add_logo(&mut self, content: AssetRef) -> LayerId {
        self.learn_aspect(&content);
        let id = self.doc.add_logo(content);
        self.commit();
        id
    }

    pub fn add_sticker(&mut self, content: AssetRef) -> LayerId {
        self.learn_aspect(&content);
        let id = self.doc.add_sticker(content);
        self.commit();
        id
    }

    /// Validate an uploaded logo and add it as a new layer.
    ///
    /// Rejected uploads leave the document untouched.
    pub fn upload_logo(&mut self, bytes: &[u8], mime: &str) -> StudioResult<LayerId> {
        let asset = validate_logo_upload(bytes, mime, self.opts.max_upload_bytes)?;
        Ok(self.add_logo(asset))
    }

    fn learn_aspect(&mut self, asset: &AssetRef) {
        match self.source.load_image(asset) {
            Ok(prepared) => self.extents.set_aspect(asset.clone(), prepared.aspect_ratio()),
            Err(e) => tracing::debug!(asset = %asset, error = %e, "aspect ratio unknown"),
        }
    }

    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        let changed = self.doc.update_layer(id, patch);
        self.commit_if(changed)
    }

    /// Apply `patch` without a history entry; follow with [`Editor::commit`] on release.
    pub fn preview_layer(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        self.doc.update_layer(id, patch)
    }

    pub fn delete_layer(&mut self, id: LayerId) -> bool {
        let changed = self.doc.delete_layer(id);
        self.commit_if(changed)
    }

    pub fn move_layer(&mut self, id: LayerId, direction: LayerDirection) -> bool {
        let changed = self.doc.move_layer(id, direction);
        self.commit_if(changed)
    }

    pub fn set_customization(&mut self, patch: &CustomizationPatch) -> bool {
        let changed = self.doc.set_customization(patch);
        self.commit_if(changed)
    }

    pub fn select(&mut self, id: Option<LayerId>) -> bool {
        self.doc.select_layer(id)
    }

    // --- pointer and keyboard ---

    pub fn pointer_down(&mut self, ev: PointerEvent) -> GestureOutcome {
        self.controller
            .pointer_down(&mut self.doc, &self.extents, &self.viewport, ev)
    }

    pub fn pointer_move(&mut self, ev: PointerEvent) -> GestureOutcome {
        self.controller
            .pointer_move(&mut self.doc, &mut self.viewport, ev)
    }

    pub fn pointer_up(&mut self) -> GestureOutcome {
        let out = self.controller.pointer_up();
        if out == GestureOutcome::Commit {
            self.commit();
        }
        out
    }

    pub fn key_down(&mut self, key: Key, text_input_focused: bool) -> GestureOutcome {
        let out = self
            .controller
            .key_down(&mut self.doc, key, text_input_focused);
        if out == GestureOutcome::Commit {
            self.commit();
        }
        out
    }

    pub fn wants_global_pointer_events(&self) -> bool {
        self.controller.wants_global_pointer_events()
    }

    pub fn set_pan_mode(&mut self, on: bool) {
        self.controller.set_pan_mode(on);
    }

    // --- history ---

    pub fn undo(&mut self) -> bool {
        self.controller.cancel();
        match self.history.undo() {
            Some(snapshot) => {
                self.doc.restore_from(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.controller.cancel();
        match self.history.redo() {
            Some(snapshot) => {
                self.doc.restore_from(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Default customization, no layers, and a single-snapshot history.
    pub fn reset(&mut self) {
        self.controller.cancel();
        self.doc.reset();
        self.history.reset(self.doc.clone());
    }

    // --- viewport ---

    pub fn set_container_size(&mut self, size: Size) {
        self.viewport.set_container_size(size);
    }

    pub fn zoom_in(&mut self) -> u32 {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> u32 {
        self.viewport.zoom_out()
    }

    pub fn set_zoom_percent(&mut self, percent: u32) {
        self.viewport.set_zoom_percent(percent);
    }

    // --- output ---

    pub fn render(&self, width: u32, height: u32, resolution_scale: f64) -> StudioResult<Raster> {
        render(&self.doc, width, height, resolution_scale, self.source.as_ref())
    }

    pub fn export(&self) -> StudioResult<Raster> {
        export_image(
            &self.doc,
            self.viewport.container_size(),
            &self.opts.export,
            self.source.as_ref(),
        )
    }

    /// Export and hand the PNG to `saver`. Returns the generated filename.
    pub fn download(&self, saver: &mut dyn FileSaver, now: SystemTime) -> StudioResult<String> {
        let raster = self.export()?;
        let filename = download_filename(now);
        download_local(&raster, &filename, saver)?;
        Ok(filename)
    }

    /// Export and pass the upload payload to `store` under `name`.
    ///
    /// Failures leave the document and history as they were so the call can be retried.
    pub fn save(
        &self,
        store: &mut dyn CustomClothingStore,
        name: &str,
        now: SystemTime,
    ) -> StudioResult<ResourceId> {
        let raster = self.export()?;
        let file = prepare_for_upload(&raster, &download_filename(now))?;
        save_design(store, name, &file)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
