use std::io::Cursor;
use std::time::{Duration, UNIX_EPOCH};

use super::*;
use crate::assets::source::MemoryAssetSource;
use crate::document::layer::{LayerStyle, Position};
use crate::export::adapter::UploadFile;
use crate::foundation::color::Rgb8;
use crate::foundation::error::StudioError;

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
    cursor.into_inner()
}

fn editor() -> Editor {
    let src = MemoryAssetSource::new()
        .with_file("tee.png", png(8, 10, [255, 255, 255, 255]))
        .unwrap()
        .with_file("wide.png", png(40, 10, [255, 0, 0, 255]))
        .unwrap();
    Editor::with_opts(
        GarmentTemplate::new("tee", "T-Shirt", AssetRef::new("tee.png")),
        Size::new(40.0, 50.0),
        Box::new(src),
        EditorOpts::default().with_history_capacity(50),
    )
}

fn hello(size: f64) -> TextStyle {
    let mut s = TextStyle::with_content("HELLO");
    s.font_size_px = size;
    s
}

#[test]
fn drag_gesture_commits_once_and_undoes_exactly() {
    let mut ed = editor();
    ed.set_container_size(Size::new(400.0, 500.0));
    let id = ed.add_text(hello(20.0));
    ed.update_layer(id, &LayerPatch::position(Position::new(50.0, 50.0)));
    let snapshots = ed.history().len();

    ed.pointer_down(PointerEvent::at(200.0, 250.0));
    for step in 1..=8 {
        let t = f64::from(step) / 8.0;
        ed.pointer_move(PointerEvent::at(200.0 - 160.0 * t, 250.0 - 200.0 * t));
    }
    assert_eq!(ed.history().len(), snapshots);
    assert_eq!(ed.pointer_up(), GestureOutcome::Commit);
    assert_eq!(ed.history().len(), snapshots + 1);

    let pos = ed.document().layer(id).unwrap().position;
    assert!((pos.x - 10.0).abs() < 1e-9 && (pos.y - 10.0).abs() < 1e-9);

    assert!(ed.undo());
    assert_eq!(
        ed.document().layer(id).unwrap().position,
        Position::new(50.0, 50.0)
    );
    assert!(ed.redo());
    assert!((ed.document().layer(id).unwrap().position.x - 10.0).abs() < 1e-9);
}

#[test]
fn fresh_edit_after_undo_discards_redo() {
    let mut ed = editor();
    let a = ed.add_text(hello(20.0));
    ed.add_text(hello(30.0));
    assert!(ed.undo());
    assert!(ed.can_redo());
    ed.update_layer(a, &LayerPatch::visible(false));
    assert!(!ed.can_redo());
    assert!(!ed.redo());
}

#[test]
fn preview_edits_commit_once_on_release() {
    let mut ed = editor();
    let id = ed.add_text(hello(20.0));
    let before = ed.history().len();
    for px in [22.0, 26.0, 31.0, 40.0] {
        assert!(ed.preview_layer(id, &LayerPatch::font_size(px)));
    }
    assert_eq!(ed.history().len(), before);
    assert!(ed.commit());
    assert_eq!(ed.history().len(), before + 1);
    assert!(!ed.commit());

    ed.undo();
    let LayerStyle::Text(s) = &ed.document().layer(id).unwrap().style else {
        panic!("text layer expected");
    };
    assert_eq!(s.font_size_px, 20.0);
}

#[test]
fn selection_alone_is_not_a_history_entry() {
    let mut ed = editor();
    let id = ed.add_text(hello(20.0));
    let before = ed.history().len();
    ed.select(None);
    ed.select(Some(id));
    assert!(!ed.commit());
    assert_eq!(ed.history().len(), before);
}

#[test]
fn image_layers_learn_aspect_for_hit_testing() {
    let mut ed = editor();
    ed.set_container_size(Size::new(400.0, 500.0));
    let id = ed.add_logo(AssetRef::new("wide.png"));
    ed.update_layer(id, &LayerPatch::position(Position::new(50.0, 50.0)));
    ed.select(None);

    // 100 x 25 box centred on (200, 250)
    ed.pointer_down(PointerEvent::at(200.0, 270.0));
    assert_eq!(ed.document().selected(), None);
    ed.pointer_up();
    ed.pointer_down(PointerEvent::at(240.0, 255.0));
    assert_eq!(ed.document().selected(), Some(id));
}

#[test]
fn upload_validation_rejects_before_adding() {
    let mut ed = editor();
    let gif = png(2, 2, [0, 0, 0, 255]);
    assert!(matches!(
        ed.upload_logo(&gif, "image/gif"),
        Err(StudioError::Validation(_))
    ));
    assert!(ed.document().layers().is_empty());

    let mut small = Editor::with_opts(
        GarmentTemplate::new("tee", "T", AssetRef::new("tee.png")),
        Size::new(40.0, 50.0),
        Box::new(MemoryAssetSource::new()),
        EditorOpts::default().with_max_upload_bytes(16),
    );
    assert!(small.upload_logo(&gif, "image/png").is_err());
    assert!(small.document().layers().is_empty());

    let id = ed.upload_logo(&gif, "image/png").unwrap();
    let layer = ed.document().layer(id).unwrap();
    assert!(layer.style.image().unwrap().content.is_data_uri());
    assert_eq!(ed.document().selected(), Some(id));
}

#[test]
fn reset_and_template_switch_start_over() {
    let mut ed = editor();
    ed.add_text(hello(20.0));
    ed.set_customization(&CustomizationPatch::tint(Rgb8::BLACK));
    ed.reset();
    assert!(ed.document().layers().is_empty());
    assert_eq!(ed.document().customization.tint, Rgb8::WHITE);
    assert!(!ed.can_undo());

    ed.add_text(hello(20.0));
    ed.switch_template(GarmentTemplate::new("hoodie", "Hoodie", AssetRef::new("tee.png")));
    assert_eq!(ed.document().template.id, "hoodie");
    assert!(ed.document().layers().is_empty());
    assert!(!ed.can_undo());
}

#[test]
fn layer_ids_keep_counting_across_template_switches() {
    let mut ed = editor();
    let before = ed.add_text(hello(20.0));
    ed.switch_template(GarmentTemplate::new("pants", "Pants", AssetRef::new("tee.png")));
    let after = ed.add_text(hello(20.0));
    assert_ne!(before, after);
    assert!(after.0 > before.0);

    ed.reset();
    let after_reset = ed.add_text(hello(20.0));
    assert!(after_reset.0 > after.0);
}

#[test]
fn export_ignores_zoom() {
    let mut ed = editor();
    ed.zoom_in();
    ed.zoom_in();
    let raster = ed.export().unwrap();
    assert_eq!((raster.width, raster.height), (160, 200));
}

struct Flaky {
    fail: bool,
    seen: Vec<UploadFile>,
}

impl CustomClothingStore for Flaky {
    fn create(&mut self, _name: &str, file: &UploadFile) -> anyhow::Result<ResourceId> {
        if self.fail {
            anyhow::bail!("network down");
        }
        self.seen.push(file.clone());
        Ok(ResourceId("cc-1".into()))
    }
}

#[test]
fn failed_save_keeps_session_for_retry() {
    let mut ed = editor();
    ed.add_logo(AssetRef::new("wide.png"));
    let doc_before = ed.document().clone();
    let hist_before = ed.history().len();
    let now = UNIX_EPOCH + Duration::from_millis(5);

    let mut store = Flaky {
        fail: true,
        seen: Vec::new(),
    };
    assert!(matches!(
        ed.save(&mut store, "mine", now),
        Err(StudioError::Upload(_))
    ));
    assert_eq!(ed.document(), &doc_before);
    assert_eq!(ed.history().len(), hist_before);

    store.fail = false;
    assert_eq!(
        ed.save(&mut store, "mine", now).unwrap(),
        ResourceId("cc-1".into())
    );
    assert_eq!(store.seen[0].filename, "custom-5.png");
}
