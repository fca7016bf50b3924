use super::*;
use crate::assets::source::AssetRef;
use crate::document::layer::TextStyle;
use crate::document::model::GarmentTemplate;
use crate::foundation::core::Size;
use crate::interaction::hit::EstimatedExtents;

struct Fixture {
    doc: Document,
    ext: EstimatedExtents,
    vp: Viewport,
    ctl: Controller,
}

fn fixture() -> Fixture {
    Fixture {
        doc: Document::new(GarmentTemplate::new("tee", "T", AssetRef::new("tee.png"))),
        ext: EstimatedExtents::new(),
        vp: Viewport::new(Size::new(400.0, 500.0)),
        ctl: Controller::new(),
    }
}

fn centred_text(f: &mut Fixture, size: f64) -> LayerId {
    let mut style = TextStyle::with_content("HELLO");
    style.font_size_px = size;
    let id = f.doc.add_text(style);
    f.doc
        .update_layer(id, &LayerPatch::position(Position::new(50.0, 50.0)));
    id
}

#[test]
fn drag_moves_by_pointer_delta_and_commits_once() {
    let mut f = fixture();
    let id = centred_text(&mut f, 20.0);

    f.ctl
        .pointer_down(&mut f.doc, &f.ext, &f.vp, PointerEvent::at(205.0, 252.0));
    assert!(matches!(f.ctl.state(), GestureState::Dragging { .. }));
    assert!(f.ctl.wants_global_pointer_events());

    let out = f
        .ctl
        .pointer_move(&mut f.doc, &mut f.vp, PointerEvent::at(45.0, 52.0));
    assert_eq!(out, GestureOutcome::Updated);
    let pos = f.doc.layer(id).unwrap().position;
    assert!((pos.x - 10.0).abs() < 1e-9);
    assert!((pos.y - 10.0).abs() < 1e-9);

    assert_eq!(f.ctl.pointer_up(), GestureOutcome::Commit);
    assert!(!f.ctl.wants_global_pointer_events());
}

#[test]
fn drag_clamps_to_container() {
    let mut f = fixture();
    let id = centred_text(&mut f, 20.0);
    f.ctl
        .pointer_down(&mut f.doc, &f.ext, &f.vp, PointerEvent::at(200.0, 250.0));
    for (x, y) in [(-5000.0, -5000.0), (9000.0, 9000.0), (-1.0, 1e9)] {
        f.ctl
            .pointer_move(&mut f.doc, &mut f.vp, PointerEvent::at(x, y));
        let pos = f.doc.layer(id).unwrap().position;
        assert!((0.0..=100.0).contains(&pos.x));
        assert!((0.0..=100.0).contains(&pos.y));
    }
}

#[test]
fn click_without_move_does_not_commit() {
    let mut f = fixture();
    centred_text(&mut f, 20.0);
    f.ctl
        .pointer_down(&mut f.doc, &f.ext, &f.vp, PointerEvent::at(200.0, 250.0));
    assert_eq!(f.ctl.pointer_up(), GestureOutcome::Ignored);
}

#[test]
fn empty_canvas_click_clears_selection() {
    let mut f = fixture();
    centred_text(&mut f, 20.0);
    assert!(f.doc.selected().is_some());
    let out = f
        .ctl
        .pointer_down(&mut f.doc, &f.ext, &f.vp, PointerEvent::at(3.0, 3.0));
    assert_eq!(out, GestureOutcome::Updated);
    assert_eq!(f.doc.selected(), None);
    assert!(f.ctl.is_idle());
}

#[test]
fn moves_after_release_are_ignored() {
    let mut f = fixture();
    let id = centred_text(&mut f, 20.0);
    f.ctl
        .pointer_down(&mut f.doc, &f.ext, &f.vp, PointerEvent::at(200.0, 250.0));
    f.ctl
        .pointer_move(&mut f.doc, &mut f.vp, PointerEvent::at(100.0, 100.0));
    f.ctl.pointer_up();

    let before = f.doc.clone();
    let out = f
        .ctl
        .pointer_move(&mut f.doc, &mut f.vp, PointerEvent::at(300.0, 300.0));
    assert_eq!(out, GestureOutcome::Ignored);
    assert_eq!(f.doc, before);
    assert!(f.doc.layer(id).is_some());
}

#[test]
fn se_resize_grows_text_with_damping() {
    let mut f = fixture();
    let id = centred_text(&mut f, 20.0);
    // "HELLO" at 20px: 60 x 24, SE corner at (230, 262)
    f.ctl
        .pointer_down(&mut f.doc, &f.ext, &f.vp, PointerEvent::at(230.0, 262.0));
    assert!(matches!(
        f.ctl.state(),
        GestureState::Resizing {
            corner: Corner::Se,
            ..
        }
    ));
    f.ctl
        .pointer_move(&mut f.doc, &mut f.vp, PointerEvent::at(250.0, 282.0));
    let LayerStyle::Text(s) = &f.doc.layer(id).unwrap().style else {
        panic!("text layer expected");
    };
    assert!((s.font_size_px - 32.0).abs() < 1e-9);
    assert_eq!(f.ctl.pointer_up(), GestureOutcome::Commit);
}

#[test]
fn nw_resize_is_zoom_corrected_and_floored() {
    let mut f = fixture();
    let id = f.doc.add_logo(AssetRef::new("logo.png"));
    f.doc
        .update_layer(id, &LayerPatch::position(Position::new(50.0, 50.0)));
    f.vp.set_zoom_percent(200);

    // 100px logo doubled: NW corner at (300, 400)
    f.ctl
        .pointer_down(&mut f.doc, &f.ext, &f.vp, PointerEvent::at(300.0, 400.0));
    f.ctl
        .pointer_move(&mut f.doc, &mut f.vp, PointerEvent::at(260.0, 360.0));
    let size = f.doc.layer(id).unwrap().style.image().unwrap().size_px;
    assert!((size - 120.0).abs() < 1e-9);

    f.ctl
        .pointer_move(&mut f.doc, &mut f.vp, PointerEvent::at(900.0, 900.0));
    let size = f.doc.layer(id).unwrap().style.image().unwrap().size_px;
    assert_eq!(size, MIN_IMAGE_SIZE_PX);
}

#[test]
fn text_resize_never_goes_below_floor() {
    let mut f = fixture();
    let id = centred_text(&mut f, 20.0);
    f.ctl
        .pointer_down(&mut f.doc, &f.ext, &f.vp, PointerEvent::at(230.0, 262.0));
    f.ctl
        .pointer_move(&mut f.doc, &mut f.vp, PointerEvent::at(-500.0, -500.0));
    let LayerStyle::Text(s) = &f.doc.layer(id).unwrap().style else {
        panic!("text layer expected");
    };
    assert_eq!(s.font_size_px, MIN_FONT_SIZE_PX);
}

#[test]
fn delete_key_respects_text_focus() {
    let mut f = fixture();
    let id = centred_text(&mut f, 20.0);

    assert_eq!(
        f.ctl.key_down(&mut f.doc, Key::from_name("Backspace"), true),
        GestureOutcome::Ignored
    );
    assert!(f.doc.layer(id).is_some());

    assert_eq!(
        f.ctl.key_down(&mut f.doc, Key::from_name("Delete"), false),
        GestureOutcome::Commit
    );
    assert!(f.doc.layer(id).is_none());
    assert_eq!(f.doc.selected(), None);

    assert_eq!(
        f.ctl.key_down(&mut f.doc, Key::Delete, false),
        GestureOutcome::Ignored
    );
}

#[test]
fn escape_clears_selection() {
    let mut f = fixture();
    centred_text(&mut f, 20.0);
    assert_eq!(
        f.ctl.key_down(&mut f.doc, Key::Escape, false),
        GestureOutcome::Updated
    );
    assert_eq!(f.doc.selected(), None);
    assert_eq!(
        f.ctl.key_down(&mut f.doc, Key::Escape, false),
        GestureOutcome::Ignored
    );
}

#[test]
fn shift_drag_pans_without_touching_document() {
    let mut f = fixture();
    centred_text(&mut f, 20.0);
    let before = f.doc.clone();

    f.ctl.pointer_down(
        &mut f.doc,
        &f.ext,
        &f.vp,
        PointerEvent::at(200.0, 250.0).with_shift(true),
    );
    f.ctl
        .pointer_move(&mut f.doc, &mut f.vp, PointerEvent::at(230.0, 240.0));
    assert_eq!(f.vp.pan(), Vec2::new(30.0, -10.0));
    assert_eq!(f.ctl.pointer_up(), GestureOutcome::Ignored);
    assert_eq!(f.doc, before);
}
