use super::*;
use serde_json::json;

fn text_layer() -> Layer {
    Layer {
        id: LayerId(1),
        position: Position::new(50.0, 50.0),
        visible: true,
        style: LayerStyle::Text(TextStyle::with_content("HELLO")),
    }
}

fn logo_layer() -> Layer {
    Layer {
        id: LayerId(2),
        position: Position::new(50.0, 70.0),
        visible: true,
        style: LayerStyle::Logo(ImageStyle::new(AssetRef::new("logo.png"))),
    }
}

#[test]
fn position_clamps_each_axis() {
    assert_eq!(Position::new(-5.0, 140.0), Position { x: 0.0, y: 100.0 });
    assert_eq!(Position::new(f64::NAN, 12.5), Position { x: 0.0, y: 12.5 });
}

#[test]
fn text_patch_enforces_font_floor_and_rotation_range() {
    let mut l = text_layer();
    assert!(l.apply(&LayerPatch::font_size(2.0)));
    let LayerStyle::Text(s) = &l.style else {
        panic!("expected text");
    };
    assert_eq!(s.font_size_px, MIN_FONT_SIZE_PX);

    l.apply(&LayerPatch::text(TextStylePatch {
        rotation_deg: Some(135.0),
        ..TextStylePatch::default()
    }));
    assert_eq!(l.style.rotation_deg(), 90.0);
}

#[test]
fn image_patch_enforces_size_floor() {
    let mut l = logo_layer();
    l.apply(&LayerPatch::image_size(-40.0));
    assert_eq!(l.style.image().unwrap().size_px, MIN_IMAGE_SIZE_PX);

    l.apply(&LayerPatch::image(ImageStylePatch {
        rotation_deg: Some(Some(30.0)),
        ..ImageStylePatch::default()
    }));
    assert_eq!(l.style.rotation_deg(), 30.0);
    l.apply(&LayerPatch::image(ImageStylePatch {
        rotation_deg: Some(None),
        ..ImageStylePatch::default()
    }));
    assert_eq!(l.style.image().unwrap().rotation_deg, None);
}

#[test]
fn mismatched_style_patch_is_ignored() {
    let mut l = logo_layer();
    let before = l.clone();
    assert!(!l.apply(&LayerPatch::font_size(40.0)));
    assert_eq!(l, before);
}

#[test]
fn unchanged_patch_reports_no_change() {
    let mut l = text_layer();
    assert!(!l.apply(&LayerPatch::position(Position::new(50.0, 50.0))));
    assert!(l.apply(&LayerPatch::visible(false)));
    assert!(!l.visible);
}

#[test]
fn layer_json_is_tagged_by_type() {
    let v = serde_json::to_value(logo_layer()).unwrap();
    assert_eq!(v["style"]["type"], json!("logo"));
    assert_eq!(v["style"]["content"], json!("logo.png"));

    let l: Layer = serde_json::from_value(json!({
        "id": 7,
        "position": {"x": 10.0, "y": 20.0},
        "style": {"type": "text", "content": "HI", "font_size_px": 20.0}
    }))
    .unwrap();
    assert!(l.visible);
    assert_eq!(l.kind(), LayerKind::Text);
    let LayerStyle::Text(s) = l.style else {
        panic!("expected text");
    };
    assert_eq!(s.content, "HI");
    assert_eq!(s.font_family, "Arial");
}
