use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
}

#[test]
fn data_uri_roundtrip_loads_raster() {
    let png = png_bytes(4, 2, [255, 0, 0, 255]);
    let r = AssetRef::from_bytes("image/png", &png);
    assert!(r.is_data_uri());
    assert!(r.as_str().starts_with("data:image/png;base64,"));

    let src = MemoryAssetSource::new();
    let asset = src.load_image(&r).unwrap();
    assert_eq!(asset.intrinsic_size(), (4.0, 2.0));
    assert_eq!(asset.aspect_ratio(), 0.5);
}

#[test]
fn percent_encoded_svg_data_uri_loads_as_vector() {
    let r = AssetRef::new(
        "data:image/svg+xml,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20width%3D%2210%22%20height%3D%2220%22%3E%3C%2Fsvg%3E",
    );
    assert!(r.is_data_uri());

    let asset = MemoryAssetSource::new().load_image(&r).unwrap();
    assert!(matches!(asset, PreparedAsset::Vector(_)));
    assert_eq!(asset.intrinsic_size(), (10.0, 20.0));
}

#[test]
fn library_paths_load_from_memory_and_report_failures() {
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="20"></svg>"#;
    let src = MemoryAssetSource::new()
        .with_file("stickers/tall.svg", svg.to_vec())
        .unwrap();
    let asset = src.load_image(&AssetRef::new("stickers/tall.svg")).unwrap();
    assert!(matches!(asset, PreparedAsset::Vector(_)));
    assert_eq!(asset.aspect_ratio(), 2.0);

    let err = src.load_image(&AssetRef::new("stickers/missing.png")).unwrap_err();
    assert_eq!(err.asset_ref(), Some("stickers/missing.png"));

    let err = src.load_image(&AssetRef::new("../etc/passwd")).unwrap_err();
    assert!(matches!(err, StudioError::AssetLoad { .. }));
}

#[test]
fn corrupt_bytes_are_asset_load_errors() {
    let src = MemoryAssetSource::new()
        .with_file("broken.png", b"not an image".to_vec())
        .unwrap();
    let err = src.load_image(&AssetRef::new("broken.png")).unwrap_err();
    assert_eq!(err.asset_ref(), Some("broken.png"));
}

#[test]
fn logo_upload_validation() {
    let png = png_bytes(1, 1, [0, 0, 0, 255]);
    let r = validate_logo_upload(&png, "image/PNG", MAX_LOGO_UPLOAD_BYTES).unwrap();
    assert!(r.as_str().starts_with("data:image/png;base64,"));

    assert!(matches!(
        validate_logo_upload(&png, "image/gif", MAX_LOGO_UPLOAD_BYTES),
        Err(StudioError::Validation(_))
    ));
    assert!(matches!(
        validate_logo_upload(&png, "image/png", png.len() - 1),
        Err(StudioError::Validation(_))
    ));
}

#[test]
fn font_book_prefers_exact_variant_then_regular() {
    let mut book = FontBook::new();
    book.register("Arial", false, false, vec![1]);
    book.register("Arial", true, false, vec![2]);

    let face = book
        .resolve(&FontQuery {
            family: "arial".to_owned(),
            bold: true,
            italic: true,
        })
        .unwrap();
    assert!(face.bold);
    assert!(!face.italic);
    assert_eq!(face.bytes.as_slice(), &[2]);

    let face = book
        .resolve(&FontQuery {
            family: "Arial".to_owned(),
            bold: false,
            italic: true,
        })
        .unwrap();
    assert_eq!(face.bytes.as_slice(), &[1]);

    let err = book
        .resolve(&FontQuery {
            family: "Comic Sans".to_owned(),
            bold: false,
            italic: false,
        })
        .unwrap_err();
    assert_eq!(err.asset_ref(), Some("font:Comic Sans"));

    let book = book.with_fallback_family("Arial");
    assert!(
        book.resolve(&FontQuery {
            family: "Comic Sans".to_owned(),
            bold: false,
            italic: false,
        })
        .is_ok()
    );
}
