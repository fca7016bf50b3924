use super::*;

#[test]
fn raster_size_rounds_up_and_rejects_bad_input() {
    assert_eq!(svg_raster_size(10.2, 3.0).unwrap(), (11, 3));
    assert!(svg_raster_size(0.0, 3.0).is_err());
    assert!(svg_raster_size(f64::NAN, 3.0).is_err());
    assert!(svg_raster_size(20_000.0, 3.0).is_err());
}

#[test]
fn rasterizes_filled_rect_at_target_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2">
        <rect width="2" height="2" fill="#ff0000"/>
    </svg>"##;
    let tree = usvg::Tree::from_data(svg, &usvg::Options::default()).unwrap();
    let px = rasterize_svg_to_premul_rgba8(&tree, 8, 8).unwrap();
    assert_eq!(px.len(), 8 * 8 * 4);
    let center = (4 * 8 + 4) * 4;
    assert_eq!(&px[center..center + 4], &[255, 0, 0, 255]);
}
