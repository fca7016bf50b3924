use super::*;

#[test]
fn straight_to_premul_scales_channels_by_alpha() {
    let c = Rgba8Premul::from_straight_rgba(200, 100, 50, 128);
    assert_eq!(c.to_array(), [100, 50, 25, 128]);
}

#[test]
fn opaque_colors_are_unchanged() {
    let c = Rgba8Premul::from_straight_rgba(12, 34, 56, 255);
    assert_eq!(c.to_array(), [12, 34, 56, 255]);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}
