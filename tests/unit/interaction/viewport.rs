use super::*;

#[test]
fn zoom_steps_and_clamps() {
    let mut v = Viewport::new(Size::new(400.0, 500.0));
    assert_eq!(v.zoom_percent(), 100);
    assert_eq!(v.zoom_in(), 125);
    for _ in 0..10 {
        v.zoom_in();
    }
    assert_eq!(v.zoom_percent(), 200);
    assert!(!v.can_zoom_in());
    for _ in 0..10 {
        v.zoom_out();
    }
    assert_eq!(v.zoom_percent(), 50);
    assert!(!v.can_zoom_out());

    v.set_zoom_percent(137);
    assert_eq!(v.zoom_percent(), 125);
    v.set_zoom_percent(0);
    assert_eq!(v.zoom_percent(), 50);
}

#[test]
fn rendered_size_follows_zoom_and_pan_shifts_points() {
    let mut v = Viewport::new(Size::new(400.0, 500.0));
    v.set_zoom_percent(150);
    assert_eq!(v.rendered_size(), Size::new(600.0, 750.0));
    assert_eq!(v.container_size(), Size::new(400.0, 500.0));

    v.set_pan(Vec2::new(10.0, -20.0));
    assert_eq!(v.to_container(Point::new(15.0, 5.0)), Point::new(5.0, 25.0));
}
