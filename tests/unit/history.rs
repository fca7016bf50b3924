use super::*;
use crate::assets::source::AssetRef;
use crate::document::layer::TextStyle;
use crate::document::model::{CustomizationPatch, GarmentTemplate};
use crate::foundation::color::Rgb8;

fn base() -> Document {
    Document::new(GarmentTemplate::new("tee", "T-Shirt", AssetRef::new("tee.png")))
}

fn tinted(r: u8) -> Document {
    let mut d = base();
    d.set_customization(&CustomizationPatch::tint(Rgb8::new(r, 0, 0)));
    d
}

#[test]
fn fresh_history_has_nothing_to_undo_or_redo() {
    let mut h = History::new(base());
    assert_eq!(h.len(), 1);
    assert!(!h.can_undo());
    assert!(!h.can_redo());
    assert!(h.undo().is_none());
    assert!(h.redo().is_none());
    assert_eq!(h.cursor(), 0);
}

#[test]
fn commit_after_undo_discards_redo_branch() {
    let mut h = History::new(base());
    h.commit(tinted(1));
    h.commit(tinted(2));
    assert_eq!(h.undo().unwrap(), &tinted(1));
    h.commit(tinted(3));
    assert!(!h.can_redo());
    assert!(h.redo().is_none());
    assert_eq!(h.current(), &tinted(3));
    assert_eq!(h.len(), 3);
}

#[test]
fn undo_redo_walk_the_stack() {
    let mut h = History::new(base());
    h.commit(tinted(1));
    h.commit(tinted(2));
    assert_eq!(h.undo().unwrap(), &tinted(1));
    assert_eq!(h.undo().unwrap(), &base());
    assert!(h.undo().is_none());
    assert_eq!(h.redo().unwrap(), &tinted(1));
    assert_eq!(h.redo().unwrap(), &tinted(2));
    assert!(h.redo().is_none());
}

#[test]
fn capacity_evicts_oldest_and_keeps_cursor_valid() {
    let mut h = History::with_capacity(base(), 3);
    for r in 1..=5 {
        h.commit(tinted(r));
    }
    assert_eq!(h.len(), 3);
    assert_eq!(h.cursor(), 2);
    assert_eq!(h.current(), &tinted(5));
    h.undo();
    h.undo();
    assert_eq!(h.current(), &tinted(3));
    assert!(!h.can_undo());
}

#[test]
fn reset_returns_to_single_snapshot() {
    let mut h = History::new(base());
    let mut d = base();
    d.add_text(TextStyle::default());
    h.commit(d);
    h.reset(base());
    assert_eq!(h.len(), 1);
    assert!(!h.can_undo());
    assert_eq!(History::with_capacity(base(), 0).capacity(), 1);
}
