//! Annotation session integration tests.

use herbal_clinic_canvas::{
    decode_image, CloseDecision, CloseOutcome, DrawableImage, ImageViewer, Surface,
};
use image::{Rgba, RgbaImage};
use proptest::prelude::*;

fn gradient_photo(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        Rgba([(x * 2) as u8, (y * 2) as u8, ((x + y) % 256) as u8, 255])
    })
}

fn open_viewer() -> ImageViewer {
    let mut viewer = ImageViewer::new();
    viewer.open(DrawableImage {
        url: "/media/stage_images/iris.png".into(),
        image_id: Some(42),
        stage_id: Some(5),
    });
    viewer
}

#[test]
fn test_diagonal_stroke_composite() {
    let base = gradient_photo(100);
    let mut viewer = open_viewer();
    viewer.enter_drawing(100, 100).unwrap();
    viewer.set_brush_color([255, 0, 0]);
    viewer.set_brush_width(2);

    viewer.pointer_down((0.0, 0.0));
    viewer.pointer_move((99.0, 99.0));
    viewer.pointer_up();

    assert_eq!(viewer.request_close(), CloseOutcome::ConfirmRequired);
    let export = viewer
        .resolve_close(CloseDecision::Save, &base)
        .unwrap()
        .expect("save produces an export");

    let saved = decode_image(&export.png).unwrap();
    assert_eq!(saved.dimensions(), (100, 100));

    // Ink along the diagonal
    for i in 0..99 {
        assert_eq!(*saved.get_pixel(i, i), Rgba([255, 0, 0, 255]), "pixel {i}");
    }

    // Photo untouched away from the stroke
    for (x, y) in [(10, 80), (80, 10), (0, 99), (99, 0), (50, 40), (40, 50)] {
        assert_eq!(saved.get_pixel(x, y), base.get_pixel(x, y), "pixel ({x},{y})");
    }
}

#[test]
fn test_second_drawing_entry_keeps_strokes() {
    let mut viewer = open_viewer();
    viewer.enter_drawing(50, 50).unwrap();
    viewer.pointer_down((5.0, 25.0));
    viewer.pointer_move((45.0, 25.0));
    viewer.pointer_up();

    viewer.enter_drawing(60, 60).unwrap();

    assert_eq!(viewer.layer().surface().width(), 50);
    assert_eq!(viewer.layer().surface().pixel(25, 25), Rgba([255, 0, 0, 255]));
}

#[test]
fn test_new_image_gets_fresh_layer() {
    let mut viewer = open_viewer();
    viewer.enter_drawing(50, 50).unwrap();
    viewer.pointer_down((5.0, 25.0));
    viewer.pointer_move((45.0, 25.0));
    viewer.pointer_up();
    viewer.clear_canvas();
    assert_eq!(viewer.request_close(), CloseOutcome::Closed);

    let mut viewer2 = open_viewer();
    viewer2.enter_drawing(30, 20).unwrap();
    assert_eq!(viewer2.layer().surface().width(), 30);
    assert!(viewer2.layer().surface().is_blank());
}

proptest! {
    #[test]
    fn prop_brush_changes_never_clear_ink(widths in proptest::collection::vec(1u32..=20, 1..8)) {
        let mut viewer = open_viewer();
        viewer.enter_drawing(40, 40).unwrap();
        viewer.pointer_down((2.0, 20.0));
        viewer.pointer_move((38.0, 20.0));
        viewer.pointer_up();

        for w in widths {
            viewer.set_brush_width(w);
            viewer.enter_drawing(40, 40).unwrap();
        }

        prop_assert_eq!(viewer.layer().surface().pixel(20, 20), Rgba([255, 0, 0, 255]));
        prop_assert!(viewer.has_unsaved_strokes());
    }

    #[test]
    fn prop_zoom_stays_in_range(deltas in proptest::collection::vec(-3.0f32..3.0, 0..40)) {
        let mut viewer = open_viewer();
        for d in deltas {
            viewer.wheel(d);
        }
        let scale = viewer.transform().scale;
        prop_assert!((0.5..=3.0).contains(&scale));
        prop_assert_eq!((scale * 2.0).fract(), 0.0);
    }
}
