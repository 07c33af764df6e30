//! Creation tool sessions: box, dot, draw, line, erase, and text.

use kurbo::Point;
use scrawl_core::shapes::{ShapeId, ShapeModel, ShapeProps, ShapeUpdate};
use scrawl_core::{App, CoreError, EventTarget, KeyInfo, Modifiers, PointerInfo};

fn app() -> App {
    let _ = env_logger::builder().is_test(true).try_init();
    App::new()
}

fn pointer(x: f64, y: f64) -> PointerInfo {
    PointerInfo::new(Point::new(x, y), EventTarget::Canvas)
}

fn shift() -> Modifiers {
    Modifiers {
        shift: true,
        ..Modifiers::default()
    }
}

fn escape(app: &mut App) {
    app.on_key_down(KeyInfo::new("Escape"));
}

#[test]
fn test_box_tool_drag_creates_and_returns_to_select() {
    let mut app = app();
    app.set_tool("box").unwrap();

    app.on_pointer_down(pointer(10.0, 10.0));
    assert!(app.is_in("box.pointing"));
    app.on_pointer_move(pointer(20.0, 20.0));
    assert!(app.is_in("box.creating"));
    assert_eq!(app.document.shapes.len(), 1);

    // The seed is 1x1, grown from its bottom-right corner
    app.on_pointer_move(pointer(110.0, 60.0));
    let model = &app.document.shapes[0];
    assert_eq!(model.point, Point::new(10.0, 10.0));
    assert_eq!(model.props, ShapeProps::Box { size: [101.0, 51.0] });
    assert_eq!(app.selected_ids, vec![model.id.clone()]);

    app.on_pointer_up(pointer(110.0, 60.0));
    assert_eq!(app.current_tool, "select");
    assert!(app.is_in("select.idle"));

    // Creation collapses into a single undo frame
    app.undo();
    assert!(app.document.shapes.is_empty());
}

#[test]
fn test_box_tool_drag_past_origin_mirrors() {
    let mut app = app();
    app.set_tool("box").unwrap();

    app.on_pointer_down(pointer(100.0, 100.0));
    app.on_pointer_move(pointer(110.0, 110.0));
    app.on_pointer_move(pointer(40.0, 70.0));

    // The dragged corner crossed both axes of the 1x1 seed at (100, 100)
    let model = &app.document.shapes[0];
    assert_eq!(model.point, Point::new(41.0, 71.0));
    assert_eq!(model.props, ShapeProps::Box { size: [59.0, 29.0] });
    app.on_pointer_up(pointer(40.0, 70.0));
}

#[test]
fn test_box_tool_escape_discards() {
    let mut app = app();
    app.set_tool("box").unwrap();

    app.on_pointer_down(pointer(0.0, 0.0));
    app.on_pointer_move(pointer(10.0, 10.0));
    app.on_pointer_move(pointer(50.0, 50.0));
    escape(&mut app);

    assert!(app.document.shapes.is_empty());
    assert!(app.is_in("box.idle"));
    assert!(!app.history.can_undo());
}

#[test]
fn test_box_tool_locked_stays_active() {
    let mut app = app();
    app.is_tool_locked = true;
    app.set_tool("box").unwrap();

    app.on_pointer_down(pointer(0.0, 0.0));
    app.on_pointer_move(pointer(10.0, 10.0));
    app.on_pointer_up(pointer(10.0, 10.0));

    assert_eq!(app.current_tool, "box");
    assert!(app.is_in("box.idle"));
}

#[test]
fn test_dot_tool_keeps_unit_ratio() {
    let mut app = app();
    app.set_tool("dot").unwrap();

    app.on_pointer_down(pointer(0.0, 0.0));
    app.on_pointer_move(pointer(10.0, 10.0));
    app.on_pointer_move(pointer(100.0, 40.0));

    let ShapeProps::Dot { radius } = app.document.shapes[0].props else {
        panic!("expected a dot");
    };
    // Width dominates: 1 + 100 across, held square by the fixed ratio
    assert!((radius - 50.5).abs() < 1e-9);
    app.on_pointer_up(pointer(100.0, 40.0));
}

#[test]
fn test_draw_tool_simplifies_on_release() {
    let mut app = app();
    app.set_tool("draw").unwrap();

    app.on_pointer_down(pointer(0.0, 0.0));
    assert!(app.is_in("draw.creating"));
    app.on_pointer_move(pointer(25.0, 25.0));
    app.on_pointer_move(pointer(50.0, 50.0));
    app.on_pointer_up(pointer(50.0, 50.0));

    // The collinear midpoint drops out during simplification
    let ShapeProps::Draw { points, is_complete } = &app.document.shapes[0].props else {
        panic!("expected a draw stroke");
    };
    assert!(*is_complete);
    assert_eq!(points.len(), 2);
    assert_eq!(points[0], [0.0, 0.0, 0.5]);
    assert_eq!(points[1], [50.0, 50.0, 0.5]);
    assert_eq!(app.current_tool, "select");
}

#[test]
fn test_draw_tool_shift_extends_last_stroke() {
    let mut app = app();
    app.set_tool("draw").unwrap();
    app.on_pointer_down(pointer(0.0, 0.0));
    app.on_pointer_move(pointer(50.0, 0.0));
    app.on_pointer_up(pointer(50.0, 0.0));
    assert_eq!(app.document.shapes.len(), 1);

    app.set_tool("draw").unwrap();
    app.on_pointer_down(pointer(100.0, 0.0).with_modifiers(shift()));
    // The first stroke reopens with a bridge to the new origin
    assert_eq!(app.document.shapes.len(), 1);
    let ShapeProps::Draw { points, is_complete } = &app.document.shapes[0].props else {
        panic!("expected a draw stroke");
    };
    assert!(!is_complete);
    assert!(points.len() > 2);

    app.on_pointer_move(pointer(100.0, 40.0));
    app.on_pointer_up(pointer(100.0, 40.0));
    let ShapeProps::Draw { is_complete, .. } = &app.document.shapes[0].props else {
        panic!("expected a draw stroke");
    };
    assert!(*is_complete);
}

#[test]
fn test_draw_tool_escape_discards_new_stroke() {
    let mut app = app();
    app.set_tool("draw").unwrap();

    app.on_pointer_down(pointer(0.0, 0.0));
    app.on_pointer_move(pointer(30.0, 30.0));
    escape(&mut app);

    assert!(app.document.shapes.is_empty());
    assert!(app.is_in("draw.idle"));
}

#[test]
fn test_line_tool_tracks_endpoint() {
    let mut app = app();
    app.set_tool("line").unwrap();

    app.on_pointer_down(pointer(10.0, 10.0));
    app.on_pointer_move(pointer(20.0, 20.0));
    app.on_pointer_move(pointer(110.0, 60.0));

    let model = &app.document.shapes[0];
    assert_eq!(
        model.props,
        ShapeProps::Line {
            handles: vec![[0.0, 0.0], [100.0, 50.0]],
        }
    );
    app.on_pointer_up(pointer(110.0, 60.0));
    assert_eq!(app.current_tool, "select");
}

#[test]
fn test_line_tool_shift_snaps_angle() {
    let mut app = app();
    app.set_tool("line").unwrap();

    app.on_pointer_down(pointer(0.0, 0.0));
    app.on_pointer_move(pointer(10.0, 0.0));
    // 3 degrees off horizontal snaps back to 0
    app.on_pointer_move(pointer(100.0, 5.0).with_modifiers(shift()));

    let ShapeProps::Line { handles } = &app.document.shapes[0].props else {
        panic!("expected a line");
    };
    assert!(handles[1][1].abs() < 1e-9);
    app.on_pointer_up(pointer(100.0, 5.0));
}

#[test]
fn test_erase_tool_deletes_along_path() {
    let mut app = app();
    let b1 = ShapeModel::new("box", Point::ZERO, ShapeProps::Box { size: [100.0, 100.0] })
        .with_id("b1");
    let b2 = ShapeModel::new(
        "box",
        Point::new(200.0, 0.0),
        ShapeProps::Box { size: [100.0, 100.0] },
    )
    .with_id("b2");
    app.add_shapes(vec![b1, b2], None).unwrap();
    app.set_tool("erase").unwrap();

    app.on_pointer_down(pointer(50.0, 50.0));
    assert_eq!(app.erasing_ids, vec![ShapeId::from("b1")]);
    assert!(app.document.shapes[0].is_ghost);

    app.on_pointer_move(pointer(60.0, 50.0));
    assert!(app.is_in("erase.erasing"));
    app.on_pointer_move(pointer(250.0, 50.0));
    assert_eq!(app.erasing_ids.len(), 2);

    app.on_pointer_up(pointer(250.0, 50.0));
    assert!(app.document.shapes.is_empty());
    assert!(app.erasing_ids.is_empty());

    // Both deletions revert together
    app.undo();
    assert_eq!(app.document.shapes.len(), 2);
    assert!(!app.document.shapes[0].is_ghost);
}

#[test]
fn test_erase_tool_escape_clears_marks() {
    let mut app = app();
    let b1 = ShapeModel::new("box", Point::ZERO, ShapeProps::Box { size: [100.0, 100.0] })
        .with_id("b1");
    app.add_shapes(vec![b1], None).unwrap();
    app.set_tool("erase").unwrap();

    app.on_pointer_down(pointer(50.0, 50.0));
    app.on_pointer_move(pointer(80.0, 50.0));
    escape(&mut app);

    assert_eq!(app.document.shapes.len(), 1);
    assert!(!app.document.shapes[0].is_ghost);
    assert!(app.erasing_ids.is_empty());
    assert!(app.is_in("erase.idle"));
}

#[test]
fn test_erase_tool_skips_locked_shapes() {
    let mut app = app();
    let mut b1 = ShapeModel::new("box", Point::ZERO, ShapeProps::Box { size: [100.0, 100.0] })
        .with_id("b1");
    b1.is_locked = true;
    app.add_shapes(vec![b1], None).unwrap();
    app.set_tool("erase").unwrap();

    app.on_pointer_down(pointer(50.0, 50.0));
    assert!(app.erasing_ids.is_empty());
    app.on_pointer_up(pointer(50.0, 50.0));
    assert_eq!(app.document.shapes.len(), 1);
}

#[test]
fn test_text_tool_empty_shape_is_dropped() {
    let mut app = app();
    app.set_tool("text").unwrap();

    app.on_pointer_down(pointer(10.0, 10.0));
    assert!(app.is_in("text.editing"));
    assert_eq!(app.document.shapes.len(), 1);
    assert!(app.editing_id.is_some());

    escape(&mut app);
    assert!(app.document.shapes.is_empty());
    assert!(app.editing_id.is_none());
    assert_eq!(app.current_tool, "select");
}

#[test]
fn test_text_tool_keeps_filled_shape() {
    let mut app = app();
    app.set_tool("text").unwrap();

    app.on_pointer_down(pointer(10.0, 10.0));
    let id = app.document.shapes[0].id.clone();
    let mut update = ShapeUpdate::new(id.clone());
    update.props = Some(ShapeProps::Text {
        text: "hello".into(),
        size: [40.0, 24.0],
    });
    app.update_shapes(vec![update]);

    escape(&mut app);
    assert_eq!(app.document.shapes.len(), 1);
    assert_eq!(app.document.shapes[0].point, Point::new(10.0, 10.0));
    assert_eq!(app.current_tool, "select");
}

#[test]
fn test_unknown_tool_is_an_error() {
    let mut app = app();
    let err = app.set_tool("lasso").unwrap_err();
    assert!(matches!(err, CoreError::UnknownState { .. }));
    assert_eq!(app.current_tool, "select");
}
