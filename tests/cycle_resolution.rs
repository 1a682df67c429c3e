//! Detection and repair of mutual attachment cycles.

mod common;

use common::{Attachment, Handle};
use pretty_assertions::assert_eq;
use snapkit::geometry::{Point, Rect};
use snapkit::snapping::cycles;
use snapkit::{Axis, PlacementEngine, ResizeDirection, Side, SnapConfig, WidgetId};

const A: WidgetId = WidgetId(1);
const B: WidgetId = WidgetId(2);
const D: WidgetId = WidgetId(3);

fn engine_for(model: &Handle) -> PlacementEngine<Handle, Handle, Handle> {
    PlacementEngine::new(
        model.clone(),
        model.clone(),
        model.clone(),
        SnapConfig::default(),
    )
}

fn cyclic_model() -> Handle {
    Handle::new()
        .free_snap(false)
        .widget(A, Rect::new(100, 50, 40, 20))
        .widget(B, Rect::new(180, 50, 40, 20))
        .attached(A, Side::Left, Attachment::Parallel(B, 0))
        .attached(B, Side::Left, Attachment::Sequential(A, 40))
}

#[test]
fn test_commit_breaks_unrelated_cycle() {
    let model = cyclic_model().widget(D, Rect::new(20, 200, 40, 20));
    let mut engine = engine_for(&model);
    engine.update_widgets(&[A, B, D]);

    engine.drag_widget(
        Point::new(30, 210),
        D,
        Rect::new(20, 200, 40, 20),
        ResizeDirection::NONE,
    );
    engine.drag_widget(
        Point::new(40, 210),
        D,
        Rect::new(30, 200, 40, 20),
        ResizeDirection::NONE,
    );
    engine.commit().unwrap();

    // exactly one edge cut, pinned at the widget's current position
    let a_left = model.attachment(A, Side::Left);
    let b_left = model.attachment(B, Side::Left);
    let broken = [
        (a_left, Attachment::Absolute(100), b_left, Attachment::Sequential(A, 40)),
        (b_left, Attachment::Absolute(180), a_left, Attachment::Parallel(B, 0)),
    ];
    assert!(
        broken
            .iter()
            .any(|(cut, cut_want, kept, kept_want)| *cut == Some(*cut_want)
                && *kept == Some(*kept_want)),
        "a_left={a_left:?} b_left={b_left:?}"
    );
}

#[test]
fn test_delete_breaks_unrelated_cycle() {
    let model = cyclic_model().widget(D, Rect::new(20, 200, 40, 20));
    let mut engine = engine_for(&model);
    engine.update_widgets(&[A, B, D]);

    engine.delete(&[D]).unwrap();

    let absolute_count = [
        model.attachment(A, Side::Left),
        model.attachment(B, Side::Left),
    ]
    .iter()
    .filter(|a| matches!(a, Some(Attachment::Absolute(_))))
    .count();
    assert_eq!(absolute_count, 1);
}

#[test]
fn test_resolution_prefers_edge_outside_operating_set() {
    let model = cyclic_model();

    let mut commands = model.clone();
    cycles::resolve_cycles(&model, &mut commands, &[A, B], &[A], Axis::Horizontal).unwrap();

    // A is being operated on, so B's edge is the one converted
    assert_eq!(model.attachment(B, Side::Left), Some(Attachment::Absolute(180)));
    assert_eq!(model.attachment(A, Side::Left), Some(Attachment::Parallel(B, 0)));
}

#[test]
fn test_no_cycle_leaves_attachments_untouched() {
    let model = Handle::new()
        .widget(A, Rect::new(100, 50, 40, 20))
        .widget(B, Rect::new(180, 50, 40, 20))
        .attached(B, Side::Left, Attachment::Sequential(A, 40));

    let mut commands = model.clone();
    cycles::resolve_cycles(&model, &mut commands, &[A, B], &[], Axis::Horizontal).unwrap();

    assert_eq!(model.attachment(B, Side::Left), Some(Attachment::Sequential(A, 40)));
    assert_eq!(model.journal(), Vec::<String>::new());
}
