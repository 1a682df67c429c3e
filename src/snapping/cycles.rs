//! Attachment-cycle detection and repair
//!
//! A commit can leave two widgets attached to each other on the same axis,
//! which the layout model cannot solve. Detection walks the attachment
//! graph from every widget along both sides with a visited set; repair
//! converts one edge of each mutual pair to an absolute attachment at the
//! widget's current position, so the dependency is cut without anything
//! moving visually.

use std::collections::HashSet;

use tracing::debug;

use crate::geometry::Transposer;

use super::error::LayoutError;
use super::provider::{LayoutCommands, VisualDataProvider};
use super::types::{Axis, ComponentAttachmentInfo, Direction, Side, WidgetId};

/// Repeatedly break mutual attachments on `axis` until none remain.
///
/// Each pass removes a pair of edges from the detected list, so the loop
/// is bounded by the number of attachments. The edge whose source is not
/// in `operating` is preferred for breaking, keeping user-driven widgets
/// free to move.
pub fn resolve_cycles<P, C>(
    provider: &P,
    commands: &mut C,
    widgets: &[WidgetId],
    operating: &[WidgetId],
    axis: Axis,
) -> Result<(), LayoutError>
where
    P: VisualDataProvider + ?Sized,
    C: LayoutCommands + ?Sized,
{
    let mut edges = detect_cycles(commands, widgets, axis)?;
    while !edges.is_empty() {
        let (first, second) = take_cyclic_pair(&mut edges);
        let edge = match second {
            Some(second) if operating.contains(&first.source) => second,
            _ => first,
        };
        resolve_edge(provider, commands, edge)?;
    }
    Ok(())
}

/// Edges of direct 2-widget mutual attachments on `axis`.
///
/// An edge `(source, target, side)` is recorded whenever following the
/// leading/trailing attachments from `target` comes back to `target`.
pub fn detect_cycles<C>(
    commands: &C,
    widgets: &[WidgetId],
    axis: Axis,
) -> Result<Vec<ComponentAttachmentInfo>, LayoutError>
where
    C: LayoutCommands + ?Sized,
{
    let leading = Side::of(axis, Direction::Leading);
    let trailing = Side::of(axis, Direction::Trailing);
    let mut edges = Vec::new();
    for &origin in widgets {
        for side in [leading, trailing] {
            let start = commands.attached_widget(origin, side)?;
            let mut visited = HashSet::new();
            traverse(commands, &mut edges, &mut visited, start, origin, axis)?;
        }
    }
    Ok(edges)
}

fn traverse<C>(
    commands: &C,
    edges: &mut Vec<ComponentAttachmentInfo>,
    visited: &mut HashSet<WidgetId>,
    widget: Option<WidgetId>,
    origin: WidgetId,
    axis: Axis,
) -> Result<(), LayoutError>
where
    C: LayoutCommands + ?Sized,
{
    let Some(widget) = widget else {
        return Ok(());
    };
    if !visited.insert(widget) {
        return Ok(());
    }
    let leading = Side::of(axis, Direction::Leading);
    let trailing = Side::of(axis, Direction::Trailing);
    let attached_leading = commands.attached_widget(widget, leading)?;
    let attached_trailing = commands.attached_widget(widget, trailing)?;
    if attached_leading == Some(origin) {
        edges.push(ComponentAttachmentInfo::new(widget, origin, leading));
        return Ok(());
    }
    if attached_trailing == Some(origin) {
        edges.push(ComponentAttachmentInfo::new(widget, origin, trailing));
        return Ok(());
    }
    traverse(commands, edges, visited, attached_leading, origin, axis)?;
    traverse(commands, edges, visited, attached_trailing, origin, axis)
}

/// Pop the first edge and its reverse edge, when present
fn take_cyclic_pair(
    edges: &mut Vec<ComponentAttachmentInfo>,
) -> (ComponentAttachmentInfo, Option<ComponentAttachmentInfo>) {
    let first = edges.remove(0);
    let reverse = edges
        .iter()
        .position(|e| e.source == first.target && e.target == first.source);
    let second = reverse.map(|i| edges.remove(i));
    (first, second)
}

/// Convert `edge` to an absolute attachment at the source's current
/// position, cutting the dependency without moving the widget.
fn resolve_edge<P, C>(
    provider: &P,
    commands: &mut C,
    edge: ComponentAttachmentInfo,
) -> Result<(), LayoutError>
where
    P: VisualDataProvider + ?Sized,
    C: LayoutCommands + ?Sized,
{
    let side = edge.side;
    let t = Transposer::for_axis(side.axis());
    let bounds = provider
        .translated_bounds(edge.source)
        .ok_or(LayoutError::UnknownWidget(edge.source))?;
    let span = t.rect(bounds).x_span();
    let container = t.size(provider.container_size()).width;
    let distance = if side.is_leading() {
        span.begin
    } else {
        container - span.end()
    };
    debug!(
        source = edge.source.0,
        target = edge.target.0,
        ?side,
        distance,
        "breaking attachment cycle with an absolute attachment"
    );
    commands.attach_absolute(edge.source, side, distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect, Size};
    use std::collections::HashMap;

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum Anchor {
        Container(i32),
        Widget(WidgetId),
    }

    #[derive(Default)]
    struct Model {
        bounds: HashMap<WidgetId, Rect>,
        attachments: HashMap<(WidgetId, Side), Anchor>,
    }

    impl VisualDataProvider for Model {
        fn model_bounds(&self, widget: WidgetId) -> Option<Rect> {
            self.bounds.get(&widget).copied()
        }
        fn baseline(&self, _widget: WidgetId) -> Option<i32> {
            None
        }
        fn preferred_size(&self, _widget: WidgetId) -> Size {
            Size::new(80, 25)
        }
        fn component_gap(&self, _widget: WidgetId, _target: WidgetId, _side: Side) -> i32 {
            6
        }
        fn container_gap(&self, _widget: WidgetId, _side: Side) -> i32 {
            6
        }
        fn container_size(&self) -> Size {
            Size::new(400, 300)
        }
        fn client_area_offset(&self) -> Point {
            Point::new(0, 0)
        }
        fn grid_step(&self, _axis: Axis) -> i32 {
            5
        }
        fn is_free_snap_enabled(&self) -> bool {
            true
        }
        fn is_grid_snap_enabled(&self) -> bool {
            false
        }
        fn is_suppressing_snap(&self) -> bool {
            false
        }
    }

    impl LayoutCommands for Model {
        fn is_attached(&self, widget: WidgetId, side: Side) -> Result<bool, LayoutError> {
            Ok(self.attachments.contains_key(&(widget, side)))
        }
        fn detach(&mut self, widget: WidgetId, side: Side) -> Result<(), LayoutError> {
            self.attachments.remove(&(widget, side));
            Ok(())
        }
        fn attach_sequentially(
            &mut self,
            widget: WidgetId,
            target: WidgetId,
            side: Side,
            _distance: i32,
        ) -> Result<(), LayoutError> {
            self.attachments.insert((widget, side), Anchor::Widget(target));
            Ok(())
        }
        fn attach_parallelly(
            &mut self,
            widget: WidgetId,
            target: WidgetId,
            side: Side,
            _distance: i32,
        ) -> Result<(), LayoutError> {
            self.attachments.insert((widget, side), Anchor::Widget(target));
            Ok(())
        }
        fn attach_baseline(
            &mut self,
            widget: WidgetId,
            target: WidgetId,
        ) -> Result<(), LayoutError> {
            self.attachments.insert((widget, Side::Top), Anchor::Widget(target));
            Ok(())
        }
        fn attach_absolute(
            &mut self,
            widget: WidgetId,
            side: Side,
            distance: i32,
        ) -> Result<(), LayoutError> {
            self.attachments.insert((widget, side), Anchor::Container(distance));
            Ok(())
        }
        fn attached_widget(
            &self,
            widget: WidgetId,
            side: Side,
        ) -> Result<Option<WidgetId>, LayoutError> {
            Ok(match self.attachments.get(&(widget, side)) {
                Some(Anchor::Widget(target)) => Some(*target),
                _ => None,
            })
        }
        fn adjust_attachment_offset(
            &mut self,
            _widget: WidgetId,
            _side: Side,
            _delta: i32,
        ) -> Result<(), LayoutError> {
            Ok(())
        }
        fn set_explicit_size(
            &mut self,
            _widget: WidgetId,
            _fixed_side: Side,
            _resizing_side: Side,
            _size_delta: i32,
        ) -> Result<(), LayoutError> {
            Ok(())
        }
        fn apply_bounds(&mut self, widget: WidgetId, bounds: Rect) -> Result<(), LayoutError> {
            self.bounds.insert(widget, bounds);
            Ok(())
        }
    }

    const A: WidgetId = WidgetId(1);
    const B: WidgetId = WidgetId(2);
    const C: WidgetId = WidgetId(3);

    #[test]
    fn test_detects_mutual_attachment() {
        let mut model = Model::default();
        model.bounds.insert(A, Rect::new(10, 10, 50, 20));
        model.bounds.insert(B, Rect::new(100, 10, 50, 20));
        model.attachments.insert((A, Side::Left), Anchor::Widget(B));
        model.attachments.insert((B, Side::Left), Anchor::Widget(A));

        let edges = detect_cycles(&model, &[A, B], Axis::Horizontal).expect("detect");
        assert_eq!(edges.len(), 2);
        assert!(edges.contains(&ComponentAttachmentInfo::new(B, A, Side::Left)));
        assert!(edges.contains(&ComponentAttachmentInfo::new(A, B, Side::Left)));
    }

    #[test]
    fn test_no_cycle_for_chain() {
        let mut model = Model::default();
        model.attachments.insert((B, Side::Left), Anchor::Widget(A));
        model.attachments.insert((C, Side::Left), Anchor::Widget(B));
        let edges = detect_cycles(&model, &[A, B, C], Axis::Horizontal).expect("detect");
        assert!(edges.is_empty());
    }

    #[test]
    fn test_resolution_breaks_non_operating_edge() {
        let mut model = Model::default();
        model.bounds.insert(A, Rect::new(10, 10, 50, 20));
        model.bounds.insert(B, Rect::new(100, 10, 50, 20));
        model.attachments.insert((A, Side::Left), Anchor::Widget(B));
        model.attachments.insert((B, Side::Left), Anchor::Widget(A));

        // A is being operated on, so B's edge is the one to convert
        let mut commands = Model {
            bounds: model.bounds.clone(),
            attachments: model.attachments.clone(),
        };
        let provider = model;
        resolve_cycles(&provider, &mut commands, &[A, B], &[A], Axis::Horizontal)
            .expect("resolve");
        assert_eq!(
            commands.attachments.get(&(B, Side::Left)),
            Some(&Anchor::Container(100))
        );
        // the other edge is untouched
        assert_eq!(
            commands.attachments.get(&(A, Side::Left)),
            Some(&Anchor::Widget(B))
        );
    }

    #[test]
    fn test_resolution_trailing_side_uses_container_distance() {
        let mut model = Model::default();
        model.bounds.insert(A, Rect::new(10, 10, 50, 20));
        model.bounds.insert(B, Rect::new(100, 10, 50, 20));
        model.attachments.insert((A, Side::Right), Anchor::Widget(B));
        model.attachments.insert((B, Side::Right), Anchor::Widget(A));

        let mut commands = Model {
            bounds: model.bounds.clone(),
            attachments: model.attachments.clone(),
        };
        let provider = model;
        resolve_cycles(&provider, &mut commands, &[A, B], &[B], Axis::Horizontal)
            .expect("resolve");
        // A's right edge at 60 inside a 400 wide container
        assert_eq!(
            commands.attachments.get(&(A, Side::Right)),
            Some(&Anchor::Container(340))
        );
        assert_eq!(
            commands.attachments.get(&(B, Side::Right)),
            Some(&Anchor::Widget(A))
        );
    }

    #[test]
    fn test_vertical_cycle_resolved_independently() {
        let mut model = Model::default();
        model.bounds.insert(A, Rect::new(10, 40, 50, 20));
        model.bounds.insert(B, Rect::new(10, 100, 50, 20));
        model.attachments.insert((A, Side::Top), Anchor::Widget(B));
        model.attachments.insert((B, Side::Top), Anchor::Widget(A));
        model.attachments.insert((A, Side::Left), Anchor::Widget(B));

        let mut commands = Model {
            bounds: model.bounds.clone(),
            attachments: model.attachments.clone(),
        };
        let provider = model;
        resolve_cycles(&provider, &mut commands, &[A, B], &[], Axis::Vertical)
            .expect("resolve");
        // exactly one vertical edge converted, horizontal edge untouched
        let converted = [(A, Side::Top), (B, Side::Top)]
            .iter()
            .filter(|k| matches!(commands.attachments.get(*k), Some(Anchor::Container(_))))
            .count();
        assert_eq!(converted, 1);
        assert_eq!(
            commands.attachments.get(&(A, Side::Left)),
            Some(&Anchor::Widget(B))
        );
    }
}
