//! Per-axis snap search with grid fallback
//!
//! The engine owns the two per-axis point lists in fixed priority order
//! and walks them first-match-wins on every mouse move. An axis that no
//! point claims falls back to grid alignment. First-match is deliberate:
//! deterministic, explainable snapping beats picking a "best" candidate
//! during fast interactive dragging.

use tracing::debug;

use crate::geometry::{Point, Rect};

use super::config::SnapConfig;
use super::provider::{FeedbackHandle, FeedbackSink, VisualDataProvider};
use super::snap_point::{EngagedPoint, SnapContext, SnapPoint};
use super::types::{Axis, Direction, ResizeDirection, Side, WidgetId};

/// Result of one snap query on one axis
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisSnap {
    /// Sticky mouse-move direction on this axis
    pub direction: Direction,
    /// The engaged point, if any point claimed this axis
    pub engaged: Option<EngagedPoint>,
}

/// Result of one snap query, handed to the placement engine
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapOutcome {
    pub horizontal: AxisSnap,
    pub vertical: AxisSnap,
}

impl SnapOutcome {
    pub fn axis(&self, axis: Axis) -> &AxisSnap {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }
}

/// Finds at most one engaged snap point per axis and keeps the transient
/// feedback in sync with it.
pub struct SnapEngine {
    config: SnapConfig,
    widgets: Vec<WidgetId>,
    x_points: Vec<SnapPoint>,
    y_points: Vec<SnapPoint>,
    last_mouse: Option<Point>,
    x_direction: Direction,
    y_direction: Direction,
    feedbacks: Vec<FeedbackHandle>,
}

impl SnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self {
            config,
            widgets: Vec::new(),
            x_points: Vec::new(),
            y_points: Vec::new(),
            last_mouse: None,
            x_direction: Direction::Undefined,
            y_direction: Direction::Undefined,
            feedbacks: Vec::new(),
        }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Rebuild both point lists for the current widget set. Must be called
    /// whenever widgets are added to or removed from the container.
    pub fn update_widgets(&mut self, widgets: &[WidgetId]) {
        self.widgets = widgets.to_vec();
        self.x_points = build_points(Axis::Horizontal, widgets);
        self.y_points = build_points(Axis::Vertical, widgets);
    }

    /// Run one snap query for the current mouse position, mutating
    /// `bounds` onto whatever engages. `bounds` are the union bounds of
    /// `being_snapped` in client-area coordinates.
    pub fn process_bounds(
        &mut self,
        provider: &dyn VisualDataProvider,
        sink: &mut dyn FeedbackSink,
        mouse: Point,
        being_snapped: &[WidgetId],
        bounds: &mut Rect,
        resize_direction: ResizeDirection,
    ) -> SnapOutcome {
        // direction is sticky: a zero delta on an axis keeps the
        // direction from the previous event
        if let Some(last) = self.last_mouse {
            if mouse.x != last.x {
                self.x_direction = if mouse.x > last.x {
                    Direction::Trailing
                } else {
                    Direction::Leading
                };
            }
            if mouse.y != last.y {
                self.y_direction = if mouse.y > last.y {
                    Direction::Trailing
                } else {
                    Direction::Leading
                };
            }
        }
        self.last_mouse = Some(mouse);

        for handle in self.feedbacks.drain(..) {
            sink.remove(handle);
        }

        let ctx = SnapContext {
            provider,
            config: &self.config,
            all_widgets: &self.widgets,
        };

        let mut engaged_x = None;
        let mut engaged_y = None;
        if !provider.is_suppressing_snap() && provider.is_free_snap_enabled() {
            engaged_x = first_engaged(
                &mut self.x_points,
                &ctx,
                being_snapped,
                bounds,
                self.x_direction,
                resize_direction,
            );
            engaged_y = first_engaged(
                &mut self.y_points,
                &ctx,
                being_snapped,
                bounds,
                self.y_direction,
                resize_direction,
            );
        }

        if !provider.is_suppressing_snap() && provider.is_grid_snap_enabled() {
            if engaged_x.is_none() {
                snap_to_grid(
                    provider,
                    Axis::Horizontal,
                    bounds,
                    self.x_direction,
                    resize_direction,
                );
            }
            if engaged_y.is_none() {
                snap_to_grid(
                    provider,
                    Axis::Vertical,
                    bounds,
                    self.y_direction,
                    resize_direction,
                );
            }
        }

        if let Some(index) = engaged_x {
            self.x_points[index].add_feedback(&ctx, *bounds, sink, &mut self.feedbacks);
        }
        if let Some(index) = engaged_y {
            self.y_points[index].add_feedback(&ctx, *bounds, sink, &mut self.feedbacks);
        }

        let outcome = SnapOutcome {
            horizontal: AxisSnap {
                direction: self.x_direction,
                engaged: engaged_x.map(|i| self.x_points[i].summary()),
            },
            vertical: AxisSnap {
                direction: self.y_direction,
                engaged: engaged_y.map(|i| self.y_points[i].summary()),
            },
        };
        debug!(
            x_engaged = outcome.horizontal.engaged.is_some(),
            y_engaged = outcome.vertical.engaged.is_some(),
            "snap query processed"
        );
        outcome
    }

    /// Remove all feedback; called when an operation ends or is cancelled
    pub fn clear_feedbacks(&mut self, sink: &mut dyn FeedbackSink) {
        for handle in self.feedbacks.drain(..) {
            sink.remove(handle);
        }
    }

    /// Forget mouse history between operations
    pub fn reset(&mut self) {
        self.last_mouse = None;
        self.x_direction = Direction::Undefined;
        self.y_direction = Direction::Undefined;
    }
}

/// The fixed priority order for one axis: container points, size matching,
/// then per-sibling points (baseline on the vertical axis, indented on the
/// horizontal).
fn build_points(axis: Axis, widgets: &[WidgetId]) -> Vec<SnapPoint> {
    let leading = Side::of(axis, Direction::Leading);
    let trailing = Side::of(axis, Direction::Trailing);
    let mut points = vec![
        SnapPoint::container(leading, true),
        SnapPoint::container(leading, false),
        SnapPoint::container(trailing, true),
        SnapPoint::container(trailing, false),
        SnapPoint::same_size(axis, Direction::Leading),
        SnapPoint::same_size(axis, Direction::Trailing),
    ];
    for &widget in widgets {
        match axis {
            Axis::Horizontal => points.push(SnapPoint::indented(widget)),
            Axis::Vertical => points.push(SnapPoint::baseline(widget)),
        }
        points.push(SnapPoint::component(widget, leading, true));
        points.push(SnapPoint::component(widget, leading, false));
        points.push(SnapPoint::component(widget, trailing, true));
        points.push(SnapPoint::component(widget, trailing, false));
    }
    points
}

fn first_engaged(
    points: &mut [SnapPoint],
    ctx: &SnapContext<'_>,
    being_snapped: &[WidgetId],
    bounds: &mut Rect,
    move_direction: Direction,
    resize_direction: ResizeDirection,
) -> Option<usize> {
    points
        .iter_mut()
        .position(|p| p.snap(ctx, being_snapped, bounds, move_direction, resize_direction))
}

/// Align the relevant edge to the nearest lower multiple of the grid step.
/// While moving, the leading edge is used when the mouse moves leading,
/// the trailing edge otherwise; while resizing, the dragged edge.
fn snap_to_grid(
    provider: &dyn VisualDataProvider,
    axis: Axis,
    bounds: &mut Rect,
    move_direction: Direction,
    resize_direction: ResizeDirection,
) {
    let step = provider.grid_step(axis);
    if step <= 0 {
        return;
    }
    if resize_direction.is_resizing() {
        let Some(side) = resize_direction.side(axis) else {
            return;
        };
        let span = bounds.span(axis);
        let edge = if side.is_leading() { span.begin } else { span.end() };
        set_side(bounds, side, grid_floor(edge, step));
    } else {
        let span = bounds.span(axis);
        let edge = if move_direction == Direction::Leading {
            span.begin
        } else {
            span.end()
        };
        let delta = grid_floor(edge, step) - edge;
        match axis {
            Axis::Horizontal => bounds.x += delta,
            Axis::Vertical => bounds.y += delta,
        }
    }
}

fn set_side(bounds: &mut Rect, side: Side, value: i32) {
    match side {
        Side::Left => bounds.set_left(value),
        Side::Right => bounds.set_right(value),
        Side::Top => bounds.set_top(value),
        Side::Bottom => bounds.set_bottom(value),
    }
}

/// Nearest lower multiple of `step`, floor semantics for negatives too
fn grid_floor(value: i32, step: i32) -> i32 {
    value.div_euclid(step) * step
}
