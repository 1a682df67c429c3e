//! Snap point variants and their engagement rules
//!
//! A snap point is one candidate alignment line on one axis. The engine
//! asks each point, in priority order, whether the dragged bounds should
//! be pulled onto it; the first point that answers yes wins the axis.
//!
//! The variants form a closed union. Container, Component, Indented and
//! Baseline share the generic engagement test (direction check, recompute,
//! allow check, interval test); SameSize runs its own inline size-matching
//! scan, faithful to the reference behavior.

use crate::geometry::{Interval, Rect, Transposer};

use super::config::SnapConfig;
use super::provider::{FeedbackHandle, FeedbackSink, VisualDataProvider};
use super::types::{AttachmentType, Axis, Direction, ResizeDirection, Side, WidgetId};

/// Query-scoped context threaded through snap tests
pub struct SnapContext<'a> {
    pub provider: &'a dyn VisualDataProvider,
    pub config: &'a SnapConfig,
    /// All widgets under management, for the SameSize sibling scan
    pub all_widgets: &'a [WidgetId],
}

/// Mutable per-query state shared by the line-style variants.
///
/// Identity fields (`side`, `snap_direction`) are fixed at construction;
/// the rest is recomputed against current sibling geometry before every
/// test.
#[derive(Debug, Clone)]
pub struct SnapState {
    /// Which widget/container edge this point represents
    pub side: Side,
    /// Which edge of the dragged bounds engages this point
    pub snap_direction: Direction,
    /// Current coordinate of the alignment line
    pub value: i32,
    /// Window around `value` within which an edge engages
    pub snap_interval: Interval,
    /// Where along the x axis this point is active
    pub x_interval: Interval,
    /// Where along the y axis this point is active
    pub y_interval: Interval,
    /// The being-snapped widget nearest to this point, used for gap lookups
    pub nearest: Option<WidgetId>,
}

impl SnapState {
    fn new(side: Side, snap_direction: Direction) -> Self {
        Self {
            side,
            snap_direction,
            value: 0,
            snap_interval: Interval::default(),
            x_interval: Interval::default(),
            y_interval: Interval::default(),
            nearest: None,
        }
    }

    fn perpendicular_interval(&self) -> Interval {
        match self.side.axis() {
            Axis::Horizontal => self.y_interval,
            Axis::Vertical => self.x_interval,
        }
    }
}

/// Condensed description of an engaged point, handed to the placement
/// engine to derive the attachment type and anchor.
#[derive(Debug, Clone, Copy)]
pub struct EngagedPoint {
    pub attachment: AttachmentType,
    pub anchor: Option<WidgetId>,
    /// Component gap carried by the point; zero for parallel points
    pub gap: i32,
    pub side: Side,
}

/// One candidate alignment line on one axis
#[derive(Debug, Clone)]
pub enum SnapPoint {
    /// Container boundary, optionally inset by the container gap
    Container { state: SnapState, with_gap: bool },
    /// Sibling edge, optionally offset by the component gap
    Component {
        state: SnapState,
        anchor: WidgetId,
        with_gap: bool,
        gap: i32,
    },
    /// Sibling left edge plus a fixed indent, active in a band below the
    /// sibling (e.g. a label under a checkbox)
    Indented { state: SnapState, anchor: WidgetId },
    /// Text baseline alignment with a sibling
    Baseline { state: SnapState, anchor: WidgetId },
    /// Size match with a sibling (or the preferred size) while resizing
    SameSize {
        axis: Axis,
        direction: Direction,
        matched: Option<WidgetId>,
        matched_size: i32,
    },
}

impl SnapPoint {
    pub fn container(side: Side, with_gap: bool) -> Self {
        SnapPoint::Container {
            state: SnapState::new(side, side.direction()),
            with_gap,
        }
    }

    pub fn component(anchor: WidgetId, side: Side, with_gap: bool) -> Self {
        // a gap point engages the dragged edge facing the anchor; a
        // parallel point aligns same edges
        let snap_direction = if with_gap {
            side.direction().opposite()
        } else {
            side.direction()
        };
        SnapPoint::Component {
            state: SnapState::new(side, snap_direction),
            anchor,
            with_gap,
            gap: 0,
        }
    }

    pub fn indented(anchor: WidgetId) -> Self {
        SnapPoint::Indented {
            state: SnapState::new(Side::Left, Direction::Leading),
            anchor,
        }
    }

    pub fn baseline(anchor: WidgetId) -> Self {
        SnapPoint::Baseline {
            state: SnapState::new(Side::Top, Direction::Leading),
            anchor,
        }
    }

    pub fn same_size(axis: Axis, direction: Direction) -> Self {
        SnapPoint::SameSize {
            axis,
            direction,
            matched: None,
            matched_size: 0,
        }
    }

    /// The axis this point snaps on
    pub fn axis(&self) -> Axis {
        match self {
            SnapPoint::Container { state, .. } | SnapPoint::Component { state, .. } => {
                state.side.axis()
            }
            SnapPoint::Indented { .. } => Axis::Horizontal,
            SnapPoint::Baseline { .. } => Axis::Vertical,
            SnapPoint::SameSize { axis, .. } => *axis,
        }
    }

    /// Description of this point for placement inference
    pub fn summary(&self) -> EngagedPoint {
        match self {
            SnapPoint::Container { state, .. } => EngagedPoint {
                attachment: AttachmentType::Container,
                anchor: None,
                gap: 0,
                side: state.side,
            },
            SnapPoint::Component {
                state, anchor, gap, ..
            } => EngagedPoint {
                attachment: AttachmentType::Component,
                anchor: Some(*anchor),
                gap: *gap,
                side: state.side,
            },
            SnapPoint::Indented { state, anchor } => EngagedPoint {
                attachment: AttachmentType::ComponentWithOffset,
                anchor: Some(*anchor),
                gap: 0,
                side: state.side,
            },
            SnapPoint::Baseline { state, anchor } => EngagedPoint {
                attachment: AttachmentType::Baseline,
                anchor: Some(*anchor),
                gap: 0,
                side: state.side,
            },
            SnapPoint::SameSize { axis, direction, .. } => EngagedPoint {
                attachment: AttachmentType::Free,
                anchor: None,
                gap: 0,
                side: Side::of(*axis, direction.or(Direction::Leading)),
            },
        }
    }

    /// Test this point against the dragged bounds, pulling `bounds` onto
    /// the point on success. `bounds` are the union bounds of
    /// `being_snapped`; they are not mutated on failure.
    pub fn snap(
        &mut self,
        ctx: &SnapContext<'_>,
        being_snapped: &[WidgetId],
        bounds: &mut Rect,
        move_direction: Direction,
        resize_direction: ResizeDirection,
    ) -> bool {
        if let SnapPoint::SameSize { .. } = self {
            return self.snap_same_size(ctx, being_snapped, bounds, resize_direction);
        }
        // while resizing, engagement is governed by the dragged side
        // instead of the mouse direction
        if !resize_direction.is_resizing() && !self.check_direction(move_direction) {
            return false;
        }
        if !self.calculate(ctx, being_snapped) {
            return false;
        }
        if !self.snap_allowed(being_snapped) {
            return false;
        }
        let axis = self.axis();
        let state = self.state();
        let (value, snap_direction) = (state.value, state.snap_direction);
        let perpendicular = state.perpendicular_interval();
        if !perpendicular.intersects(&bounds.span(axis.other())) {
            return false;
        }
        if resize_direction.is_resizing() {
            let Some(resizing_side) = resize_direction.side(axis) else {
                return false;
            };
            if resizing_side.direction() != snap_direction {
                return false;
            }
            if !state.snap_interval.contains(edge_of(bounds, axis, snap_direction)) {
                return false;
            }
            set_edge_resizing(bounds, resizing_side, value);
        } else {
            if !state.snap_interval.contains(edge_of(bounds, axis, snap_direction)) {
                return false;
            }
            move_edge_to(bounds, axis, snap_direction, value);
        }
        true
    }

    /// Component points require the mouse to be moving toward the anchor
    /// side they represent; Container, Baseline and Indented ignore
    /// direction.
    fn check_direction(&self, move_direction: Direction) -> bool {
        match self {
            SnapPoint::Component { state, .. } => move_direction == state.side.direction(),
            SnapPoint::Container { .. }
            | SnapPoint::Baseline { .. }
            | SnapPoint::Indented { .. }
            | SnapPoint::SameSize { .. } => true,
        }
    }

    /// Refresh `value` and the activity intervals against current
    /// geometry. Returns false when the point is not applicable right now.
    fn calculate(&mut self, ctx: &SnapContext<'_>, being_snapped: &[WidgetId]) -> bool {
        let snap_distance = ctx.config.snap_distance;
        match self {
            SnapPoint::Container { state, with_gap } => {
                let t = Transposer::for_axis(state.side.axis());
                let container = t.size(ctx.provider.container_size());
                state.nearest = nearest_being_snapped(ctx, being_snapped, state.side);
                let gap = if *with_gap {
                    state
                        .nearest
                        .map(|w| ctx.provider.container_gap(w, state.side))
                        .unwrap_or(0)
                } else {
                    0
                };
                state.value = if state.side.is_leading() {
                    gap
                } else {
                    container.width - gap
                };
                set_intervals(
                    state,
                    Interval::around(state.value, snap_distance),
                    Interval::new(0, container.height),
                );
                true
            }
            SnapPoint::Component {
                state,
                anchor,
                with_gap,
                gap,
            } => {
                let Some(anchor_bounds) = ctx.provider.translated_bounds(*anchor) else {
                    return false;
                };
                let axis = state.side.axis();
                let t = Transposer::for_axis(axis);
                let tb = t.rect(anchor_bounds);
                state.nearest = nearest_being_snapped(ctx, being_snapped, state.side);
                *gap = if *with_gap {
                    let facing = Side::of(axis, state.snap_direction);
                    state
                        .nearest
                        .map(|w| ctx.provider.component_gap(w, *anchor, facing))
                        .unwrap_or(0)
                } else {
                    0
                };
                let edge = if state.side.is_leading() {
                    tb.x
                } else {
                    tb.right()
                };
                state.value = if state.side.is_leading() {
                    edge - *gap
                } else {
                    edge + *gap
                };
                let mut active = tb.y_span();
                if *with_gap {
                    active = active.expanded(gap.abs());
                }
                set_intervals(state, Interval::around(state.value, snap_distance), active);
                true
            }
            SnapPoint::Indented { state, anchor } => {
                let Some(anchor_bounds) = ctx.provider.translated_bounds(*anchor) else {
                    return false;
                };
                state.nearest = nearest_being_snapped(ctx, being_snapped, state.side);
                let gap = state
                    .nearest
                    .map(|w| ctx.provider.component_gap(w, *anchor, Side::Top))
                    .unwrap_or(0);
                state.value = anchor_bounds.x + ctx.config.indent;
                state.snap_interval = Interval::around(state.value, snap_distance);
                state.x_interval = state.snap_interval;
                state.y_interval = Interval::new(anchor_bounds.bottom(), 2 * gap.max(1));
                true
            }
            SnapPoint::Baseline { state, anchor } => {
                let Some(anchor_bounds) = ctx.provider.translated_bounds(*anchor) else {
                    return false;
                };
                let [subject] = being_snapped else {
                    return false;
                };
                let (Some(anchor_baseline), Some(subject_baseline)) = (
                    ctx.provider.baseline(*anchor),
                    ctx.provider.baseline(*subject),
                ) else {
                    return false;
                };
                state.nearest = Some(*subject);
                state.value = anchor_bounds.y + anchor_baseline - subject_baseline;
                state.snap_interval = Interval::around(state.value, snap_distance);
                state.y_interval = state.snap_interval;
                // active slightly beyond the anchor so a label dragged just
                // beside a field can still pick up its baseline
                state.x_interval = anchor_bounds.x_span().expanded(snap_distance);
                true
            }
            SnapPoint::SameSize { .. } => true,
        }
    }

    /// Component-family points refuse to snap a widget to itself;
    /// Baseline additionally refuses multi-widget drags.
    fn snap_allowed(&self, being_snapped: &[WidgetId]) -> bool {
        match self {
            SnapPoint::Component { anchor, .. } | SnapPoint::Indented { anchor, .. } => {
                !being_snapped.contains(anchor)
            }
            SnapPoint::Baseline { anchor, .. } => {
                being_snapped.len() == 1 && !being_snapped.contains(anchor)
            }
            SnapPoint::Container { .. } | SnapPoint::SameSize { .. } => true,
        }
    }

    /// SameSize bypasses the generic engagement test: while resizing a
    /// single widget it scans all other siblings (then the widget's
    /// preferred size) for a size match and mutates the resizing edge so
    /// the sizes are equal.
    fn snap_same_size(
        &mut self,
        ctx: &SnapContext<'_>,
        being_snapped: &[WidgetId],
        bounds: &mut Rect,
        resize_direction: ResizeDirection,
    ) -> bool {
        let SnapPoint::SameSize {
            axis,
            direction,
            matched,
            matched_size,
        } = self
        else {
            unreachable!("snap_same_size on a non-SameSize point");
        };
        let [subject] = being_snapped else {
            return false;
        };
        let Some(resizing_side) = resize_direction.side(*axis) else {
            return false;
        };
        if resizing_side.direction() != *direction {
            return false;
        }
        let t = Transposer::for_axis(*axis);
        let current = t.rect(*bounds).width;
        let window = ctx.config.same_size_window;
        // siblings first, preferred size as the fallback
        for &candidate in ctx.all_widgets {
            if candidate == *subject {
                continue;
            }
            let Some(candidate_bounds) = ctx.provider.translated_bounds(candidate) else {
                continue;
            };
            let size = t.rect(candidate_bounds).width;
            if (size - current).abs() <= window {
                *matched = Some(candidate);
                *matched_size = size;
                set_size_along(bounds, resizing_side, size);
                return true;
            }
        }
        let preferred = t.size(ctx.provider.preferred_size(*subject)).width;
        if (preferred - current).abs() <= window {
            *matched = None;
            *matched_size = preferred;
            set_size_along(bounds, resizing_side, preferred);
            return true;
        }
        false
    }

    fn state(&self) -> &SnapState {
        match self {
            SnapPoint::Container { state, .. }
            | SnapPoint::Component { state, .. }
            | SnapPoint::Indented { state, .. }
            | SnapPoint::Baseline { state, .. } => state,
            SnapPoint::SameSize { .. } => {
                panic!("SameSize snap points carry no shared snap state")
            }
        }
    }

    /// Draw the feedback for an engaged point. Line points draw one line
    /// spanning the union of the dragged bounds and the anchor, expanded
    /// by a small margin; SameSize draws an outline plus a center line.
    pub fn add_feedback(
        &self,
        ctx: &SnapContext<'_>,
        bounds: Rect,
        sink: &mut dyn FeedbackSink,
        out: &mut Vec<FeedbackHandle>,
    ) {
        let margin = ctx.config.feedback_margin;
        match self {
            SnapPoint::Container { state, .. } => {
                let container = ctx.provider.container_size();
                match state.side.axis() {
                    Axis::Horizontal => {
                        out.push(sink.vertical_line(
                            state.value,
                            -margin,
                            container.height + 2 * margin,
                        ));
                    }
                    Axis::Vertical => {
                        out.push(sink.horizontal_line(
                            state.value,
                            -margin,
                            container.width + 2 * margin,
                        ));
                    }
                }
            }
            SnapPoint::Component { state, anchor, .. }
            | SnapPoint::Indented { state, anchor }
            | SnapPoint::Baseline { state, anchor } => {
                let span_bounds = match ctx.provider.translated_bounds(*anchor) {
                    Some(anchor_bounds) => bounds.union(&anchor_bounds),
                    None => bounds,
                };
                match state.side.axis() {
                    Axis::Horizontal => {
                        let span = span_bounds.y_span().expanded(margin);
                        out.push(sink.vertical_line(state.value, span.begin, span.length));
                    }
                    Axis::Vertical => {
                        let span = span_bounds.x_span().expanded(margin);
                        out.push(sink.horizontal_line(state.value, span.begin, span.length));
                    }
                }
            }
            SnapPoint::SameSize { axis, matched, .. } => {
                out.push(sink.outline(bounds.expanded(margin)));
                if let Some(sibling) = matched {
                    if let Some(sibling_bounds) = ctx.provider.translated_bounds(*sibling) {
                        out.push(sink.outline(sibling_bounds.expanded(margin)));
                    }
                }
                match axis {
                    Axis::Horizontal => {
                        let y = bounds.y_span().center();
                        out.push(sink.horizontal_middle_line(y, bounds.x, bounds.width));
                    }
                    Axis::Vertical => {
                        let x = bounds.x_span().center();
                        out.push(sink.vertical_middle_line(x, bounds.y, bounds.height));
                    }
                }
            }
        }
    }
}

/// Coordinate of the leading or trailing edge of `bounds` on `axis`
fn edge_of(bounds: &Rect, axis: Axis, direction: Direction) -> i32 {
    let span = bounds.span(axis);
    match direction.or(Direction::Leading) {
        Direction::Trailing => span.end(),
        _ => span.begin,
    }
}

/// Move `bounds` so its edge lands on `value`, preserving size
fn move_edge_to(bounds: &mut Rect, axis: Axis, direction: Direction, value: i32) {
    let delta = value - edge_of(bounds, axis, direction);
    match axis {
        Axis::Horizontal => bounds.x += delta,
        Axis::Vertical => bounds.y += delta,
    }
}

/// Drag one edge of `bounds` to `value`, keeping the opposite edge fixed
fn set_edge_resizing(bounds: &mut Rect, side: Side, value: i32) {
    match side {
        Side::Left => bounds.set_left(value),
        Side::Right => bounds.set_right(value),
        Side::Top => bounds.set_top(value),
        Side::Bottom => bounds.set_bottom(value),
    }
}

/// Resize `bounds` along the axis of `resizing_side` to `size`, keeping
/// the opposite edge fixed
fn set_size_along(bounds: &mut Rect, resizing_side: Side, size: i32) {
    let target = match resizing_side {
        Side::Left => bounds.right() - size,
        Side::Right => bounds.x + size,
        Side::Top => bounds.bottom() - size,
        Side::Bottom => bounds.y + size,
    };
    set_edge_resizing(bounds, resizing_side, target);
}

fn set_intervals(state: &mut SnapState, snap: Interval, active: Interval) {
    state.snap_interval = snap;
    match state.side.axis() {
        Axis::Horizontal => {
            state.x_interval = snap;
            state.y_interval = active;
        }
        Axis::Vertical => {
            state.y_interval = snap;
            state.x_interval = active;
        }
    }
}

/// The being-snapped widget whose engaging edge lies closest to `side`'s
/// container edge; used only to pick gap preferences.
fn nearest_being_snapped(
    ctx: &SnapContext<'_>,
    being_snapped: &[WidgetId],
    side: Side,
) -> Option<WidgetId> {
    let t = Transposer::for_axis(side.axis());
    let mut best: Option<(WidgetId, i32)> = None;
    for &widget in being_snapped {
        let Some(bounds) = ctx.provider.translated_bounds(widget) else {
            continue;
        };
        let span = t.rect(bounds).x_span();
        let key = if side.is_leading() { span.begin } else { -span.end() };
        if best.map(|(_, k)| key < k).unwrap_or(true) {
            best = Some((widget, key));
        }
    }
    best.map(|(w, _)| w).or_else(|| being_snapped.first().copied())
}
