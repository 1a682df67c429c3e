//! Core types shared across the snapping and placement engines

use crate::geometry::Rect;

/// Opaque identity of a widget managed by the host editor.
///
/// The engine never looks inside a widget; everything it needs (bounds,
/// baseline, preferred size) comes from the
/// [`VisualDataProvider`](crate::snapping::VisualDataProvider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u32);

/// Dimension of placement; most algorithms are axis-symmetric via
/// [`Transposer`](crate::geometry::Transposer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// One side of a rectangular widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn axis(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::Horizontal,
            Side::Top | Side::Bottom => Axis::Vertical,
        }
    }

    pub fn is_horizontal(self) -> bool {
        self.axis() == Axis::Horizontal
    }

    /// Left and Top are leading; Right and Bottom are trailing
    pub fn is_leading(self) -> bool {
        matches!(self, Side::Left | Side::Top)
    }

    pub fn is_trailing(self) -> bool {
        !self.is_leading()
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    /// The leading/trailing position of this side on its axis
    pub fn direction(self) -> Direction {
        if self.is_leading() {
            Direction::Leading
        } else {
            Direction::Trailing
        }
    }

    /// The side of `axis` at the given position. `Undefined` is a
    /// programming error here and panics.
    pub fn of(axis: Axis, direction: Direction) -> Side {
        match (axis, direction) {
            (Axis::Horizontal, Direction::Leading) => Side::Left,
            (Axis::Horizontal, Direction::Trailing) => Side::Right,
            (Axis::Vertical, Direction::Leading) => Side::Top,
            (Axis::Vertical, Direction::Trailing) => Side::Bottom,
            (_, Direction::Undefined) => panic!("side requested for undefined direction"),
        }
    }
}

/// Which way something points on an axis: a widget side, a snap direction,
/// or the direction the mouse is moving. `Undefined` only occurs for mouse
/// movement before the first delta on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Undefined,
    Leading,
    Trailing,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Leading => Direction::Trailing,
            Direction::Trailing => Direction::Leading,
            Direction::Undefined => Direction::Undefined,
        }
    }

    pub fn is_defined(self) -> bool {
        self != Direction::Undefined
    }

    /// This direction, or `fallback` when undefined
    pub fn or(self, fallback: Direction) -> Direction {
        if self.is_defined() {
            self
        } else {
            fallback
        }
    }
}

/// A pair of values indexed by leading/trailing direction.
///
/// Replaces the 0/1 index arrays of the reference design; indexing with
/// `Undefined` is a programming error and fails fast.
#[derive(Debug, Clone, Default)]
pub struct PerDirection<T> {
    pub leading: T,
    pub trailing: T,
}

impl<T> PerDirection<T> {
    pub fn new(leading: T, trailing: T) -> Self {
        Self { leading, trailing }
    }

    pub fn get(&self, direction: Direction) -> &T {
        match direction {
            Direction::Leading => &self.leading,
            Direction::Trailing => &self.trailing,
            Direction::Undefined => panic!("indexed by undefined direction"),
        }
    }

    pub fn get_mut(&mut self, direction: Direction) -> &mut T {
        match direction {
            Direction::Leading => &mut self.leading,
            Direction::Trailing => &mut self.trailing,
            Direction::Undefined => panic!("indexed by undefined direction"),
        }
    }
}

/// The sides being dragged during a resize; empty means a pure move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeDirection {
    pub horizontal: Option<Direction>,
    pub vertical: Option<Direction>,
}

impl ResizeDirection {
    pub const NONE: ResizeDirection = ResizeDirection {
        horizontal: None,
        vertical: None,
    };

    /// Resize dragging a single side
    pub fn of_side(side: Side) -> Self {
        let mut r = Self::NONE;
        *r.slot_mut(side.axis()) = Some(side.direction());
        r
    }

    /// Resize dragging a corner (two perpendicular sides)
    pub fn of_corner(horizontal: Side, vertical: Side) -> Self {
        ResizeDirection {
            horizontal: Some(horizontal.direction()),
            vertical: Some(vertical.direction()),
        }
    }

    pub fn is_resizing(self) -> bool {
        self.horizontal.is_some() || self.vertical.is_some()
    }

    pub fn has_axis(self, axis: Axis) -> bool {
        self.slot(axis).is_some()
    }

    /// The dragged side on `axis`, if that axis is being resized
    pub fn side(self, axis: Axis) -> Option<Side> {
        self.slot(axis).map(|d| Side::of(axis, d))
    }

    fn slot(self, axis: Axis) -> Option<Direction> {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }

    fn slot_mut(&mut self, axis: Axis) -> &mut Option<Direction> {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }
}

/// Structural attachment inferred for one axis of a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentType {
    #[default]
    Free,
    Container,
    Component,
    ComponentWithOffset,
    Baseline,
}

/// Sentinel for "no candidate measured yet"; any real distance is smaller.
pub const UNDEFINED_DISTANCE: i32 = i32::MAX;

/// Per-axis scratch state of one placement operation.
///
/// Re-derived on every operation and reset by [`PlacementInfo::cleanup`];
/// owned exclusively by the placement engine. Distances are only ever
/// tightened while scanning candidates; a negative distance records the
/// magnitude of an overlap.
#[derive(Debug, Clone)]
pub struct PlacementInfo {
    /// Mouse move direction on this axis
    pub direction: Direction,
    pub attachment_type: AttachmentType,
    /// Closest non-overlapping sibling per direction
    pub neighbors: PerDirection<Option<WidgetId>>,
    pub distances: PerDirection<i32>,
    /// Siblings overlapping the operating bounds, per direction
    pub overlappings: PerDirection<Vec<WidgetId>>,
    /// Anchor widget of a Component/ComponentWithOffset/Baseline attachment
    pub attached_widget: Option<WidgetId>,
}

impl Default for PlacementInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementInfo {
    pub fn new() -> Self {
        Self {
            direction: Direction::Undefined,
            attachment_type: AttachmentType::Free,
            neighbors: PerDirection::new(None, None),
            distances: PerDirection::new(UNDEFINED_DISTANCE, UNDEFINED_DISTANCE),
            overlappings: PerDirection::new(Vec::new(), Vec::new()),
            attached_widget: None,
        }
    }

    /// Reset to the pristine state between operations
    pub fn cleanup(&mut self) {
        *self = Self::new();
    }

    /// An axis is overlapped iff either direction measured a negative
    /// distance; overlap takes precedence over any positive candidate.
    pub fn is_overlapped(&self) -> bool {
        self.distances.leading < 0 || self.distances.trailing < 0
    }

    /// Record `distance` for `direction` if strictly closer than the
    /// current best (first-wins on ties).
    pub fn tighten(&mut self, direction: Direction, distance: i32) -> bool {
        let slot = self.distances.get_mut(direction);
        if *slot > distance {
            *slot = distance;
            true
        } else {
            false
        }
    }
}

/// An attachment edge: `source`'s `side` is attached to `target`.
///
/// Used both to describe siblings affected by an operation and as the edge
/// type for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentAttachmentInfo {
    pub source: WidgetId,
    pub target: WidgetId,
    pub side: Side,
}

impl ComponentAttachmentInfo {
    pub fn new(source: WidgetId, target: WidgetId, side: Side) -> Self {
        Self {
            source,
            target,
            side,
        }
    }
}

/// Which edge of the sample widget an `align` operation lines up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignAnchor {
    Leading,
    Trailing,
    Center,
}

/// How `distribute_space` spreads widgets along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributeTarget {
    /// Evenly within the container client area
    ClientArea,
    /// Between the outermost widgets of the selection
    Selection,
}

/// Helper for translated (client-area relative) bounds
pub(crate) fn translated(bounds: Rect, offset: crate::geometry::Point) -> Rect {
    bounds.translated(-offset.x, -offset.y)
}
