//! Collaborator contracts consumed by the engine
//!
//! Three seams connect the engine to the host editor: visual data about
//! widgets and the container, a sink for transient visual feedback, and the
//! layout-command sink that receives the structural attachment commands.

use crate::geometry::{Point, Rect, Size};

use super::error::LayoutError;
use super::types::{translated, Axis, Side, WidgetId};

/// Geometry and preference data about widgets and their container.
///
/// Interaction-scoped toggles (grid on/off, snapping suppressed by a
/// modifier key) are threaded through here explicitly rather than read
/// from ambient editor state.
pub trait VisualDataProvider {
    /// Model bounds of a widget; `None` while the widget is still being
    /// created and has no bounds yet.
    fn model_bounds(&self, widget: WidgetId) -> Option<Rect>;

    /// Text baseline offset within the widget; `None` for widgets without
    /// a baseline.
    fn baseline(&self, widget: WidgetId) -> Option<i32>;

    fn preferred_size(&self, widget: WidgetId) -> Size;

    /// Preferred gap between two widgets when `widget`'s `side` faces
    /// `target`.
    fn component_gap(&self, widget: WidgetId, target: WidgetId, side: Side) -> i32;

    /// Preferred gap between `widget` and the container edge on `side`.
    fn container_gap(&self, widget: WidgetId, side: Side) -> i32;

    fn container_size(&self) -> Size;

    /// Offset of the container's client area within its model bounds
    fn client_area_offset(&self) -> Point;

    fn grid_step(&self, axis: Axis) -> i32;

    fn is_free_snap_enabled(&self) -> bool;

    fn is_grid_snap_enabled(&self) -> bool;

    /// When true, all snapping is suppressed for the current interaction
    fn is_suppressing_snap(&self) -> bool;

    /// Model bounds translated into client-area coordinates
    fn translated_bounds(&self, widget: WidgetId) -> Option<Rect> {
        self.model_bounds(widget)
            .map(|b| translated(b, self.client_area_offset()))
    }
}

/// Handle of one transient feedback figure, removable via
/// [`FeedbackSink::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedbackHandle(pub u64);

/// Factory for transient visual markers shown while a snap point is
/// engaged. The engine removes all previously added feedback before
/// drawing feedback for the next query.
pub trait FeedbackSink {
    fn horizontal_line(&mut self, y: i32, x: i32, width: i32) -> FeedbackHandle;

    fn vertical_line(&mut self, x: i32, y: i32, height: i32) -> FeedbackHandle;

    /// Dashed center line of a horizontal size match
    fn horizontal_middle_line(&mut self, y: i32, x: i32, width: i32) -> FeedbackHandle;

    /// Dashed center line of a vertical size match
    fn vertical_middle_line(&mut self, x: i32, y: i32, height: i32) -> FeedbackHandle;

    fn outline(&mut self, bounds: Rect) -> FeedbackHandle;

    fn remove(&mut self, handle: FeedbackHandle);
}

/// The structural effect of the engine: attachment commands against the
/// external constraint-based layout model.
///
/// Any method may fail with an implementation-defined [`LayoutError`]; the
/// engine propagates such failures unchanged and performs no retries.
pub trait LayoutCommands {
    fn is_attached(&self, widget: WidgetId, side: Side) -> Result<bool, LayoutError>;

    fn detach(&mut self, widget: WidgetId, side: Side) -> Result<(), LayoutError>;

    /// Attach `widget`'s `side` at gap `distance` from `target`'s opposite
    /// side (widgets placed one after another).
    fn attach_sequentially(
        &mut self,
        widget: WidgetId,
        target: WidgetId,
        side: Side,
        distance: i32,
    ) -> Result<(), LayoutError>;

    /// Attach `widget`'s `side` at offset `distance` from `target`'s same
    /// side (widgets aligned side by side).
    fn attach_parallelly(
        &mut self,
        widget: WidgetId,
        target: WidgetId,
        side: Side,
        distance: i32,
    ) -> Result<(), LayoutError>;

    fn attach_baseline(&mut self, widget: WidgetId, target: WidgetId) -> Result<(), LayoutError>;

    /// Container-relative attachment of `widget`'s `side` at `distance`
    /// from the corresponding container edge.
    fn attach_absolute(
        &mut self,
        widget: WidgetId,
        side: Side,
        distance: i32,
    ) -> Result<(), LayoutError>;

    /// The widget that `widget`'s `side` is attached to; `None` when not
    /// attached or attached to the container.
    fn attached_widget(
        &self,
        widget: WidgetId,
        side: Side,
    ) -> Result<Option<WidgetId>, LayoutError>;

    fn adjust_attachment_offset(
        &mut self,
        widget: WidgetId,
        side: Side,
        delta: i32,
    ) -> Result<(), LayoutError>;

    /// Give the widget an explicit size on the resizing axis, freeing it
    /// from being purely attachment-derived. `fixed_side` stays anchored;
    /// `resizing_side` is the dragged side; `size_delta` is the change
    /// relative to the old size.
    fn set_explicit_size(
        &mut self,
        widget: WidgetId,
        fixed_side: Side,
        resizing_side: Side,
        size_delta: i32,
    ) -> Result<(), LayoutError>;

    /// Push computed model bounds into the widget model after a commit
    fn apply_bounds(&mut self, widget: WidgetId, bounds: Rect) -> Result<(), LayoutError>;
}
