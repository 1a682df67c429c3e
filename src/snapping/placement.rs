//! Placement inference and commit
//!
//! The placement engine orchestrates one interactive operation at a time:
//! drag queries run the snap engine and derive a per-axis [`PlacementInfo`]
//! (attachment type, neighbors, overlaps, distances); commit turns that
//! scratch state into an ordered sequence of attachment commands against
//! the external layout model, then re-anchors affected siblings and breaks
//! any attachment cycles the commit created.
//!
//! All per-operation state is private scratch, reset by `cleanup()`; a new
//! operation never starts before the previous one finished.

use std::collections::HashMap;

use tracing::debug;

use crate::geometry::{Point, Rect, Transposer};

use super::config::SnapConfig;
use super::cycles;
use super::engine::{AxisSnap, SnapEngine, SnapOutcome};
use super::error::LayoutError;
use super::provider::{FeedbackSink, LayoutCommands, VisualDataProvider};
use super::types::{
    AlignAnchor, AttachmentType, Axis, Direction, DistributeTarget, PlacementInfo,
    ComponentAttachmentInfo, ResizeDirection, Side, WidgetId,
};

/// Drives move/resize/create/delete/align/distribute operations against
/// the three collaborator seams.
///
/// Owns the snap engine and the per-operation scratch state. Single
/// threaded by design; one operation runs to `commit`/`delete`/`cleanup`
/// before the next starts.
pub struct PlacementEngine<P, F, C>
where
    P: VisualDataProvider,
    F: FeedbackSink,
    C: LayoutCommands,
{
    provider: P,
    feedback: F,
    commands: C,
    snap: SnapEngine,
    /// All widgets under management
    widgets: Vec<WidgetId>,
    /// Widgets of the in-progress operation
    operating: Vec<WidgetId>,
    deleting: bool,
    creating: bool,
    resize_direction: ResizeDirection,
    horizontal: PlacementInfo,
    vertical: PlacementInfo,
    /// Union bounds of the operating widgets, updated by every drag
    bounds: Rect,
    new_bounds: HashMap<WidgetId, Rect>,
    old_bounds: HashMap<WidgetId, Rect>,
    effective: HashMap<(WidgetId, Axis), Direction>,
}

impl<P, F, C> PlacementEngine<P, F, C>
where
    P: VisualDataProvider,
    F: FeedbackSink,
    C: LayoutCommands,
{
    pub fn new(provider: P, feedback: F, commands: C, config: SnapConfig) -> Self {
        Self {
            provider,
            feedback,
            commands,
            snap: SnapEngine::new(config),
            widgets: Vec::new(),
            operating: Vec::new(),
            deleting: false,
            creating: false,
            resize_direction: ResizeDirection::NONE,
            horizontal: PlacementInfo::new(),
            vertical: PlacementInfo::new(),
            bounds: Rect::default(),
            new_bounds: HashMap::new(),
            old_bounds: HashMap::new(),
            effective: HashMap::new(),
        }
    }

    /// Replace the managed widget set, rebuilding the snap point lists
    pub fn update_widgets(&mut self, widgets: &[WidgetId]) {
        self.widgets = widgets.to_vec();
        self.snap.update_widgets(widgets);
    }

    /// Union bounds after the last drag query
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn commands(&self) -> &C {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut C {
        &mut self.commands
    }

    ////////////////////////////////////////////////////////////////////
    // Drag
    ////////////////////////////////////////////////////////////////////

    /// One drag step for a single widget. A widget without model bounds is
    /// treated as being created.
    pub fn drag_widget(
        &mut self,
        mouse: Point,
        widget: WidgetId,
        widget_bounds: Rect,
        resize_direction: ResizeDirection,
    ) {
        self.resize_direction = resize_direction;
        self.creating = self.provider.model_bounds(widget).is_none();
        self.operating = vec![widget];
        self.bounds = widget_bounds;
        let outcome = self.snap.process_bounds(
            &self.provider,
            &mut self.feedback,
            mouse,
            &[widget],
            &mut self.bounds,
            resize_direction,
        );
        self.run_inference(&outcome);
        self.new_bounds.insert(widget, self.bounds);
    }

    /// One drag step for several widgets. `relative_bounds[i]` is the
    /// bounds of `widgets[i]` relative to the union origin; widget edges
    /// touching the union edge are pinned to it while resizing.
    pub fn drag_widgets(
        &mut self,
        mouse: Point,
        widgets: &[WidgetId],
        union_bounds: Rect,
        relative_bounds: &[Rect],
        resize_direction: ResizeDirection,
    ) {
        debug_assert_eq!(widgets.len(), relative_bounds.len());
        self.resize_direction = resize_direction;
        self.creating = false;
        self.operating = widgets.to_vec();
        self.bounds = union_bounds;
        let outcome = self.snap.process_bounds(
            &self.provider,
            &mut self.feedback,
            mouse,
            widgets,
            &mut self.bounds,
            resize_direction,
        );
        self.run_inference(&outcome);
        for (&widget, relative) in widgets.iter().zip(relative_bounds) {
            let mut model = Rect::new(
                self.bounds.x + relative.x,
                self.bounds.y + relative.y,
                relative.width,
                relative.height,
            );
            if resize_direction.has_axis(Axis::Horizontal) {
                model.set_right(self.bounds.right());
            }
            if resize_direction.has_axis(Axis::Vertical) {
                model.set_bottom(self.bounds.bottom());
            }
            self.new_bounds.insert(widget, model);
        }
    }

    fn run_inference(&mut self, outcome: &SnapOutcome) {
        self.horizontal.cleanup();
        self.vertical.cleanup();
        let remaining = self.remaining_widgets();
        let indent = self.snap.config().indent;
        infer_axis(
            &self.provider,
            indent,
            &remaining,
            self.bounds,
            Axis::Horizontal,
            &outcome.horizontal,
            &mut self.horizontal,
        );
        infer_axis(
            &self.provider,
            indent,
            &remaining,
            self.bounds,
            Axis::Vertical,
            &outcome.vertical,
            &mut self.vertical,
        );
    }

    ////////////////////////////////////////////////////////////////////
    // Committing operations
    ////////////////////////////////////////////////////////////////////

    /// Commit the dragged placement as attachment commands
    pub fn commit(&mut self) -> Result<(), LayoutError> {
        self.do_commit()?;
        self.cleanup();
        Ok(())
    }

    /// Commit and register the created widgets into the managed set
    pub fn commit_add(&mut self) -> Result<(), LayoutError> {
        self.do_commit()?;
        let operating = self.operating.clone();
        for widget in operating {
            if !self.widgets.contains(&widget) {
                self.widgets.push(widget);
            }
        }
        let widgets = self.widgets.clone();
        self.snap.update_widgets(&widgets);
        self.cleanup();
        Ok(())
    }

    /// Remove widgets, re-anchoring everything that referenced them
    pub fn delete(&mut self, widgets: &[WidgetId]) -> Result<(), LayoutError> {
        self.operating = widgets.to_vec();
        self.deleting = true;
        self.preprocess()?;
        self.postprocess()?;
        self.widgets.retain(|w| !widgets.contains(w));
        let remaining = self.widgets.clone();
        self.snap.update_widgets(&remaining);
        self.cleanup();
        Ok(())
    }

    /// Remove all transient feedback without committing
    pub fn clear_feedbacks(&mut self) {
        self.snap.clear_feedbacks(&mut self.feedback);
    }

    /// Reset all per-operation scratch state
    pub fn cleanup(&mut self) {
        self.operating.clear();
        self.resize_direction = ResizeDirection::NONE;
        self.creating = false;
        self.deleting = false;
        self.horizontal.cleanup();
        self.vertical.cleanup();
        self.new_bounds.clear();
        self.old_bounds.clear();
        self.effective.clear();
        self.snap.clear_feedbacks(&mut self.feedback);
        self.snap.reset();
    }

    fn do_commit(&mut self) -> Result<(), LayoutError> {
        self.preprocess()?;
        if self.resize_direction.is_resizing() {
            if self.creating {
                self.place()?;
            }
            if let Some(&first) = self.operating.first() {
                if self.resize_direction.has_axis(Axis::Horizontal) {
                    self.resize_widget(first, Axis::Horizontal)?;
                }
                if self.resize_direction.has_axis(Axis::Vertical) {
                    self.resize_widget(first, Axis::Vertical)?;
                }
            }
        } else {
            self.place()?;
        }
        self.postprocess()
    }

    ////////////////////////////////////////////////////////////////////
    // Placing
    ////////////////////////////////////////////////////////////////////

    fn place(&mut self) -> Result<(), LayoutError> {
        let operating = self.operating.clone();
        for widget in operating {
            self.place_single(widget, Axis::Horizontal)?;
            self.place_single(widget, Axis::Vertical)?;
        }
        Ok(())
    }

    fn place_single(&mut self, widget: WidgetId, axis: Axis) -> Result<(), LayoutError> {
        let info = self.info(axis).clone();
        if info.is_overlapped() {
            debug!(
                widget = widget.0,
                ?axis,
                leading = info.overlappings.leading.len(),
                trailing = info.overlappings.trailing.len(),
                "overlapping placement, applying absolute fallback"
            );
            return self.place_overlapped(widget, axis);
        }
        if info.attached_widget.is_none() {
            self.place_freely(widget, &info, axis)
        } else {
            self.place_attached(widget, &info, axis)
        }
    }

    /// Attach the dragged side to the snapped anchor, sequentially when the
    /// anchor is also the measured neighbor, parallelly (or by baseline)
    /// otherwise; then propagate the move delta to the opposite side or
    /// release it.
    fn place_attached(
        &mut self,
        widget: WidgetId,
        info: &PlacementInfo,
        axis: Axis,
    ) -> Result<(), LayoutError> {
        let Some(attached) = info.attached_widget else {
            return Ok(());
        };
        let direction = info.direction.or(Direction::Leading);
        let side = Side::of(axis, direction);
        let opposite = side.opposite();
        let attached_both = self.commands.is_attached(widget, side)?
            && self.commands.is_attached(widget, opposite)?;
        self.commands.detach(widget, side)?;
        if Some(attached) == *info.neighbors.get(direction) {
            self.commands
                .attach_sequentially(widget, attached, side, *info.distances.get(direction))?;
        } else if info.attachment_type == AttachmentType::Baseline {
            self.commands.attach_baseline(widget, attached)?;
        } else {
            let distance = if info.attachment_type == AttachmentType::ComponentWithOffset {
                *info.distances.get(direction)
            } else {
                0
            };
            self.commands
                .attach_parallelly(widget, attached, side, distance)?;
        }
        if attached_both {
            let delta = self.move_delta(widget, axis);
            self.commands.adjust_attachment_offset(widget, opposite, delta)?;
        } else if info.attachment_type == AttachmentType::Baseline {
            // baseline ties the top, the bottom must not stay pinned
            self.commands.detach(widget, Side::Bottom)?;
        } else {
            self.commands.detach(widget, opposite)?;
        }
        Ok(())
    }

    /// No snapped anchor: attach whichever direction measured the smaller
    /// distance, to its neighbor or to the container.
    fn place_freely(
        &mut self,
        widget: WidgetId,
        info: &PlacementInfo,
        axis: Axis,
    ) -> Result<(), LayoutError> {
        let alignment = if info.distances.trailing < info.distances.leading {
            Direction::Trailing
        } else {
            Direction::Leading
        };
        self.place_freely_using_alignment(widget, info, axis, alignment)
    }

    fn place_freely_using_alignment(
        &mut self,
        widget: WidgetId,
        info: &PlacementInfo,
        axis: Axis,
        alignment: Direction,
    ) -> Result<(), LayoutError> {
        let alignment = alignment.or(Direction::Leading);
        let side = Side::of(axis, alignment);
        let opposite = side.opposite();
        let attached_both = self.commands.is_attached(widget, side)?
            && self.commands.is_attached(widget, opposite)?;
        if !self.attached_within_operating(widget, side)? {
            self.commands.detach(widget, side)?;
            let distance = *info.distances.get(alignment)
                + self.relative_distance(widget, axis, alignment == Direction::Leading);
            match *info.neighbors.get(alignment) {
                None => self.commands.attach_absolute(widget, side, distance)?,
                Some(neighbor) => {
                    self.commands
                        .attach_sequentially(widget, neighbor, side, distance)?
                }
            }
        }
        if attached_both {
            let delta = self.move_delta(widget, axis);
            self.commands.adjust_attachment_offset(widget, opposite, delta)?;
        } else if !self.attached_within_operating(widget, opposite)? {
            // attachments within the operating set stay untouched
            self.commands.detach(widget, opposite)?;
        }
        Ok(())
    }

    /// Overlap fallback: keep the widget where it is by attaching the side
    /// nearer the container edge absolutely, releasing the other side.
    fn place_overlapped(&mut self, widget: WidgetId, axis: Axis) -> Result<(), LayoutError> {
        let t = Transposer::for_axis(axis);
        let bounds = self
            .new_bounds
            .get(&widget)
            .copied()
            .or_else(|| self.provider.translated_bounds(widget))
            .unwrap_or(self.bounds);
        let tb = t.rect(bounds);
        let container = t.size(self.provider.container_size()).width;
        let leading_distance = tb.x;
        let trailing_distance = container - tb.right();
        let (side, distance) = if leading_distance <= trailing_distance {
            (Side::of(axis, Direction::Leading), leading_distance)
        } else {
            (Side::of(axis, Direction::Trailing), trailing_distance)
        };
        let opposite = side.opposite();
        self.commands.detach(widget, side)?;
        self.commands.attach_absolute(widget, side, distance)?;
        if !self.attached_within_operating(widget, opposite)? {
            self.commands.detach(widget, opposite)?;
        }
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////
    // Resizing
    ////////////////////////////////////////////////////////////////////

    fn resize_widget(&mut self, widget: WidgetId, axis: Axis) -> Result<(), LayoutError> {
        let info = self.info(axis).clone();
        let Some(side) = self.resize_direction.side(axis) else {
            return Ok(());
        };
        let opposite = side.opposite();
        let delta = self.resize_delta(widget, axis);
        let attached_side = self.commands.is_attached(widget, side)?;
        let attached_opposite = self.commands.is_attached(widget, opposite)?;
        if info.is_overlapped() {
            debug!(
                widget = widget.0,
                ?axis,
                "overlapping resize, applying absolute fallback"
            );
            self.place_overlapped(widget, axis)?;
            self.commands.set_explicit_size(widget, opposite, side, delta)?;
            return Ok(());
        }
        match info.attached_widget {
            None => {
                if attached_side && attached_opposite {
                    self.adjust_offset_on_resize(widget, side, delta)?;
                } else if info.attachment_type == AttachmentType::Container
                    && !self.creating
                    && !attached_side
                {
                    self.commands.attach_absolute(
                        widget,
                        side,
                        *info.distances.get(side.direction()),
                    )?;
                } else {
                    let fixed = if attached_side { side } else { opposite };
                    self.commands.set_explicit_size(widget, fixed, side, delta)?;
                    if attached_side && !self.creating {
                        self.adjust_offset_on_resize(widget, side, delta)?;
                    }
                }
            }
            Some(attached) => {
                let direction = info.direction.or(Direction::Leading);
                let distance = *info.distances.get(direction);
                if Some(attached) == *info.neighbors.get(direction) {
                    self.commands
                        .attach_sequentially(widget, attached, side, distance)?;
                } else {
                    let offset = if info.attachment_type == AttachmentType::ComponentWithOffset {
                        distance
                    } else {
                        0
                    };
                    self.commands
                        .attach_parallelly(widget, attached, side, offset)?;
                }
                if !attached_opposite {
                    let fixed = if attached_side { side } else { opposite };
                    self.commands.set_explicit_size(widget, fixed, side, delta)?;
                }
            }
        }
        Ok(())
    }

    /// Stored offsets are measured from the near container edge, so a
    /// leading-side resize moves against the offset sign.
    fn adjust_offset_on_resize(
        &mut self,
        widget: WidgetId,
        side: Side,
        delta: i32,
    ) -> Result<(), LayoutError> {
        let delta = if side.is_leading() { -delta } else { delta };
        self.commands.adjust_attachment_offset(widget, side, delta)
    }

    fn resize_delta(&self, widget: WidgetId, axis: Axis) -> i32 {
        let new = self.new_bounds.get(&widget).copied().unwrap_or(self.bounds);
        let old_size = self
            .old_bounds
            .get(&widget)
            .map(|b| b.size())
            .unwrap_or_else(|| self.provider.preferred_size(widget));
        match axis {
            Axis::Horizontal => new.width - old_size.width,
            Axis::Vertical => new.height - old_size.height,
        }
    }

    ////////////////////////////////////////////////////////////////////
    // Alignment / distribution commands
    ////////////////////////////////////////////////////////////////////

    /// Align every widget after the first to the first (sample) widget
    pub fn align(
        &mut self,
        widgets: &[WidgetId],
        axis: Axis,
        anchor: AlignAnchor,
    ) -> Result<(), LayoutError> {
        let Some((&sample, rest)) = widgets.split_first() else {
            return Ok(());
        };
        self.operating = widgets.to_vec();
        self.preprocess()?;
        for &widget in rest {
            let info = self.prepare_align_info(sample, widget, axis, anchor)?;
            self.place_attached(widget, &info, axis)?;
        }
        self.postprocess()?;
        self.cleanup();
        Ok(())
    }

    fn prepare_align_info(
        &mut self,
        sample: WidgetId,
        widget: WidgetId,
        axis: Axis,
        anchor: AlignAnchor,
    ) -> Result<PlacementInfo, LayoutError> {
        let t = Transposer::for_axis(axis);
        let sample_bounds = t.rect(
            self.provider
                .translated_bounds(sample)
                .ok_or(LayoutError::UnknownWidget(sample))?,
        );
        let mut aligning = t.rect(
            self.provider
                .translated_bounds(widget)
                .ok_or(LayoutError::UnknownWidget(widget))?,
        );
        let mut info = PlacementInfo::new();
        info.attached_widget = Some(sample);
        info.attachment_type = AttachmentType::Component;
        match anchor {
            AlignAnchor::Center => {
                info.attachment_type = AttachmentType::ComponentWithOffset;
                info.direction = Direction::Leading;
                let distance = sample_bounds.width / 2 - aligning.width / 2;
                info.distances.leading = distance;
                aligning.x = sample_bounds.x + distance;
            }
            AlignAnchor::Leading => {
                info.direction = Direction::Leading;
                aligning.x = sample_bounds.x;
            }
            AlignAnchor::Trailing => {
                info.direction = Direction::Trailing;
                aligning.x = sample_bounds.right() - aligning.width;
            }
        }
        self.new_bounds.insert(widget, t.rect(aligning));
        Ok(info)
    }

    /// Make every widget after the first match the sample widget's size on
    /// `axis`, with the command choice driven by which sides are attached.
    pub fn replicate_size(&mut self, widgets: &[WidgetId], axis: Axis) -> Result<(), LayoutError> {
        let Some((&sample, rest)) = widgets.split_first() else {
            return Ok(());
        };
        self.operating = widgets.to_vec();
        self.preprocess()?;
        let sample_size = self.size_of(sample, axis);
        let leading_side = Side::of(axis, Direction::Leading);
        let trailing_side = Side::of(axis, Direction::Trailing);
        for &widget in rest {
            let delta = sample_size - self.size_of(widget, axis);
            let attached_leading = self.commands.is_attached(widget, leading_side)?;
            let attached_trailing = self.commands.is_attached(widget, trailing_side)?;
            if attached_leading && attached_trailing {
                self.commands
                    .adjust_attachment_offset(widget, trailing_side, delta)?;
            } else if attached_leading {
                self.commands
                    .set_explicit_size(widget, leading_side, trailing_side, delta)?;
            } else if attached_trailing {
                self.commands
                    .set_explicit_size(widget, trailing_side, leading_side, delta)?;
            } else {
                // unattached widgets get pinned where they are first
                let t = Transposer::for_axis(axis);
                let position = self
                    .provider
                    .translated_bounds(widget)
                    .map(|b| t.rect(b).x)
                    .unwrap_or(0);
                self.commands.attach_absolute(widget, leading_side, position)?;
                self.commands
                    .set_explicit_size(widget, leading_side, trailing_side, delta)?;
            }
        }
        for &widget in rest {
            self.operating = vec![widget];
            self.postprocess()?;
        }
        self.cleanup();
        Ok(())
    }

    /// Center each widget in the container client area on `axis`
    pub fn center(&mut self, widgets: &[WidgetId], axis: Axis) -> Result<(), LayoutError> {
        let t = Transposer::for_axis(axis);
        for &widget in widgets {
            let bounds = self
                .provider
                .translated_bounds(widget)
                .ok_or(LayoutError::UnknownWidget(widget))?;
            let tb = t.rect(bounds);
            let container = t.size(self.provider.container_size()).width;
            let position = (container - tb.width) / 2;
            self.move_to(widget, t.point(Point::new(position, tb.y)))?;
        }
        Ok(())
    }

    /// Spread widgets evenly along `axis`, either across the client area
    /// or between the outermost widgets of the selection.
    pub fn distribute_space(
        &mut self,
        widgets: &[WidgetId],
        axis: Axis,
        target: DistributeTarget,
    ) -> Result<(), LayoutError> {
        if widgets.is_empty() {
            return Ok(());
        }
        let t = Transposer::for_axis(axis);
        let mut items = Vec::with_capacity(widgets.len());
        for &widget in widgets {
            let bounds = self
                .provider
                .translated_bounds(widget)
                .ok_or(LayoutError::UnknownWidget(widget))?;
            items.push((widget, t.rect(bounds)));
        }
        items.sort_by_key(|(_, b)| b.x);
        let total_width: i32 = items.iter().map(|(_, b)| b.width).sum();
        let count = items.len() as i32;
        let container = t.size(self.provider.container_size()).width;
        let (space, mut x) = match target {
            DistributeTarget::Selection if count > 2 => {
                let first = items[0].1;
                let last = items[items.len() - 1].1;
                let total = last.right() - first.x;
                ((total - total_width) / (count - 1), first.x)
            }
            _ => {
                let space = (container - total_width) / (count + 1);
                (space, space)
            }
        };
        for (widget, bounds) in items {
            self.move_to(widget, t.point(Point::new(x, bounds.y)))?;
            x += bounds.width + space;
        }
        Ok(())
    }

    /// Attach one side of a widget (layout action entry point), keeping
    /// its size when it was stretched between both sides before.
    pub fn set_alignment(&mut self, widget: WidgetId, side: Side) -> Result<(), LayoutError> {
        self.operating = vec![widget];
        self.preprocess()?;
        let axis = side.axis();
        let opposite = side.opposite();
        let attached_side = self.commands.is_attached(widget, side)?;
        let attached_opposite = self.commands.is_attached(widget, opposite)?;
        if !attached_side {
            let info = self.neighbors_of(widget, axis);
            self.place_freely_using_alignment(widget, &info, axis, side.direction())?;
        }
        if attached_opposite {
            self.commands.detach(widget, opposite)?;
            self.commands.set_explicit_size(widget, side, opposite, 0)?;
        }
        self.postprocess()?;
        self.cleanup();
        Ok(())
    }

    /// Attach both sides of a widget on `axis` so it stretches with the
    /// container.
    pub fn set_resizeable(&mut self, widget: WidgetId, axis: Axis) -> Result<(), LayoutError> {
        self.operating = vec![widget];
        self.preprocess()?;
        let leading_side = Side::of(axis, Direction::Leading);
        let trailing_side = Side::of(axis, Direction::Trailing);
        let attached_leading = self.commands.is_attached(widget, leading_side)?;
        let attached_trailing = self.commands.is_attached(widget, trailing_side)?;
        let info = self.neighbors_of(widget, axis);
        if !attached_leading {
            self.attach_side(widget, &info, leading_side)?;
        }
        if !attached_trailing {
            self.attach_side(widget, &info, trailing_side)?;
        }
        self.postprocess()?;
        self.cleanup();
        Ok(())
    }

    /// Move one widget to an absolute position through the normal
    /// drag/commit pipeline, without snapping.
    fn move_to(&mut self, widget: WidgetId, position: Point) -> Result<(), LayoutError> {
        let current = self
            .provider
            .translated_bounds(widget)
            .ok_or(LayoutError::UnknownWidget(widget))?;
        self.operating = vec![widget];
        self.resize_direction = ResizeDirection::NONE;
        self.creating = false;
        self.bounds = Rect::from_point_size(position, current.size());
        let outcome = SnapOutcome {
            horizontal: AxisSnap {
                direction: calc_direction(current.x, position.x),
                engaged: None,
            },
            vertical: AxisSnap {
                direction: calc_direction(current.y, position.y),
                engaged: None,
            },
        };
        self.run_inference(&outcome);
        self.new_bounds.insert(widget, self.bounds);
        self.do_commit()?;
        self.cleanup();
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////
    // Pre/postprocessing
    ////////////////////////////////////////////////////////////////////

    /// Cache effective alignments and pre-operation bounds for every
    /// widget; must run before any bounds are mutated.
    fn preprocess(&mut self) -> Result<(), LayoutError> {
        let widgets = self.widgets.clone();
        for widget in widgets {
            let horizontal = self.find_effective_alignment(widget, Axis::Horizontal)?;
            let vertical = self.find_effective_alignment(widget, Axis::Vertical)?;
            self.effective.insert((widget, Axis::Horizontal), horizontal);
            self.effective.insert((widget, Axis::Vertical), vertical);
            if let Some(bounds) = self.provider.translated_bounds(widget) {
                self.old_bounds.insert(widget, bounds);
            }
        }
        Ok(())
    }

    fn postprocess(&mut self) -> Result<(), LayoutError> {
        self.apply_new_bounds()?;
        self.keep_widget_positions()?;
        let non_deleted = self.non_deleted_widgets();
        let operating = self.operating.clone();
        cycles::resolve_cycles(
            &self.provider,
            &mut self.commands,
            &non_deleted,
            &operating,
            Axis::Horizontal,
        )?;
        cycles::resolve_cycles(
            &self.provider,
            &mut self.commands,
            &non_deleted,
            &operating,
            Axis::Vertical,
        )
    }

    fn apply_new_bounds(&mut self) -> Result<(), LayoutError> {
        let offset = self.provider.client_area_offset();
        let operating = self.operating.clone();
        for widget in operating {
            if let Some(bounds) = self.new_bounds.get(&widget).copied() {
                self.commands
                    .apply_bounds(widget, bounds.translated(offset.x, offset.y))?;
            }
        }
        Ok(())
    }

    /// Re-anchor every non-operating widget attached to an operating
    /// widget, keeping its cached effective alignment, so nothing is left
    /// stranded by a move/resize/delete.
    fn keep_widget_positions(&mut self) -> Result<(), LayoutError> {
        let affected = self.find_affected_widgets()?;
        for edge in affected {
            let axis = edge.side.axis();
            let info = self.neighbors_of(edge.source, axis);
            let alignment = self
                .effective
                .get(&(edge.source, axis))
                .copied()
                .unwrap_or(Direction::Leading);
            self.reanchor(edge.source, &info, axis, alignment)?;
        }
        Ok(())
    }

    fn find_affected_widgets(&self) -> Result<Vec<ComponentAttachmentInfo>, LayoutError> {
        let mut affected = Vec::new();
        for &remaining in &self.widgets {
            if self.operating.contains(&remaining) {
                continue;
            }
            for &operating in &self.operating {
                for side in [Side::Left, Side::Right, Side::Top, Side::Bottom] {
                    if self.commands.attached_widget(remaining, side)? == Some(operating) {
                        affected.push(ComponentAttachmentInfo::new(remaining, operating, side));
                    }
                }
            }
        }
        Ok(affected)
    }

    /// Re-attachment used for affected (non-operating) widgets: the
    /// effective-alignment side is re-attached from fresh neighbor data,
    /// the opposite side only when the widget was stretched.
    fn reanchor(
        &mut self,
        widget: WidgetId,
        info: &PlacementInfo,
        axis: Axis,
        alignment: Direction,
    ) -> Result<(), LayoutError> {
        let side = Side::of(axis, alignment.or(Direction::Leading));
        let opposite = side.opposite();
        let stretched = self.commands.is_attached(widget, side)?
            && self.commands.is_attached(widget, opposite)?;
        self.commands.detach(widget, side)?;
        self.attach_side(widget, info, side)?;
        self.commands.detach(widget, opposite)?;
        if stretched {
            self.attach_side(widget, info, opposite)?;
        }
        Ok(())
    }

    fn attach_side(
        &mut self,
        widget: WidgetId,
        info: &PlacementInfo,
        side: Side,
    ) -> Result<(), LayoutError> {
        let direction = side.direction();
        let distance = *info.distances.get(direction);
        match *info.neighbors.get(direction) {
            None => self.commands.attach_absolute(widget, side, distance),
            Some(neighbor) => self
                .commands
                .attach_sequentially(widget, neighbor, side, distance),
        }
    }

    ////////////////////////////////////////////////////////////////////
    // Effective alignment
    ////////////////////////////////////////////////////////////////////

    /// The side of a widget that stays fixed when the container resizes.
    /// Exactly one of Leading/Trailing for any attachment configuration:
    /// single-side attachments win directly, otherwise the nearer neighbor
    /// or container edge decides.
    fn find_effective_alignment(
        &self,
        widget: WidgetId,
        axis: Axis,
    ) -> Result<Direction, LayoutError> {
        let leading = self.is_aligned_to_side(widget, Side::of(axis, Direction::Leading))?;
        let trailing = self.is_aligned_to_side(widget, Side::of(axis, Direction::Trailing))?;
        if leading ^ trailing {
            return Ok(if leading {
                Direction::Leading
            } else {
                Direction::Trailing
            });
        }
        let info = self.neighbors_of(widget, axis);
        Ok(if info.distances.leading < info.distances.trailing {
            Direction::Leading
        } else {
            Direction::Trailing
        })
    }

    /// Whether following the attachment chain from `widget` along `side`
    /// ends attached to the container on that side.
    fn is_aligned_to_side(&self, widget: WidgetId, side: Side) -> Result<bool, LayoutError> {
        let mut current = widget;
        let mut visited = vec![widget];
        loop {
            match self.commands.attached_widget(current, side)? {
                Some(next) => {
                    // unresolved cycles end the walk unaligned
                    if visited.contains(&next) {
                        return Ok(false);
                    }
                    visited.push(next);
                    current = next;
                }
                None => return self.commands.is_attached(current, side),
            }
        }
    }

    /// Neighbor data for a single widget outside any drag; shares the
    /// scan with the drag path.
    fn neighbors_of(&self, widget: WidgetId, axis: Axis) -> PlacementInfo {
        let mut info = PlacementInfo::new();
        let Some(bounds) = self.provider.translated_bounds(widget) else {
            return info;
        };
        let candidates: Vec<WidgetId> = self
            .non_deleted_widgets()
            .into_iter()
            .filter(|w| *w != widget)
            .collect();
        scan_neighbors(&self.provider, &candidates, bounds, axis, &mut info);
        info
    }

    ////////////////////////////////////////////////////////////////////
    // Small helpers
    ////////////////////////////////////////////////////////////////////

    fn info(&self, axis: Axis) -> &PlacementInfo {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }

    fn attached_within_operating(
        &self,
        widget: WidgetId,
        side: Side,
    ) -> Result<bool, LayoutError> {
        Ok(match self.commands.attached_widget(widget, side)? {
            Some(target) => self.operating.contains(&target),
            None => false,
        })
    }

    /// Widgets not part of the in-progress operation
    fn remaining_widgets(&self) -> Vec<WidgetId> {
        self.widgets
            .iter()
            .copied()
            .filter(|w| !self.operating.contains(w))
            .collect()
    }

    /// All widgets, minus the operating ones during a delete
    fn non_deleted_widgets(&self) -> Vec<WidgetId> {
        if self.deleting {
            self.remaining_widgets()
        } else {
            self.widgets.clone()
        }
    }

    /// Current size on `axis`, falling back to the preferred size for
    /// widgets without model bounds
    fn size_of(&self, widget: WidgetId, axis: Axis) -> i32 {
        let t = Transposer::for_axis(axis);
        match self.provider.translated_bounds(widget) {
            Some(bounds) => t.rect(bounds).width,
            None => t.size(self.provider.preferred_size(widget)).width,
        }
    }

    fn move_delta(&self, widget: WidgetId, axis: Axis) -> i32 {
        let (Some(new), Some(old)) = (
            self.new_bounds.get(&widget).copied(),
            self.provider.translated_bounds(widget),
        ) else {
            return 0;
        };
        match axis {
            Axis::Horizontal => new.x - old.x,
            Axis::Vertical => new.y - old.y,
        }
    }

    /// Offset of one widget inside the union bounds, preserved when a
    /// whole group is attached through its alignment side.
    fn relative_distance(&self, widget: WidgetId, axis: Axis, leading: bool) -> i32 {
        if self.operating.len() <= 1 {
            return 0;
        }
        let t = Transposer::for_axis(axis);
        let new = t.rect(self.new_bounds.get(&widget).copied().unwrap_or(self.bounds));
        let union = t.rect(self.bounds);
        if leading {
            new.x - union.x
        } else {
            union.right() - new.right()
        }
    }
}

fn calc_direction(from: i32, to: i32) -> Direction {
    if from >= to {
        Direction::Leading
    } else {
        Direction::Trailing
    }
}

/// Derive one axis of placement scratch from the snap outcome, then run
/// the neighbor and overlap scans.
fn infer_axis<P>(
    provider: &P,
    indent: i32,
    remaining: &[WidgetId],
    bounds: Rect,
    axis: Axis,
    snap: &AxisSnap,
    info: &mut PlacementInfo,
) where
    P: VisualDataProvider + ?Sized,
{
    info.direction = snap.direction;
    info.attachment_type = AttachmentType::Free;
    if let Some(point) = snap.engaged {
        info.attachment_type = point.attachment;
        match point.attachment {
            AttachmentType::Component => {
                info.attached_widget = point.anchor;
                // the widget-side direction of the engaged edge governs
                // the attachment, not the raw mouse direction
                let direction = if point.gap != 0 {
                    point.side.direction().opposite()
                } else {
                    point.side.direction()
                };
                info.direction = direction;
                if point.gap != 0 {
                    *info.neighbors.get_mut(direction) = point.anchor;
                    *info.distances.get_mut(direction) = point.gap;
                }
            }
            AttachmentType::ComponentWithOffset => {
                info.attached_widget = point.anchor;
                info.direction = Direction::Leading;
                info.distances.leading = indent;
            }
            AttachmentType::Baseline => {
                info.attached_widget = point.anchor;
                info.direction = Direction::Leading;
            }
            AttachmentType::Container | AttachmentType::Free => {}
        }
    }
    scan_neighbors(provider, remaining, bounds, axis, info);
    scan_overlappings(provider, remaining, bounds, axis, info);
}

/// Closest non-overlapping sibling per direction, with a container-edge
/// distance fallback when there is none.
fn scan_neighbors<P>(
    provider: &P,
    candidates: &[WidgetId],
    bounds: Rect,
    axis: Axis,
    info: &mut PlacementInfo,
) where
    P: VisualDataProvider + ?Sized,
{
    scan_neighbor(provider, candidates, bounds, axis, Direction::Leading, info);
    scan_neighbor(provider, candidates, bounds, axis, Direction::Trailing, info);
}

fn scan_neighbor<P>(
    provider: &P,
    candidates: &[WidgetId],
    bounds: Rect,
    axis: Axis,
    direction: Direction,
    info: &mut PlacementInfo,
) where
    P: VisualDataProvider + ?Sized,
{
    // the snapped anchor may already occupy this direction
    if info.neighbors.get(direction).is_some() {
        return;
    }
    // the indent offset lives in its distance slot and must survive
    if info.attachment_type == AttachmentType::ComponentWithOffset && info.direction == direction {
        return;
    }
    let t = Transposer::for_axis(axis);
    let tb = t.rect(bounds);
    let width_span = tb.x_span();
    let height_span = tb.y_span();
    for &candidate in candidates {
        let Some(candidate_bounds) = provider.translated_bounds(candidate) else {
            continue;
        };
        let cb = t.rect(candidate_bounds);
        // a neighbor must be beside us, not above or below
        if !height_span.intersects(&cb.y_span()) {
            continue;
        }
        let candidate_span = cb.x_span();
        if candidate_span.intersects(&width_span) {
            continue;
        }
        let distance = match direction {
            Direction::Leading if candidate_span.is_leading_of(&width_span) => {
                width_span.distance(candidate_span.end())
            }
            Direction::Trailing if candidate_span.is_trailing_of(&width_span) => {
                width_span.distance(candidate_span.begin)
            }
            _ => continue,
        };
        if info.tighten(direction, distance) {
            *info.neighbors.get_mut(direction) = Some(candidate);
        }
    }
    if info.neighbors.get(direction).is_none()
        && info.attachment_type != AttachmentType::ComponentWithOffset
    {
        let container = t.size(provider.container_size()).width;
        *info.distances.get_mut(direction) = if direction == Direction::Leading {
            width_span.begin
        } else {
            container - width_span.end()
        };
    }
}

/// Siblings whose bounds overlap the operating bounds on `axis`; the
/// recorded distance is the negated intersection length.
fn scan_overlappings<P>(
    provider: &P,
    candidates: &[WidgetId],
    bounds: Rect,
    axis: Axis,
    info: &mut PlacementInfo,
) where
    P: VisualDataProvider + ?Sized,
{
    let t = Transposer::for_axis(axis);
    let tb = t.rect(bounds);
    let width_span = tb.x_span();
    let height_span = tb.y_span();
    let center = width_span.center();
    for &candidate in candidates {
        let Some(candidate_bounds) = provider.translated_bounds(candidate) else {
            continue;
        };
        let cb = t.rect(candidate_bounds);
        if !height_span.intersects(&cb.y_span()) {
            continue;
        }
        let candidate_span = cb.x_span();
        if !candidate_span.intersects(&width_span) {
            continue;
        }
        let distance = -width_span.intersection(&candidate_span).length;
        let direction = if candidate_span.center() > center {
            Direction::Trailing
        } else {
            Direction::Leading
        };
        info.overlappings.get_mut(direction).push(candidate);
        info.tighten(direction, distance);
    }
}
