//! Shared in-memory editor model for the integration tests.
//!
//! One [`Model`] plays all three engine collaborators at once; cloning the
//! [`Handle`] gives the engine its provider, feedback sink and command sink
//! views of the same state. Every received command is also recorded in a
//! journal so tests can assert on the exact command sequence.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use snapkit::geometry::{Point, Rect, Size};
use snapkit::{
    Axis, FeedbackHandle, FeedbackSink, LayoutCommands, LayoutError, Side, VisualDataProvider,
    WidgetId,
};

/// One side's attachment in the fake layout model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Absolute(i32),
    Sequential(WidgetId, i32),
    Parallel(WidgetId, i32),
    Baseline(WidgetId),
}

#[derive(Debug)]
pub struct Model {
    pub container: Size,
    pub bounds: HashMap<WidgetId, Rect>,
    pub baselines: HashMap<WidgetId, i32>,
    pub attachments: HashMap<(WidgetId, Side), Attachment>,
    pub journal: Vec<String>,
    pub component_gap: i32,
    pub container_gap: i32,
    pub grid_step: i32,
    pub free_snap: bool,
    pub grid_snap: bool,
    pub suppress: bool,
    pub live_feedbacks: Vec<FeedbackHandle>,
    next_feedback: u64,
}

impl Model {
    fn new() -> Self {
        Self {
            container: Size::new(400, 300),
            bounds: HashMap::new(),
            baselines: HashMap::new(),
            attachments: HashMap::new(),
            journal: Vec::new(),
            component_gap: 6,
            container_gap: 6,
            grid_step: 5,
            free_snap: true,
            grid_snap: false,
            suppress: false,
            live_feedbacks: Vec::new(),
            next_feedback: 0,
        }
    }
}

/// Shared view of one [`Model`]; clone it once per collaborator seam
#[derive(Clone)]
pub struct Handle(pub Rc<RefCell<Model>>);

impl Handle {
    pub fn new() -> Self {
        Handle(Rc::new(RefCell::new(Model::new())))
    }

    pub fn widget(self, id: WidgetId, bounds: Rect) -> Self {
        self.0.borrow_mut().bounds.insert(id, bounds);
        self
    }

    pub fn baseline(self, id: WidgetId, baseline: i32) -> Self {
        self.0.borrow_mut().baselines.insert(id, baseline);
        self
    }

    pub fn attached(self, id: WidgetId, side: Side, attachment: Attachment) -> Self {
        self.0.borrow_mut().attachments.insert((id, side), attachment);
        self
    }

    pub fn component_gap(self, gap: i32) -> Self {
        self.0.borrow_mut().component_gap = gap;
        self
    }

    pub fn free_snap(self, enabled: bool) -> Self {
        self.0.borrow_mut().free_snap = enabled;
        self
    }

    pub fn grid_snap(self, enabled: bool) -> Self {
        self.0.borrow_mut().grid_snap = enabled;
        self
    }

    pub fn suppress(self, enabled: bool) -> Self {
        self.0.borrow_mut().suppress = enabled;
        self
    }

    pub fn attachment(&self, id: WidgetId, side: Side) -> Option<Attachment> {
        self.0.borrow().attachments.get(&(id, side)).copied()
    }

    pub fn bounds_of(&self, id: WidgetId) -> Option<Rect> {
        self.0.borrow().bounds.get(&id).copied()
    }

    pub fn journal(&self) -> Vec<String> {
        self.0.borrow().journal.clone()
    }

    pub fn journal_contains(&self, entry: &str) -> bool {
        self.0.borrow().journal.iter().any(|line| line == entry)
    }

    pub fn live_feedback_count(&self) -> usize {
        self.0.borrow().live_feedbacks.len()
    }
}

impl VisualDataProvider for Handle {
    fn model_bounds(&self, widget: WidgetId) -> Option<Rect> {
        self.0.borrow().bounds.get(&widget).copied()
    }

    fn baseline(&self, widget: WidgetId) -> Option<i32> {
        self.0.borrow().baselines.get(&widget).copied()
    }

    fn preferred_size(&self, _widget: WidgetId) -> Size {
        Size::new(80, 25)
    }

    fn component_gap(&self, _widget: WidgetId, _target: WidgetId, _side: Side) -> i32 {
        self.0.borrow().component_gap
    }

    fn container_gap(&self, _widget: WidgetId, _side: Side) -> i32 {
        self.0.borrow().container_gap
    }

    fn container_size(&self) -> Size {
        self.0.borrow().container
    }

    fn client_area_offset(&self) -> Point {
        Point::new(0, 0)
    }

    fn grid_step(&self, _axis: Axis) -> i32 {
        self.0.borrow().grid_step
    }

    fn is_free_snap_enabled(&self) -> bool {
        self.0.borrow().free_snap
    }

    fn is_grid_snap_enabled(&self) -> bool {
        self.0.borrow().grid_snap
    }

    fn is_suppressing_snap(&self) -> bool {
        self.0.borrow().suppress
    }
}

impl FeedbackSink for Handle {
    fn horizontal_line(&mut self, _y: i32, _x: i32, _width: i32) -> FeedbackHandle {
        self.new_feedback()
    }

    fn vertical_line(&mut self, _x: i32, _y: i32, _height: i32) -> FeedbackHandle {
        self.new_feedback()
    }

    fn horizontal_middle_line(&mut self, _y: i32, _x: i32, _width: i32) -> FeedbackHandle {
        self.new_feedback()
    }

    fn vertical_middle_line(&mut self, _x: i32, _y: i32, _height: i32) -> FeedbackHandle {
        self.new_feedback()
    }

    fn outline(&mut self, _bounds: Rect) -> FeedbackHandle {
        self.new_feedback()
    }

    fn remove(&mut self, handle: FeedbackHandle) {
        self.0.borrow_mut().live_feedbacks.retain(|h| *h != handle);
    }
}

impl Handle {
    fn new_feedback(&mut self) -> FeedbackHandle {
        let mut model = self.0.borrow_mut();
        let handle = FeedbackHandle(model.next_feedback);
        model.next_feedback += 1;
        model.live_feedbacks.push(handle);
        handle
    }
}

impl LayoutCommands for Handle {
    fn is_attached(&self, widget: WidgetId, side: Side) -> Result<bool, LayoutError> {
        Ok(self.0.borrow().attachments.contains_key(&(widget, side)))
    }

    fn detach(&mut self, widget: WidgetId, side: Side) -> Result<(), LayoutError> {
        let mut model = self.0.borrow_mut();
        if model.attachments.remove(&(widget, side)).is_some() {
            model.journal.push(format!("detach({}, {:?})", widget.0, side));
        }
        Ok(())
    }

    fn attach_sequentially(
        &mut self,
        widget: WidgetId,
        target: WidgetId,
        side: Side,
        distance: i32,
    ) -> Result<(), LayoutError> {
        let mut model = self.0.borrow_mut();
        model
            .attachments
            .insert((widget, side), Attachment::Sequential(target, distance));
        model.journal.push(format!(
            "attach_sequentially({}, {}, {:?}, {})",
            widget.0, target.0, side, distance
        ));
        Ok(())
    }

    fn attach_parallelly(
        &mut self,
        widget: WidgetId,
        target: WidgetId,
        side: Side,
        distance: i32,
    ) -> Result<(), LayoutError> {
        let mut model = self.0.borrow_mut();
        model
            .attachments
            .insert((widget, side), Attachment::Parallel(target, distance));
        model.journal.push(format!(
            "attach_parallelly({}, {}, {:?}, {})",
            widget.0, target.0, side, distance
        ));
        Ok(())
    }

    fn attach_baseline(&mut self, widget: WidgetId, target: WidgetId) -> Result<(), LayoutError> {
        let mut model = self.0.borrow_mut();
        model
            .attachments
            .insert((widget, Side::Top), Attachment::Baseline(target));
        model
            .journal
            .push(format!("attach_baseline({}, {})", widget.0, target.0));
        Ok(())
    }

    fn attach_absolute(
        &mut self,
        widget: WidgetId,
        side: Side,
        distance: i32,
    ) -> Result<(), LayoutError> {
        let mut model = self.0.borrow_mut();
        model
            .attachments
            .insert((widget, side), Attachment::Absolute(distance));
        model.journal.push(format!(
            "attach_absolute({}, {:?}, {})",
            widget.0, side, distance
        ));
        Ok(())
    }

    fn attached_widget(
        &self,
        widget: WidgetId,
        side: Side,
    ) -> Result<Option<WidgetId>, LayoutError> {
        Ok(match self.0.borrow().attachments.get(&(widget, side)) {
            Some(Attachment::Sequential(target, _))
            | Some(Attachment::Parallel(target, _))
            | Some(Attachment::Baseline(target)) => Some(*target),
            Some(Attachment::Absolute(_)) | None => None,
        })
    }

    fn adjust_attachment_offset(
        &mut self,
        widget: WidgetId,
        side: Side,
        delta: i32,
    ) -> Result<(), LayoutError> {
        let mut model = self.0.borrow_mut();
        match model.attachments.get_mut(&(widget, side)) {
            Some(Attachment::Absolute(distance))
            | Some(Attachment::Sequential(_, distance))
            | Some(Attachment::Parallel(_, distance)) => *distance += delta,
            Some(Attachment::Baseline(_)) | None => {
                return Err(LayoutError::not_attached(widget, side))
            }
        }
        model.journal.push(format!(
            "adjust_attachment_offset({}, {:?}, {})",
            widget.0, side, delta
        ));
        Ok(())
    }

    fn set_explicit_size(
        &mut self,
        widget: WidgetId,
        fixed_side: Side,
        resizing_side: Side,
        size_delta: i32,
    ) -> Result<(), LayoutError> {
        self.0.borrow_mut().journal.push(format!(
            "set_explicit_size({}, {:?}, {:?}, {})",
            widget.0, fixed_side, resizing_side, size_delta
        ));
        Ok(())
    }

    fn apply_bounds(&mut self, widget: WidgetId, bounds: Rect) -> Result<(), LayoutError> {
        let mut model = self.0.borrow_mut();
        model.bounds.insert(widget, bounds);
        model.journal.push(format!(
            "apply_bounds({}, {},{},{},{})",
            widget.0, bounds.x, bounds.y, bounds.width, bounds.height
        ));
        Ok(())
    }
}
