//! snapkit - interactive snapping and constraint placement for visual editors
//!
//! The crate implements the drag-time half of an absolute layout editor:
//! while a widget is dragged it finds the snap position closest to the mouse
//! (container gaps, sibling gaps, baselines, indents, matching sizes, grid),
//! and when the drag is committed it translates the final position into
//! attachment commands against the editor's layout model.
//!
//! The editor plugs in through three traits: [`VisualDataProvider`] answers
//! geometry queries, [`FeedbackSink`] draws transient snap feedback, and
//! [`LayoutCommands`] mutates the attachment model. [`PlacementEngine`] owns
//! one implementation of each and drives the whole pipeline:
//!
//! ```ignore
//! let mut engine = PlacementEngine::new(editor, feedback, model, SnapConfig::default());
//! engine.update_widgets(&[WidgetId(1), WidgetId(2)]);
//!
//! // drag widget 2 around, then commit the attachments
//! engine.drag_widget(
//!     Point::new(64, 40),
//!     WidgetId(2),
//!     Rect::new(61, 38, 40, 20),
//!     ResizeDirection::NONE,
//! );
//! engine.commit()?;
//! ```

pub mod geometry;
pub mod snapping;

pub use snapping::{
    AlignAnchor, AttachmentType, Axis, ComponentAttachmentInfo, ConfigError, Direction,
    DistributeTarget, EngagedPoint, FeedbackHandle, FeedbackSink, LayoutCommands, LayoutError,
    PerDirection, PlacementEngine, PlacementInfo, ResizeDirection, Side, SnapConfig, SnapEngine,
    SnapOutcome, SnapPoint, VisualDataProvider, WidgetId,
};
