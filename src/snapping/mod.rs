//! Snapping and constraint placement
//!
//! The submodules split along the operation pipeline: [`engine`] finds the
//! snap position during a drag, [`placement`] turns a committed drag into
//! attachment commands, [`cycles`] repairs attachment graphs afterwards.
//! [`provider`] holds the three traits an embedding editor implements.

pub mod config;
pub mod cycles;
pub mod engine;
pub mod error;
pub mod placement;
pub mod provider;
pub mod snap_point;
pub mod types;

pub use config::{ConfigError, SnapConfig};
pub use engine::{AxisSnap, SnapEngine, SnapOutcome};
pub use error::LayoutError;
pub use placement::PlacementEngine;
pub use provider::{FeedbackHandle, FeedbackSink, LayoutCommands, VisualDataProvider};
pub use snap_point::{EngagedPoint, SnapPoint};
pub use types::{
    AlignAnchor, AttachmentType, Axis, ComponentAttachmentInfo, Direction, DistributeTarget,
    PerDirection, PlacementInfo, ResizeDirection, Side, WidgetId,
};
