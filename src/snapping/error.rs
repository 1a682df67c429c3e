//! Error type shared with the layout-command sink

use thiserror::Error;

use super::types::{Side, WidgetId};

/// Errors surfaced by the layout-command sink and propagated, unrecovered,
/// out of the engine.
///
/// The engine never retries; a failing command aborts the operation and
/// already-emitted commands are left for a transactional layer above to
/// roll back.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The sink does not know the widget
    #[error("unknown widget {0:?}")]
    UnknownWidget(WidgetId),

    /// A command needed an existing attachment that is not there
    #[error("widget {widget:?} has no attachment on its {side:?} side")]
    NotAttached { widget: WidgetId, side: Side },

    /// Implementation-defined failure of the underlying layout model
    #[error("layout model error: {0}")]
    Model(String),
}

impl LayoutError {
    pub fn not_attached(widget: WidgetId, side: Side) -> Self {
        Self::NotAttached { widget, side }
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }
}
