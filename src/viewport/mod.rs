//! Pan and zoom state for the tree canvas, driven by discrete input actions.

mod minimap;
mod state;

pub use minimap::{Minimap, MINIMAP_FILL};
use serde::{Deserialize, Serialize};
pub use state::{Gesture, ViewportAction, ViewportState};

use crate::{
    error::ConfigError,
    family::{PersonId, ViewMode},
    geometry::Point,
};

/// Scale above which cards are drawn with full details.
pub const FULL_ZOOM_THRESHOLD: f64 = 0.55;
/// Scale above which cards are drawn as one-line boxes.
pub const COMPACT_ZOOM_THRESHOLD: f64 = 0.3;

/// Level of detail derived from the current scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomLevel {
    Full,
    Compact,
    Mini,
}

impl ZoomLevel {
    pub fn from_scale(scale: f64) -> Self {
        if scale > FULL_ZOOM_THRESHOLD {
            Self::Full
        } else if scale > COMPACT_ZOOM_THRESHOLD {
            Self::Compact
        } else {
            Self::Mini
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Compact => "compact",
            Self::Mini => "mini",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale change per zoom in/out action.
    pub zoom_step: f64,
    /// Scale change per wheel notch.
    pub wheel_step: f64,
    pub initial_scale: f64,
    /// Initial scale for viewports narrower than `narrow_width`.
    pub narrow_scale: f64,
    pub narrow_width: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.2,
            max_scale: 2.0,
            zoom_step: 0.1,
            wheel_step: 0.05,
            initial_scale: 0.9,
            narrow_scale: 0.6,
            narrow_width: 768.0,
        }
    }
}

impl ViewportConfig {
    /// Starting scale for a viewport `width` pixels wide.
    pub fn initial_scale_for(&self, width: f64) -> f64 {
        let scale = if width < self.narrow_width {
            self.narrow_scale
        } else {
            self.initial_scale
        };
        self.clamp(scale)
    }

    /// Clamp `scale` into `[min_scale, max_scale]`.
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min_scale).min(self.max_scale)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("zoom_step", self.zoom_step),
            ("wheel_step", self.wheel_step),
            ("initial_scale", self.initial_scale),
            ("narrow_scale", self.narrow_scale),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.narrow_width.is_nan() || self.narrow_width < 0.0 {
            return Err(ConfigError::Negative {
                field: "narrow_width",
                value: self.narrow_width,
            });
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::ScaleRange {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        Ok(())
    }
}

/// Notifications for the host, emitted by [`ViewportState::apply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TreeEvent {
    NodeSelected { person_id: PersonId, screen: Point },
    CollapseToggled(PersonId),
    ViewModeChanged(ViewMode),
    BranchRootChanged(Option<PersonId>),
}
