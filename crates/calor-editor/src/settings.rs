//! Editor Settings
//!
//! Viewport presentation and navigation settings plus the scene defaults,
//! loaded from JSON. Missing fields fall back to their defaults.

use std::path::Path;

use calor_core::SceneConfig;
use serde::{Deserialize, Serialize};

use crate::{EditorError, EditorResult};

/// Viewport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Grid visible
    pub show_grid: bool,
    /// Grid cell size in meters
    pub grid_size: f32,
    /// Number of grid lines per side
    pub grid_divisions: u32,
    /// Grid line color (RGBA)
    pub grid_color: [u8; 4],
    /// Axis lines visible
    pub show_axis: bool,
    pub axis_length: f32,
    pub axis_thickness: f32,
    pub invert_pan_x: bool,
    pub invert_pan_y: bool,
    pub pan_sensitivity: f32,
    pub orbit_sensitivity: f32,
    pub zoom_sensitivity: f32,
    /// Clear color (RGB)
    pub background_color: [u8; 3],
    /// Near clip plane
    pub near_plane: f32,
    /// Far clip plane
    pub far_plane: f32,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            grid_size: 1.0,
            grid_divisions: 20,
            grid_color: [128, 128, 128, 100],
            show_axis: true,
            axis_length: 1000.0,
            axis_thickness: 0.01,
            invert_pan_x: false,
            invert_pan_y: false,
            pan_sensitivity: 1.0,
            orbit_sensitivity: 1.0,
            zoom_sensitivity: 1.0,
            background_color: [60, 60, 60],
            near_plane: 0.01,
            far_plane: 10000.0,
            field_of_view: 45.0,
        }
    }
}

impl ViewportSettings {
    /// Reject values the viewport cannot render with
    pub fn validate(&self) -> EditorResult<()> {
        let positive = [
            ("grid_size", self.grid_size),
            ("axis_length", self.axis_length),
            ("axis_thickness", self.axis_thickness),
            ("pan_sensitivity", self.pan_sensitivity),
            ("orbit_sensitivity", self.orbit_sensitivity),
            ("zoom_sensitivity", self.zoom_sensitivity),
            ("near_plane", self.near_plane),
        ];
        for (name, value) in positive {
            // NaN fails this comparison too
            if !(value > 0.0) {
                return Err(EditorError::InvalidSettings(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.grid_divisions == 0 {
            return Err(EditorError::InvalidSettings(
                "grid_divisions must be at least 1".to_string(),
            ));
        }
        if self.near_plane >= self.far_plane {
            return Err(EditorError::InvalidSettings(format!(
                "near_plane ({}) must be less than far_plane ({})",
                self.near_plane, self.far_plane
            )));
        }
        if !(self.field_of_view > 0.0 && self.field_of_view < 180.0) {
            return Err(EditorError::InvalidSettings(format!(
                "field_of_view must be between 0 and 180 degrees, got {}",
                self.field_of_view
            )));
        }
        Ok(())
    }
}

/// All persisted editor settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub viewport: ViewportSettings,
    pub scene: SceneConfig,
}

impl EditorSettings {
    /// Parse settings from JSON. The result is not validated.
    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let path = path.as_ref();
        log::info!("Loading settings from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check viewport values and primitive resolutions
    pub fn validate(&self) -> EditorResult<()> {
        self.viewport.validate()?;
        self.scene.cylinder_kind()?;
        self.scene.sphere_kind()?;
        Ok(())
    }
}
