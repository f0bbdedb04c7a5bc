//! Plot configuration

use plotters::prelude::*;
use std::path::PathBuf;

use crate::error::{MorError, MorResult};

/// Configuration for [`PlotVisualizer`](super::PlotVisualizer)
///
/// # Example
///
/// ```rust
/// use mor_rs::output::PlotConfig;
///
/// let config = PlotConfig::titled("Snapshots").size(800, 600).path("u.svg");
/// assert_eq!(config.title, "Snapshots");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    /// Image width in pixels (default: 1024)
    pub width: u32,

    /// Image height in pixels (default: 768)
    pub height: u32,

    /// Plot title, used when the call gives none (default: "Solution")
    pub title: String,

    /// X-axis label (default: "DOF")
    pub xlabel: String,

    /// Y-axis label (default: "Value")
    pub ylabel: String,

    /// One color per plotted vector; the default palette is used when
    /// unset or too short
    pub colors: Option<Vec<RGBColor>>,

    /// Background color (default: WHITE)
    pub background: RGBColor,

    /// Line width in pixels (default: 2)
    pub line_width: u32,

    /// Draw the mesh and axis labels (default: true)
    pub show_grid: bool,

    /// Output file used when the call does not name one; `.svg` selects
    /// the SVG backend, anything else a bitmap
    pub path: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Solution".to_string(),
            xlabel: "DOF".to_string(),
            ylabel: "Value".to_string(),
            colors: None,
            background: WHITE,
            line_width: 2,
            show_grid: true,
            path: None,
        }
    }
}

impl PlotConfig {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn labels(mut self, xlabel: impl Into<String>, ylabel: impl Into<String>) -> Self {
        self.xlabel = xlabel.into();
        self.ylabel = ylabel.into();
        self
    }

    pub fn colors(mut self, colors: Vec<RGBColor>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn validate(&self) -> MorResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MorError::Configuration(format!(
                "plot size {}x{} must be positive",
                self.width, self.height
            )));
        }
        if self.line_width == 0 {
            return Err(MorError::Configuration(
                "line width must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Color of the vector at `index`
    ///
    /// Uses custom colors if provided, otherwise falls back to default palette
    pub(crate) fn color(&self, index: usize) -> RGBColor {
        if let Some(color) = self.colors.as_ref().and_then(|colors| colors.get(index)) {
            return *color;
        }

        const PALETTE: [RGBColor; 10] = [
            RED,
            BLUE,
            GREEN,
            MAGENTA,
            CYAN,
            BLACK,
            RGBColor(255, 165, 0),   // Orange
            RGBColor(128, 0, 128),   // Purple
            RGBColor(255, 192, 203), // Pink
            RGBColor(165, 42, 42),   // Brown
        ];
        PALETTE[index % PALETTE.len()]
    }
}

// =================================================================================================
// Tests
// =================================================================================================
