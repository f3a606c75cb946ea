//! Generator configuration, passed explicitly into each run.

use crate::HistoryRange;
use std::path::PathBuf;

/// EMU per inch, the PPTX coordinate unit.
pub const EMU_PER_INCH: i64 = 914_400;

/// Convert inches to EMU.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// Where the six-slide template comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateSource {
    /// The deck bundled with the generator.
    #[default]
    Builtin,
    /// A `.pptx` file on disk.
    File(PathBuf),
}

/// Placement of an embedded picture. Height follows the image aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub left: i64,
    pub top: i64,
    pub width: i64,
}

impl Placement {
    pub fn from_inches(left: f64, top: f64, width: f64) -> Self {
        Self {
            left: inches(left),
            top: inches(top),
            width: inches(width),
        }
    }
}

/// Settings for one deck generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Template asset.
    pub template: TemplateSource,

    /// Directory for temporary rendered images.
    pub work_dir: PathBuf,

    /// Price history window.
    pub history: HistoryRange,

    /// Chart bitmap size in pixels.
    pub chart_size: (u32, u32),

    /// TrueType font for chart text. `None` searches common system locations.
    pub font_path: Option<PathBuf>,

    /// Logo canvas before doubling, in pixels.
    pub logo_box: (u32, u32),

    /// Where the logo goes on the overview slide.
    pub logo_placement: Placement,

    /// Where each chart goes on its slide.
    pub chart_placement: Placement,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            template: TemplateSource::Builtin,
            work_dir: std::env::temp_dir(),
            history: HistoryRange::default(),
            chart_size: (700, 500),
            font_path: None,
            logo_box: (220, 140),
            logo_placement: Placement::from_inches(1.2, 0.5, 2.0),
            chart_placement: Placement::from_inches(2.5, 1.0, 8.0),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: TemplateSource) -> Self {
        self.template = template;
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_history(mut self, period: impl Into<String>, interval: impl Into<String>) -> Self {
        self.history = HistoryRange {
            period: period.into(),
            interval: interval.into(),
        };
        self
    }

    pub fn with_chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = (width.max(1), height.max(1));
        self
    }

    pub fn with_font_path(mut self, path: Option<PathBuf>) -> Self {
        self.font_path = path;
        self
    }
}
