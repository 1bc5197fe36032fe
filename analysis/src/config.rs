use crate::plot::style::LineStyle;
use serde::{Deserialize, Serialize};
use std::{fs, io::Error, path::Path, path::PathBuf, str::FromStr};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Widest constraint key a `ConstraintKey` bitmask can hold
pub const MAX_CONSTRAINTS: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read config file")]
    Read(#[from] Error),
    #[error("Failed to parse config file")]
    Parse(#[from] serde_yaml::Error),
    #[error("Config is invalid, see the log above for details")]
    Invalid,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    #[serde(default, alias = "db")]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub plot: PlotConfig,
    // pairs of (name when the flag is set, name when it is not), indexed by flag position
    #[serde(default = "default_constraint_names")]
    pub constraints: Vec<ConstraintNames>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub layout: ColumnLayout,
}

/// Half-open range of column ordinals, written as `[start, end]` in YAML
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnRange(pub usize, pub usize);

impl ColumnRange {
    pub fn start(&self) -> usize {
        self.0
    }

    pub fn end(&self) -> usize {
        self.1
    }

    pub fn len(&self) -> usize {
        self.1.saturating_sub(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.0..self.1
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SolverColumns {
    pub name: String,
    // first of three consecutive measurement columns
    pub offset: usize,
}

/// Fixed column offsets used to map a result row into typed records.
/// Offsets are not discovered from the schema, they are only checked against it.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ColumnLayout {
    #[serde(default)]
    pub instance_id: usize,
    pub grid: ColumnRange,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub debug: Vec<usize>,
    pub is_sat: usize,
    pub flags: ColumnRange,
    pub solvers: Vec<SolverColumns>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::compact()
    }
}

impl ColumnLayout {
    /// Layout with the grid descriptor spread over columns 2 to 5
    pub fn compact() -> Self {
        Self {
            instance_id: 0,
            grid: ColumnRange(2, 6),
            index: None,
            debug: Vec::new(),
            is_sat: 6,
            flags: ColumnRange(7, 12),
            solvers: default_solver_columns(),
        }
    }

    /// Layout with a single grid column followed by the index list and two debug columns
    pub fn detailed() -> Self {
        Self {
            instance_id: 0,
            grid: ColumnRange(2, 3),
            index: Some(3),
            debug: vec![4, 5],
            is_sat: 6,
            flags: ColumnRange(7, 12),
            solvers: default_solver_columns(),
        }
    }

    /// number of boolean constraint flags per row
    pub fn width(&self) -> usize {
        self.flags.len()
    }

    /// number of trailing measurement columns over all solvers
    pub fn solver_columns(&self) -> usize {
        self.solvers.len() * 3
    }

    /// minimal number of columns a table needs for this layout
    pub fn required_columns(&self) -> usize {
        let solvers = self
            .solvers
            .iter()
            .map(|solver| solver.offset + 3)
            .max()
            .unwrap_or(0);

        [
            self.instance_id + 1,
            self.grid.end(),
            self.index.map_or(0, |index| index + 1),
            self.debug.iter().max().map_or(0, |debug| debug + 1),
            self.is_sat + 1,
            self.flags.end(),
            solvers,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn preflight_checks(&self) -> bool {
        let mut contains_error = false;

        if self.flags.is_empty() {
            error!("database.layout.flags must contain at least one column");
            contains_error = true;
        } else if self.width() > MAX_CONSTRAINTS {
            error!(
                "database.layout.flags spans {} columns, at most {MAX_CONSTRAINTS} are supported",
                self.width()
            );
            contains_error = true;
        }

        if self.grid.start() > self.grid.end() {
            error!("database.layout.grid must be written as [start, end] with start <= end");
            contains_error = true;
        }

        if self.solvers.is_empty() {
            error!("database.layout.solvers is empty, there would be nothing to compare");
            contains_error = true;
        }

        for (position, solver) in self.solvers.iter().enumerate() {
            if self.solvers[..position]
                .iter()
                .any(|other| other.name == solver.name)
            {
                error!("database.layout.solvers defines {} twice", solver.name);
                contains_error = true;
            }
        }

        contains_error
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ConstraintNames(pub String, pub String);

impl ConstraintNames {
    pub fn new(when_set: &str, when_unset: &str) -> Self {
        Self(when_set.to_owned(), when_unset.to_owned())
    }

    pub fn when_set(&self) -> &str {
        &self.0
    }

    pub fn when_unset(&self) -> &str {
        &self.1
    }
}

/// Cosmetic properties of every rendered figure, passed by reference to each render call
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlotConfig {
    #[serde(default = "default_axis_max")]
    pub x_max: f64,
    #[serde(default = "default_axis_max")]
    pub y_max: f64,
    // inches per panel
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    // marker area in pt^2, falls back to DEFAULT_MARKER_SIZE
    #[serde(default)]
    pub marker_size: Option<f64>,
    #[serde(default = "default_line_style")]
    pub line_style: String,
    #[serde(default = "default_grid")]
    pub grid: bool,
}

pub const DEFAULT_MARKER_SIZE: f64 = 36.0;

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            x_max: default_axis_max(),
            y_max: default_axis_max(),
            width: default_width(),
            height: default_height(),
            dpi: default_dpi(),
            opacity: default_opacity(),
            marker_size: None,
            line_style: default_line_style(),
            grid: default_grid(),
        }
    }
}

impl PlotConfig {
    /// pixel size of a figure stacking `panels` panels vertically
    pub fn pixel_size(&self, panels: usize) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        let width = (self.width * dpi).round() as u32;
        let height = (self.height * dpi).round() as u32;

        (width, height * panels.max(1) as u32)
    }

    /// marker radius in pixels, `marker_size` is an area in points squared
    pub fn marker_radius(&self) -> u32 {
        let area = self.marker_size.unwrap_or(DEFAULT_MARKER_SIZE);
        let radius_pt = area.max(0.0).sqrt() / 2.0;

        ((radius_pt * f64::from(self.dpi) / 72.0).round() as u32).max(1)
    }

    pub fn preflight_checks(&self) -> bool {
        let mut contains_error = false;

        if !(self.x_max > 0.0) || !(self.y_max > 0.0) {
            error!(
                x_max = self.x_max,
                y_max = self.y_max,
                "plot.x_max and plot.y_max must be positive"
            );
            contains_error = true;
        }

        if !(self.width > 0.0) || !(self.height > 0.0) || self.dpi == 0 {
            error!("plot.width, plot.height and plot.dpi must be positive");
            contains_error = true;
        }

        if !(0.0..=1.0).contains(&self.opacity) {
            error!(opacity = self.opacity, "plot.opacity must lie within [0, 1]");
            contains_error = true;
        }

        if let Some(size) = self.marker_size {
            if !(size > 0.0) {
                error!(marker_size = size, "plot.marker_size must be positive");
                contains_error = true;
            }
        }

        if let Err(error) = LineStyle::from_str(&self.line_style) {
            error!("plot.line_style is invalid: {error}");
            contains_error = true;
        }

        contains_error
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            layout: ColumnLayout::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            plot: PlotConfig::default(),
            constraints: default_constraint_names(),
        }
    }
}

impl AnalysisConfig {
    /// read and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        if !path.is_file() {
            return Err(ConfigErrors::FileNotFound(path.to_path_buf()));
        }

        let config: Self = serde_yaml::from_str(&fs::read_to_string(path)?)?;
        debug!(path = ?path, "Parsed config");

        if config.preflight_checks() {
            Err(ConfigErrors::Invalid)
        } else {
            Ok(config)
        }
    }

    pub fn preflight_checks(&self) -> bool {
        // collect all errors instead of stopping at the first one
        let mut contains_error = self.database.layout.preflight_checks();
        contains_error |= self.plot.preflight_checks();

        if self.constraints.len() > self.database.layout.width() {
            warn!(
                "{} constraint name pairs configured but only {} flag columns exist, the rest is ignored",
                self.constraints.len(),
                self.database.layout.width()
            );
        }

        for (position, names) in self.constraints.iter().enumerate() {
            if names.when_set() == names.when_unset() {
                error!(
                    "constraints[{position}] uses '{}' for both sides",
                    names.when_set()
                );
                contains_error = true;
            }
        }

        contains_error
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("argyle_time.db")
}

fn default_solver_columns() -> Vec<SolverColumns> {
    vec![
        SolverColumns {
            name: "cvc5".to_owned(),
            offset: 12,
        },
        SolverColumns {
            name: "z3".to_owned(),
            offset: 15,
        },
    ]
}

fn default_constraint_names() -> Vec<ConstraintNames> {
    vec![
        ConstraintNames::new("classic", "argyle"),
        ConstraintNames::new("distinct", "PbEq"),
        ConstraintNames::new("percol", "inorder"),
        ConstraintNames::new("is_bool", "is_num"),
        ConstraintNames::new("prefill", "no_prefill"),
    ]
}

fn default_axis_max() -> f64 {
    5.0
}

fn default_width() -> f64 {
    10.0
}

fn default_height() -> f64 {
    5.0
}

fn default_dpi() -> u32 {
    100
}

fn default_opacity() -> f64 {
    0.6
}

fn default_line_style() -> String {
    "r--".to_owned()
}

fn default_grid() -> bool {
    true
}
