pub mod style;

#[cfg(test)]
mod plot_test;

use crate::{
    config::{ConstraintNames, PlotConfig},
    dataset::pairing::{Pairing, PairingError, ResolvedConstraint, Samples, SolverFilter},
};
use itertools::Itertools;
use plotters::{
    coord::Shift, drawing::DrawingAreaErrorKind, prelude::*, series::DashedLineSeries,
};
use std::path::Path;
use style::{LineStyle, StyleError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
    #[error("Invalid plot style: {0}")]
    Style(#[from] StyleError),
    #[error("Nothing to plot: {0}")]
    Pairing(#[from] PairingError),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PlotError {
    fn from(error: DrawingAreaErrorKind<E>) -> Self {
        PlotError::Drawing(error.to_string())
    }
}

// matplotlib's first cycle color
const SCATTER_COLOR: RGBColor = RGBColor(31, 119, 180);
const COMBINED_COLOR: RGBColor = GREEN;

/// One scatter plot of a figure
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub samples: Samples,
    pub color: RGBColor,
}

/// Vertically stacked panels rendered into one file
#[derive(Debug, Clone, Default)]
pub struct Figure {
    pub panels: Vec<Panel>,
}

fn axis_labels(constraint: usize, names: &[ConstraintNames], suffix: &str) -> (String, String) {
    match names.get(constraint) {
        Some(names) => (
            format!("Time when {}{suffix}", names.when_set()),
            format!("Time when {}{suffix}", names.when_unset()),
        ),
        None => (
            format!("Time when constraint {constraint} is True{suffix}"),
            format!("Time when constraint {constraint} is False{suffix}"),
        ),
    }
}

impl Figure {
    /// One panel per solver and optionally one over all solvers combined
    pub fn compare_all(
        pairing: &Pairing,
        solvers: &SolverFilter,
        names: &[ConstraintNames],
        combined: bool,
    ) -> Self {
        let order: Vec<String> = match solvers {
            SolverFilter::All => pairing.per_solver.keys().cloned().collect(),
            SolverFilter::Only(names) => names.iter().unique().cloned().collect(),
        };
        let (x_label, y_label) = axis_labels(pairing.constraint, names, "");

        let mut panels: Vec<Panel> = order
            .into_iter()
            .map(|solver| {
                let samples = pairing.solver(&solver).cloned().unwrap_or_else(|| {
                    warn!(solver = %solver, "No matched pairs for solver, its panel stays empty");
                    Samples::default()
                });

                Panel {
                    title: format!("Time comparison for {solver}"),
                    x_label: x_label.clone(),
                    y_label: y_label.clone(),
                    samples,
                    color: SCATTER_COLOR,
                }
            })
            .collect();

        if combined {
            let (x_label, y_label) = axis_labels(pairing.constraint, names, " (All Solvers)");

            panels.push(Panel {
                title: "Combined Time Comparison for All Solvers".to_owned(),
                x_label,
                y_label,
                samples: pairing.combined.clone(),
                color: COMBINED_COLOR,
            });
        }

        Self { panels }
    }

    /// Single panel for a constraint selected by name. `pairing` must already be
    /// oriented so the selected side is `truthy`.
    pub fn compare_named(
        pairing: &Pairing,
        resolved: ResolvedConstraint,
        names: &[ConstraintNames],
        solver: &str,
    ) -> Result<Self, PlotError> {
        let pair = names
            .get(resolved.index)
            .ok_or(PairingError::ConstraintOutOfRange {
                index: resolved.index as i64,
                count: names.len(),
            })?;
        let (selected, opposite) = if resolved.negated {
            (pair.when_unset(), pair.when_set())
        } else {
            (pair.when_set(), pair.when_unset())
        };

        Ok(Self {
            panels: vec![Panel {
                title: format!("Time Comparison: Constraint {selected} vs {opposite} ({solver})"),
                x_label: format!("Time when {selected}"),
                y_label: format!("Time when {opposite}"),
                samples: solver_samples(pairing, solver)?,
                color: SCATTER_COLOR,
            }],
        })
    }

    /// Single panel for a constraint selected by position, labelled with its column name
    pub fn compare_index(pairing: &Pairing, column: &str, solver: &str) -> Result<Self, PlotError> {
        Ok(Self {
            panels: vec![Panel {
                title: format!("Time Comparison: Constraint {column} - {solver}"),
                x_label: format!("Time when constraint {column} is True"),
                y_label: format!("Time when constraint {column} is False"),
                samples: solver_samples(pairing, solver)?,
                color: SCATTER_COLOR,
            }],
        })
    }

    /// render all panels into an SVG file at `path`
    pub fn render(&self, path: &Path, config: &PlotConfig) -> Result<(), PlotError> {
        let line_style: LineStyle = config.line_style.parse()?;
        let panels = self.panels.len().max(1);

        let root = SVGBackend::new(path, config.pixel_size(panels)).into_drawing_area();
        root.fill(&WHITE)?;

        for (panel, area) in self.panels.iter().zip(root.split_evenly((panels, 1)).iter()) {
            draw_panel(area, panel, config, &line_style)?;
        }

        root.present()?;
        info!(path = ?path, panels = self.panels.len(), "Rendered figure");

        Ok(())
    }
}

fn solver_samples(pairing: &Pairing, solver: &str) -> Result<Samples, PairingError> {
    pairing
        .solver(solver)
        .filter(|samples| !samples.is_empty())
        .cloned()
        .ok_or_else(|| PairingError::NoMatchedPairs {
            constraint: pairing.constraint,
            solvers: solver.to_owned(),
        })
}

fn draw_panel(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    panel: &Panel,
    config: &PlotConfig,
    line_style: &LineStyle,
) -> Result<(), PlotError> {
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..config.x_max, 0f64..config.y_max)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(&panel.x_label).y_desc(&panel.y_label);
    if !config.grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    // out of range values are clamped onto the border, never dropped
    let radius = config.marker_radius();
    let marker = panel.color.mix(config.opacity).filled();
    chart.draw_series(
        panel
            .samples
            .clamped(config.x_max, config.y_max)
            .into_iter()
            .map(|point| Circle::new(point, radius, marker)),
    )?;

    let diagonal = [(0.0, 0.0), (config.x_max, config.y_max)];
    let stroke = line_style.rgb().stroke_width(2);
    match line_style.dash_pattern() {
        Some((size, spacing)) => {
            chart.draw_series(DashedLineSeries::new(diagonal, size, spacing, stroke))?;
        }
        None => {
            chart.draw_series(LineSeries::new(diagonal, stroke))?;
        }
    }

    debug!(title = %panel.title, points = panel.samples.len(), "Drew panel");

    Ok(())
}
