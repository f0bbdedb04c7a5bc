//! Line plots of solution arrays
//!
//! Every vector of the array becomes one line over its DOF index, so a
//! trajectory shows up as a family of snapshots.

use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

use super::config::PlotConfig;
use crate::discretizations::{Discretization, VisualizeOptions, Visualizer};
use crate::error::{MorError, MorResult};
use crate::vectorarrays::VectorArray;

/// Renders solutions to PNG or SVG files
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use mor_rs::discretizations::{Discretization, StationaryDiscretization, VisualizeOptions};
/// use mor_rs::operators::{IdentityOperator, VectorFunctional};
/// use mor_rs::output::{PlotConfig, PlotVisualizer};
/// use mor_rs::vectorarrays::{VectorArray, VectorSpace};
///
/// let space = VectorSpace::new(3);
/// let f = VectorArray::from_vec(space.clone(), vec![1.0, 2.0, 1.0])?;
/// let d = StationaryDiscretization::builder()
///     .operator(Arc::new(IdentityOperator::new(space)))
///     .rhs(Arc::new(VectorFunctional::new(f)?))
///     .visualizer(Arc::new(PlotVisualizer::new(PlotConfig::default())?))
///     .build()?;
///
/// let u = d.solve(None)?;
/// d.visualize(&u, &VisualizeOptions::new().title("u").path("u.svg"))?;
/// # Ok::<(), mor_rs::MorError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotVisualizer {
    config: PlotConfig,
}

impl PlotVisualizer {
    pub fn new(config: PlotConfig) -> MorResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }
}

impl Visualizer for PlotVisualizer {
    fn visualize(
        &self,
        u: &VectorArray,
        discretization: &dyn Discretization,
        options: &VisualizeOptions,
    ) -> MorResult<()> {
        // ====== Step 1: Validation ======

        if u.space() != discretization.solution_space() {
            return Err(MorError::space_mismatch(
                "plot",
                discretization.solution_space(),
                u.space(),
            ));
        }
        if u.is_empty() {
            return Err(MorError::InvariantViolation(
                "empty data: nothing to plot".to_string(),
            ));
        }
        if !u.is_finite() {
            return Err(MorError::InvariantViolation(
                "invalid data: NaN or Inf detected".to_string(),
            ));
        }

        let path = options
            .path
            .as_deref()
            .or(self.config.path.as_deref())
            .ok_or_else(|| MorError::Configuration("plot needs an output path".to_string()))?;

        // ====== Step 2: Series & Ranges ======

        let series: Vec<(String, Vec<(f64, f64)>)> = (0..u.len())
            .map(|j| {
                let points = u
                    .data()
                    .column(j)
                    .iter()
                    .enumerate()
                    .map(|(i, value)| (i as f64, *value))
                    .collect();
                (options.label(j), points)
            })
            .collect();

        let x_max = (u.dim().saturating_sub(1) as f64).max(1.0);
        let (y_min, y_max) = y_range(u);
        let title = options.title.as_deref().unwrap_or(&self.config.title);

        // ====== Step 3: Render with the backend picked by extension ======

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("png");
        let size = (self.config.width, self.config.height);
        let result = match extension {
            "svg" => plot_impl(
                SVGBackend::new(path, size),
                &series,
                title,
                &self.config,
                x_max,
                (y_min, y_max),
            ),
            _ => plot_impl(
                BitMapBackend::new(path, size),
                &series,
                title,
                &self.config,
                x_max,
                (y_min, y_max),
            ),
        };
        result.map_err(|e| MorError::Plot(format!("{}: {}", display(path), e)))?;

        log::debug!("plotted {} vectors to {}", u.len(), display(path));
        Ok(())
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Value range with a margin, never degenerate
fn y_range(u: &VectorArray) -> (f64, f64) {
    let min = u.data().min();
    let max = u.data().max();
    let margin = ((max - min) * 0.05).max(1e-10);
    (min - margin, max + margin)
}

/// Implementation for plotting with concrete backend
fn plot_impl<DB: DrawingBackend>(
    backend: DB,
    series: &[(String, Vec<(f64, f64)>)],
    title: &str,
    config: &PlotConfig,
    x_max: f64,
    (y_min, y_max): (f64, f64),
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&config.background)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 40).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

    if config.show_grid {
        chart
            .configure_mesh()
            .x_desc(&config.xlabel)
            .y_desc(&config.ylabel)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .y_label_formatter(&|y| format!("{:.3}", y))
            .draw()?;
    }

    for (index, (label, points)) in series.iter().enumerate() {
        let color = config.color(index);
        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                ShapeStyle::from(&color).stroke_width(config.line_width),
            ))?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .background_style(&config.background.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretizations::StationaryDiscretization;
    use crate::operators::{IdentityOperator, VectorFunctional};
    use crate::vectorarrays::VectorSpace;
    use std::sync::Arc;

    fn discretization() -> StationaryDiscretization {
        let space = VectorSpace::new(20);
        let values = (0..20).map(|i| (i as f64 / 3.0).sin()).collect();
        let f = VectorArray::from_vec(space.clone(), values).unwrap();
        StationaryDiscretization::builder()
            .operator(Arc::new(IdentityOperator::new(space)))
            .rhs(Arc::new(VectorFunctional::new(f).unwrap()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_plot_svg() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("svg");

        let d = discretization();
        let mut u = d.solve(None).unwrap();
        let mut scaled = u.clone();
        scaled.scal(0.5);
        u.append(&scaled).unwrap();

        let visualizer = PlotVisualizer::new(PlotConfig::default().size(320, 240)).unwrap();
        visualizer
            .visualize(
                &u,
                &d,
                &VisualizeOptions::new()
                    .title("snapshots")
                    .legend(["u", "u/2"])
                    .path(&path),
            )
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_plot_png_from_config_path() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("png");

        let d = discretization();
        let u = d.solve(None).unwrap();
        let visualizer =
            PlotVisualizer::new(PlotConfig::default().size(320, 240).path(&path)).unwrap();
        visualizer.visualize(&u, &d, &VisualizeOptions::new()).unwrap();

        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_plot_requires_path_and_valid_data() {
        let d = discretization();
        let u = d.solve(None).unwrap();
        let visualizer = PlotVisualizer::default();

        let err = visualizer
            .visualize(&u, &d, &VisualizeOptions::new())
            .unwrap_err();
        assert!(matches!(err, MorError::Configuration(_)));

        let wrong = VectorArray::zeros(VectorSpace::new(3), 1);
        let err = visualizer
            .visualize(&wrong, &d, &VisualizeOptions::new().path("unused.png"))
            .unwrap_err();
        assert!(matches!(err, MorError::SpaceMismatch { .. }));
    }

    #[test]
    fn test_constant_data_has_non_degenerate_range() {
        let u = VectorArray::zeros(VectorSpace::new(4), 1);
        let (min, max) = y_range(&u);
        assert!(min < max);
    }
}
