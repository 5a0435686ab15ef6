//! Per-question line charts, rendered to inline SVG with [`plotters`].

use plotters::prelude::*;
use thiserror::Error;

use crate::process::aggregate::Series;

/// Errors that can occur while drawing a chart
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, ChartError>;

/// Width and height of every chart, in SVG user units.
pub const CHART_SIZE: (u32, u32) = (960, 540);

/// Draw one line per series (year on X, percentage on Y) and return the SVG
/// document as a string.
pub fn render_line_chart(title: &str, series: &[Series], years: &[u16]) -> Result<String> {
    if series.is_empty() {
        return Err(ChartError::InvalidData(format!("`{}` has no series", title)));
    }
    let (Some(&first), Some(&last)) = (years.iter().min(), years.iter().max()) else {
        return Err(ChartError::InvalidData("no survey years to plot".into()));
    };

    let mut y_top: f64 = 0.0;
    for s in series {
        for (_, pct) in &s.points {
            if !(0.0..=100.0).contains(pct) {
                return Err(ChartError::InvalidData(format!(
                    "percentage {:.2} for `{}` is outside 0-100",
                    pct, s.category
                )));
            }
            y_top = y_top.max(*pct);
        }
    }
    let y_top = (y_top * 1.1).clamp(5.0, 100.0);

    // a single year still needs a non-empty axis
    let (x_min, x_max) = if first == last {
        (first as i32 - 1, last as i32 + 1)
    } else {
        (first as i32, last as i32)
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, 0f64..y_top)
            .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

        chart
            .configure_mesh()
            .x_labels((x_max - x_min + 1) as usize)
            .x_label_formatter(&|y: &i32| y.to_string())
            .y_label_formatter(&|p: &f64| format!("{:.0}%", p))
            .y_desc("% of respondents")
            .label_style(("sans-serif", 14))
            .draw()
            .map_err(|e| ChartError::Drawing(e.to_string()))?;

        for (i, s) in series.iter().enumerate() {
            let color = Palette99::pick(i).to_rgba();
            let points: Vec<(i32, f64)> =
                s.points.iter().map(|(y, p)| (*y as i32, *p)).collect();

            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
                .map_err(|e| ChartError::Drawing(e.to_string()))?
                .label(s.category.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });

            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                )
                .map_err(|e| ChartError::Drawing(e.to_string()))?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.85))
            .border_style(&BLACK)
            .label_font(("sans-serif", 13))
            .draw()
            .map_err(|e| ChartError::Drawing(e.to_string()))?;

        root.present()
            .map_err(|e| ChartError::Drawing(e.to_string()))?;
    }

    Ok(svg)
}
