//! PNG charts for grouped results.

use anyhow::Result;
use assaylab_core::grouping::GroupBoxPlot;
use assaylab_schemas::stats::StatGroup;
use plotters::prelude::*;
use std::path::Path;
use tracing::{info, warn};

const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);
const BOX_COLOR: RGBColor = RGBColor(46, 139, 87);

/// Chart geometry shared by every plot of a run.
#[derive(Debug, Clone, Copy)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

/// Pads `[low, high]` and always includes zero so bars start at the axis.
fn value_range(low: f64, high: f64) -> (f64, f64) {
    let low = low.min(0.0);
    let high = high.max(0.0);
    let span = if high > low { high - low } else { 1.0 };
    let pad_low = if low < 0.0 { span * 0.05 } else { 0.0 };
    (low - pad_low, high + span * 0.1)
}

fn category_label(names: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    names.get(index as usize).cloned().unwrap_or_default()
}

/// Bar chart of group means with standard-error bars.
pub fn plot_bar_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    groups: &[StatGroup],
    size: ChartSize,
) -> Result<()> {
    if groups.is_empty() {
        warn!(path = %path.display(), "no data to plot");
        return Ok(());
    }

    let root = BitMapBackend::new(path, (size.width, size.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
    let low = groups
        .iter()
        .map(|g| g.value - g.error_y)
        .fold(f64::INFINITY, f64::min);
    let high = groups
        .iter()
        .map(|g| g.value + g.error_y)
        .fold(f64::NEG_INFINITY, f64::max);
    let (y_min, y_max) = value_range(low, high);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 36).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(groups.len() as f64 - 0.5), y_min..y_max)?;

    let label = |x: &f64| category_label(&names, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len())
        .x_label_formatter(&label)
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(groups.iter().enumerate().map(|(i, g)| {
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, g.value)], BAR_COLOR.filled())
    }))?;

    chart.draw_series(groups.iter().enumerate().filter(|(_, g)| g.n > 1).map(|(i, g)| {
        ErrorBar::new_vertical(
            i as f64,
            g.value - g.error_y,
            g.value,
            g.value + g.error_y,
            BLACK.stroke_width(2),
            12,
        )
    }))?;

    root.present()?;
    info!(path = %path.display(), groups = groups.len(), "bar chart written");
    Ok(())
}

/// Box plot with 1.5×IQR whiskers and outliers drawn as red dots.
pub fn plot_box_plot(
    path: &Path,
    title: &str,
    y_desc: &str,
    boxes: &[GroupBoxPlot],
    size: ChartSize,
) -> Result<()> {
    if boxes.is_empty() {
        warn!(path = %path.display(), "no data to plot");
        return Ok(());
    }

    let root = BitMapBackend::new(path, (size.width, size.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let names: Vec<String> = boxes.iter().map(|b| b.name.clone()).collect();
    let low = boxes
        .iter()
        .filter_map(|b| b.stats.values.first().copied())
        .fold(f64::INFINITY, f64::min);
    let high = boxes
        .iter()
        .filter_map(|b| b.stats.values.last().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    let (y_min, y_max) = value_range(low, high);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 36).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(boxes.len() as f64 - 0.5), y_min..y_max)?;

    let label = |x: &f64| category_label(&names, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(boxes.len())
        .x_label_formatter(&label)
        .y_desc(y_desc)
        .draw()?;

    for (i, b) in boxes.iter().enumerate() {
        let x = i as f64;
        let s = &b.stats;

        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, s.q1), (x + 0.3, s.q3)],
            BOX_COLOR.mix(0.3).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, s.q1), (x + 0.3, s.q3)],
            BOX_COLOR.stroke_width(2),
        )))?;

        let segments = [
            vec![(x - 0.3, s.median), (x + 0.3, s.median)],
            vec![(x, s.q3), (x, s.max)],
            vec![(x, s.q1), (x, s.min)],
            vec![(x - 0.15, s.max), (x + 0.15, s.max)],
            vec![(x - 0.15, s.min), (x + 0.15, s.min)],
        ];
        chart.draw_series(
            segments
                .into_iter()
                .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
        )?;

        chart.draw_series(
            s.outliers
                .iter()
                .map(|v| Circle::new((x, *v), 4, RED.filled())),
        )?;
    }

    root.present()?;
    info!(path = %path.display(), groups = boxes.len(), "box plot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_only_on_integer_ticks() {
        let names = vec!["Control".to_string(), "Drought".to_string()];
        assert_eq!(category_label(&names, 1.0), "Drought");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, 2.0), "");
        assert_eq!(category_label(&names, -0.4), "");
    }

    #[test]
    fn range_always_contains_zero() {
        let (lo, hi) = value_range(2.0, 5.0);
        assert_eq!(lo, 0.0);
        assert!(hi > 5.0);
        let (lo, _) = value_range(-3.0, 1.0);
        assert!(lo < -3.0);
    }
}
