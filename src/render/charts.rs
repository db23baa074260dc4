use std::path::Path;

use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use tracing::debug;

use super::Renderer;
use crate::aggregate::{BoxStats, ChartKind, DerivedView, ViewData};
use crate::error::{PipelineError, Result};

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Slice palette for the pie view, cycled when there are more groups.
const SLICE_COLORS: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

/// PNG chart renderer on the plotters bitmap backend.
pub struct BitmapRenderer {
    width: u32,
    height: u32,
}

impl Default for BitmapRenderer {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

impl BitmapRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Renderer for BitmapRenderer {
    fn render(&self, view: &DerivedView, dest: &Path) -> Result<()> {
        let fail = |reason: String| PipelineError::RenderFailed {
            path: dest.to_path_buf(),
            reason,
        };

        // The backend only reports a bad destination at present time;
        // check up front so the error names the real cause.
        let dir = dest.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            if !dir.is_dir() {
                return Err(fail(format!(
                    "output directory {} does not exist",
                    dir.display()
                )));
            }
        }

        let root = BitMapBackend::new(dest, (self.width, self.height)).into_drawing_area();
        draw(view, &root).map_err(|e| fail(e.to_string()))?;
        root.present().map_err(|e| fail(e.to_string()))?;
        debug!(chart = view.slug, path = %dest.display(), "artifact written");
        Ok(())
    }
}

fn draw(view: &DerivedView, root: &DrawingArea<BitMapBackend, Shift>) -> DrawResult {
    root.fill(&WHITE)?;
    match (view.kind, &view.data) {
        (ChartKind::Bar | ChartKind::Histogram, ViewData::Labelled(pairs)) => {
            draw_bars(view, pairs, root)
        }
        (ChartKind::Scatter, ViewData::Points(points)) => draw_points(view, points, root, false),
        (ChartKind::Line, ViewData::Points(points)) => draw_points(view, points, root, true),
        (ChartKind::Box, ViewData::Boxes(boxes)) => draw_boxes(view, boxes, root),
        (ChartKind::Pie, ViewData::Labelled(pairs)) => draw_pie(view, pairs, root),
        (kind, data) => Err(format!("chart kind {kind:?} cannot render {data:?}").into()),
    }
}

fn draw_bars(
    view: &DerivedView,
    pairs: &[(String, f64)],
    root: &DrawingArea<BitMapBackend, Shift>,
) -> DrawResult {
    let n = pairs.len();
    let y_max = pairs.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max) * 1.1;

    let mut chart = ChartBuilder::on(root)
        .caption(view.title, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(120)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..n as f64, 0.0..y_max.max(1.0))?;

    let label_of = |x: &f64| {
        pairs
            .get(x.floor() as usize)
            .map(|(label, _)| label.clone())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(view.x_label)
        .y_desc(view.y_label)
        .x_labels(n.min(X_LABEL_CAP))
        .x_label_formatter(&label_of)
        .draw()?;

    chart.draw_series(pairs.iter().enumerate().map(|(i, (_, v))| {
        Rectangle::new(
            [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, *v)],
            BLUE.mix(0.6).filled(),
        )
    }))?;
    Ok(())
}

/// At most this many category labels along the x axis.
const X_LABEL_CAP: usize = 20;

fn draw_points(
    view: &DerivedView,
    points: &[(f64, f64)],
    root: &DrawingArea<BitMapBackend, Shift>,
    connect: bool,
) -> DrawResult {
    let (x_min, x_max) = padded_range(points.iter().map(|p| p.0));
    let (y_min, y_max) = padded_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(view.title, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(view.x_label)
        .y_desc(view.y_label)
        .draw()?;

    if connect {
        chart.draw_series(LineSeries::new(points.iter().copied(), RED.stroke_width(2)))?;
    } else {
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, BLUE.mix(0.5).filled())),
        )?;
    }
    Ok(())
}

fn draw_boxes(
    view: &DerivedView,
    boxes: &[BoxStats],
    root: &DrawingArea<BitMapBackend, Shift>,
) -> DrawResult {
    let lo = boxes
        .iter()
        .map(|b| b.min)
        .fold(f64::INFINITY, f64::min);
    let hi = boxes
        .iter()
        .map(|b| b.max)
        .fold(f64::NEG_INFINITY, f64::max);
    let pad = ((hi - lo) * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(root)
        .caption(view.title, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..boxes.len() as f64, (lo - pad)..(hi + pad))?;

    let label_of = |x: &f64| {
        boxes
            .get(x.floor() as usize)
            .map(|b| b.label.clone())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(view.x_label)
        .y_desc(view.y_label)
        .x_labels(boxes.len())
        .x_label_formatter(&label_of)
        .draw()?;

    for (i, b) in boxes.iter().enumerate() {
        let cx = i as f64 + 0.5;
        let half = 0.2;

        // box body, outline, median
        chart.draw_series(std::iter::once(Rectangle::new(
            [(cx - half, b.q1), (cx + half, b.q3)],
            BLUE.mix(0.3).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(cx - half, b.q1), (cx + half, b.q3)],
            BLACK.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(cx - half, b.median), (cx + half, b.median)],
            BLACK.stroke_width(2),
        )))?;

        // whiskers with caps
        for (from, to) in [(b.q1, b.whisker_lo), (b.q3, b.whisker_hi)] {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(cx, from), (cx, to)],
                BLACK.stroke_width(1),
            )))?;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(cx - half / 2.0, to), (cx + half / 2.0, to)],
                BLACK.stroke_width(1),
            )))?;
        }

        chart.draw_series(
            b.outliers
                .iter()
                .map(|&v| Circle::new((cx, v), 3, BLACK.filled())),
        )?;
    }
    Ok(())
}

fn draw_pie(
    view: &DerivedView,
    pairs: &[(String, f64)],
    root: &DrawingArea<BitMapBackend, Shift>,
) -> DrawResult {
    let area = root.titled(view.title, ("sans-serif", 32))?;
    let (w, h) = area.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let radius = f64::from(w.min(h)) * 0.35;

    let sizes: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();
    let total: f64 = sizes.iter().sum();
    // Unreadably thin slices keep their share but lose their label.
    let labels: Vec<String> = pairs
        .iter()
        .map(|(label, v)| {
            if total > 0.0 && v / total >= 0.01 {
                label.clone()
            } else {
                String::new()
            }
        })
        .collect();
    let colors: Vec<RGBColor> = (0..pairs.len())
        .map(|i| SLICE_COLORS[i % SLICE_COLORS.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", 18).into_font().color(&BLACK));
    area.draw(&pie)?;
    Ok(())
}

fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo >= hi {
        return (lo - 1.0, lo + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{ChartKind, DerivedView, ViewData};
    use crate::render::artifact_path;

    fn bar_view() -> DerivedView {
        DerivedView {
            slug: "ship_company_bar",
            title: "Top 10 Companies by Number of Ships",
            x_label: "Company",
            y_label: "Number of Ships",
            kind: ChartKind::Bar,
            data: ViewData::Labelled(vec![
                ("Maersk".to_string(), 2.0),
                ("MSC".to_string(), 1.0),
            ]),
        }
    }

    #[test]
    fn missing_output_directory_is_render_failed() {
        let renderer = BitmapRenderer::default();
        let dest = Path::new("no/such/dir/ship_company_bar.png");
        let err = renderer.render(&bar_view(), dest).unwrap_err();
        assert!(matches!(err, PipelineError::RenderFailed { .. }), "got {err:?}");
    }

    #[test]
    fn padded_range_handles_degenerate_samples() {
        assert_eq!(padded_range([5.0].into_iter()), (4.0, 6.0));
        let (lo, hi) = padded_range([0.0, 100.0].into_iter());
        assert_eq!((lo, hi), (-5.0, 105.0));
    }

    #[test]
    fn artifact_path_uses_the_view_slug() {
        let dest = artifact_path(Path::new("data"), &bar_view());
        assert_eq!(dest, Path::new("data/ship_company_bar.png"));
    }
}
