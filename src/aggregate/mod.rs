//! Derives the seven summary views from the canonical fleet rows.

use std::collections::{BTreeMap, HashMap};

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::transform::ShipRecord;

/// Bins in the built-year histogram.
pub const YEAR_BINS: usize = 20;

/// Entries kept by the ranking views.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Histogram,
    Scatter,
    Box,
    Line,
    Pie,
}

/// Five-number summary plus 1.5·IQR outliers for one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub label: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Extreme samples still inside the fences; whisker endpoints.
    pub whisker_lo: f64,
    pub whisker_hi: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    /// Ordered (label, value) pairs.
    Labelled(Vec<(String, f64)>),
    /// Raw numeric sample, insertion order preserved.
    Points(Vec<(f64, f64)>),
    /// One box per dimension.
    Boxes(Vec<BoxStats>),
}

/// One computed view plus the metadata its chart needs. Ephemeral:
/// recomputed on every run, never persisted.
#[derive(Debug, Clone)]
pub struct DerivedView {
    /// Stable artifact stem; the renderer derives the file name from it.
    pub slug: &'static str,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub kind: ChartKind,
    pub data: ViewData,
}

/// Compute all seven views. Fails with `EmptyDataset` when there are no
/// rows; every view definition below assumes at least one.
pub fn derive_views(ships: &[ShipRecord]) -> Result<Vec<DerivedView>> {
    if ships.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }
    let views = vec![
        top_companies(ships),
        built_year_histogram(ships),
        gt_vs_dwt(ships),
        size_spread(ships),
        yearly_trend(ships),
        longest_ships(ships),
        name_shares(ships),
    ];
    info!(views = views.len(), rows = ships.len(), "views derived");
    Ok(views)
}

/// Top 10 companies by ship count; ties keep first-encountered order.
pub fn top_companies(ships: &[ShipRecord]) -> DerivedView {
    let mut counts = counts_in_first_seen_order(ships.iter().map(|s| s.company_name.as_str()));
    counts.sort_by(|a, b| b.1.total_cmp(&a.1)); // stable: ties stay first-seen
    counts.truncate(TOP_N);
    DerivedView {
        slug: "ship_company_bar",
        title: "Top 10 Companies by Number of Ships",
        x_label: "Company",
        y_label: "Number of Ships",
        kind: ChartKind::Bar,
        data: ViewData::Labelled(counts),
    }
}

/// Built years bucketed into [`YEAR_BINS`] equal-width bins spanning
/// exactly [min, max] of the observed years, ascending by lower bound.
pub fn built_year_histogram(ships: &[ShipRecord]) -> DerivedView {
    let min = ships.iter().map(|s| s.built_year).min().unwrap();
    let max = ships.iter().map(|s| s.built_year).max().unwrap();
    let span = (max - min) as f64;
    let width = if span > 0.0 { span / YEAR_BINS as f64 } else { 1.0 };

    let mut counts = vec![0u64; YEAR_BINS];
    for ship in ships {
        let offset = (ship.built_year - min) as f64;
        let idx = ((offset / width) as usize).min(YEAR_BINS - 1); // max lands in the last bin
        counts[idx] += 1;
    }

    let bins = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let lower = min as f64 + width * i as f64;
            (format!("{lower:.1}"), c as f64)
        })
        .collect();

    DerivedView {
        slug: "ship_built_year_hist",
        title: "Distribution of Ship Built Year",
        x_label: "Built Year",
        y_label: "Number of Ships",
        kind: ChartKind::Histogram,
        data: ViewData::Labelled(bins),
    }
}

/// Every (GT, DWT) pair, unfiltered, in input order.
pub fn gt_vs_dwt(ships: &[ShipRecord]) -> DerivedView {
    let points = ships
        .iter()
        .map(|s| (s.gross_tonnage, s.deadweight_tonnage))
        .collect();
    DerivedView {
        slug: "gt_vs_dwt_scatter",
        title: "Gross Tonnage vs. Deadweight Tonnage",
        x_label: "Gross Tonnage (GT)",
        y_label: "Deadweight Tonnage (DWT)",
        kind: ChartKind::Scatter,
        data: ViewData::Points(points),
    }
}

/// Five-number summary and outliers for length and width independently.
pub fn size_spread(ships: &[ShipRecord]) -> DerivedView {
    let lengths = ships.iter().map(|s| s.length).collect();
    let widths = ships.iter().map(|s| s.width).collect();
    DerivedView {
        slug: "ship_size_box",
        title: "Distribution of Ship Sizes",
        x_label: "Dimension",
        y_label: "Size (meters)",
        kind: ChartKind::Box,
        data: ViewData::Boxes(vec![
            five_number_summary("Length", lengths),
            five_number_summary("Width", widths),
        ]),
    }
}

/// Ships built per distinct year present, ascending by year.
pub fn yearly_trend(ships: &[ShipRecord]) -> DerivedView {
    let mut per_year: BTreeMap<i32, u64> = BTreeMap::new();
    for ship in ships {
        *per_year.entry(ship.built_year).or_default() += 1;
    }
    let points = per_year
        .into_iter()
        .map(|(year, count)| (year as f64, count as f64))
        .collect();
    DerivedView {
        slug: "yearly_trends_line",
        title: "Yearly Ship Construction Trends",
        x_label: "Year",
        y_label: "Number of Ships Built",
        kind: ChartKind::Line,
        data: ViewData::Points(points),
    }
}

/// The 10 rows with the largest length, descending; ties keep input order.
pub fn longest_ships(ships: &[ShipRecord]) -> DerivedView {
    let mut ranked: Vec<&ShipRecord> = ships.iter().collect();
    ranked.sort_by(|a, b| b.length.total_cmp(&a.length)); // stable
    ranked.truncate(TOP_N);
    let pairs = ranked
        .into_iter()
        .map(|s| (s.ship_name.clone(), s.length))
        .collect();
    DerivedView {
        slug: "largest_ships_length",
        title: "Top 10 Largest Ships by Length",
        x_label: "Ship Name",
        y_label: "Length (meters)",
        kind: ChartKind::Bar,
        data: ViewData::Labelled(pairs),
    }
}

/// Occurrences per ship name, descending by count; rendered as shares of
/// the total.
pub fn name_shares(ships: &[ShipRecord]) -> DerivedView {
    let mut counts = counts_in_first_seen_order(ships.iter().map(|s| s.ship_name.as_str()));
    counts.sort_by(|a, b| b.1.total_cmp(&a.1));
    DerivedView {
        slug: "ship_name_pie",
        title: "Ship Name Distribution",
        x_label: "",
        y_label: "",
        kind: ChartKind::Pie,
        data: ViewData::Labelled(counts),
    }
}

/// Count occurrences of each key, keeping groups in the order they were
/// first encountered.
fn counts_in_first_seen_order<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, f64)> {
    let mut order: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for key in keys {
        match index.get(key) {
            Some(&i) => order[i].1 += 1.0,
            None => {
                index.insert(key, order.len());
                order.push((key.to_string(), 1.0));
            }
        }
    }
    order
}

fn five_number_summary(label: &str, mut values: Vec<f64>) -> BoxStats {
    values.sort_by(f64::total_cmp);
    let min = values[0];
    let max = *values.last().unwrap();
    let q1 = quantile(&values, 0.25);
    let median = quantile(&values, 0.5);
    let q3 = quantile(&values, 0.75);

    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;
    let outliers: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();
    let whisker_lo = values.iter().copied().find(|v| *v >= lo_fence).unwrap_or(min);
    let whisker_hi = values
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= hi_fence)
        .unwrap_or(max);

    BoxStats {
        label: label.to_string(),
        min,
        q1,
        median,
        q3,
        max,
        whisker_lo,
        whisker_hi,
        outliers,
    }
}

/// Quantile with linear interpolation between the closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
