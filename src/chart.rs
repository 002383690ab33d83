//! Line charts of population series, rendered to **SVG** or **PNG**.
//!
//! - One line per country, Microsoft Office palette
//! - Y axis scaled to thousands/millions/billions by magnitude
//! - Missing years break the line instead of dropping to zero
//!
//! Text needs a TrueType font (`ab_glyph` does not discover OS fonts). The
//! font is read from `$POPSTAT_FONT` or a few well-known system paths; when
//! none is usable the chart is still drawn, without caption, axis labels or legend.

use crate::format::choose_axis_scale;
use crate::models::PopulationSeries;
use crate::views::Comparison;
use anyhow::{Result, anyhow, bail};
use log::{debug, warn};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable naming a `.ttf` file to use for chart text.
pub const FONT_ENV: &str = "POPSTAT_FONT";

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Microsoft Office (2013+) chart series palette.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn series_color(idx: usize) -> RGBColor {
    OFFICE10[idx % OFFICE10.len()]
}

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Register a "sans-serif" font once. Returns whether chart text can be drawn.
fn ensure_fonts_registered() -> bool {
    *FONT_READY.get_or_init(|| {
        let from_env = std::env::var_os(FONT_ENV).map(PathBuf::from);
        let candidates = from_env
            .into_iter()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from));
        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            // Plotters keeps a 'static reference for the process lifetime.
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            if plotters::style::register_font("sans-serif", FontStyle::Normal, bytes).is_ok() {
                debug!("chart font: {}", path.display());
                return true;
            }
        }
        false
    })
}

/// One labelled line; `None` values are gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub label: String,
    pub points: Vec<(i32, Option<u64>)>,
}

impl ChartLine {
    pub fn from_series(series: &PopulationSeries) -> Self {
        Self {
            label: series.country_name.clone(),
            points: crate::series::sort_series(&series.points)
                .into_iter()
                .map(|p| (p.year, Some(p.value)))
                .collect(),
        }
    }

    /// Contiguous runs of present values.
    pub fn segments(&self) -> Vec<Vec<(i32, u64)>> {
        let mut out: Vec<Vec<(i32, u64)>> = Vec::new();
        let mut cur: Vec<(i32, u64)> = Vec::new();
        for &(year, v) in &self.points {
            match v {
                Some(v) => cur.push((year, v)),
                None if !cur.is_empty() => out.push(std::mem::take(&mut cur)),
                None => {}
            }
        }
        if !cur.is_empty() {
            out.push(cur);
        }
        out
    }
}

/// Chart a single country's series.
pub fn plot_series<P: AsRef<Path>>(
    series: &PopulationSeries,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    let title = format!("Population of {}", series.country_name);
    plot_lines(&[ChartLine::from_series(series)], out_path, width, height, &title)
}

/// Chart both countries of a comparison over the primary country's years.
pub fn plot_comparison<P: AsRef<Path>>(
    cmp: &Comparison,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    let a = ChartLine {
        label: cmp.a.country_name.clone(),
        points: cmp.merged.iter().map(|r| (r.year, r.value_a)).collect(),
    };
    let b = ChartLine {
        label: cmp.b.country_name.clone(),
        points: cmp.merged.iter().map(|r| (r.year, r.value_b)).collect(),
    };
    plot_lines(&[a, b], out_path, width, height, &cmp.title())
}

/// Render lines to `out_path`; `.svg` selects SVG, anything else PNG.
pub fn plot_lines<P: AsRef<Path>>(
    lines: &[ChartLine],
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
) -> Result<()> {
    let present: Vec<(i32, u64)> = lines.iter().flat_map(|l| l.segments()).flatten().collect();
    if present.is_empty() {
        bail!("no data to plot");
    }
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    let (mut min_year, mut max_year) = present
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), &(y, _)| (lo.min(y), hi.max(y)));
    if min_year == max_year {
        min_year -= 1;
        max_year += 1;
    }

    let max_val = present.iter().map(|&(_, v)| v).max().unwrap_or(0) as f64;
    let (yscale, scale_word) = choose_axis_scale(max_val);
    let y_max = if max_val > 0.0 {
        max_val / yscale * 1.05
    } else {
        1.0
    };
    let y_desc = if scale_word.is_empty() {
        "Population".to_string()
    } else {
        format!("Population ({scale_word})")
    };

    let layout = Layout {
        years: (min_year, max_year),
        y_max,
        yscale,
        y_desc,
        title: title.to_string(),
        labelled: ensure_fonts_registered(),
    };
    if !layout.labelled {
        warn!("no usable font found (set {FONT_ENV}); drawing chart without text");
    }

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, lines, &layout)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, lines, &layout)
    }
}

struct Layout {
    years: (i32, i32),
    y_max: f64,
    yscale: f64,
    y_desc: String,
    title: String,
    labelled: bool,
}

fn plot_err<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    anyhow!("plotting error: {e:?}")
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, lines: &[ChartLine], layout: &Layout) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(plot_err)?;

    let (x_min, x_max) = layout.years;
    let mut builder = ChartBuilder::on(&root);
    builder.margin(16);
    if layout.labelled {
        builder
            .caption(layout.title.as_str(), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(64);
    }
    let mut chart = builder
        .build_cartesian_2d(x_min..x_max, 0f64..layout.y_max)
        .map_err(plot_err)?;

    if layout.labelled {
        let x_labels = ((x_max - x_min + 1) as usize).min(12);
        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc(layout.y_desc.as_str())
            .x_labels(x_labels)
            .y_labels(8)
            .x_label_formatter(&|x: &i32| x.to_string())
            .y_label_formatter(&|v: &f64| format!("{v:.1}"))
            .draw()
            .map_err(plot_err)?;
    }

    for (idx, line) in lines.iter().enumerate() {
        let color = series_color(idx);
        let mut in_legend = false;
        for seg in line.segments() {
            let scaled: Vec<(i32, f64)> = seg
                .iter()
                .map(|&(x, v)| (x, v as f64 / layout.yscale))
                .collect();
            let anno = chart
                .draw_series(LineSeries::new(scaled.clone(), color.stroke_width(2)))
                .map_err(plot_err)?;
            if layout.labelled && !in_legend {
                anno.label(line.label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
                in_legend = true;
            }
            // Single-year segments have no line; the marker keeps them visible.
            chart
                .draw_series(scaled.iter().map(|&p| Circle::new(p, 3, color.filled())))
                .map_err(plot_err)?;
        }
    }

    if layout.labelled {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    Ok(())
}
