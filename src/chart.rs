//! Contributor bar chart rasterisation.
//!
//! Draws one bar per author, in ranking order, onto an RGB canvas and
//! encodes it as PNG. The y-axis carries a tick at every integer from zero
//! to the largest count. The image holds no text; callers pair it with a
//! legend built from [`BarChart::bars`].

use anyhow::{Context, Result};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::io::Cursor;

use crate::models::AuthorCount;

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 500;

const MARGIN_LEFT: u32 = 60;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 20;
const MARGIN_BOTTOM: u32 = 40;
const TICK_LEN: u32 = 6;
/// Grid lines are skipped when ticks would sit closer than this.
const MIN_GRID_SPACING: f32 = 4.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const BAR: Rgb<u8> = Rgb([31, 119, 180]);

/// Rendering result.
#[derive(Debug)]
pub enum Chart {
    /// No authors to plot.
    NoData,
    Bars(BarChart),
}

#[derive(Debug)]
pub struct BarChart {
    pub png: Vec<u8>,
    /// Plotted entries, left to right.
    pub bars: Vec<AuthorCount>,
    /// Y-axis tick values, bottom to top.
    pub y_ticks: Vec<usize>,
}

/// Renders `frequencies` as a bar chart.
pub fn render_chart(frequencies: &[AuthorCount]) -> Result<Chart> {
    if frequencies.is_empty() {
        return Ok(Chart::NoData);
    }

    let max = frequencies.iter().map(|f| f.count).max().unwrap_or(0).max(1);
    let y_ticks: Vec<usize> = (0..=max).collect();

    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + plot_h;
    let y_of = |value: usize| -> u32 {
        baseline - ((value as f32 / max as f32) * plot_h as f32).round() as u32
    };

    let spacing = plot_h as f32 / max as f32;
    for &tick in &y_ticks {
        let y = y_of(tick);
        if spacing >= MIN_GRID_SPACING && tick > 0 {
            fill_rect(&mut img, MARGIN_LEFT, y, plot_w, 1, GRID);
        }
        fill_rect(&mut img, MARGIN_LEFT - TICK_LEN, y, TICK_LEN, 1, AXIS);
    }

    let slot = plot_w as f32 / frequencies.len() as f32;
    let bar_w = ((slot * 0.8).floor() as u32).max(1);
    for (i, entry) in frequencies.iter().enumerate() {
        let left = MARGIN_LEFT + (i as f32 * slot + (slot - bar_w as f32) / 2.0).floor() as u32;
        let top = y_of(entry.count);
        fill_rect(&mut img, left, top, bar_w, baseline - top, BAR);
    }

    // Axes last so bars never cover them.
    fill_rect(&mut img, MARGIN_LEFT, MARGIN_TOP, 1, plot_h + 1, AXIS);
    fill_rect(&mut img, MARGIN_LEFT, baseline, plot_w, 1, AXIS);

    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .with_context(|| "Failed to encode contributor chart")?;

    Ok(Chart::Bars(BarChart {
        png,
        bars: frequencies.to_vec(),
        y_ticks,
    }))
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x_end = (x + w).min(img.width());
    let y_end = (y + h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}
