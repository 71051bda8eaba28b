//! Forecast line chart rasterized to PNG

use crate::error::AssemblyError;
use crate::models::Forecast;
use plotters::prelude::*;
use std::fmt::Display;

const LINE_COLOR: RGBColor = RGBColor(0, 70, 122);
const BAND_COLOR: RGBColor = RGBColor(150, 180, 205);
const GRID_COLOR: RGBColor = RGBColor(225, 225, 225);
const MARKER_COLOR: RGBColor = RGBColor(128, 128, 128);
const GRID_LINES: usize = 6;
const DASHES: usize = 24;

/// Encoded chart picture
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

fn chart_error<E: Display>(err: E) -> AssemblyError {
    AssemblyError::Chart(err.to_string())
}

fn encode_error<E: Display>(err: E) -> AssemblyError {
    AssemblyError::Encode(err.to_string())
}

/// Draw `forecast` as a line with point markers and a dashed vertical
/// divider at `marker_index`
pub fn render_chart(
    forecast: &Forecast,
    marker_index: usize,
    width: u32,
    height: u32,
) -> Result<ChartImage, AssemblyError> {
    let points = forecast.points();
    if points.len() < 2 || marker_index >= points.len() {
        return Err(AssemblyError::Chart(format!(
            "Cannot place marker {} on a chart of {} points",
            marker_index,
            points.len()
        )));
    }
    if width == 0 || height == 0 {
        return Err(AssemblyError::Chart("Chart size must be non-zero".to_string()));
    }

    let first = points[0].date;
    let x_of = |i: usize| (points[i].date - first).num_days() as f64;
    let line: Vec<(f64, f64)> = (0..points.len()).map(|i| (x_of(i), points[i].value)).collect();
    let lower: Vec<(f64, f64)> = (0..points.len()).map(|i| (x_of(i), points[i].lower)).collect();
    let upper: Vec<(f64, f64)> = (0..points.len()).map(|i| (x_of(i), points[i].upper)).collect();

    let x_max = x_of(points.len() - 1);
    let (mut y_min, mut y_max) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        (lo.min(p.value).min(p.lower), hi.max(p.value).max(p.upper))
    });
    let pad = ((y_max - y_min) * 0.05).max(1.0);
    y_min -= pad;
    y_max += pad;

    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(30)
            .build_cartesian_2d(0.0..x_max, y_min..y_max)
            .map_err(chart_error)?;

        for i in 0..=GRID_LINES {
            let y = y_min + (y_max - y_min) * i as f64 / GRID_LINES as f64;
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0.0, y), (x_max, y)],
                    GRID_COLOR.stroke_width(1),
                )))
                .map_err(chart_error)?;
        }

        for band in [lower, upper] {
            chart
                .draw_series(LineSeries::new(band, BAND_COLOR.stroke_width(1)))
                .map_err(chart_error)?;
        }

        chart
            .draw_series(LineSeries::new(line.clone(), LINE_COLOR.stroke_width(2)))
            .map_err(chart_error)?;
        chart
            .draw_series(line.iter().map(|&p| Circle::new(p, 4, LINE_COLOR.filled())))
            .map_err(chart_error)?;

        let marker_x = x_of(marker_index);
        let dash = (y_max - y_min) / (DASHES * 2) as f64;
        chart
            .draw_series((0..DASHES).map(|k| {
                let start = y_min + dash * (2 * k) as f64;
                PathElement::new(
                    vec![(marker_x, start), (marker_x, start + dash)],
                    MARKER_COLOR.stroke_width(2),
                )
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    let mut png_bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_bytes, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(encode_error)?;
        writer.write_image_data(&pixels).map_err(encode_error)?;
    }

    Ok(ChartImage {
        png: png_bytes,
        width_px: width,
        height_px: height,
    })
}
