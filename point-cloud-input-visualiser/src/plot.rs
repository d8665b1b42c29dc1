/// Histogram bar charts rendered straight into PNG images.
use crate::error::Result;
use image::{Rgb, RgbImage};
use std::path::Path;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
pub const BAR_GREEN: Rgb<u8> = Rgb([0, 128, 0]);

#[derive(Debug, Clone, Copy)]
pub struct BarChartStyle {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub colour: Rgb<u8>,
    /// Scale bar heights by `log10(1 + value)`.
    pub log_scale: bool,
}

impl Default for BarChartStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            margin: 40,
            colour: BAR_GREEN,
            log_scale: false,
        }
    }
}

impl BarChartStyle {
    pub fn log() -> Self {
        Self {
            log_scale: true,
            ..Self::default()
        }
    }
}

/// Bar heights in pixels for the plot area of `style`
pub fn bar_heights(values: &[f64], style: &BarChartStyle) -> Vec<u32> {
    let plot_height = style.height.saturating_sub(2 * style.margin);
    let scaled: Vec<f64> = values
        .iter()
        .map(|&v| {
            let v = v.max(0.0);
            if style.log_scale { (1.0 + v).log10() } else { v }
        })
        .collect();
    let max = scaled.iter().cloned().fold(0.0, f64::max);
    if max <= 0.0 {
        return vec![0; values.len()];
    }
    scaled
        .iter()
        .map(|&v| ((v / max) * plot_height as f64).round() as u32)
        .collect()
}

/// Bar order of a class chart, `0:name 1:name ...`
pub fn bar_legend(labels: &[String]) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}:{}", i, name))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_bar_chart(values: &[f64], style: &BarChartStyle) -> RgbImage {
    let mut img = RgbImage::from_pixel(style.width, style.height, BACKGROUND);
    if style.width == 0 || style.height == 0 {
        return img;
    }
    let left = style.margin;
    let right = style.width.saturating_sub(style.margin);
    let bottom = style.height.saturating_sub(1);
    let baseline = style.height.saturating_sub(style.margin).min(bottom);

    if !values.is_empty() && right > left {
        let slot = (right - left) as f64 / values.len() as f64;
        for (i, &h) in bar_heights(values, style).iter().enumerate() {
            let x0 = left + (i as f64 * slot).round() as u32;
            let x1 = left + ((i + 1) as f64 * slot).round() as u32;
            // one pixel gap between neighbouring bars
            for x in (x0 + 1)..x1.max(x0 + 1) {
                for y in baseline.saturating_sub(h)..baseline {
                    img.put_pixel(x, y, style.colour);
                }
            }
        }
    }

    for x in left..right {
        img.put_pixel(x, baseline, AXIS);
    }
    for y in style.margin.min(baseline)..=baseline {
        img.put_pixel(left.min(style.width.saturating_sub(1)), y, AXIS);
    }
    img
}

pub fn save_bar_chart(path: &Path, values: &[f64], style: &BarChartStyle) -> Result<()> {
    render_bar_chart(values, style).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallest_bar_fills_plot_area() {
        let style = BarChartStyle::default();
        let heights = bar_heights(&[0.25, 0.5, 0.0], &style);
        assert_eq!(heights, vec![200, 400, 0]);
    }

    #[test]
    fn log_scale_compresses_large_counts() {
        let style = BarChartStyle::log();
        let heights = bar_heights(&[9.0, 99.0], &style);
        assert_eq!(heights, vec![200, 400]);
    }

    #[test]
    fn all_zero_values_draw_no_bars() {
        let style = BarChartStyle::default();
        assert_eq!(bar_heights(&[0.0, 0.0], &style), vec![0, 0]);
        let img = render_bar_chart(&[0.0, 0.0], &style);
        assert_eq!(*img.get_pixel(200, 200), BACKGROUND);
    }

    #[test]
    fn degenerate_canvas_does_not_panic() {
        let flat = BarChartStyle {
            height: 0,
            ..BarChartStyle::default()
        };
        let img = render_bar_chart(&[1.0, 2.0], &flat);
        assert_eq!(img.height(), 0);

        let tight = BarChartStyle {
            width: 10,
            height: 10,
            margin: 40,
            ..BarChartStyle::default()
        };
        let img = render_bar_chart(&[1.0], &tight);
        assert_eq!(img.dimensions(), (10, 10));
    }

    #[test]
    fn legend_lists_bars_in_class_order() {
        let labels = vec!["ground".to_string(), "building".to_string()];
        assert_eq!(bar_legend(&labels), "0:ground 1:building");
        assert_eq!(bar_legend(&[]), "");
    }

    #[test]
    fn bars_are_drawn_above_baseline() {
        let style = BarChartStyle::default();
        let img = render_bar_chart(&[1.0], &style);
        let baseline = style.height - style.margin;
        assert_eq!(*img.get_pixel(style.width / 2, baseline - 1), BAR_GREEN);
        assert_eq!(*img.get_pixel(style.width / 2, style.margin - 1), BACKGROUND);
    }
}
