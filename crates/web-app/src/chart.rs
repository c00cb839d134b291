use chrono::{Days, NaiveDate};
use gloo_utils::window;
use plotters::{
    chart::ChartBuilder,
    prelude::{Circle, IntoDrawingArea, SVGBackend},
    series::{Histogram, LineSeries},
    style::{Color, IntoFont, Palette, Palette99, RGBColor, TextStyle, WHITE},
};
use wasm_bindgen::JsValue;

use crate::Theme;

pub const COLOR_WEIGHT: usize = 8;
pub const COLOR_VOLUME: usize = 6;

pub const OPACITY_LINE: f64 = 0.9;
pub const OPACITY_AREA: f64 = 0.3;

pub const WIDTH_LINE: u32 = 2;
pub const SIZE_POINT: u32 = 3;

pub const FONT: (&str, u32) = ("Roboto", 11);

#[derive(Debug, Clone, PartialEq)]
pub enum PlotType {
    Circle(usize, f64, u32),
    Line(usize, f64, u32),
    Histogram(usize, f64),
}

#[must_use]
pub fn plot_line_with_points(color: usize) -> Vec<PlotType> {
    vec![
        PlotType::Line(color, OPACITY_LINE, WIDTH_LINE),
        PlotType::Circle(color, OPACITY_LINE, SIZE_POINT),
    ]
}

#[must_use]
pub fn plot_histogram(color: usize) -> Vec<PlotType> {
    vec![PlotType::Histogram(color, OPACITY_AREA)]
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub values: Vec<(NaiveDate, f32)>,
    pub plots: Vec<PlotType>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min: f32,
    max: f32,
}

impl Bounds {
    fn min_with_margin(self) -> f32 {
        if self.min <= f32::EPSILON {
            return self.min;
        }
        f32::max(self.min - self.margin(), 0.)
    }

    fn max_with_margin(self) -> f32 {
        self.max + self.margin()
    }

    fn margin(self) -> f32 {
        if (self.max - self.min).abs() > f32::EPSILON {
            return (self.max - self.min) * 0.1;
        }
        0.1
    }
}

/// Plot series of daily values onto a chart.
///
/// The x domain spans from the first to the last date of all series, extended by one day on each
/// side so that single values and histogram bars remain visible. Series are plotted in order,
/// and the plots of each series in the order given in `plots`.
///
/// Returns `None` if there is nothing to show.
#[allow(clippy::missing_errors_doc)]
pub fn plot(data: &[PlotData], theme: &Theme) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if all_zeros(data) {
        return Ok(None);
    }

    let (Some((first, last)), Some(bounds)) = (determine_x_range(data), determine_y_bounds(data))
    else {
        return Ok(None);
    };

    let mut result = String::new();

    {
        let root = SVGBackend::with_string(&mut result, (chart_width(), 200)).into_drawing_area();
        let (color, background_color) = colors(theme);

        root.fill(&background_color)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10f32)
            .x_label_area_size(30f32)
            .y_label_area_size(40f32)
            .build_cartesian_2d(
                first..last,
                bounds.min_with_margin()..bounds.max_with_margin(),
            )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .set_all_tick_mark_size(3u32)
            .axis_style(color.mix(0.3))
            .bold_line_style(color.mix(0.05))
            .light_line_style(color.mix(0.0))
            .label_style(TextStyle::from(FONT.into_font()).color(&color))
            .x_labels(2)
            .y_labels(6)
            .draw()?;

        for plot_data in data {
            let mut values = plot_data.values.clone();
            values.sort_by_key(|e| e.0);

            for plot in &plot_data.plots {
                match *plot {
                    PlotType::Circle(color, opacity, size) => {
                        chart.draw_series(values.iter().map(|(x, y)| {
                            Circle::new((*x, *y), size, Palette99::pick(color).mix(opacity).filled())
                        }))?;
                    }
                    PlotType::Line(color, opacity, size) => {
                        chart.draw_series(LineSeries::new(
                            values.iter().map(|(x, y)| (*x, *y)),
                            Palette99::pick(color).mix(opacity).stroke_width(size),
                        ))?;
                    }
                    PlotType::Histogram(color, opacity) => {
                        let data = Histogram::vertical(&chart)
                            .style(Palette99::pick(color).mix(opacity).filled())
                            .margin(0) // https://github.com/plotters-rs/plotters/issues/300
                            .data(values.iter().map(|(x, y)| (*x, *y)));
                        chart.draw_series(data)?;
                    }
                }
            }
        }

        root.present()?;
    }

    Ok(Some(result))
}

/// CSS color of a series, matching the color used in the chart.
#[must_use]
pub fn color_hex(color: usize, opacity: f64) -> String {
    let plotters::style::RGBAColor(r, g, b, a) = Palette99::pick(color).mix(opacity);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let a = (a.clamp(0.0, 1.0) * 255.0) as u8;
    format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
}

fn all_zeros(data: &[PlotData]) -> bool {
    data.iter()
        .all(|plot_data| plot_data.values.iter().all(|(_, v)| *v == 0.0))
}

fn colors(theme: &Theme) -> (RGBColor, RGBColor) {
    let dark = RGBColor(20, 22, 26);
    match theme {
        Theme::System | Theme::Light => (dark, WHITE),
        Theme::Dark => (WHITE, dark),
    }
}

fn determine_x_range(data: &[PlotData]) -> Option<(NaiveDate, NaiveDate)> {
    let dates = data
        .iter()
        .flat_map(|plot_data| plot_data.values.iter().map(|(d, _)| *d));
    let first = dates.clone().min()?;
    let last = dates.max()?;
    Some((
        first.checked_sub_days(Days::new(1)).unwrap_or(first),
        last.checked_add_days(Days::new(1)).unwrap_or(last),
    ))
}

fn determine_y_bounds(data: &[PlotData]) -> Option<Bounds> {
    data.iter()
        .flat_map(|plot_data| plot_data.values.iter().map(|(_, v)| *v))
        .fold(None, |bounds: Option<Bounds>, value| {
            Some(bounds.map_or(
                Bounds {
                    min: f32::min(value, 0.),
                    max: value,
                },
                |b| Bounds {
                    min: f32::min(b.min, value),
                    max: f32::max(b.max, value),
                },
            ))
        })
}

fn chart_width() -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    u32::min(
        u32::max(
            window()
                .inner_width()
                .unwrap_or(JsValue::UNDEFINED)
                .as_f64()
                .unwrap_or(420.) as u32
                - 20,
            300,
        ),
        960,
    )
}
