use std::error::Error;
use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use thiserror::Error;

use crate::models::ProgressSnapshot;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 1000;
const FONT_FAMILY: &str = "sans-serif";

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("need at least two snapshots, got {0}")]
    NotEnoughData(usize),
    #[error("failed to draw chart: {0}")]
    Drawing(String),
    #[error("failed to encode chart: {0}")]
    Encoding(String),
    #[error("failed to load font: {0}")]
    Font(String),
}

type DrawResult = Result<(), Box<dyn Error>>;

/// Регистрирует шрифт для подписей графиков. Вызывается один раз при старте.
pub fn register_chart_font(path: &Path) -> Result<(), ChartError> {
    let bytes = std::fs::read(path).map_err(|e| ChartError::Font(e.to_string()))?;
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());

    register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| ChartError::Font(format!("invalid font data in {}", path.display())))
}

struct Series {
    minutes: Vec<f64>,
    water: Vec<f64>,
    consumed: Vec<f64>,
    burned: Vec<f64>,
    net: Vec<f64>,
}

impl Series {
    fn from_history(history: &[ProgressSnapshot]) -> Self {
        let start = history[0].timestamp;
        Self {
            minutes: history
                .iter()
                .map(|s| (s.timestamp - start).num_milliseconds() as f64 / 60_000.0)
                .collect(),
            water: history.iter().map(|s| s.logged_water as f64).collect(),
            consumed: history.iter().map(|s| s.logged_calories).collect(),
            burned: history.iter().map(|s| s.burned_calories).collect(),
            net: history.iter().map(ProgressSnapshot::net_calories).collect(),
        }
    }

    fn x_range(&self) -> std::ops::Range<f64> {
        let max = self.minutes.iter().copied().fold(0.0, f64::max);
        0.0..max.max(1.0)
    }
}

fn y_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> std::ops::Range<f64> {
    let (min, max) = values
        .into_iter()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let pad = ((max - min) * 0.1).max(1.0);
    (min - pad)..(max + pad)
}

/// Два графика друг под другом: вода и калории (потреблено, сожжено, баланс). Возвращает PNG.
pub fn render_progress_chart(history: &[ProgressSnapshot]) -> Result<Vec<u8>, ChartError> {
    if history.len() < 2 {
        return Err(ChartError::NotEnoughData(history.len()));
    }
    let series = Series::from_history(history);

    // Без зарегистрированного шрифта подписи не рисуются, строим график без текста
    let pixels = match draw(&series, true) {
        Ok(pixels) => pixels,
        Err(e) => {
            log::debug!("Chart text unavailable ({}), rendering without labels", e);
            draw(&series, false)?
        }
    };

    encode_png(pixels)
}

fn draw(series: &Series, labelled: bool) -> Result<Vec<u8>, ChartError> {
    let mut pixels = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (WIDTH, HEIGHT)).into_drawing_area();
        draw_panels(&root, series, labelled).map_err(|e| ChartError::Drawing(e.to_string()))?;
        root.present().map_err(|e| ChartError::Drawing(e.to_string()))?;
    }
    Ok(pixels)
}

fn draw_panels(root: &DrawingArea<BitMapBackend, Shift>, series: &Series, labelled: bool) -> DrawResult {
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 1));

    draw_panel(
        &panels[0],
        series,
        "Прогресс по воде",
        "Выпито воды (мл)",
        &[("Вода", &series.water, BLUE)],
        labelled,
    )?;
    draw_panel(
        &panels[1],
        series,
        "Прогресс по калориям",
        "Калории",
        &[
            ("Потреблено", &series.consumed, BLUE),
            ("Сожжено", &series.burned, RED),
            ("Баланс", &series.net, GREEN),
        ],
        labelled,
    )?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend, Shift>,
    series: &Series,
    title: &str,
    y_desc: &str,
    lines: &[(&str, &Vec<f64>, RGBColor)],
    labelled: bool,
) -> DrawResult {
    let y = y_range(lines.iter().flat_map(|(_, values, _)| values.iter()));

    let mut builder = ChartBuilder::on(area);
    builder.margin(20);
    if labelled {
        builder
            .caption(title, (FONT_FAMILY, 24))
            .x_label_area_size(40)
            .y_label_area_size(60);
    }
    let mut chart = builder.build_cartesian_2d(series.x_range(), y)?;

    if labelled {
        chart
            .configure_mesh()
            .x_desc("Время (мин)")
            .y_desc(y_desc)
            .label_style((FONT_FAMILY, 14))
            .draw()?;
    }

    for &(name, values, color) in lines {
        let points: Vec<(f64, f64)> = series.minutes.iter().copied().zip(values.iter().copied()).collect();

        let line = chart.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?;
        if labelled {
            line.label(name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }
        chart.draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled())))?;
    }

    if labelled && lines.len() > 1 {
        chart
            .configure_series_labels()
            .label_font((FONT_FAMILY, 14))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

fn encode_png(pixels: Vec<u8>) -> Result<Vec<u8>, ChartError> {
    let image = RgbImage::from_raw(WIDTH, HEIGHT, pixels)
        .ok_or_else(|| ChartError::Encoding("pixel buffer has wrong size".to_string()))?;

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ChartError::Encoding(e.to_string()))?;
    Ok(png)
}
