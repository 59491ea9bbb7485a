use crate::aggregate::AggregationResult;
use crate::dashboard::{grid_dimensions, Dashboard, Panel, PanelContent};
use crate::palette::{self, resolve_color, ColorPalette};
use crate::parser::ast::{ChartSpec, Geom};
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::f64::consts::{FRAC_PI_2, TAU};

type CategoryChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Draw the whole dashboard and encode it in the requested format
pub fn render_dashboard(dashboard: &Dashboard, options: &RenderOptions) -> Result<Vec<u8>> {
    if options.width == 0 || options.height == 0 {
        anyhow::bail!(
            "Canvas dimensions must be positive (got {}x{})",
            options.width,
            options.height
        );
    }

    match options.format {
        OutputFormat::Png => render_png(dashboard, options.width, options.height),
        OutputFormat::Svg => render_svg(dashboard, options.width, options.height),
    }
}

fn render_png(dashboard: &Dashboard, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_dashboard(&root, dashboard)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn render_svg(dashboard: &Dashboard, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_dashboard(&root, dashboard)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg.into_bytes())
}

fn draw_dashboard<DB>(root: &DrawingArea<DB, Shift>, dashboard: &Dashboard) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&palette::BACKGROUND)
        .context("Failed to fill background")?;

    let body = root
        .titled(
            &dashboard.title,
            ("sans-serif", 36).into_font().color(&palette::HEADING),
        )
        .context("Failed to draw dashboard title")?;

    let (rows, cols) = grid_dimensions(dashboard.panels.len());
    let cells = body.split_evenly((rows, cols));

    for (panel, cell) in dashboard.panels.iter().zip(cells.iter()) {
        let area = cell.margin(10, 10, 10, 10);
        draw_panel(&area, panel)
            .with_context(|| format!("Failed to draw panel '{}'", panel.name))?;
    }

    Ok(())
}

fn draw_panel<DB>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&palette::PANEL)
        .context("Failed to fill panel")?;

    let spec = &panel.spec;
    match &panel.content {
        PanelContent::Unavailable(reason) => {
            draw_message(area, spec.title(), "Data unavailable", Some(reason.as_str()))
        }
        PanelContent::Data(result) if result.is_empty() => {
            draw_message(area, spec.title(), "No data", None)
        }
        PanelContent::Data(result) => match spec.geom {
            Geom::Bar => draw_bar(area, spec, result),
            Geom::Line => draw_line(area, spec, result),
            Geom::Pie => draw_pie(area, spec, result),
        },
    }
}

fn caption_style<'a>() -> TextStyle<'a> {
    ("sans-serif", 22).into_font().color(&palette::TEXT)
}

fn centered(style: TextStyle<'_>) -> TextStyle<'_> {
    style.pos(Pos::new(HPos::Center, VPos::Center))
}

fn draw_message<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    message: &str,
    detail: Option<&str>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let body = area
        .titled(title, caption_style())
        .context("Failed to draw panel title")?;
    let (w, h) = body.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);

    let style = centered(("sans-serif", 26).into_font().color(&palette::MUTED_TEXT));
    body.draw_text(message, &style, center)
        .context("Failed to draw message")?;

    if let Some(detail) = detail {
        let small = centered(("sans-serif", 14).into_font().color(&palette::MUTED_TEXT));
        body.draw_text(&truncate(detail, 90), &small, (center.0, center.1 + 32))
            .context("Failed to draw message detail")?;
    }

    Ok(())
}

fn draw_bar<DB>(area: &DrawingArea<DB, Shift>, spec: &ChartSpec, result: &AggregationResult) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let labels = result.labels();
    let mut chart = category_chart(area, spec, result)?;
    draw_category_mesh(&mut chart, spec, &labels, result.max_count())?;

    let categorical = ColorPalette::categorical();
    let single = spec
        .style
        .color
        .as_deref()
        .map(|c| resolve_color(Some(c), spec.style.alpha, palette::HEADING));

    chart
        .draw_series(result.groups.iter().enumerate().map(|(idx, group)| {
            let color = single.unwrap_or_else(|| resolve_color(None, spec.style.alpha, categorical.get(idx)));
            let x = idx as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, group.count as f64)], color.filled())
        }))
        .context("Failed to draw bars")?;

    Ok(())
}

fn draw_line<DB>(area: &DrawingArea<DB, Shift>, spec: &ChartSpec, result: &AggregationResult) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let labels = result.labels();
    let mut chart = category_chart(area, spec, result)?;
    draw_category_mesh(&mut chart, spec, &labels, result.max_count())?;

    let color = resolve_color(spec.style.color.as_deref(), spec.style.alpha, palette::HEADING);
    let points: Vec<(f64, f64)> = result
        .groups
        .iter()
        .enumerate()
        .map(|(idx, g)| (idx as f64, g.count as f64))
        .collect();

    if spec.style.fill {
        chart
            .draw_series(
                AreaSeries::new(points.clone(), 0.0, color.mix(0.2).filled())
                    .border_style(color.stroke_width(2)),
            )
            .context("Failed to draw area series")?;
    } else {
        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .context("Failed to draw line series")?;
    }

    chart
        .draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 4, color.filled())))
        .context("Failed to draw line markers")?;

    Ok(())
}

fn draw_pie<DB>(area: &DrawingArea<DB, Shift>, spec: &ChartSpec, result: &AggregationResult) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let body = area
        .titled(spec.title(), caption_style())
        .context("Failed to draw panel title")?;
    let (w, h) = body.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);

    // Wedges on the left, legend on the right
    let pie_width = (w as f64 * 0.6) as i32;
    let radius = (pie_width.min(h) as f64 / 2.0 - 12.0).max(4.0);
    let center = (pie_width as f64 / 2.0, h as f64 / 2.0);

    let colors = ColorPalette::pie();
    let total = result.total() as f64;
    let mut start = -FRAC_PI_2;

    for (idx, group) in result.groups.iter().enumerate() {
        let sweep = group.count as f64 / total * TAU;
        let color = resolve_color(None, spec.style.alpha, colors.get(idx));
        body.draw(&Polygon::new(wedge_points(center, radius, start, sweep), color.filled()))
            .context("Failed to draw pie wedge")?;
        start += sweep;
    }

    let legend_x = pie_width + 8;
    let row_height = 22;
    let text_style = ("sans-serif", 14).into_font().color(&palette::TEXT);
    for (idx, group) in result.groups.iter().enumerate() {
        let y = 16 + idx as i32 * row_height;
        if y + row_height > h {
            let remaining = result.len() - idx;
            body.draw(&Text::new(format!("... {} more", remaining), (legend_x, y), text_style.clone()))
                .context("Failed to draw legend")?;
            break;
        }
        body.draw(&Rectangle::new(
            [(legend_x, y), (legend_x + 14, y + 14)],
            colors.get(idx).filled(),
        ))
        .context("Failed to draw legend swatch")?;

        let share = group.count as f64 / total * 100.0;
        body.draw(&Text::new(
            format!("{} ({:.1}%)", truncate(&group.key, 28), share),
            (legend_x + 20, y),
            text_style.clone(),
        ))
        .context("Failed to draw legend")?;
    }

    Ok(())
}

fn category_chart<'a, DB>(
    area: &'a DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    result: &AggregationResult,
) -> Result<CategoryChart<'a, DB>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = result.len();
    let y_max = y_upper_bound(result.max_count());

    ChartBuilder::on(area)
        .margin(10)
        .caption(spec.title(), caption_style())
        .x_label_area_size(if n > 8 { 90 } else { 50 })
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y_max)
        .context("Failed to build chart")
}

fn draw_category_mesh<DB>(
    chart: &mut CategoryChart<'_, DB>,
    spec: &ChartSpec,
    labels: &[&str],
    max_count: usize,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let rotate = labels.len() > 8;
    let x_label_style = if rotate {
        ("sans-serif", 12)
            .into_font()
            .transform(FontTransform::Rotate90)
            .color(&palette::TEXT)
    } else {
        ("sans-serif", 14).into_font().color(&palette::TEXT)
    };

    let x_formatter = |x: &f64| category_label(labels, *x);
    let y_formatter = |y: &f64| format!("{:.0}", y);
    let x_desc = spec.labels.x.clone().unwrap_or_else(|| spec.column.clone());
    let y_desc = spec.labels.y.clone().unwrap_or_else(|| "Count".to_string());

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(palette::GRID.stroke_width(1))
        .light_line_style(palette::GRID.mix(0.3).stroke_width(1))
        .axis_style(palette::MUTED_TEXT.stroke_width(1))
        .x_labels(labels.len())
        .y_labels(max_count.clamp(2, 10))
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .x_label_style(x_label_style)
        .y_label_style(("sans-serif", 14).into_font().color(&palette::TEXT))
        .axis_desc_style(("sans-serif", 16).into_font().color(&palette::MUTED_TEXT))
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .context("Failed to draw mesh")?;

    Ok(())
}

/// Label for an x tick: the category at an integer position, blank elsewhere
fn category_label(labels: &[&str], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels
        .get(idx as usize)
        .map(|l| truncate(l, 16))
        .unwrap_or_default()
}

/// Headroom above the tallest bar; at least one unit so an axis can be drawn
fn y_upper_bound(max_count: usize) -> f64 {
    if max_count == 0 {
        1.0
    } else {
        (max_count as f64 * 1.1).max(max_count as f64 + 1.0)
    }
}

/// Closed polygon approximating a pie wedge in pixel coordinates
fn wedge_points(center: (f64, f64), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep / TAU) * 120.0).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push((center.0.round() as i32, center.1.round() as i32));
    for i in 0..=steps {
        let angle = start + sweep * i as f64 / steps as f64;
        points.push((
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        ));
    }
    points
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
