use super::state::{AppState, RunPhase};
use crate::pipeline::{RunReport, MODEL_COUNT};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Curve colors, fixed per model so the legend stays stable.
const ACTUAL_COLOR: Color = Color::White;
const MODEL_COLORS: [Color; MODEL_COUNT] = [Color::Blue, Color::Green, Color::Red];

pub fn draw(f: &mut Frame, state: &AppState, show_decomposition: bool, spinner_frame: u8) {
    if let Some(error) = &state.error {
        draw_error(f, state, error);
        return;
    }

    let Some(report) = &state.report else {
        draw_progress(f, state, spinner_frame);
        return;
    };

    if show_decomposition {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(f.area());

        draw_header(f, state, report, chunks[0], spinner_frame);
        draw_trend_chart(f, report, chunks[1]);
        draw_seasonal_chart(f, report, chunks[2]);
        draw_footer(f, chunks[3], true);
        return;
    }

    let preview_height = report.preview_rows.len() as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(preview_height),
            Constraint::Length((MODEL_COUNT + 3) as u16),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, state, report, chunks[0], spinner_frame);
    draw_preview(f, report, chunks[1]);
    draw_results(f, report, chunks[2]);
    draw_overlay_chart(f, report, chunks[3]);
    draw_footer(f, chunks[4], false);
}

fn draw_error(f: &mut Frame, state: &AppState, error: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Run failed",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(error.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Fix the file and run again. Press q to exit.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let block = Block::default()
        .title(format!(" demandcast — {} ", state.file_name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let para = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(para, f.area());
}

fn draw_progress(f: &mut Frame, state: &AppState, spinner_frame: u8) {
    let ch = SPINNER_FRAMES[(spinner_frame as usize) % SPINNER_FRAMES.len()];
    let status = match &state.phase {
        RunPhase::Loading => "Loading and validating data...".to_string(),
        RunPhase::Fitting { model, index } => {
            format!("Fitting {} ({}/{})...", model, index, MODEL_COUNT)
        }
        RunPhase::Evaluating => "Scoring forecasts...".to_string(),
        RunPhase::Done | RunPhase::Failed => String::new(),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} {}", ch, status),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Elapsed: {}", state.elapsed()),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let block = Block::default()
        .title(format!(" demandcast — {} ", state.file_name))
        .borders(Borders::ALL);
    let para = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(para, f.area());
}

fn draw_header(f: &mut Frame, state: &AppState, report: &RunReport, area: Rect, spinner_frame: u8) {
    let activity = if state.is_running() {
        let ch = SPINNER_FRAMES[(spinner_frame as usize) % SPINNER_FRAMES.len()];
        Span::styled(format!(" {} RUN", ch), Style::default().fg(Color::Cyan))
    } else {
        Span::styled(" DONE", Style::default().fg(Color::Green))
    };

    let mut spans = vec![Span::raw(format!(
        " {} | {} weeks | train {} / test {}",
        report.file_name,
        report.series.len(),
        report.train_len,
        report.test_len,
    ))];
    if report.dropped_rows > 0 {
        spans.push(Span::styled(
            format!(" | {} rows dropped", report.dropped_rows),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::raw(format!(" | Up: {}", state.elapsed())));
    spans.push(activity);

    let para = Paragraph::new(Line::from(spans))
        .block(Block::default().title(" demandcast ").borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_preview(f: &mut Frame, report: &RunReport, area: Rect) {
    let ncols = report.preview_headers.len().max(1);
    let header = Row::new(
        report
            .preview_headers
            .iter()
            .map(|h| Cell::from(h.clone()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = report
        .preview_rows
        .iter()
        .map(|record| Row::new(record.iter().map(|c| Cell::from(c.clone())).collect::<Vec<_>>()))
        .collect();

    let constraints = vec![Constraint::Ratio(1, ncols as u32); ncols];
    let table = Table::new(rows, constraints)
        .header(header)
        .block(Block::default().title(" Raw Data Preview ").borders(Borders::ALL));
    f.render_widget(table, area);
}

fn draw_results(f: &mut Frame, report: &RunReport, area: Rect) {
    let header = Row::new(vec!["Model", "RMSE", ""])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = report
        .scores
        .iter()
        .map(|score| {
            let is_best = score.model == report.best_model;
            let style = if is_best {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(score.model.clone()),
                Cell::from(format!("{:.2}", score.rmse)),
                Cell::from(if is_best { "best" } else { "" }),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(Block::default().title(" Model Performance (RMSE) ").borders(Borders::ALL));
    f.render_widget(table, area);
}

fn draw_overlay_chart(f: &mut Frame, report: &RunReport, area: Rect) {
    let actual: Vec<(f64, f64)> = report
        .series
        .values()
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();

    // Forecast curves start where the test window starts; a model with
    // fitted history (Seasonal-Trend) draws one continuous curve from
    // the first week through the forecast horizon.
    let offset = report.train_len;
    let curves: Vec<Vec<(f64, f64)>> = report
        .forecasts
        .iter()
        .map(|fc| {
            fc.history
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v))
                .chain(
                    fc.values
                        .iter()
                        .enumerate()
                        .map(|(i, &v)| ((offset + i) as f64, v)),
                )
                .collect()
        })
        .collect();

    let mut datasets = vec![Dataset::default()
        .name("Actual")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(ACTUAL_COLOR))
        .data(&actual)];
    for (i, fc) in report.forecasts.iter().enumerate() {
        datasets.push(
            Dataset::default()
                .name(fc.model.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(MODEL_COLORS[i % MODEL_COLORS.len()]))
                .data(&curves[i]),
        );
    }

    let all_values = actual
        .iter()
        .map(|p| p.1)
        .chain(curves.iter().flatten().map(|p| p.1));
    let (y_min, y_max) = padded_bounds(all_values);
    let x_max = (report.series.len().saturating_sub(1)) as f64;

    let dates = report.series.dates();
    let x_labels: Vec<String> = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => vec![
            first.format("%d/%m/%y").to_string(),
            last.format("%d/%m/%y").to_string(),
        ],
        _ => vec![],
    };

    let chart = Chart::new(datasets)
        .block(Block::default().title(" Forecast Comparison ").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max.max(1.0)])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![format!("{:.0}", y_min), format!("{:.0}", y_max)]),
        );
    f.render_widget(chart, area);
}

fn draw_trend_chart(f: &mut Frame, report: &RunReport, area: Rect) {
    draw_component_chart(f, area, " Trend ", &report.decomposition.trend, Color::Cyan);
}

fn draw_seasonal_chart(f: &mut Frame, report: &RunReport, area: Rect) {
    draw_component_chart(
        f,
        area,
        " Yearly Seasonality ",
        &report.decomposition.seasonal,
        Color::Magenta,
    );
}

fn draw_component_chart(f: &mut Frame, area: Rect, title: &str, values: &[f64], color: Color) {
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    let (y_min, y_max) = padded_bounds(points.iter().map(|p| p.1));

    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, (values.len().saturating_sub(1)) as f64]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![format!("{:.0}", y_min), format!("{:.0}", y_max)]),
        );
    f.render_widget(chart, area);
}

fn draw_footer(f: &mut Frame, area: Rect, show_decomposition: bool) {
    let toggle = if show_decomposition {
        "[d] forecast view"
    } else {
        "[d] trend & seasonality"
    };
    let para = Paragraph::new(Line::from(Span::styled(
        format!(" [q] quit  {}", toggle),
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(para, area);
}

/// Min/max with a 5% margin so curves don't sit on the frame edge.
fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min).abs() * 0.05).max(1.0);
    (min - pad, max + pad)
}
