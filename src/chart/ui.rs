//! Chart rendering

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph},
};

use super::{
    metric::{ChartMetric, Series},
    state::ChartState,
    window::WINDOW_CAPACITY,
};

/// Render the whole chart view
pub fn render(frame: &mut Frame, state: &ChartState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Metric panels
            Constraint::Length(6), // Alerts
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], state);
    render_panels(frame, chunks[1], state);
    render_alerts(frame, chunks[2], state);
    render_footer(frame, chunks[3], state);
}

fn render_header(frame: &mut Frame, area: Rect, state: &ChartState) {
    let mut spans = vec![
        Span::styled(
            &state.device.label,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" ({})", state.device.address)),
    ];

    match state.last_update {
        Some(at) => spans.push(Span::styled(
            format!("  last update {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        )),
        None => spans.push(Span::styled(
            "  waiting for first reading...",
            Style::default().fg(Color::DarkGray),
        )),
    }

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Miner Chart"));

    frame.render_widget(header, area);
}

/// One panel per selected metric, stacked vertically
fn render_panels(frame: &mut Frame, area: Rect, state: &ChartState) {
    if state.metrics.is_empty() {
        return;
    }

    let share = 100 / state.metrics.len() as u16;
    let constraints: Vec<Constraint> = state
        .metrics
        .iter()
        .map(|_| Constraint::Percentage(share))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (metric, chunk) in state.metrics.iter().zip(chunks.iter()) {
        render_metric_chart(frame, *chunk, *metric, state);
    }
}

fn series_color(series: Series) -> Color {
    match series {
        Series::Power => Color::Magenta,
        Series::Voltage => Color::Blue,
        Series::HashRate => Color::Cyan,
        Series::Temperature => Color::Red,
        Series::SharesAccepted => Color::Green,
        Series::SharesRejected => Color::LightRed,
    }
}

/// Render one metric's window(s) as a line chart
fn render_metric_chart(frame: &mut Frame, area: Rect, metric: ChartMetric, state: &ChartState) {
    let series_data: Vec<(Series, Vec<(f64, f64)>)> = metric
        .series()
        .iter()
        .filter_map(|series| state.window(*series).map(|w| (*series, w.points())))
        .collect();

    let bounds = metric
        .series()
        .iter()
        .filter_map(|series| state.window(*series).and_then(|w| w.bounds()))
        .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)));

    let block = Block::default().borders(Borders::ALL).title(metric.title());

    let Some((low, high)) = bounds else {
        let message = Paragraph::new("No data yet")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(message, area);
        return;
    };

    // keep a flat line visible
    let padding = ((high - low) * 0.1).max(1.0);
    let (y_min, y_max) = (low - padding, high + padding);

    let datasets: Vec<Dataset> = series_data
        .iter()
        .map(|(series, data)| {
            Dataset::default()
                .name(series.label())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(*series)))
                .data(data)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, (WINDOW_CAPACITY - 1) as f64]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .labels(vec![
                    format!("{:.1}", y_min),
                    format!("{:.1}", (y_min + y_max) / 2.0),
                    format!("{:.1}", y_max),
                ])
                .bounds([y_min, y_max]),
        );

    frame.render_widget(chart, area);
}

fn render_alerts(frame: &mut Frame, area: Rect, state: &ChartState) {
    let items: Vec<ListItem> = state
        .alerts
        .iter()
        .rev() // newest first
        .map(|alert| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{}] ", alert.timestamp.format("%H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(alert.message(), Style::default().fg(Color::Red)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Alerts ({})", state.alerts.len())),
    );

    frame.render_widget(list, area);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &ChartState) {
    let footer = Paragraph::new(Line::from(vec![
        Span::raw("Close: "),
        Span::styled("Q/Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" | Clear alerts: "),
        Span::styled("C", Style::default().fg(Color::Yellow)),
        Span::raw(format!(
            " | Readings: {} | Skipped: {}",
            state.ticks, state.skipped
        )),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
