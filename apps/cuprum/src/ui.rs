use crate::app::{App, TabId};
use cuprum_domain::services::table_view::{date_tick_labels, price_tick_labels, ticks};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph, Row, Table, Tabs,
    Wrap,
};
use ratatui::Frame;

const GRID_LINES: usize = 5;
const X_LABELS: usize = 4;

pub fn draw(frame: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(frame.area());

    draw_title(frame, outer[0], app);
    draw_summary(frame, outer[1], app);
    draw_tabs(frame, outer[2], app);
    match app.active_tab {
        TabId::Data => draw_table(frame, outer[3], app),
        TabId::Trend => draw_chart(frame, outer[3], app),
        TabId::Logs => draw_logs(frame, outer[3], app),
    }
    draw_help(frame, outer[4]);
}

fn draw_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = Span::styled(
        app.presentation.title.clone(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(
        Paragraph::new(Line::from(title)).alignment(Alignment::Center),
        area,
    );
}

fn draw_summary(frame: &mut Frame, area: Rect, app: &App) {
    let mut text = format!(
        "{} | rows={}",
        app.presentation.header,
        app.presentation.table.len()
    );
    if let Some(outcome) = &app.outcome {
        text.push_str(&format!(
            " | sqrt(R²)={:.4} rmse={:.2} mae={:.2} (train={}, test={})",
            outcome.sqrt_r2, outcome.rmse, outcome.mae, outcome.n_train, outcome.n_test
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::BOLD),
        ))),
        area,
    );
}

fn draw_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = TabId::ALL.iter().map(|tab| Line::from(tab.title())).collect();
    let tabs = Tabs::new(titles)
        .select(app.active_tab.index())
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn draw_table(frame: &mut Frame, area: Rect, app: &App) {
    let view = &app.presentation.table;
    let visible = area.height.saturating_sub(3) as usize;
    let start = app.table_scroll.min(view.len().saturating_sub(1));

    let header = Row::new(view.columns.iter().map(String::as_str)).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = view
        .rows
        .iter()
        .skip(start)
        .take(visible)
        .map(|row| Row::new(row.iter().map(String::as_str)))
        .collect();

    let title = if view.is_empty() {
        "Data Overview (no rows)".to_string()
    } else {
        format!(
            "Data Overview ({}-{} of {})",
            start + 1,
            (start + rows.len()).min(view.len()),
            view.len()
        )
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Min(26),
            Constraint::Min(18),
            Constraint::Min(16),
        ],
    )
    .header(header)
    .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn draw_chart(frame: &mut Frame, area: Rect, app: &App) {
    let series = &app.presentation.series;
    let spec = &app.presentation.chart;
    if series.is_empty() {
        frame.render_widget(
            Paragraph::new("no price data to plot")
                .block(Block::default().title(spec.title.clone()).borders(Borders::ALL)),
            area,
        );
        return;
    }

    let (x_min, x_max) = series.x_bounds();
    let (y_min, y_max) = series.y_bounds();

    let grid: Vec<[(f64, f64); 2]> = if spec.grid {
        ticks(y_min, y_max, GRID_LINES)
            .into_iter()
            .map(|y| [(x_min, y), (x_max, y)])
            .collect()
    } else {
        Vec::new()
    };

    // Grid datasets come first so the price line is drawn over them.
    let mut datasets: Vec<Dataset> = grid
        .iter()
        .map(|line| {
            Dataset::default()
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(line)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .name(series.name.clone())
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&series.points),
    );

    let mut chart = Chart::new(datasets)
        .block(Block::default().title(spec.title.clone()).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title(spec.x_label.clone())
                .bounds([x_min, x_max])
                .labels(labels(date_tick_labels(x_min, x_max, X_LABELS))),
        )
        .y_axis(
            Axis::default()
                .title(spec.y_label.clone())
                .bounds([y_min, y_max])
                .labels(labels(price_tick_labels(y_min, y_max, GRID_LINES))),
        );
    chart = if spec.legend {
        chart
            .legend_position(Some(LegendPosition::TopLeft))
            .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)))
    } else {
        chart.legend_position(None)
    };

    frame.render_widget(chart, area);
}

fn labels(values: Vec<String>) -> Vec<Line<'static>> {
    values.into_iter().map(Line::from).collect()
}

fn draw_logs(frame: &mut Frame, area: Rect, app: &App) {
    let max_lines = area.height.saturating_sub(2) as usize;
    let visible = app.logs.lock().window(app.log_scroll, max_lines);
    let text: Vec<Line> = visible.into_iter().map(Line::from).collect();

    let title = if app.log_scroll > 0 {
        format!("Logs (scrolled back {})", app.log_scroll)
    } else {
        "Logs".to_string()
    };
    frame.render_widget(
        Paragraph::new(text)
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_help(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Tab/←/→ switch view  ↑/↓ PgUp/PgDn Home/End scroll  q quit",
            Style::default().fg(Color::DarkGray),
        ))),
        area,
    );
}
