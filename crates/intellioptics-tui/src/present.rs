// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! List and detail renderers. The dashboard view picks one of each; the
//! state they draw from is identical.

use intellioptics_app::{
    AccuracyMetric, DetailKind, Detector, DetectorStatus, LayoutKind, format_accuracy,
    format_patience, text_or_na,
};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Gauge, Paragraph, Row, Table};

const CARD_MIN_WIDTH: u16 = 34;
const CARD_HEIGHT: u16 = 7;
const MAX_CARD_COLUMNS: u16 = 3;

pub trait ListRenderer {
    fn name(&self) -> &'static str;
    fn render(&self, frame: &mut Frame<'_>, area: Rect, detectors: &[&Detector], cursor: usize);
}

pub trait DetailRenderer {
    fn name(&self) -> &'static str;
    fn render(&self, frame: &mut Frame<'_>, area: Rect, detector: &Detector);
}

pub struct CardList;
pub struct TableList;
pub struct BarDetail;
pub struct GaugeDetail;

pub fn list_renderer(kind: LayoutKind) -> &'static dyn ListRenderer {
    match kind {
        LayoutKind::Cards => &CardList,
        LayoutKind::Table => &TableList,
    }
}

pub fn detail_renderer(kind: DetailKind) -> &'static dyn DetailRenderer {
    match kind {
        DetailKind::Bars => &BarDetail,
        DetailKind::Gauges => &GaugeDetail,
    }
}

pub const fn metric_color(metric: AccuracyMetric) -> Color {
    match metric {
        AccuracyMetric::Yes => Color::Green,
        AccuracyMetric::No => Color::Red,
        AccuracyMetric::Projected => Color::Blue,
    }
}

pub const fn status_color(status: DetectorStatus) -> Color {
    match status {
        DetectorStatus::On => Color::Green,
        DetectorStatus::Off => Color::Red,
    }
}

pub fn card_lines(detector: &Detector) -> Vec<String> {
    vec![
        format!("ID: {}", detector.id),
        format!("Query: {}", detector.query_label()),
        format!("Group: {}", detector.group_label()),
        format!("Confidence: {}", detector.confidence_label()),
        format!("Status: {}", detector.status_label()),
    ]
}

pub fn detail_title(detector: &Detector) -> String {
    format!("{} - Accuracy Details", detector.name)
}

pub fn detail_lines(detector: &Detector) -> Vec<String> {
    let accuracy = detector.accuracy_breakdown();
    let mut lines = vec![
        format!("Group: {}", detector.group_label()),
        format!("Status: {}", detector.status_label()),
        format!("Query: {}", detector.query_label()),
        format!("Confidence Threshold: {}", detector.confidence_label()),
    ];
    lines.extend(AccuracyMetric::ALL.into_iter().map(|metric| {
        format!(
            "{}: {}",
            metric.label(),
            format_accuracy(accuracy.get(metric))
        )
    }));

    let extras = [
        ("Mode", detector.mode.as_deref().map(str::to_owned)),
        (
            "Escalation",
            detector.escalation_type.as_deref().map(str::to_owned),
        ),
        (
            "Patience",
            detector.patience_time.map(|value| format_patience(Some(value))),
        ),
        ("Created", detector.created_at.as_deref().map(str::to_owned)),
    ];
    for (label, value) in extras {
        if let Some(value) = value {
            lines.push(format!("{label}: {}", text_or_na(Some(value.as_str()))));
        }
    }
    lines
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub metric: AccuracyMetric,
    pub value: u64,
    pub text: String,
    pub color: Color,
}

/// Bars for the metrics that carry a value, clamped to the 0..=100 axis.
pub fn chart_bars(detector: &Detector) -> Vec<ChartBar> {
    detector
        .accuracy_breakdown()
        .chart_values()
        .into_iter()
        .map(|(metric, value)| ChartBar {
            metric,
            value: value.clamp(0.0, 100.0).round() as u64,
            text: format_accuracy(Some(value)),
            color: metric_color(metric),
        })
        .collect()
}

pub fn card_columns(width: u16) -> u16 {
    (width / CARD_MIN_WIDTH).clamp(1, MAX_CARD_COLUMNS)
}

/// First item of the window that keeps `cursor` on screen.
pub fn scroll_offset(cursor: usize, per_page: usize, step: usize) -> usize {
    let per_page = per_page.max(1);
    let step = step.max(1);
    if cursor < per_page {
        return 0;
    }
    let first_row = (cursor / step + 1).saturating_sub(per_page / step);
    first_row * step
}

impl ListRenderer for CardList {
    fn name(&self) -> &'static str {
        "cards"
    }

    fn render(&self, frame: &mut Frame<'_>, area: Rect, detectors: &[&Detector], cursor: usize) {
        let columns = card_columns(area.width);
        let rows_fit = (area.height / CARD_HEIGHT).max(1);
        let per_page = usize::from(columns * rows_fit);
        let offset = scroll_offset(cursor, per_page, usize::from(columns));

        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); usize::from(rows_fit)])
            .split(area);

        for (slot, (index, detector)) in detectors
            .iter()
            .enumerate()
            .skip(offset)
            .take(per_page)
            .enumerate()
        {
            let row = slot / usize::from(columns);
            let column = slot % usize::from(columns);
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![
                    Constraint::Ratio(1, u32::from(columns));
                    usize::from(columns)
                ])
                .split(row_areas[row]);

            let border_style = if index == cursor {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let status_style = Style::default().fg(status_color(detector.status_kind()));
            let lines = card_lines(detector)
                .into_iter()
                .enumerate()
                .map(|(line_index, text)| {
                    if line_index == 4 {
                        Line::styled(text, status_style)
                    } else {
                        Line::raw(text)
                    }
                })
                .collect::<Vec<_>>();

            let card = Paragraph::new(lines).block(
                Block::default()
                    .title(detector.name.clone())
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );
            frame.render_widget(card, cells[column]);
        }
    }
}

impl ListRenderer for TableList {
    fn name(&self) -> &'static str {
        "table"
    }

    fn render(&self, frame: &mut Frame<'_>, area: Rect, detectors: &[&Detector], cursor: usize) {
        // Borders and header take three rows.
        let per_page = usize::from(area.height.saturating_sub(3)).max(1);
        let offset = scroll_offset(cursor, per_page, 1);

        let header = Row::new(["Name", "ID", "Group", "Confidence", "Status"].map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        }));

        let rows = detectors
            .iter()
            .enumerate()
            .skip(offset)
            .take(per_page)
            .map(|(index, detector)| {
                let mut style = Style::default();
                if index == cursor {
                    style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
                }
                Row::new(vec![
                    Cell::from(detector.name.clone()),
                    Cell::from(detector.id.to_string()),
                    Cell::from(detector.group_label().to_owned()),
                    Cell::from(detector.confidence_label()),
                    Cell::from(detector.status_label().to_owned())
                        .style(Style::default().fg(status_color(detector.status_kind()))),
                ])
                .style(style)
            });

        let widths = [
            Constraint::Min(16),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(11),
            Constraint::Length(7),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .block(
                Block::default()
                    .title(format!("detectors ({})", detectors.len()))
                    .borders(Borders::ALL),
            );
        frame.render_widget(table, area);
    }
}

fn split_detail(area: Rect, detector: &Detector) -> (Vec<String>, Rect, Rect) {
    let lines = detail_lines(detector);
    let text_height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(1);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(text_height), Constraint::Min(3)])
        .split(area);
    (lines, parts[0], parts[1])
}

fn detail_text(lines: Vec<String>) -> Paragraph<'static> {
    Paragraph::new(
        lines
            .into_iter()
            .map(|line| Line::styled(line, Style::default().add_modifier(Modifier::BOLD)))
            .collect::<Vec<_>>(),
    )
}

impl DetailRenderer for BarDetail {
    fn name(&self) -> &'static str {
        "bars"
    }

    fn render(&self, frame: &mut Frame<'_>, area: Rect, detector: &Detector) {
        let (lines, text_area, chart_area) = split_detail(area, detector);
        frame.render_widget(detail_text(lines), text_area);

        let bars = chart_bars(detector);
        let block = Block::default().title("Accuracy %").borders(Borders::ALL);
        if bars.is_empty() {
            frame.render_widget(Paragraph::new("No accuracy data").block(block), chart_area);
            return;
        }

        let bars = bars
            .into_iter()
            .map(|bar| {
                Bar::default()
                    .value(bar.value)
                    .label(Line::from(bar.metric.short_label()))
                    .text_value(bar.text)
                    .style(Style::default().fg(bar.color))
                    .value_style(Style::default().fg(Color::Black).bg(bar.color))
            })
            .collect::<Vec<_>>();
        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(11)
            .bar_gap(3)
            .max(100);
        frame.render_widget(chart, chart_area);
    }
}

impl DetailRenderer for GaugeDetail {
    fn name(&self) -> &'static str {
        "gauges"
    }

    fn render(&self, frame: &mut Frame<'_>, area: Rect, detector: &Detector) {
        let (lines, text_area, gauge_area) = split_detail(area, detector);
        frame.render_widget(detail_text(lines), text_area);

        let accuracy = detector.accuracy_breakdown();
        let slots = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3); 3])
            .split(gauge_area);
        for (metric, slot) in [AccuracyMetric::Yes, AccuracyMetric::No, AccuracyMetric::Projected]
            .into_iter()
            .zip(slots.iter())
        {
            let value = accuracy.get(metric);
            let gauge = Gauge::default()
                .block(
                    Block::default()
                        .title(metric.short_label())
                        .borders(Borders::ALL),
                )
                .gauge_style(Style::default().fg(metric_color(metric)))
                .ratio(value.map_or(0.0, |percent| (percent / 100.0).clamp(0.0, 1.0)))
                .label(format_accuracy(value));
            frame.render_widget(gauge, *slot);
        }
    }
}
