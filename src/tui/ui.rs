// src/tui/ui.rs
//
// Dashboard rendering. Every widget reads straight off the panel, so
// whatever the binder last applied is what gets drawn.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use super::app::App;
use crate::binding::{elements, IndicatorColor};
use crate::io::{now_us, LinkState};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // battery gauge
            Constraint::Length(3), // temperature row
            Constraint::Length(3), // driving row
            Constraint::Length(4), // indicator row
            Constraint::Min(0),
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    draw_battery(f, app, chunks[0]);
    draw_temperatures(f, app, chunks[1]);
    draw_driving(f, app, chunks[2]);
    draw_indicators(f, app, chunks[3]);
    draw_status_bar(f, app, chunks[5]);
}

// ── Battery gauge ───────────────────────────────────────────────────

fn draw_battery(f: &mut Frame, app: &App, area: Rect) {
    let label = match app.panel.text(elements::FUEL_PERCENTAGE) {
        "" => "n/a".to_string(),
        text => text.to_string(),
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Battery "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(fuel_ratio(app.panel.width(elements::FUEL_LEVEL)))
        .label(label);

    f.render_widget(gauge, area);
}

/// Parse a bar width like "73%" into a gauge ratio.
fn fuel_ratio(width: &str) -> f64 {
    width
        .strip_suffix('%')
        .and_then(|n| n.trim().parse::<f64>().ok())
        .map(|p| (p / 100.0).clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

// ── Readout rows ────────────────────────────────────────────────────

fn draw_temperatures(f: &mut Frame, app: &App, area: Rect) {
    let columns = thirds(area);

    draw_readout(
        f,
        " HV Battery ",
        app.panel.text(elements::BATTERY_TEMP),
        columns[0],
    );
    draw_readout(
        f,
        " Front EDU ",
        app.panel.text(elements::FRONT_MOTOR_TEMP),
        columns[1],
    );
    draw_readout(
        f,
        " Rear EDU ",
        app.panel.text(elements::REAR_MOTOR_TEMP),
        columns[2],
    );
}

fn draw_driving(f: &mut Frame, app: &App, area: Rect) {
    let columns = thirds(area);

    draw_readout(
        f,
        " Drive Mode ",
        app.panel.text(elements::DRIVE_MODE_STATUS),
        columns[0],
    );
    draw_readout(
        f,
        " CACC Mileage ",
        app.panel.text(elements::CACC_MILEAGE),
        columns[1],
    );
    draw_readout(
        f,
        " Lead Vehicle ",
        app.panel.text(elements::DISTANCE),
        columns[2],
    );
}

fn draw_readout(f: &mut Frame, title: &str, text: &str, area: Rect) {
    let text = if text.is_empty() { "--" } else { text };

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

fn thirds(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area)
}

// ── Indicators ──────────────────────────────────────────────────────

fn draw_indicators(f: &mut Frame, app: &App, area: Rect) {
    let columns = thirds(area);

    draw_traffic_light(f, app, columns[0]);
    draw_axles(f, app, columns[1]);
    draw_mil(f, app, columns[2]);
}

fn draw_traffic_light(f: &mut Frame, app: &App, area: Rect) {
    let dot = |class: &'static str, lit: Color| -> Span<'static> {
        if app.panel.has_state(class, elements::ACTIVE) {
            Span::styled("● ", Style::default().fg(lit))
        } else {
            Span::styled("● ", Style::default().fg(Color::DarkGray))
        }
    };

    let line = Line::from(vec![
        dot(elements::RED_LIGHT, Color::Red),
        dot(elements::YELLOW_LIGHT, Color::Yellow),
        dot(elements::GREEN_LIGHT, Color::Green),
    ]);

    let paragraph = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title(" Signal "))
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

fn draw_axles(f: &mut Frame, app: &App, area: Rect) {
    let wheel = |position: &'static str| -> Span<'static> {
        let style = match app.panel.color(&[elements::WHEEL, position]) {
            Some(IndicatorColor::Red) => Style::default().fg(Color::Red),
            Some(IndicatorColor::Green) => Style::default().fg(Color::Green),
            None => Style::default().fg(Color::DarkGray),
        };
        Span::styled("██", style)
    };

    let lines = vec![
        Line::from(vec![
            wheel(elements::FRONT_LEFT),
            Span::raw("  "),
            wheel(elements::FRONT_RIGHT),
        ]),
        Line::from(vec![
            wheel(elements::REAR_LEFT),
            Span::raw("  "),
            wheel(elements::REAR_RIGHT),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Axle Power "))
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

fn draw_mil(f: &mut Frame, app: &App, area: Rect) {
    let span = if app.panel.has_state(elements::MIL_LAMP, elements::GLOW) {
        Span::styled(
            "ENGINE",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("ENGINE", Style::default().fg(Color::DarkGray))
    };

    let paragraph = Paragraph::new(Line::from(span))
        .block(Block::default().borders(Borders::ALL).title(" MIL "))
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

// ── Status bar ──────────────────────────────────────────────────────

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (state_text, state_colour) = match &app.link {
        LinkState::Stopped => ("disconnected".to_string(), Color::DarkGray),
        LinkState::Starting => ("connecting".to_string(), Color::Yellow),
        LinkState::Running => ("connected".to_string(), Color::Green),
        LinkState::Error(message) => (format!("error: {}", message), Color::Red),
    };

    let mut spans = vec![
        Span::styled(
            format!("● {}", state_text),
            Style::default().fg(state_colour),
        ),
        Span::raw(format!("  {}", app.broker)),
        Span::raw(format!("  {} topics", app.subscriptions)),
        Span::raw(format!(
            "  {} applied / {} dropped",
            app.messages_applied, app.messages_dropped
        )),
    ];
    if let Some(then) = app.last_update_us {
        spans.push(Span::raw(format!(
            "  last update {}s ago",
            age_seconds(now_us(), then)
        )));
    }
    spans.push(Span::styled(
        "  q: quit",
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Whole seconds between two microsecond timestamps, clamped at zero.
fn age_seconds(now: u64, then: u64) -> u64 {
    now.saturating_sub(then) / 1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuel_ratio() {
        assert_eq!(fuel_ratio("73%"), 0.73);
        assert_eq!(fuel_ratio("0%"), 0.0);
        assert_eq!(fuel_ratio("100%"), 1.0);
    }

    #[test]
    fn test_fuel_ratio_clamps_out_of_range() {
        assert_eq!(fuel_ratio("150%"), 1.0);
        assert_eq!(fuel_ratio("-5%"), 0.0);
    }

    #[test]
    fn test_fuel_ratio_ignores_invalid() {
        assert_eq!(fuel_ratio(""), 0.0);
        assert_eq!(fuel_ratio("abc"), 0.0);
        assert_eq!(fuel_ratio("73"), 0.0);
    }

    #[test]
    fn test_age_seconds() {
        assert_eq!(age_seconds(10_000_000, 4_000_000), 6);
        assert_eq!(age_seconds(4_500_000, 4_000_000), 0);
        // A timestamp ahead of the clock reads as zero, not a wrap.
        assert_eq!(age_seconds(4_000_000, 10_000_000), 0);
    }
}
