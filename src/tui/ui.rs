use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Tabs},
    Frame,
};
use crate::models::GroupColor;
use crate::progress::{day_summary, total_completed, week_history, HeatLevel};
use crate::storage::StateSlot;
use super::app::{App, DisplayItem, InputField, InputMode, View};

fn group_color(color: &GroupColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

fn level_color(level: HeatLevel) -> Color {
    match level {
        HeatLevel::None => Color::DarkGray,
        HeatLevel::Low => Color::Rgb(0xBF, 0xDB, 0xFE),
        HeatLevel::Medium => Color::Rgb(0x60, 0xA5, 0xFA),
        HeatLevel::High => Color::Rgb(0x25, 0x63, 0xEB),
    }
}

fn header_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn highlight_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray)
}

pub fn ui<S: StateSlot>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // View
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let titles: Vec<&str> = View::ALL.iter().map(|v| v.title()).collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("dayplan"))
        .highlight_style(header_style());
    f.render_widget(tabs, chunks[0]);

    match app.view {
        View::Today => render_today(f, app, chunks[1]),
        View::Groups => render_groups(f, app, chunks[1]),
        View::Progress => render_progress(f, app, chunks[1]),
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view {
            View::Today => "q: Quit | Tab: View | Space: Done | a: Add | h: Hide/Show | i: Show Hidden | d: Del",
            View::Groups => "q: Quit | Tab: View | a: Add | n: Rename | c: Color | d: Del (with tasks)",
            View::Progress => "q: Quit | Tab: View",
        },
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };
    let status = match &app.message {
        Some(m) => format!("{}  |  {}", m, help_text),
        None => help_text.to_string(),
    };
    let help = Paragraph::new(status)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if app.input_mode != InputMode::Normal {
        render_input(f, app);
    }
}

fn render_today<S: StateSlot>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let summary = day_summary(app.store.tasks(), app.store.daily_statuses(), app.date);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(app.date.format("%A, %B %-d").to_string()))
        .gauge_style(Style::default().fg(Color::White).bg(Color::Black))
        .percent(summary.percent.min(100) as u16)
        .label(format!(
            "{} / {} tasks completed • {}% done",
            summary.completed, summary.total, summary.percent
        ));
    f.render_widget(gauge, chunks[0]);

    if app.display_items.is_empty() {
        let empty = Paragraph::new("No tasks for today\nPress 'a' to add one")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, chunks[1]);
        return;
    }

    let store = &app.store;
    let rows: Vec<Row> = app
        .display_items
        .iter()
        .map(|item| match item {
            DisplayItem::GroupHeader(id, count) => {
                let (name, color) = store
                    .task_group(*id)
                    .map(|g| (g.name.to_uppercase(), group_color(&g.color)))
                    .unwrap_or_else(|| (String::new(), Color::Reset));
                Row::new(vec![
                    Cell::from(Span::styled("●", Style::default().fg(color))),
                    Cell::from(Span::styled(name, Style::default().add_modifier(Modifier::BOLD))),
                    Cell::from(format!("{}", count)),
                ])
            }
            DisplayItem::Task(id) => {
                let Some(t) = store.task(*id) else {
                    return Row::new(Vec::<Cell>::new());
                };
                let done = store.get_task_status(t.id, app.date);
                let mark = if done { "[x]" } else { "[ ]" };
                let mut style = Style::default();
                if done {
                    style = style.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
                } else if !t.active {
                    style = style.fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
                }
                let mut title = vec![Span::raw(t.title.clone())];
                if let Some(d) = &t.description {
                    title.push(Span::styled(format!("  {}", d), Style::default().fg(Color::Gray)));
                }
                Row::new(vec![
                    Cell::from(mark),
                    Cell::from(Line::from(title)),
                    Cell::from(t.estimated_time.clone().unwrap_or_default()),
                ])
                .style(style)
            }
        })
        .collect();

    let widths = [Constraint::Length(4), Constraint::Min(20), Constraint::Length(12)];
    let table = Table::new(rows, widths)
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .row_highlight_style(highlight_style())
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);
}

fn render_groups<S: StateSlot>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let rows: Vec<Row> = app
        .store
        .task_groups()
        .iter()
        .map(|g| {
            Row::new(vec![
                Cell::from(Span::styled("██", Style::default().fg(group_color(&g.color)))),
                Cell::from(format!("{}{}", g.icon.as_deref().map(|i| format!("{} ", i)).unwrap_or_default(), g.name)),
                Cell::from(g.color.to_string()),
                Cell::from(app.store.tasks_in_group(g.id).count().to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "Name", "Color", "Tasks"]).style(header_style()).bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title("Task Groups"))
        .row_highlight_style(highlight_style())
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.group_state);
}

fn render_progress<S: StateSlot>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let total = total_completed(app.store.daily_statuses());
    let header = Paragraph::new(vec![
        Line::from(Span::styled(total.to_string(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled("tasks crushed so far", Style::default().fg(Color::Gray))),
    ])
    .block(Block::default().borders(Borders::ALL).title("Total Completed"));
    f.render_widget(header, chunks[0]);

    let history = week_history(app.store.daily_statuses(), app.date);
    let outer = Block::default().borders(Borders::ALL).title("Last 7 Days");
    let inner = outer.inner(chunks[1]);
    f.render_widget(outer, chunks[1]);

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, history.len() as u32); history.len()])
        .split(inner);
    for (day, cell) in history.iter().zip(cells.iter()) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(*cell);
        let swatch = Block::default().style(Style::default().bg(level_color(day.level)));
        f.render_widget(swatch, parts[0].inner(ratatui::layout::Margin { horizontal: 1, vertical: 0 }));
        let label = Paragraph::new(format!("{} {}", day.label, day.completed))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(label, parts[1]);
    }

    let footer = Paragraph::new("Keep building your streak!")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(footer, chunks[2]);
}

fn render_input<S: StateSlot>(f: &mut Frame, app: &App<S>) {
    let area = centered_rect(60, 3, f.area());
    f.render_widget(Clear, area);

    let title = match app.input_mode {
        InputMode::Adding => match (app.view, app.add_state.step) {
            (View::Today, 0) => "Add Task: Enter Title",
            (View::Today, _) => "Add Task: Enter Group (empty = first)",
            (View::Groups, 0) => "Add Group: Enter Name",
            (View::Groups, _) => "Add Group: Color name or #RRGGBB (empty = blue)",
            _ => "Add",
        },
        InputMode::Editing => match app.input_field {
            InputField::GroupName => "Rename Group",
            InputField::GroupColor => "Change Color (name or #RRGGBB)",
            InputField::None => "Edit",
        },
        InputMode::Normal => "",
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
