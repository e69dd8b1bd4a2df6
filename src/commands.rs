use std::io::{self, Write};

use chrono::{Local, NaiveDate};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::error::{Result, StoreError};
use crate::models::{
    Frequency, GroupColor, GroupId, GroupPatch, NewTask, Palette, Priority, TaskId, TaskPatch,
};
use crate::progress::{day_summary, total_completed, week_history, HeatLevel};
use crate::storage::StateSlot;
use crate::store::TaskStore;

/// First eight characters of an id, enough to address it from the command line.
pub fn short_id(id: impl ToString) -> String {
    id.to_string().chars().take(8).collect()
}

/// Parses `YYYY-MM-DD`, defaulting to today's local date.
pub fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        None => Ok(Local::now().date_naive()),
        Some(d) => NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .map_err(|_| StoreError::InvalidDate(d.to_string())),
    }
}

fn pick_one<T: Copy>(reference: &str, candidates: Vec<T>) -> Result<T> {
    match candidates.as_slice() {
        [] => Err(StoreError::NoMatch(reference.to_string())),
        [one] => Ok(*one),
        _ => Err(StoreError::Ambiguous(reference.to_string())),
    }
}

/// Finds a group by id, id prefix, or case-insensitive name.
pub fn resolve_group<S: StateSlot>(store: &TaskStore<S>, reference: &str) -> Result<GroupId> {
    let needle = reference.trim().to_lowercase();
    if let Some(g) = store.task_groups().iter().find(|g| g.id.to_string() == needle) {
        return Ok(g.id);
    }
    let by_name: Vec<GroupId> = store
        .task_groups()
        .iter()
        .filter(|g| g.name.to_lowercase() == needle)
        .map(|g| g.id)
        .collect();
    if !by_name.is_empty() {
        return pick_one(reference, by_name);
    }
    let by_prefix: Vec<GroupId> = store
        .task_groups()
        .iter()
        .filter(|g| !needle.is_empty() && g.id.to_string().starts_with(&needle))
        .map(|g| g.id)
        .collect();
    pick_one(reference, by_prefix)
}

/// Finds a task by id, id prefix, or case-insensitive title.
pub fn resolve_task<S: StateSlot>(store: &TaskStore<S>, reference: &str) -> Result<TaskId> {
    let needle = reference.trim().to_lowercase();
    if let Some(t) = store.tasks().iter().find(|t| t.id.to_string() == needle) {
        return Ok(t.id);
    }
    let by_title: Vec<TaskId> = store
        .tasks()
        .iter()
        .filter(|t| t.title.to_lowercase() == needle)
        .map(|t| t.id)
        .collect();
    if !by_title.is_empty() {
        return pick_one(reference, by_title);
    }
    let by_prefix: Vec<TaskId> = store
        .tasks()
        .iter()
        .filter(|t| !needle.is_empty() && t.id.to_string().starts_with(&needle))
        .map(|t| t.id)
        .collect();
    pick_one(reference, by_prefix)
}

fn table_color(color: &GroupColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb { r, g, b }
}

fn level_color(level: HeatLevel) -> Color {
    match level {
        HeatLevel::None => Color::DarkGrey,
        HeatLevel::Low => Color::Cyan,
        HeatLevel::Medium => Color::Blue,
        HeatLevel::High => Color::Green,
    }
}

fn bold(s: &str) -> Cell {
    Cell::new(s).add_attribute(Attribute::Bold)
}

/// Prints the active tasks for `date`, grouped, with the day's progress.
pub fn cmd_today<S: StateSlot>(store: &TaskStore<S>, date: NaiveDate) {
    let summary = day_summary(store.tasks(), store.daily_statuses(), date);
    println!("{}", date.format("%A, %B %-d"));
    println!(
        "{} / {} tasks completed • {}% done",
        summary.completed, summary.total, summary.percent
    );

    if summary.total == 0 {
        println!("No tasks for today. Add one with `dayplan task add`.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![bold("ID"), bold("Group"), bold("Task"), bold("Est"), bold("Status")]);

    for group in store.task_groups() {
        for t in store.tasks_in_group(group.id).filter(|t| t.active) {
            let done = store.get_task_status(t.id, date);
            let title = match &t.description {
                Some(d) => format!("{}\n{}", t.title, d),
                None => t.title.clone(),
            };
            table.add_row(vec![
                Cell::new(short_id(t.id)),
                Cell::new(&group.name).fg(table_color(&group.color)),
                Cell::new(title),
                Cell::new(t.estimated_time.clone().unwrap_or_default()),
                if done {
                    Cell::new("Done").fg(Color::Green)
                } else {
                    Cell::new("Pending").fg(Color::Yellow)
                },
            ]);
        }
    }

    println!("{table}");
}

/// Toggles completion of a task for `date`.
pub fn cmd_done<S: StateSlot>(store: &mut TaskStore<S>, task: &str, date: NaiveDate) -> Result<bool> {
    let id = resolve_task(store, task)?;
    let completed = store.toggle_task_completion(id, date)?;
    let title = store.task(id).map(|t| t.title.clone()).unwrap_or_default();
    if completed {
        println!("'{}' marked done for {}.", title, date);
    } else {
        println!("'{}' marked not done for {}.", title, date);
    }
    Ok(completed)
}

pub fn cmd_status<S: StateSlot>(store: &TaskStore<S>, task: &str, date: NaiveDate) -> Result<bool> {
    let id = resolve_task(store, task)?;
    let done = store.get_task_status(id, date);
    match store.status(id, date).and_then(|s| s.completed_at) {
        Some(at) if done => {
            let when = chrono::DateTime::from_timestamp_millis(at)
                .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
                .unwrap_or_default();
            println!("Done on {} (at {}).", date, when);
        }
        _ => println!("Not done on {}.", date),
    }
    Ok(done)
}

/// Prints the all-time total and the last week of completions.
pub fn cmd_progress<S: StateSlot>(store: &TaskStore<S>, reference: NaiveDate) {
    println!("Total completed: {}", total_completed(store.daily_statuses()));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![bold("Day"), bold("Date"), bold("Completed"), bold("Level")]);
    for day in week_history(store.daily_statuses(), reference) {
        let bar = "■".repeat(day.level.as_u8() as usize + 1);
        table.add_row(vec![
            Cell::new(&day.label),
            Cell::new(day.date),
            Cell::new(day.completed),
            Cell::new(bar).fg(level_color(day.level)),
        ]);
    }
    println!("{table}");
}

pub fn cmd_group_add<S: StateSlot>(
    store: &mut TaskStore<S>,
    name: String,
    color: Option<GroupColor>,
    icon: Option<String>,
) -> Result<GroupId> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidValue(name));
    }
    let id = store.add_task_group(name.trim(), color.unwrap_or(GroupColor::Preset(Palette::Blue)))?;
    if icon.is_some() {
        store.update_task_group(id, GroupPatch { icon: Some(icon), ..Default::default() })?;
    }
    println!("Group added (id = {})", short_id(id));
    Ok(id)
}

pub fn cmd_group_list<S: StateSlot>(store: &TaskStore<S>) {
    if store.task_groups().is_empty() {
        println!("No groups found.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![bold("ID"), bold("Name"), bold("Color"), bold("Tasks")]);
    for g in store.task_groups() {
        let name = match &g.icon {
            Some(icon) => format!("{} {}", icon, g.name),
            None => g.name.clone(),
        };
        table.add_row(vec![
            Cell::new(short_id(g.id)),
            Cell::new(name),
            Cell::new(g.color.to_string()).fg(table_color(&g.color)),
            Cell::new(store.tasks_in_group(g.id).count()),
        ]);
    }
    println!("{table}");
}

pub fn cmd_group_edit<S: StateSlot>(
    store: &mut TaskStore<S>,
    group: &str,
    patch: GroupPatch,
) -> Result<()> {
    let id = resolve_group(store, group)?;
    if patch.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }
    store.update_task_group(id, patch)?;
    println!("Group {} updated.", short_id(id));
    Ok(())
}

pub fn cmd_group_remove<S: StateSlot>(store: &mut TaskStore<S>, group: &str) -> Result<()> {
    let id = resolve_group(store, group)?;
    let summary = store.delete_task_group(id)?;
    println!(
        "Group {} removed along with {} task(s) and {} completion record(s).",
        short_id(id),
        summary.tasks,
        summary.statuses
    );
    Ok(())
}

/// Options for `task add` beyond title and group.
#[derive(Debug, Default, Clone)]
pub struct TaskOptions {
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    pub priority: Option<Priority>,
    pub estimate: Option<String>,
}

pub fn cmd_task_add<S: StateSlot>(
    store: &mut TaskStore<S>,
    title: String,
    group: &str,
    opts: TaskOptions,
) -> Result<TaskId> {
    if title.trim().is_empty() {
        return Err(StoreError::InvalidValue(title));
    }
    let group_id = resolve_group(store, group)?;
    let id = store.add_task(NewTask {
        group_id,
        title: title.trim().to_string(),
        frequency: opts.frequency.unwrap_or_default(),
        description: opts.description,
        priority: opts.priority,
        estimated_time: opts.estimate,
    })?;
    println!("Task added (id = {})", short_id(id));
    Ok(id)
}

pub fn cmd_task_list<S: StateSlot>(store: &TaskStore<S>, all: bool) {
    let tasks: Vec<_> = store.tasks().iter().filter(|t| all || t.active).collect();
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            bold("ID"),
            bold("Title"),
            bold("Group"),
            bold("Frequency"),
            bold("Priority"),
            bold("Est"),
            bold("Active"),
        ]);
    for t in tasks {
        let group = store.task_group(t.group_id);
        let group_cell = match group {
            Some(g) => Cell::new(&g.name).fg(table_color(&g.color)),
            None => Cell::new("-"),
        };
        let priority_cell = match t.priority {
            Some(Priority::High) => Cell::new("High").fg(Color::Red),
            Some(p) => Cell::new(p.to_string()),
            None => Cell::new("-"),
        };
        table.add_row(vec![
            Cell::new(short_id(t.id)),
            Cell::new(&t.title),
            group_cell,
            Cell::new(t.frequency.to_string()),
            priority_cell,
            Cell::new(t.estimated_time.clone().unwrap_or_else(|| "-".into())),
            Cell::new(if t.active { "yes" } else { "no" }),
        ]);
    }
    println!("{table}");
}

/// Edits a task. `group` is resolved the same way as on `task add`.
pub fn cmd_task_edit<S: StateSlot>(
    store: &mut TaskStore<S>,
    task: &str,
    group: Option<&str>,
    mut patch: TaskPatch,
) -> Result<()> {
    let id = resolve_task(store, task)?;
    if let Some(g) = group {
        patch.group_id = Some(resolve_group(store, g)?);
    }
    if patch.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }
    store.update_task(id, patch)?;
    println!("Task {} updated.", short_id(id));
    Ok(())
}

pub fn cmd_task_remove<S: StateSlot>(store: &mut TaskStore<S>, task: &str) -> Result<()> {
    let id = resolve_task(store, task)?;
    let removed = store.delete_task(id)?;
    println!("Task {} removed ({} completion record(s)).", short_id(id), removed);
    Ok(())
}

pub fn cmd_task_toggle_active<S: StateSlot>(store: &mut TaskStore<S>, task: &str) -> Result<bool> {
    let id = resolve_task(store, task)?;
    let active = store.toggle_task_active(id)?;
    if active {
        println!("Task {} is active again.", short_id(id));
    } else {
        println!("Task {} hidden from the daily view.", short_id(id));
    }
    Ok(active)
}

/// Wipes all saved data and restores the seed groups.
pub fn cmd_reset<S: StateSlot>(store: &mut TaskStore<S>, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all groups, tasks and history? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    store.reset()?;
    println!("Database reset successfully.");
    Ok(())
}
