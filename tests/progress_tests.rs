use chrono::NaiveDate;
use dayplan::models::NewTask;
use dayplan::progress::{completed_on, day_summary, heat_level, total_completed, week_history, HeatLevel, HISTORY_DAYS};
use dayplan::storage::MemorySlot;
use dayplan::TaskStore;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_scenario_b_five_completions_reach_top_level() {
    let slot = MemorySlot::default();
    let mut store = TaskStore::open(&slot).unwrap();
    let group = store.task_groups()[0].id;
    let d = day("2024-01-10");
    for i in 0..5 {
        let id = store.add_task(NewTask::daily(group, format!("Task {}", i))).unwrap();
        store.toggle_task_completion(id, d).unwrap();
    }

    let history = week_history(store.daily_statuses(), d);
    let today = history.last().unwrap();
    assert_eq!(today.date, d);
    assert_eq!(today.completed, 5);
    assert_eq!(today.level, HeatLevel::High);
    assert_eq!(today.level.as_u8(), 3);
}

#[test]
fn test_week_history_is_oldest_first_and_labelled() {
    let slot = MemorySlot::default();
    let mut store = TaskStore::open(&slot).unwrap();
    let group = store.task_groups()[0].id;
    let a = store.add_task(NewTask::daily(group, "A")).unwrap();
    let b = store.add_task(NewTask::daily(group, "B")).unwrap();
    let c = store.add_task(NewTask::daily(group, "C")).unwrap();
    // 2024-01-07 is a Sunday.
    for id in [a, b, c] {
        store.toggle_task_completion(id, day("2024-01-01")).unwrap();
    }
    store.toggle_task_completion(a, day("2024-01-05")).unwrap();
    // Outside the window.
    store.toggle_task_completion(a, day("2023-12-31")).unwrap();

    let history = week_history(store.daily_statuses(), day("2024-01-07"));
    assert_eq!(history.len(), HISTORY_DAYS);
    assert_eq!(history[0].date, day("2024-01-01"));
    assert_eq!(history[0].label, "Mon");
    assert_eq!(history[0].level, HeatLevel::Medium);
    assert_eq!(history[4].completed, 1);
    assert_eq!(history[4].level, HeatLevel::Low);
    assert_eq!(history[6].label, "Sun");
    assert_eq!(history[6].level, HeatLevel::None);
}

#[test]
fn test_uncompleted_records_are_not_counted() {
    let slot = MemorySlot::default();
    let mut store = TaskStore::open(&slot).unwrap();
    let group = store.task_groups()[0].id;
    let a = store.add_task(NewTask::daily(group, "A")).unwrap();
    let b = store.add_task(NewTask::daily(group, "B")).unwrap();
    let d = day("2024-02-01");
    store.toggle_task_completion(a, d).unwrap();
    store.toggle_task_completion(b, d).unwrap();
    store.toggle_task_completion(b, d).unwrap();

    assert_eq!(completed_on(store.daily_statuses(), d), 1);
    assert_eq!(total_completed(store.daily_statuses()), 1);
}

#[test]
fn test_day_summary_counts_active_tasks_only() {
    let slot = MemorySlot::default();
    let mut store = TaskStore::open(&slot).unwrap();
    let group = store.task_groups()[0].id;
    let d = day("2024-02-01");
    let ids: Vec<_> = (0..3)
        .map(|i| store.add_task(NewTask::daily(group, format!("T{}", i))).unwrap())
        .collect();
    store.toggle_task_completion(ids[0], d).unwrap();
    store.toggle_task_completion(ids[2], d).unwrap();
    store.toggle_task_active(ids[2]).unwrap();

    let summary = day_summary(store.tasks(), store.daily_statuses(), d);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.percent, 50);

    let other = day_summary(store.tasks(), store.daily_statuses(), day("2024-02-02"));
    assert_eq!(other.completed, 0);
    assert_eq!(other.percent, 0);
}

#[test]
fn test_day_summary_rounds_and_handles_empty() {
    let slot = MemorySlot::default();
    let mut store = TaskStore::open(&slot).unwrap();
    let d = day("2024-02-01");
    assert_eq!(day_summary(store.tasks(), store.daily_statuses(), d).percent, 0);

    let group = store.task_groups()[0].id;
    let ids: Vec<_> = (0..3)
        .map(|i| store.add_task(NewTask::daily(group, format!("T{}", i))).unwrap())
        .collect();
    store.toggle_task_completion(ids[0], d).unwrap();
    store.toggle_task_completion(ids[1], d).unwrap();
    assert_eq!(day_summary(store.tasks(), store.daily_statuses(), d).percent, 67);
}

#[test]
fn test_heat_level_boundaries() {
    let levels: Vec<u8> = (0..7).map(|n| heat_level(n).as_u8()).collect();
    assert_eq!(levels, vec![0, 1, 1, 2, 2, 3, 3]);
}
