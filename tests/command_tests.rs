use chrono::NaiveDate;
use dayplan::commands::*;
use dayplan::models::{GroupColor, GroupPatch, Palette, Priority, TaskPatch};
use dayplan::storage::MemorySlot;
use dayplan::{StoreError, TaskStore};

fn with_test_store<F>(f: F)
where
    F: FnOnce(&mut TaskStore<&MemorySlot>),
{
    let slot = MemorySlot::default();
    let mut store = TaskStore::open(&slot).unwrap();
    f(&mut store);
}

fn day(s: &str) -> NaiveDate {
    parse_date(Some(s)).unwrap()
}

#[test]
fn test_parse_date() {
    assert_eq!(day("2024-01-01"), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert!(matches!(parse_date(Some("01/02/2024")), Err(StoreError::InvalidDate(_))));
    assert!(parse_date(None).is_ok());
}

#[test]
fn test_add_task_by_group_name_and_list() {
    with_test_store(|store| {
        let id = cmd_task_add(
            store,
            "  Write report ".into(),
            "career",
            TaskOptions { priority: Some(Priority::Medium), ..Default::default() },
        )
        .unwrap();
        let t = store.task(id).unwrap();
        assert_eq!(t.title, "Write report");
        assert_eq!(store.task_group(t.group_id).unwrap().name, "Career");
        cmd_task_list(store, true);
        cmd_today(store, day("2024-01-01"));
    });
}

#[test]
fn test_empty_title_is_rejected() {
    with_test_store(|store| {
        let result = cmd_task_add(store, "   ".into(), "Career", TaskOptions::default());
        assert!(matches!(result, Err(StoreError::InvalidValue(_))));
        assert!(store.tasks().is_empty());
    });
}

#[test]
fn test_unknown_group_is_no_match() {
    with_test_store(|store| {
        let result = cmd_task_add(store, "Run".into(), "Hobbies", TaskOptions::default());
        assert!(matches!(result, Err(StoreError::NoMatch(_))));
    });
}

#[test]
fn test_done_toggles_by_title_and_prefix() {
    with_test_store(|store| {
        let id = cmd_task_add(store, "Run".into(), "Fitness", TaskOptions::default()).unwrap();
        let d = day("2024-01-01");

        assert!(cmd_done(store, "run", d).unwrap());
        assert!(cmd_status(store, "Run", d).unwrap());

        let prefix = short_id(id);
        assert!(!cmd_done(store, &prefix, d).unwrap());
        assert!(!cmd_status(store, &id.to_string(), d).unwrap());
        cmd_progress(store, d);
    });
}

#[test]
fn test_duplicate_titles_are_ambiguous() {
    with_test_store(|store| {
        cmd_task_add(store, "Run".into(), "Fitness", TaskOptions::default()).unwrap();
        cmd_task_add(store, "Run".into(), "Career", TaskOptions::default()).unwrap();
        let result = cmd_done(store, "Run", day("2024-01-01"));
        assert!(matches!(result, Err(StoreError::Ambiguous(_))));
        assert_eq!(store.daily_statuses().count(), 0);
    });
}

#[test]
fn test_group_add_edit_remove() {
    with_test_store(|store| {
        let id = cmd_group_add(store, "Reading".into(), Some("#00aaff".parse().unwrap()), Some("📚".into())).unwrap();
        let g = store.task_group(id).unwrap();
        assert_eq!(g.color, GroupColor::Custom("#00AAFF".into()));
        assert_eq!(g.icon.as_deref(), Some("📚"));

        cmd_group_edit(
            store,
            "reading",
            GroupPatch { name: Some("Books".into()), color: Some(GroupColor::Preset(Palette::Indigo)), icon: Some(None) },
        )
        .unwrap();
        let g = store.task_group(id).unwrap();
        assert_eq!(g.name, "Books");
        assert_eq!(g.color, GroupColor::Preset(Palette::Indigo));
        assert_eq!(g.icon, None);
        cmd_group_list(store);

        cmd_task_add(store, "Chapter".into(), "Books", TaskOptions::default()).unwrap();
        cmd_done(store, "Chapter", day("2024-01-01")).unwrap();
        cmd_group_remove(store, "Books").unwrap();
        assert!(store.task_group(id).is_none());
        assert!(store.tasks().is_empty());
        assert_eq!(store.daily_statuses().count(), 0);
    });
}

#[test]
fn test_task_edit_moves_group_and_clears_fields() {
    with_test_store(|store| {
        let id = cmd_task_add(
            store,
            "Plan week".into(),
            "Career",
            TaskOptions { description: Some("sunday".into()), estimate: Some("15 min".into()), ..Default::default() },
        )
        .unwrap();

        let patch = TaskPatch { description: Some(None), ..Default::default() };
        cmd_task_edit(store, "plan week", Some("Fitness"), patch).unwrap();

        let t = store.task(id).unwrap();
        assert_eq!(store.task_group(t.group_id).unwrap().name, "Fitness");
        assert_eq!(t.description, None);
        assert_eq!(t.estimated_time.as_deref(), Some("15 min"));
    });
}

#[test]
fn test_toggle_active_and_remove() {
    with_test_store(|store| {
        cmd_task_add(store, "Stretch".into(), "Fitness", TaskOptions::default()).unwrap();
        assert!(!cmd_task_toggle_active(store, "Stretch").unwrap());
        assert!(cmd_task_toggle_active(store, "Stretch").unwrap());
        cmd_task_remove(store, "Stretch").unwrap();
        assert!(store.tasks().is_empty());
        assert!(matches!(cmd_task_remove(store, "Stretch"), Err(StoreError::NoMatch(_))));
    });
}

#[test]
fn test_forced_reset() {
    with_test_store(|store| {
        cmd_group_add(store, "Extra".into(), None, None).unwrap();
        cmd_reset(store, true).unwrap();
        assert_eq!(store.task_groups().len(), 2);
    });
}
