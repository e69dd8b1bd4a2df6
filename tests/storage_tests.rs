use chrono::NaiveDate;
use dayplan::models::{GroupColor, NewTask, Palette, Priority};
use dayplan::storage::{decode, JsonFileSlot, MemorySlot, StateSlot, SCHEMA_VERSION};
use dayplan::{StoreError, TaskStore};
use tempfile::TempDir;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn temp_slot() -> (TempDir, JsonFileSlot) {
    let dir = tempfile::tempdir().unwrap();
    let slot = JsonFileSlot::new(dir.path().join("nested").join("daily-planner-storage.json"));
    (dir, slot)
}

#[test]
fn test_missing_file_reads_as_none() {
    let (_dir, slot) = temp_slot();
    assert_eq!(slot.read().unwrap(), None);
    slot.clear().unwrap();
}

#[test]
fn test_open_seeds_and_saves_when_empty() {
    let (_dir, slot) = temp_slot();
    let store = TaskStore::open(&slot).unwrap();
    assert!(slot.path().exists());

    let reopened = TaskStore::open(&slot).unwrap();
    let ids: Vec<_> = reopened.task_groups().iter().map(|g| g.id).collect();
    let original: Vec<_> = store.task_groups().iter().map(|g| g.id).collect();
    assert_eq!(ids, original);
}

#[test]
fn test_state_round_trips_through_file() {
    let (_dir, slot) = temp_slot();
    let mut store = TaskStore::open(&slot).unwrap();
    let group = store.add_task_group("Reading", GroupColor::Custom("#FF8800".into())).unwrap();
    let task = store
        .add_task(NewTask {
            priority: Some(Priority::Low),
            estimated_time: Some("20 min".into()),
            ..NewTask::daily(group, "Read 20 pages")
        })
        .unwrap();
    store.toggle_task_completion(task, day("2024-01-01")).unwrap();
    store.toggle_task_completion(task, day("2024-01-02")).unwrap();
    store.toggle_task_completion(task, day("2024-01-02")).unwrap();
    store.toggle_task_active(task).unwrap();

    let reopened = TaskStore::open(&slot).unwrap();
    assert_eq!(reopened.snapshot(), store.snapshot());
    assert!(reopened.get_task_status(task, day("2024-01-01")));
    assert!(!reopened.get_task_status(task, day("2024-01-02")));
    assert!(!reopened.task(task).unwrap().active);
}

#[test]
fn test_blob_is_versioned_with_camel_case_fields() {
    let slot = MemorySlot::default();
    let mut store = TaskStore::open(&slot).unwrap();
    let group = store.task_groups()[0].id;
    let task = store.add_task(NewTask::daily(group, "Run")).unwrap();
    store.toggle_task_completion(task, day("2024-01-01")).unwrap();

    let value: serde_json::Value = serde_json::from_str(&slot.blob().unwrap()).unwrap();
    assert_eq!(value["version"], SCHEMA_VERSION);
    let state = &value["state"];
    assert_eq!(state["taskGroups"][0]["color"], serde_json::json!({ "preset": "blue" }));
    assert_eq!(state["tasks"][0]["groupId"], group.to_string());
    assert_eq!(state["tasks"][0]["frequency"], "Daily");
    assert_eq!(state["dailyStatuses"][0]["date"], "2024-01-01");
    assert_eq!(state["dailyStatuses"][0]["completed"], true);
    assert!(state["dailyStatuses"][0]["completedAt"].is_i64());
}

#[test]
fn test_corrupt_blob_falls_back_to_seed() {
    let slot = MemorySlot::with_blob("{ not json");
    let store = TaskStore::open(&slot).unwrap();
    let names: Vec<&str> = store.task_groups().iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Career", "Fitness"]);
    assert!(store.tasks().is_empty());
    // Left alone until the next mutation.
    assert_eq!(slot.blob().as_deref(), Some("{ not json"));
}

#[test]
fn test_non_utf8_file_falls_back_to_seed() {
    let (_dir, slot) = temp_slot();
    std::fs::create_dir_all(slot.path().parent().unwrap()).unwrap();
    std::fs::write(slot.path(), [0xff, 0xfe, b'{', 0x80]).unwrap();

    let err = slot.read().unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

    let mut store = TaskStore::open(&slot).unwrap();
    let names: Vec<&str> = store.task_groups().iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Career", "Fitness"]);
    assert_eq!(std::fs::read(slot.path()).unwrap(), vec![0xff, 0xfe, b'{', 0x80]);

    // The next mutation replaces the unreadable file.
    store.add_task_group("Reading", GroupColor::Preset(Palette::Teal)).unwrap();
    let reopened = TaskStore::open(&slot).unwrap();
    assert_eq!(reopened.task_groups().len(), 3);
}

#[test]
fn test_schema_mismatch_falls_back_to_seed() {
    let slot = MemorySlot::with_blob(r#"{"version":1,"state":{"taskGroups":[{"id":"nope"}],"tasks":[],"dailyStatuses":[]}}"#);
    let store = TaskStore::open(&slot).unwrap();
    assert_eq!(store.task_groups().len(), 2);
}

#[test]
fn test_unknown_version_is_rejected() {
    let blob = r#"{"version":99,"state":{}}"#;
    assert!(matches!(decode(blob), Err(StoreError::UnsupportedVersion(99))));

    let slot = MemorySlot::with_blob(blob);
    let store = TaskStore::open(&slot).unwrap();
    assert_eq!(store.task_groups().len(), 2);
}

#[test]
fn test_duplicate_pairs_in_blob_collapse_to_one_record() {
    let task = "6f1c2a8e-0000-4000-8000-000000000001";
    let group = "6f1c2a8e-0000-4000-8000-000000000002";
    let blob = format!(
        r#"{{"version":1,"state":{{
            "taskGroups":[{{"id":"{group}","name":"Career","color":{{"preset":"blue"}},"createdAt":1}}],
            "tasks":[{{"id":"{task}","groupId":"{group}","title":"Run","frequency":"Daily","active":true,"createdAt":1}}],
            "dailyStatuses":[
                {{"id":"6f1c2a8e-0000-4000-8000-000000000003","taskId":"{task}","date":"2024-01-01","completed":true,"completedAt":5}},
                {{"id":"6f1c2a8e-0000-4000-8000-000000000004","taskId":"{task}","date":"2024-01-01","completed":false}}
            ]}}}}"#
    );
    let slot = MemorySlot::with_blob(blob);
    let store = TaskStore::open(&slot).unwrap();
    assert_eq!(store.daily_statuses().count(), 1);
    let id = store.tasks()[0].id;
    assert!(!store.get_task_status(id, day("2024-01-01")));
}

#[test]
fn test_write_failure_is_reported_but_state_is_kept() {
    struct ReadOnly;
    impl StateSlot for ReadOnly {
        fn read(&self) -> std::io::Result<Option<String>> {
            Ok(Some(r#"{"version":1,"state":{"taskGroups":[],"tasks":[],"dailyStatuses":[]}}"#.into()))
        }
        fn write(&self, _: &str) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))
        }
        fn clear(&self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let mut store = TaskStore::open(ReadOnly).unwrap();
    let result = store.add_task_group("Offline", GroupColor::Preset(Palette::Red));
    assert!(matches!(result, Err(StoreError::Storage(_))));
    assert_eq!(store.task_groups().len(), 1);
}
