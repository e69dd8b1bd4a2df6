//! The task store: three related collections and the operations that keep
//! them consistent.
//!
//! Groups own tasks and tasks own their daily status records. Deleting an
//! owner removes everything beneath it. Every successful mutation is written
//! through to the [`StateSlot`] before the call returns.

use std::collections::{BTreeMap, HashSet};
use std::io::ErrorKind;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::models::{
    now_millis, DailyTaskStatus, GroupColor, GroupId, GroupPatch, NewTask, Palette, StatusId,
    Task, TaskGroup, TaskId, TaskPatch,
};
use crate::storage::{self, AppState, StateRef, StateSlot};

/// What a group deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteSummary {
    pub tasks: usize,
    pub statuses: usize,
}

pub struct TaskStore<S: StateSlot> {
    slot: S,
    task_groups: Vec<TaskGroup>,
    tasks: Vec<Task>,
    daily_statuses: BTreeMap<(TaskId, NaiveDate), DailyTaskStatus>,
}

/// The groups a fresh install starts with.
pub fn seed_groups() -> Vec<TaskGroup> {
    vec![
        TaskGroup::new("Career", GroupColor::Preset(Palette::Blue)),
        TaskGroup::new("Fitness", GroupColor::Preset(Palette::Green)),
    ]
}

impl<S: StateSlot> TaskStore<S> {
    /// Loads the store from `slot`.
    ///
    /// An empty slot yields the seed groups, which are saved right away so
    /// their ids stay stable. A blob that cannot be parsed is logged and
    /// replaced by the seed state in memory; it is only overwritten by the
    /// next mutation. The same goes for a file that is not valid UTF-8.
    pub fn open(slot: S) -> Result<Self> {
        let blob = match slot.read() {
            Ok(blob) => blob,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!(error = %e, "saved state is not valid text, falling back to seed groups");
                return Ok(Self::seeded(slot));
            }
            Err(e) => return Err(e.into()),
        };
        match blob {
            None => {
                info!("no saved state found, starting with seed groups");
                let store = Self::seeded(slot);
                store.persist()?;
                Ok(store)
            }
            Some(blob) => match storage::decode(&blob) {
                Ok(state) => {
                    info!(
                        groups = state.task_groups.len(),
                        tasks = state.tasks.len(),
                        statuses = state.daily_statuses.len(),
                        "loaded saved state"
                    );
                    Ok(Self::from_state(slot, state))
                }
                Err(e) => {
                    warn!(error = %e, "saved state is unreadable, falling back to seed groups");
                    Ok(Self::seeded(slot))
                }
            },
        }
    }

    /// Builds a store from explicit state without touching the slot.
    ///
    /// Status records sharing a `(task, date)` pair collapse to the last one.
    pub fn from_state(slot: S, state: AppState) -> Self {
        let daily_statuses = state
            .daily_statuses
            .into_iter()
            .map(|s| ((s.task_id, s.date), s))
            .collect();
        TaskStore {
            slot,
            task_groups: state.task_groups,
            tasks: state.tasks,
            daily_statuses,
        }
    }

    fn seeded(slot: S) -> Self {
        Self::from_state(slot, AppState { task_groups: seed_groups(), ..AppState::default() })
    }

    /// Wipes the slot and returns to the seed state.
    pub fn reset(&mut self) -> Result<()> {
        self.slot.clear()?;
        self.task_groups = seed_groups();
        self.tasks.clear();
        self.daily_statuses.clear();
        info!("store reset to seed groups");
        self.persist()
    }

    /// An owned copy of all three collections, in persisted form.
    pub fn snapshot(&self) -> AppState {
        AppState {
            task_groups: self.task_groups.clone(),
            tasks: self.tasks.clone(),
            daily_statuses: self.daily_statuses.values().cloned().collect(),
        }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    fn persist(&self) -> Result<()> {
        let blob = storage::encode(StateRef {
            task_groups: &self.task_groups,
            tasks: &self.tasks,
            daily_statuses: self.daily_statuses.values().collect(),
        })?;
        if let Err(e) = self.slot.write(&blob) {
            warn!(error = %e, "failed to save state");
            return Err(e.into());
        }
        Ok(())
    }

    // Reads

    pub fn task_groups(&self) -> &[TaskGroup] {
        &self.task_groups
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// All status records, ordered by task then date.
    pub fn daily_statuses(&self) -> impl Iterator<Item = &DailyTaskStatus> + '_ {
        self.daily_statuses.values()
    }

    pub fn task_group(&self, id: GroupId) -> Option<&TaskGroup> {
        self.task_groups.iter().find(|g| g.id == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks_in_group(&self, id: GroupId) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |t| t.group_id == id)
    }

    pub fn status(&self, task_id: TaskId, date: NaiveDate) -> Option<&DailyTaskStatus> {
        self.daily_statuses.get(&(task_id, date))
    }

    /// Whether `task_id` is marked done on `date`. Never creates a record.
    pub fn get_task_status(&self, task_id: TaskId, date: NaiveDate) -> bool {
        self.status(task_id, date).is_some_and(|s| s.completed)
    }

    // Groups

    pub fn add_task_group(&mut self, name: impl Into<String>, color: GroupColor) -> Result<GroupId> {
        let group = TaskGroup::new(name, color);
        let id = group.id;
        debug!(group = %id, name = %group.name, color = %group.color, "adding task group");
        self.task_groups.push(group);
        self.persist()?;
        Ok(id)
    }

    pub fn update_task_group(&mut self, id: GroupId, patch: GroupPatch) -> Result<()> {
        let group = self
            .task_groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(StoreError::GroupNotFound(id))?;
        patch.apply(group);
        debug!(group = %id, "updated task group");
        self.persist()
    }

    /// Removes the group, its tasks and their status records.
    pub fn delete_task_group(&mut self, id: GroupId) -> Result<DeleteSummary> {
        let before = self.task_groups.len();
        self.task_groups.retain(|g| g.id != id);
        if self.task_groups.len() == before {
            return Err(StoreError::GroupNotFound(id));
        }

        let doomed: HashSet<TaskId> = self.tasks_in_group(id).map(|t| t.id).collect();
        self.tasks.retain(|t| t.group_id != id);
        let statuses_before = self.daily_statuses.len();
        self.daily_statuses.retain(|(task_id, _), _| !doomed.contains(task_id));

        let summary = DeleteSummary {
            tasks: doomed.len(),
            statuses: statuses_before - self.daily_statuses.len(),
        };
        debug!(group = %id, tasks = summary.tasks, statuses = summary.statuses, "deleted task group");
        self.persist()?;
        Ok(summary)
    }

    // Tasks

    /// Adds an active task. The group id is taken on trust.
    pub fn add_task(&mut self, new_task: NewTask) -> Result<TaskId> {
        let task = new_task.into_task();
        let id = task.id;
        debug!(task = %id, group = %task.group_id, title = %task.title, "adding task");
        self.tasks.push(task);
        self.persist()?;
        Ok(id)
    }

    pub fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> Result<()> {
        let task = self.find_task_mut(id)?;
        patch.apply(task);
        debug!(task = %id, "updated task");
        self.persist()
    }

    /// Removes the task and its status records. Returns how many records went with it.
    pub fn delete_task(&mut self, id: TaskId) -> Result<usize> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Err(StoreError::TaskNotFound(id));
        }
        let statuses_before = self.daily_statuses.len();
        self.daily_statuses.retain(|(task_id, _), _| *task_id != id);
        let removed = statuses_before - self.daily_statuses.len();
        debug!(task = %id, statuses = removed, "deleted task");
        self.persist()?;
        Ok(removed)
    }

    /// Flips `active`. Returns the new value.
    pub fn toggle_task_active(&mut self, id: TaskId) -> Result<bool> {
        let task = self.find_task_mut(id)?;
        task.active = !task.active;
        let active = task.active;
        debug!(task = %id, active, "toggled task active");
        self.persist()?;
        Ok(active)
    }

    /// Flips completion for `(task_id, date)`. Returns the new value.
    ///
    /// The first toggle for a pair creates a completed record; later toggles
    /// flip that same record.
    pub fn toggle_task_completion(&mut self, task_id: TaskId, date: NaiveDate) -> Result<bool> {
        if self.task(task_id).is_none() {
            return Err(StoreError::TaskNotFound(task_id));
        }
        let now = now_millis();
        let status = self
            .daily_statuses
            .entry((task_id, date))
            .and_modify(|s| {
                s.completed = !s.completed;
                s.completed_at = s.completed.then_some(now);
            })
            .or_insert_with(|| DailyTaskStatus {
                id: StatusId::new(),
                task_id,
                date,
                completed: true,
                completed_at: Some(now),
            });
        let completed = status.completed;
        debug!(task = %task_id, %date, completed, "toggled completion");
        self.persist()?;
        Ok(completed)
    }

    fn find_task_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))
    }
}
