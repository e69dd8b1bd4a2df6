use chrono::{Local, NaiveDate};
use ratatui::widgets::TableState;

use crate::commands::resolve_group;
use crate::error::{Result, StoreError};
use crate::models::{GroupColor, GroupId, GroupPatch, NewTask, Palette, TaskId};
use crate::storage::StateSlot;
use crate::store::TaskStore;

#[derive(PartialEq, Debug)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum View {
    Today,
    Groups,
    Progress,
}

impl View {
    pub const ALL: [View; 3] = [View::Today, View::Groups, View::Progress];

    pub fn title(self) -> &'static str {
        match self {
            View::Today => "Today",
            View::Groups => "Groups",
            View::Progress => "Progress",
        }
    }

    fn index(self) -> usize {
        View::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }
}

#[derive(PartialEq, Debug)]
pub enum InputField {
    None,
    GroupName,
    GroupColor,
}

pub enum DisplayItem {
    GroupHeader(GroupId, usize), // Group, visible task count
    Task(TaskId),
}

/// State for the multi-step add wizards.
#[derive(Default)]
pub struct AddState {
    pub step: usize, // Task: 0 title, 1 group. Group: 0 name, 1 color.
    pub name: String,
}

pub struct App<S: StateSlot> {
    pub store: TaskStore<S>,
    pub view: View,
    pub date: NaiveDate,
    pub display_items: Vec<DisplayItem>,
    pub state: TableState,
    pub group_state: TableState,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_group: Option<GroupId>,
    pub add_state: AddState,
    pub show_inactive: bool,
    /// Last outcome shown in the status line.
    pub message: Option<String>,
}

impl<S: StateSlot> App<S> {
    pub fn new(store: TaskStore<S>) -> App<S> {
        let mut app = App {
            store,
            view: View::Today,
            date: Local::now().date_naive(),
            display_items: Vec::new(),
            state: TableState::default(),
            group_state: TableState::default(),
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_group: None,
            add_state: AddState::default(),
            show_inactive: false,
            message: None,
        };
        app.reload();
        app
    }

    /// Records the outcome of a store call for the status line.
    fn report<T>(&mut self, result: Result<T>, ok: impl FnOnce(T) -> String) {
        self.message = Some(match result {
            Ok(v) => ok(v),
            Err(e) => format!("Error: {}", e),
        });
    }

    /// Rebuilds the grouped task list and clamps both selections.
    pub fn reload(&mut self) {
        self.display_items.clear();
        for g in self.store.task_groups() {
            let tasks: Vec<TaskId> = self
                .store
                .tasks_in_group(g.id)
                .filter(|t| self.show_inactive || t.active)
                .map(|t| t.id)
                .collect();
            if tasks.is_empty() {
                continue;
            }
            self.display_items.push(DisplayItem::GroupHeader(g.id, tasks.len()));
            self.display_items.extend(tasks.into_iter().map(DisplayItem::Task));
        }

        clamp(&mut self.state, self.display_items.len());
        clamp(&mut self.group_state, self.store.task_groups().len());
    }

    fn rows(&self) -> usize {
        match self.view {
            View::Today => self.display_items.len(),
            View::Groups => self.store.task_groups().len(),
            View::Progress => 0,
        }
    }

    fn table_state(&mut self) -> &mut TableState {
        match self.view {
            View::Groups => &mut self.group_state,
            _ => &mut self.state,
        }
    }

    /// Selects the next row in the current list.
    pub fn next(&mut self) {
        let len = self.rows();
        if len == 0 {
            return;
        }
        let state = self.table_state();
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    /// Selects the previous row in the current list.
    pub fn previous(&mut self) {
        let len = self.rows();
        if len == 0 {
            return;
        }
        let state = self.table_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn next_view(&mut self) {
        self.view = View::ALL[(self.view.index() + 1) % View::ALL.len()];
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn selected_task(&self) -> Option<TaskId> {
        match self.state.selected().and_then(|i| self.display_items.get(i)) {
            Some(DisplayItem::Task(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn selected_group(&self) -> Option<GroupId> {
        self.group_state
            .selected()
            .and_then(|i| self.store.task_groups().get(i))
            .map(|g| g.id)
    }

    /// Moves the session to the current local day, so a TUI left open past
    /// midnight shows and toggles the new day.
    pub fn refresh_date(&mut self) {
        self.date = Local::now().date_naive();
    }

    /// Toggles today's completion for the selected task.
    pub fn toggle_selected(&mut self) {
        if self.view != View::Today {
            return;
        }
        if let Some(id) = self.selected_task() {
            self.refresh_date();
            let result = self.store.toggle_task_completion(id, self.date);
            self.report(result, |done| if done { "Marked done.".into() } else { "Marked not done.".into() });
        }
    }

    /// Hides or shows the selected task.
    pub fn toggle_active_selected(&mut self) {
        if self.view != View::Today {
            return;
        }
        if let Some(id) = self.selected_task() {
            let result = self.store.toggle_task_active(id);
            self.report(result, |active| if active { "Task shown.".into() } else { "Task hidden.".into() });
            self.reload();
        }
    }

    pub fn toggle_inactive(&mut self) {
        self.show_inactive = !self.show_inactive;
        self.reload();
    }

    /// Deletes the selected task or group.
    pub fn delete_selected(&mut self) {
        match self.view {
            View::Today => {
                if let Some(id) = self.selected_task() {
                    let result = self.store.delete_task(id);
                    self.report(result, |_| "Task deleted.".into());
                }
            }
            View::Groups => {
                if let Some(id) = self.selected_group() {
                    let result = self.store.delete_task_group(id);
                    self.report(result, |s| format!("Group deleted with {} task(s).", s.tasks));
                }
            }
            View::Progress => return,
        }
        self.reload();
    }

    /// Starts the add wizard for the current view.
    pub fn start_add(&mut self) {
        if self.view == View::Progress {
            return;
        }
        if self.view == View::Today && self.store.task_groups().is_empty() {
            self.message = Some("Add a group first.".into());
            return;
        }
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Starts editing a field of the selected group.
    pub fn start_edit(&mut self, field: InputField) {
        if self.view != View::Groups {
            return;
        }
        if let Some(id) = self.selected_group() {
            self.target_group = Some(id);
            self.input_mode = InputMode::Editing;
            self.input_buffer = match (&field, self.store.task_group(id)) {
                (InputField::GroupName, Some(g)) => g.name.clone(),
                (InputField::GroupColor, Some(g)) => g.color.to_string(),
                _ => String::new(),
            };
            self.input_field = field;
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Handles Enter based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Normal => {}
        }
    }

    fn handle_adding_input(&mut self) {
        let input = self.input_buffer.trim().to_string();
        match (self.view, self.add_state.step) {
            (_, 0) => {
                if !input.is_empty() {
                    self.add_state.name = input;
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            (View::Today, 1) => {
                let group = if input.is_empty() {
                    self.store
                        .task_groups()
                        .first()
                        .map(|g| g.id)
                        .ok_or_else(|| StoreError::NoMatch("first group".into()))
                } else {
                    resolve_group(&self.store, &input)
                };
                let title = std::mem::take(&mut self.add_state.name);
                let result = group.and_then(|g| self.store.add_task(NewTask::daily(g, title)));
                self.report(result, |_| "Task added.".into());
                self.cancel_input();
                self.reload();
            }
            (View::Groups, 1) => {
                let color = if input.is_empty() {
                    Ok(GroupColor::Preset(Palette::Blue))
                } else {
                    input.parse::<GroupColor>()
                };
                match color {
                    Ok(color) => {
                        let name = std::mem::take(&mut self.add_state.name);
                        let result = self.store.add_task_group(name, color);
                        self.report(result, |_| "Group added.".into());
                        self.cancel_input();
                        self.reload();
                    }
                    // Stay on this step so the color can be corrected.
                    Err(e) => self.message = Some(format!("Error: {}", e)),
                }
            }
            _ => self.cancel_input(),
        }
    }

    fn handle_editing_input(&mut self) {
        let Some(id) = self.target_group else {
            self.cancel_input();
            return;
        };
        let input = self.input_buffer.trim().to_string();
        let patch = match self.input_field {
            InputField::GroupName if !input.is_empty() => Ok(GroupPatch { name: Some(input), ..Default::default() }),
            InputField::GroupColor => input
                .parse::<GroupColor>()
                .map(|c| GroupPatch { color: Some(c), ..Default::default() }),
            _ => Ok(GroupPatch::default()),
        };
        let result = patch.and_then(|p| {
            if p.is_empty() {
                Ok(())
            } else {
                self.store.update_task_group(id, p)
            }
        });
        self.report(result, |_| "Group updated.".into());
        self.cancel_input();
        self.reload();
    }
}

fn clamp(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        match state.selected() {
            Some(i) if i >= len => state.select(Some(len - 1)),
            None => state.select(Some(0)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySlot;

    fn app(slot: &MemorySlot) -> App<&MemorySlot> {
        App::new(TaskStore::open(slot).unwrap())
    }

    fn type_and_enter(app: &mut App<&MemorySlot>, text: &str) {
        app.input_buffer = text.to_string();
        app.handle_input();
    }

    #[test]
    fn add_task_wizard_uses_named_group() {
        let slot = MemorySlot::default();
        let mut app = app(&slot);

        app.start_add();
        type_and_enter(&mut app, "Stretch");
        type_and_enter(&mut app, "fitness");

        assert_eq!(app.input_mode, InputMode::Normal);
        let task = &app.store.tasks()[0];
        assert_eq!(task.title, "Stretch");
        assert_eq!(app.store.task_group(task.group_id).unwrap().name, "Fitness");
        // Header row for Fitness, then the task.
        assert_eq!(app.display_items.len(), 2);
    }

    #[test]
    fn space_toggles_the_selected_task_for_the_current_day() {
        let slot = MemorySlot::default();
        let mut app = app(&slot);
        app.start_add();
        type_and_enter(&mut app, "Read");
        type_and_enter(&mut app, "");

        app.next(); // move from the header to the task
        app.toggle_selected();
        let id = app.selected_task().unwrap();
        assert!(app.store.get_task_status(id, app.date));

        app.toggle_selected();
        assert!(!app.store.get_task_status(id, app.date));
    }

    #[test]
    fn toggle_after_midnight_marks_the_new_day() {
        let slot = MemorySlot::default();
        let mut app = app(&slot);
        app.start_add();
        type_and_enter(&mut app, "Read");
        type_and_enter(&mut app, "");

        let stale = app.date - chrono::Duration::days(1);
        app.date = stale;
        app.next();
        app.toggle_selected();

        let id = app.selected_task().unwrap();
        assert!(app.date > stale);
        assert!(app.store.get_task_status(id, app.date));
        assert!(!app.store.get_task_status(id, stale));
    }

    #[test]
    fn bad_color_keeps_the_group_wizard_open() {
        let slot = MemorySlot::default();
        let mut app = app(&slot);
        app.set_view(View::Groups);

        app.start_add();
        type_and_enter(&mut app, "Reading");
        type_and_enter(&mut app, "#XYZ");
        assert_eq!(app.input_mode, InputMode::Adding);
        assert_eq!(app.store.task_groups().len(), 2);

        type_and_enter(&mut app, "#ff8800");
        assert_eq!(app.input_mode, InputMode::Normal);
        let added = app.store.task_groups().last().unwrap();
        assert_eq!(added.name, "Reading");
        assert_eq!(added.color, GroupColor::Custom("#FF8800".into()));
    }

    #[test]
    fn hidden_tasks_leave_the_list_until_shown() {
        let slot = MemorySlot::default();
        let mut app = app(&slot);
        app.start_add();
        type_and_enter(&mut app, "Run");
        type_and_enter(&mut app, "Fitness");
        app.next();

        app.toggle_active_selected();
        assert!(app.display_items.is_empty());

        app.toggle_inactive();
        assert_eq!(app.display_items.len(), 2);
    }
}
