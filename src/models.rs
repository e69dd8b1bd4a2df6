use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_type!(
    /// Identifies a [`TaskGroup`].
    GroupId
);
id_type!(
    /// Identifies a [`Task`].
    TaskId
);
id_type!(
    /// Identifies a [`DailyTaskStatus`] record.
    StatusId
);

/// Current time as Unix epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// The fixed set of named colors offered by the group picker.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Blue,
    Green,
    Purple,
    Red,
    Orange,
    Teal,
    Pink,
    Indigo,
    Slate,
}

impl Palette {
    pub const ALL: [Palette; 9] = [
        Palette::Blue,
        Palette::Green,
        Palette::Purple,
        Palette::Red,
        Palette::Orange,
        Palette::Teal,
        Palette::Pink,
        Palette::Indigo,
        Palette::Slate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Palette::Blue => "blue",
            Palette::Green => "green",
            Palette::Purple => "purple",
            Palette::Red => "red",
            Palette::Orange => "orange",
            Palette::Teal => "teal",
            Palette::Pink => "pink",
            Palette::Indigo => "indigo",
            Palette::Slate => "slate",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Palette::Blue => (0x3B, 0x82, 0xF6),
            Palette::Green => (0x22, 0xC5, 0x5E),
            Palette::Purple => (0xA8, 0x55, 0xF7),
            Palette::Red => (0xEF, 0x44, 0x44),
            Palette::Orange => (0xF9, 0x73, 0x16),
            Palette::Teal => (0x14, 0xB8, 0xA6),
            Palette::Pink => (0xEC, 0x48, 0x99),
            Palette::Indigo => (0x63, 0x66, 0xF1),
            Palette::Slate => (0x64, 0x74, 0x8B),
        }
    }
}

impl FromStr for Palette {
    type Err = StoreError;

    /// Accepts the bare name (`blue`) as well as the legacy class token (`bg-blue-500`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let name = lower.strip_prefix("bg-").unwrap_or(&lower);
        let name = name.strip_suffix("-500").unwrap_or(name);
        Palette::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| StoreError::InvalidColor(s.to_string()))
    }
}

/// A group's color: either a palette token or a literal `#RRGGBB` value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Preset(Palette),
    Custom(String),
}

impl GroupColor {
    /// RGB components for rendering. A malformed custom value renders as slate.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            GroupColor::Preset(p) => p.rgb(),
            GroupColor::Custom(hex) => parse_hex(hex).unwrap_or(Palette::Slate.rgb()),
        }
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupColor::Preset(p) => f.write_str(p.name()),
            GroupColor::Custom(hex) => f.write_str(hex),
        }
    }
}

impl FromStr for GroupColor {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Ok(GroupColor::Custom(format!("#{}", hex.to_ascii_uppercase())));
            }
            return Err(StoreError::InvalidColor(s.to_string()));
        }
        trimmed.parse().map(GroupColor::Preset)
    }
}

/// How often a task is meant to be done. Informational only.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    #[serde(rename = "One-time")]
    OneTime,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::OneTime => "One-time",
        })
    }
}

impl FromStr for Frequency {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "one-time" | "onetime" | "once" => Ok(Frequency::OneTime),
            _ => Err(StoreError::InvalidValue(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        })
    }
}

impl FromStr for Priority {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(StoreError::InvalidValue(s.to_string())),
        }
    }
}

/// A named, colored category of tasks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroup {
    pub id: GroupId,
    pub name: String,
    pub color: GroupColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

impl TaskGroup {
    pub fn new(name: impl Into<String>, color: GroupColor) -> Self {
        TaskGroup {
            id: GroupId::new(),
            name: name.into(),
            color,
            icon: None,
            created_at: now_millis(),
        }
    }
}

/// A unit of recurring work belonging to one group.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub group_id: GroupId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Free-form display string such as "30 min".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    /// Inactive tasks are hidden from the daily view but keep their history.
    pub active: bool,
    pub created_at: i64,
}

/// Completion of one task on one calendar day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyTaskStatus {
    pub id: StatusId,
    pub task_id: TaskId,
    pub date: NaiveDate,
    pub completed: bool,
    /// Set only while `completed` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

/// Payload for adding a task. The store fills in id, timestamp and `active`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub group_id: GroupId,
    pub title: String,
    pub frequency: Frequency,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub estimated_time: Option<String>,
}

impl NewTask {
    /// A daily task with no optional fields set.
    pub fn daily(group_id: GroupId, title: impl Into<String>) -> Self {
        NewTask {
            group_id,
            title: title.into(),
            frequency: Frequency::Daily,
            description: None,
            priority: None,
            estimated_time: None,
        }
    }

    pub(crate) fn into_task(self) -> Task {
        Task {
            id: TaskId::new(),
            group_id: self.group_id,
            title: self.title,
            description: self.description,
            frequency: self.frequency,
            priority: self.priority,
            estimated_time: self.estimated_time,
            active: true,
            created_at: now_millis(),
        }
    }
}

/// Field-by-field update for a [`TaskGroup`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub color: Option<GroupColor>,
    /// `Some(None)` clears the icon.
    pub icon: Option<Option<String>>,
}

impl GroupPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.icon.is_none()
    }

    pub(crate) fn apply(self, group: &mut TaskGroup) {
        if let Some(name) = self.name {
            group.name = name;
        }
        if let Some(color) = self.color {
            group.color = color;
        }
        if let Some(icon) = self.icon {
            group.icon = icon;
        }
    }
}

/// Field-by-field update for a [`Task`]. `None` leaves a field unchanged,
/// `Some(None)` on an optional field clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub group_id: Option<GroupId>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub frequency: Option<Frequency>,
    pub priority: Option<Option<Priority>>,
    pub estimated_time: Option<Option<String>>,
    pub active: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(g) = self.group_id {
            task.group_id = g;
        }
        if let Some(t) = self.title {
            task.title = t;
        }
        if let Some(d) = self.description {
            task.description = d;
        }
        if let Some(f) = self.frequency {
            task.frequency = f;
        }
        if let Some(p) = self.priority {
            task.priority = p;
        }
        if let Some(e) = self.estimated_time {
            task.estimated_time = e;
        }
        if let Some(a) = self.active {
            task.active = a;
        }
    }
}
