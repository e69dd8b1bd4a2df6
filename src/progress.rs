use chrono::{Duration, NaiveDate};

use crate::models::{DailyTaskStatus, Task};

/// Number of days shown in the history strip, including the reference day.
pub const HISTORY_DAYS: usize = 7;

/// Bucketed completion volume for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeatLevel {
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl HeatLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Maps a completion count onto a heat level: 0, 1-2, 3-4, 5+.
pub fn heat_level(count: usize) -> HeatLevel {
    match count {
        0 => HeatLevel::None,
        1..=2 => HeatLevel::Low,
        3..=4 => HeatLevel::Medium,
        _ => HeatLevel::High,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySummary {
    pub completed: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent.
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayHistory {
    pub date: NaiveDate,
    /// Short weekday name, e.g. "Mon".
    pub label: String,
    pub completed: usize,
    pub level: HeatLevel,
}

/// Completed records dated `date`, regardless of whether the task is still active.
pub fn completed_on<'a, I>(statuses: I, date: NaiveDate) -> usize
where
    I: IntoIterator<Item = &'a DailyTaskStatus>,
{
    statuses
        .into_iter()
        .filter(|s| s.date == date && s.completed)
        .count()
}

/// Progress over active tasks for a single day.
pub fn day_summary<'a, I>(tasks: &[Task], statuses: I, date: NaiveDate) -> DaySummary
where
    I: IntoIterator<Item = &'a DailyTaskStatus>,
{
    let done: Vec<_> = statuses
        .into_iter()
        .filter(|s| s.date == date && s.completed)
        .map(|s| s.task_id)
        .collect();
    let active: Vec<&Task> = tasks.iter().filter(|t| t.active).collect();
    let total = active.len();
    let completed = active.iter().filter(|t| done.contains(&t.id)).count();
    let percent = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    };
    DaySummary { completed, total, percent }
}

/// The last [`HISTORY_DAYS`] days ending at `reference`, oldest first.
pub fn week_history<'a, I>(statuses: I, reference: NaiveDate) -> Vec<DayHistory>
where
    I: IntoIterator<Item = &'a DailyTaskStatus>,
{
    let statuses: Vec<&DailyTaskStatus> = statuses.into_iter().collect();
    (0..HISTORY_DAYS)
        .rev()
        .map(|back| {
            let date = reference - Duration::days(back as i64);
            let completed = completed_on(statuses.iter().copied(), date);
            DayHistory {
                date,
                label: date.format("%a").to_string(),
                completed,
                level: heat_level(completed),
            }
        })
        .collect()
}

/// Every completed record ever kept.
pub fn total_completed<'a, I>(statuses: I) -> usize
where
    I: IntoIterator<Item = &'a DailyTaskStatus>,
{
    statuses.into_iter().filter(|s| s.completed).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_level_buckets() {
        assert_eq!(heat_level(0), HeatLevel::None);
        assert_eq!(heat_level(1), HeatLevel::Low);
        assert_eq!(heat_level(2), HeatLevel::Low);
        assert_eq!(heat_level(3), HeatLevel::Medium);
        assert_eq!(heat_level(4), HeatLevel::Medium);
        assert_eq!(heat_level(5), HeatLevel::High);
        assert_eq!(heat_level(40).as_u8(), 3);
    }
}
