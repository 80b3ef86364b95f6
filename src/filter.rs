use crate::models::{Task, UserId};

/// Which tasks a query selects.
///
/// Always scoped to one owner; `exclude_completed` narrows it further to
/// tasks that are not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub owner: UserId,
    pub exclude_completed: bool,
}

impl TaskFilter {
    /// All tasks of `owner`.
    pub fn owned_by(owner: UserId) -> Self {
        TaskFilter { owner, exclude_completed: false }
    }

    /// Only the unchecked tasks of `owner`.
    pub fn pending_for(owner: UserId) -> Self {
        TaskFilter { owner, exclude_completed: true }
    }

    pub fn matches(&self, task: &Task) -> bool {
        task.owner == self.owner && !(self.exclude_completed && task.is_checked)
    }
}

/// Sort specification for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first; equal timestamps keep arrival order.
    #[default]
    CreatedDesc,
    /// Arrival order, untouched.
    Natural,
}

impl SortOrder {
    pub fn apply(self, tasks: &mut [Task]) {
        match self {
            // sort_by is stable, so ties stay in arrival order
            SortOrder::CreatedDesc => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Natural => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskId;
    use chrono::{TimeZone, Utc};

    fn task(id: u64, owner: &str, checked: bool, secs: i64) -> Task {
        Task {
            id: TaskId(id),
            owner: UserId::new(owner),
            text: format!("task {id}"),
            is_checked: checked,
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn owner_filter_ignores_completion() {
        let f = TaskFilter::owned_by(UserId::new("a"));
        assert!(f.matches(&task(1, "a", true, 0)));
        assert!(f.matches(&task(2, "a", false, 0)));
        assert!(!f.matches(&task(3, "b", false, 0)));
    }

    #[test]
    fn pending_filter_drops_checked() {
        let f = TaskFilter::pending_for(UserId::new("a"));
        assert!(!f.matches(&task(1, "a", true, 0)));
        assert!(f.matches(&task(2, "a", false, 0)));
        assert!(!f.matches(&task(3, "b", false, 0)));
    }

    #[test]
    fn created_desc_is_stable_on_ties() {
        let mut tasks = vec![task(1, "a", false, 5), task(2, "a", false, 9), task(3, "a", false, 5)];
        SortOrder::CreatedDesc.apply(&mut tasks);
        let ids: Vec<u64> = tasks.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
