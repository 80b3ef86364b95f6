use tracing::debug;

use crate::error::StoreError;
use crate::filter::{SortOrder, TaskFilter};
use crate::models::{Session, Task, UserId};
use crate::store::{ReadinessHandle, TaskStore, TASKS_TOPIC};

/// What the task list shows for one derivation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskListView {
    /// Visible tasks, newest first.
    pub tasks: Vec<Task>,
    /// Unchecked tasks owned by the user, regardless of the hide-completed toggle.
    pub pending_count: usize,
    /// Set while the subscription has not delivered its first data.
    pub is_loading: bool,
}

impl TaskListView {
    fn loading() -> Self {
        TaskListView { is_loading: true, ..TaskListView::default() }
    }
}

/// Composes the filter for the visible list.
pub fn compose_filter(owner: &UserId, hide_completed: bool) -> TaskFilter {
    TaskFilter { owner: owner.clone(), exclude_completed: hide_completed }
}

/// Header suffix for the pending badge: ` (N)`, or nothing when N is zero.
pub fn pending_title(pending_count: usize) -> String {
    if pending_count == 0 {
        String::new()
    } else {
        format!(" ({pending_count})")
    }
}

/// Derives the task list view and owns the subscription behind it.
///
/// The subscription is opened lazily for the first logged-in user and
/// reopened when the user changes.
#[derive(Debug, Default)]
pub struct TaskListQuery {
    subscription: Option<(UserId, ReadinessHandle)>,
}

impl TaskListQuery {
    pub fn new() -> Self {
        TaskListQuery::default()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn derive<S: TaskStore>(
        &mut self,
        store: &mut S,
        session: &Session,
        hide_completed: bool,
    ) -> Result<TaskListView, StoreError> {
        let Some(user) = session.user_id() else {
            self.subscription = None;
            return Ok(TaskListView::default());
        };

        let current = match &self.subscription {
            Some((owner, handle)) if owner == user => Some(handle.clone()),
            _ => None,
        };
        let handle = match current {
            Some(handle) => handle,
            None => {
                debug!(user = %user, "Opening task subscription");
                let handle = store.subscribe(TASKS_TOPIC)?;
                self.subscription = Some((user.clone(), handle.clone()));
                handle
            }
        };

        if !handle.ready() {
            return Ok(TaskListView::loading());
        }

        let tasks = store.query(&compose_filter(user, hide_completed), SortOrder::CreatedDesc);
        let pending_count = store.count(&TaskFilter::pending_for(user.clone()));
        Ok(TaskListView { tasks, pending_count, is_loading: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_title_hides_zero() {
        assert_eq!(pending_title(0), "");
        assert_eq!(pending_title(3), " (3)");
    }

    #[test]
    fn compose_filter_follows_toggle() {
        let owner = UserId::new("u1");
        assert!(!compose_filter(&owner, false).exclude_completed);
        assert_eq!(compose_filter(&owner, true), TaskFilter::pending_for(owner));
    }
}
