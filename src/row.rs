use crate::models::{Task, TaskId};

/// What a row asks its parent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIntent {
    /// Carries the current flag so the caller can invert it.
    ToggleChecked { id: TaskId, is_checked: bool },
    Delete { id: TaskId },
}

/// Presentational form of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: TaskId,
    pub checkbox: &'static str,
    pub text: String,
    pub is_checked: bool,
}

impl TaskRow {
    pub fn toggle_intent(&self) -> RowIntent {
        RowIntent::ToggleChecked { id: self.id, is_checked: self.is_checked }
    }

    pub fn delete_intent(&self) -> RowIntent {
        RowIntent::Delete { id: self.id }
    }
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        TaskRow {
            id: task.id,
            checkbox: if task.is_checked { "[x]" } else { "[ ]" },
            text: task.text.clone(),
            is_checked: task.is_checked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use chrono::Utc;

    #[test]
    fn row_intents_carry_id_and_flag() {
        let task = Task {
            id: TaskId(4),
            owner: UserId::new("u1"),
            text: "water plants".into(),
            is_checked: true,
            created_at: Utc::now(),
        };
        let row = TaskRow::from(&task);
        assert_eq!(row.checkbox, "[x]");
        assert_eq!(row.toggle_intent(), RowIntent::ToggleChecked { id: TaskId(4), is_checked: true });
        assert_eq!(row.delete_intent(), RowIntent::Delete { id: TaskId(4) });
    }
}
