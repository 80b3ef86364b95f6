//! The reactive task collection.
//!
//! A [`TaskStore`] answers queries synchronously from what it currently
//! holds, hands out [`ReadinessHandle`]s for subscriptions that only become
//! ready on the next [`TaskStore::sync`], and tells registered observers about
//! every change so views know when to re-derive.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::filter::{SortOrder, TaskFilter};
use crate::models::{Task, TaskId, UserId};
use crate::storage;

/// The only publication the store serves.
pub const TASKS_TOPIC: &str = "tasks";

/// Tracks whether a subscription has received its first batch of data.
#[derive(Debug, Clone)]
pub struct ReadinessHandle {
    topic: String,
    ready: Rc<Cell<bool>>,
}

impl ReadinessHandle {
    fn pending(topic: &str) -> Self {
        ReadinessHandle { topic: topic.to_string(), ready: Rc::new(Cell::new(false)) }
    }

    pub fn ready(&self) -> bool {
        self.ready.get()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn mark_ready(&self) {
        self.ready.set(true);
    }
}

/// Change notifications delivered to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A subscription on this topic became ready.
    Ready(String),
    Inserted(TaskId),
    Updated(TaskId),
    Removed(TaskId),
    /// The backing file changed underneath us and was read again.
    Reloaded,
}

pub type Observer = Box<dyn FnMut(&StoreEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

/// A reactive collection of tasks.
///
/// Mutations take the caller's user id explicitly and enforce ownership:
/// only the owner of a task may check or remove it.
pub trait TaskStore {
    /// Starts a subscription. The handle is not ready until the next `sync`.
    fn subscribe(&mut self, topic: &str) -> Result<ReadinessHandle, StoreError>;

    /// Returns the tasks matching `filter`, ordered by `sort`.
    fn query(&self, filter: &TaskFilter, sort: SortOrder) -> Vec<Task>;

    fn count(&self, filter: &TaskFilter) -> usize {
        self.query(filter, SortOrder::Natural).len()
    }

    fn find(&self, id: TaskId) -> Option<Task>;

    fn insert(
        &mut self,
        caller: Option<&UserId>,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<TaskId, StoreError>;

    fn set_is_checked(&mut self, caller: Option<&UserId>, id: TaskId, value: bool) -> Result<(), StoreError>;

    fn remove(&mut self, caller: Option<&UserId>, id: TaskId) -> Result<(), StoreError>;

    /// Pulls in outside changes and marks pending subscriptions ready.
    fn sync(&mut self) -> Result<(), StoreError>;

    fn observe(&mut self, observer: Observer) -> ObserverId;

    fn unobserve(&mut self, id: ObserverId) -> bool;
}

/// A [`TaskStore`] held in memory, optionally mirrored to a JSON file.
pub struct LocalStore {
    tasks: Vec<Task>,
    path: Option<PathBuf>,
    loaded: bool,
    pending: Vec<ReadinessHandle>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl LocalStore {
    /// A store that lives only in memory, seeded with `tasks` in arrival order.
    pub fn in_memory(tasks: Vec<Task>) -> Self {
        LocalStore {
            tasks,
            path: None,
            loaded: true,
            pending: Vec::new(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// A store backed by `path`. Nothing is read until the first sync or mutation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        LocalStore { path: Some(path.into()), loaded: false, ..LocalStore::in_memory(Vec::new()) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }

    /// Brings the in-memory copy up to date with the backing file.
    ///
    /// Runs before every mutation so a write made by another process is
    /// never overwritten by a stale snapshot. Observers hear `Reloaded` when
    /// an already loaded copy turns out to differ from disk.
    fn catch_up(&mut self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            self.loaded = true;
            return Ok(());
        };
        let on_disk = storage::load_tasks(path)?;
        if !self.loaded {
            debug!(path = %path.display(), count = on_disk.len(), "Loaded tasks");
            self.tasks = on_disk;
            self.loaded = true;
        } else if on_disk != self.tasks {
            debug!(path = %path.display(), count = on_disk.len(), "Reloaded tasks after outside change");
            self.tasks = on_disk;
            self.notify(StoreEvent::Reloaded);
        }
        Ok(())
    }

    /// Writes `next` to the backing file and only then adopts it.
    fn commit(&mut self, next: Vec<Task>) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            storage::save_tasks(path, &next)?;
        }
        self.tasks = next;
        Ok(())
    }

    /// Index of task `id`, provided `caller` owns it.
    fn owned_index(&self, caller: Option<&UserId>, id: TaskId) -> Result<usize, StoreError> {
        let caller = caller.ok_or(StoreError::NotLoggedIn)?;
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;
        if &self.tasks[idx].owner != caller {
            return Err(StoreError::NotAuthorized(id));
        }
        Ok(idx)
    }
}

impl TaskStore for LocalStore {
    fn subscribe(&mut self, topic: &str) -> Result<ReadinessHandle, StoreError> {
        if topic != TASKS_TOPIC {
            return Err(StoreError::UnknownTopic(topic.to_string()));
        }
        let handle = ReadinessHandle::pending(topic);
        self.pending.push(handle.clone());
        debug!(topic, "Subscription requested");
        Ok(handle)
    }

    fn query(&self, filter: &TaskFilter, sort: SortOrder) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.iter().filter(|t| filter.matches(t)).cloned().collect();
        sort.apply(&mut tasks);
        tasks
    }

    fn count(&self, filter: &TaskFilter) -> usize {
        self.tasks.iter().filter(|t| filter.matches(t)).count()
    }

    fn find(&self, id: TaskId) -> Option<Task> {
        self.tasks.iter().find(|t| t.id == id).cloned()
    }

    fn insert(
        &mut self,
        caller: Option<&UserId>,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<TaskId, StoreError> {
        let owner = caller.ok_or(StoreError::NotLoggedIn)?.clone();
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        self.catch_up()?;

        let id = TaskId(self.tasks.iter().map(|t| t.id.0).max().unwrap_or(0) + 1);
        let mut next = self.tasks.clone();
        next.push(Task { id, owner, text: text.to_string(), is_checked: false, created_at });
        self.commit(next)?;

        info!(task = %id, "Task inserted");
        self.notify(StoreEvent::Inserted(id));
        Ok(id)
    }

    fn set_is_checked(&mut self, caller: Option<&UserId>, id: TaskId, value: bool) -> Result<(), StoreError> {
        self.catch_up()?;
        let idx = self.owned_index(caller, id)?;
        let mut next = self.tasks.clone();
        next[idx].is_checked = value;
        self.commit(next)?;

        info!(task = %id, is_checked = value, "Task updated");
        self.notify(StoreEvent::Updated(id));
        Ok(())
    }

    fn remove(&mut self, caller: Option<&UserId>, id: TaskId) -> Result<(), StoreError> {
        self.catch_up()?;
        let idx = self.owned_index(caller, id)?;
        let mut next = self.tasks.clone();
        next.remove(idx);
        self.commit(next)?;

        info!(task = %id, "Task removed");
        self.notify(StoreEvent::Removed(id));
        Ok(())
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        self.catch_up()?;

        for handle in std::mem::take(&mut self.pending) {
            handle.mark_ready();
            debug!(topic = handle.topic(), "Subscription ready");
            self.notify(StoreEvent::Ready(handle.topic().to_string()));
        }
        Ok(())
    }

    fn observe(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn alice() -> UserId {
        UserId::new("alice")
    }

    #[test]
    fn subscription_becomes_ready_on_sync() {
        let mut store = LocalStore::in_memory(Vec::new());
        let handle = store.subscribe(TASKS_TOPIC).unwrap();
        assert!(!handle.ready());
        store.sync().unwrap();
        assert!(handle.ready());
    }

    #[test]
    fn unknown_topic_is_rejected() {
        let mut store = LocalStore::in_memory(Vec::new());
        assert!(matches!(store.subscribe("notes"), Err(StoreError::UnknownTopic(t)) if t == "notes"));
    }

    #[test]
    fn observers_see_every_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = LocalStore::in_memory(Vec::new());
        let sink = seen.clone();
        let oid = store.observe(Box::new(move |e| sink.borrow_mut().push(e.clone())));

        let id = store.insert(Some(&alice()), "buy milk", Utc::now()).unwrap();
        store.set_is_checked(Some(&alice()), id, true).unwrap();
        store.remove(Some(&alice()), id).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![StoreEvent::Inserted(id), StoreEvent::Updated(id), StoreEvent::Removed(id)]
        );

        assert!(store.unobserve(oid));
        store.insert(Some(&alice()), "again", Utc::now()).unwrap();
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn insert_trims_and_rejects_blank_text() {
        let mut store = LocalStore::in_memory(Vec::new());
        assert!(matches!(store.insert(Some(&alice()), "   ", Utc::now()), Err(StoreError::EmptyText)));
        assert!(matches!(store.insert(None, "x", Utc::now()), Err(StoreError::NotLoggedIn)));

        let id = store.insert(Some(&alice()), "  walk dog ", Utc::now()).unwrap();
        assert_eq!(store.find(id).unwrap().text, "walk dog");
    }
}
