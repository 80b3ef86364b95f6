//! Named remote operations on the task collection.
//!
//! Calls are fire-and-forget: [`MutationGateway::call`] only queues them.
//! [`MutationGateway::flush`] applies the queue in order against a store and
//! reports one outcome per call; the visible effect reaches views through the
//! store's observers.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::{Session, TaskId, UserId};
use crate::row::RowIntent;
use crate::store::TaskStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    Insert { text: String, created_at: DateTime<Utc> },
    SetIsChecked { id: TaskId, value: bool },
    Remove { id: TaskId },
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::Insert { .. } => "tasks.insert",
            Method::SetIsChecked { .. } => "tasks.setIsChecked",
            Method::Remove { .. } => "tasks.remove",
        }
    }
}

impl From<RowIntent> for Method {
    fn from(intent: RowIntent) -> Self {
        match intent {
            RowIntent::ToggleChecked { id, is_checked } => Method::SetIsChecked { id, value: !is_checked },
            RowIntent::Delete { id } => Method::Remove { id },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodResult {
    Inserted(TaskId),
    Updated(TaskId),
    Removed(TaskId),
}

#[derive(Debug)]
pub struct CallOutcome {
    pub call: CallId,
    pub method: &'static str,
    pub result: Result<MethodResult, StoreError>,
}

struct PendingCall {
    id: CallId,
    caller: Option<UserId>,
    method: Method,
}

#[derive(Default)]
pub struct MutationGateway {
    queue: VecDeque<PendingCall>,
    next_call: u64,
}

impl MutationGateway {
    pub fn new() -> Self {
        MutationGateway::default()
    }

    /// Queues `method` on behalf of the session's user.
    pub fn call(&mut self, session: &Session, method: Method) -> CallId {
        let id = CallId(self.next_call);
        self.next_call += 1;
        debug!(call = id.0, method = method.name(), "Queued method call");
        self.queue.push_back(PendingCall { id, caller: session.user_id().cloned(), method });
        id
    }

    pub fn insert(&mut self, session: &Session, text: &str) -> CallId {
        self.call(session, Method::Insert { text: text.to_string(), created_at: Utc::now() })
    }

    pub fn set_is_checked(&mut self, session: &Session, id: TaskId, value: bool) -> CallId {
        self.call(session, Method::SetIsChecked { id, value })
    }

    pub fn remove(&mut self, session: &Session, id: TaskId) -> CallId {
        self.call(session, Method::Remove { id })
    }

    /// Forwards a row intent as the matching method call.
    pub fn dispatch(&mut self, session: &Session, intent: RowIntent) -> CallId {
        self.call(session, Method::from(intent))
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Applies every queued call in order.
    pub fn flush<S: TaskStore>(&mut self, store: &mut S) -> Vec<CallOutcome> {
        let mut outcomes = Vec::with_capacity(self.queue.len());
        while let Some(call) = self.queue.pop_front() {
            let caller = call.caller.as_ref();
            let result = match &call.method {
                Method::Insert { text, created_at } => {
                    store.insert(caller, text, *created_at).map(MethodResult::Inserted)
                }
                Method::SetIsChecked { id, value } => {
                    store.set_is_checked(caller, *id, *value).map(|_| MethodResult::Updated(*id))
                }
                Method::Remove { id } => store.remove(caller, *id).map(|_| MethodResult::Removed(*id)),
            };
            if let Err(e) = &result {
                warn!(call = call.id.0, method = call.method.name(), error = %e, "Method call rejected");
            }
            outcomes.push(CallOutcome { call: call.id, method: call.method.name(), result });
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_intent_inverts_flag() {
        let m = Method::from(RowIntent::ToggleChecked { id: TaskId(2), is_checked: false });
        assert_eq!(m, Method::SetIsChecked { id: TaskId(2), value: true });
        assert_eq!(m.name(), "tasks.setIsChecked");
        assert_eq!(Method::from(RowIntent::Delete { id: TaskId(2) }).name(), "tasks.remove");
    }

    #[test]
    fn calls_are_queued_until_flush() {
        let mut gateway = MutationGateway::new();
        let first = gateway.remove(&Session::anonymous(), TaskId(1));
        let second = gateway.remove(&Session::anonymous(), TaskId(2));
        assert_eq!(gateway.pending(), 2);
        assert_eq!((first, second), (CallId(0), CallId(1)));
    }
}
