use chrono::{TimeZone, Utc};
use todolist::models::{Session, Task, TaskId, User, UserId};
use todolist::query::TaskListQuery;
use todolist::store::{LocalStore, TaskStore};

fn user(id: &str) -> User {
    User {
        id: UserId::new(id),
        username: id.into(),
        profile_name: None,
        password_hash: String::new(),
    }
}

fn task(id: u64, owner: &str, checked: bool, secs: i64) -> Task {
    Task {
        id: TaskId(id),
        owner: UserId::new(owner),
        text: format!("task {id}"),
        is_checked: checked,
        created_at: Utc.timestamp_opt(secs, 0).unwrap(),
    }
}

/// A(unchecked, t=3), B(checked, t=2), C(unchecked, t=1) for "u", plus noise from "v".
fn scenario_store() -> LocalStore {
    LocalStore::in_memory(vec![
        task(3, "u", false, 1), // C
        task(10, "v", false, 5),
        task(1, "u", false, 3), // A
        task(2, "u", true, 2),  // B
        task(11, "v", true, 4),
    ])
}

fn ids(tasks: &[Task]) -> Vec<u64> {
    tasks.iter().map(|t| t.id.0).collect()
}

/// Derives once to open the subscription, syncs, then derives again.
fn ready_view(
    query: &mut TaskListQuery,
    store: &mut LocalStore,
    session: &Session,
    hide_completed: bool,
) -> todolist::query::TaskListView {
    query.derive(store, session, hide_completed).unwrap();
    store.sync().unwrap();
    query.derive(store, session, hide_completed).unwrap()
}

#[test]
fn test_scenario_show_all_and_hide_completed() {
    let mut store = scenario_store();
    let mut query = TaskListQuery::new();
    let session = Session::for_user(user("u"));

    let all = ready_view(&mut query, &mut store, &session, false);
    assert!(!all.is_loading);
    assert_eq!(ids(&all.tasks), vec![1, 2, 3]);
    assert_eq!(all.pending_count, 2);

    let pending = query.derive(&mut store, &session, true).unwrap();
    assert_eq!(ids(&pending.tasks), vec![1, 3]);
    assert_eq!(pending.pending_count, 2);
}

#[test]
fn test_unchecking_b_raises_pending_count() {
    let mut store = scenario_store();
    let mut query = TaskListQuery::new();
    let session = Session::for_user(user("u"));
    ready_view(&mut query, &mut store, &session, false);

    store.set_is_checked(session.user_id(), TaskId(2), false).unwrap();
    let view = query.derive(&mut store, &session, false).unwrap();
    assert_eq!(view.pending_count, 3);
}

#[test]
fn test_hiding_completed_only_removes_checked_tasks() {
    let mut store = scenario_store();
    let mut query = TaskListQuery::new();
    let session = Session::for_user(user("u"));

    let shown = ready_view(&mut query, &mut store, &session, false);
    let hidden = query.derive(&mut store, &session, true).unwrap();

    let expected: Vec<Task> = shown.tasks.iter().filter(|t| !t.is_checked).cloned().collect();
    assert_eq!(hidden.tasks, expected);
    assert_eq!(hidden.pending_count, shown.pending_count);
}

#[test]
fn test_anonymous_sees_nothing_and_subscribes_to_nothing() {
    let mut store = scenario_store();
    let mut query = TaskListQuery::new();

    let view = ready_view(&mut query, &mut store, &Session::anonymous(), false);
    assert!(view.tasks.is_empty());
    assert_eq!(view.pending_count, 0);
    assert!(!view.is_loading);
    assert!(!query.is_subscribed());
}

#[test]
fn test_loading_until_subscription_is_ready() {
    let mut store = scenario_store();
    let mut query = TaskListQuery::new();
    let session = Session::for_user(user("u"));

    let first = query.derive(&mut store, &session, false).unwrap();
    assert!(first.is_loading);
    assert!(first.tasks.is_empty());
    assert_eq!(first.pending_count, 0);

    // still waiting: nothing has synced yet
    let again = query.derive(&mut store, &session, false).unwrap();
    assert!(again.is_loading);

    store.sync().unwrap();
    let ready = query.derive(&mut store, &session, false).unwrap();
    assert!(!ready.is_loading);
    assert_eq!(ids(&ready.tasks), vec![1, 2, 3]);
}

#[test]
fn test_switching_user_resubscribes() {
    let mut store = scenario_store();
    let mut query = TaskListQuery::new();

    ready_view(&mut query, &mut store, &Session::for_user(user("u")), false);
    let other = query.derive(&mut store, &Session::for_user(user("v")), false).unwrap();
    assert!(other.is_loading);

    store.sync().unwrap();
    let other = query.derive(&mut store, &Session::for_user(user("v")), false).unwrap();
    assert_eq!(ids(&other.tasks), vec![10, 11]);
    assert_eq!(other.pending_count, 1);
}

#[test]
fn test_equal_timestamps_keep_arrival_order() {
    let mut store = LocalStore::in_memory(vec![
        task(5, "u", false, 7),
        task(2, "u", false, 9),
        task(4, "u", true, 7),
        task(1, "u", false, 7),
    ]);
    let mut query = TaskListQuery::new();
    let view = ready_view(&mut query, &mut store, &Session::for_user(user("u")), false);
    assert_eq!(ids(&view.tasks), vec![2, 5, 4, 1]);
}
