use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::auth::Accounts;
use crate::config::Config;
use crate::error::{AppError, StoreError};
use crate::models::{Session, TaskId};
use crate::mutations::{Method, MethodResult, MutationGateway};
use crate::query::{pending_title, TaskListQuery, TaskListView};
use crate::row::TaskRow;
use crate::store::{LocalStore, TaskStore};

/// Runs one method call to completion against the on-disk store.
fn call_once(config: &Config, session: &Session, method: Method) -> Result<MethodResult, AppError> {
    let mut store = LocalStore::open(config.tasks_path());
    store.sync()?;
    let mut gateway = MutationGateway::new();
    gateway.call(session, method);
    match gateway.flush(&mut store).pop() {
        Some(outcome) => Ok(outcome.result?),
        None => Err(AppError::Usage("No method call was issued".into())),
    }
}

/// Derives the list the way the TUI would: subscribe, wait for readiness, read.
pub fn load_view(config: &Config, session: &Session, hide_completed: bool) -> Result<TaskListView, AppError> {
    let mut store = LocalStore::open(config.tasks_path());
    let mut query = TaskListQuery::new();
    let view = query.derive(&mut store, session, hide_completed)?;
    if !view.is_loading {
        return Ok(view);
    }
    store.sync()?;
    Ok(query.derive(&mut store, session, hide_completed)?)
}

/// Registers a new account.
pub fn cmd_register(config: &Config, username: &str, password: &str, name: Option<String>) -> Result<(), AppError> {
    let user = Accounts::new(config.data_dir()).create_user(username, password, name)?;
    println!("User '{}' registered (id = {}).", user.username, user.id);
    Ok(())
}

pub fn cmd_login(config: &Config, username: &str, password: &str) -> Result<(), AppError> {
    let session = Accounts::new(config.data_dir()).login_with_password(username, password)?;
    if let Some(user) = &session.user {
        println!("Logged in as {}.", user.display_name());
    }
    Ok(())
}

pub fn cmd_logout(config: &Config) -> Result<(), AppError> {
    Accounts::new(config.data_dir()).logout()?;
    println!("Logged out.");
    Ok(())
}

pub fn cmd_whoami(config: &Config) -> Result<(), AppError> {
    match Accounts::new(config.data_dir()).current_session()?.user {
        Some(user) => println!("{} ({})", user.display_name(), user.id),
        None => println!("Not logged in."),
    }
    Ok(())
}

/// Adds a task owned by the logged-in user.
pub fn cmd_add(config: &Config, text: &str) -> Result<TaskId, AppError> {
    let session = Accounts::new(config.data_dir()).current_session()?;
    let method = Method::Insert { text: text.to_string(), created_at: chrono::Utc::now() };
    match call_once(config, &session, method)? {
        MethodResult::Inserted(id) => {
            println!("Task added (id = {id})");
            Ok(id)
        }
        other => Err(AppError::Usage(format!("Unexpected result {other:?}"))),
    }
}

/// Flips the checked flag of a task.
pub fn cmd_check(config: &Config, id: TaskId) -> Result<(), AppError> {
    let session = Accounts::new(config.data_dir()).current_session()?;
    let mut store = LocalStore::open(config.tasks_path());
    store.sync()?;
    let task = store.find(id).ok_or(StoreError::TaskNotFound(id))?;
    let row = TaskRow::from(&task);

    let mut gateway = MutationGateway::new();
    gateway.dispatch(&session, row.toggle_intent());
    for outcome in gateway.flush(&mut store) {
        outcome.result?;
    }
    let state = if row.is_checked { "unchecked" } else { "checked" };
    println!("Task {id} {state}.");
    Ok(())
}

pub fn cmd_remove(config: &Config, id: TaskId) -> Result<(), AppError> {
    let session = Accounts::new(config.data_dir()).current_session()?;
    call_once(config, &session, Method::Remove { id })?;
    println!("Task {id} removed.");
    Ok(())
}

/// Prints the task list, newest first.
pub fn cmd_list(config: &Config, hide_completed: bool) -> Result<(), AppError> {
    let session = Accounts::new(config.data_dir()).current_session()?;
    let Some(user) = &session.user else {
        println!("Not logged in. Run `todolist login <username>` first.");
        return Ok(());
    };
    let view = load_view(config, &session, hide_completed)?;

    println!("📝️ To Do List{}", pending_title(view.pending_count));
    println!("{}", user.display_name());
    if view.tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Done").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Created").add_attribute(Attribute::Bold),
        ]);

    for task in &view.tasks {
        let row = TaskRow::from(task);
        let color = if row.is_checked { Color::Grey } else { Color::Reset };
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(row.checkbox).fg(if row.is_checked { Color::Green } else { Color::Yellow }),
            Cell::new(&row.text).fg(color),
            Cell::new(task.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }

    println!("{table}");
    Ok(())
}
