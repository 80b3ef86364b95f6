use std::cell::Cell;
use std::rc::Rc;

use ratatui::widgets::TableState;
use tracing::{error, warn};

use crate::auth::Accounts;
use crate::error::AppError;
use crate::models::Session;
use crate::mutations::MutationGateway;
use crate::query::{pending_title, TaskListQuery, TaskListView};
use crate::row::{RowIntent, TaskRow};
use crate::store::{LocalStore, TaskStore};

#[derive(Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LoginField {
    Username,
    Password,
}

/// State of the login form.
#[derive(Debug)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub field: LoginField,
    pub error: Option<String>,
}

impl Default for LoginForm {
    fn default() -> Self {
        LoginForm { username: String::new(), password: String::new(), field: LoginField::Username, error: None }
    }
}

impl LoginForm {
    pub fn active_input(&mut self) -> &mut String {
        match self.field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn switch_field(&mut self) {
        self.field = match self.field {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }
}

/// The view root: owns the hide-completed toggle and everything the screen shows.
pub struct App {
    pub store: LocalStore,
    pub gateway: MutationGateway,
    pub accounts: Accounts,
    pub session: Session,
    pub hide_completed: bool,
    pub view: TaskListView,
    pub rows: Vec<TaskRow>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub login: LoginForm,
    /// Last problem worth showing, e.g. a rejected method call.
    pub status: Option<String>,
    query: TaskListQuery,
    dirty: Rc<Cell<bool>>,
}

impl App {
    /// Creates the app, restoring the last saved login.
    pub fn new(mut store: LocalStore, accounts: Accounts) -> Result<App, AppError> {
        let session = accounts.current_session()?;
        let dirty = Rc::new(Cell::new(true));
        let flag = dirty.clone();
        store.observe(Box::new(move |_| flag.set(true)));

        let mut app = App {
            store,
            gateway: MutationGateway::new(),
            accounts,
            session,
            hide_completed: false,
            view: TaskListView::default(),
            rows: Vec::new(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            login: LoginForm::default(),
            status: None,
            query: TaskListQuery::new(),
            dirty,
        };
        app.refresh()?;
        Ok(app)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Whether the store has changed since the list was last derived.
    pub fn needs_refresh(&self) -> bool {
        self.dirty.get()
    }

    /// `📝️ To Do List`, with the pending badge when there is something pending.
    pub fn header_title(&self) -> String {
        format!("📝️ To Do List{}", pending_title(self.view.pending_count))
    }

    pub fn filter_label(&self) -> &'static str {
        if self.hide_completed {
            "Show All"
        } else {
            "Hide Completed"
        }
    }

    /// Re-derives the visible list from the store.
    ///
    /// The dirty flag is cleared up front, so a failing derivation is retried
    /// only after the store reports another change.
    pub fn refresh(&mut self) -> Result<(), AppError> {
        self.dirty.set(false);
        self.view = self.query.derive(&mut self.store, &self.session, self.hide_completed)?;
        self.rows = self.view.tasks.iter().map(TaskRow::from).collect();

        if self.rows.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.rows.len() {
                self.state.select(Some(self.rows.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
        Ok(())
    }

    /// One turn of the event loop: apply queued calls, pull store updates, re-derive.
    pub fn tick(&mut self) {
        if let Err(e) = self.store.sync() {
            error!(error = %e, "Store sync failed");
            self.status = Some(e.to_string());
        }
        for outcome in self.gateway.flush(&mut self.store) {
            if let Err(e) = outcome.result {
                self.status = Some(format!("{} failed: {}", outcome.method, e));
            }
        }
        if self.dirty.get() {
            if let Err(e) = self.refresh() {
                error!(error = %e, "Refreshing the task list failed");
                self.status = Some(e.to_string());
            }
        }
    }

    /// Toggles the visibility of completed tasks.
    pub fn toggle_hide_completed(&mut self) {
        self.hide_completed = !self.hide_completed;
        if let Err(e) = self.refresh() {
            self.status = Some(e.to_string());
        }
    }

    pub fn selected_row(&self) -> Option<&TaskRow> {
        self.state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn dispatch(&mut self, intent: RowIntent) {
        self.status = None;
        self.gateway.dispatch(&self.session, intent);
    }

    /// Sends the toggle intent of the selected row. The row changes once the store acknowledges it.
    pub fn toggle_selected(&mut self) {
        if let Some(intent) = self.selected_row().map(TaskRow::toggle_intent) {
            self.dispatch(intent);
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(intent) = self.selected_row().map(TaskRow::delete_intent) {
            self.dispatch(intent);
        }
    }

    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.input_buffer.clear();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    pub fn submit_add(&mut self) {
        let text = std::mem::take(&mut self.input_buffer);
        self.input_mode = InputMode::Normal;
        if text.trim().is_empty() {
            return;
        }
        self.status = None;
        self.gateway.insert(&self.session, &text);
    }

    pub fn submit_login(&mut self) {
        match self.accounts.login_with_password(&self.login.username, &self.login.password) {
            Ok(session) => {
                self.session = session;
                self.login = LoginForm::default();
                self.status = None;
                if let Err(e) = self.refresh() {
                    self.status = Some(e.to_string());
                }
            }
            Err(e) => {
                self.login.password.clear();
                self.login.error = Some(e.to_string());
            }
        }
    }

    pub fn logout(&mut self) {
        match self.accounts.logout() {
            Ok(session) => self.session = session,
            Err(e) => {
                warn!(error = %e, "Could not clear the saved session");
                self.session = Session::anonymous();
            }
        }
        self.hide_completed = false;
        self.cancel_input();
        if let Err(e) = self.refresh() {
            self.status = Some(e.to_string());
        }
    }
}
