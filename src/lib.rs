//! # todolist
//!
//! A login-gated to-do list for the terminal. Tasks belong to exactly one
//! user; the list view shows that user's tasks newest first, can hide
//! completed ones, and carries a badge with the number of pending tasks.
//!
//! The view never touches the data directly. It derives what it shows from a
//! reactive [`store::TaskStore`] through [`query::TaskListQuery`], and sends
//! row intents to the store as named method calls through
//! [`mutations::MutationGateway`]. Changes come back as store notifications
//! that trigger a re-derivation.

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod mutations;
pub mod query;
pub mod row;
pub mod storage;
pub mod store;
pub mod tui;
