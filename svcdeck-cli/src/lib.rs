//! Runtime pieces behind the `svcdeck` binary: backends, the polling and
//! action jobs, and the terminal UI.

pub mod bus;
pub mod commands;
pub mod demo;
pub mod dispatcher;
pub mod http;
pub mod logging;
pub mod poller;
pub mod scope;
pub mod ticker;
pub mod ui;

#[cfg(test)]
mod testing;
