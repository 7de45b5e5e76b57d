pub mod backend;
pub mod clock;
pub mod config;
pub mod counter;
pub mod filter;
pub mod logview;
pub mod model;
pub mod notice;
pub mod reducer;
pub mod state;
pub mod store;

// Table view model (rows + per-row control handlers)
pub mod view;
