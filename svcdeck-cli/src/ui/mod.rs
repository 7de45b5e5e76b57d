pub mod app;
pub mod dashboard;
pub mod theme;
