pub mod signals;
pub mod ui;
