//! Composition root: builds the stores, backend, coordinator and surface for
//! one graph view from [`Settings`] and routes surface requests between them.

mod controller;
mod settings;

pub use controller::GraphController;
pub use settings::Settings;
