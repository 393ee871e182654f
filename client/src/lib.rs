pub mod analytics;
pub mod config;
pub mod geolocate;
pub mod map_surface;
pub mod navigate;
pub mod notify;
pub mod poll_gate;
pub mod renderer;
pub mod services;
pub mod state;
pub mod summary;
pub mod ui;
