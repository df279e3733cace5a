pub mod blueprint;
pub mod events;
pub mod media;
pub mod models;
pub mod progress;
pub mod runs;
pub mod views;
