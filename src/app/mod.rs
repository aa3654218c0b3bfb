pub mod events;
pub mod handler;
pub mod state;
pub mod tasks;
pub mod views;
