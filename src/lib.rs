//! Song search: load a song table, show headline metrics, filter by artist,
//! track, year range and genre, and export the matches as CSV.

pub mod app;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
