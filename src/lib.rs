pub mod api;
pub mod booking;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod error;
pub mod util;
