pub mod api;
pub mod assistant;
pub mod booking;
pub mod catalog;
pub mod cli;
pub mod controller;
pub mod core;
pub mod session;
pub mod store;
pub mod web;
