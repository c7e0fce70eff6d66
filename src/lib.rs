// src/lib.rs

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod llm;
pub mod models;
pub mod navigation;
pub mod pages;
pub mod settings;
pub mod state;
pub mod store;
