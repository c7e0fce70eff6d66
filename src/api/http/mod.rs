// src/api/http/mod.rs

pub mod chat;
pub mod commands;
pub mod handlers;
pub mod models;
pub mod navigation;
pub mod pages;
pub mod router;
pub mod settings;

pub use router::{API_VERSION, create_router, run};
