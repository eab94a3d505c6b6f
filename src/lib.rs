//! Test panel server library.
//!
//! Tracks manual test reports per client version, decides which tests each
//! version shows through templates, and exports or imports the database as
//! a SQL script.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
