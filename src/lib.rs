//! dqai: client for an AI data quality scoring service.
//!
//! Uploads CSV datasets to the analysis backend under a governance profile,
//! presents the returned score, dimensions, insights and recommendations,
//! and offers fix suggestions plus a free-form assistant chat. The same
//! [`session::Dashboard`] state machine drives both the CLI and the embedded
//! web dashboard.

pub mod analytics;
pub mod backend;
pub mod chat;
pub mod cli;
pub mod config;
pub mod loading;
pub mod presentation;
pub mod profile;
pub mod recommendations;
pub mod session;
pub mod upload;
pub mod web;
