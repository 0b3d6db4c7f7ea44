//! Storyloom - Generation orchestration for long-form fiction
//!
//! This crate drives a project from an idea to a chapter-ready outline
//! through a staged pipeline, routing each stage to a writing skill and
//! passing every model call through a cached, quality-gated thinking engine.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
