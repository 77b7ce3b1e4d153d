//! Presentation layer: view models and their templates.

pub mod views;
