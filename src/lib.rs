//! Vetrina: a server-side-rendering server for a personal portfolio site.
//!
//! Every GET path funnels through one render pipeline: load the HTML shell,
//! render the portfolio markup for the request's URL and language, collect
//! the stylesheets for the current build, and splice everything into a single
//! document. The same pipeline backs the interactive development server, the
//! static production server, and the single-shot `render` invocation used on
//! serverless hosts.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
