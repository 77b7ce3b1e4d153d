//! HTTP boundary: the request dispatcher and its middleware.

mod middleware;
mod public;

pub use public::{HttpState, build_router};
