//! HTTP server: builder, shared state, routes and handlers

pub mod builder;
pub mod context;
pub mod handlers;
pub mod router;
pub mod state;
pub mod templates;

pub use builder::ServerBuilder;
pub use router::build_routes;
pub use state::AppState;
