//! HTTP surface of the dashboard: the homepage, static assets and the stats API.

#[macro_use]
extern crate tracing;

pub mod api;
pub mod error;
pub mod home;
pub mod router;
mod server;

pub use error::AppError;
pub use router::{
    create_app,
    create_router,
    AppState,
};
pub use server::serve;
