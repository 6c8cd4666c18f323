pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod utils;

pub use routes::make_app;
pub use utils::{config::Config, state::AppState};
