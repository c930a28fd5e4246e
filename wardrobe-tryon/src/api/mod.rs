//! HTTP API handlers for wardrobe-tryon

pub mod health;
pub mod model;
pub mod session;
pub mod tryon;
pub mod upload;

pub use health::health_routes;
pub use model::model_routes;
pub use session::MaybeSession;
pub use tryon::tryon_routes;
pub use upload::upload_routes;
