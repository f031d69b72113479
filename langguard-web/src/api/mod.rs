//! HTTP API handlers for langguard-web

pub mod download;
pub mod health;
pub mod languages;
pub mod results;
pub mod sse;
pub mod translate;
pub mod ui;

pub use download::download_routes;
pub use health::health_routes;
pub use languages::language_routes;
pub use results::result_routes;
pub use sse::event_stream;
pub use translate::translate_routes;
pub use ui::ui_routes;
