pub mod clicks;
pub mod clock;
pub mod config;
pub mod config_validator;
pub mod error;
pub mod events;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod registry;
pub mod response;
pub mod server;
pub mod service;
pub mod shortcode;
pub mod stats;
pub mod telemetry;
pub mod validation;

pub use config::Config;
pub use error::{ShortenerError, ShortenerResult};
pub use model::{ClickEvent, ClickInfo, CreatedLink, UrlRecord};
pub use registry::Registry;
pub use server::create_app;
pub use service::UrlShortener;
pub use stats::Statistics;
