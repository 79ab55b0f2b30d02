//! Built-in pipeline stages.
//!
//! Each stage lives in its own module and implements the
//! [`Stage`](crate::stage::Stage) trait. The canonical ordering is
//! documented on [`Pipeline`](crate::pipeline::Pipeline).

pub mod access_gate;
pub mod cors;
pub mod locale;
pub mod route_guard;
pub mod security;
pub mod session;
pub mod static_assets;

pub use access_gate::AccessGateStage;
pub use cors::CorsPreflightStage;
pub use locale::LocaleStage;
pub use route_guard::RouteGuardStage;
pub use security::ApiSecurityStage;
pub use session::SessionStage;
pub use static_assets::StaticAssetStage;
