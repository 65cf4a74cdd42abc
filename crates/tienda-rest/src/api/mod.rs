//! Typed endpoint groups built on [`ApiClient`](crate::ApiClient).

mod auth;
mod dashboard;
mod resource;

pub use auth::AuthApi;
pub use dashboard::DashboardApi;
pub use resource::ResourceApi;
