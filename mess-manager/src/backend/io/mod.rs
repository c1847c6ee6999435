//! # IO Module
//!
//! The outer edge of the backend: signing in, keeping the dashboard in sync
//! with the store, and turning errors into banners.

pub mod auth;
pub mod banner;
pub mod live_session;

pub use auth::{bootstrap_auth, AuthProvider, AuthState, LocalAuthProvider};
pub use banner::{describe_error, Banner, BannerKind};
pub use live_session::{LiveSession, LiveView};
