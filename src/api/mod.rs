//! Outbound HTTP layer.
//!
//! - `error`: uniform failure shape and HTTP detail extraction
//! - `gateway`: the reqwest wrapper with JWT authorization
//! - `wire`: serde mirrors of the server payloads
//! - `rest`: typed endpoint traits and their REST implementation

pub mod error;
pub mod gateway;
pub mod rest;
pub mod wire;

pub use error::ApiError;
pub use gateway::ApiGateway;
pub use rest::{AuthApi, ChatApi, RestApi};
