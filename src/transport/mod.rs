// ABOUTME: Transport-level types shared by every git transport.
// ABOUTME: Endpoints describe where a command runs, auth methods describe who runs it.

mod auth;
mod endpoint;

pub use auth::{AuthMethod, BasicAuth};
pub use endpoint::{Endpoint, EndpointError};
