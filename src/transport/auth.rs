// ABOUTME: Transport-level authentication abstraction.
// ABOUTME: Concrete transports downcast an AuthMethod to the capability set they need.

use std::fmt;
use std::sync::Arc;

/// A credential a caller hands to a transport.
///
/// Each transport only understands some credentials. The SSH transport asks
/// for its capability set through [`AuthMethod::as_ssh`] and rejects anything
/// that does not provide one.
pub trait AuthMethod: fmt::Display + fmt::Debug + Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// The SSH capability set of this credential, if it has one.
    fn as_ssh(self: Arc<Self>) -> Option<Arc<dyn crate::ssh::AuthMethod>> {
        None
    }
}

/// HTTP basic authentication.
///
/// Has no SSH capability set, so the SSH transport refuses it.
#[derive(Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}:<redacted>", self.name(), self.username)
    }
}

impl AuthMethod for BasicAuth {
    fn name(&self) -> &str {
        "http-basic-auth"
    }
}
