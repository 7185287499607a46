// ABOUTME: Remote endpoint description for git transports.
// ABOUTME: Parses "ssh://[user@]host[:port]/path" and scp-like "[user@]host:path".

use std::fmt;
use thiserror::Error;

/// URL schemes that select the SSH transport.
const SSH_SCHEMES: [&str; 3] = ["ssh", "git+ssh", "ssh+git"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("endpoint cannot be empty")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("hostname cannot be empty")]
    EmptyHost,

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("repository path cannot be empty")]
    EmptyPath,

    #[error("invalid repository path: {0}")]
    InvalidPath(String),

    #[error("not an ssh endpoint: {0}")]
    NotSsh(String),
}

/// Where a remote command runs and on which repository path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: Option<u16>,
    user: Option<String>,
    path: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            user: None,
            path: path.into(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port as given; `None` lets the transport pick its default.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parse an SSH URL or an scp-like address.
    pub fn parse(s: &str) -> Result<Self, EndpointError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EndpointError::Empty);
        }

        match s.split_once("://") {
            Some((scheme, rest)) => {
                if !SSH_SCHEMES.contains(&scheme) {
                    return Err(EndpointError::UnsupportedScheme(scheme.to_string()));
                }
                Self::parse_url(rest)
            }
            None => Self::parse_scp_like(s),
        }
    }

    fn parse_url(rest: &str) -> Result<Self, EndpointError> {
        let (authority, path) = match rest.find('/') {
            Some(pos) => (&rest[..pos], &rest[pos..]),
            None => (rest, ""),
        };

        let (user, host_port) = split_user(authority);
        let (host, port) = split_host_port(host_port)?;

        if path.len() <= 1 {
            return Err(EndpointError::EmptyPath);
        }
        let path = urlencoding::decode(path)
            .map_err(|e| EndpointError::InvalidPath(e.to_string()))?
            .into_owned();

        Ok(Self {
            host,
            port,
            user,
            path,
        })
    }

    fn parse_scp_like(s: &str) -> Result<Self, EndpointError> {
        let not_ssh = || EndpointError::NotSsh(s.to_string());

        // The first colon ends the host, unless it sits inside a bracketed
        // IPv6 literal. Anything after it, '@' included, is path.
        let colon = match s.find('[') {
            Some(open) if !s[..open].contains(':') => {
                let close = s[open..].find(']').map(|i| open + i).ok_or_else(not_ssh)?;
                if !s[close + 1..].starts_with(':') {
                    return Err(not_ssh());
                }
                close + 1
            }
            _ => s.find(':').ok_or_else(not_ssh)?,
        };
        let (user_host, path) = (&s[..colon], &s[colon + 1..]);

        // "./foo:bar" and "/srv/a:b" are local paths, not remote hosts.
        if user_host.contains('/') {
            return Err(not_ssh());
        }

        let (user, host) = split_user(user_host);
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if host.is_empty() {
            return Err(EndpointError::EmptyHost);
        }
        if path.is_empty() {
            return Err(EndpointError::EmptyPath);
        }

        Ok(Self {
            host: host.to_string(),
            port: None,
            user,
            path: path.to_string(),
        })
    }
}

fn split_user(s: &str) -> (Option<String>, &str) {
    match s.find('@') {
        Some(at_pos) if at_pos > 0 => (Some(s[..at_pos].to_string()), &s[at_pos + 1..]),
        Some(at_pos) => (None, &s[at_pos + 1..]),
        None => (None, s),
    }
}

fn split_host_port(s: &str) -> Result<(String, Option<u16>), EndpointError> {
    let (host, port_str) = if let Some(stripped) = s.strip_prefix('[') {
        let close = stripped
            .find(']')
            .ok_or_else(|| EndpointError::InvalidPort(s.to_string()))?;
        let after = &stripped[close + 1..];
        let port_str = match after.strip_prefix(':') {
            Some(p) => Some(p),
            None if after.is_empty() => None,
            None => return Err(EndpointError::InvalidPort(after.to_string())),
        };
        (&stripped[..close], port_str)
    } else {
        match s.rfind(':') {
            Some(colon_pos) => (&s[..colon_pos], Some(&s[colon_pos + 1..])),
            None => (s, None),
        }
    };

    if host.is_empty() {
        return Err(EndpointError::EmptyHost);
    }

    let port = match port_str {
        Some("") | None => None,
        Some(p) => Some(
            p.parse::<u16>()
                .map_err(|_| EndpointError::InvalidPort(p.to_string()))?,
        ),
    };

    Ok((host.to_string(), port))
}

/// Renders the address back in a form `parse` accepts.
///
/// Absolute paths and endpoints with a port use the URL form, with each path
/// segment percent-encoded. Everything else uses the scp-like form verbatim.
/// A relative path combined with a port has no exact textual form and comes
/// back from `parse` as the same path with a leading `/`.
impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let user = self
            .user
            .as_deref()
            .map(|u| format!("{u}@"))
            .unwrap_or_default();

        if self.path.starts_with('/') || self.port.is_some() {
            let port = self.port.map(|p| format!(":{p}")).unwrap_or_default();
            let sep = if self.path.starts_with('/') { "" } else { "/" };
            let path = self
                .path
                .split('/')
                .map(urlencoding::encode)
                .collect::<Vec<_>>()
                .join("/");
            write!(f, "ssh://{user}{host}{port}{sep}{path}")
        } else {
            write!(f, "{user}{host}:{}", self.path)
        }
    }
}

impl std::str::FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
