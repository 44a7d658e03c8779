use std::fmt;
use std::net::IpAddr;

use poem::Request;

use super::request_id::RequestId;

/// Entry point an operation was started from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOrigin {
    Http { client_ip: Option<IpAddr> },
    Cli { command: String },
}

impl fmt::Display for RequestOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { client_ip: Some(ip) } => write!(f, "http:{}", ip),
            Self::Http { client_ip: None } => write!(f, "http"),
            Self::Cli { command } => write!(f, "cli:{}", command),
        }
    }
}

/// Per-operation context passed from the entry point into coordinators
///
/// Only used for log correlation; authorization decisions go through `Viewer`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub origin: RequestOrigin,
    /// User id once the caller is identified
    pub actor: Option<String>,
}

impl RequestContext {
    pub fn for_cli(command: &str) -> Self {
        Self {
            request_id: RequestId::new(),
            origin: RequestOrigin::Cli {
                command: command.to_string(),
            },
            actor: None,
        }
    }

    pub fn for_api(req: &Request) -> Self {
        Self {
            request_id: RequestId::new(),
            origin: RequestOrigin::Http {
                client_ip: client_ip(req),
            },
            actor: None,
        }
    }

    pub fn with_actor(mut self, user_id: &str) -> Self {
        self.actor = Some(user_id.to_string());
        self
    }

    /// Actor for log fields: the user id, or the origin when unidentified
    pub fn actor_label(&self) -> String {
        match &self.actor {
            Some(actor) => actor.clone(),
            None => self.origin.to_string(),
        }
    }
}

/// First X-Forwarded-For hop, then X-Real-IP, then the socket peer
fn client_ip(req: &Request) -> Option<IpAddr> {
    let forwarded = req
        .header("X-Forwarded-For")
        .and_then(|value| value.split(',').next())
        .or_else(|| req.header("X-Real-IP"));

    match forwarded {
        Some(value) => value.trim().parse().ok(),
        None => req.remote_addr().as_socket_addr().map(|addr| addr.ip()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_context_labels_command() {
        let ctx = RequestContext::for_cli("user_create");
        assert_eq!(ctx.actor_label(), "cli:user_create");

        let ctx = ctx.with_actor("u-1");
        assert_eq!(ctx.actor_label(), "u-1");
    }

    #[test]
    fn test_api_context_prefers_forwarded_header() {
        let req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .finish();
        let ctx = RequestContext::for_api(&req);

        assert_eq!(
            ctx.origin,
            RequestOrigin::Http {
                client_ip: Some("203.0.113.7".parse().unwrap())
            }
        );
    }

    #[test]
    fn test_request_ids_differ() {
        assert_ne!(RequestContext::for_cli("a").request_id, RequestContext::for_cli("a").request_id);
    }
}
