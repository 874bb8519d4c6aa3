use poem::Request;

use super::request_source::RequestSource;

/// Sentinel for provenance fields that could not be determined
pub const UNKNOWN: &str = "unknown";

/// Identity established by the upstream authentication layer.
///
/// Token validation is not this service's job; the gateway forwards the
/// resolved identity in `X-Actor-Id` / `X-Actor-Email` headers.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedIdentity {
    pub user_id: String,
    pub email: String,
}

/// Actor and provenance bundle that flows through all layers
///
/// Built once per inbound request and passed explicitly to every store and
/// service call that records audit entries. Audit writes require a real
/// actor (id + email); ip and user agent degrade to "unknown".
#[derive(Debug, Clone, PartialEq)]
pub struct AuditContext {
    /// Actor who initiated the operation; empty when unauthenticated
    pub actor_id: String,

    /// Actor's email; empty when unauthenticated
    pub actor_email: String,

    /// Client IP, first X-Forwarded-For hop preferred
    pub ip: String,

    /// Declared client agent string
    pub user_agent: String,

    /// Groups audit entries written by one multi-record operation
    pub transaction_tag: Option<String>,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,
}

impl AuditContext {
    /// Create an AuditContext for CLI operations
    pub fn for_cli(command_name: &str) -> Self {
        Self {
            actor_id: format!("cli:{}", command_name),
            actor_email: format!("cli:{}@local", command_name),
            ip: "localhost".to_string(),
            user_agent: "cli".to_string(),
            transaction_tag: None,
            source: RequestSource::CLI,
        }
    }

    /// Create an AuditContext for automated system operations
    pub fn for_system(operation_name: &str) -> Self {
        Self {
            actor_id: format!("system:{}", operation_name),
            actor_email: format!("system:{}@local", operation_name),
            ip: UNKNOWN.to_string(),
            user_agent: "system".to_string(),
            transaction_tag: None,
            source: RequestSource::System,
        }
    }

    /// Extract client IP from request headers
    ///
    /// Checks X-Forwarded-For (first hop), X-Real-IP, and falls back to the
    /// transport-level peer address.
    fn extract_ip(req: &Request) -> Option<String> {
        // Check X-Forwarded-For header (proxy/load balancer)
        if let Some(forwarded) = req.header("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }

        // Check X-Real-IP header (nginx)
        if let Some(real_ip) = req.header("X-Real-IP") {
            return Some(real_ip.trim().to_string());
        }

        // Fall back to remote address
        req.remote_addr()
            .as_socket_addr()
            .map(|addr| addr.ip().to_string())
    }

    fn extract_identity(req: &Request) -> Option<AuthenticatedIdentity> {
        let user_id = req.header("X-Actor-Id")?.trim().to_string();
        let email = req.header("X-Actor-Email")?.trim().to_string();
        if user_id.is_empty() || email.is_empty() {
            return None;
        }
        Some(AuthenticatedIdentity { user_id, email })
    }

    /// Create an AuditContext from an inbound request.
    ///
    /// Called at the beginning of every endpoint. Identity comes from the
    /// gateway headers; absent identity leaves actor fields empty, which any
    /// subsequent audit write will reject with ContextMissing.
    pub fn from_request(req: &Request) -> Self {
        let identity = Self::extract_identity(req);
        let ip = Self::extract_ip(req).unwrap_or_else(|| UNKNOWN.to_string());
        let user_agent = req
            .header("User-Agent")
            .map(|ua| ua.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let (actor_id, actor_email) = match identity {
            Some(id) => (id.user_id, id.email),
            None => (String::new(), String::new()),
        };

        let ctx = Self {
            actor_id,
            actor_email,
            ip,
            user_agent,
            transaction_tag: None,
            source: RequestSource::API,
        };
        tracing::trace!("Audit context created: {:?}", ctx);
        ctx
    }

    /// Whether this context carries a usable actor identity
    pub fn has_actor(&self) -> bool {
        !self.actor_id.is_empty() && !self.actor_email.is_empty()
    }

    /// Set the transaction tag
    pub fn with_transaction_tag(mut self, tag: impl Into<String>) -> Self {
        self.transaction_tag = Some(tag.into());
        self
    }

    /// Set the actor identity
    pub fn with_actor(mut self, actor_id: impl Into<String>, actor_email: impl Into<String>) -> Self {
        self.actor_id = actor_id.into();
        self.actor_email = actor_email.into();
        self
    }
}
