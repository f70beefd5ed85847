use reqwest::StatusCode;
use thiserror::Error;

/// Upstream service a request was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Geocoding,
    CurrentWeather,
    ForecastPoints,
    ForecastDocument,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Geocoding => "geocoding",
            Service::CurrentWeather => "current weather",
            Service::ForecastPoints => "forecast metadata",
            Service::ForecastDocument => "forecast",
        }
    }

    /// The forecast service rejects anonymous clients.
    fn requires_user_agent(&self) -> bool {
        matches!(self, Service::ForecastPoints | Service::ForecastDocument)
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single upstream lookup.
///
/// Fetchers return this instead of a value; nothing in the lookup path panics or
/// retries. Each variant maps to one failure class so callers can tell an
/// unknown place from a broken network or a schema change upstream.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not resolve location '{location}': {reason}")]
    Unresolved { location: String, reason: String },

    #[error("{service} service unreachable: {source}")]
    Connection {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed: {source}")]
    Request {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error(
        "{service} request failed with status {status}: {body}{}",
        status_hint(.service, .status)
    )]
    Status {
        service: Service,
        status: StatusCode,
        body: String,
    },

    #[error("{service} returned a malformed response: {reason}")]
    Malformed { service: Service, reason: String },

    #[error("{service} response is missing `{field}`")]
    MissingField {
        service: Service,
        field: &'static str,
    },
}

impl FetchError {
    /// Classify a transport error from reqwest.
    pub(crate) fn transport(service: Service, source: reqwest::Error) -> Self {
        if source.is_connect() || source.is_timeout() {
            FetchError::Connection { service, source }
        } else {
            FetchError::Request { service, source }
        }
    }

    pub(crate) fn malformed(service: Service, reason: impl std::fmt::Display) -> Self {
        FetchError::Malformed {
            service,
            reason: reason.to_string(),
        }
    }

    pub fn service(&self) -> Option<Service> {
        match self {
            FetchError::Unresolved { .. } => None,
            FetchError::Connection { service, .. }
            | FetchError::Request { service, .. }
            | FetchError::Status { service, .. }
            | FetchError::Malformed { service, .. }
            | FetchError::MissingField { service, .. } => Some(*service),
        }
    }
}

fn status_hint(service: &Service, status: &StatusCode) -> &'static str {
    if *status == StatusCode::FORBIDDEN && service.requires_user_agent() {
        " (access denied: the service requires an identifying User-Agent header)"
    } else {
        ""
    }
}

/// Failure to invoke a tool by name.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: &'static str, reason: String },
}
