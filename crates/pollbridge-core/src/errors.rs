use pollbridge_core_types::RequestId;
use thiserror::Error;

/// Result type alias using BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// raised by the bridge and the layers built on it. Each kind maps to a
/// stable error code usable by callers, tests and HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Transport/Decode
    InvalidInput,
    MalformedBatch,
    Serialization,

    // Correlated call
    Timeout,
    RemoteExecution,
    QueueFull,
    ChannelClosed,

    // Collaborators
    ExternalService,
    Unauthorised,

    // Process
    Config,
    Io,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MalformedBatch => "ERR_MALFORMED_BATCH",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::RemoteExecution => "ERR_REMOTE_EXECUTION",
            ExErrorKind::QueueFull => "ERR_QUEUE_FULL",
            ExErrorKind::ChannelClosed => "ERR_CHANNEL_CLOSED",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Unauthorised => "ERR_UNAUTHORISED",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    command_type: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            command_type: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add command type context
    pub fn with_command_type(mut self, command_type: impl Into<String>) -> Self {
        self.command_type = Some(command_type.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the command type, if any
    pub fn command_type(&self) -> Option<&str> {
        self.command_type.as_deref()
    }

    /// Get the request ID, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(command_type) = &self.command_type {
            write!(f, " (command_type: {})", command_type)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for bridge operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// No reply arrived before the caller's deadline
    #[error("Timed out after {timeout_ms}ms waiting for a '{command_type}' reply")]
    Timeout {
        command_type: String,
        timeout_ms: u64,
    },

    /// The remote host replied with an explicit failure
    #[error("Remote execution of '{command_type}' failed: {message}")]
    RemoteExecution {
        command_type: String,
        message: String,
    },

    /// The outbound queue stayed full for the whole enqueue grace period
    #[error("Outbound queue full, '{command_type}' command not admitted")]
    QueueFull { command_type: String },

    /// The request body could not be serialized into a command
    #[error("Failed to encode '{command_type}' request: {message}")]
    Encode {
        command_type: String,
        message: String,
    },

    /// A reply result did not fit the caller's response shape
    #[error("Failed to decode '{command_type}' reply: {message}")]
    Decode {
        command_type: String,
        message: String,
    },

    /// An inbound reply batch could not be parsed
    #[error("Malformed reply batch: {message}")]
    MalformedBatch { message: String },

    /// A bridge channel was closed underneath a live call
    #[error("Bridge channel closed while handling '{command_type}'")]
    ChannelClosed { command_type: String },

    /// Invalid bridge configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl BridgeError {
    /// True when the call gave up waiting; the command may still run remotely
    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::Timeout { .. })
    }

    /// True when the host executed the command and reported failure
    pub fn is_remote(&self) -> bool {
        matches!(self, BridgeError::RemoteExecution { .. })
    }

    /// Get the kind this error maps to in the structured facility
    pub fn kind(&self) -> ExErrorKind {
        match self {
            BridgeError::Timeout { .. } => ExErrorKind::Timeout,
            BridgeError::RemoteExecution { .. } => ExErrorKind::RemoteExecution,
            BridgeError::QueueFull { .. } => ExErrorKind::QueueFull,
            BridgeError::Encode { .. } | BridgeError::Decode { .. } => ExErrorKind::Serialization,
            BridgeError::MalformedBatch { .. } => ExErrorKind::MalformedBatch,
            BridgeError::ChannelClosed { .. } => ExErrorKind::ChannelClosed,
            BridgeError::Config { .. } => ExErrorKind::Config,
        }
    }
}

/// Conversion from BridgeError to ExError
impl From<BridgeError> for ExError {
    fn from(err: BridgeError) -> Self {
        let kind = err.kind();
        match err {
            BridgeError::Timeout {
                command_type,
                timeout_ms,
            } => ExError::new(kind)
                .with_op("execute_command")
                .with_command_type(command_type)
                .with_message(format!("No reply within {}ms", timeout_ms)),

            // The remote message is surfaced verbatim so callers can show it
            BridgeError::RemoteExecution {
                command_type,
                message,
            } => ExError::new(kind)
                .with_op("execute_command")
                .with_command_type(command_type)
                .with_message(message),

            BridgeError::QueueFull { command_type } => ExError::new(kind)
                .with_op("enqueue")
                .with_command_type(command_type)
                .with_message("Outbound queue full"),

            BridgeError::Encode {
                command_type,
                message,
            } => ExError::new(kind)
                .with_op("encode_request")
                .with_command_type(command_type)
                .with_message(message),

            BridgeError::Decode {
                command_type,
                message,
            } => ExError::new(kind)
                .with_op("decode_reply")
                .with_command_type(command_type)
                .with_message(message),

            BridgeError::MalformedBatch { message } => ExError::new(kind)
                .with_op("submit")
                .with_message(message),

            BridgeError::ChannelClosed { command_type } => ExError::new(kind)
                .with_command_type(command_type)
                .with_message("Bridge channel closed"),

            BridgeError::Config { message } => ExError::new(kind).with_message(message),
        }
    }
}

impl From<&BridgeError> for ExError {
    fn from(err: &BridgeError) -> Self {
        err.clone().into()
    }
}
