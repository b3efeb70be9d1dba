// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Error taxonomy for the data channel.
//!
//! Every failure of the channel, its encoders and its transports is a
//! [`ChannelError`]. Errors are returned synchronously from the call that
//! detected them and carry the integer status code of the operation table
//! through [`ChannelError::status`].

use std::fmt;

/// Input argument that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argument {
    /// Header metadata file path
    HeaderPath,
    /// Chunk base path
    BasePath,
    /// Maximum number of epochs per chunk
    MaxEpochs,
    /// Width of the numeric chunk suffix
    SuffixWidth,
    /// Socket host name
    Host,
    /// Socket port
    Port,
    /// Record identifier
    Identifier,
    /// Expectation values of an l-record
    Expectations,
    /// Covariance block of an l-record
    Covariance,
    /// Parameter/observation/instrument identifier lists of an o-record
    IdentifierLists,
    /// Record buffer capacity
    BufferCapacity,
}

impl Argument {
    /// Status code reported for a rejected argument.
    pub fn status(&self) -> i32 {
        match self {
            Argument::HeaderPath => 2,
            Argument::BasePath => 3,
            Argument::MaxEpochs => 4,
            Argument::SuffixWidth => 5,
            Argument::Host => 2,
            Argument::Port => 3,
            Argument::Identifier => 4,
            Argument::Expectations => 5,
            Argument::Covariance => 8,
            Argument::IdentifierLists => 7,
            Argument::BufferCapacity => 9,
        }
    }

    /// Argument name as used in messages and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Argument::HeaderPath => "header_path",
            Argument::BasePath => "base_path",
            Argument::MaxEpochs => "max_epochs_per_chunk",
            Argument::SuffixWidth => "suffix_width",
            Argument::Host => "host",
            Argument::Port => "port",
            Argument::Identifier => "identifier",
            Argument::Expectations => "expectations",
            Argument::Covariance => "covariance",
            Argument::IdentifierLists => "identifier_lists",
            Argument::BufferCapacity => "buffer_capacity",
        }
    }
}

/// Point in the transport lifecycle where an I/O failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoStage {
    /// Writing the header metadata file
    Header,
    /// Opening the first chunk of a channel
    ChunkOpen,
    /// Closing the current chunk ahead of a rotation
    ChunkRotate,
    /// Opening the chunk that follows a rotation
    NextChunkOpen,
    /// Flushing buffered records to the chunk file
    Write,
    /// Closing the active chunk
    ChunkClose,
    /// Connecting, accepting or streaming over a socket
    Connection,
    /// Reading a chunk file back
    Read,
}

impl IoStage {
    /// Stage name as used in messages and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            IoStage::Header => "header",
            IoStage::ChunkOpen => "chunk_open",
            IoStage::ChunkRotate => "chunk_rotate",
            IoStage::NextChunkOpen => "next_chunk_open",
            IoStage::Write => "write",
            IoStage::ChunkClose => "chunk_close",
            IoStage::Connection => "connection",
            IoStage::Read => "read",
        }
    }
}

/// Broad class of a [`ChannelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Channel configured twice, or used before being configured
    Configuration,
    /// Malformed input
    InvalidArgument,
    /// o-record violates the epoch ordering rule
    Ordering,
    /// Disk or connection failure
    Io,
    /// Chunk suffix space exhausted
    ResourceExhaustion,
    /// Record type structurally excluded by the channel kind
    Unsupported,
}

/// Errors reported by the data channel and its transports.
#[derive(Debug, Clone)]
pub enum ChannelError {
    /// `set_*_channel` called on an already configured channel
    AlreadyConfigured,

    /// `open` called before any configuration
    NotConfigured,

    /// `open` called on a channel that was already opened
    AlreadyOpen,

    /// Record written to a channel that is not open
    NotOpen,

    /// Argument rejected by validation
    InvalidArgument {
        /// Offending argument
        argument: Argument,
        /// Why it was rejected
        reason: String,
    },

    /// Active o-record out of order within its epoch
    Ordering {
        /// Description of the violated rule
        reason: String,
    },

    /// Record type not accepted by this channel kind
    Unsupported {
        /// Record type name
        record: String,
        /// Channel kind that refused it
        channel: String,
    },

    /// Disk or connection failure
    Io {
        /// Where the failure happened
        stage: IoStage,
        /// Underlying error message
        message: String,
    },

    /// No chunk suffix left for the base name
    Exhausted {
        /// Base path of the chunk sequence
        base: String,
        /// Largest index the suffix width can hold
        limit: u64,
    },

    /// Malformed chunk or header content
    Corrupt {
        /// What was being decoded
        context: String,
        /// Error message
        message: String,
    },
}

impl ChannelError {
    /// Create an invalid argument error.
    pub fn invalid(argument: Argument, reason: impl Into<String>) -> Self {
        ChannelError::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    /// Create an ordering error.
    pub fn ordering(reason: impl Into<String>) -> Self {
        ChannelError::Ordering {
            reason: reason.into(),
        }
    }

    /// Create an unsupported record error.
    pub fn unsupported(record: impl Into<String>, channel: impl Into<String>) -> Self {
        ChannelError::Unsupported {
            record: record.into(),
            channel: channel.into(),
        }
    }

    /// Create an I/O error for the given stage.
    pub fn io(stage: IoStage, message: impl Into<String>) -> Self {
        ChannelError::Io {
            stage,
            message: message.into(),
        }
    }

    /// Create an exhaustion error.
    pub fn exhausted(base: impl Into<String>, limit: u64) -> Self {
        ChannelError::Exhausted {
            base: base.into(),
            limit,
        }
    }

    /// Create a corrupt data error.
    pub fn corrupt(context: impl Into<String>, message: impl Into<String>) -> Self {
        ChannelError::Corrupt {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Re-tag an I/O error with a different lifecycle stage.
    ///
    /// Non-I/O errors are returned unchanged.
    pub fn at_stage(self, stage: IoStage) -> Self {
        match self {
            ChannelError::Io { message, .. } => ChannelError::Io { stage, message },
            other => other,
        }
    }

    /// Integer status code of this error.
    pub fn status(&self) -> i32 {
        match self {
            ChannelError::AlreadyConfigured
            | ChannelError::AlreadyOpen
            | ChannelError::NotOpen => 1,
            ChannelError::NotConfigured => 4,
            ChannelError::InvalidArgument { argument, .. } => argument.status(),
            ChannelError::Ordering { .. } | ChannelError::Unsupported { .. } => 3,
            ChannelError::Io {
                stage: IoStage::NextChunkOpen,
                ..
            } => 7,
            ChannelError::Io { .. } => 2,
            ChannelError::Exhausted { .. } => 6,
            ChannelError::Corrupt { .. } => 10,
        }
    }

    /// Broad class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChannelError::AlreadyConfigured
            | ChannelError::NotConfigured
            | ChannelError::AlreadyOpen
            | ChannelError::NotOpen => ErrorKind::Configuration,
            ChannelError::InvalidArgument { .. } | ChannelError::Corrupt { .. } => {
                ErrorKind::InvalidArgument
            }
            ChannelError::Ordering { .. } => ErrorKind::Ordering,
            ChannelError::Unsupported { .. } => ErrorKind::Unsupported,
            ChannelError::Io { .. } => ErrorKind::Io,
            ChannelError::Exhausted { .. } => ErrorKind::ResourceExhaustion,
        }
    }

    /// Whether the channel must be treated as unusable after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Io | ErrorKind::ResourceExhaustion
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("status", self.status().to_string())];
        match self {
            ChannelError::AlreadyConfigured
            | ChannelError::NotConfigured
            | ChannelError::AlreadyOpen
            | ChannelError::NotOpen => {}
            ChannelError::InvalidArgument { argument, reason } => {
                fields.push(("argument", argument.as_str().to_string()));
                fields.push(("reason", reason.clone()));
            }
            ChannelError::Ordering { reason } => fields.push(("reason", reason.clone())),
            ChannelError::Unsupported { record, channel } => {
                fields.push(("record", record.clone()));
                fields.push(("channel", channel.clone()));
            }
            ChannelError::Io { stage, message } => {
                fields.push(("stage", stage.as_str().to_string()));
                fields.push(("message", message.clone()));
            }
            ChannelError::Exhausted { base, limit } => {
                fields.push(("base", base.clone()));
                fields.push(("limit", limit.to_string()));
            }
            ChannelError::Corrupt { context, message } => {
                fields.push(("context", context.clone()));
                fields.push(("message", message.clone()));
            }
        }
        fields
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::AlreadyConfigured => write!(f, "Data channel is already configured"),
            ChannelError::NotConfigured => write!(f, "Data channel is not configured"),
            ChannelError::AlreadyOpen => write!(f, "Data channel is already open"),
            ChannelError::NotOpen => write!(f, "Data channel is not open"),
            ChannelError::InvalidArgument { argument, reason } => {
                write!(f, "Invalid argument '{}': {reason}", argument.as_str())
            }
            ChannelError::Ordering { reason } => write!(f, "Record ordering violation: {reason}"),
            ChannelError::Unsupported { record, channel } => {
                write!(
                    f,
                    "Unsupported record: {record} records are not accepted by {channel} channels"
                )
            }
            ChannelError::Io { stage, message } => {
                write!(f, "I/O error during {}: {message}", stage.as_str())
            }
            ChannelError::Exhausted { base, limit } => write!(
                f,
                "Chunk names exhausted for '{base}': no index left after {limit}"
            ),
            ChannelError::Corrupt { context, message } => {
                write!(f, "Corrupt {context}: {message}")
            }
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        ChannelError::Io {
            stage: IoStage::Write,
            message: err.to_string(),
        }
    }
}

/// Result type for data channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_statuses() {
        assert_eq!(ChannelError::AlreadyConfigured.status(), 1);
        assert_eq!(ChannelError::AlreadyOpen.status(), 1);
        assert_eq!(ChannelError::NotOpen.status(), 1);
        assert_eq!(ChannelError::NotConfigured.status(), 4);
    }

    #[test]
    fn test_file_configuration_statuses() {
        assert_eq!(ChannelError::invalid(Argument::HeaderPath, "").status(), 2);
        assert_eq!(ChannelError::invalid(Argument::BasePath, "").status(), 3);
        assert_eq!(ChannelError::invalid(Argument::MaxEpochs, "").status(), 4);
        assert_eq!(ChannelError::invalid(Argument::SuffixWidth, "").status(), 5);
    }

    #[test]
    fn test_socket_configuration_statuses() {
        assert_eq!(ChannelError::invalid(Argument::Host, "").status(), 2);
        assert_eq!(ChannelError::invalid(Argument::Port, "").status(), 3);
    }

    #[test]
    fn test_write_statuses() {
        assert_eq!(ChannelError::io(IoStage::ChunkRotate, "x").status(), 2);
        assert_eq!(ChannelError::exhausted("obs", 9).status(), 6);
        assert_eq!(ChannelError::io(IoStage::NextChunkOpen, "x").status(), 7);
        assert_eq!(ChannelError::ordering("x").status(), 3);
        assert_eq!(ChannelError::unsupported("o", "parameter").status(), 3);
        assert_eq!(ChannelError::invalid(Argument::Identifier, "").status(), 4);
        assert_eq!(
            ChannelError::invalid(Argument::IdentifierLists, "").status(),
            7
        );
        assert_eq!(ChannelError::io(IoStage::Write, "x").status(), 2);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            ChannelError::AlreadyConfigured.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(ChannelError::ordering("x").kind(), ErrorKind::Ordering);
        assert_eq!(
            ChannelError::exhausted("b", 9).kind(),
            ErrorKind::ResourceExhaustion
        );
        assert!(ChannelError::io(IoStage::Header, "x").is_fatal());
        assert!(!ChannelError::NotOpen.is_fatal());
    }

    #[test]
    fn test_at_stage_retags_io_only() {
        let err = ChannelError::io(IoStage::Write, "disk full").at_stage(IoStage::NextChunkOpen);
        assert!(matches!(
            err,
            ChannelError::Io {
                stage: IoStage::NextChunkOpen,
                ..
            }
        ));
        assert_eq!(err.status(), 7);

        let err = ChannelError::NotOpen.at_stage(IoStage::Header);
        assert!(matches!(err, ChannelError::NotOpen));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ChannelError::invalid(Argument::Port, "must be in 1..=65535").to_string(),
            "Invalid argument 'port': must be in 1..=65535"
        );
        assert_eq!(
            ChannelError::exhausted("obs", 9).to_string(),
            "Chunk names exhausted for 'obs': no index left after 9"
        );
        assert_eq!(
            ChannelError::io(IoStage::Header, "denied").to_string(),
            "I/O error during header: denied"
        );
    }

    #[test]
    fn test_log_fields() {
        let fields = ChannelError::io(IoStage::ChunkClose, "boom").log_fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], ("status", "2".to_string()));
        assert_eq!(fields[1], ("stage", "chunk_close".to_string()));
        assert_eq!(fields[2], ("message", "boom".to_string()));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ChannelError = io_err.into();
        assert!(matches!(
            err,
            ChannelError::Io {
                stage: IoStage::Write,
                ..
            }
        ));
        assert_eq!(err.to_string(), "I/O error during write: file not found");
    }
}
