//! Error types for the Pregel engine
//!
//! Every failure mode of a run surfaces as a [`PregelError`]. Reaching
//! `max_iterations` without converging is not an error; see
//! [`PregelResult::did_converge`](super::runtime::PregelResult::did_converge).

use thiserror::Error;

/// Errors that can occur while configuring or running a Pregel computation
#[derive(Debug, Error)]
pub enum PregelError {
    /// Invalid run configuration, reported before any superstep runs
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The vertex program returned an error for a node
    #[error("Vertex error in node {node_id}: {message}")]
    VertexError {
        node_id: usize,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The vertex program panicked inside a batch task
    #[error("Vertex program panicked: {message}")]
    VertexPanic { message: String },

    /// A batch task could not be executed by the worker pool
    #[error("Batch task failed: {0}")]
    TaskFailed(String),

    /// Run aborted between supersteps by a cancellation request
    #[error("Run cancelled after superstep {superstep}")]
    Cancelled { superstep: usize },

    /// Run exceeded its configured time budget
    #[error("Run timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// The blocking entry point could not start its runtime
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl PregelError {
    /// Create a vertex error with a message
    pub fn vertex_error(node_id: usize, message: impl Into<String>) -> Self {
        Self::VertexError {
            node_id,
            message: message.into(),
            source: None,
        }
    }

    /// Create a vertex error with source
    pub fn vertex_error_with_source(
        node_id: usize,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::VertexError {
            node_id,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a config error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create an error from a failed batch task join
    pub(crate) fn from_join_error(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            let payload = err.into_panic();
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "non-string panic payload".to_string()
            };
            Self::VertexPanic { message }
        } else {
            Self::TaskFailed(err.to_string())
        }
    }

    /// Check if the error was raised by the vertex program itself
    pub fn is_vertex_fault(&self) -> bool {
        matches!(
            self,
            PregelError::VertexError { .. } | PregelError::VertexPanic { .. }
        )
    }

    /// Check if the run was stopped from outside (cancellation or timeout)
    pub fn is_aborted(&self) -> bool {
        matches!(self, PregelError::Cancelled { .. } | PregelError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    // Ensure errors are Send + Sync (compile-time check)
    static_assertions::assert_impl_all!(super::PregelError: Send, Sync);
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = PregelError::config_error("batch_size must be at least 1");
        assert_eq!(
            format!("{}", err),
            "Configuration error: batch_size must be at least 1"
        );

        let err = PregelError::Cancelled { superstep: 3 };
        assert_eq!(format!("{}", err), "Run cancelled after superstep 3");
    }

    #[test]
    fn test_vertex_error() {
        let err = PregelError::vertex_error(7, "negative rank");
        match err {
            PregelError::VertexError {
                node_id,
                message,
                source,
            } => {
                assert_eq!(node_id, 7);
                assert_eq!(message, "negative rank");
                assert!(source.is_none());
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_vertex_error_with_source() {
        let err = PregelError::vertex_error_with_source(
            2,
            "lookup failed",
            std::io::Error::other("backing store gone"),
        );
        assert!(format!("{}", err).contains("node 2"));
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("backing store gone".to_string())
        );
    }

    #[test]
    fn test_classification() {
        assert!(PregelError::vertex_error(0, "x").is_vertex_fault());
        assert!(PregelError::VertexPanic {
            message: "boom".into()
        }
        .is_vertex_fault());
        assert!(!PregelError::config_error("x").is_vertex_fault());

        assert!(PregelError::Cancelled { superstep: 1 }.is_aborted());
        assert!(PregelError::Timeout(std::time::Duration::from_secs(1)).is_aborted());
        assert!(!PregelError::TaskFailed("x".into()).is_aborted());
    }

    #[tokio::test]
    async fn test_join_error_panic_message() {
        let handle = tokio::task::spawn_blocking(|| panic!("vertex 3 exploded"));
        let err = PregelError::from_join_error(handle.await.unwrap_err());
        match err {
            PregelError::VertexPanic { message } => assert_eq!(message, "vertex 3 exploded"),
            other => panic!("Wrong error type: {other:?}"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let err: PregelError = std::io::Error::other("no threads").into();
        assert!(matches!(err, PregelError::Runtime(_)));
    }
}
