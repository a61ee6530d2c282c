//! Proposer MCP (Model Context Protocol) Server
//!
//! Exposes the client book, the proposal pipeline and the sales playbook as MCP
//! tools over stdio.
//!
//! ## Architecture
//!
//! - `ProposerMcpServer`: rmcp handler, one thin wrapper per tool
//! - `SalesDesk`: the tool logic over the record-store repositories, callable
//!   without a transport

mod server;
mod tools;

pub use server::ProposerMcpServer;
pub use tools::*;

use proposer_core::errors::{ApplicationError, DomainError, InterfaceError};
use proposer_db::RepositoryError;
use rmcp::ErrorData;
use serde_json::json;
use thiserror::Error;

/// Errors specific to MCP server operations
#[derive(Error, Debug)]
pub enum McpError {
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl From<DomainError> for McpError {
    fn from(error: DomainError) -> Self {
        Self::Application(ApplicationError::Domain(error))
    }
}

impl McpError {
    /// Stable kind for logs; domain errors keep their own kind.
    pub fn kind(&self) -> &'static str {
        match self {
            McpError::Database(_) => "persistence",
            McpError::Application(ApplicationError::Domain(error)) => error.kind(),
            McpError::Application(ApplicationError::Persistence(_)) => "persistence",
            McpError::Application(ApplicationError::Rendering(_)) => "rendering",
            McpError::Application(ApplicationError::Configuration(_)) => "configuration",
        }
    }

    /// Maps onto a JSON-RPC error. Input problems become invalid-params errors that
    /// carry the error kind; everything else is reported with a user-safe message.
    pub fn into_error_data(self, correlation_id: &str) -> ErrorData {
        let application = match self {
            McpError::Database(error) => ApplicationError::Persistence(error.to_string()),
            McpError::Application(error) => error,
        };

        match application.into_interface(correlation_id) {
            InterfaceError::BadRequest { kind, message, correlation_id } => ErrorData::invalid_params(
                message,
                Some(json!({ "kind": kind, "correlation_id": correlation_id })),
            ),
            other => ErrorData::internal_error(
                other.user_message(),
                Some(json!({ "correlation_id": other.correlation_id() })),
            ),
        }
    }
}

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use proposer_core::errors::{ApplicationError, DomainError};
    use rmcp::model::ErrorCode;
    use rust_decimal::Decimal;

    use super::McpError;

    #[test]
    fn domain_errors_become_invalid_params_with_kind() {
        let error = McpError::from(DomainError::InvalidDiscount(Decimal::from(80)));
        assert_eq!(error.kind(), "invalid_discount");

        let data = error.into_error_data("corr-1");
        assert_eq!(data.code, ErrorCode::INVALID_PARAMS);
        let extra = data.data.expect("error data");
        assert_eq!(extra["kind"], "invalid_discount");
        assert_eq!(extra["correlation_id"], "corr-1");
    }

    #[test]
    fn internal_failures_hide_details() {
        let error = McpError::from(ApplicationError::Rendering("template exploded".to_string()));
        let data = error.into_error_data("corr-2");

        assert_eq!(data.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(data.message, "An unexpected internal error occurred.");
    }
}
