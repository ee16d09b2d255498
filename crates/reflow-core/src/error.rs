use thiserror::Error;

/// Errors raised by a storage collaborator
///
/// The core consumes these through the [`crate::domain::store::TableStore`]
/// trait; concrete backends map their own failure kinds onto this enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A table was created twice
    #[error("table already exists: {0}")]
    AlreadyExists(String),

    /// An append or read against a table that was never created
    #[error("table not found: {0}")]
    NotFound(String),

    /// Any other backend failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Core error type for the Reflow runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A table key or function name was registered twice
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// Table not present in the graph registry
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Function not present in the graph registry
    #[error("function not found: {0}")]
    FunctionNotFound(String),

    /// An edge references a table or function missing from the registry
    #[error("unbound edge: {0}")]
    UnboundEdge(String),

    /// Graph validation error
    #[error("validation error: {0}")]
    Validation(String),

    /// The dispatch depth budget was exhausted, which indicates a cyclic graph
    #[error("dispatch depth exceeded at function '{function}' (budget {budget})")]
    DispatchDepthExceeded {
        /// The function whose invocation would have exceeded the budget
        function: String,
        /// The configured depth budget
        budget: usize,
    },

    /// Storage collaborator error
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// An error returned by user function code
    #[error("function error: {0}")]
    Function(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}

/// Failure of a top-level dispatch
///
/// Carries the name of the function whose invocation failed, the underlying
/// error, and the names of queued downstream functions that never ran, in
/// the order they would have run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("function '{function}' failed during dispatch: {source}")]
pub struct DispatchError {
    /// The function whose invocation failed
    pub function: String,

    /// The underlying failure
    #[source]
    pub source: CoreError,

    /// Queued functions that never ran because the cascade aborted
    pub never_ran: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (
                CoreError::DuplicateName("orders".to_string()),
                "duplicate name: orders",
            ),
            (
                CoreError::TableNotFound("orders".to_string()),
                "table not found: orders",
            ),
            (
                CoreError::FunctionNotFound("enrich".to_string()),
                "function not found: enrich",
            ),
            (
                CoreError::UnboundEdge("orders -> enrich".to_string()),
                "unbound edge: orders -> enrich",
            ),
            (
                CoreError::Validation("bad".to_string()),
                "validation error: bad",
            ),
            (
                CoreError::Function("boom".to_string()),
                "function error: boom",
            ),
            (
                CoreError::Serialization("ser".to_string()),
                "serialization error: ser",
            ),
            (CoreError::Other("other".to_string()), "other"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_depth_exceeded_display() {
        let error = CoreError::DispatchDepthExceeded {
            function: "enrich".to_string(),
            budget: 64,
        };
        assert_eq!(
            error.to_string(),
            "dispatch depth exceeded at function 'enrich' (budget 64)"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let error: CoreError = StoreError::NotFound("orders".to_string()).into();
        assert_eq!(error.to_string(), "storage error: table not found: orders");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let error: CoreError = json_error.into();
        assert!(matches!(error, CoreError::Serialization(_)));
    }

    #[test]
    fn test_from_string_and_str() {
        let error: CoreError = "oops".into();
        assert_eq!(error, CoreError::Other("oops".to_string()));

        let error: CoreError = "oops".to_string().into();
        assert_eq!(error, CoreError::Other("oops".to_string()));
    }

    #[test]
    fn test_dispatch_error_display_and_source() {
        let error = DispatchError {
            function: "enrich".to_string(),
            source: CoreError::Function("boom".to_string()),
            never_ran: vec!["index".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "function 'enrich' failed during dispatch: function error: boom"
        );
        assert_eq!(error.never_ran, vec!["index".to_string()]);
    }
}
