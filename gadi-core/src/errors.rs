//! # Errors
//!
//! Structured, transport-agnostic errors for GadiSewa. Goals:
//! - consistent status codes + class names
//! - can be carried through `anyhow::Error` (for the hook pipeline)
//! - safe to serialize for clients after `sanitize_for_client`
//!
//! Beyond the usual HTTP-ish kinds there are two that encode this
//! system's own failure taxonomy:
//! - `MissingTenantScope`: a tenant-scoped data operation was attempted
//!   without a garage filter. Always a programming-contract violation,
//!   never a user error.
//! - `IdentityCollision`: a uniqueness rule was violated at write time.
//!   Always recoverable by the caller.

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::Value;

/// A convenience result type for GadiSewa core APIs.
pub type GadiResult<T> = std::result::Result<T, AnyError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,         // 400
    NotAuthenticated,   // 401
    Forbidden,          // 403
    MissingTenantScope, // 403, internal contract violation
    NotFound,           // 404
    MethodNotAllowed,   // 405
    Conflict,           // 409
    IdentityCollision,  // 409, uniqueness violation
    Unprocessable,      // 422
    GeneralError,       // 500
    NotImplemented,     // 501
    Unavailable,        // 503
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::Forbidden | ErrorKind::MissingTenantScope => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::MethodNotAllowed => 405,
            ErrorKind::Conflict | ErrorKind::IdentityCollision => 409,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
            ErrorKind::NotImplemented => 501,
            ErrorKind::Unavailable => 503,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::MissingTenantScope => "MissingTenantScope",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::IdentityCollision => "IdentityCollision",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::NotImplemented => "NotImplemented",
            ErrorKind::Unavailable => "Unavailable",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::MissingTenantScope => "missing-tenant-scope",
            ErrorKind::NotFound => "not-found",
            ErrorKind::MethodNotAllowed => "method-not-allowed",
            ErrorKind::Conflict => "conflict",
            ErrorKind::IdentityCollision => "identity-collision",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::NotImplemented => "not-implemented",
            ErrorKind::Unavailable => "unavailable",
        }
    }
}

/// A structured GadiSewa error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct GadiError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<Value>,
    pub errors: Option<Value>,
    pub source: Option<AnyError>,
}

impl GadiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            errors: None,
            source: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it flows through the hook pipeline.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Downcast an `anyhow::Error` to a `GadiError` if possible.
    pub fn from_anyhow(err: &AnyError) -> Option<&GadiError> {
        err.chain().find_map(|e| e.downcast_ref::<GadiError>())
    }

    /// Turn any error into a GadiError: keep it when it already is one,
    /// otherwise wrap as GeneralError.
    pub fn normalize(err: AnyError) -> GadiError {
        match err.downcast::<GadiError>() {
            Ok(gadi) => gadi,
            Err(other) => {
                GadiError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// A version suitable for returning to clients: keeps the public
    /// fields, drops the inner `source` chain.
    pub fn sanitize_for_client(&self) -> GadiError {
        GadiError {
            kind: self.kind,
            message: self.message.clone(),
            data: self.data.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn to_json(&self) -> Value {
        use serde_json::json;

        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodNotAllowed, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, msg)
    }
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, msg)
    }

    /// A tenant-scoped collection was accessed without a garage filter.
    pub fn missing_tenant_scope(collection: &str) -> Self {
        Self::new(
            ErrorKind::MissingTenantScope,
            format!("Access to '{collection}' requires a garage filter."),
        )
    }

    /// A uniqueness rule was violated; `field` names the conflicting field.
    pub fn identity_collision(field: &str, detail: impl Into<String>) -> Self {
        use serde_json::json;
        Self::new(ErrorKind::IdentityCollision, detail).with_errors(json!({ field: ["Must be unique."] }))
    }
}

impl fmt::Display for GadiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for GadiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_collision_names_the_field() {
        let err = GadiError::identity_collision("phone_number", "Customer phone already exists.");
        assert_eq!(err.code(), 409);
        assert_eq!(err.name(), "IdentityCollision");

        let json = err.to_json();
        assert_eq!(json["className"], "identity-collision");
        assert!(json["errors"]["phone_number"].is_array());
    }

    #[test]
    fn missing_tenant_scope_is_a_403_with_its_own_name() {
        let err = GadiError::missing_tenant_scope("customers");
        assert_eq!(err.code(), 403);
        assert_eq!(err.name(), "MissingTenantScope");
        assert_ne!(err.class_name(), GadiError::forbidden("x").class_name());
    }

    #[test]
    fn normalize_keeps_structured_errors_lossless() {
        let original = GadiError::not_found("Garage not found.").into_anyhow();
        let normalized = GadiError::normalize(original);
        assert_eq!(normalized.kind, ErrorKind::NotFound);
        assert_eq!(normalized.message, "Garage not found.");
    }

    #[test]
    fn sanitize_drops_the_source_chain() {
        let inner = anyhow::anyhow!("connection reset by peer");
        let err = GadiError::general_error("boom").with_source(inner);
        assert!(err.sanitize_for_client().source.is_none());
    }
}
