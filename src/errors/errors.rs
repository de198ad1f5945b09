use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    /// Errors raised by the semantic passes only know the line of the node.
    pub fn at_line(error_impl: ErrorImpl, line: u32) -> Self {
        Error::new(error_impl, Position::line(line))
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_line(&self) -> u32 {
        self.position.0
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self.internal_error, ErrorImpl::IncompleteType { .. })
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. } => ErrorKind::Syntax,
            ErrorImpl::DuplicateDeclaration { .. } => ErrorKind::DuplicateDeclaration,
            ErrorImpl::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            ErrorImpl::TypeMismatch { .. } | ErrorImpl::ArgumentTypeMismatch { .. } => {
                ErrorKind::TypeMismatch
            }
            ErrorImpl::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            ErrorImpl::InvalidUsage { .. } => ErrorKind::InvalidUsage,
            ErrorImpl::IncompleteType { .. } => ErrorKind::IncompleteType,
            ErrorImpl::OverrideIncompatibility { .. } => ErrorKind::OverrideIncompatibility,
            ErrorImpl::CodegenInvariant { .. } => ErrorKind::Internal,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            ErrorImpl::UnresolvedReference { .. } => "UnresolvedReference",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::ArgumentTypeMismatch { .. } => "ArgumentTypeMismatch",
            ErrorImpl::ArityMismatch { .. } => "ArityMismatch",
            ErrorImpl::InvalidUsage { .. } => "InvalidUsage",
            ErrorImpl::IncompleteType { .. } => "IncompleteType",
            ErrorImpl::OverrideIncompatibility { .. } => "OverrideIncompatibility",
            ErrorImpl::CodegenInvariant { .. } => "CodegenInvariant",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::DuplicateDeclaration { kind, name } => {
                ErrorTip::Suggestion(format!("{} `{}` already declared in this scope", kind, name))
            }
            ErrorImpl::UnresolvedReference { kind, name } => {
                ErrorTip::Suggestion(format!("{} `{}` not declared", kind, name))
            }
            ErrorImpl::TypeMismatch { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::ArgumentTypeMismatch { callee, index, expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Argument {} of `{}` expects `{}`, received `{}`",
                    index, callee, expected, received
                ))
            }
            ErrorImpl::ArityMismatch { callee, expected, received } => ErrorTip::Suggestion(format!(
                "`{}` expects {} arguments, received {}",
                callee, expected, received
            )),
            ErrorImpl::InvalidUsage { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::IncompleteType { .. } => ErrorTip::None,
            ErrorImpl::OverrideIncompatibility { member, class } => ErrorTip::Suggestion(format!(
                "`{}` in class `{}` must be a subtype of the member it overrides",
                member, class
            )),
            ErrorImpl::CodegenInvariant { .. } => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at line {}", self.internal_error, self.position.0)
    }
}

impl std::error::Error for Error {}

/// The error taxonomy shared by every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    DuplicateDeclaration,
    UnresolvedReference,
    TypeMismatch,
    ArityMismatch,
    InvalidUsage,
    IncompleteType,
    OverrideIncompatibility,
    Internal,
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("{kind} id {name} already declared")]
    DuplicateDeclaration { kind: String, name: String },
    #[error("{kind} id {name} not declared")]
    UnresolvedReference { kind: String, name: String },
    #[error("{message}")]
    TypeMismatch { message: String },
    #[error("wrong type for {index}-th parameter in the invocation of {callee}")]
    ArgumentTypeMismatch {
        callee: String,
        index: usize,
        expected: String,
        received: String,
    },
    #[error("wrong number of parameters in the invocation of {callee}: expected {expected}, received {received}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        received: usize,
    },
    #[error("{message}")]
    InvalidUsage { message: String },
    #[error("incomplete type: {what}")]
    IncompleteType { what: String },
    #[error("wrong overriding type for {member} in class {class}")]
    OverrideIncompatibility { member: String, class: String },
    #[error("code generation invariant violated: {message}")]
    CodegenInvariant { message: String },
}
