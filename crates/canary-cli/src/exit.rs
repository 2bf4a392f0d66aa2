//! Process exit statuses and the failure type commands return.

use std::fmt;

use canary_client::RemoteError;
use canary_core::ErrorKind;
use canary_crypto::ProofError;

use crate::workflow::WorkflowError;

/// Every way the `canary` binary can exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    Success,
    InvalidArguments,
    InvalidAddress,
    BadProxy,
    FileRead,
    FileWrite,
    InvalidKey,
    InvalidSignature,
    /// A local canary is malformed or does not follow the store's latest.
    InvalidCanary,
    /// A canary fetched from a server failed verification.
    InvalidRemoteCanary,
    CorruptStore,
    ConnectionFailure,
    UnexpectedStatus,
}

impl ExitStatus {
    /// Numeric process exit code.
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::InvalidArguments => 2,
            Self::InvalidAddress => 3,
            Self::BadProxy => 4,
            Self::FileRead => 5,
            Self::FileWrite => 6,
            Self::InvalidKey => 7,
            Self::InvalidSignature => 8,
            Self::InvalidCanary => 9,
            Self::InvalidRemoteCanary => 10,
            Self::CorruptStore => 11,
            Self::ConnectionFailure => 12,
            Self::UnexpectedStatus => 13,
        }
    }

    /// Status for a failed workflow step.
    pub fn for_workflow(err: &WorkflowError) -> Self {
        match err {
            WorkflowError::Proof(e) => Self::for_proof(e),
            WorkflowError::Format(_) | WorkflowError::Validation(_) => Self::InvalidCanary,
            WorkflowError::DeadlineOverflow { .. } => Self::InvalidArguments,
            WorkflowError::Store(e) => match e.kind() {
                ErrorKind::StorageIo => Self::FileRead,
                _ => Self::CorruptStore,
            },
            WorkflowError::StoredProof(_) => Self::CorruptStore,
            WorkflowError::Remote(e) => Self::for_remote(e),
        }
    }

    fn for_proof(err: &ProofError) -> Self {
        match err {
            ProofError::Signature(_) => Self::InvalidSignature,
            ProofError::Document(_) => Self::InvalidCanary,
        }
    }

    fn for_remote(err: &RemoteError) -> Self {
        match err {
            RemoteError::InvalidAddress { .. } => Self::InvalidAddress,
            RemoteError::InvalidProxy { .. } => Self::BadProxy,
            RemoteError::Http { .. } | RemoteError::Deserialization { .. } => {
                Self::ConnectionFailure
            }
            RemoteError::ApiError { .. } => Self::UnexpectedStatus,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

/// A failed command: what went wrong and how the process should exit.
#[derive(Debug)]
pub struct Failure {
    pub status: ExitStatus,
    pub error: anyhow::Error,
}

impl Failure {
    pub fn new(status: ExitStatus, error: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    /// Failure with a plain message.
    pub fn msg(status: ExitStatus, message: impl fmt::Display) -> Self {
        Self::new(status, anyhow::anyhow!("{message}"))
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)
    }
}

impl From<WorkflowError> for Failure {
    fn from(err: WorkflowError) -> Self {
        Self::new(ExitStatus::for_workflow(&err), err)
    }
}

/// Attach an exit status and context to a fallible result.
pub trait ExitContext<T> {
    fn or_exit<C, F>(self, status: ExitStatus, context: F) -> Result<T, Failure>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ExitContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn or_exit<C, F>(self, status: ExitStatus, context: F) -> Result<T, Failure>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Failure::new(status, anyhow::Error::new(e).context(context())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canary_core::{FormatError, SuccessionError, ValidationError};
    use canary_crypto::CryptoError;

    #[test]
    fn codes_are_distinct() {
        let all = [
            ExitStatus::Success,
            ExitStatus::InvalidArguments,
            ExitStatus::InvalidAddress,
            ExitStatus::BadProxy,
            ExitStatus::FileRead,
            ExitStatus::FileWrite,
            ExitStatus::InvalidKey,
            ExitStatus::InvalidSignature,
            ExitStatus::InvalidCanary,
            ExitStatus::InvalidRemoteCanary,
            ExitStatus::CorruptStore,
            ExitStatus::ConnectionFailure,
            ExitStatus::UnexpectedStatus,
        ];
        let codes: std::collections::HashSet<u8> = all.iter().map(|s| s.code()).collect();
        assert_eq!(codes.len(), all.len());
        assert_eq!(ExitStatus::Success.code(), 0);
    }

    #[test]
    fn workflow_errors_map_to_statuses() {
        let sig = WorkflowError::Proof(ProofError::Signature(CryptoError::NotText));
        assert_eq!(ExitStatus::for_workflow(&sig), ExitStatus::InvalidSignature);

        let fmt = WorkflowError::Format(FormatError::MissingAuthor);
        assert_eq!(ExitStatus::for_workflow(&fmt), ExitStatus::InvalidCanary);

        let chain = WorkflowError::Validation(ValidationError::Succession(
            SuccessionError::ChainClosed,
        ));
        assert_eq!(ExitStatus::for_workflow(&chain), ExitStatus::InvalidCanary);

        let addr = WorkflowError::Remote(RemoteError::InvalidAddress {
            address: "x".into(),
            reason: "bad".into(),
        });
        assert_eq!(ExitStatus::for_workflow(&addr), ExitStatus::InvalidAddress);

        let status = WorkflowError::Remote(RemoteError::ApiError {
            endpoint: "POST /submit".into(),
            status: 409,
            message: "current canary is final".into(),
        });
        assert_eq!(ExitStatus::for_workflow(&status), ExitStatus::UnexpectedStatus);
    }

    #[test]
    fn or_exit_keeps_context_and_cause() {
        let res: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let failure = res
            .or_exit(ExitStatus::FileRead, || "failed to read proof: p.sig")
            .unwrap_err();
        assert_eq!(failure.status, ExitStatus::FileRead);
        assert_eq!(failure.to_string(), "failed to read proof: p.sig: no such file");
    }
}
