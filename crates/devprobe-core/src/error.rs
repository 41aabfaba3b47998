// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for devprobe.

use std::io::ErrorKind;

use thiserror::Error;

/// Outcome of a failed probe query (filesystem read, interface enumeration).
///
/// Probe failures are never fatal to classification: matchers treat every
/// variant as "no evidence".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("probe target not found")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("probe not available on this platform")]
    Unavailable,

    #[error("probe I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::PermissionDenied => Self::PermissionDenied,
            ErrorKind::Unsupported => Self::Unavailable,
            _ => Self::Io(err.to_string()),
        }
    }
}

/// Top-level error type for all devprobe operations.
#[derive(Debug, Error)]
pub enum DevprobeError {
    // -- Probes --
    #[error("probe failed: {0}")]
    Probe(#[from] ProbeError),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DevprobeError>;
