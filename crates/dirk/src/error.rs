// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

use crate::options::ConfigError;

/// A failure that aborts a whole compilation.
///
/// User mistakes in declarations are not errors of this type: they are reported through the
/// [`Messager`](crate::Messager) and only suppress generation for the affected declarations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A compiler option had a malformed value.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The generator reached a state that validation should have ruled out.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// Generated code could not be parsed back for formatting.
    #[error("generated code for {file} is not valid Rust: {source}")]
    Format {
        /// The generated file.
        file: String,
        /// The parse failure.
        source: syn::Error,
    },
}

/// A specialized `Result` for compilation-level failures.
pub type Result<T> = std::result::Result<T, Error>;
