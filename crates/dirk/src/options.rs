// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compiler options.
//!
//! Options are named `dirk.<name>` and are read from the raw option map the host passes to the
//! compilation. Each option is parsed on first use and the result is kept for the remainder of
//! the compilation unit.

use std::collections::{BTreeSet, HashMap};

use once_cell::unsync::OnceCell;
use thiserror::Error;
use tracing::{Level, event};

const NAMESPACE: &str = "dirk";

/// The default number of bindings placed in each component shard.
pub const DEFAULT_KEYS_PER_COMPONENT_SHARD: usize = 3500;

/// A malformed option value. Always fatal for the compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A boolean flag was set to something other than `true` or `false`.
    #[error("expected a value of true/false for the flag \"{flag}\", got instead: {value}")]
    InvalidBoolean {
        /// The qualified flag name.
        flag: String,
        /// The raw value.
        value: String,
    },

    /// An integer option was not a positive integer.
    #[error("expected a positive integer for the option \"{flag}\", got instead: {value}")]
    InvalidInteger {
        /// The qualified option name.
        flag: String,
        /// The raw value.
        value: String,
    },
}

/// Options that take `true` or `false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BooleanOption {
    /// Creates framework instances through shared switching providers.
    FastInit,

    /// Pretty-prints generated files.
    FormatGeneratedSource,

    /// Do not use! Skips the check that an entry point extends its generated wrapper.
    DisableAndroidSuperclassValidation,

    /// Makes fragment `context()` return `None` once the fragment has been removed.
    UseFragmentGetContextFix,
}

impl BooleanOption {
    /// Every boolean option.
    pub const ALL: [Self; 4] = [
        Self::FastInit,
        Self::FormatGeneratedSource,
        Self::DisableAndroidSuperclassValidation,
        Self::UseFragmentGetContextFix,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::FastInit => "fastInit",
            Self::FormatGeneratedSource => "formatGeneratedSource",
            Self::DisableAndroidSuperclassValidation => "android.internal.disableAndroidSuperclassValidation",
            Self::UseFragmentGetContextFix => "android.useFragmentGetContextFix",
        }
    }

    /// The value used when the option is not set.
    #[must_use]
    pub fn default_value(self) -> bool {
        match self {
            Self::FormatGeneratedSource => true,
            Self::FastInit | Self::DisableAndroidSuperclassValidation | Self::UseFragmentGetContextFix => false,
        }
    }

    /// The name under which the option is set, e.g. `dirk.fastInit`.
    #[must_use]
    pub fn qualified_name(self) -> String {
        format!("{NAMESPACE}.{}", self.name())
    }

    fn index(self) -> usize {
        match self {
            Self::FastInit => 0,
            Self::FormatGeneratedSource => 1,
            Self::DisableAndroidSuperclassValidation => 2,
            Self::UseFragmentGetContextFix => 3,
        }
    }
}

/// Options that take a positive integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntOption {
    /// How many bindings a component shard holds before a new shard is started.
    KeysPerComponentShard,
}

impl IntOption {
    /// Every integer option.
    pub const ALL: [Self; 1] = [Self::KeysPerComponentShard];

    /// The value used when the option is not set.
    #[must_use]
    pub fn default_value(self) -> usize {
        match self {
            Self::KeysPerComponentShard => DEFAULT_KEYS_PER_COMPONENT_SHARD,
        }
    }

    /// The name under which the option is set.
    #[must_use]
    pub fn qualified_name(self) -> String {
        match self {
            Self::KeysPerComponentShard => format!("{NAMESPACE}.keysPerComponentShard"),
        }
    }
}

/// The options of one compilation unit.
#[derive(Debug, Default)]
pub struct CompilerOptions {
    raw: HashMap<String, String>,
    booleans: [OnceCell<bool>; 4],
    keys_per_component_shard: OnceCell<usize>,
}

impl CompilerOptions {
    /// Creates options from the raw `name -> value` map supplied by the host.
    pub fn from_map<K, V>(raw: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            raw: raw.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ..Self::default()
        }
    }

    /// The qualified names of every recognized option.
    #[must_use]
    pub fn supported_options() -> BTreeSet<String> {
        BooleanOption::ALL
            .iter()
            .map(|option| option.qualified_name())
            .chain(IntOption::ALL.iter().map(|option| option.qualified_name()))
            .collect()
    }

    /// Reads a boolean option.
    ///
    /// # Errors
    ///
    /// Fails if the option is set to anything other than `true` or `false`, ignoring case.
    pub fn get(&self, option: BooleanOption) -> Result<bool, ConfigError> {
        self.booleans[option.index()]
            .get_or_try_init(|| {
                let flag = option.qualified_name();
                let Some(value) = self.raw.get(&flag) else {
                    return Ok(option.default_value());
                };

                let parsed = match value.to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(ConfigError::InvalidBoolean {
                            flag,
                            value: value.clone(),
                        });
                    }
                };

                event!(Level::DEBUG, flag = %flag, value = parsed, "compiler option set");
                Ok(parsed)
            })
            .copied()
    }

    /// Reads an integer option.
    ///
    /// # Errors
    ///
    /// Fails if the option is set to anything other than a positive integer.
    pub fn get_int(&self, option: IntOption) -> Result<usize, ConfigError> {
        let cell = match option {
            IntOption::KeysPerComponentShard => &self.keys_per_component_shard,
        };

        cell.get_or_try_init(|| {
            let flag = option.qualified_name();
            let Some(value) = self.raw.get(&flag) else {
                return Ok(option.default_value());
            };

            match value.trim().parse::<usize>() {
                Ok(parsed) if parsed > 0 => {
                    event!(Level::DEBUG, flag = %flag, value = parsed, "compiler option set");
                    Ok(parsed)
                }
                _ => Err(ConfigError::InvalidInteger {
                    flag,
                    value: value.clone(),
                }),
            }
        })
        .copied()
    }

    /// Whether framework instances are created through switching providers.
    ///
    /// # Errors
    ///
    /// Fails if the option value is malformed.
    pub fn fast_init(&self) -> Result<bool, ConfigError> {
        self.get(BooleanOption::FastInit)
    }

    /// Whether generated files are pretty-printed.
    ///
    /// # Errors
    ///
    /// Fails if the option value is malformed.
    pub fn format_generated_source(&self) -> Result<bool, ConfigError> {
        self.get(BooleanOption::FormatGeneratedSource)
    }

    /// Whether the entry-point superclass check is disabled.
    ///
    /// # Errors
    ///
    /// Fails if the option value is malformed.
    pub fn is_android_superclass_validation_disabled(&self) -> Result<bool, ConfigError> {
        self.get(BooleanOption::DisableAndroidSuperclassValidation)
    }

    /// Whether fragments use the fixed `context()` behavior.
    ///
    /// # Errors
    ///
    /// Fails if the option value is malformed.
    pub fn use_fragment_get_context_fix(&self) -> Result<bool, ConfigError> {
        self.get(BooleanOption::UseFragmentGetContextFix)
    }

    /// How many bindings go into each component shard.
    ///
    /// # Errors
    ///
    /// Fails if the option value is malformed.
    pub fn keys_per_component_shard(&self) -> Result<usize, ConfigError> {
        self.get_int(IntOption::KeysPerComponentShard)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn unset_options_use_defaults() {
        let options = CompilerOptions::default();
        for option in BooleanOption::ALL {
            assert_eq!(options.get(option), Ok(option.default_value()));
        }
        assert_eq!(options.keys_per_component_shard(), Ok(DEFAULT_KEYS_PER_COMPONENT_SHARD));
    }

    #[rstest]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("True", true)]
    #[case("false", false)]
    #[case("FaLsE", false)]
    fn boolean_values_ignore_case(#[case] raw: &str, #[case] expected: bool) {
        let options = CompilerOptions::from_map([("dirk.fastInit", raw)]);
        assert_eq!(options.fast_init(), Ok(expected));
    }

    #[test]
    fn malformed_boolean_names_flag_and_value() {
        let options = CompilerOptions::from_map([("dirk.formatGeneratedSource", "maybe")]);
        let error = options.format_generated_source().unwrap_err();
        assert_eq!(
            error,
            ConfigError::InvalidBoolean {
                flag: "dirk.formatGeneratedSource".to_string(),
                value: "maybe".to_string(),
            }
        );
        assert!(error.to_string().contains("maybe"));
        assert!(error.to_string().contains("dirk.formatGeneratedSource"));
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("many")]
    fn malformed_integer_is_rejected(#[case] raw: &str) {
        let options = CompilerOptions::from_map([("dirk.keysPerComponentShard", raw)]);
        assert!(matches!(
            options.keys_per_component_shard(),
            Err(ConfigError::InvalidInteger { .. })
        ));
    }

    #[test]
    fn values_are_stable_after_first_read() {
        let options = CompilerOptions::from_map([("dirk.keysPerComponentShard", "7")]);
        assert_eq!(options.keys_per_component_shard(), Ok(7));
        assert_eq!(options.keys_per_component_shard(), Ok(7));
    }

    #[test]
    fn supported_options_are_enumerable() {
        let names = CompilerOptions::supported_options();
        assert!(names.contains("dirk.fastInit"));
        assert!(names.contains("dirk.android.useFragmentGetContextFix"));
        assert!(names.contains("dirk.android.internal.disableAndroidSuperclassValidation"));
        assert!(names.contains("dirk.keysPerComponentShard"));
        assert_eq!(names.len(), BooleanOption::ALL.len() + IntOption::ALL.len());
    }
}
