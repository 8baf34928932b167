//! Boolean environment-variable parsing.
//!
//! Build toggles arrive as heterogeneous strings (`1`, `ON`, `yes`,
//! `NotFound`, ...), often copied straight out of other build systems.
//! This module normalizes them against two fixed literal sets and fails
//! loudly on anything it does not recognize, so a typo in `USE_CUDA=fales`
//! aborts the build instead of silently flipping a feature.

use thiserror::Error;

/// Literals accepted as `true` (matched trimmed, case-insensitively).
const TRUTHY: &[&str] = &["1", "true", "t", "yes", "y", "on", "enable", "enabled", "found"];

/// Literals accepted as `false`.
const FALSY: &[&str] = &[
  "0", "false", "f", "no", "n", "off", "disable", "disabled", "notfound", "none", "null", "nil",
  "undefined", "n/a",
];

/// Errors from boolean literal parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvBoolError {
  /// The value matches neither the truthy nor the falsy literal set.
  #[error("invalid boolean literal: {value:?}")]
  InvalidLiteral { value: String },
}

/// Convert an optional environment value to a boolean.
///
/// Absent or empty input is `false`. Any other input must match one of the
/// fixed literal sets after trimming and lowercasing.
pub fn env_to_bool(value: Option<&str>) -> Result<bool, EnvBoolError> {
  let Some(raw) = value else {
    return Ok(false);
  };
  if raw.is_empty() {
    return Ok(false);
  }

  let normalized = raw.trim().to_ascii_lowercase();
  if TRUTHY.contains(&normalized.as_str()) {
    return Ok(true);
  }
  if FALSY.contains(&normalized.as_str()) {
    return Ok(false);
  }

  Err(EnvBoolError::InvalidLiteral { value: raw.to_string() })
}

/// Read an environment flag, treating an unset variable as `false`.
pub fn env_flag(name: &str) -> Result<bool, EnvBoolError> {
  match std::env::var_os(name) {
    Some(value) => env_to_bool(Some(unicode_value(&value)?)),
    None => Ok(false),
  }
}

/// Read an environment flag with an explicit default for the unset case.
///
/// Used for default-on toggles such as `USE_CUDA`: unset means enabled, but
/// a set value still goes through the full literal check.
pub fn env_flag_or(name: &str, default: bool) -> Result<bool, EnvBoolError> {
  match std::env::var_os(name) {
    Some(value) => env_to_bool(Some(unicode_value(&value)?)),
    None => Ok(default),
  }
}

/// A set value that is not valid Unicode cannot match any literal, so it
/// fails the same way a typo does rather than reading as unset.
fn unicode_value(value: &std::ffi::OsStr) -> Result<&str, EnvBoolError> {
  value.to_str().ok_or_else(|| EnvBoolError::InvalidLiteral {
    value: value.to_string_lossy().into_owned(),
  })
}
