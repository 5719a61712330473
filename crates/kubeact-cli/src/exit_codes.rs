//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

#![allow(dead_code)]

/// Success - action completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - action options rejected
pub const VALIDATION_ERROR: i32 = 2;

/// IO error - manifest not found, empty file, no glob match, etc.
pub const IO_ERROR: i32 = 5;

/// Command failed - kubectl exited with a non-zero code
pub const COMMAND_FAILED: i32 = 6;

/// Usage error - unknown action or malformed arguments (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
