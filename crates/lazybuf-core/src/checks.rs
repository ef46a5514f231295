//! Build-time check levels.
//!
//! Each level maps to a cargo feature and compiles to a constant, so a
//! disabled check costs nothing at runtime. All levels are enabled by
//! default; release embedders may turn individual levels off with
//! `default-features = false` plus the subset they want.

/// Field-number range checks on the read path.
pub(crate) const BOUNDS: bool = cfg!(feature = "check-bounds");

/// Write-side bounds and the mutable-after-immutable sub-message guard.
pub(crate) const TYPE: bool = cfg!(feature = "check-type");

/// Wire-type compatibility checks on getters.
pub(crate) const CRITICAL_TYPE: bool = cfg!(feature = "check-critical-type");

/// Strict UTF-8 validation on lazy string decode.
pub(crate) const CRITICAL_STATE: bool = cfg!(feature = "check-critical-state");
