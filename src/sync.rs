//! Lock acquisition helper shared across the crate.

use std::sync::{LockResult, PoisonError};

/// Unwraps a lock result, recovering the guard from a poisoned lock.
///
/// A poisoned mutex here only means some user action panicked on another
/// thread; every structure we guard (heaps, queues, tables) is mutated by
/// single push/pop calls and stays structurally sound across a panic.
pub(crate) fn recover<T>(result: LockResult<T>) -> T {
    result.unwrap_or_else(PoisonError::into_inner)
}
