//! Success-or-fallback results for steps that must never fail a
//! conversation.

use std::fmt::Display;

/// The result of a step that degrades instead of erroring. Both arms
/// carry a usable value; `Fallback` marks that the value is the step's
/// well-defined default because the upstream call did not succeed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Fresh(T),
    Fallback(T),
}

impl<T> Outcome<T> {
    /// Absorb an error into the fallback value, logging the cause under
    /// `step`.
    pub fn absorb<E, F>(result: Result<T, E>, step: &str, fallback: F) -> Self
    where
        E: Display,
        F: FnOnce() -> T,
    {
        match result {
            Ok(value) => Outcome::Fresh(value),
            Err(err) => {
                tracing::warn!("{} failed, using fallback: {:#}", step, err);
                Outcome::Fallback(fallback())
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Fresh(v) | Outcome::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Fresh(v) | Outcome::Fallback(v) => v,
        }
    }
}
