use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

use crate::error::{BeanError, SerializationError};

/// The `Type.property` hops taken from the root of a tree walk.
///
/// Every error raised during a walk carries a copy, so a failure deep in a
/// graph names the path that led to it.
#[derive(Default, Clone)]
pub(super) struct Trail {
    hops: Vec<String>,
}

impl Trail {
    pub const fn new() -> Self {
        Self { hops: Vec::new() }
    }

    pub fn push(&mut self, owner: &str, property: &str) {
        self.hops.push(format!("{owner}.{property}"));
    }

    pub fn pop(&mut self) {
        self.hops.pop();
    }

    /// An error at the current position.
    pub fn fail(&self, message: impl Into<String>) -> SerializationError {
        SerializationError::new(message, self.hops.clone())
    }

    /// An error at the current position caused by `cause`.
    pub fn wrap(&self, message: impl Into<String>, cause: BeanError) -> SerializationError {
        let mut err = self.fail(message);
        err.cause = Some(Box::new(cause));
        err
    }
}

impl Debug for Trail {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let mut iter = self.hops.iter();

        if let Some(first) = iter.next() {
            writeln!(f, "`{first}`")?;
        }

        for hop in iter {
            writeln!(f, " -> `{hop}`")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn errors_carry_the_hops() {
        let mut trail = Trail::new();
        trail.push("app::Customer", "address");
        trail.push("app::Address", "line1");
        trail.pop();
        trail.push("app::Address", "zip");

        let err = trail.fail("expected a number");
        assert_eq!(
            err.trail,
            vec![
                String::from("app::Customer.address"),
                String::from("app::Address.zip")
            ]
        );
        assert!(err.cause.is_none());
    }
}
