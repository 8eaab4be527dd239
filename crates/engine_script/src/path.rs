//! Dotted field paths for diagnostics (`outer.inner.s`).
//!
//! Paths are built on the stack while recursing and only rendered to a
//! string when an error is reported.

use std::fmt;

#[derive(Debug, Clone, Copy)]
pub struct FieldPath<'a> {
    parent: Option<&'a FieldPath<'a>>,
    name: &'a str,
}

impl<'a> FieldPath<'a> {
    /// The path of a top-level field.
    #[must_use]
    pub const fn root(name: &'a str) -> Self {
        Self { parent: None, name }
    }

    /// The path of a field nested inside `self`.
    #[must_use]
    pub const fn child(&'a self, name: &'a str) -> Self {
        Self {
            parent: Some(self),
            name,
        }
    }

    /// Extend an optional parent path.
    #[must_use]
    pub const fn under(parent: Option<&'a FieldPath<'a>>, name: &'a str) -> Self {
        Self { parent, name }
    }
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent {
            write!(f, "{parent}.")?;
        }
        write!(f, "{}", self.name)
    }
}
