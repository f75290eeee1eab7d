//! Positions inside literals and terms
//!
//! A `Position` is a path of steps from a literal root down to a subterm:
//! `Left`/`Right` select an equation side, `Arg(i)` descends into the i-th
//! argument of an application, `Body` descends under a lambda.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a position path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Descend into argument i of an application
    Arg(u32),
    /// The left side of an equation literal
    Left,
    /// The right side of an equation literal
    Right,
    /// The body of a lambda
    Body,
}

/// A path from a literal root to a subterm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub steps: Vec<Step>,
}

impl Position {
    /// The empty position (the root itself)
    pub fn root() -> Self {
        Position { steps: Vec::new() }
    }

    /// A position starting at an equation side
    pub fn side(step: Step) -> Self {
        Position { steps: vec![step] }
    }

    /// Extend this position by one step
    pub fn child(&self, step: Step) -> Position {
        let mut steps = self.steps.clone();
        steps.push(step);
        Position { steps }
    }

    /// Prefix this position with a leading step
    pub fn below(mut self, step: Step) -> Position {
        self.steps.insert(0, step);
        self
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "e");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match step {
                Step::Arg(n) => write!(f, "{}", n)?,
                Step::Left => write!(f, "l")?,
                Step::Right => write!(f, "r")?,
                Step::Body => write!(f, "b")?,
            }
        }
        Ok(())
    }
}
