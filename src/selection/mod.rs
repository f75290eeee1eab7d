//! Literal selection strategies and the passive clause queue.

pub mod literal;
pub mod passive;

pub use literal::{
    LiteralSelector, SelectAllNegative, SelectComplex, SelectFirstNegative, SelectNone,
};
pub use passive::PassiveQueue;
