//! Kagami Structural Matching Library
//!
//! This library provides backtracking structural comparison between a
//! pattern tree (containing free variables and multi-statement wildcards)
//! and every subtree of a target scope, producing variable bindings for
//! each match, plus a multi-occurrence duplicate finder that chains
//! statement sequences.

pub mod error;
pub mod lexer;
pub mod matcher;
pub mod oracle;
pub mod parser;
pub mod report;
pub mod tree;

// Re-export commonly used types
pub use error::{KagamiError, KagamiResult, LexerError, MatchError, ParserError};
pub use lexer::{Lexer, SpannedToken, Token};
pub use matcher::{
    BindState, Cancel, CancelFn, Matches, NeverCancel, Search, SearchOptions, VariableAssignments,
};
pub use oracle::{ElementId, ElementKind, EmptyOracle, SimpleOracle, SymbolOracle, TypeId};
pub use parser::Parser;
pub use tree::{Node, NodeKind, NodePath, NodeRef, Span};
