//! Aster Compiler — front end for the Aster programming language.
//!
//! # Pipeline
//!
//! ```text
//! Source Code (.as)
//!     │
//!     ▼
//! ┌──────────┐
//! │ Interner  │  Names and string literals become stable integer ids
//! └────┬─────┘
//!      │
//!      ▼
//! ┌──────────┐
//! │  Lexer    │  Layout-aware tokenization: indentation synthesizes
//! └────┬─────┘  statement and block terminators
//!      │
//!      ▼
//! ┌──────────┐
//! │  Parser   │  Recursive descent with backtracking snapshots,
//! └────┬─────┘  building an arena AST
//!      │
//!      ▼
//! ┌──────────┐
//! │ Resolver  │  Scope tree, hash-consed types, lazy alias/variant
//! └────┬─────┘  resolution, generic instantiation, typed IR
//!      │
//!      ▼
//! Resolved module (input to a code generator)
//! ```
//!
//! The language is strictly typed, indentation-sensitive, and
//! expression-oriented: blocks are delimited by layout, functions are
//! value bindings, and tuples (written in braces) are the one structural
//! aggregate, canonicalized so structural equality is identity.

pub mod ast;
pub mod errors;
pub mod intern;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod token;
pub mod types;
