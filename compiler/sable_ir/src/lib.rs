//! Sable IR - Syntax Tree Types
//!
//! This crate contains the data structures the evaluator consumes:
//! - Spans for source locations
//! - Names for interned identifiers
//! - A flat, location-annotated syntax tree (`Ast`) addressed by `NodeId`
//! - Operator enums shared by the front-end and the evaluator
//! - `AstBuilder` for constructing trees without a parser
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers are `Name(u32)`
//! - **Flatten Everything**: no `Box<Node>`, children are `NodeId(u32)` indices,
//!   so the evaluator's agenda can hold plain `Copy` handles

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod builder;
mod interner;
mod name;
mod span;

pub use ast::{
    Ast, AstError, BinaryOp, DeclKind, FunctionBody, Literal, LogicalOp, MemberProperty, Node,
    NodeId, NodeKind, UnaryOp,
};
pub use builder::AstBuilder;
pub use interner::StringInterner;
pub use name::Name;
pub use span::Span;
