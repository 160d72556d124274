//! Flat syntax tree.
//!
//! Nodes live in one `Vec<Node>` owned by `Ast` and refer to their children
//! by `NodeId`. The evaluator keeps `NodeId`s on its agenda, so a pending
//! "evaluate this" work item is a 4-byte `Copy` handle.
//!
//! Every node carries the `Span` it was parsed from; runtime diagnostics and
//! breakpoints are attributed through it.

mod operators;

use std::fmt;
use std::ops::Index;

use crate::{Name, Span, StringInterner};

pub use operators::{BinaryOp, LogicalOp, UnaryOp};

/// Index into the node arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new `NodeId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// `let` or `const`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeclKind {
    Let,
    Const,
}

impl DeclKind {
    #[inline]
    pub const fn is_const(self) -> bool {
        matches!(self, DeclKind::Const)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

/// Literal values appearing in source.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

/// Body of a function: an arrow's single expression or a statement block.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FunctionBody {
    /// `(x) => x + 1`. No `return` can occur inside.
    Expression(NodeId),
    /// `function f(x) { ... }` / `(x) => { ... }`.
    Block(Vec<NodeId>),
}

/// Property part of a member expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemberProperty {
    /// `obj.name`
    Named(Name),
    /// `obj[expr]`
    Computed(NodeId),
}

impl MemberProperty {
    /// The property expression, for `obj[expr]`.
    #[inline]
    pub const fn computed(self) -> Option<NodeId> {
        match self {
            MemberProperty::Named(_) => None,
            MemberProperty::Computed(id) => Some(id),
        }
    }
}

/// Syntax node kinds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    // Statements
    Program {
        body: Vec<NodeId>,
    },
    Block {
        body: Vec<NodeId>,
    },
    ExpressionStatement {
        expr: NodeId,
    },
    Declaration {
        kind: DeclKind,
        name: Name,
        init: NodeId,
    },
    /// `function name(params) { body }`, binding `name` like a `const`.
    FunctionDeclaration {
        name: Name,
        function: NodeId,
    },
    Return {
        argument: Option<NodeId>,
    },
    If {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    While {
        test: NodeId,
        body: NodeId,
    },
    /// A missing `test` loops until `break`/`return`.
    For {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    Break,
    Continue,
    Debugger,

    // Expressions
    Literal(Literal),
    Identifier(Name),
    This,
    Function {
        name: Option<Name>,
        params: Vec<Name>,
        body: FunctionBody,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Logical {
        op: LogicalOp,
        left: NodeId,
        right: NodeId,
    },
    Conditional {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    Assignment {
        name: Name,
        value: NodeId,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    ArrayLiteral {
        elements: Vec<NodeId>,
    },
    ObjectLiteral {
        properties: Vec<(Name, NodeId)>,
    },
    Member {
        object: NodeId,
        property: MemberProperty,
    },
    MemberAssignment {
        object: NodeId,
        property: MemberProperty,
        value: NodeId,
    },
}

impl NodeKind {
    /// Short human-readable description, used in traces and diagnostics.
    pub const fn describe(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "program",
            NodeKind::Block { .. } => "block",
            NodeKind::ExpressionStatement { .. } => "expression statement",
            NodeKind::Declaration { .. } => "declaration",
            NodeKind::FunctionDeclaration { .. } => "function declaration",
            NodeKind::Return { .. } => "return statement",
            NodeKind::If { .. } => "if statement",
            NodeKind::While { .. } => "while loop",
            NodeKind::For { .. } => "for loop",
            NodeKind::Break => "break statement",
            NodeKind::Continue => "continue statement",
            NodeKind::Debugger => "debugger statement",
            NodeKind::Literal(_) => "literal",
            NodeKind::Identifier(_) => "identifier",
            NodeKind::This => "this",
            NodeKind::Function { .. } => "function",
            NodeKind::Unary { .. } => "unary expression",
            NodeKind::Binary { .. } => "binary expression",
            NodeKind::Logical { .. } => "logical expression",
            NodeKind::Conditional { .. } => "conditional expression",
            NodeKind::Assignment { .. } => "assignment",
            NodeKind::Call { .. } => "call expression",
            NodeKind::ArrayLiteral { .. } => "array literal",
            NodeKind::ObjectLiteral { .. } => "object literal",
            NodeKind::Member { .. } => "member access",
            NodeKind::MemberAssignment { .. } => "member assignment",
        }
    }

    /// Whether this kind appears in statement position.
    pub const fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Program { .. }
                | NodeKind::Block { .. }
                | NodeKind::ExpressionStatement { .. }
                | NodeKind::Declaration { .. }
                | NodeKind::FunctionDeclaration { .. }
                | NodeKind::Return { .. }
                | NodeKind::If { .. }
                | NodeKind::While { .. }
                | NodeKind::For { .. }
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Debugger
        )
    }

    /// Visit every direct child id.
    pub fn for_each_child(&self, mut f: impl FnMut(NodeId)) {
        match self {
            NodeKind::Program { body } | NodeKind::Block { body } => {
                body.iter().copied().for_each(f);
            }
            NodeKind::ExpressionStatement { expr } => f(*expr),
            NodeKind::Declaration { init, .. } => f(*init),
            NodeKind::FunctionDeclaration { function, .. } => f(*function),
            NodeKind::Return { argument } => argument.iter().copied().for_each(f),
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                f(*test);
                f(*consequent);
                alternate.iter().copied().for_each(f);
            }
            NodeKind::While { test, body } => {
                f(*test);
                f(*body);
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                init.iter().chain(test).chain(update).copied().for_each(&mut f);
                f(*body);
            }
            NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Debugger
            | NodeKind::Literal(_)
            | NodeKind::Identifier(_)
            | NodeKind::This => {}
            NodeKind::Function { body, .. } => match body {
                FunctionBody::Expression(expr) => f(*expr),
                FunctionBody::Block(stmts) => stmts.iter().copied().for_each(f),
            },
            NodeKind::Unary { operand, .. } => f(*operand),
            NodeKind::Binary { left, right, .. } | NodeKind::Logical { left, right, .. } => {
                f(*left);
                f(*right);
            }
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                f(*test);
                f(*consequent);
                f(*alternate);
            }
            NodeKind::Assignment { value, .. } => f(*value),
            NodeKind::Call { callee, args } => {
                f(*callee);
                args.iter().copied().for_each(f);
            }
            NodeKind::ArrayLiteral { elements } => elements.iter().copied().for_each(f),
            NodeKind::ObjectLiteral { properties } => {
                properties.iter().map(|(_, id)| *id).for_each(f);
            }
            NodeKind::Member { object, property } => {
                f(*object);
                property.computed().into_iter().for_each(f);
            }
            NodeKind::MemberAssignment {
                object,
                property,
                value,
            } => {
                f(*object);
                property.computed().into_iter().for_each(&mut f);
                f(*value);
            }
        }
    }
}

/// A syntax node with its source location.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Structural problems in a tree handed to the evaluator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AstError {
    #[error("tree has no nodes")]
    Empty,
    #[error("root {root:?} is not a program node")]
    RootNotProgram { root: NodeId },
    #[error("{parent:?} refers to missing node {child:?}")]
    DanglingChild { parent: NodeId, child: NodeId },
    #[error("{node:?} must be a function node")]
    FunctionExpected { node: NodeId },
}

/// A validated, location-annotated syntax tree.
///
/// Construction goes through [`Ast::new`] (or deserialization), which checks
/// that every child id is in range, so indexing by any id reachable from the
/// root cannot fail.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "AstRepr"))]
pub struct Ast {
    names: StringInterner,
    nodes: Vec<Node>,
    root: NodeId,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct AstRepr {
    names: StringInterner,
    nodes: Vec<Node>,
    root: NodeId,
}

#[cfg(feature = "serde")]
impl TryFrom<AstRepr> for Ast {
    type Error = AstError;

    fn try_from(repr: AstRepr) -> Result<Self, Self::Error> {
        Ast::new(repr.nodes, repr.root, repr.names)
    }
}

impl Ast {
    /// Assemble and validate a tree.
    pub fn new(nodes: Vec<Node>, root: NodeId, names: StringInterner) -> Result<Self, AstError> {
        let ast = Ast { names, nodes, root };
        ast.validate()?;
        Ok(ast)
    }

    fn validate(&self) -> Result<(), AstError> {
        if self.nodes.is_empty() {
            return Err(AstError::Empty);
        }
        match self.get(self.root) {
            Some(Node {
                kind: NodeKind::Program { .. },
                ..
            }) => {}
            _ => return Err(AstError::RootNotProgram { root: self.root }),
        }
        for (index, node) in self.nodes.iter().enumerate() {
            let parent = NodeId::new(u32::try_from(index).unwrap_or(u32::MAX));
            let mut dangling = None;
            node.kind.for_each_child(|child| {
                if dangling.is_none() && child.index() >= self.nodes.len() {
                    dangling = Some(child);
                }
            });
            if let Some(child) = dangling {
                return Err(AstError::DanglingChild { parent, child });
            }
            if let NodeKind::FunctionDeclaration { function, .. } = node.kind {
                if !matches!(self.nodes[function.index()].kind, NodeKind::Function { .. }) {
                    return Err(AstError::FunctionExpected { node: function });
                }
            }
        }
        Ok(())
    }

    /// The `Program` node.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self[id].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self[id].span
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true for a validated tree.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn interner(&self) -> &StringInterner {
        &self.names
    }

    /// Resolve a name to its text.
    #[inline]
    pub fn name(&self, name: Name) -> &'static str {
        self.names.lookup(name)
    }

    /// The names a statement list declares directly (not in nested blocks),
    /// in source order, with the declaring statement. Function declarations
    /// bind like `const`.
    pub fn declarations<'a>(
        &'a self,
        body: &'a [NodeId],
    ) -> impl Iterator<Item = (NodeId, Name, DeclKind)> + 'a {
        body.iter().filter_map(|&id| match self.kind(id) {
            NodeKind::Declaration { kind, name, .. } => Some((id, *name, *kind)),
            NodeKind::FunctionDeclaration { name, .. } => Some((id, *name, DeclKind::Const)),
            _ => None,
        })
    }

    /// Whether a statement list declares anything (i.e. needs its own scope).
    pub fn has_declarations(&self, body: &[NodeId]) -> bool {
        self.declarations(body).next().is_some()
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl fmt::Debug for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ast")
            .field("nodes", &self.nodes.len())
            .field("root", &self.root)
            .finish()
    }
}
