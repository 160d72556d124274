//! `AstBuilder` for constructing trees without a parser.
//!
//! Front-ends and tests allocate nodes bottom-up and finish with
//! [`AstBuilder::program`]. Nodes created without an explicit span get a
//! synthetic one-byte span equal to their allocation order, so every node
//! stays distinguishable in diagnostics and breakpoints.

use crate::{
    Ast, AstError, BinaryOp, DeclKind, FunctionBody, Literal, LogicalOp, MemberProperty, Name,
    Node, NodeId, NodeKind, Span, StringInterner, UnaryOp,
};

/// Incremental builder for an [`Ast`].
#[derive(Default)]
pub struct AstBuilder {
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an identifier.
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Allocate a node with an explicit span.
    pub fn alloc_at(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node { kind, span });
        id
    }

    /// Allocate a node with a synthetic span.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.alloc_at(kind, Span::synthetic(index))
    }

    /// Replace the span of an already allocated node.
    pub fn set_span(&mut self, id: NodeId, span: Span) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.span = span;
        }
    }

    // Literals and names

    pub fn num(&mut self, n: f64) -> NodeId {
        self.alloc(NodeKind::Literal(Literal::Number(n)))
    }

    pub fn str(&mut self, s: &str) -> NodeId {
        self.alloc(NodeKind::Literal(Literal::Str(s.to_owned())))
    }

    pub fn bool(&mut self, b: bool) -> NodeId {
        self.alloc(NodeKind::Literal(Literal::Bool(b)))
    }

    pub fn null(&mut self) -> NodeId {
        self.alloc(NodeKind::Literal(Literal::Null))
    }

    pub fn undefined(&mut self) -> NodeId {
        self.alloc(NodeKind::Literal(Literal::Undefined))
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        let name = self.name(name);
        self.alloc(NodeKind::Identifier(name))
    }

    pub fn this(&mut self) -> NodeId {
        self.alloc(NodeKind::This)
    }

    // Operators

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.alloc(NodeKind::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(NodeKind::Binary { op, left, right })
    }

    pub fn logical(&mut self, op: LogicalOp, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(NodeKind::Logical { op, left, right })
    }

    pub fn conditional(&mut self, test: NodeId, consequent: NodeId, alternate: NodeId) -> NodeId {
        self.alloc(NodeKind::Conditional {
            test,
            consequent,
            alternate,
        })
    }

    pub fn assign(&mut self, name: &str, value: NodeId) -> NodeId {
        let name = self.name(name);
        self.alloc(NodeKind::Assignment { name, value })
    }

    // Calls and functions

    pub fn call(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Call { callee, args })
    }

    /// `name(args...)`
    pub fn call_named(&mut self, name: &str, args: Vec<NodeId>) -> NodeId {
        let callee = self.ident(name);
        self.call(callee, args)
    }

    /// `(params) => body`
    pub fn arrow(&mut self, params: &[&str], body: NodeId) -> NodeId {
        let params = params.iter().map(|p| self.name(p)).collect();
        self.alloc(NodeKind::Function {
            name: None,
            params,
            body: FunctionBody::Expression(body),
        })
    }

    /// `(params) => { body }`
    pub fn arrow_block(&mut self, params: &[&str], body: Vec<NodeId>) -> NodeId {
        let params = params.iter().map(|p| self.name(p)).collect();
        self.alloc(NodeKind::Function {
            name: None,
            params,
            body: FunctionBody::Block(body),
        })
    }

    /// `function name(params) { body }` as a statement.
    pub fn function_decl(&mut self, name: &str, params: &[&str], body: Vec<NodeId>) -> NodeId {
        let name = self.name(name);
        let params = params.iter().map(|p| self.name(p)).collect();
        let function = self.alloc(NodeKind::Function {
            name: Some(name),
            params,
            body: FunctionBody::Block(body),
        });
        self.alloc(NodeKind::FunctionDeclaration { name, function })
    }

    // Data structures

    pub fn array(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::ArrayLiteral { elements })
    }

    pub fn object(&mut self, properties: &[(&str, NodeId)]) -> NodeId {
        let properties = properties
            .iter()
            .map(|(key, value)| (self.name(key), *value))
            .collect();
        self.alloc(NodeKind::ObjectLiteral { properties })
    }

    /// `object[index]`
    pub fn index(&mut self, object: NodeId, index: NodeId) -> NodeId {
        self.alloc(NodeKind::Member {
            object,
            property: MemberProperty::Computed(index),
        })
    }

    /// `object.field`
    pub fn field(&mut self, object: NodeId, field: &str) -> NodeId {
        let field = self.name(field);
        self.alloc(NodeKind::Member {
            object,
            property: MemberProperty::Named(field),
        })
    }

    /// `object[index] = value`
    pub fn set_index(&mut self, object: NodeId, index: NodeId, value: NodeId) -> NodeId {
        self.alloc(NodeKind::MemberAssignment {
            object,
            property: MemberProperty::Computed(index),
            value,
        })
    }

    /// `object.field = value`
    pub fn set_field(&mut self, object: NodeId, field: &str, value: NodeId) -> NodeId {
        let field = self.name(field);
        self.alloc(NodeKind::MemberAssignment {
            object,
            property: MemberProperty::Named(field),
            value,
        })
    }

    /// `object.method(args...)`
    pub fn method_call(&mut self, object: NodeId, method: &str, args: Vec<NodeId>) -> NodeId {
        let callee = self.field(object, method);
        self.call(callee, args)
    }

    // Statements

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.alloc(NodeKind::ExpressionStatement { expr })
    }

    pub fn declare(&mut self, kind: DeclKind, name: &str, init: NodeId) -> NodeId {
        let name = self.name(name);
        self.alloc(NodeKind::Declaration { kind, name, init })
    }

    pub fn let_(&mut self, name: &str, init: NodeId) -> NodeId {
        self.declare(DeclKind::Let, name, init)
    }

    pub fn const_(&mut self, name: &str, init: NodeId) -> NodeId {
        self.declare(DeclKind::Const, name, init)
    }

    pub fn ret(&mut self, argument: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Return { argument })
    }

    pub fn if_(&mut self, test: NodeId, consequent: NodeId, alternate: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::If {
            test,
            consequent,
            alternate,
        })
    }

    pub fn while_(&mut self, test: NodeId, body: NodeId) -> NodeId {
        self.alloc(NodeKind::While { test, body })
    }

    pub fn for_(
        &mut self,
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    ) -> NodeId {
        self.alloc(NodeKind::For {
            init,
            test,
            update,
            body,
        })
    }

    pub fn break_(&mut self) -> NodeId {
        self.alloc(NodeKind::Break)
    }

    pub fn continue_(&mut self) -> NodeId {
        self.alloc(NodeKind::Continue)
    }

    pub fn debugger(&mut self) -> NodeId {
        self.alloc(NodeKind::Debugger)
    }

    pub fn block(&mut self, body: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Block { body })
    }

    /// Finish the tree with a `Program` root holding `body`.
    pub fn program(mut self, body: Vec<NodeId>) -> Result<Ast, AstError> {
        let root = self.alloc(NodeKind::Program { body });
        Ast::new(self.nodes, root, self.interner)
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests use expect for brevity")]
mod tests;
