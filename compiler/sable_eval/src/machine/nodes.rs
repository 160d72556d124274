//! Node handlers: each syntax node decomposes into agenda items.
//!
//! Items are scheduled with `Agenda::extend_rev`, so every handler lists its
//! work in execution order. Statements leave exactly one value on the stash;
//! sequences pop the value of every statement but the last.

use std::rc::Rc;

use sable_ir::{Literal, MemberProperty, Name, NodeId, NodeKind};

use super::Machine;
use crate::errors::{scope_error, EvalResult};
use crate::instr::{self, Instr, Item, MarkerKind};
use crate::value::{Closure, Value};

impl Machine<'_> {
    pub(super) fn eval_node(&mut self, id: NodeId) -> EvalResult<()> {
        let ast = self.ast;
        match ast.kind(id) {
            // Statements
            NodeKind::Program { body } => {
                self.agenda.push(instr::push_undefined_if_needed());
                self.eval_block(body, "program")?;
            }
            NodeKind::Block { body } => self.eval_block(body, "block")?,
            NodeKind::ExpressionStatement { expr } => self.agenda.push(instr::node(*expr)),
            NodeKind::Declaration { name, init, .. } => {
                self.agenda
                    .extend_rev([instr::node(*init), instr::declare(*name, id)]);
            }
            NodeKind::FunctionDeclaration { name, function } => {
                self.agenda
                    .extend_rev([instr::node(*function), instr::declare(*name, id)]);
            }
            NodeKind::Return { argument } => self.eval_return(*argument),
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.agenda.extend_rev([
                    instr::node(*test),
                    instr::branch(*consequent, *alternate, id),
                ]);
            }
            NodeKind::While { test, body } => {
                self.agenda.extend_rev([
                    instr::push_undefined(),
                    instr::node(*test),
                    instr::while_(*test, *body, id),
                    instr::marker(MarkerKind::Break),
                ]);
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => self.eval_for(id, *init, *test, *update, *body)?,
            NodeKind::Break => self.agenda.push(instr::break_(id)),
            NodeKind::Continue => self.agenda.push(instr::continue_(id)),
            NodeKind::Debugger => {
                self.stash.push(Value::Undefined);
                self.pause_requested = Some(id);
            }

            // Expressions
            NodeKind::Literal(literal) => self.stash.push(literal_value(literal)),
            NodeKind::Identifier(name) => {
                let value = self
                    .env
                    .lookup(*name)
                    .map_err(|e| self.at(scope_error(e, ast.name(*name)), id))?;
                self.stash.push(value);
            }
            NodeKind::This => {
                let receiver = self.env.receiver().unwrap_or(Value::Undefined);
                self.stash.push(receiver);
            }
            NodeKind::Function { name, params, .. } => {
                self.stash.push(Value::Closure(Rc::new(Closure {
                    node: id,
                    name: *name,
                    arity: params.len(),
                    env: self.env.clone(),
                })));
            }
            NodeKind::Unary { op, operand } => {
                self.agenda
                    .extend_rev([instr::node(*operand), instr::unary(*op, id)]);
            }
            NodeKind::Binary { op, left, right } => {
                self.agenda.extend_rev([
                    instr::node(*left),
                    instr::node(*right),
                    instr::binary(*op, id),
                ]);
            }
            NodeKind::Logical { op, left, right } => {
                self.agenda
                    .extend_rev([instr::node(*left), instr::logical(*op, *right, id)]);
            }
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.agenda.extend_rev([
                    instr::node(*test),
                    instr::branch(*consequent, Some(*alternate), id),
                ]);
            }
            NodeKind::Assignment { name, value } => {
                self.agenda
                    .extend_rev([instr::node(*value), instr::assign(*name, id)]);
            }
            NodeKind::Call { callee, args } => self.eval_call(id, *callee, args),
            NodeKind::ArrayLiteral { elements } => {
                let mut items: Vec<Item> = elements.iter().map(|&e| instr::node(e)).collect();
                items.push(instr::array_literal(elements.len(), id));
                self.agenda.extend_rev(items);
            }
            NodeKind::ObjectLiteral { properties } => {
                let keys: Rc<[Name]> = properties.iter().map(|(key, _)| *key).collect();
                let mut items: Vec<Item> = properties
                    .iter()
                    .map(|&(_, value)| instr::node(value))
                    .collect();
                items.push(instr::object_literal(keys, id));
                self.agenda.extend_rev(items);
            }
            NodeKind::Member { object, property } => {
                let key = self.property_key(*property);
                self.agenda
                    .extend_rev([instr::node(*object), key, instr::member_access(id)]);
            }
            NodeKind::MemberAssignment {
                object,
                property,
                value,
            } => {
                let key = self.property_key(*property);
                self.agenda.extend_rev([
                    instr::node(*object),
                    key,
                    instr::node(*value),
                    instr::member_assign(id),
                ]);
            }
        }
        Ok(())
    }

    /// Enter a block: a fresh frame with every `let`, `const` and function
    /// declaration of `body` in its temporal dead zone, then the statements.
    ///
    /// Blocks without declarations share the enclosing frame.
    fn eval_block(&mut self, body: &[NodeId], name: &'static str) -> EvalResult<()> {
        let ast = self.ast;
        if ast.has_declarations(body) {
            self.enter_scope(name);
            self.declare_all(body)?;
        }
        self.push_sequence(body);
        Ok(())
    }

    /// Switch to a child frame, scheduling the restore of the current one.
    ///
    /// When a restore is already the next item, the scope ends right before
    /// it and a second restore would be overwritten immediately, so none is
    /// pushed, and a call in tail position of the block stays a tail call.
    fn enter_scope(&mut self, name: &'static str) {
        if !matches!(
            self.agenda.peek(),
            Some(Item::Instr(Instr::Environment { .. }))
        ) {
            self.agenda.push(instr::environment(self.env.clone()));
        }
        let id = self.fresh_env_id();
        self.env = self.env.child(id, name);
    }

    /// Put the declarations of `body` into the current frame, uninitialized.
    pub(super) fn declare_all(&mut self, body: &[NodeId]) -> EvalResult<()> {
        let ast = self.ast;
        for (decl, name, kind) in ast.declarations(body) {
            self.env
                .declare(name, kind.into())
                .map_err(|e| self.at(scope_error(e, ast.name(name)), decl))?;
        }
        Ok(())
    }

    /// `s1; pop; s2; pop; ...; sn`. An empty sequence is `undefined`.
    pub(super) fn push_sequence(&mut self, body: &[NodeId]) {
        let Some((last, rest)) = body.split_last() else {
            self.agenda.push(instr::push_undefined());
            return;
        };
        self.agenda.push(instr::node(*last));
        for stmt in rest.iter().rev() {
            self.agenda.push(instr::pop());
            self.agenda.push(instr::node(*stmt));
        }
    }

    fn eval_return(&mut self, argument: Option<NodeId>) {
        let value = argument.map_or_else(instr::push_undefined, instr::node);
        if self.in_tail_position() {
            // The call's own restore is next: drop the marker and let the
            // argument run directly in front of it.
            self.unwind_call();
            self.agenda.push(value);
        } else {
            self.agenda.extend_rev([value, instr::reset()]);
        }
    }

    /// Whether only block restores separate the agenda top from the
    /// enclosing call marker.
    fn in_tail_position(&self) -> bool {
        for item in self.agenda.iter() {
            match item {
                Item::Instr(Instr::Environment {
                    call_frame: false, ..
                }) => {}
                other => return other.is_marker(MarkerKind::Call),
            }
        }
        false
    }

    /// Discard items through the nearest call marker.
    pub(super) fn unwind_call(&mut self) {
        while let Some(item) = self.agenda.pop() {
            if item.is_marker(MarkerKind::Call) {
                break;
            }
        }
    }

    fn eval_for(
        &mut self,
        id: NodeId,
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    ) -> EvalResult<()> {
        let ast = self.ast;
        let declared = init.and_then(|init| match ast.kind(init) {
            NodeKind::Declaration { kind, name, .. } => Some((init, *name, *kind)),
            _ => None,
        });
        let loop_vars: Rc<[Name]> = match declared {
            Some((decl, name, kind)) => {
                self.enter_scope("for");
                self.env
                    .declare(name, kind.into())
                    .map_err(|e| self.at(scope_error(e, ast.name(name)), decl))?;
                vec![name].into()
            }
            None => Vec::new().into(),
        };

        let mut items = Vec::with_capacity(7);
        if let Some(init) = init {
            items.push(instr::node(init));
            items.push(instr::pop());
        }
        items.push(instr::iteration_env(Rc::clone(&loop_vars)));
        items.push(instr::push_undefined());
        items.push(loop_test(test));
        items.push(instr::for_(test, update, body, loop_vars, id));
        items.push(instr::marker(MarkerKind::Break));
        self.agenda.extend_rev(items);
        Ok(())
    }

    /// Calls on a member expression evaluate the object once and keep it
    /// beneath the callee as the receiver.
    fn eval_call(&mut self, id: NodeId, callee: NodeId, args: &[NodeId]) {
        let ast = self.ast;
        let mut items = Vec::with_capacity(args.len() + 3);
        let receiver = match ast.kind(callee) {
            NodeKind::Member { object, property } => {
                items.push(instr::node(*object));
                match property {
                    MemberProperty::Named(name) => {
                        items.push(instr::method_lookup(Some(*name), callee));
                    }
                    MemberProperty::Computed(key) => {
                        items.push(instr::node(*key));
                        items.push(instr::method_lookup(None, callee));
                    }
                }
                true
            }
            _ => {
                items.push(instr::node(callee));
                false
            }
        };
        items.extend(args.iter().map(|&arg| instr::node(arg)));
        items.push(instr::application(args.len(), receiver, id));
        self.agenda.extend_rev(items);
    }

    fn property_key(&self, property: MemberProperty) -> Item {
        match property {
            MemberProperty::Named(name) => instr::push(Value::string(self.ast.name(name))),
            MemberProperty::Computed(key) => instr::node(key),
        }
    }
}

/// A missing loop test is `true`.
pub(super) fn loop_test(test: Option<NodeId>) -> Item {
    test.map_or_else(|| instr::push(Value::Bool(true)), instr::node)
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Undefined => Value::Undefined,
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::string(s.as_str()),
    }
}
