//! Function application: closures, host functions and continuations.
//!
//! A closure call never recurses on the host stack. It binds the arguments
//! in a fresh frame, schedules the body, and returns to the loop. The
//! caller's environment comes back through an `Environment` restore that
//! also closes the call-stack frame; a call made when such a restore is
//! already next on the agenda reuses it (a tail call).

use std::rc::Rc;

use sable_ir::{FunctionBody, MemberProperty, NodeId, NodeKind};
use smallvec::SmallVec;

use super::Machine;
use crate::continuation::Continuation;
use crate::diagnostics::CallFrame;
use crate::environment::Mutability;
use crate::errors::{
    arity_mismatch, host_failure, malformed_tree, not_callable, scope_error, EvalResult, HostError,
};
use crate::host::{Arity, HostContext, HostFunction};
use crate::instr::{self, Instr, Item, MarkerKind};
use crate::value::{Closure, Value};

type Args = SmallVec<[Value; 4]>;

const ANONYMOUS: &str = "<anonymous>";

/// How a closure call relates to the restore at the agenda top.
enum CallPosition {
    /// The restore already closes a call: replace that call's frame.
    TailOfCall,
    /// The restore ends a block: make it close this call too.
    TailOfBlock,
    /// Push a restore of the caller's environment.
    Nested,
}

impl Machine<'_> {
    /// Callee and arguments (and the receiver, for method calls) are on the
    /// stash.
    pub(super) fn apply(&mut self, arity: usize, has_receiver: bool, node: NodeId) -> EvalResult<()> {
        let args = self.stash.pop_n(arity)?;
        let callee = self.stash.pop()?;
        let receiver = if has_receiver {
            Some(self.stash.pop()?)
        } else {
            None
        };
        self.check_deadline()?;

        let name = self.callee_name(node, &callee);
        tracing::trace!(callee = %name, arity, depth = self.calls.depth(), "application");
        self.apply_value(callee, args, receiver, node, name)
    }

    fn apply_value(
        &mut self,
        callee: Value,
        args: Args,
        receiver: Option<Value>,
        node: NodeId,
        name: String,
    ) -> EvalResult<()> {
        match callee {
            Value::Closure(closure) => self.apply_closure(&closure, &args, receiver, node, name),
            Value::Host(function) => self.apply_host(&function, &args, receiver, node),
            Value::CallCc => self.call_cc(args, node),
            Value::Continuation(continuation) => self.invoke(&continuation, args, node),
            other => Err(self.at(not_callable(other), node)),
        }
    }

    fn apply_closure(
        &mut self,
        closure: &Closure,
        args: &[Value],
        receiver: Option<Value>,
        node: NodeId,
        name: String,
    ) -> EvalResult<()> {
        let ast = self.ast;
        let NodeKind::Function { params, body, .. } = ast.kind(closure.node) else {
            return Err(self.at(malformed_tree("closure does not refer to a function"), node));
        };
        if params.len() != args.len() {
            return Err(self.at(
                arity_mismatch(&name, Arity::Exact(params.len()), args.len()),
                node,
            ));
        }

        let frame = CallFrame {
            callee: name,
            args: args.to_vec(),
            span: ast.span(node),
        };
        match self.call_position() {
            CallPosition::TailOfCall => self.calls.replace_top(frame),
            CallPosition::TailOfBlock => {
                self.calls.push(frame).map_err(|e| self.at(e, node))?;
                if let Some(Item::Instr(Instr::Environment { call_frame, .. })) =
                    self.agenda.peek_mut()
                {
                    *call_frame = true;
                }
            }
            CallPosition::Nested => {
                self.calls.push(frame).map_err(|e| self.at(e, node))?;
                self.agenda.push(instr::call_environment(self.env.clone()));
            }
        }

        let frame_name = closure.name.map_or(ANONYMOUS, |name| ast.name(name));
        let id = self.fresh_env_id();
        let env = closure.env.call(id, frame_name, node, receiver);
        for (param, arg) in params.iter().zip(args) {
            env.define(*param, arg.clone(), Mutability::Mutable)
                .map_err(|e| self.at(scope_error(e, ast.name(*param)), node))?;
        }
        self.env = env;

        match body {
            FunctionBody::Expression(expr) => self.agenda.push(instr::node(*expr)),
            FunctionBody::Block(stmts) => {
                self.declare_all(stmts)?;
                self.agenda.push(instr::marker(MarkerKind::Call));
                self.push_sequence(stmts);
            }
        }
        Ok(())
    }

    fn call_position(&self) -> CallPosition {
        match self.agenda.peek() {
            Some(Item::Instr(Instr::Environment {
                call_frame: true, ..
            })) => CallPosition::TailOfCall,
            Some(Item::Instr(Instr::Environment {
                call_frame: false, ..
            })) => CallPosition::TailOfBlock,
            _ => CallPosition::Nested,
        }
    }

    /// Host functions run to completion inside this step. Their failures are
    /// located at the call; machine diagnostics they raise pass through.
    fn apply_host(
        &mut self,
        function: &HostFunction,
        args: &[Value],
        receiver: Option<Value>,
        node: NodeId,
    ) -> EvalResult<()> {
        if !function.arity.accepts(args.len()) {
            return Err(self.at(
                arity_mismatch(function.name, function.arity, args.len()),
                node,
            ));
        }
        let mut ctx = HostContext {
            print: &self.print,
            receiver,
        };
        match function.call(&mut ctx, args) {
            Ok(value) => {
                self.stash.push(value);
                Ok(())
            }
            Err(HostError::Eval(err)) => Err(err),
            Err(HostError::Failed(message)) => {
                Err(self.at(host_failure(function.name, message), node))
            }
        }
    }

    /// `call_cc(f)`: capture the registers as they are once the call_cc
    /// application has popped its operands, then call `f` with them.
    fn call_cc(&mut self, args: Args, node: NodeId) -> EvalResult<()> {
        let function = match args.as_slice() {
            [function] => function.clone(),
            _ => return Err(self.at(arity_mismatch("call_cc", Arity::Exact(1), args.len()), node)),
        };
        let continuation = Continuation::capture(&self.agenda, &self.stash, &self.env, &self.calls);
        tracing::debug!(
            agenda = self.agenda.len(),
            stash = self.stash.len(),
            depth = self.calls.depth(),
            "captured continuation"
        );
        let name = self.value_name(&function);
        let mut args = Args::new();
        args.push(Value::Continuation(Rc::new(continuation)));
        self.apply_value(function, args, None, node, name)
    }

    /// Replace the registers with copies of the snapshot; the argument
    /// becomes the value of the `call_cc` expression.
    fn invoke(&mut self, continuation: &Continuation, args: Args, node: NodeId) -> EvalResult<()> {
        if args.len() > 1 {
            return Err(self.at(
                arity_mismatch("continuation", Arity::AtMost(1), args.len()),
                node,
            ));
        }
        let value = args.into_iter().next().unwrap_or(Value::Undefined);
        let (agenda, stash, env, calls) = continuation.restore();
        self.agenda = agenda;
        self.stash = stash;
        self.env = env;
        self.calls = calls;
        self.stash.push(value);
        tracing::debug!(
            agenda = self.agenda.len(),
            depth = self.calls.depth(),
            "invoked continuation"
        );
        Ok(())
    }

    /// The callee as written at the call site: `f`, `xs.push`, or the
    /// function's own name when the callee is a more complex expression.
    fn callee_name(&self, call: NodeId, callee: &Value) -> String {
        let ast = self.ast;
        if let NodeKind::Call {
            callee: callee_node,
            ..
        } = ast.kind(call)
        {
            match ast.kind(*callee_node) {
                NodeKind::Identifier(name) => return ast.name(*name).to_string(),
                NodeKind::Member {
                    object,
                    property: MemberProperty::Named(property),
                } => {
                    let property = ast.name(*property);
                    return match ast.kind(*object) {
                        NodeKind::Identifier(object) => {
                            format!("{}.{property}", ast.name(*object))
                        }
                        _ => property.to_string(),
                    };
                }
                _ => {}
            }
        }
        self.value_name(callee)
    }

    fn value_name(&self, callee: &Value) -> String {
        match callee {
            Value::Closure(closure) => closure
                .name
                .map_or(ANONYMOUS, |name| self.ast.name(name))
                .to_string(),
            Value::Host(function) => function.name.to_string(),
            Value::CallCc => "call_cc".to_string(),
            Value::Continuation(_) => "continuation".to_string(),
            _ => ANONYMOUS.to_string(),
        }
    }
}
