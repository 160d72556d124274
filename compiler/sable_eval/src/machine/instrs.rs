//! Instruction handlers.

use std::rc::Rc;

use sable_ir::{Name, NodeId, NodeKind};

use super::nodes::loop_test;
use super::Machine;
use crate::checks::{self, check_condition, check_logical, member_get, member_set};
use crate::errors::{control_outside_loop, scope_error, EvalResult};
use crate::instr::{self, Instr, Item, MarkerKind};
use crate::value::{Object, Value};

impl Machine<'_> {
    pub(super) fn exec_instr(&mut self, instr: Instr) -> EvalResult<()> {
        let ast = self.ast;
        match instr {
            Instr::Reset => self.unwind_call(),
            Instr::Marker(MarkerKind::Call) => {
                // Body finished without `return`: the call's value is undefined.
                *self.stash.peek_mut()? = Value::Undefined;
            }
            Instr::Marker(MarkerKind::Break | MarkerKind::Continue) => {}
            Instr::Pop => {
                self.stash.pop()?;
            }
            Instr::Push(value) => self.stash.push(value),
            Instr::PushUndefinedIfNeeded => {
                if self.stash.is_empty() {
                    self.stash.push(Value::Undefined);
                }
            }
            Instr::Assign { name, node } => {
                let value = self.stash.peek()?.clone();
                self.env
                    .assign(name, value)
                    .map_err(|e| self.at(scope_error(e, ast.name(name)), node))?;
            }
            Instr::Declare { name, node } => {
                let value = self.stash.pop()?;
                self.env
                    .initialize(name, value)
                    .map_err(|e| self.at(scope_error(e, ast.name(name)), node))?;
                self.stash.push(Value::Undefined);
            }
            Instr::Unary { op, node } => {
                let operand = self.stash.pop()?;
                let result = checks::unary(op, operand, self.checks).map_err(|e| self.at(e, node))?;
                self.stash.push(result);
            }
            Instr::Binary { op, node } => {
                let right = self.stash.pop()?;
                let left = self.stash.pop()?;
                let result =
                    checks::binary(op, left, right, self.checks).map_err(|e| self.at(e, node))?;
                self.stash.push(result);
            }
            Instr::Logical { op, right, node } => {
                let left = self.stash.pop()?;
                let truth = check_logical(op, &left, self.checks).map_err(|e| self.at(e, node))?;
                if truth == op.short_circuits_on() {
                    self.stash.push(left);
                } else {
                    self.agenda.push(instr::node(right));
                }
            }
            Instr::Branch {
                consequent,
                alternate,
                node,
            } => {
                let context = if matches!(ast.kind(node), NodeKind::If { .. }) {
                    "if"
                } else {
                    "conditional"
                };
                let test = self.stash.pop()?;
                let truth =
                    check_condition(context, &test, self.checks).map_err(|e| self.at(e, node))?;
                match (truth, alternate) {
                    (true, _) => self.agenda.push(instr::node(consequent)),
                    (false, Some(alternate)) => self.agenda.push(instr::node(alternate)),
                    (false, None) => self.stash.push(Value::Undefined),
                }
            }
            Instr::Environment { env, call_frame } => {
                self.env = env;
                if call_frame {
                    self.calls.pop();
                }
            }
            Instr::While { test, body, node } => {
                let value = self.stash.pop()?;
                if check_condition("while", &value, self.checks).map_err(|e| self.at(e, node))? {
                    self.agenda.extend_rev([
                        instr::pop(),
                        instr::node(body),
                        instr::marker(MarkerKind::Continue),
                        instr::node(test),
                        instr::while_(test, body, node),
                    ]);
                }
            }
            Instr::For {
                test,
                update,
                body,
                loop_vars,
                node,
            } => {
                let value = self.stash.pop()?;
                if check_condition("for", &value, self.checks).map_err(|e| self.at(e, node))? {
                    self.next_iteration(test, update, body, loop_vars, node);
                }
            }
            Instr::IterationEnv { loop_vars } => {
                if !loop_vars.is_empty() {
                    let id = self.fresh_env_id();
                    self.env = self.env.copy_bindings(id, &loop_vars);
                }
            }
            Instr::Application {
                arity,
                receiver,
                node,
            } => self.apply(arity, receiver, node)?,
            Instr::Break { node } => self.unwind_loop(MarkerKind::Break, node)?,
            Instr::Continue { node } => self.unwind_loop(MarkerKind::Continue, node)?,
            Instr::ArrayLiteral { len, .. } => {
                let elements = self.stash.pop_n(len)?;
                self.stash.push(Value::array(elements.into_vec()));
            }
            Instr::ObjectLiteral { keys, .. } => {
                let values = self.stash.pop_n(keys.len())?;
                let mut object = Object::new();
                for (key, value) in keys.iter().zip(values) {
                    object.set(Rc::from(ast.name(*key)), value);
                }
                self.stash.push(Value::object(object));
            }
            Instr::MemberAccess { node } => {
                let key = self.stash.pop()?;
                let object = self.stash.pop()?;
                let value = member_get(&object, &key, self.checks).map_err(|e| self.at(e, node))?;
                self.stash.push(value);
            }
            Instr::MemberAssign { node } => {
                let value = self.stash.pop()?;
                let key = self.stash.pop()?;
                let object = self.stash.pop()?;
                member_set(&object, &key, value.clone(), self.checks)
                    .map_err(|e| self.at(e, node))?;
                self.stash.push(value);
            }
            Instr::MethodLookup { property, node } => {
                let key = match property {
                    Some(name) => Value::string(ast.name(name)),
                    None => self.stash.pop()?,
                };
                let object = self.stash.peek()?.clone();
                let method = match (&object, &key) {
                    (Value::Array(_), Value::Str(name)) => {
                        self.array_methods.get(&**name).cloned().map(Value::Host)
                    }
                    _ => None,
                };
                let callee = match method {
                    Some(method) => method,
                    None => member_get(&object, &key, self.checks).map_err(|e| self.at(e, node))?,
                };
                self.stash.push(callee);
            }
        }
        Ok(())
    }

    /// Schedule one more trip: body, per-iteration copy of the loop
    /// variables, update, test.
    fn next_iteration(
        &mut self,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
        loop_vars: Rc<[Name]>,
        node: NodeId,
    ) {
        let mut items = Vec::with_capacity(8);
        items.push(instr::pop());
        items.push(instr::node(body));
        items.push(instr::marker(MarkerKind::Continue));
        items.push(instr::iteration_env(Rc::clone(&loop_vars)));
        if let Some(update) = update {
            items.push(instr::node(update));
            items.push(instr::pop());
        }
        items.push(loop_test(test));
        items.push(instr::for_(test, update, body, loop_vars, node));
        self.agenda.extend_rev(items);
    }

    /// Discard items up to the loop marker `target`.
    ///
    /// A scope restore met on the way runs first: it is put back on top with
    /// this instruction beneath it, so unwinding resumes once the scope is
    /// popped. Reaching a call marker or the bottom of the agenda means the
    /// statement is not inside a loop of the current function.
    fn unwind_loop(&mut self, target: MarkerKind, node: NodeId) -> EvalResult<()> {
        let keyword = if target == MarkerKind::Break {
            "break"
        } else {
            "continue"
        };
        loop {
            let Some(item) = self.agenda.pop() else {
                return Err(self.at(control_outside_loop(keyword), node));
            };
            match item {
                item if item.is_marker(target) => {
                    self.stash.push(Value::Undefined);
                    return Ok(());
                }
                Item::Instr(Instr::Marker(MarkerKind::Call)) => {
                    return Err(self.at(control_outside_loop(keyword), node));
                }
                restore @ Item::Instr(Instr::Environment { .. }) => {
                    let resume = if target == MarkerKind::Break {
                        instr::break_(node)
                    } else {
                        instr::continue_(node)
                    };
                    self.agenda.push(resume);
                    self.agenda.push(restore);
                    return Ok(());
                }
                _ => {}
            }
        }
    }
}
