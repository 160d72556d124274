use std::time::Duration;

use pretty_assertions::assert_eq;
use sable_ir::{AstBuilder, BinaryOp};

use super::*;
use crate::errors::EvalErrorKind;
use crate::instr::{Instr, MarkerKind};
use crate::print_handler::silent_handler;

fn machine(ast: &Ast) -> Machine<'_> {
    Machine::builder().print_handler(silent_handler()).build(ast)
}

/// `const f = (x, y) => x <= 0 ? y : f(x - 1, y + 1);`
fn tail_sum(b: &mut AstBuilder) -> NodeId {
    let x = b.ident("x");
    let zero = b.num(0.0);
    let done = b.binary(BinaryOp::LtEq, x, zero);
    let y = b.ident("y");
    let x = b.ident("x");
    let one = b.num(1.0);
    let x_minus = b.binary(BinaryOp::Sub, x, one);
    let y = b.ident("y");
    let one = b.num(1.0);
    let y_plus = b.binary(BinaryOp::Add, y, one);
    let recur = b.call_named("f", vec![x_minus, y_plus]);
    let body = b.conditional(done, y, recur);
    let arrow = b.arrow(&["x", "y"], body);
    b.const_("f", arrow)
}

/// `const g = (n) => n <= 0 ? 0 : 1 + g(n - 1);`
fn counting(b: &mut AstBuilder) -> NodeId {
    let n = b.ident("n");
    let zero = b.num(0.0);
    let done = b.binary(BinaryOp::LtEq, n, zero);
    let base = b.num(0.0);
    let n = b.ident("n");
    let one = b.num(1.0);
    let n_minus = b.binary(BinaryOp::Sub, n, one);
    let recur = b.call_named("g", vec![n_minus]);
    let one = b.num(1.0);
    let sum = b.binary(BinaryOp::Add, one, recur);
    let body = b.conditional(done, base, sum);
    let arrow = b.arrow(&["n"], body);
    b.const_("g", arrow)
}

/// Step to completion, recording the deepest call stack and longest agenda.
fn step_all(m: &mut Machine<'_>) -> (Value, usize, usize) {
    let mut max_depth = 0;
    let mut max_agenda = 0;
    loop {
        max_depth = max_depth.max(m.call_depth());
        max_agenda = max_agenda.max(m.agenda().len());
        if let Some(Outcome::Finished(value)) = m.step().unwrap() {
            return (value, max_depth, max_agenda);
        }
    }
}

#[test]
fn test_binary_decomposes_left_then_right() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let two = b.num(2.0);
    let sum = b.binary(BinaryOp::Sub, one, two);
    let stmt = b.expr_stmt(sum);
    let ast = b.program(vec![stmt]).unwrap();
    let mut m = machine(&ast);

    // program, statement, binary node
    for _ in 0..3 {
        assert_eq!(m.step().unwrap(), None);
    }
    let pending: Vec<_> = m.agenda().iter().take(3).map(describe).collect();
    assert_eq!(pending, vec!["node 0", "node 1", "binary"]);
    assert_eq!(m.run().unwrap(), Outcome::Finished(Value::Number(-1.0)));
}

fn describe(item: &Item) -> String {
    match item {
        Item::Node(node) => format!("node {}", node.raw()),
        Item::Instr(instr) => instr.describe().to_string(),
    }
}

#[test]
fn test_tail_calls_run_in_constant_space() {
    let mut b = AstBuilder::new();
    let decl = tail_sum(&mut b);
    let x = b.num(300.0);
    let y = b.num(300.0);
    let call = b.call_named("f", vec![x, y]);
    let stmt = b.expr_stmt(call);
    let ast = b.program(vec![decl, stmt]).unwrap();
    let mut m = machine(&ast);

    let (value, max_depth, max_agenda) = step_all(&mut m);
    assert_eq!(value, Value::Number(600.0));
    assert_eq!(max_depth, 1);
    assert!(max_agenda < 16, "agenda grew to {max_agenda}");
    assert_eq!(m.call_depth(), 0);
}

#[test]
fn test_non_tail_calls_grow_and_unwind_the_call_stack() {
    let mut b = AstBuilder::new();
    let decl = counting(&mut b);
    let n = b.num(50.0);
    let call = b.call_named("g", vec![n]);
    let stmt = b.expr_stmt(call);
    let ast = b.program(vec![decl, stmt]).unwrap();
    let mut m = machine(&ast);

    let (value, max_depth, _) = step_all(&mut m);
    assert_eq!(value, Value::Number(50.0));
    assert_eq!(max_depth, 51);
    assert_eq!(m.call_depth(), 0);
}

#[test]
fn test_overflow_names_recent_calls() {
    let mut b = AstBuilder::new();
    let decl = counting(&mut b);
    let n = b.num(100.0);
    let call = b.call_named("g", vec![n]);
    let stmt = b.expr_stmt(call);
    let ast = b.program(vec![decl, stmt]).unwrap();
    let mut m = Machine::builder()
        .print_handler(silent_handler())
        .max_call_depth(20)
        .trace_frames(3)
        .build(&ast);

    let err = m.run().unwrap_err();
    let EvalErrorKind::StackOverflow { limit, frames } = &err.kind else {
        panic!("expected stack overflow, got {err:?}");
    };
    assert_eq!(*limit, 20);
    let calls: Vec<String> = frames.iter().map(ToString::to_string).collect();
    assert_eq!(calls, vec!["g(82)", "g(81)", "g(80)"]);
    assert!(err.span.is_some());
    assert!(err.backtrace.is_some());
}

#[test]
fn test_return_in_tail_position_consumes_call_marker() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let ret = b.ret(Some(one));
    let decl = b.function_decl("f", &[], vec![ret]);
    let call = b.call_named("f", vec![]);
    let stmt = b.expr_stmt(call);
    let ast = b.program(vec![decl, stmt]).unwrap();
    let mut m = machine(&ast);

    while m.current_node() != Some(ret) {
        m.step().unwrap();
    }
    assert!(!m.agenda().iter().any(|item| item.is_marker(MarkerKind::Call)));
    assert!(!m
        .agenda()
        .iter()
        .any(|item| matches!(item, Item::Instr(Instr::Reset))));
    assert_eq!(m.run().unwrap(), Outcome::Finished(Value::Number(1.0)));
}

#[test]
fn test_return_inside_loop_resets_to_call_marker() {
    let mut b = AstBuilder::new();
    let t = b.bool(true);
    let one = b.num(1.0);
    let ret = b.ret(Some(one));
    let body = b.block(vec![ret]);
    let lp = b.while_(t, body);
    let two = b.num(2.0);
    let after = b.expr_stmt(two);
    let decl = b.function_decl("f", &[], vec![lp, after]);
    let call = b.call_named("f", vec![]);
    let stmt = b.expr_stmt(call);
    let ast = b.program(vec![decl, stmt]).unwrap();
    let mut m = machine(&ast);

    while m.current_node() != Some(ret) {
        m.step().unwrap();
    }
    assert!(matches!(
        m.agenda().iter().nth(1),
        Some(Item::Instr(Instr::Reset))
    ));
    assert_eq!(m.run().unwrap(), Outcome::Finished(Value::Number(1.0)));
    assert_eq!(m.call_depth(), 0);
}

#[test]
fn test_break_runs_scope_restore_before_unwinding() {
    // let i = 0; while (true) { let j = i; i = j + 1; if (i === 3) { break; } } i;
    let mut b = AstBuilder::new();
    let zero = b.num(0.0);
    let decl_i = b.let_("i", zero);
    let t = b.bool(true);
    let i = b.ident("i");
    let decl_j = b.let_("j", i);
    let j = b.ident("j");
    let one = b.num(1.0);
    let next = b.binary(BinaryOp::Add, j, one);
    let set = b.assign("i", next);
    let set = b.expr_stmt(set);
    let i = b.ident("i");
    let three = b.num(3.0);
    let test = b.binary(BinaryOp::StrictEq, i, three);
    let brk = b.break_();
    let then = b.block(vec![brk]);
    let check = b.if_(test, then, None);
    let body = b.block(vec![decl_j, set, check]);
    let lp = b.while_(t, body);
    let i = b.ident("i");
    let result = b.expr_stmt(i);
    let ast = b.program(vec![decl_i, lp, result]).unwrap();
    let mut m = machine(&ast);

    loop {
        if matches!(m.agenda().peek(), Some(Item::Instr(Instr::Break { .. }))) {
            break;
        }
        m.step().unwrap();
    }
    let stash_before = m.stash().len();
    m.step().unwrap();
    let pending: Vec<_> = m.agenda().iter().take(2).map(describe).collect();
    assert_eq!(pending, vec!["environment", "break"]);
    assert_eq!(m.stash().len(), stash_before);

    assert_eq!(m.run().unwrap(), Outcome::Finished(Value::Number(3.0)));
}

#[test]
fn test_break_outside_loop_is_reported() {
    let mut b = AstBuilder::new();
    let brk = b.break_();
    let ast = b.program(vec![brk]).unwrap();
    let err = machine(&ast).run().unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ControlOutsideLoop { keyword: "break" }
    );
    assert_eq!(err.node, Some(brk));
}

#[test]
fn test_continue_cannot_cross_function_boundary() {
    // while (true) { (() => { continue; })(); }
    let mut b = AstBuilder::new();
    let t = b.bool(true);
    let cont = b.continue_();
    let f = b.arrow_block(&[], vec![cont]);
    let call = b.call(f, vec![]);
    let stmt = b.expr_stmt(call);
    let body = b.block(vec![stmt]);
    let lp = b.while_(t, body);
    let ast = b.program(vec![lp]).unwrap();

    let err = machine(&ast).run().unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ControlOutsideLoop {
            keyword: "continue"
        }
    );
}

#[test]
fn test_debugger_pauses_after_statement_and_resumes() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let first = b.expr_stmt(one);
    let dbg = b.debugger();
    let two = b.num(2.0);
    let last = b.expr_stmt(two);
    let ast = b.program(vec![first, dbg, last]).unwrap();
    let mut m = machine(&ast);

    assert_eq!(m.run().unwrap(), Outcome::Paused { node: dbg });
    assert_eq!(m.stash().last(), Some(&Value::Undefined));
    assert_eq!(m.run().unwrap(), Outcome::Finished(Value::Number(2.0)));
}

#[test]
fn test_span_breakpoint_pauses_once_before_statement() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let decl = b.let_("x", one);
    let x = b.ident("x");
    let ten = b.num(10.0);
    let sum = b.binary(BinaryOp::Add, x, ten);
    let target = b.expr_stmt(sum);
    let ast = b.program(vec![decl, target]).unwrap();
    let offset = ast.span(target).start;
    let mut m = Machine::builder()
        .print_handler(silent_handler())
        .breakpoints(SpanBreakpoints::new([offset]))
        .build(&ast);

    assert_eq!(m.run().unwrap(), Outcome::Paused { node: target });
    assert!(matches!(m.agenda().peek(), Some(Item::Node(n)) if *n == target));
    assert_eq!(m.run().unwrap(), Outcome::Finished(Value::Number(11.0)));
}

#[test]
fn test_breakpoint_closure_sees_node_stream() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let stmt = b.expr_stmt(one);
    let ast = b.program(vec![stmt]).unwrap();
    let mut m = Machine::builder()
        .print_handler(silent_handler())
        .breakpoints(|ast: &Ast, node: NodeId| matches!(ast.kind(node), sable_ir::NodeKind::Literal(_)))
        .build(&ast);

    assert_eq!(m.run().unwrap(), Outcome::Paused { node: one });
    assert_eq!(m.run_to_completion().unwrap(), Value::Number(1.0));
}

#[test]
fn test_start_and_resume_suspended() {
    let mut b = AstBuilder::new();
    let dbg = b.debugger();
    let s = b.str("done");
    let last = b.expr_stmt(s);
    let ast = b.program(vec![dbg, last]).unwrap();

    let Run::Paused(suspended) = machine(&ast).start().unwrap() else {
        panic!("expected a pause");
    };
    assert_eq!(suspended.node(), dbg);
    assert_eq!(suspended.span(), ast.span(dbg));
    let Run::Finished(value) = suspended.resume().unwrap() else {
        panic!("expected completion");
    };
    assert_eq!(value, Value::from("done"));
}

#[test]
fn test_step_limit_times_out() {
    let mut b = AstBuilder::new();
    let t = b.bool(true);
    let body = b.block(vec![]);
    let lp = b.while_(t, body);
    let ast = b.program(vec![lp]).unwrap();
    let mut m = Machine::builder()
        .print_handler(silent_handler())
        .step_limit(1000)
        .build(&ast);

    let err = m.run().unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Timeout { steps: 1001 });
    assert!(err.is_resource_error());
}

#[test]
fn test_time_limit_times_out() {
    let mut b = AstBuilder::new();
    let t = b.bool(true);
    let body = b.block(vec![]);
    let lp = b.while_(t, body);
    let ast = b.program(vec![lp]).unwrap();
    let mut m = Machine::builder()
        .print_handler(silent_handler())
        .config(MachineConfig {
            time_limit: Some(Duration::ZERO),
            deadline_check_interval: 1,
            ..MachineConfig::default()
        })
        .build(&ast);

    let err = m.run().unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Timeout { .. }));
}

#[test]
fn test_error_inside_call_carries_backtrace() {
    let mut b = AstBuilder::new();
    let y = b.ident("y");
    let f = b.arrow(&[], y);
    let decl = b.const_("f", f);
    let call = b.call_named("f", vec![]);
    let stmt = b.expr_stmt(call);
    let ast = b.program(vec![decl, stmt]).unwrap();

    let err = machine(&ast).run().unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable {
            name: "y".to_string()
        }
    );
    assert_eq!(err.span, Some(ast.span(y)));
    let backtrace = err.backtrace.unwrap();
    assert_eq!(backtrace.frames()[0].to_string(), "f()");
}

#[test]
fn test_method_call_passes_receiver() {
    // const xs = [1, 2]; xs.push(3);
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let two = b.num(2.0);
    let arr = b.array(vec![one, two]);
    let decl = b.const_("xs", arr);
    let xs = b.ident("xs");
    let three = b.num(3.0);
    let push = b.method_call(xs, "push", vec![three]);
    let stmt = b.expr_stmt(push);
    let ast = b.program(vec![decl, stmt]).unwrap();
    let mut m = machine(&ast);

    assert_eq!(m.run_to_completion().unwrap(), Value::Number(3.0));
    assert_eq!(m.stash().len(), 1);
}

#[test]
fn test_program_without_statements_is_undefined() {
    let b = AstBuilder::new();
    let ast = b.program(vec![]).unwrap();
    assert_eq!(machine(&ast).run().unwrap(), Outcome::Finished(Value::Undefined));
}

#[test]
fn test_stepping_a_finished_machine_is_stable() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let stmt = b.expr_stmt(one);
    let ast = b.program(vec![stmt]).unwrap();
    let mut m = machine(&ast);

    assert_eq!(m.run().unwrap(), Outcome::Finished(Value::Number(1.0)));
    assert!(m.is_finished());
    assert_eq!(
        m.step().unwrap(),
        Some(Outcome::Finished(Value::Number(1.0)))
    );
}
