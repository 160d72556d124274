//! Property tests for the machine's structural guarantees.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::collections::HashSet;

use proptest::prelude::*;
use sable_eval::{silent_handler, EvalErrorKind, EvalResult, Machine, Outcome, Value};
use sable_ir::{Ast, AstBuilder, BinaryOp, NodeId};

fn run(ast: &Ast) -> EvalResult<Value> {
    Machine::builder()
        .print_handler(silent_handler())
        .build(ast)
        .run_to_completion()
}

/// `const f = (x, y) => x <= 0 ? y : f(x - 1, y + 1); f(x, y);`
fn tail_sum(x: u32, y: u32) -> Ast {
    let mut b = AstBuilder::new();
    let px = b.ident("x");
    let zero = b.num(0.0);
    let done = b.binary(BinaryOp::LtEq, px, zero);
    let py = b.ident("y");
    let px = b.ident("x");
    let one = b.num(1.0);
    let x_minus = b.binary(BinaryOp::Sub, px, one);
    let py2 = b.ident("y");
    let one = b.num(1.0);
    let y_plus = b.binary(BinaryOp::Add, py2, one);
    let recur = b.call_named("f", vec![x_minus, y_plus]);
    let body = b.conditional(done, py, recur);
    let f = b.arrow(&["x", "y"], body);
    let decl = b.const_("f", f);
    let ax = b.num(f64::from(x));
    let ay = b.num(f64::from(y));
    let call = b.call_named("f", vec![ax, ay]);
    let stmt = b.expr_stmt(call);
    b.program(vec![decl, stmt]).unwrap()
}

/// `const g = n => n <= 0 ? 0 : 1 + g(n - 1); g(n);`
fn counting(n: u32) -> Ast {
    let mut b = AstBuilder::new();
    let pn = b.ident("n");
    let zero = b.num(0.0);
    let done = b.binary(BinaryOp::LtEq, pn, zero);
    let base = b.num(0.0);
    let pn = b.ident("n");
    let one = b.num(1.0);
    let n_minus = b.binary(BinaryOp::Sub, pn, one);
    let recur = b.call_named("g", vec![n_minus]);
    let one = b.num(1.0);
    let add = b.binary(BinaryOp::Add, one, recur);
    let body = b.conditional(done, base, add);
    let g = b.arrow(&["n"], body);
    let decl = b.const_("g", g);
    let arg = b.num(f64::from(n));
    let call = b.call_named("g", vec![arg]);
    let stmt = b.expr_stmt(call);
    b.program(vec![decl, stmt]).unwrap()
}

/// `let v = outer; { v; let v = inner; }` (or without the inner binding).
fn shadowed_read(name: &str, outer: i32, inner: Option<i32>) -> (Ast, NodeId) {
    let mut b = AstBuilder::new();
    let value = b.num(f64::from(outer));
    let decl = b.let_(name, value);
    let read = b.ident(name);
    let stmt = b.expr_stmt(read);
    let mut body = vec![stmt];
    if let Some(inner) = inner {
        let value = b.num(f64::from(inner));
        body.push(b.let_(name, value));
    }
    let block = b.block(body);
    (b.program(vec![decl, block]).unwrap(), read)
}

/// `const closures = [];
///  for (let i = start; i < start + count; i = i + 1) { closures.push(() => i); }
///  closures[pick]();`
fn captured_iterations(start: i32, count: i32, pick: i32) -> Ast {
    let mut b = AstBuilder::new();
    let empty = b.array(vec![]);
    let decl = b.const_("closures", empty);
    let from = b.num(f64::from(start));
    let init = b.let_("i", from);
    let i = b.ident("i");
    let end = b.num(f64::from(start + count));
    let test = b.binary(BinaryOp::Lt, i, end);
    let i = b.ident("i");
    let one = b.num(1.0);
    let next = b.binary(BinaryOp::Add, i, one);
    let update = b.assign("i", next);
    let i = b.ident("i");
    let capture = b.arrow(&[], i);
    let closures = b.ident("closures");
    let push = b.method_call(closures, "push", vec![capture]);
    let push = b.expr_stmt(push);
    let body = b.block(vec![push]);
    let lp = b.for_(Some(init), Some(test), Some(update), body);
    let closures = b.ident("closures");
    let index = b.num(f64::from(pick));
    let chosen = b.index(closures, index);
    let call = b.call(chosen, vec![]);
    let stmt = b.expr_stmt(call);
    b.program(vec![decl, lp, stmt]).unwrap()
}

/// ```text
/// let s = 0;
/// for (let i = 0; i < n; i = i + 1) {
///   let t = i;
///   if (t % 2 === 0) { let u = t * 10; s = s + u; continue; }
///   if (t === stop) { break; }
///   s = s + t;
/// }
/// <result>;
/// ```
fn nested_control(n: u32, stop: u32, result: &str) -> Ast {
    let mut b = AstBuilder::new();
    let zero = b.num(0.0);
    let decl_s = b.let_("s", zero);
    let zero = b.num(0.0);
    let init = b.let_("i", zero);
    let i = b.ident("i");
    let limit = b.num(f64::from(n));
    let test = b.binary(BinaryOp::Lt, i, limit);
    let i = b.ident("i");
    let one = b.num(1.0);
    let next = b.binary(BinaryOp::Add, i, one);
    let update = b.assign("i", next);

    let i = b.ident("i");
    let decl_t = b.let_("t", i);

    let t = b.ident("t");
    let two = b.num(2.0);
    let rem = b.binary(BinaryOp::Mod, t, two);
    let zero = b.num(0.0);
    let even = b.binary(BinaryOp::StrictEq, rem, zero);
    let t = b.ident("t");
    let ten = b.num(10.0);
    let scaled = b.binary(BinaryOp::Mul, t, ten);
    let decl_u = b.let_("u", scaled);
    let s = b.ident("s");
    let u = b.ident("u");
    let add_u = b.binary(BinaryOp::Add, s, u);
    let set_u = b.assign("s", add_u);
    let set_u = b.expr_stmt(set_u);
    let cont = b.continue_();
    let even_block = b.block(vec![decl_u, set_u, cont]);
    let even_check = b.if_(even, even_block, None);

    let t = b.ident("t");
    let at = b.num(f64::from(stop));
    let hit = b.binary(BinaryOp::StrictEq, t, at);
    let brk = b.break_();
    let stop_block = b.block(vec![brk]);
    let stop_check = b.if_(hit, stop_block, None);

    let s = b.ident("s");
    let t = b.ident("t");
    let add_t = b.binary(BinaryOp::Add, s, t);
    let set_t = b.assign("s", add_t);
    let set_t = b.expr_stmt(set_t);

    let body = b.block(vec![decl_t, even_check, stop_check, set_t]);
    let lp = b.for_(Some(init), Some(test), Some(update), body);
    let read = b.ident(result);
    let read = b.expr_stmt(read);
    b.program(vec![decl_s, lp, read]).unwrap()
}

fn nested_control_reference(n: u32, stop: u32) -> f64 {
    let mut s = 0;
    for i in 0..n {
        if i % 2 == 0 {
            s += i * 10;
            continue;
        }
        if i == stop {
            break;
        }
        s += i;
    }
    f64::from(s)
}

/// A left-nested chain of binary operators over numbers and strings.
fn operator_chain(first: Option<i32>, rest: &[(usize, Option<i32>)]) -> Ast {
    const OPS: [BinaryOp; 6] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Lt,
        BinaryOp::StrictEq,
    ];
    fn leaf(b: &mut AstBuilder, value: Option<i32>) -> NodeId {
        match value {
            Some(n) => b.num(f64::from(n)),
            None => b.str("s"),
        }
    }

    let mut b = AstBuilder::new();
    let mut acc = leaf(&mut b, first);
    for &(op, value) in rest {
        let right = leaf(&mut b, value);
        acc = b.binary(OPS[op % OPS.len()], acc, right);
    }
    let stmt = b.expr_stmt(acc);
    b.program(vec![stmt]).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn tail_recursion_runs_in_one_frame(x in 0u32..6000, y in 0u32..1000) {
        let ast = tail_sum(x, y);
        let mut machine = Machine::builder().print_handler(silent_handler()).build(&ast);
        let mut max_depth = 0;
        let value = loop {
            max_depth = max_depth.max(machine.call_depth());
            if let Some(Outcome::Finished(value)) = machine.step().unwrap() {
                break value;
            }
        };
        prop_assert_eq!(value, Value::Number(f64::from(x + y)));
        prop_assert!(max_depth <= 1);
    }

    #[test]
    fn overflow_reports_distinct_recent_frames(limit in 5usize..60) {
        let ast = counting(u32::try_from(limit * 2).unwrap());
        let err = Machine::builder()
            .print_handler(silent_handler())
            .max_call_depth(limit)
            .build(&ast)
            .run_to_completion()
            .unwrap_err();
        let EvalErrorKind::StackOverflow { limit: reported, frames } = &err.kind else {
            panic!("expected overflow, got {err:?}");
        };
        prop_assert_eq!(*reported, limit);
        let distinct: HashSet<String> = frames.iter().map(ToString::to_string).collect();
        prop_assert!(distinct.len() >= 3);
        prop_assert!(frames.iter().all(|frame| frame.callee == "g"));
    }

    #[test]
    fn inner_binding_shadows_from_block_entry(
        name in "[a-z]{1,8}",
        outer in -1000i32..1000,
        inner in -1000i32..1000,
    ) {
        let (ast, read) = shadowed_read(&name, outer, Some(inner));
        let err = run(&ast).unwrap_err();
        prop_assert_eq!(err.kind, EvalErrorKind::UninitializedAccess { name: name.clone() });
        prop_assert_eq!(err.node, Some(read));

        let (ast, _) = shadowed_read(&name, outer, None);
        prop_assert_eq!(run(&ast).unwrap(), Value::Number(f64::from(outer)));
    }

    #[test]
    fn each_iteration_captures_its_own_binding(
        start in -50i32..50,
        (count, pick) in (1i32..10).prop_flat_map(|count| (Just(count), 0..count)),
    ) {
        let ast = captured_iterations(start, count, pick);
        prop_assert_eq!(run(&ast).unwrap(), Value::Number(f64::from(start + pick)));
    }

    #[test]
    fn break_and_continue_unwind_nested_scopes(n in 0u32..30, stop in 0u32..30) {
        let ast = nested_control(n, stop, "s");
        prop_assert_eq!(run(&ast).unwrap(), Value::Number(nested_control_reference(n, stop)));

        for leaked in ["t", "u", "i"] {
            let ast = nested_control(n, stop, leaked);
            let err = run(&ast).unwrap_err();
            prop_assert_eq!(err.kind, EvalErrorKind::UndefinedVariable { name: leaked.to_string() });
        }
    }

    #[test]
    fn fresh_runs_are_identical(
        first in proptest::option::of(-100i32..100),
        rest in proptest::collection::vec((0usize..6, proptest::option::of(-100i32..100)), 0..12),
    ) {
        let ast = operator_chain(first, &rest);
        // Debug text, since NaN results never compare equal
        let once = format!("{:?}", run(&ast));
        let twice = format!("{:?}", run(&ast));
        prop_assert_eq!(once, twice);
    }
}
