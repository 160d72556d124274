use super::*;
use crate::errors::EvalErrorKind;
use crate::instr::{self, Instr, MarkerKind};
use pretty_assertions::assert_eq;
use sable_ir::NodeId;

#[test]
fn test_extend_rev_runs_first_item_first() {
    let mut agenda = Agenda::new();
    agenda.extend_rev([
        instr::node(NodeId::new(1)),
        instr::node(NodeId::new(2)),
        instr::pop(),
    ]);
    assert_eq!(agenda.len(), 3);
    assert!(matches!(agenda.pop(), Some(Item::Node(id)) if id == NodeId::new(1)));
    assert!(matches!(agenda.pop(), Some(Item::Node(id)) if id == NodeId::new(2)));
    assert!(matches!(agenda.pop(), Some(Item::Instr(Instr::Pop))));
    assert!(agenda.pop().is_none());
}

#[test]
fn test_iter_is_top_first() {
    let mut agenda = Agenda::new();
    agenda.push(instr::marker(MarkerKind::Call));
    agenda.push(instr::reset());
    let kinds: Vec<_> = agenda
        .iter()
        .map(|item| match item {
            Item::Instr(i) => i.describe(),
            Item::Node(_) => "node",
        })
        .collect();
    assert_eq!(kinds, vec!["reset", "call marker"]);
    assert!(agenda.iter().nth(1).is_some_and(|i| i.is_marker(MarkerKind::Call)));
}

#[test]
fn test_stash_underflow_is_an_error() {
    let mut stash = Stash::new();
    let err = stash.pop().expect_err("empty stash");
    assert_eq!(err.kind, EvalErrorKind::StashUnderflow);
    assert!(stash.peek().is_err());
    assert!(stash.pop_n(1).is_err());
}

#[test]
fn test_pop_n_keeps_order() {
    let mut stash = Stash::new();
    for n in 0..5 {
        stash.push(Value::Number(f64::from(n)));
    }
    let args = stash.pop_n(3).expect("three values");
    assert_eq!(
        args.as_slice(),
        &[Value::Number(2.0), Value::Number(3.0), Value::Number(4.0)]
    );
    assert_eq!(stash.len(), 2);
    assert_eq!(stash.pop_n(0).expect("zero values").len(), 0);
}

#[test]
fn test_clone_is_independent() {
    let mut stash = Stash::new();
    stash.push(Value::Null);
    let snapshot = stash.clone();
    stash.push(Value::Bool(true));
    assert_eq!(snapshot.len(), 1);
    assert_eq!(stash.len(), 2);
}
