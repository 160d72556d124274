use super::*;
use pretty_assertions::assert_eq;
use sable_ir::StringInterner;

fn names() -> (StringInterner, Name, Name) {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");
    (interner, x, y)
}

#[test]
fn test_define_and_lookup() {
    let (_interner, x, _) = names();
    let env = Env::root(EnvId::new(0), "global");
    env.define(x, Value::Number(42.0), Mutability::Immutable)
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(env.lookup(x), Ok(Value::Number(42.0)));
}

#[test]
fn test_declared_slot_is_in_temporal_dead_zone() {
    let (_interner, x, _) = names();
    let outer = Env::root(EnvId::new(0), "global");
    assert_eq!(outer.define(x, Value::from("outer"), Mutability::Mutable), Ok(()));

    let inner = outer.child(EnvId::new(1), "block");
    assert_eq!(inner.declare(x, Mutability::Mutable), Ok(()));

    // the inner declaration shadows the outer value even before it runs
    assert_eq!(inner.lookup(x), Err(ScopeError::Uninitialized));
    assert_eq!(
        inner.assign(x, Value::Number(1.0)),
        Err(ScopeError::Uninitialized)
    );

    assert_eq!(inner.initialize(x, Value::Number(2.0)), Ok(()));
    assert_eq!(inner.lookup(x), Ok(Value::Number(2.0)));
    assert_eq!(outer.lookup(x), Ok(Value::from("outer")));
}

#[test]
fn test_redeclaration_in_same_frame() {
    let (_interner, x, _) = names();
    let env = Env::root(EnvId::new(0), "program");
    assert_eq!(env.declare(x, Mutability::Mutable), Ok(()));
    assert_eq!(
        env.declare(x, Mutability::Immutable),
        Err(ScopeError::Redeclaration)
    );
    assert_eq!(
        env.define(x, Value::Null, Mutability::Mutable),
        Err(ScopeError::Redeclaration)
    );
}

#[test]
fn test_assign_walks_chain_and_respects_const() {
    let (_interner, x, y) = names();
    let root = Env::root(EnvId::new(0), "global");
    assert_eq!(root.define(x, Value::Number(1.0), Mutability::Mutable), Ok(()));
    assert_eq!(root.define(y, Value::Number(1.0), Mutability::Immutable), Ok(()));

    let child = root.child(EnvId::new(1), "block");
    assert_eq!(child.assign(x, Value::Number(5.0)), Ok(()));
    assert_eq!(root.lookup(x), Ok(Value::Number(5.0)));
    assert_eq!(child.assign(y, Value::Number(5.0)), Err(ScopeError::Const));
    assert_eq!(root.lookup(y), Ok(Value::Number(1.0)));
}

#[test]
fn test_undefined_name() {
    let (interner, _, _) = names();
    let z = interner.intern("z");
    let env = Env::root(EnvId::new(0), "global").child(EnvId::new(1), "block");
    assert_eq!(env.lookup(z), Err(ScopeError::Undefined));
    assert_eq!(env.assign(z, Value::Null), Err(ScopeError::Undefined));
    assert_eq!(env.initialize(z, Value::Null), Err(ScopeError::Undefined));
}

#[test]
fn test_copy_bindings_is_independent_sibling() {
    let (_interner, x, y) = names();
    let root = Env::root(EnvId::new(0), "global");
    assert_eq!(root.define(y, Value::Number(7.0), Mutability::Mutable), Ok(()));
    let first = root.child(EnvId::new(1), "for");
    assert_eq!(first.define(x, Value::Number(0.0), Mutability::Mutable), Ok(()));

    let second = first.copy_bindings(EnvId::new(2), &[x]);
    assert_eq!(second.assign(x, Value::Number(1.0)), Ok(()));

    assert_eq!(first.lookup(x), Ok(Value::Number(0.0)));
    assert_eq!(second.lookup(x), Ok(Value::Number(1.0)));
    assert_eq!(second.lookup(y), Ok(Value::Number(7.0)));
    assert_eq!(second.depth(), first.depth());
    assert_eq!(second.name(), "for");
}

#[test]
fn test_receiver_is_found_through_blocks() {
    let root = Env::root(EnvId::new(0), "global");
    let this = Value::array(vec![Value::Number(1.0)]);
    let call = root.call(EnvId::new(1), "f", NodeId::new(3), Some(this.clone()));
    let block = call.child(EnvId::new(2), "block");

    assert_eq!(block.receiver(), Some(this));
    assert_eq!(root.receiver(), None);
    assert_eq!(call.call_site(), Some(NodeId::new(3)));
    assert_eq!(block.call_site(), None);
}

#[test]
fn test_handles_share_frame() {
    let (_interner, x, _) = names();
    let env = Env::root(EnvId::new(0), "global");
    let alias = env.clone();
    assert_eq!(alias.define(x, Value::Bool(true), Mutability::Mutable), Ok(()));
    assert_eq!(env.lookup(x), Ok(Value::Bool(true)));
    assert_eq!(env, alias);
    assert_eq!(format!("{env:?}"), "Env(0, \"global\")");
}

#[test]
fn test_mutability_from_decl_kind() {
    assert_eq!(Mutability::from(DeclKind::Let), Mutability::Mutable);
    assert_eq!(Mutability::from(DeclKind::Const), Mutability::Immutable);
    assert!(Mutability::Mutable.is_mutable());
}

#[test]
fn test_local_scope_clone_shares_allocation() {
    let scope1 = LocalScope::new(42);
    let scope2 = scope1.clone();
    *scope1.borrow_mut() = 100;
    assert_eq!(*scope2.borrow(), 100);
    assert!(scope1.ptr_eq(&scope2));
}
