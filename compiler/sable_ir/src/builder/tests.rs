use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_synthetic_spans_follow_allocation_order() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let two = b.num(2.0);
    let sum = b.binary(BinaryOp::Add, one, two);
    let stmt = b.expr_stmt(sum);
    let ast = b.program(vec![stmt]).expect("valid tree");

    assert_eq!(ast.span(one), Span::new(0, 1));
    assert_eq!(ast.span(two), Span::new(1, 2));
    assert_eq!(ast.span(sum), Span::new(2, 3));
    assert_eq!(ast.root(), NodeId::new(4));
}

#[test]
fn test_explicit_span_is_kept() {
    let mut b = AstBuilder::new();
    let lit = b.alloc_at(NodeKind::Literal(Literal::Null), Span::new(40, 44));
    let stmt = b.expr_stmt(lit);
    b.set_span(stmt, Span::new(40, 45));
    let ast = b.program(vec![stmt]).expect("valid tree");
    assert_eq!(ast.span(lit), Span::new(40, 44));
    assert_eq!(ast.span(stmt), Span::new(40, 45));
}

#[test]
fn test_function_decl_allocates_function_node() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let ret = b.ret(Some(x));
    let decl = b.function_decl("id", &["x"], vec![ret]);
    let ast = b.program(vec![decl]).expect("valid tree");

    let NodeKind::FunctionDeclaration { name, function } = ast.kind(decl) else {
        panic!("expected function declaration");
    };
    assert_eq!(ast.name(*name), "id");
    let NodeKind::Function { params, body, .. } = ast.kind(*function) else {
        panic!("expected function node");
    };
    assert_eq!(params.len(), 1);
    assert_eq!(body, &FunctionBody::Block(vec![ret]));
}

#[test]
fn test_method_call_builds_member_callee() {
    let mut b = AstBuilder::new();
    let obj = b.ident("xs");
    let arg = b.num(1.0);
    let call = b.method_call(obj, "push", vec![arg]);
    let stmt = b.expr_stmt(call);
    let ast = b.program(vec![stmt]).expect("valid tree");

    let NodeKind::Call { callee, args } = ast.kind(call) else {
        panic!("expected call");
    };
    assert_eq!(args, &vec![arg]);
    assert!(matches!(
        ast.kind(*callee),
        NodeKind::Member {
            property: MemberProperty::Named(_),
            ..
        }
    ));
}
