use super::*;
use pretty_assertions::assert_eq;

#[test]
fn builder_keeps_labels_in_order() {
    let diag = Diagnostic::new(ErrorCode::E7003)
        .with_message("undefined variable `x`")
        .with_secondary_label(Span::new(0, 3), "declared in another function")
        .with_label(Span::new(4, 5), "`x` is not in scope");

    assert_eq!(diag.primary_span(), Some(Span::new(4, 5)));
    assert_eq!(
        diag.labels,
        vec![
            Label::secondary(Span::new(0, 3), "declared in another function"),
            Label::primary(Span::new(4, 5), "`x` is not in scope"),
        ]
    );
}

#[test]
fn call_chain_keeps_insertion_order() {
    let diag = Diagnostic::new(ErrorCode::E7301)
        .with_call("g(3)", Span::new(10, 14))
        .with_call("g(2)", Span::new(20, 24));
    let calls: Vec<&str> = diag.call_chain.iter().map(|c| c.call.as_str()).collect();
    assert_eq!(calls, vec!["g(3)", "g(2)"]);
    assert_eq!(diag.primary_span(), None);
}

#[test]
fn display_lists_every_part() {
    let diag = Diagnostic::new(ErrorCode::E7004)
        .with_message("assignment to constant `k`")
        .with_label(Span::new(10, 15), "cannot assign to `k`")
        .with_call("f()", Span::new(0, 3))
        .with_note("`k` was declared with `const`")
        .with_suggestion("declare `k` with `let`");

    assert_eq!(
        diag.to_string(),
        "error[E7004]: assignment to constant `k`\n  \
         --> 10..15: cannot assign to `k`\n  \
         = in f() at 0..3\n  \
         = note: `k` was declared with `const`\n  \
         = help: declare `k` with `let`"
    );
}
