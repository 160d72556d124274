use super::*;

#[test]
fn test_every_code_is_documented() {
    for code in ErrorCode::ALL {
        assert!(ErrorDocs::has_docs(*code), "{code} has no documentation");
    }
    assert_eq!(ErrorDocs::all_codes().count(), ErrorCode::ALL.len());
}

#[test]
fn test_doc_title_names_the_code() {
    for code in ErrorCode::ALL {
        let doc = ErrorDocs::get(*code).unwrap_or_default();
        assert!(
            doc.starts_with(&format!("# {}:", code.as_str())),
            "{code} doc has an unexpected title"
        );
    }
}

#[test]
fn test_stack_overflow_doc_mentions_tail_position() {
    let doc = ErrorDocs::get(ErrorCode::E7301).unwrap_or_default();
    assert!(doc.contains("tail position"));
}
