use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_line_from_offset() {
    let table = LineOffsetTable::build("ab\ncd\n\nef");
    assert_eq!(table.line_count(), 4);
    assert_eq!(table.line_from_offset(0), 1);
    assert_eq!(table.line_from_offset(2), 1);
    assert_eq!(table.line_from_offset(3), 2);
    assert_eq!(table.line_from_offset(6), 3);
    assert_eq!(table.line_from_offset(7), 4);
    assert_eq!(table.line_from_offset(100), 4);
}

#[test]
fn test_columns_count_characters() {
    let source = "const é = 1;\né;";
    let table = LineOffsetTable::build(source);
    // `=` is the 9th character but the 10th byte
    assert_eq!(table.offset_to_line_col(source, 9), (1, 9));
    let second_line = u32::try_from(source.find('\n').unwrap_or(0) + 1).unwrap_or(0);
    assert_eq!(table.offset_to_line_col(source, second_line), (2, 1));
}

#[test]
fn test_offset_past_end_clamps() {
    let source = "x;";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.offset_to_line_col(source, 40), (1, 3));
}

#[test]
fn test_line_text() {
    let source = "first\nsecond\nthird";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.line_text(source, 1), Some("first"));
    assert_eq!(table.line_text(source, 2), Some("second"));
    assert_eq!(table.line_text(source, 3), Some("third"));
    assert_eq!(table.line_text(source, 0), None);
    assert_eq!(table.line_text(source, 4), None);
}

#[test]
fn test_span_to_line_col() {
    assert_eq!(span_to_line_col("a\nbc", Span::new(3, 4)), (2, 2));
}
