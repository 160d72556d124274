use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_format_number() {
    assert_eq!(format_number(10000.0), "10000");
    assert_eq!(format_number(0.5), "0.5");
    assert_eq!(format_number(-0.0), "0");
    assert_eq!(format_number(f64::NAN), "NaN");
    assert_eq!(format_number(f64::INFINITY), "Infinity");
    assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
}

#[test]
fn test_format_number_uses_exponents_at_the_extremes() {
    assert_eq!(format_number(1e21), "1e+21");
    assert_eq!(format_number(-1.5e300), "-1.5e+300");
    assert_eq!(format_number(1e20), "100000000000000000000");
    assert_eq!(format_number(0.000_001), "0.000001");
    assert_eq!(format_number(1.5e-7), "1.5e-7");
    assert_eq!(format_number(5e-324), "5e-324");
}

#[test]
fn test_stringify_nested() {
    let mut object = Object::new();
    object.set("a".into(), Value::Number(1.0));
    object.set("b".into(), Value::array(vec![Value::from("x"), Value::Null]));
    let value = Value::object(object);
    assert_eq!(value.stringify(), r#"{ "a": 1, "b": ["x", null] }"#);
    assert_eq!(Value::object(Object::new()).stringify(), "{}");
}

#[test]
fn test_display_string_is_raw_at_top_level() {
    assert_eq!(Value::from("hi").to_display_string(), "hi");
    assert_eq!(Value::from("hi").stringify(), "\"hi\"");
    assert_eq!(
        Value::array(vec![Value::from("hi")]).to_display_string(),
        "[\"hi\"]"
    );
}

fn array_cells(value: &Value) -> Rc<RefCell<Vec<Value>>> {
    match value {
        Value::Array(cells) => Rc::clone(cells),
        _ => unreachable!(),
    }
}

#[test]
fn test_self_referencing_values_print_a_marker() {
    let xs = Value::array(Vec::new());
    let cells = array_cells(&xs);
    cells.borrow_mut().extend(vec![xs.clone(); 4]);
    assert_eq!(
        xs.stringify(),
        "[<circular>, <circular>, <circular>, <circular>]"
    );

    let object = Value::object(Object::new());
    if let Value::Object(fields) = &object {
        fields.borrow_mut().set("me".into(), object.clone());
        fields.borrow_mut().set("list".into(), xs.clone());
    }
    assert_eq!(
        object.stringify(),
        r#"{ "me": <circular>, "list": [<circular>, <circular>, <circular>, <circular>] }"#
    );

    // break the cycles so the test does not leak
    cells.borrow_mut().clear();
    if let Value::Object(fields) = &object {
        *fields.borrow_mut() = Object::new();
    }
}

#[test]
fn test_shared_substructure_is_not_circular_and_output_is_bounded() {
    let leaf = Value::array(vec![Value::Number(1.0)]);
    let pair = Value::array(vec![leaf.clone(), leaf]);
    assert_eq!(pair.stringify(), "[[1], [1]]");

    let mut wide = Value::Number(0.0);
    for _ in 0..MAX_PRINT_DEPTH {
        wide = Value::array(vec![wide.clone(), wide.clone(), wide.clone(), wide]);
    }
    let text = wide.stringify();
    assert!(text.ends_with("...]"), "{}", &text[text.len() - 40..]);
    assert!(text.len() < MAX_PRINT_VALUES * 16);
}

#[test]
fn test_strict_equality() {
    assert!(Value::from("a").strict_equals(&Value::from("a")));
    assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
    assert!(!Value::Number(1.0).strict_equals(&Value::from("1")));
    assert!(Value::Undefined.strict_equals(&Value::Undefined));
    assert!(!Value::Undefined.strict_equals(&Value::Null));

    let a = Value::array(vec![]);
    let b = Value::array(vec![]);
    assert!(a.strict_equals(&a.clone()));
    assert!(!a.strict_equals(&b));
}

#[test]
fn test_coercions() {
    assert!(!Value::Number(0.0).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(Value::array(vec![]).is_truthy());
    assert_eq!(Value::from(" 42 ").to_number(), 42.0);
    assert_eq!(Value::from("").to_number(), 0.0);
    assert!(Value::from("x").to_number().is_nan());
    assert_eq!(Value::Bool(true).to_number(), 1.0);
    assert!(Value::Undefined.to_number().is_nan());
}

#[test]
fn test_as_index() {
    assert_eq!(Value::Number(3.0).as_index(), Some(3));
    assert_eq!(Value::Number(-1.0).as_index(), None);
    assert_eq!(Value::Number(1.5).as_index(), None);
    assert_eq!(Value::from("1").as_index(), None);
}

#[test]
fn test_describe() {
    assert_eq!(Value::from("a").describe(), "string \"a\"");
    assert_eq!(Value::Number(2.0).describe(), "number 2");
    assert_eq!(Value::Undefined.describe(), "undefined");
}

#[test]
fn test_object_overwrite_keeps_order() {
    let mut object = Object::new();
    object.set("x".into(), Value::Number(1.0));
    object.set("y".into(), Value::Number(2.0));
    object.set("x".into(), Value::Number(3.0));
    let keys: Vec<_> = object.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec!["x".to_string(), "y".to_string()]);
    assert_eq!(object.get("x"), Some(&Value::Number(3.0)));
    assert_eq!(object.len(), 2);
}
