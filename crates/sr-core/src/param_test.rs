use super::*;

#[test]
fn test_literal_string_serializes_plain() {
    let json = serde_json::to_string(&ParamValue::str("alice")).unwrap();
    assert_eq!(json, r#""alice""#);
}

#[test]
fn test_var_ref_carries_tag() {
    let json = serde_json::to_string(&ParamValue::var("frappe.session.user")).unwrap();
    assert_eq!(json, r#""__varref__:frappe.session.user""#);

    let back: ParamValue = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ParamValue::var("frappe.session.user"));
}

#[test]
fn test_param_map_mixed_values() {
    let json = r#"{"limit": 20, "name": "u1", "flag": true, "owner": "__varref__:user", "x": null}"#;
    let map: ParamMap = serde_json::from_str(json).unwrap();

    assert_eq!(map["limit"], ParamValue::Literal(LiteralValue::Int(20)));
    assert_eq!(map["name"], ParamValue::str("u1"));
    assert_eq!(map["flag"], ParamValue::Literal(LiteralValue::Bool(true)));
    assert_eq!(map["owner"], ParamValue::var("user"));
    assert_eq!(map["x"], ParamValue::Literal(LiteralValue::None));
}

#[test]
fn test_python_rendering_quotes_only_literals() {
    assert_eq!(ParamValue::str("alice").to_python(), r#""alice""#);
    assert_eq!(ParamValue::var("current_user").to_python(), "current_user");
    assert_eq!(ParamValue::Literal(LiteralValue::Bool(false)).to_python(), "False");
    assert_eq!(ParamValue::Literal(LiteralValue::Float(2.0)).to_python(), "2.0");
}

#[test]
fn test_python_string_escapes() {
    assert_eq!(python_string("say \"hi\"\n"), r#""say \"hi\"\n""#);
}

#[test]
fn test_truthiness() {
    assert_eq!(
        ParamValue::Literal(LiteralValue::Int(1)).is_truthy(),
        Some(true)
    );
    assert_eq!(ParamValue::var("flag").is_truthy(), None);
}

#[test]
fn test_positional_key() {
    assert_eq!(positional_key(0), "__pos_0__");
    assert_eq!(positional_key(3), "__pos_3__");
}
