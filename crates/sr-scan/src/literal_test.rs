use super::*;

#[test]
fn test_decode_simple_strings() {
    assert_eq!(decode_python_string("\"abc\"").as_deref(), Some("abc"));
    assert_eq!(decode_python_string("'abc'").as_deref(), Some("abc"));
    assert_eq!(decode_python_string("\"\"").as_deref(), Some(""));
}

#[test]
fn test_decode_triple_quoted() {
    let text = "\"\"\"\n\tSELECT name\n\tFROM `tabUser`\n\"\"\"";
    assert_eq!(
        decode_python_string(text).as_deref(),
        Some("\n\tSELECT name\n\tFROM `tabUser`\n")
    );
}

#[test]
fn test_escapes() {
    assert_eq!(
        decode_python_string(r#""it\'s \"x\"\n""#).as_deref(),
        Some("it's \"x\"\n")
    );
    assert_eq!(
        decode_python_string(r#"r"a\nb""#).as_deref(),
        Some(r"a\nb")
    );
    assert_eq!(
        decode_python_string(r#""LIKE '%\_x'""#).as_deref(),
        Some(r"LIKE '%\_x'")
    );
}

#[test]
fn test_fstrings_and_bytes_rejected() {
    assert_eq!(decode_python_string("f\"SELECT {x}\""), None);
    assert_eq!(decode_python_string("rb'abc'"), None);
    assert_eq!(decode_python_string("u'abc'").as_deref(), Some("abc"));
}
