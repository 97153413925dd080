use easel_construction::script::{escape, format_number, unescape, OpcodeRecord};
use easel_core::ScriptError;
use nalgebra::Vector3;
use proptest::prelude::*;

#[test]
fn test_encode_layout() {
    let record = OpcodeRecord::new("AddPoint")
        .with_vector("pointVector", &Vector3::new(0.0, 0.0, 1.0))
        .with_text("objectName", "P1")
        .with_flag("objectShowing", true);
    assert_eq!(
        record.encode(),
        "AddPoint&pointVector=0.000000000,0.000000000,1.000000000&objectName=P1&objectShowing=true"
    );
}

#[test]
fn test_reserved_characters_are_escaped() {
    let record = OpcodeRecord::new("ChangeLabelText").with_text("labelText", "a&b = c@d/e%");
    let line = record.encode();
    assert_eq!(line.matches('&').count(), 1);
    assert_eq!(line.matches('=').count(), 1);
    assert!(!line.contains('@'));

    let decoded = OpcodeRecord::decode(&line).unwrap();
    assert_eq!(decoded.text("labelText").unwrap(), "a&b = c@d/e%");
}

#[test]
fn test_name_lists_survive_separators_in_names() {
    let names = ["M1", "odd@name", "x y"];
    let line = OpcodeRecord::new("AddCalculation")
        .with_names("calculationParentNames", &names)
        .encode();
    let decoded = OpcodeRecord::decode(&line).unwrap();
    assert_eq!(decoded.names("calculationParentNames").unwrap(), names);
}

#[test]
fn test_number_format() {
    assert_eq!(format_number(45.0), "45.000000000");
    assert_eq!(format_number(-0.5), "-0.500000000");
}

#[test]
fn test_decode_errors() {
    assert!(matches!(
        OpcodeRecord::decode("AddPoint&pointVector"),
        Err(ScriptError::Malformed { .. })
    ));
    assert!(matches!(
        OpcodeRecord::decode("&a=1"),
        Err(ScriptError::Malformed { .. })
    ));
    assert!(matches!(
        OpcodeRecord::decode("AddPoint&a=1&a=2"),
        Err(ScriptError::Malformed { .. })
    ));

    let record = OpcodeRecord::decode("AddPoint&pointVector=1,2").unwrap();
    assert!(matches!(
        record.vector("pointVector"),
        Err(ScriptError::InvalidValue { .. })
    ));
    assert!(matches!(
        record.text("objectName"),
        Err(ScriptError::MissingField { .. })
    ));
}

#[test]
fn test_value_may_contain_equals_after_first() {
    let record = OpcodeRecord::decode("AddCalculation&calculationExpression=a==b").unwrap();
    assert_eq!(record.text("calculationExpression").unwrap(), "a==b");
}

proptest! {
    #[test]
    fn escape_round_trips(text in any::<String>()) {
        let escaped = escape(&text);
        prop_assert!(!escaped.contains('&'));
        prop_assert!(!escaped.contains('='));
        prop_assert!(!escaped.contains('@'));
        prop_assert!(!escaped.contains(' '));
        prop_assert_eq!(unescape(&escaped).unwrap(), text);
    }
}
