use super::*;

#[test]
fn data_type_from_name_round_trips() {
    for kind in [
        DataType::Integer,
        DataType::Float,
        DataType::Double,
        DataType::String,
        DataType::Bool,
        DataType::Void,
    ] {
        assert_eq!(DataType::from_name(kind.as_str()), kind);
    }
}

#[test]
fn unknown_names_map_to_unknown() {
    assert_eq!(DataType::from_name("banana"), DataType::Unknown);
    assert_eq!(DataType::from_name(""), DataType::Unknown);
    assert_eq!(DataType::from_name("Int"), DataType::Unknown);
}

#[test]
fn type_info_uses_the_canonical_name() {
    let ty = TypeInfo::new(DataType::Integer);
    assert_eq!(ty.kind, DataType::Integer);
    assert_eq!(ty.name, "int");
}

#[test]
fn type_info_from_name_keeps_the_written_name() {
    let ty = TypeInfo::from_name("banana");
    assert_eq!(ty.kind, DataType::Unknown);
    assert_eq!(ty.name, "banana");
}

#[test]
fn data_type_display() {
    assert_eq!(DataType::Double.to_string(), "double");
    assert_eq!(DataType::Unknown.to_string(), "unknown");
}
