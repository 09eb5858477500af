use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_parse_dotted_splits_names_and_indices() {
    let path = KeyPath::parse_dotted("servers.0.host");
    assert_eq!(
        path.segments(),
        &[
            Segment::from("servers"),
            Segment::Index(0),
            Segment::from("host")
        ]
    );
}

#[test]
fn test_parse_dotted_empty_is_empty_path() {
    assert!(KeyPath::parse_dotted("").is_empty());
}

#[test]
fn test_parse_dotted_signed_number_is_a_name() {
    let path = KeyPath::parse_dotted("+1");
    assert_eq!(path.segments(), &[Segment::from("+1")]);
}

#[test]
fn test_str_key_does_not_split() {
    let path = KeyPath::from("a.b");
    assert_eq!(path.len(), 1);
    assert_eq!(path.to_string(), "a.b");
}

#[test]
fn test_array_key_path() {
    let path = KeyPath::from(["a", "b"]);
    assert_eq!(path.to_string(), "a.b");
    let mixed = KeyPath::from([Segment::from("list"), Segment::Index(2)]);
    assert_eq!(mixed.to_string(), "list.2");
}

#[test]
fn test_chain_as_parameter() {
    let single = Chain::new(vec![Segment::from("x")], Span::DUMMY);
    assert_eq!(single.as_parameter().map(Name::as_str), Some("x"));

    let dotted = Chain::new(vec![Segment::from("x"), Segment::from("y")], Span::DUMMY);
    assert!(dotted.as_parameter().is_none());

    let reserved = Chain::new(vec![Segment::from("this")], Span::DUMMY);
    assert!(reserved.as_parameter().is_none());
}
