use super::*;

#[test]
fn test_span_basic() {
    let span = Span::new(10, 20);
    assert_eq!(span.len(), 10);
    assert!(!span.is_empty());
    assert_eq!(span.to_range(), 10..20);
}

#[test]
fn test_span_merge() {
    let merged = Span::new(10, 20).merge(Span::new(15, 30));
    assert_eq!(merged, Span::new(10, 30));
}

#[test]
fn test_span_try_from_range_too_large() {
    let large = u32::MAX as usize + 1;
    assert!(matches!(
        Span::try_from_range(large..large + 1),
        Err(SpanError::StartTooLarge(_))
    ));
    assert!(matches!(
        Span::try_from_range(0..large),
        Err(SpanError::EndTooLarge(_))
    ));
}

#[test]
fn test_line_col() {
    let src = "{\n  a: 1,\n  b: x\n}";
    assert_eq!(line_col(src, 0), (1, 1));
    assert_eq!(line_col(src, 4), (2, 3));
    assert_eq!(line_col(src, 15), (3, 6));
    // Past the end clamps.
    assert_eq!(line_col(src, 1000), (4, 2));
}
