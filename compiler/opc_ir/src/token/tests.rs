use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_token_categories() {
    assert_eq!(TokenKind::Number(Name::new("1")).category(), TokenCategory::Number);
    assert_eq!(TokenKind::String(Name::new("s")).category(), TokenCategory::Literal);
    assert_eq!(TokenKind::True.category(), TokenCategory::Literal);
    assert_eq!(TokenKind::Ident(Name::new("a")).category(), TokenCategory::Identifier);
    assert_eq!(TokenKind::FatArrow.category(), TokenCategory::Operator);
    assert_eq!(TokenKind::Eof.category(), TokenCategory::End);
}

#[test]
fn test_literal_text() {
    assert_eq!(TokenKind::Number(Name::new("321")).literal_text(), Some("321"));
    assert_eq!(TokenKind::Null.literal_text(), Some("null"));
    assert_eq!(TokenKind::Ident(Name::new("x")).literal_text(), None);
}

#[test]
fn test_token_list_push_and_iter() {
    let mut list = TokenList::new();
    list.push(Token::new(TokenKind::LBrace, Span::new(0, 1)));
    list.push(Token::new(TokenKind::Eof, Span::point(1)));
    assert_eq!(list.len(), 2);
    let kinds: Vec<_> = list.iter().map(|t| t.kind.clone()).collect();
    assert_eq!(kinds, vec![TokenKind::LBrace, TokenKind::Eof]);
}

#[test]
fn test_kind_display() {
    assert_eq!(TokenKind::Ident(Name::new("a")).to_string(), "identifier `a`");
    assert_eq!(TokenKind::Eof.to_string(), "end of input");
}
