use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_alloc_and_read() {
    let arena = SharedArena::new(64);
    let blob = arena.alloc_str("Hi there!").unwrap();
    assert_eq!(blob.text().as_deref(), Some("Hi there!"));
    assert_eq!(arena.used(), 9);
}

#[test]
fn test_clone_aliases_and_drop_releases() {
    let arena = SharedArena::new(64);
    let blob = arena.alloc_str("true").unwrap();
    let alias = blob.clone();
    assert!(blob.shares_storage(&alias));
    assert_eq!(arena.used(), 4);

    drop(blob);
    assert_eq!(arena.used(), 4);
    assert_eq!(alias.text().as_deref(), Some("true"));

    drop(alias);
    assert_eq!(arena.used(), 0);
    assert_eq!(arena.live_allocations(), 0);
}

#[test]
fn test_set_does_not_leak_into_alias() {
    let arena = SharedArena::new(64);
    let original = arena.alloc_str("before").unwrap();
    let mut copy = original.clone();
    copy.set(b"after").unwrap();
    assert_eq!(original.text().as_deref(), Some("before"));
    assert_eq!(copy.text().as_deref(), Some("after"));
    assert!(!original.shares_storage(&copy));
}

#[test]
fn test_alloc_over_quota_fails_without_charge() {
    let arena = SharedArena::new(8);
    let _held = arena.alloc(b"12345678").unwrap();
    assert!(matches!(
        arena.alloc(b"x"),
        Err(ArenaError::QuotaExceeded { requested: 1, .. })
    ));
    assert_eq!(arena.used(), 8);
}

#[test]
fn test_equality_is_by_content() {
    let arena = SharedArena::new(64);
    let other = SharedArena::new(64);
    assert_eq!(arena.alloc_str("321").unwrap(), other.alloc_str("321").unwrap());
    assert_ne!(arena.alloc_str("321").unwrap(), arena.alloc_str("322").unwrap());
}

#[test]
fn test_purge_empties_live_blobs() {
    let arena = SharedArena::new(64);
    let blob = arena.alloc_str("gone").unwrap();
    arena.purge();
    assert_eq!(blob.text(), None);
    drop(blob); // freeing a purged handle is a no-op
    assert_eq!(arena.used(), 0);
}

#[test]
fn test_drop_while_arena_is_borrowed_is_released_later() {
    let arena = SharedArena::new(64);
    let reader = arena.alloc_str("keep").unwrap();
    let mut doomed = Some(arena.alloc_str("gone").unwrap());

    let seen = reader.with_bytes(|bytes| {
        drop(doomed.take());
        bytes.len()
    });
    assert_eq!(seen, Some(4));
    assert!(doomed.is_none());

    assert_eq!(arena.used(), 4);
    assert_eq!(arena.live_allocations(), 1);
    assert_eq!(reader.text().as_deref(), Some("keep"));
}
