use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_set_get_and_used() {
    let mut arena = BlobArena::new(16);
    let h = arena.handle();
    assert_eq!(arena.get(h), None);

    arena.set(h, b"321").unwrap();
    assert_eq!(arena.get(h), Some(&b"321"[..]));
    assert_eq!(arena.used(), 3);
}

#[test]
fn test_quota_scenario_duplicate_then_free_original() {
    let mut arena = BlobArena::new(8);
    let original = arena.handle();
    arena.set(original, b"12345678").unwrap();
    assert_eq!(arena.used(), 8);

    let dup = arena.duplicate(original);
    assert_eq!(arena.used(), 8);
    assert_eq!(arena.allocation_of(dup), arena.allocation_of(original));
    assert_eq!(arena.live_allocations(), 1);

    arena.free(original);
    assert_eq!(arena.used(), 8);
    assert_eq!(arena.get(dup), Some(&b"12345678"[..]));

    // Would need 16 live bytes: rejected, nothing changes.
    let err = arena.set(dup, b"abcdefgh").unwrap_err();
    assert_eq!(
        err,
        ArenaError::QuotaExceeded {
            requested: 8,
            used: 8,
            quota: 8
        }
    );
    assert_eq!(arena.used(), 8);
    assert_eq!(arena.get(dup), Some(&b"12345678"[..]));
}

#[test]
fn test_set_on_alias_is_copy_on_write() {
    let mut arena = BlobArena::new(64);
    let a = arena.handle();
    arena.set(a, b"shared").unwrap();
    let b = arena.duplicate(a);

    arena.set(b, b"private").unwrap();
    assert_eq!(arena.get(a), Some(&b"shared"[..]));
    assert_eq!(arena.get(b), Some(&b"private"[..]));
    assert_ne!(arena.allocation_of(a), arena.allocation_of(b));
    assert_eq!(arena.used(), 13);
}

#[test]
fn test_overwrite_sole_owner_releases_old_bytes() {
    let mut arena = BlobArena::new(10);
    let h = arena.handle();
    arena.set(h, b"1234").unwrap();
    arena.set(h, b"123456").unwrap();
    assert_eq!(arena.used(), 6);
    assert_eq!(arena.live_allocations(), 1);
}

#[test]
fn test_free_returns_exact_length() {
    let mut arena = BlobArena::new(100);
    let a = arena.handle();
    let b = arena.handle();
    arena.set(a, b"hello").unwrap();
    arena.set(b, b"world!!").unwrap();
    assert_eq!(arena.used(), 12);

    arena.free(b);
    assert_eq!(arena.used(), 5);
    arena.free(b); // no-op
    assert_eq!(arena.used(), 5);
}

#[test]
fn test_ids_reused_lifo_only_after_last_holder() {
    let mut arena = BlobArena::new(100);
    let a = arena.handle();
    let b = arena.handle();
    arena.set(a, b"a").unwrap();
    arena.set(b, b"b").unwrap();
    let id_a = arena.allocation_of(a).unwrap();
    let id_b = arena.allocation_of(b).unwrap();

    let alias = arena.duplicate(a);
    arena.free(a);
    // Still held by `alias`: a new allocation must not take id_a.
    let c = arena.handle();
    arena.set(c, b"c").unwrap();
    assert_ne!(arena.allocation_of(c), Some(id_a));

    arena.free(alias);
    arena.free(b);
    // LIFO: b was released last.
    let d = arena.handle();
    arena.set(d, b"d").unwrap();
    assert_eq!(arena.allocation_of(d), Some(id_b));
    let e = arena.handle();
    arena.set(e, b"e").unwrap();
    assert_eq!(arena.allocation_of(e), Some(id_a));
}

#[test]
fn test_duplicate_of_empty_handle_owns_nothing() {
    let mut arena = BlobArena::new(4);
    let h = arena.handle();
    let dup = arena.duplicate(h);
    assert_eq!(arena.get(dup), None);
    assert_eq!(arena.allocation_of(dup), None);
}

#[test]
fn test_purge_clears_everything() {
    let mut arena = BlobArena::new(32);
    let h = arena.handle();
    arena.set(h, b"data").unwrap();
    let _dup = arena.duplicate(h);
    arena.purge();
    assert_eq!(arena.used(), 0);
    assert_eq!(arena.live_allocations(), 0);
    assert_eq!(arena.get(h), None);
    // Handles minted after a purge never collide with older ones.
    assert_ne!(arena.handle(), h);
}

#[derive(Clone, Debug)]
enum Op {
    Set(usize, usize),
    Duplicate(usize),
    Free(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..8usize, 0..24usize).prop_map(|(h, len)| Op::Set(h, len)),
        (0..8usize).prop_map(Op::Duplicate),
        (0..8usize).prop_map(Op::Free),
    ]
}

proptest! {
    #[test]
    fn prop_used_matches_live_bytes_and_respects_quota(ops in proptest::collection::vec(op(), 1..64)) {
        let mut arena = BlobArena::new(48);
        let mut handles: Vec<HandleId> = (0..8).map(|_| arena.handle()).collect();

        for op in ops {
            match op {
                Op::Set(h, len) => {
                    let before = arena.used();
                    let old = arena.get(handles[h]).map(<[u8]>::to_vec);
                    let result = arena.set(handles[h], &vec![7u8; len]);
                    if result.is_err() {
                        prop_assert_eq!(arena.used(), before);
                        prop_assert_eq!(arena.get(handles[h]).map(<[u8]>::to_vec), old);
                    }
                }
                Op::Duplicate(h) => {
                    let before = arena.used();
                    let dup = arena.duplicate(handles[h]);
                    prop_assert_eq!(arena.used(), before);
                    prop_assert_eq!(arena.get(dup), arena.get(handles[h]));
                    handles.push(dup);
                }
                Op::Free(h) => {
                    arena.free(handles[h]);
                }
            }

            let live: usize = {
                let mut seen = std::collections::HashSet::new();
                handles
                    .iter()
                    .filter_map(|&h| arena.allocation_of(h).map(|id| (id, h)))
                    .filter(|(id, _)| seen.insert(*id))
                    .map(|(_, h)| arena.get(h).map_or(0, <[u8]>::len))
                    .sum()
            };
            prop_assert_eq!(arena.used(), live);
            prop_assert!(arena.used() <= arena.quota());
        }
    }
}
