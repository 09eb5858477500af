use opc_arena::SharedArena;
use pretty_assertions::assert_eq;

use super::*;
use crate::errors::{EvalError, ReferenceErrorKind};

fn doc() -> (Scope, SharedArena) {
    let arena = SharedArena::new(4096);
    (Scope::with_arena(arena.clone()), arena)
}

fn text(arena: &SharedArena, s: &str) -> Value {
    Value::Blob(arena.alloc_str(s).unwrap())
}

#[test]
fn test_insert_single_name_returns_entry() {
    let (root, arena) = doc();
    let entry = root.insert("port", text(&arena, "80"), 2).unwrap();
    assert_eq!(entry.name().as_deref(), Some("port"));
    assert_eq!(entry.weight(), 2);
    assert_eq!(entry.index(), 0);
    assert!(entry.scope().ptr_eq(&root));
    assert_eq!(root.get_text("port").unwrap().as_deref(), Some("80"));
}

#[test]
fn test_insert_path_creates_and_reuses_intermediates() {
    let (root, arena) = doc();
    root.insert(["server", "http", "port"], text(&arena, "80"), 0)
        .unwrap();
    root.insert(["server", "name"], text(&arena, "main"), 0).unwrap();

    assert_eq!(root.len(), 1);
    let server = root.get("server").unwrap().unwrap();
    let server = server.as_scope().unwrap();
    assert_eq!(server.len(), 2);
    assert!(server.parent().unwrap().ptr_eq(&root));
    assert_eq!(
        root.get_text(["server", "http", "port"]).unwrap().as_deref(),
        Some("80")
    );
    assert_eq!(
        root.get_text(["server", "name"]).unwrap().as_deref(),
        Some("main")
    );
}

#[test]
fn test_insert_empty_path_is_reference_error() {
    let (root, arena) = doc();
    let err = root.insert(KeyPath::new(), text(&arena, "1"), 0).unwrap_err();
    assert_eq!(err, EvalError::Reference(ReferenceErrorKind::EmptyPath));
    assert!(root.is_empty());
}

#[test]
fn test_insert_path_rejects_index_segments() {
    let (root, arena) = doc();
    let path = KeyPath::from([Segment::from("a"), Segment::Index(0)]);
    let err = root.insert(path, text(&arena, "1"), 0).unwrap_err();
    assert_eq!(
        err,
        EvalError::Type(TypeErrorKind::IndexInInsertPath(0))
    );
}

#[test]
fn test_empty_array_stays_positional() {
    let array = Scope::new_array();
    assert!(array.is_array());
    assert!(!Scope::new().is_array());
    assert_eq!(
        array.insert("a", Scope::new(), 0).unwrap_err(),
        EvalError::Type(TypeErrorKind::MixedEntries {
            adding: "named",
            holding: "positional",
        })
    );
    array.push(Scope::new()).unwrap();
    assert_eq!(array.len(), 1);
}

#[test]
fn test_named_and_positional_entries_do_not_mix() {
    let (root, arena) = doc();
    root.push(text(&arena, "1")).unwrap();
    let err = root.insert("a", text(&arena, "2"), 0).unwrap_err();
    assert_eq!(
        err,
        EvalError::Type(TypeErrorKind::MixedEntries {
            adding: "named",
            holding: "positional",
        })
    );

    let map = Scope::new();
    map.insert("a", text(&arena, "1"), 0).unwrap();
    assert!(matches!(
        map.push(text(&arena, "2")),
        Err(EvalError::Type(TypeErrorKind::MixedEntries { .. }))
    ));
}

#[test]
fn test_inserted_scope_is_reparented() {
    let (root, _arena) = doc();
    let child = Scope::new();
    assert!(child.parent().is_none());
    root.insert("child", child.clone(), 0).unwrap();
    assert!(child.parent().unwrap().ptr_eq(&root));
}

#[test]
fn test_insert_rejects_scope_with_parent() {
    let (root, _arena) = doc();
    let child = Scope::new();
    root.insert("a", child.clone(), 0).unwrap();
    let err = root.insert("b", child, 0).unwrap_err();
    assert_eq!(err, EvalError::Type(TypeErrorKind::AlreadyParented));
}

#[test]
fn test_insert_rejects_document_root() {
    let (root, _arena) = doc();
    let (other, _other_arena) = doc();
    let err = root.insert("other", other, 0).unwrap_err();
    assert_eq!(err, EvalError::Type(TypeErrorKind::ForeignDocument));
}

#[test]
fn test_insert_rejects_self_and_ancestors() {
    let outer = Scope::new();
    let inner = Scope::new();
    outer.insert("inner", inner.clone(), 0).unwrap();

    assert_eq!(
        outer.insert("me", outer.clone(), 0).unwrap_err(),
        EvalError::Type(TypeErrorKind::SelfInsertion)
    );
    assert_eq!(
        inner.insert("outer", outer, 0).unwrap_err(),
        EvalError::Type(TypeErrorKind::SelfInsertion)
    );
}

#[test]
fn test_highest_weight_wins() {
    let (root, arena) = doc();
    root.insert("a", text(&arena, "low"), -1).unwrap();
    root.insert("a", text(&arena, "high"), 2).unwrap();
    root.insert("a", text(&arena, "mid"), 0).unwrap();
    assert_eq!(root.get_text("a").unwrap().as_deref(), Some("high"));
}

#[test]
fn test_weight_tie_is_ambiguous() {
    let (root, arena) = doc();
    root.insert("a", text(&arena, "x"), 1).unwrap();
    root.insert("a", text(&arena, "y"), 1).unwrap();
    root.insert("a", text(&arena, "z"), 0).unwrap();
    root.insert("b", text(&arena, "ok"), 0).unwrap();

    let err = root.get("a").unwrap_err();
    assert_eq!(
        err,
        EvalError::Reference(ReferenceErrorKind::AmbiguousOverride {
            name: Name::new("a"),
            weight: 1,
        })
    );
    assert_eq!(root.get_text("b").unwrap().as_deref(), Some("ok"));
}

#[test]
fn test_tie_below_maximum_is_fine() {
    let (root, arena) = doc();
    root.insert("a", text(&arena, "x"), 0).unwrap();
    root.insert("a", text(&arena, "y"), 0).unwrap();
    root.insert("a", text(&arena, "z"), 1).unwrap();
    assert_eq!(root.get_text("a").unwrap().as_deref(), Some("z"));
}

#[test]
fn test_missing_key_is_none() {
    let (root, _arena) = doc();
    assert!(root.get("nothing").unwrap().is_none());
    assert!(root.get(3usize).unwrap().is_none());
    assert!(root.get(["a", "b"]).unwrap().is_none());
}

#[test]
fn test_index_lookup_is_positional() {
    let (root, arena) = doc();
    root.push(text(&arena, "first")).unwrap();
    root.push(text(&arena, "second")).unwrap();
    assert!(root.is_array());
    assert!(!root.is_map());
    assert_eq!(root.get_text(1usize).unwrap().as_deref(), Some("second"));
}

#[test]
fn test_reserved_names() {
    let (root, _arena) = doc();
    let child = Scope::new();
    let grandchild = Scope::new();
    root.insert("child", child.clone(), 0).unwrap();
    child.insert("grandchild", grandchild.clone(), 0).unwrap();

    let this = grandchild.get("this").unwrap().unwrap();
    assert!(this.as_scope().unwrap().ptr_eq(&grandchild));
    let parent = grandchild.get("parent").unwrap().unwrap();
    assert!(parent.as_scope().unwrap().ptr_eq(&child));
    let global = grandchild.get("global").unwrap().unwrap();
    assert!(global.as_scope().unwrap().ptr_eq(&root));
    assert!(root.get("parent").unwrap().is_none());

    let env = root.get("env").unwrap().unwrap();
    assert!(env.as_scope().unwrap().ptr_eq(&crate::env().unwrap()));
}

#[test]
fn test_names_are_distinct_in_declaration_order() {
    let (root, arena) = doc();
    root.insert("b", text(&arena, "1"), 0).unwrap();
    root.insert("a", text(&arena, "2"), 0).unwrap();
    root.insert("b", text(&arena, "3"), 1).unwrap();
    let names: Vec<String> = root.names().iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["b".to_owned(), "a".to_owned()]);
}

#[test]
fn test_parent_link_does_not_own() {
    let child = {
        let (root, _arena) = doc();
        let child = Scope::new();
        root.insert("child", child.clone(), 0).unwrap();
        child
    };
    assert!(child.parent().is_none());
}

#[test]
fn test_arena_reachable_from_descendants() {
    let (root, arena) = doc();
    root.insert(["a", "b"], text(&arena, "1"), 0).unwrap();
    let a = root.get("a").unwrap().unwrap();
    let found = a.as_scope().unwrap().arena().unwrap();
    assert!(found.ptr_eq(&arena));
    assert!(Scope::new().arena().is_none());
}

#[test]
fn test_instantiate_deep_copies_under_new_parent() {
    let (root, arena) = doc();
    let template = Scope::new();
    template.insert("x", text(&arena, "1"), 0).unwrap();
    template.insert(["inner", "y"], text(&arena, "2"), 0).unwrap();
    root.insert("template", template.clone(), 0).unwrap();

    let target = Scope::new();
    root.insert("target", target.clone(), 0).unwrap();
    let copy = template.instantiate(&target);

    assert!(copy.parent().unwrap().ptr_eq(&target));
    let inner = copy.get("inner").unwrap().unwrap();
    let inner = inner.as_scope().unwrap();
    let template_inner = template.get("inner").unwrap().unwrap();
    assert!(!inner.ptr_eq(template_inner.as_scope().unwrap()));
    assert!(inner.parent().unwrap().ptr_eq(&copy));

    let copied = copy.get("x").unwrap().unwrap();
    let original = template.get("x").unwrap().unwrap();
    assert!(copied
        .as_blob()
        .unwrap()
        .shares_storage(original.as_blob().unwrap()));
}

#[test]
fn test_frame_outlives_caller_through_anchor() {
    let (root, arena) = doc();
    let frame = Scope::frame(Some(&root), Name::new("x"), text(&arena, "7"));
    let template = Scope::new();
    let instance = template.instantiate(&frame);
    drop(frame);
    let parent = instance.parent().unwrap();
    assert_eq!(parent.get_text("x").unwrap().as_deref(), Some("7"));
}
