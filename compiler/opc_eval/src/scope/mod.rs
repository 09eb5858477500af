//! The scope tree.
//!
//! Maps and arrays are the same node type: a `Scope` whose entries are either
//! all named (map) or all positional (array). Scopes point at their parent
//! through a `Weak` back-reference; ownership flows strictly downward from the
//! document root, which also owns the blob arena for the whole tree.
//!
//! Scopes created during resolution (call frames, lambda body instances,
//! loaded and included documents) are not owned by any tree. They hold a
//! strong `anchor` to their parent so their lexical chain outlives the call
//! that produced them.

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::{Rc, Weak};
use std::time::Duration;

use opc_arena::SharedArena;
use opc_ir::Name;
use opc_stack::ensure_sufficient_stack;

use crate::errors::{self, EvalResult, TypeErrorKind};
use crate::resolve::Resolver;
use crate::value::{KeyPath, Segment, Value};

/// One child of a scope.
pub(crate) struct Entry {
    name: Option<Name>,
    value: Value,
    weight: i32,
}

/// Arena and timeout, present on document roots only.
#[derive(Clone)]
pub(crate) struct Document {
    pub(crate) arena: SharedArena,
    pub(crate) timeout: Option<Duration>,
}

pub(crate) struct ScopeData {
    entries: Vec<Entry>,
    parent: Weak<RefCell<ScopeData>>,
    anchor: Option<Scope>,
    document: Option<Document>,
    origin: Option<PathBuf>,
    /// Written as `[...]`; an empty one is still an array.
    bracketed: bool,
}

impl Drop for ScopeData {
    /// Tear the subtree down with a worklist; deep documents would otherwise
    /// overflow the native stack on drop.
    fn drop(&mut self) {
        let mut pending: Vec<Value> = self.entries.drain(..).map(|entry| entry.value).collect();
        pending.extend(self.anchor.take().map(Value::Scope));
        while let Some(value) = pending.pop() {
            value.release_into(&mut pending);
        }
    }
}

/// A shared handle to one node of the scope tree.
///
/// Cloning is a reference-count bump; equality of scopes is identity
/// ([`Scope::ptr_eq`]).
#[derive(Clone)]
#[repr(transparent)]
pub struct Scope(Rc<RefCell<ScopeData>>);

impl Scope {
    /// A detached, empty scope with no arena.
    pub fn new() -> Self {
        Scope(Rc::new(RefCell::new(ScopeData {
            entries: Vec::new(),
            parent: Weak::new(),
            anchor: None,
            document: None,
            origin: None,
            bracketed: false,
        })))
    }

    /// A detached, empty scope that only takes positional entries.
    pub fn new_array() -> Self {
        let scope = Scope::new();
        scope.0.borrow_mut().bracketed = true;
        scope
    }

    /// An empty document root owning `arena`.
    pub fn with_arena(arena: SharedArena) -> Self {
        let scope = Scope::new();
        scope.attach_document(Document {
            arena,
            timeout: None,
        });
        scope
    }

    pub(crate) fn attach_document(&self, document: Document) {
        self.0.borrow_mut().document = Some(document);
    }

    /// Parent weakly and keep it alive through `anchor`.
    pub(crate) fn attach_transient(&self, parent: &Scope) {
        let mut data = self.0.borrow_mut();
        data.parent = Rc::downgrade(&parent.0);
        data.anchor = Some(parent.clone());
    }

    pub(crate) fn set_origin(&self, origin: PathBuf) {
        self.0.borrow_mut().origin = Some(origin);
    }

    /// File this scope was loaded from, if any.
    pub fn origin(&self) -> Option<PathBuf> {
        self.0.borrow().origin.clone()
    }

    /// Whether this scope is a document root with its own arena.
    pub fn has_document(&self) -> bool {
        self.0.borrow().document.is_some()
    }

    pub fn parent(&self) -> Option<Scope> {
        self.0.borrow().parent.upgrade().map(Scope)
    }

    /// This scope followed by each enclosing scope.
    pub fn ancestors(&self) -> impl Iterator<Item = Scope> {
        std::iter::successors(Some(self.clone()), Scope::parent)
    }

    /// Outermost scope reachable through parent links.
    pub fn root(&self) -> Scope {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Document info of the nearest enclosing root.
    pub(crate) fn document(&self) -> Option<Document> {
        self.ancestors().find_map(|scope| scope.own_document())
    }

    fn own_document(&self) -> Option<Document> {
        self.0.borrow().document.clone()
    }

    /// Arena of the nearest enclosing document.
    pub fn arena(&self) -> Option<SharedArena> {
        self.document().map(|doc| doc.arena)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().entries.is_empty()
    }

    /// Holds positional entries, or was created empty as an array.
    pub fn is_array(&self) -> bool {
        let data = self.0.borrow();
        match data.entries.first() {
            Some(entry) => entry.name.is_none(),
            None => data.bracketed,
        }
    }

    /// Non-empty with named entries.
    pub fn is_map(&self) -> bool {
        self.0
            .borrow()
            .entries
            .first()
            .is_some_and(|entry| entry.name.is_some())
    }

    /// Distinct entry names in order of first declaration.
    pub fn names(&self) -> Vec<Name> {
        let data = self.0.borrow();
        let mut names: Vec<Name> = Vec::new();
        for name in data.entries.iter().filter_map(|e| e.name.as_ref()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    pub fn entry(&self, index: usize) -> Option<EntryRef> {
        (index < self.len()).then(|| EntryRef {
            scope: self.clone(),
            index,
        })
    }

    /// Identity of this node while it is alive.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Insert `value` under `key` with the given override weight.
    ///
    /// A single name appends a new entry. A longer path walks the leading
    /// names, reusing a same-named child scope or creating an empty one, and
    /// appends under the last name. Inserted scopes are re-parented here.
    pub fn insert(
        &self,
        key: impl Into<KeyPath>,
        value: impl Into<Value>,
        weight: i32,
    ) -> EvalResult<EntryRef> {
        let path = key.into();
        let (last, prefix) = path.segments().split_last().ok_or_else(errors::empty_path)?;
        let mut target = self.clone();
        for segment in prefix {
            target = target.child_for_insert(insert_name(segment)?)?;
        }
        target.append(Some(insert_name(last)?.clone()), value.into(), weight)
    }

    /// Append a positional entry.
    pub fn push(&self, value: impl Into<Value>) -> EvalResult<EntryRef> {
        self.append(None, value.into(), 0)
    }

    /// Look up `key`, resolving chains and calls on the way.
    ///
    /// Returns `Ok(None)` when nothing is stored under the key.
    pub fn get(&self, key: impl Into<KeyPath>) -> EvalResult<Option<Value>> {
        let path = key.into();
        Resolver::new(self).get(self, path.segments())
    }

    /// Look up `key` and return its text if it resolves to a blob.
    pub fn get_text(&self, key: impl Into<KeyPath>) -> EvalResult<Option<String>> {
        Ok(self.get(key)?.and_then(|value| value.text()))
    }

    /// If this is the last handle, move its entries and anchor into
    /// `pending` so the node itself drops without recursing.
    pub(crate) fn release_into(self, pending: &mut Vec<Value>) {
        if Rc::strong_count(&self.0) != 1 {
            return;
        }
        let Ok(mut data) = self.0.try_borrow_mut() else {
            return;
        };
        pending.extend(data.entries.drain(..).map(|entry| entry.value));
        pending.extend(data.anchor.take().map(Value::Scope));
    }

    fn child_for_insert(&self, name: &Name) -> EvalResult<Scope> {
        let existing = self.0.borrow().entries.iter().rev().find_map(|entry| {
            match (&entry.name, &entry.value) {
                (Some(n), Value::Scope(scope)) if n == name => Some(scope.clone()),
                _ => None,
            }
        });
        if let Some(scope) = existing {
            return Ok(scope);
        }
        let child = Scope::new();
        self.append(Some(name.clone()), Value::Scope(child.clone()), 0)?;
        Ok(child)
    }

    fn append(&self, name: Option<Name>, value: Value, weight: i32) -> EvalResult<EntryRef> {
        self.check_entry_kind(name.is_some())?;
        if let Value::Scope(child) = &value {
            self.adopt(child)?;
        }
        let mut data = self.0.borrow_mut();
        data.entries.push(Entry {
            name,
            value,
            weight,
        });
        Ok(EntryRef {
            scope: self.clone(),
            index: data.entries.len() - 1,
        })
    }

    fn check_entry_kind(&self, named: bool) -> EvalResult<()> {
        let holding_named = {
            let data = self.0.borrow();
            match data.entries.first() {
                Some(entry) => entry.name.is_some(),
                None if data.bracketed => false,
                None => return Ok(()),
            }
        };
        if holding_named == named {
            return Ok(());
        }
        let describe = |named: bool| if named { "named" } else { "positional" };
        Err(errors::type_error(TypeErrorKind::MixedEntries {
            adding: describe(named),
            holding: describe(holding_named),
        }))
    }

    fn adopt(&self, child: &Scope) -> EvalResult<()> {
        if self.ancestors().any(|scope| scope.ptr_eq(child)) {
            return Err(errors::type_error(TypeErrorKind::SelfInsertion));
        }
        if child.has_document() {
            return Err(errors::type_error(TypeErrorKind::ForeignDocument));
        }
        if child.parent().is_some() {
            return Err(errors::type_error(TypeErrorKind::AlreadyParented));
        }
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        Ok(())
    }

    /// Whether any entry carries `name`.
    pub(crate) fn has_name(&self, name: &str) -> bool {
        self.0
            .borrow()
            .entries
            .iter()
            .any(|entry| entry.name.as_deref() == Some(name))
    }

    /// The stored value under `name` with strictly maximal weight.
    pub(crate) fn select(&self, name: &Name) -> EvalResult<Option<Value>> {
        let data = self.0.borrow();
        let mut best: Option<&Entry> = None;
        let mut tied = false;
        for entry in data.entries.iter().filter(|e| e.name.as_ref() == Some(name)) {
            match best {
                Some(current) if entry.weight < current.weight => {}
                Some(current) if entry.weight == current.weight => tied = true,
                _ => {
                    best = Some(entry);
                    tied = false;
                }
            }
        }
        match best {
            Some(entry) if tied => Err(errors::ambiguous_override(name, entry.weight)),
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    /// The stored value at a position, ignoring names and weights.
    pub(crate) fn raw_at(&self, index: usize) -> Option<Value> {
        self.0
            .borrow()
            .entries
            .get(index)
            .map(|entry| entry.value.clone())
    }

    /// A call frame holding `param: arg`, lexically inside `captured`.
    pub(crate) fn frame(captured: Option<&Scope>, param: Name, arg: Value) -> Scope {
        let frame = Scope::new();
        if let Some(parent) = captured {
            frame.attach_transient(parent);
        }
        frame.0.borrow_mut().entries.push(Entry {
            name: Some(param),
            value: arg,
            weight: 0,
        });
        frame
    }

    /// Deep-copy this scope's entries into a new scope anchored under `parent`.
    ///
    /// Nested scopes are copied too, so their chains resolve against the new
    /// parent. Blobs are shared copy-on-write; lambdas are copied unbound.
    pub(crate) fn instantiate(&self, parent: &Scope) -> Scope {
        let copy = Scope::new();
        copy.0.borrow_mut().bracketed = self.0.borrow().bracketed;
        copy.attach_transient(parent);
        self.copy_entries_into(&copy);
        copy
    }

    fn copy_entries_into(&self, target: &Scope) {
        let entries: Vec<(Option<Name>, Value, i32)> = self
            .0
            .borrow()
            .entries
            .iter()
            .map(|e| (e.name.clone(), e.value.clone(), e.weight))
            .collect();
        for (name, value, weight) in entries {
            let value = match value {
                Value::Scope(nested) => {
                    let nested_copy = Scope::new();
                    {
                        let mut data = nested_copy.0.borrow_mut();
                        data.parent = Rc::downgrade(&target.0);
                        data.bracketed = nested.0.borrow().bracketed;
                    }
                    ensure_sufficient_stack(|| nested.copy_entries_into(&nested_copy));
                    Value::Scope(nested_copy)
                }
                other => other,
            };
            target.0.borrow_mut().entries.push(Entry {
                name,
                value,
                weight,
            });
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Scope")
            .field("id", &format_args!("{:#x}", self.id()))
            .field("entries", &data.entries.len())
            .field("document", &data.document.is_some())
            .finish()
    }
}

fn insert_name(segment: &Segment) -> EvalResult<&Name> {
    match segment {
        Segment::Name(name) => Ok(name),
        Segment::Index(index) => Err(errors::type_error(TypeErrorKind::IndexInInsertPath(
            *index,
        ))),
    }
}

/// A handle to one stored entry, returned by `insert` and `push`.
#[derive(Clone, Debug)]
pub struct EntryRef {
    scope: Scope,
    index: usize,
}

impl EntryRef {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> Option<Name> {
        self.scope.0.borrow().entries[self.index].name.clone()
    }

    pub fn weight(&self) -> i32 {
        self.scope.0.borrow().entries[self.index].weight
    }

    /// The value as stored, before any resolution.
    pub fn value(&self) -> Value {
        self.scope.0.borrow().entries[self.index].value.clone()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
