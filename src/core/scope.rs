use crate::core::value::{JSObjectPtr, ValuePtr, new_object};
use crate::core::PropertyKey;
use std::cell::RefCell;
use std::rc::Rc;

pub type ScopePtr = Rc<Scope>;

/// A lexical frame. The binding table is itself an object so the root
/// scope's data can be the caller-supplied global: assignments to
/// undeclared names land there and are visible to the embedder afterwards.
pub struct Scope {
    pub name: String,
    pub parent: Option<ScopePtr>,
    pub data: JSObjectPtr,
    /// Labels currently active on the dynamic stack at this scope.
    pub labels: RefCell<Vec<String>>,
}

impl Scope {
    pub fn root(name: &str, data: JSObjectPtr) -> ScopePtr {
        Rc::new(Scope {
            name: name.to_string(),
            parent: None,
            data,
            labels: RefCell::new(Vec::new()),
        })
    }

    pub fn child(parent: &ScopePtr, name: &str) -> ScopePtr {
        Rc::new(Scope {
            name: name.to_string(),
            parent: Some(parent.clone()),
            data: new_object(),
            labels: RefCell::new(Vec::new()),
        })
    }
}

/// Resolve a name by walking parent links; `None` when no frame binds it
/// (the identifier thunk then yields undefined).
pub fn lookup(scope: &ScopePtr, name: &str) -> Option<ValuePtr> {
    let key = PropertyKey::from(name);
    let mut cur = Some(scope.clone());
    while let Some(s) = cur {
        if let Some(slot) = s.data.borrow().get(&key) {
            return Some(slot);
        }
        cur = s.parent.clone();
    }
    None
}

/// The frame whose data owns `name`, falling back to the root data (the
/// global) for undeclared names, so assignments to them become globals.
pub fn owner(scope: &ScopePtr, name: &str) -> JSObjectPtr {
    let key = PropertyKey::from(name);
    let mut cur = scope.clone();
    loop {
        if cur.data.borrow().contains_key(&key) {
            return cur.data.clone();
        }
        let Some(parent) = cur.parent.clone() else {
            return cur.data.clone();
        };
        cur = parent;
    }
}

pub fn root_data(scope: &ScopePtr) -> JSObjectPtr {
    let mut cur = scope.clone();
    while let Some(parent) = cur.parent.clone() {
        cur = parent;
    }
    cur.data.clone()
}
