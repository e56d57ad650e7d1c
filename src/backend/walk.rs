//! Depth-bounded traversal of nested form XObjects.

use std::collections::HashMap;

use super::{DocumentModel, ImageKey, ImageRef, ObjectKey, Scope, XObject};
use crate::error::Result;

/// Maximum nesting of form XObjects followed by a walk.
pub const MAX_FORM_DEPTH: usize = 50;

/// Visitor decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Keep going
    Continue,
    /// End the whole walk
    Stop,
}

/// Visit every image reachable from the resources of `root`, depth first.
///
/// Returns [`Walk::Stop`] if the visitor ended the walk early.
pub fn walk_resources<M, V>(model: &M, root: Scope, visitor: V) -> Result<Walk>
where
    M: DocumentModel + ?Sized,
    V: FnMut(&ImageRef) -> Walk,
{
    walk(model, root, |m, scope| m.xobjects(scope), visitor)
}

/// Visit every image painted by the content of `root`, following forms.
pub fn walk_drawn<M, V>(model: &M, root: Scope, visitor: V) -> Result<Walk>
where
    M: DocumentModel + ?Sized,
    V: FnMut(&ImageRef) -> Walk,
{
    walk(model, root, |m, scope| m.drawn_xobjects(scope), visitor)
}

struct Frame {
    scope: Scope,
    entries: std::vec::IntoIter<XObject>,
}

fn walk<M, L, V>(model: &M, root: Scope, list: L, mut visitor: V) -> Result<Walk>
where
    M: DocumentModel + ?Sized,
    L: Fn(&M, Scope) -> Result<Vec<XObject>>,
    V: FnMut(&ImageRef) -> Walk,
{
    let mut stack = vec![Frame {
        scope: root,
        entries: list(model, root)?.into_iter(),
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(entry) = frame.entries.next() else {
            stack.pop();
            continue;
        };

        match entry {
            XObject::Image(image) => {
                if visitor(&image) == Walk::Stop {
                    return Ok(Walk::Stop);
                }
            }
            XObject::Form(key) => {
                let scope = Scope::Form(key);
                if stack.len() > MAX_FORM_DEPTH {
                    log::warn!(
                        "{}: form nesting deeper than {}, skipping form {:?}",
                        model.name(),
                        MAX_FORM_DEPTH,
                        key
                    );
                    continue;
                }
                // a form drawing itself (directly or not)
                if stack.iter().any(|f| f.scope == scope) {
                    log::debug!("{}: form {:?} is recursive, skipping", model.name(), key);
                    continue;
                }
                let entries = list(model, scope)?.into_iter();
                stack.push(Frame { scope, entries });
            }
        }
    }

    Ok(Walk::Continue)
}

/// Identity-keyed registry numbering each distinct image once.
///
/// Owned by a single classification or extraction pass. Inline images have
/// no identity, so each of them is new.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    seen: HashMap<ObjectKey, usize>,
    next: usize,
}

impl ImageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number a newly seen image. Returns `None` if it was already seen.
    pub fn register(&mut self, key: ImageKey) -> Option<usize> {
        if let ImageKey::Object(object) = key {
            if self.seen.contains_key(&object) {
                return None;
            }
            self.seen.insert(object, self.next);
        }
        let number = self.next;
        self.next += 1;
        Some(number)
    }

    /// Number of distinct images registered.
    pub fn count(&self) -> usize {
        self.next
    }
}
