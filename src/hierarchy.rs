//! Visibility and structure queries over flat parent-linked collections.
//!
//! Parent links come from user data and are not trusted to form a forest:
//! every walk carries a visited set and treats a cycle as a dead end.

use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use crate::model::{Row, Task};

/// An entity that sits in a parent-linked hierarchy with collapse state.
pub trait Hierarchical {
    fn id(&self) -> Uuid;
    fn parent_id(&self) -> Option<Uuid>;
    fn is_expanded(&self) -> bool;

    /// Explicit child links, when the entity carries them.
    fn child_ids(&self) -> &[Uuid] {
        &[]
    }
}

impl Hierarchical for Row {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    fn is_expanded(&self) -> bool {
        self.expanded
    }

    fn child_ids(&self) -> &[Uuid] {
        Row::child_ids(self)
    }
}

impl Hierarchical for Task {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    fn is_expanded(&self) -> bool {
        self.expanded
    }
}

/// Identity → entity index. Later duplicates win.
pub fn build_lookup<T: Hierarchical>(entities: &[T]) -> HashMap<Uuid, &T> {
    entities.iter().map(|e| (e.id(), e)).collect()
}

/// Entities whose whole ancestor chain resolves and is expanded, in input order.
///
/// Roots are always visible. An entity whose parent is missing from `lookup`
/// is treated as orphaned and hidden.
pub fn resolve_visible<'a, T: Hierarchical>(
    entities: &'a [T],
    lookup: &HashMap<Uuid, &T>,
) -> Vec<&'a T> {
    let mut memo: HashMap<Uuid, bool> = HashMap::with_capacity(entities.len());
    entities
        .iter()
        .filter(|e| is_visible(*e, lookup, &mut memo))
        .collect()
}

/// Visibility of a single entity, memoised across calls sharing `memo`.
pub fn is_visible<T: Hierarchical>(
    entity: &T,
    lookup: &HashMap<Uuid, &T>,
    memo: &mut HashMap<Uuid, bool>,
) -> bool {
    // Walk up until an answer is known, then write it back down the chain.
    let mut chain = vec![entity.id()];
    let mut visited = HashSet::from([entity.id()]);
    let mut current = entity;
    let visible = loop {
        if let Some(&known) = memo.get(&current.id()) {
            break known;
        }
        let Some(parent_id) = current.parent_id() else {
            break true;
        };
        let Some(parent) = lookup.get(&parent_id).copied() else {
            break false;
        };
        if !parent.is_expanded() {
            break false;
        }
        if !visited.insert(parent_id) {
            log::warn!("parent cycle through {}, hiding its members", parent_id);
            break false;
        }
        chain.push(parent_id);
        current = parent;
    };
    // A collapsed or missing parent only hides its descendants, not the
    // ancestors already on the chain, so only the starting entity's verdict
    // is final. Ancestors that reached a known-visible root are visible too.
    if visible {
        for id in chain {
            memo.insert(id, true);
        }
    } else {
        memo.insert(entity.id(), false);
    }
    visible
}

/// Every transitive descendant of `id`, breadth first, following explicit child
/// lists as well as parent links. `id` itself is never included.
pub fn descendants_of<T: Hierarchical>(id: Uuid, entities: &[T]) -> Vec<Uuid> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for entity in entities {
        if let Some(parent) = entity.parent_id() {
            children.entry(parent).or_default().push(entity.id());
        }
        for &child in entity.child_ids() {
            children.entry(entity.id()).or_default().push(child);
        }
    }

    let mut seen = HashSet::from([id]);
    let mut out = Vec::new();
    let mut queue = VecDeque::from([id]);
    while let Some(current) = queue.pop_front() {
        for &child in children.get(&current).into_iter().flatten() {
            if seen.insert(child) {
                out.push(child);
                queue.push_back(child);
            }
        }
    }
    out
}

/// Parent hops from `id` to a root. Stops at an unresolved parent or a cycle.
/// Unknown identities have depth 0.
pub fn depth_of<T: Hierarchical>(id: Uuid, lookup: &HashMap<Uuid, &T>) -> usize {
    let mut depth = 0;
    let mut visited = HashSet::from([id]);
    let mut current = lookup.get(&id).and_then(|e| e.parent_id());
    while let Some(parent_id) = current {
        let Some(parent) = lookup.get(&parent_id) else {
            break;
        };
        if !visited.insert(parent_id) {
            break;
        }
        depth += 1;
        current = parent.parent_id();
    }
    depth
}

/// Rewrite each row's stored depth from its parent links.
pub fn refresh_depths(rows: &mut [Row]) {
    let depths: Vec<usize> = {
        let lookup = build_lookup(rows);
        rows.iter().map(|r| depth_of(r.id, &lookup)).collect()
    };
    for (row, depth) in rows.iter_mut().zip(depths) {
        row.depth = depth;
    }
}

/// Whether any entity names `id` as its parent.
pub fn has_children<T: Hierarchical>(id: Uuid, entities: &[T]) -> bool {
    entities.iter().any(|e| e.parent_id() == Some(id))
}
