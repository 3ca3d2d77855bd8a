//! Search contexts and outcomes.

use std::sync::Arc;

use crate::problem::Event;

#[derive(Debug)]
struct PathNode<E> {
    event: E,
    prev: Option<Arc<PathNode<E>>>,
}

/// Persistent event sequence. Extending a path shares its prefix with the
/// parent, so a successor costs one node instead of a full copy.
#[derive(Debug)]
pub(crate) struct Path<E> {
    head: Option<Arc<PathNode<E>>>,
    len: usize,
}

impl<E> Path<E> {
    /// The empty path.
    pub(crate) fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Number of events on the path.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// This path followed by `event`.
    pub(crate) fn push(&self, event: E) -> Self {
        Self {
            head: Some(Arc::new(PathNode {
                event,
                prev: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }
}

impl<E: Clone> Path<E> {
    /// The events in firing order.
    pub(crate) fn to_vec(&self) -> Vec<E> {
        let mut out = Vec::with_capacity(self.len());
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            out.push(n.event.clone());
            node = n.prev.as_deref();
        }
        out.reverse();
        out
    }
}

impl<E> Clone for Path<E> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

impl<E> Drop for Path<E> {
    // Unlinks uniquely owned nodes iteratively; deep paths would otherwise
    // drop recursively.
    fn drop(&mut self) {
        let mut head = self.head.take();
        while let Some(node) = head {
            match Arc::try_unwrap(node) {
                Ok(mut n) => head = n.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// Snapshot of one path through the state graph.
///
/// Contexts are immutable once built: extending a path adds one shared node
/// and advances the scheduler and restriction purely.
#[derive(Debug, Clone)]
pub(crate) struct SearchContext<E, S, R> {
    pub(crate) sequence: Path<E>,
    pub(crate) scheduler: S,
    pub(crate) restriction: R,
    pub(crate) cost: f64,
}

/// Result of a frontier search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchOutcome<E> {
    /// Event sequence of the best context at the target state.
    pub sequence: Vec<E>,
    /// Its cost: cumulative time or parallelism score, depending on the
    /// merge policy.
    pub cost: f64,
    /// Number of layers expanded.
    pub depth_bound: usize,
    /// Largest frontier seen during the search.
    pub peak_frontier: usize,
}

impl<E: Event> SearchOutcome<E> {
    /// The controllable events of [`sequence`](Self::sequence), in order.
    pub fn controllable_sequence(&self) -> Vec<E> {
        self.sequence
            .iter()
            .filter(|e| e.is_controllable())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_shares_prefix() {
        let base = Path::new().push('a').push('b');
        let left = base.push('c');
        let right = base.push('d');
        assert_eq!(base.to_vec(), vec!['a', 'b']);
        assert_eq!(left.to_vec(), vec!['a', 'b', 'c']);
        assert_eq!(right.to_vec(), vec!['a', 'b', 'd']);
        assert_eq!(left.len(), 3);
        assert!(Arc::ptr_eq(
            left.head.as_ref().unwrap().prev.as_ref().unwrap(),
            base.head.as_ref().unwrap()
        ));
    }

    #[test]
    fn test_deep_path_drops_without_overflow() {
        let mut path = Path::new();
        for i in 0..200_000u32 {
            path = path.push(i);
        }
        assert_eq!(path.len(), 200_000);
        drop(path);
    }

    #[test]
    fn test_empty_path() {
        let path: Path<u8> = Path::new();
        assert!(path.to_vec().is_empty());
        assert_eq!(path.len(), 0);
    }
}
