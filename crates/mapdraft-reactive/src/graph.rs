//! Signal graph: arena-allocated nodes, synchronous glitch-free propagation.

use crate::error::SignalError;
use std::any::{Any, TypeId};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Identifier of a signal inside its owning [`SignalGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(u32);

impl SignalId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Typed handle to a signal. Cheap to copy; only valid for the graph that
/// created it.
pub struct Signal<T> {
    id: SignalId,
    _value: PhantomData<fn() -> T>,
}

impl<T> Signal<T> {
    fn new(id: SignalId) -> Self {
        Self {
            id,
            _value: PhantomData,
        }
    }

    /// The untyped id of this signal.
    pub fn id(self) -> SignalId {
        self.id
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal({})", self.id)
    }
}

type DynValue = Rc<dyn Any>;
type Recompute = Box<dyn FnMut(DepView<'_>) -> Option<DynValue>>;
type Sink = Box<dyn FnMut(&dyn Any)>;

/// Read access to a derived signal's dependencies during one recompute.
pub struct DepView<'a> {
    values: &'a [Option<DynValue>],
    changed: &'a [bool],
}

impl DepView<'_> {
    /// Number of dependencies.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no dependencies.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current value of the dependency at `index`; `None` while the
    /// dependency has never fired or holds a different type.
    pub fn value<T: 'static>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.as_ref()?.downcast_ref::<T>()
    }

    /// Whether the dependency at `index` updated during the current pass.
    pub fn changed(&self, index: usize) -> bool {
        self.changed.get(index).copied().unwrap_or(false)
    }
}

enum Producer {
    Source,
    Derived {
        deps: Vec<SignalId>,
        recompute: Option<Recompute>,
    },
}

struct Node {
    value: Option<DynValue>,
    value_type: TypeId,
    producer: Producer,
    dependents: Vec<SignalId>,
    subscribers: Vec<Sink>,
    rank: u32,
    disposed: bool,
}

/// Owner of a signal DAG. All reads, writes and wiring go through the graph.
#[derive(Default)]
pub struct SignalGraph {
    nodes: Vec<Node>,
}

impl SignalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source signal with no value yet.
    pub fn source<T: 'static>(&mut self) -> Signal<T> {
        self.add_source::<T>(None)
    }

    /// Create a source signal holding `initial`.
    pub fn source_with<T: 'static>(&mut self, initial: T) -> Signal<T> {
        self.add_source::<T>(Some(Rc::new(initial)))
    }

    fn add_source<T: 'static>(&mut self, value: Option<DynValue>) -> Signal<T> {
        let id = SignalId(self.nodes.len() as u32);
        self.nodes.push(Node {
            value,
            value_type: TypeId::of::<T>(),
            producer: Producer::Source,
            dependents: Vec::new(),
            subscribers: Vec::new(),
            rank: 0,
            disposed: false,
        });
        Signal::new(id)
    }

    /// Create a derived signal recomputed from `deps`.
    ///
    /// `f` returns `Some(value)` to update the signal and notify dependents,
    /// or `None` to suppress propagation for this pass. The sentinel is
    /// distinct from a legitimate value: a signal carrying `Option<_>` data
    /// updates with `Some(None)`.
    pub fn derive<T, F>(&mut self, deps: &[SignalId], mut f: F) -> Result<Signal<T>, SignalError>
    where
        T: 'static,
        F: FnMut(DepView<'_>) -> Option<T> + 'static,
    {
        let id = SignalId(self.nodes.len() as u32);
        for &dep in deps {
            if dep == id {
                return Err(SignalError::DependencyCycle(id));
            }
            if self.nodes.get(dep.index()).is_none() {
                return Err(SignalError::UnknownSignal(dep));
            }
        }
        self.check_acyclic(id, deps)?;
        let rank = deps
            .iter()
            .map(|dep| self.nodes[dep.index()].rank + 1)
            .max()
            .unwrap_or(0);
        for &dep in deps {
            self.nodes[dep.index()].dependents.push(id);
        }
        let recompute: Recompute =
            Box::new(move |view| f(view).map(|value| Rc::new(value) as DynValue));
        self.nodes.push(Node {
            value: None,
            value_type: TypeId::of::<T>(),
            producer: Producer::Derived {
                deps: deps.to_vec(),
                recompute: Some(recompute),
            },
            dependents: Vec::new(),
            subscribers: Vec::new(),
            rank,
            disposed: false,
        });
        Ok(Signal::new(id))
    }

    /// Replace the dependency list of a derived signal.
    ///
    /// The signal keeps its current value until the next push reaches it. A
    /// dependency set that would make the signal reachable from itself is
    /// rejected before any edge is touched.
    pub fn rewire(&mut self, signal: SignalId, deps: &[SignalId]) -> Result<(), SignalError> {
        let index = signal.index();
        match self.nodes.get(index) {
            None => return Err(SignalError::UnknownSignal(signal)),
            Some(node) if matches!(node.producer, Producer::Source) => {
                return Err(SignalError::NotDerived(signal));
            }
            Some(_) => {}
        }
        for &dep in deps {
            if dep == signal {
                return Err(SignalError::DependencyCycle(signal));
            }
            if self.nodes.get(dep.index()).is_none() {
                return Err(SignalError::UnknownSignal(dep));
            }
        }
        self.check_acyclic(signal, deps)?;
        let old = if let Producer::Derived { deps: slot, .. } = &mut self.nodes[index].producer {
            std::mem::replace(slot, deps.to_vec())
        } else {
            return Err(SignalError::NotDerived(signal));
        };
        for dep in old {
            self.nodes[dep.index()].dependents.retain(|&d| d != signal);
        }
        for &dep in deps {
            self.nodes[dep.index()].dependents.push(signal);
        }
        self.repair_ranks(signal);
        Ok(())
    }

    /// Push a value into a source signal and propagate synchronously.
    pub fn push<T: 'static>(&mut self, signal: Signal<T>, value: T) -> Result<(), SignalError> {
        let id = signal.id;
        let node = self
            .nodes
            .get(id.index())
            .ok_or(SignalError::UnknownSignal(id))?;
        if !matches!(node.producer, Producer::Source) {
            return Err(SignalError::WriteToDerived(id));
        }
        if node.value_type != TypeId::of::<T>() {
            return Err(SignalError::TypeMismatch(id));
        }
        if node.disposed {
            return Ok(());
        }
        self.nodes[id.index()].value = Some(Rc::new(value));
        self.propagate(id);
        Ok(())
    }

    /// Current value of a signal, cloned; `None` while the signal has never
    /// fired.
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        self.nodes
            .get(signal.id.index())?
            .value
            .as_ref()?
            .downcast_ref::<T>()
            .cloned()
    }

    /// Register a side-effecting sink. Sinks do not affect the graph.
    pub fn subscribe<T, F>(&mut self, signal: Signal<T>, mut sink: F) -> Result<(), SignalError>
    where
        T: 'static,
        F: FnMut(&T) + 'static,
    {
        let node = self
            .nodes
            .get_mut(signal.id.index())
            .ok_or(SignalError::UnknownSignal(signal.id))?;
        node.subscribers.push(Box::new(move |value| {
            if let Some(value) = value.downcast_ref::<T>() {
                sink(value);
            }
        }));
        Ok(())
    }

    /// Unlink a signal from the graph: it receives no further updates and its
    /// subscribers are dropped. Disposing twice is a no-op.
    pub fn dispose<T>(&mut self, signal: Signal<T>) {
        self.dispose_id(signal.id);
    }

    /// Untyped variant of [`SignalGraph::dispose`].
    pub fn dispose_id(&mut self, id: SignalId) {
        let Some(node) = self.nodes.get_mut(id.index()) else {
            return;
        };
        if node.disposed {
            return;
        }
        node.disposed = true;
        node.subscribers.clear();
        node.value = None;
        let deps = match &mut node.producer {
            Producer::Derived { deps, recompute } => {
                recompute.take();
                std::mem::take(deps)
            }
            Producer::Source => Vec::new(),
        };
        for dep in deps {
            self.nodes[dep.index()].dependents.retain(|&d| d != id);
        }
    }

    fn check_acyclic(&self, target: SignalId, deps: &[SignalId]) -> Result<(), SignalError> {
        let mut stack: Vec<SignalId> = deps.to_vec();
        let mut seen: HashSet<SignalId> = HashSet::new();
        while let Some(next) = stack.pop() {
            if next == target {
                return Err(SignalError::DependencyCycle(target));
            }
            if !seen.insert(next) {
                continue;
            }
            if let Some(Producer::Derived { deps, .. }) =
                self.nodes.get(next.index()).map(|node| &node.producer)
            {
                stack.extend(deps.iter().copied());
            }
        }
        Ok(())
    }

    fn repair_ranks(&mut self, start: SignalId) {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let index = id.index();
            let rank = match &self.nodes[index].producer {
                Producer::Source => 0,
                Producer::Derived { deps, .. } => deps
                    .iter()
                    .map(|dep| self.nodes[dep.index()].rank + 1)
                    .max()
                    .unwrap_or(0),
            };
            if rank != self.nodes[index].rank || id == start {
                self.nodes[index].rank = rank;
                stack.extend(self.nodes[index].dependents.iter().copied());
            }
        }
    }

    /// One full pass: recompute transitive dependents of `origin` in rank
    /// order, each at most once, notifying subscribers as values settle.
    fn propagate(&mut self, origin: SignalId) {
        log::trace!("propagating from signal {origin}");
        let mut changed = vec![false; self.nodes.len()];
        let mut queued = vec![false; self.nodes.len()];
        let mut worklist: BinaryHeap<Reverse<(u32, u32)>> = BinaryHeap::new();
        changed[origin.index()] = true;
        self.notify(origin);
        self.enqueue_dependents(origin, &mut worklist, &mut queued);
        while let Some(Reverse((_, raw))) = worklist.pop() {
            let id = SignalId(raw);
            if self.nodes[id.index()].disposed {
                continue;
            }
            if let Some(value) = self.recompute(id, &changed) {
                self.nodes[id.index()].value = Some(value);
                changed[id.index()] = true;
                self.notify(id);
                self.enqueue_dependents(id, &mut worklist, &mut queued);
            }
        }
    }

    fn enqueue_dependents(
        &self,
        id: SignalId,
        worklist: &mut BinaryHeap<Reverse<(u32, u32)>>,
        queued: &mut [bool],
    ) {
        for &dependent in &self.nodes[id.index()].dependents {
            let index = dependent.index();
            if !queued[index] && !self.nodes[index].disposed {
                queued[index] = true;
                worklist.push(Reverse((self.nodes[index].rank, dependent.0)));
            }
        }
    }

    fn recompute(&mut self, id: SignalId, changed: &[bool]) -> Option<DynValue> {
        // Take the closure out of the node so the graph stays readable while
        // it runs.
        let (deps, mut recompute) = match &mut self.nodes[id.index()].producer {
            Producer::Derived { deps, recompute } => (deps.clone(), recompute.take()?),
            Producer::Source => return None,
        };
        let values: Vec<Option<DynValue>> = deps
            .iter()
            .map(|dep| self.nodes[dep.index()].value.clone())
            .collect();
        let flags: Vec<bool> = deps.iter().map(|dep| changed[dep.index()]).collect();
        let result = recompute(DepView {
            values: &values,
            changed: &flags,
        });
        if let Producer::Derived { recompute: slot, .. } = &mut self.nodes[id.index()].producer {
            *slot = Some(recompute);
        }
        result
    }

    fn notify(&mut self, id: SignalId) {
        let Some(value) = self.nodes[id.index()].value.clone() else {
            return;
        };
        let mut sinks = std::mem::take(&mut self.nodes[id.index()].subscribers);
        for sink in &mut sinks {
            sink(&*value);
        }
        let node = &mut self.nodes[id.index()];
        sinks.append(&mut node.subscribers);
        node.subscribers = sinks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_source_push_get() {
        let mut graph = SignalGraph::new();
        let s = graph.source::<i32>();
        assert_eq!(graph.get(s), None);
        graph.push(s, 7).unwrap();
        assert_eq!(graph.get(s), Some(7));
    }

    #[test]
    fn test_source_with_initial() {
        let mut graph = SignalGraph::new();
        let s = graph.source_with(41);
        assert_eq!(graph.get(s), Some(41));
    }

    #[test]
    fn test_derived_recomputes_on_push() {
        let mut graph = SignalGraph::new();
        let s = graph.source::<i32>();
        let doubled = graph
            .derive(&[s.id()], |view: DepView<'_>| {
                view.value::<i32>(0).map(|v| v * 2)
            })
            .unwrap();
        graph.push(s, 5).unwrap();
        assert_eq!(graph.get(doubled), Some(10));
    }

    #[test]
    fn test_write_to_derived_rejected() {
        let mut graph = SignalGraph::new();
        let s = graph.source::<i32>();
        let d = graph
            .derive(&[s.id()], |view: DepView<'_>| view.value::<i32>(0).copied())
            .unwrap();
        assert_eq!(graph.push(d, 1), Err(SignalError::WriteToDerived(d.id())));
    }

    #[test]
    fn test_foreign_signal_rejected() {
        let mut graph = SignalGraph::new();
        let mut other = SignalGraph::new();
        let foreign = other.source::<i32>();
        other.source::<i32>();
        assert_eq!(
            graph.push(foreign, 1),
            Err(SignalError::UnknownSignal(foreign.id()))
        );
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut graph = SignalGraph::new();
        let mut other = SignalGraph::new();
        graph.source::<String>();
        let forged = other.source::<i32>();
        assert_eq!(
            graph.push(forged, 1),
            Err(SignalError::TypeMismatch(forged.id()))
        );
    }

    #[test]
    fn test_diamond_is_glitch_free() {
        let mut graph = SignalGraph::new();
        let s = graph.source::<i32>();
        let left = graph
            .derive(&[s.id()], |view: DepView<'_>| {
                view.value::<i32>(0).map(|v| v + 1)
            })
            .unwrap();
        let right = graph
            .derive(&[s.id()], |view: DepView<'_>| {
                view.value::<i32>(0).map(|v| v * 10)
            })
            .unwrap();
        let joined = graph
            .derive(&[left.id(), right.id()], |view: DepView<'_>| {
                Some((*view.value::<i32>(0)?, *view.value::<i32>(1)?))
            })
            .unwrap();

        let observed: Rc<RefCell<Vec<(i32, i32)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&observed);
        graph
            .subscribe(joined, move |pair: &(i32, i32)| sink.borrow_mut().push(*pair))
            .unwrap();

        graph.push(s, 3).unwrap();
        graph.push(s, 4).unwrap();

        // One notification per push, both halves consistent with the same push.
        assert_eq!(*observed.borrow(), vec![(4, 30), (5, 40)]);
    }

    #[test]
    fn test_no_update_sentinel_stops_propagation() {
        let mut graph = SignalGraph::new();
        let s = graph.source::<i32>();
        let even = graph
            .derive(&[s.id()], |view: DepView<'_>| {
                let v = *view.value::<i32>(0)?;
                (v % 2 == 0).then_some(v)
            })
            .unwrap();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        graph
            .subscribe(even, move |_: &i32| *sink.borrow_mut() += 1)
            .unwrap();

        graph.push(s, 1).unwrap();
        graph.push(s, 2).unwrap();
        graph.push(s, 3).unwrap();
        assert_eq!(*count.borrow(), 1);
        assert_eq!(graph.get(even), Some(2));
    }

    #[test]
    fn test_dispose_stops_updates() {
        let mut graph = SignalGraph::new();
        let s = graph.source::<i32>();
        let d = graph
            .derive(&[s.id()], |view: DepView<'_>| view.value::<i32>(0).copied())
            .unwrap();
        graph.push(s, 1).unwrap();
        assert_eq!(graph.get(d), Some(1));

        graph.dispose(d);
        graph.push(s, 2).unwrap();
        assert_eq!(graph.get(d), None);
    }

    #[test]
    fn test_push_to_disposed_source_is_noop() {
        let mut graph = SignalGraph::new();
        let s = graph.source_with(1);
        graph.dispose(s);
        assert_eq!(graph.push(s, 2), Ok(()));
        assert_eq!(graph.get(s), None);
    }

    #[test]
    fn test_rewire_switches_dependency() {
        let mut graph = SignalGraph::new();
        let a = graph.source::<i32>();
        let b = graph.source::<i32>();
        let d = graph
            .derive(&[a.id()], |view: DepView<'_>| {
                view.value::<i32>(0).map(|v| v + 100)
            })
            .unwrap();
        graph.push(a, 1).unwrap();
        assert_eq!(graph.get(d), Some(101));

        graph.rewire(d.id(), &[b.id()]).unwrap();
        graph.push(a, 2).unwrap();
        assert_eq!(graph.get(d), Some(101));
        graph.push(b, 7).unwrap();
        assert_eq!(graph.get(d), Some(107));
    }

    #[test]
    fn test_rewire_cycle_rejected() {
        let mut graph = SignalGraph::new();
        let s = graph.source::<i32>();
        let b = graph
            .derive(&[s.id()], |view: DepView<'_>| view.value::<i32>(0).copied())
            .unwrap();
        let c = graph
            .derive(&[b.id()], |view: DepView<'_>| view.value::<i32>(0).copied())
            .unwrap();
        assert_eq!(
            graph.rewire(b.id(), &[c.id()]),
            Err(SignalError::DependencyCycle(b.id()))
        );
        // Graph stays usable.
        graph.push(s, 9).unwrap();
        assert_eq!(graph.get(c), Some(9));
    }

    #[test]
    fn test_rewire_source_rejected() {
        let mut graph = SignalGraph::new();
        let s = graph.source::<i32>();
        assert_eq!(
            graph.rewire(s.id(), &[]),
            Err(SignalError::NotDerived(s.id()))
        );
    }
}
