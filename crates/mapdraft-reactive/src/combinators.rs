//! Standard combinators built on [`SignalGraph::derive`].

use crate::error::SignalError;
use crate::graph::{DepView, Signal, SignalGraph};
use std::rc::Rc;

/// A function value carried by a signal, applied by [`SignalGraph::ap`].
pub type FnSignalValue<A, T> = Rc<dyn Fn(&A) -> T>;

impl SignalGraph {
    /// New signal emitting `f(value)` for each value of `signal`.
    pub fn map<A, T, F>(&mut self, signal: Signal<A>, mut f: F) -> Result<Signal<T>, SignalError>
    where
        A: 'static,
        T: 'static,
        F: FnMut(&A) -> T + 'static,
    {
        self.derive(&[signal.id()], move |view: DepView<'_>| {
            view.value::<A>(0).map(&mut f)
        })
    }

    /// New signal passing through only values satisfying `pred`.
    pub fn filter<A, P>(&mut self, signal: Signal<A>, mut pred: P) -> Result<Signal<A>, SignalError>
    where
        A: Clone + 'static,
        P: FnMut(&A) -> bool + 'static,
    {
        self.derive(&[signal.id()], move |view: DepView<'_>| {
            let value = view.value::<A>(0)?;
            pred(value).then(|| value.clone())
        })
    }

    /// New signal emitting every value of either input.
    pub fn merge<A>(&mut self, a: Signal<A>, b: Signal<A>) -> Result<Signal<A>, SignalError>
    where
        A: Clone + 'static,
    {
        self.derive(&[a.id(), b.id()], move |view: DepView<'_>| {
            if view.changed(0) {
                view.value::<A>(0).cloned()
            } else if view.changed(1) {
                view.value::<A>(1).cloned()
            } else {
                None
            }
        })
    }

    /// Apply the function currently held by `func` to each new value of
    /// `value`. A change of `func` alone does not emit.
    pub fn ap<A, T>(
        &mut self,
        value: Signal<A>,
        func: Signal<FnSignalValue<A, T>>,
    ) -> Result<Signal<T>, SignalError>
    where
        A: 'static,
        T: 'static,
    {
        self.derive(&[value.id(), func.id()], move |view: DepView<'_>| {
            if !view.changed(0) {
                return None;
            }
            let v = view.value::<A>(0)?;
            let f = view.value::<FnSignalValue<A, T>>(1)?;
            Some(f(v))
        })
    }

    /// Combine two signals; `f` sees both current values and decides whether
    /// to emit.
    pub fn combine2<A, B, T, F>(
        &mut self,
        a: Signal<A>,
        b: Signal<B>,
        mut f: F,
    ) -> Result<Signal<T>, SignalError>
    where
        A: 'static,
        B: 'static,
        T: 'static,
        F: FnMut(Option<&A>, Option<&B>) -> Option<T> + 'static,
    {
        self.derive(&[a.id(), b.id()], move |view: DepView<'_>| {
            f(view.value::<A>(0), view.value::<B>(1))
        })
    }

    /// Suppress propagation when the new value equals the last emitted one.
    pub fn skip_repeats<A>(&mut self, signal: Signal<A>) -> Result<Signal<A>, SignalError>
    where
        A: Clone + PartialEq + 'static,
    {
        self.skip_repeats_by(signal, |a, b| a == b)
    }

    /// [`SignalGraph::skip_repeats`] with a caller-supplied equality, e.g.
    /// reference identity for shared handles.
    pub fn skip_repeats_by<A, E>(
        &mut self,
        signal: Signal<A>,
        equals: E,
    ) -> Result<Signal<A>, SignalError>
    where
        A: Clone + 'static,
        E: Fn(&A, &A) -> bool + 'static,
    {
        let mut last: Option<A> = None;
        self.derive(&[signal.id()], move |view: DepView<'_>| {
            let value = view.value::<A>(0)?;
            if last.as_ref().is_some_and(|prev| equals(prev, value)) {
                return None;
            }
            last = Some(value.clone());
            last.clone()
        })
    }
}
