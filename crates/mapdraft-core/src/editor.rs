//! The extent editing controller.
//!
//! [`ExtentEditor`] owns a signal graph and a gesture machine. Pointer events
//! from the host drive the machine; the machine's states push into the
//! graph's source signals; derived signals feed the overlay collaborators
//! and the committed-extent subscribers.

use crate::event::{PointerEvent, PointerEventType};
use crate::extent::{Extent, Segment};
use crate::gesture::{GestureState, Interpreter, Transition};
use crate::handles::{drag_handler, DragHandler};
use crate::map::{self, MapContext, MapHandle};
use crate::overlay::SharedOverlay;
use crate::snap::{snap_to_extent, DEFAULT_PIXEL_TOLERANCE};
use kurbo::Point;
use log::error;
use mapdraft_reactive::{Signal, SignalError, SignalGraph};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("pixel tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
    #[error(transparent)]
    Signal(#[from] SignalError),
}

/// Construction options for [`ExtentEditor`].
pub struct ExtentEditorOptions {
    /// Extent to start editing; `None` starts with a fresh draw.
    pub extent: Option<Extent>,
    /// Snap tolerance in pixels.
    pub pixel_tolerance: f64,
    /// Overlay showing the extent polygon (closed ring).
    pub extent_overlay: Option<SharedOverlay<Vec<Point>>>,
    /// Overlay showing the active (snapped or raw) pointer vertex.
    pub vertex_overlay: Option<SharedOverlay<Point>>,
}

impl Default for ExtentEditorOptions {
    fn default() -> Self {
        Self {
            extent: None,
            pixel_tolerance: DEFAULT_PIXEL_TOLERANCE,
            extent_overlay: None,
            vertex_overlay: None,
        }
    }
}

/// Overlay storage shared between the context and the graph subscribers.
/// Taking the overlay out stops all further updates to it, so `dispose` runs
/// at most once.
type OverlaySlot<G> = Rc<RefCell<Option<SharedOverlay<G>>>>;

/// Shared state the gesture states operate on: the signal graph, the handles
/// into it and the overlay slots.
struct EditorContext {
    graph: SignalGraph,
    events: Signal<PointerEvent>,
    extent: Signal<Option<Extent>>,
    vertex: Signal<Option<Point>>,
    snapped: Signal<Option<Point>>,
    committed: Signal<Option<Extent>>,
    map: Signal<Option<MapHandle>>,
    map_ctx: Signal<Option<MapContext>>,
    extent_overlay: OverlaySlot<Vec<Point>>,
    vertex_overlay: OverlaySlot<Point>,
}

impl EditorContext {
    fn new(options: ExtentEditorOptions) -> Result<Self, EditError> {
        let mut graph = SignalGraph::new();
        let events = graph.source::<PointerEvent>();
        let extent = graph.source_with::<Option<Extent>>(None);
        let vertex = graph.source_with::<Option<Point>>(None);
        let map = graph.source_with::<Option<MapHandle>>(None);

        let segments = graph.map(extent, |e: &Option<Extent>| {
            e.map(|extent| extent.segments().to_vec())
        })?;
        let polygon = graph.map(extent, |e: &Option<Extent>| {
            e.map(|extent| extent.polygon())
        })?;

        let tolerance = options.pixel_tolerance;
        let snapped = graph.combine2(
            events,
            segments,
            move |event: Option<&PointerEvent>, segments: Option<&Option<Vec<Segment>>>| {
                let event = event?;
                let snapped = segments
                    .and_then(|s| s.as_deref())
                    .and_then(|segments| snap_to_extent(event, segments, tolerance));
                Some(snapped)
            },
        )?;

        let committed = graph.skip_repeats(extent)?;

        // One map reference can arrive on every attach call; the conversion
        // context is rebuilt only when the reference actually changes.
        let map_same = graph.skip_repeats_by(
            map,
            |a: &Option<MapHandle>, b: &Option<MapHandle>| match (a, b) {
                (Some(a), Some(b)) => a.same(b),
                (None, None) => true,
                _ => false,
            },
        )?;
        let map_ctx = {
            let mut context: Option<MapContext> = None;
            graph.map(map_same, move |m: &Option<MapHandle>| {
                context = map::set_map(context.take(), m.clone());
                context.clone()
            })?
        };

        let extent_overlay: OverlaySlot<Vec<Point>> =
            Rc::new(RefCell::new(options.extent_overlay));
        let slot = Rc::clone(&extent_overlay);
        graph.subscribe(polygon, move |ring: &Option<Vec<Point>>| {
            if let Some(overlay) = slot.borrow().as_ref() {
                overlay.borrow_mut().update(ring.as_ref());
            }
        })?;

        let vertex_overlay: OverlaySlot<Point> = Rc::new(RefCell::new(options.vertex_overlay));
        let slot = Rc::clone(&vertex_overlay);
        graph.subscribe(vertex, move |point: &Option<Point>| {
            if let Some(overlay) = slot.borrow().as_ref() {
                overlay.borrow_mut().update(point.as_ref());
            }
        })?;

        Ok(Self {
            graph,
            events,
            extent,
            vertex,
            snapped,
            committed,
            map,
            map_ctx,
            extent_overlay,
            vertex_overlay,
        })
    }

    fn push_or_log<T: 'static>(&mut self, signal: Signal<T>, value: T) {
        if let Err(err) = self.graph.push(signal, value) {
            error!("rejected push to signal {id}: {err}", id = signal.id());
        }
    }

    fn set_extent(&mut self, value: Option<Extent>) {
        self.push_or_log(self.extent, value);
    }

    fn set_vertex(&mut self, value: Option<Point>) {
        self.push_or_log(self.vertex, value);
    }

    fn push_event(&mut self, event: &PointerEvent) {
        self.push_or_log(self.events, event.clone());
    }

    fn extent(&self) -> Option<Extent> {
        self.graph.get(self.extent).flatten()
    }

    fn snapped(&self) -> Option<Point> {
        self.graph.get(self.snapped).flatten()
    }

    fn clear(&mut self) {
        self.set_extent(None);
        self.set_vertex(None);
    }

    /// Take the overlays out of circulation and dispose them. Later signal
    /// propagations no longer reach them.
    fn dispose_overlays(&mut self) {
        if let Some(overlay) = self.extent_overlay.borrow_mut().take() {
            overlay.borrow_mut().dispose();
        }
        if let Some(overlay) = self.vertex_overlay.borrow_mut().take() {
            overlay.borrow_mut().dispose();
        }
    }

    fn dispose(&mut self) {
        self.push_or_log(self.map, None);
        self.dispose_overlays();
        self.graph.dispose(self.events);
        self.graph.dispose(self.extent);
        self.graph.dispose(self.vertex);
        self.graph.dispose(self.map);
    }
}

/// Waiting for a gesture. Tracks the pointer in the vertex overlay; a press
/// begins a new draw.
struct Idle;

impl GestureState<PointerEvent, EditorContext> for Idle {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn on_event(
        &mut self,
        event: &PointerEvent,
        context: &mut EditorContext,
    ) -> Option<Transition<PointerEvent, EditorContext>> {
        match event.event_type {
            PointerEventType::PointerMove => {
                context.set_vertex(Some(event.coordinate));
                Some(Transition::Stay)
            }
            PointerEventType::PointerDown => Some(Transition::To(Box::new(Drawing {
                start: event.coordinate,
            }))),
            _ => None,
        }
    }
}

/// Dragging out a fresh box from the press point.
struct Drawing {
    start: Point,
}

impl GestureState<PointerEvent, EditorContext> for Drawing {
    fn name(&self) -> &'static str {
        "drawing"
    }

    fn on_event(
        &mut self,
        event: &PointerEvent,
        context: &mut EditorContext,
    ) -> Option<Transition<PointerEvent, EditorContext>> {
        match event.event_type {
            PointerEventType::PointerDrag => {
                context.set_vertex(Some(event.coordinate));
                context.set_extent(Some(Extent::from_points(self.start, event.coordinate)));
                Some(Transition::Stay)
            }
            PointerEventType::PointerUp => match context.extent() {
                Some(extent) if !extent.is_zero_area() => {
                    Some(Transition::To(Box::new(Modifying { handler: None })))
                }
                _ => {
                    // A click without a drag, or a collapsed box: nothing to
                    // keep.
                    context.clear();
                    context.dispose_overlays();
                    Some(Transition::To(Box::new(Idle)))
                }
            },
            _ => None,
        }
    }
}

/// A box exists. Hovering snaps the vertex overlay to its boundary; a press
/// grabs a corner or an edge, or starts over from an unsnapped point.
struct Modifying {
    handler: Option<DragHandler>,
}

impl GestureState<PointerEvent, EditorContext> for Modifying {
    fn name(&self) -> &'static str {
        "modifying"
    }

    fn on_event(
        &mut self,
        event: &PointerEvent,
        context: &mut EditorContext,
    ) -> Option<Transition<PointerEvent, EditorContext>> {
        match event.event_type {
            PointerEventType::PointerMove => {
                context.push_event(event);
                let vertex = context.snapped().unwrap_or(event.coordinate);
                context.set_vertex(Some(vertex));
                Some(Transition::Stay)
            }
            PointerEventType::PointerDown => {
                context.push_event(event);
                let current = context.extent();
                let snapped = context.snapped();
                if current.is_none() || snapped.is_none() {
                    // Unsnapped press restarts from a collapsed box at the
                    // press point.
                    context.set_extent(Some(Extent::from_points(
                        event.coordinate,
                        event.coordinate,
                    )));
                }
                self.handler = Some(drag_handler(
                    current.as_ref(),
                    snapped,
                    event.coordinate,
                ));
                Some(Transition::Stay)
            }
            PointerEventType::PointerDrag => {
                if let Some(handler) = &self.handler {
                    let next = handler(event.coordinate);
                    context.set_extent(next);
                }
                Some(Transition::Stay)
            }
            PointerEventType::PointerUp => {
                self.handler = None;
                if context.extent().is_some_and(|extent| extent.is_zero_area()) {
                    context.set_extent(None);
                }
                Some(Transition::Stay)
            }
        }
    }
}

/// Interactive editor for one extent on one map.
pub struct ExtentEditor {
    context: EditorContext,
    machine: Interpreter<PointerEvent, EditorContext>,
    disposed: bool,
}

impl ExtentEditor {
    pub fn new(options: ExtentEditorOptions) -> Result<Self, EditError> {
        if !options.pixel_tolerance.is_finite() || options.pixel_tolerance < 0.0 {
            return Err(EditError::InvalidTolerance(options.pixel_tolerance));
        }
        let initial = options.extent;
        let mut context = EditorContext::new(options)?;
        let state: Box<dyn GestureState<PointerEvent, EditorContext>> = if initial.is_some() {
            context.set_extent(initial);
            Box::new(Modifying { handler: None })
        } else {
            Box::new(Idle)
        };
        Ok(Self {
            context,
            machine: Interpreter::new(state),
            disposed: false,
        })
    }

    /// Feed one pointer event. Returns whether the active gesture state
    /// consumed it; unconsumed events are the host's to handle.
    pub fn handle_event(&mut self, event: &PointerEvent) -> bool {
        if self.disposed {
            return false;
        }
        self.machine.handle(event, &mut self.context)
    }

    /// The current extent, if any.
    pub fn extent(&self) -> Option<Extent> {
        self.context.extent()
    }

    /// Replace the edited extent. `Some` puts the editor into the modifying
    /// state; `None` clears and returns to idle.
    pub fn set_extent(&mut self, extent: Option<Extent>) {
        if self.disposed {
            return;
        }
        self.context.set_extent(extent);
        match extent {
            Some(_) => self.machine.reset(Box::new(Modifying { handler: None })),
            None => self.machine.reset(Box::new(Idle)),
        }
    }

    /// Subscribe to committed extent changes. Consecutive equal values
    /// notify once.
    pub fn on_extent_changed<F>(&mut self, sink: F) -> Result<(), EditError>
    where
        F: FnMut(&Option<Extent>) + 'static,
    {
        self.context
            .graph
            .subscribe(self.context.committed, sink)?;
        Ok(())
    }

    /// Attach to a map, or detach with `None`. Detaching aborts the editing
    /// session.
    pub fn set_map(&mut self, map: Option<MapHandle>) {
        if self.disposed {
            return;
        }
        if map.is_none() {
            self.context.clear();
            self.machine.reset(Box::new(Idle));
        }
        self.context.push_or_log(self.context.map, map);
    }

    /// Conversion context for the attached map.
    pub fn map_context(&self) -> Option<MapContext> {
        self.context.graph.get(self.context.map_ctx).flatten()
    }

    /// Name of the active gesture state.
    pub fn state_name(&self) -> &'static str {
        self.machine.state_name()
    }

    /// Drop the in-progress geometry and return to idle. Overlays are
    /// cleared but stay usable.
    pub fn abort(&mut self) {
        if self.disposed {
            return;
        }
        self.context.clear();
        self.machine.reset(Box::new(Idle));
    }

    /// Release overlays and stop reacting to events. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.context.dispose();
    }
}

impl Drop for ExtentEditor {
    fn drop(&mut self) {
        self.dispose();
    }
}
