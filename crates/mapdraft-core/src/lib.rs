//! Interactive extent editing core.
//!
//! Lets a user draw and then reshape an axis-aligned rectangle on a map with
//! pointer gestures. The host feeds [`PointerEvent`]s to an [`ExtentEditor`];
//! the editor pushes geometry to two overlay collaborators and notifies its
//! subscribers whenever the extent changes. Rendering, DOM events and
//! projection math stay on the host's side of the [`MapAdapter`] and
//! [`Overlay`] seams.

pub mod editor;
pub mod event;
pub mod extent;
pub mod gesture;
pub mod handles;
pub mod map;
pub mod overlay;
pub mod snap;

pub use editor::{EditError, ExtentEditor, ExtentEditorOptions};
pub use event::{PointerEvent, PointerEventType};
pub use extent::{closest_segment, Extent, Segment};
pub use gesture::{GestureState, Interpreter, Transition};
pub use handles::{drag_handler, edge_handler, point_handler, DragHandler};
pub use map::{set_map, IdentityMap, MapAdapter, MapContext, MapHandle, ScaledMap, View};
pub use overlay::{shared, NullOverlay, Overlay, SharedOverlay};
pub use snap::{snap_to_extent, DEFAULT_PIXEL_TOLERANCE};
