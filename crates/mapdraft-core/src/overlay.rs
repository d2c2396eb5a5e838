//! Overlay collaborator contract.

use std::cell::RefCell;
use std::rc::Rc;

/// A host-side layer the editor pushes geometry to.
///
/// `update` must be idempotent for a repeated identical value; `None` means
/// "clear the overlay". After `dispose` the caller sends nothing further.
pub trait Overlay<G> {
    fn update(&mut self, geometry: Option<&G>);
    fn dispose(&mut self);
}

/// Overlay that ignores everything, for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOverlay;

impl<G> Overlay<G> for NullOverlay {
    fn update(&mut self, _geometry: Option<&G>) {}

    fn dispose(&mut self) {}
}

/// Shared ownership wrapper the editor keeps until disposal.
pub type SharedOverlay<G> = Rc<RefCell<dyn Overlay<G>>>;

/// Wrap an overlay for handing to [`crate::ExtentEditor`].
pub fn shared<G>(overlay: impl Overlay<G> + 'static) -> SharedOverlay<G> {
    Rc::new(RefCell::new(overlay))
}
