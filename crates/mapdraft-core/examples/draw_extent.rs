//! Headless walkthrough: draw a box, then drag one of its corners.
//!
//! Run with `RUST_LOG=debug` to see the gesture transitions.

use kurbo::Point;
use mapdraft_core::{
    shared, ExtentEditor, ExtentEditorOptions, IdentityMap, MapHandle, Overlay, PointerEvent,
    PointerEventType,
};

struct PrintOverlay {
    label: &'static str,
}

impl<G: std::fmt::Debug> Overlay<G> for PrintOverlay {
    fn update(&mut self, geometry: Option<&G>) {
        match geometry {
            Some(geometry) => println!("[{}] {geometry:?}", self.label),
            None => println!("[{}] cleared", self.label),
        }
    }

    fn dispose(&mut self) {
        println!("[{}] disposed", self.label);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut editor = ExtentEditor::new(ExtentEditorOptions {
        extent_overlay: Some(shared(PrintOverlay { label: "extent" })),
        vertex_overlay: Some(shared(PrintOverlay { label: "vertex" })),
        ..ExtentEditorOptions::default()
    })?;
    editor.on_extent_changed(|extent| println!("committed: {extent:?}"))?;

    let map = MapHandle::new(IdentityMap);
    editor.set_map(Some(map.clone()));

    let gesture = [
        (PointerEventType::PointerDown, 2.0, 2.0),
        (PointerEventType::PointerDrag, 6.0, 4.0),
        (PointerEventType::PointerDrag, 8.0, 6.0),
        (PointerEventType::PointerUp, 8.0, 6.0),
        // Grab the top-right corner and pull it inwards.
        (PointerEventType::PointerMove, 8.0, 6.0),
        (PointerEventType::PointerDown, 8.0, 6.0),
        (PointerEventType::PointerDrag, 5.0, 5.0),
        (PointerEventType::PointerUp, 5.0, 5.0),
    ];
    for (event_type, x, y) in gesture {
        let event = PointerEvent::new(event_type, Point::new(x, y), map.clone());
        editor.handle_event(&event);
        println!("-- {event_type:?} at ({x}, {y}) -> {}", editor.state_name());
    }

    println!("final extent: {:?}", editor.extent());
    editor.dispose();
    Ok(())
}
