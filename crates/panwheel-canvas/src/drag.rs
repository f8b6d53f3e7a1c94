//! Drag-to-pan with a pressed mouse button.

/// Where a drag started and the translation the canvas had at that moment.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DragAnchor {
    client_start: [f64; 2],
    frozen_translate: [f64; 2],
}

/// Tracks one mouse drag.
///
/// The translation while dragging is always the frozen start translation
/// plus the total pointer travel, so no error accumulates over many moves.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MousePan {
    anchor: Option<DragAnchor>,
}

impl MousePan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a drag at `client`, freezing `translate`. A press during a drag
    /// restarts it from the new position.
    pub fn press(&mut self, client: [f64; 2], translate: [f64; 2]) {
        self.anchor = Some(DragAnchor {
            client_start: client,
            frozen_translate: translate,
        });
    }

    /// Translation for the pointer at `client`, or `None` when no button is held.
    pub fn drag_to(&self, client: [f64; 2]) -> Option<[f64; 2]> {
        let anchor = self.anchor?;
        Some([
            anchor.frozen_translate[0] + (client[0] - anchor.client_start[0]),
            anchor.frozen_translate[1] + (client[1] - anchor.client_start[1]),
        ])
    }

    pub fn release(&mut self) {
        self.anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }
}
