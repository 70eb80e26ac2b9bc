use crate::layout::Size;

/// Coalesces container size changes to at most one recompute per frame.
///
/// `observe` may be called any number of times between frames; only the
/// last size counts, and a frame whose pending size equals the applied one
/// does nothing.
#[derive(Debug, Clone)]
pub struct ResizeCoordinator {
    applied: Size,
    pending: Option<Size>,
}

impl ResizeCoordinator {
    pub fn new(initial: Size) -> Self {
        Self {
            applied: initial,
            pending: None,
        }
    }

    pub fn applied(&self) -> Size {
        self.applied
    }

    pub fn observe(&mut self, size: Size) {
        if self.pending.is_none() && size == self.applied {
            return;
        }
        self.pending = Some(size);
    }

    /// Called once per animation frame. Returns the size to lay out for, if
    /// it changed since the last applied one.
    pub fn take_frame(&mut self) -> Option<Size> {
        let size = self.pending.take()?;
        if size == self.applied {
            return None;
        }
        self.applied = size;
        Some(size)
    }
}
