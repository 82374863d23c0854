/// Input events the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed (DOM `keyCode`). Auto-repeat arrives as more presses.
    KeyDown { key_code: u32 },
    /// A key was released.
    KeyUp { key_code: u32 },
    /// The page lost focus; key-up events may never arrive.
    FocusLost,
}

/// Key events collected between two frames.
///
/// The page script (or the scheduler's listeners) pushes as events arrive;
/// the runner drains them once per frame, before stepping.
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event. A key-down that repeats the most recent event is
    /// dropped, so auto-repeat cannot pile up while frames are slow. Focus
    /// loss releases every key, which makes anything queued before it moot.
    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::FocusLost => self.pending.clear(),
            InputEvent::KeyDown { .. } if self.pending.last() == Some(&event) => return,
            _ => {}
        }
        self.pending.push(event);
    }

    /// Pending events in arrival order; the queue is empty afterwards.
    pub fn drain(&mut self) -> std::vec::Drain<'_, InputEvent> {
        self.pending.drain(..)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
