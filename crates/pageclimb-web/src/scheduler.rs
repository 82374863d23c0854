use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pageclimb_engine::{Control, InputEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, KeyboardEvent, Window};

use crate::dom::DomGeometrySource;
use crate::runner::SessionRunner;

pub type SharedRunner = Rc<RefCell<SessionRunner<DomGeometrySource>>>;

type FrameCallback = Closure<dyn FnMut(f64)>;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Owns every callback the session registers with the browser: the
/// animation-frame loop, the periodic rescan timer and the page listeners.
/// `stop` (or drop) unregisters all of them.
pub struct Scheduler {
    window: Window,
    running: Rc<Cell<bool>>,
    frame: Rc<RefCell<Option<FrameCallback>>>,
    frame_handle: Rc<Cell<Option<i32>>>,
    rescan: Option<(i32, Closure<dyn FnMut()>)>,
    listeners: Vec<Listener>,
}

impl Scheduler {
    pub fn start(window: Window, runner: SharedRunner) -> Result<Self, JsValue> {
        let mut scheduler = Self {
            window,
            running: Rc::new(Cell::new(true)),
            frame: Rc::new(RefCell::new(None)),
            frame_handle: Rc::new(Cell::new(None)),
            rescan: None,
            listeners: Vec::new(),
        };

        scheduler.start_frames(runner.clone())?;
        scheduler.start_rescan_timer(runner.clone())?;

        let target: EventTarget = scheduler.window.clone().into();
        for kind in ["scroll", "resize"] {
            let runner = runner.clone();
            scheduler.listen(&target, kind, move |_| {
                runner.borrow_mut().request_rescan(false);
            })?;
        }

        let down = runner.clone();
        scheduler.listen(&target, "keydown", move |event| {
            if let Some(key_code) = game_key(&event) {
                event.prevent_default();
                down.borrow_mut().push_input(InputEvent::KeyDown { key_code });
            }
        })?;
        let up = runner.clone();
        scheduler.listen(&target, "keyup", move |event| {
            if let Some(key_code) = game_key(&event) {
                up.borrow_mut().push_input(InputEvent::KeyUp { key_code });
            }
        })?;
        scheduler.listen(&target, "blur", move |_| {
            runner.borrow_mut().push_input(InputEvent::FocusLost);
        })?;

        log::debug!("scheduler started with {} listeners", scheduler.listeners.len());
        Ok(scheduler)
    }

    fn start_frames(&mut self, runner: SharedRunner) -> Result<(), JsValue> {
        let window = self.window.clone();
        let next = self.frame.clone();
        let handle = self.frame_handle.clone();
        let running = self.running.clone();

        *self.frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
            if !running.get() {
                return;
            }
            runner.borrow_mut().tick_at(now_ms);
            if let Some(callback) = next.borrow().as_ref() {
                handle.set(window.request_animation_frame(callback.as_ref().unchecked_ref()).ok());
            }
        }) as Box<dyn FnMut(f64)>));

        if let Some(callback) = self.frame.borrow().as_ref() {
            let id = self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref())?;
            self.frame_handle.set(Some(id));
        }
        Ok(())
    }

    fn start_rescan_timer(&mut self, runner: SharedRunner) -> Result<(), JsValue> {
        let interval_ms = runner.borrow().rescan_interval_ms();
        if interval_ms == 0 {
            return Ok(());
        }
        let callback = Closure::wrap(Box::new(move || {
            // Keeps the spawn following the layout while the page is still
            // loading; the session ignores it once the player has moved.
            runner.borrow_mut().request_rescan(true);
        }) as Box<dyn FnMut()>);
        let id = self.window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            interval_ms.min(i32::MAX as u32) as i32,
        )?;
        self.rescan = Some((id, callback));
        Ok(())
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            callback,
        });
        Ok(())
    }

    /// Cancel the frame loop and timer and remove every listener.
    /// Safe to call more than once.
    pub fn stop(&mut self) {
        if !self.running.replace(false) {
            return;
        }
        if let Some(id) = self.frame_handle.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        // Breaks the closure's reference to its own slot.
        self.frame.borrow_mut().take();

        if let Some((id, _callback)) = self.rescan.take() {
            self.window.clear_interval_with_handle(id);
        }
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        log::debug!("scheduler stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Key code of a keyboard event the game handles, unless the user is typing
/// into a form field or holding a modifier.
fn game_key(event: &Event) -> Option<u32> {
    let key = event.dyn_ref::<KeyboardEvent>()?;
    if key.ctrl_key() || key.meta_key() || key.alt_key() {
        return None;
    }
    if let Some(target) = event.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok()) {
        let tag = target.tag_name();
        let editable = target.get_attribute("contenteditable").is_some();
        if editable || matches!(tag.as_str(), "INPUT" | "TEXTAREA" | "SELECT") {
            return None;
        }
    }
    let key_code = key.key_code();
    Control::from_key_code(key_code).map(|_| key_code)
}
