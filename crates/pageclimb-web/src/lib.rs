pub mod dom;
pub mod runner;
pub mod scheduler;

pub use dom::DomGeometrySource;
pub use runner::SessionRunner;
pub use scheduler::{Scheduler, SharedRunner};

use std::cell::RefCell;
use std::rc::Rc;

use pageclimb_engine::{InputEvent, PlayerFrame, SessionConfig};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SharedRunner>> = RefCell::new(None);
    static SCHEDULER: RefCell<Option<Scheduler>> = RefCell::new(None);
}

/// Run `f` against the current session, if one was initialized.
fn with_runner<R>(f: impl FnOnce(&mut SessionRunner<DomGeometrySource>) -> R) -> Option<R> {
    let runner = RUNNER.with(|cell| cell.borrow().clone())?;
    let mut borrow = runner.borrow_mut();
    Some(f(&mut borrow))
}

fn stop_scheduler() {
    // Dropping the scheduler unregisters its callbacks.
    let scheduler = SCHEDULER.with(|cell| cell.borrow_mut().take());
    drop(scheduler);
}

/// Create a session from a JSON config (empty string for defaults) and run
/// the first scan. Replaces any previous session.
#[wasm_bindgen]
pub fn game_init(config_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    game_teardown();

    let config = if config_json.trim().is_empty() {
        SessionConfig::default()
    } else {
        SessionConfig::from_json(config_json).unwrap_or_else(|err| {
            log::warn!("invalid session config, using defaults: {}", err);
            SessionConfig::default()
        })
    };

    let source = DomGeometrySource::new()?;
    let mut runner = SessionRunner::new(config, source);
    let stats = runner.init();
    log::info!(
        "pageclimb: initialized with {} blocks ({} elements sampled)",
        runner.block_count(),
        stats.sampled
    );

    RUNNER.with(|cell| *cell.borrow_mut() = Some(Rc::new(RefCell::new(runner))));
    Ok(())
}

/// Start the browser-driven loop: animation frames, rescan timer, and the
/// scroll, resize, keyboard and blur listeners.
#[wasm_bindgen]
pub fn game_start() -> Result<(), JsValue> {
    let runner = RUNNER
        .with(|cell| cell.borrow().clone())
        .ok_or_else(|| JsValue::from_str("call game_init() first"))?;
    stop_scheduler();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let scheduler = Scheduler::start(window, runner)?;
    SCHEDULER.with(|cell| *cell.borrow_mut() = Some(scheduler));
    Ok(())
}

/// Advance one frame by hand. Not needed once `game_start` is running.
#[wasm_bindgen]
pub fn game_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

#[wasm_bindgen]
pub fn game_scan(initialize_player: bool) {
    with_runner(|r| r.scan(initialize_player));
}

#[wasm_bindgen]
pub fn game_key_down(key_code: u32) {
    with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }));
}

#[wasm_bindgen]
pub fn game_key_up(key_code: u32) {
    with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
}

#[wasm_bindgen]
pub fn game_respawn() {
    with_runner(|r| r.respawn());
}

/// Stop the loop, remove all listeners and release the world.
#[wasm_bindgen]
pub fn game_teardown() {
    stop_scheduler();
    with_runner(|r| r.teardown());
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_header_ptr() -> *const f32 {
    with_runner(|r| r.header_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_player_ptr() -> *const f32 {
    with_runner(|r| r.player_ptr()).unwrap_or(std::ptr::null())
}

/// Copy of the player frame, for callers that would rather not read memory.
#[wasm_bindgen]
pub fn get_player_frame() -> js_sys::Float32Array {
    let frame: PlayerFrame = with_runner(|r| r.player_frame()).unwrap_or_default();
    js_sys::Float32Array::from(bytemuck::cast_slice::<PlayerFrame, f32>(std::slice::from_ref(&frame)))
}

#[wasm_bindgen]
pub fn get_blocks_ptr() -> *const f32 {
    with_runner(|r| r.blocks_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_block_count() -> u32 {
    with_runner(|r| r.block_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_game_events_ptr() -> *const f32 {
    with_runner(|r| r.events_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_game_events_len() -> u32 {
    with_runner(|r| r.events_len()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_start_index() -> i32 {
    with_runner(|r| r.start_index()).unwrap_or(-1)
}

#[wasm_bindgen]
pub fn get_goal_index() -> i32 {
    with_runner(|r| r.goal_index()).unwrap_or(-1)
}

#[wasm_bindgen]
pub fn get_goal_reached() -> bool {
    with_runner(|r| r.goal_reached()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn get_active() -> bool {
    with_runner(|r| r.is_active()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(|r| r.buffer_total_floats()).unwrap_or(0)
}

