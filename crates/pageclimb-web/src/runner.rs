use pageclimb_engine::bridge::protocol::{FrameHeader, HEADER_FLOATS};
use pageclimb_engine::{
    FrameClock, GeometrySource, InputEvent, InputQueue, PlayerFrame, ProtocolLayout,
    ScanStats, Session, SessionConfig,
};

/// Wires a session to its geometry source, input queue and clock, and keeps
/// the flat buffers the page script reads after every frame.
///
/// Generic over the geometry source so the same loop runs against the live
/// DOM in the browser and against fixtures in native tests.
pub struct SessionRunner<G: GeometrySource> {
    session: Session,
    source: G,
    input: InputQueue,
    clock: FrameClock,
    layout: ProtocolLayout,
    header: [f32; HEADER_FLOATS],
    player: PlayerFrame,
    /// A rescan requested between frames; the flag asks for player init.
    pending_scan: Option<bool>,
    frame_counter: u32,
    scan_counter: u32,
}

impl<G: GeometrySource> SessionRunner<G> {
    pub fn new(config: SessionConfig, source: G) -> Self {
        let layout = ProtocolLayout::from_config(&config);
        let clock = FrameClock::new(config.physics.max_dt);
        Self {
            session: Session::new(config),
            source,
            input: InputQueue::new(),
            clock,
            layout,
            header: [0.0; HEADER_FLOATS],
            player: PlayerFrame::default(),
            pending_scan: None,
            frame_counter: 0,
            scan_counter: 0,
        }
    }

    /// First scan: builds the world and spawns the player on the start block.
    pub fn init(&mut self) -> ScanStats {
        self.scan(true)
    }

    /// Rescan right now.
    pub fn scan(&mut self, initialize_player: bool) -> ScanStats {
        let stats = self.session.scan_from(&mut self.source, initialize_player);
        if self.session.is_active() {
            self.scan_counter = self.scan_counter.wrapping_add(1);
        }
        self.refresh_buffers();
        stats
    }

    /// Schedule a rescan for the start of the next frame. Timer, scroll and
    /// resize notifications land here so they never interleave with a step.
    pub fn request_rescan(&mut self, initialize_player: bool) {
        let initialize = self.pending_scan.unwrap_or(false) || initialize_player;
        self.pending_scan = Some(initialize);
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if !self.session.is_active() {
            return;
        }

        self.session.clear_frame_data();
        for event in self.input.drain() {
            self.session.apply_input(&event);
        }
        if let Some(initialize) = self.pending_scan.take() {
            self.scan(initialize);
        }

        self.session.step(dt);
        self.frame_counter = self.frame_counter.wrapping_add(1);
        self.refresh_buffers();
    }

    /// Run one frame at monotonic timestamp `now_ms`.
    pub fn tick_at(&mut self, now_ms: f64) {
        let dt = self.clock.tick(now_ms);
        self.tick(dt);
    }

    pub fn respawn(&mut self) {
        self.session.respawn();
        self.refresh_buffers();
    }

    /// Stop the session and release its geometry.
    pub fn teardown(&mut self) {
        self.session.teardown();
        self.input.clear();
        self.pending_scan = None;
        self.clock.reset();
        self.refresh_buffers();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn refresh_buffers(&mut self) {
        let start_goal = self.session.start_goal();
        let header = FrameHeader {
            frame_counter: self.frame_counter,
            scan_counter: self.scan_counter,
            active: self.session.is_active(),
            block_count: self.session.blocks().len(),
            event_count: self.session.events().len(),
            start_index: start_goal.map(|sg| sg.start),
            goal_index: start_goal.map(|sg| sg.goal),
        };
        header.write(&self.layout, &mut self.header);
        self.player = self.session.player_frame();
    }

    // ---- Pointer accessors for zero-copy reads from JavaScript ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn player_ptr(&self) -> *const f32 {
        &self.player as *const PlayerFrame as *const f32
    }

    pub fn blocks_ptr(&self) -> *const f32 {
        self.session.blocks().as_ptr() as *const f32
    }

    pub fn block_count(&self) -> u32 {
        self.session.blocks().len().min(self.layout.max_blocks) as u32
    }

    pub fn events_ptr(&self) -> *const f32 {
        self.session.events().as_ptr() as *const f32
    }

    pub fn events_len(&self) -> u32 {
        self.session.events().len() as u32
    }

    // ---- Scalar accessors ----

    pub fn player_frame(&self) -> PlayerFrame {
        self.player
    }

    pub fn start_index(&self) -> i32 {
        self.session.start_goal().map(|sg| sg.start as i32).unwrap_or(-1)
    }

    pub fn goal_index(&self) -> i32 {
        self.session.start_goal().map(|sg| sg.goal as i32).unwrap_or(-1)
    }

    pub fn goal_reached(&self) -> bool {
        self.session.goal_reached()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }

    pub fn rescan_interval_ms(&self) -> u32 {
        self.session.config().rescan_interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageclimb_engine::bridge::protocol::{
        HEADER_ACTIVE, HEADER_BLOCK_COUNT, HEADER_FRAME_COUNTER, HEADER_SCAN_COUNTER,
    };
    use pageclimb_engine::input::keys::{KEY_L, KEY_SPACE};
    use pageclimb_engine::{ElementSample, PageSnapshot, Rect, Viewport, EVENT_JUMPED};

    /// A page whose layout can change between snapshots.
    struct FixturePage {
        pages: Vec<PageSnapshot>,
        taken: usize,
    }

    impl GeometrySource for FixturePage {
        fn snapshot(&mut self) -> PageSnapshot {
            let index = self.taken.min(self.pages.len() - 1);
            self.taken += 1;
            self.pages[index].clone()
        }
    }

    fn page(elements: Vec<ElementSample>) -> PageSnapshot {
        PageSnapshot {
            viewport: Viewport { scroll_x: 0.0, scroll_y: 0.0, width: 1024.0, height: 768.0 },
            document_width: 1024.0,
            document_height: 3000.0,
            elements,
        }
    }

    fn runner() -> SessionRunner<FixturePage> {
        let first = page(vec![
            ElementSample::new("main", Rect::new(0.0, 0.0, 1024.0, 400.0)),
            ElementSample::new("div", Rect::new(600.0, 100.0, 200.0, 100.0)).with_stacking_order("30"),
        ]);
        let second = page(vec![ElementSample::new("main", Rect::new(0.0, 0.0, 1024.0, 400.0))]);
        SessionRunner::new(
            SessionConfig::default(),
            FixturePage { pages: vec![first, second], taken: 0 },
        )
    }

    #[test]
    fn init_spawns_player_and_fills_header() {
        let mut r = runner();
        let stats = r.init();
        assert_eq!(stats.kept, 2);
        assert_eq!(r.block_count(), 3);
        assert_eq!(r.start_index(), 0);
        assert_eq!(r.goal_index(), 1);
        assert!(r.player_frame().is_grounded());

        let header = unsafe { std::slice::from_raw_parts(r.header_ptr(), HEADER_FLOATS) };
        assert_eq!(header[HEADER_ACTIVE], 1.0);
        assert_eq!(header[HEADER_BLOCK_COUNT], 3.0);
        assert_eq!(header[HEADER_SCAN_COUNTER], 1.0);
    }

    #[test]
    fn queued_keys_drive_the_player() {
        let mut r = runner();
        r.init();
        let x0 = r.player_frame().x;
        r.push_input(InputEvent::KeyDown { key_code: KEY_L });
        for _ in 0..5 {
            r.tick(1.0 / 60.0);
        }
        assert!(r.player_frame().x > x0);

        r.push_input(InputEvent::KeyDown { key_code: KEY_SPACE });
        r.tick(1.0 / 60.0);
        let events = unsafe {
            std::slice::from_raw_parts(r.events_ptr(), r.events_len() as usize * 4)
        };
        assert!(events.chunks(4).any(|e| e[0] == EVENT_JUMPED));
    }

    #[test]
    fn pending_rescan_runs_at_next_frame() {
        let mut r = runner();
        r.init();
        r.request_rescan(false);
        assert_eq!(r.block_count(), 3);
        r.tick(1.0 / 60.0);
        assert_eq!(r.block_count(), 2);
        let header = unsafe { std::slice::from_raw_parts(r.header_ptr(), HEADER_FLOATS) };
        assert_eq!(header[HEADER_SCAN_COUNTER], 2.0);
        assert_eq!(header[HEADER_FRAME_COUNTER], 1.0);
    }

    #[test]
    fn exposed_blocks_always_include_ground_and_goal() {
        let elements = (0..6)
            .map(|i| {
                ElementSample::new("div", Rect::new(i as f32 * 150.0, 100.0, 100.0, 100.0))
                    .with_stacking_order(format!("{}", 10 + i * 10))
            })
            .collect();
        let snapshot = page(elements);
        let config = SessionConfig { max_blocks: 4, ..SessionConfig::default() };
        let mut r = SessionRunner::new(config, FixturePage { pages: vec![snapshot], taken: 0 });
        r.init();

        assert_eq!(r.block_count() as usize, r.session().blocks().len());
        assert!(r.goal_index() < r.block_count() as i32);
        assert!(r.start_index() < r.block_count() as i32);
        let floats = unsafe {
            std::slice::from_raw_parts(r.blocks_ptr(), r.block_count() as usize * 6)
        };
        // Last exposed block is the zero-thickness ground.
        assert_eq!(&floats[18..24], &[0.0, 0.0, 0.0, 1024.0, 3000.0, 0.0]);
    }

    #[test]
    fn blocks_are_readable_as_floats() {
        let mut r = runner();
        r.init();
        let floats = unsafe {
            std::slice::from_raw_parts(r.blocks_ptr(), r.block_count() as usize * 6)
        };
        // Second block: x, y, z, w, h, d.
        assert_eq!(&floats[6..12], &[600.0, 100.0, 30.0, 200.0, 100.0, 16.0]);
    }

    #[test]
    fn clock_driven_ticks_are_clamped() {
        let mut r = runner();
        r.init();
        r.push_input(InputEvent::KeyDown { key_code: KEY_L });
        let x0 = r.player_frame().x;
        r.tick_at(0.0);
        assert_eq!(r.player_frame().x, x0);
        r.tick_at(5000.0);
        let moved = r.player_frame().x - x0;
        assert!((moved - 300.0 * 0.05).abs() < 1e-3, "moved {}", moved);
    }

    #[test]
    fn teardown_freezes_the_runner() {
        let mut r = runner();
        r.init();
        r.teardown();
        assert!(!r.is_active());
        assert_eq!(r.block_count(), 0);
        let before = r.player_frame();
        r.push_input(InputEvent::KeyDown { key_code: KEY_L });
        r.tick(1.0 / 60.0);
        r.scan(true);
        assert_eq!(r.player_frame(), before);
        let header = unsafe { std::slice::from_raw_parts(r.header_ptr(), HEADER_FLOATS) };
        assert_eq!(header[HEADER_ACTIVE], 0.0);
    }
}
