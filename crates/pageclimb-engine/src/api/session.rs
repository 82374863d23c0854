use crate::api::config::SessionConfig;
use crate::api::types::{
    GameEvent, EVENT_GOAL_REACHED, EVENT_JUMPED, EVENT_LANDED, EVENT_RESCANNED,
};
use crate::components::block::Block;
use crate::components::player::Player;
use crate::core::grid::SpatialGrid;
use crate::core::physics::{PlayerPhysics, StepOutcome};
use crate::core::scanner::{scan_page, GeometrySource, PageSnapshot, ScanStats};
use crate::core::selector::{select_start_goal, StartGoal};
use crate::input::keys::KeyState;
use crate::input::queue::InputEvent;
use crate::systems::goal;
use crate::systems::render::{build_player_frame, PlayerFrame};

/// One game on one page. Owns the world, the player and the controls; every
/// mutation goes through `scan`, `step` or `teardown`.
pub struct Session {
    config: SessionConfig,
    blocks: Vec<Block>,
    grid: SpatialGrid,
    start_goal: Option<StartGoal>,
    player: Player,
    physics: PlayerPhysics,
    keys: KeyState,
    /// Events emitted since the last `clear_frame_data`.
    events: Vec<GameEvent>,
    /// The player left its spawn point; rescans must not move it back.
    has_moved: bool,
    /// Goal state of the previous step, for edge-triggered goal events.
    on_goal: bool,
    active: bool,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let grid = SpatialGrid::new(config.cell_size);
        let player = Player::new(config.physics.player_size);
        let physics = PlayerPhysics::new(config.physics);
        Self {
            blocks: Vec::new(),
            grid,
            start_goal: None,
            player,
            physics,
            keys: KeyState::new(),
            events: Vec::with_capacity(config.max_events),
            has_moved: false,
            on_goal: false,
            active: true,
            config,
        }
    }

    /// Rebuild the world from `snapshot` and re-pick start and goal.
    ///
    /// With `initialize_player`, a player that has not moved yet is placed on
    /// the start block. A player already under way is never relocated.
    pub fn scan(&mut self, snapshot: &PageSnapshot, initialize_player: bool) -> ScanStats {
        if !self.active {
            return ScanStats::default();
        }

        let (blocks, stats) = scan_page(snapshot, &self.config.bounded_scan());
        self.blocks = blocks;
        self.grid.rebuild(&self.blocks);
        self.start_goal = select_start_goal(&self.blocks);
        log::debug!(
            "scan: {} sampled, {} kept ({} tag, {} hidden, {} size, {} offscreen, {} over cap), {} cells",
            stats.sampled,
            stats.kept,
            stats.rejected_tag,
            stats.rejected_hidden,
            stats.rejected_size,
            stats.rejected_offscreen,
            stats.rejected_capacity,
            self.grid.cell_count(),
        );

        if initialize_player && !self.has_moved {
            self.place_at_start();
        }

        let (start, goal) = self
            .start_goal
            .map(|sg| (sg.start as f32, sg.goal as f32))
            .unwrap_or((-1.0, -1.0));
        self.emit_event(GameEvent::new(EVENT_RESCANNED, self.blocks.len() as f32, start, goal));
        stats
    }

    /// Take a fresh snapshot from `source` and scan it.
    pub fn scan_from<G: GeometrySource + ?Sized>(
        &mut self,
        source: &mut G,
        initialize_player: bool,
    ) -> ScanStats {
        if !self.active {
            return ScanStats::default();
        }
        let snapshot = source.snapshot();
        self.scan(&snapshot, initialize_player)
    }

    /// Advance one frame of `dt` seconds using the current controls.
    pub fn step(&mut self, dt: f32) -> StepOutcome {
        if !self.active {
            return StepOutcome::default();
        }

        let intent = self.keys.take_intent();
        let before = self.player.pos;
        let outcome = self
            .physics
            .step(&mut self.player, intent, dt, &self.blocks, &self.grid);
        // Settling or being pushed out of a block is not the user moving.
        if intent.is_active() && self.player.pos != before {
            self.has_moved = true;
        }

        if outcome.jumped {
            self.emit_event(GameEvent::new(EVENT_JUMPED, before.z, 0.0, 0.0));
        }
        if outcome.landed {
            self.emit_event(GameEvent::new(EVENT_LANDED, self.player.pos.z, 0.0, 0.0));
        }

        let on_goal = self.goal_reached();
        if on_goal && !self.on_goal {
            let goal = self.start_goal.map(|sg| sg.goal).unwrap_or_default();
            log::info!("goal reached on block {} at z={}", goal, self.player.pos.z);
            self.emit_event(GameEvent::new(EVENT_GOAL_REACHED, goal as f32, 0.0, 0.0));
        }
        self.on_goal = on_goal;

        outcome
    }

    /// Stop the session and release the world. Later calls are no-ops.
    pub fn teardown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.blocks = Vec::new();
        self.grid.clear();
        self.start_goal = None;
        self.events.clear();
        self.keys.clear();
        self.on_goal = false;
        log::info!("session torn down");
    }

    /// Put the player back on the start block, at rest.
    pub fn respawn(&mut self) {
        if !self.active {
            return;
        }
        self.place_at_start();
        self.has_moved = false;
        self.on_goal = false;
    }

    /// Feed a raw input event to the controls.
    pub fn apply_input(&mut self, event: &InputEvent) -> bool {
        self.active && self.keys.apply(event)
    }

    pub fn keys_mut(&mut self) -> &mut KeyState {
        &mut self.keys
    }

    /// The player stands on the goal block right now.
    pub fn goal_reached(&self) -> bool {
        self.goal_block()
            .is_some_and(|g| goal::goal_reached(&self.player, g, self.config.goal_tolerance))
    }

    pub fn player_frame(&self) -> PlayerFrame {
        build_player_frame(&self.player, self.goal_block(), self.config.goal_tolerance)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn start_goal(&self) -> Option<StartGoal> {
        self.start_goal
    }

    pub fn start_block(&self) -> Option<&Block> {
        self.start_goal.and_then(|sg| self.blocks.get(sg.start))
    }

    pub fn goal_block(&self) -> Option<&Block> {
        self.start_goal.and_then(|sg| self.blocks.get(sg.goal))
    }

    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Events emitted since the last `clear_frame_data`.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Clear per-frame transient data (events).
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }

    /// Queue an event for JavaScript. Dropped once the per-frame cap is hit.
    pub fn emit_event(&mut self, event: GameEvent) {
        if self.events.len() < self.config.max_events {
            self.events.push(event);
        }
    }

    fn place_at_start(&mut self) {
        if let Some(start) = self.start_block().copied() {
            self.player.place_on(&start);
            log::info!(
                "player placed at ({}, {}, {})",
                self.player.pos.x,
                self.player.pos.y,
                self.player.pos.z
            );
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::{ElementSample, Rect, Viewport};
    use crate::input::keys::Control;

    const DT: f32 = 1.0 / 60.0;

    fn page(elements: Vec<ElementSample>) -> PageSnapshot {
        PageSnapshot {
            viewport: Viewport {
                scroll_x: 0.0,
                scroll_y: 0.0,
                width: 1280.0,
                height: 800.0,
            },
            document_width: 1280.0,
            document_height: 2400.0,
            elements,
        }
    }

    fn staircase() -> PageSnapshot {
        page(vec![
            ElementSample::new("header", Rect::new(0.0, 0.0, 1280.0, 80.0)),
            ElementSample::new("nav", Rect::new(0.0, 80.0, 200.0, 600.0)).with_stacking_order("10"),
            ElementSample::new("aside", Rect::new(900.0, 100.0, 300.0, 300.0)).with_stacking_order("50"),
        ])
    }

    #[test]
    fn ground_only_world_keeps_player_at_rest() {
        let mut session = Session::default();
        session.scan(&page(Vec::new()), true);
        assert_eq!(session.blocks().len(), 1);
        assert_eq!(session.start_goal(), Some(StartGoal { start: 0, goal: 0 }));

        for _ in 0..10 {
            session.step(DT);
            assert_eq!(session.player().pos.z, 0.0);
            assert!(session.player().is_grounded);
        }
    }

    #[test]
    fn every_scan_has_exactly_one_full_extent_ground() {
        let mut session = Session::default();
        for snapshot in [page(Vec::new()), staircase()] {
            session.scan(&snapshot, true);
            let blocks = session.blocks();
            assert!(!blocks.is_empty());
            let ground = blocks
                .iter()
                .filter(|b| b.z == 0.0 && b.x == 0.0 && b.y == 0.0 && b.w == 1280.0 && b.h == 2400.0)
                .count();
            assert_eq!(ground, 1);
        }
    }

    #[test]
    fn world_fits_block_capacity_with_ground_last() {
        let mut session = Session::new(SessionConfig { max_blocks: 4, ..SessionConfig::default() });
        let elements = (0..6)
            .map(|i| {
                ElementSample::new("div", Rect::new(i as f32 * 150.0, 100.0, 100.0, 100.0))
                    .with_stacking_order(format!("{}", 10 + i * 10))
            })
            .collect();
        let snapshot = page(elements);
        let stats = session.scan(&snapshot, true);
        assert_eq!(stats.rejected_capacity, 3);

        let blocks = session.blocks();
        assert_eq!(blocks.len(), 4);
        assert_eq!(*blocks.last().unwrap(), crate::core::scanner::ground_block(&snapshot));
        let sg = session.start_goal().unwrap();
        assert!(sg.start < blocks.len());
        assert!(sg.goal < blocks.len());
        assert_eq!(sg.goal, 2);
    }

    #[test]
    fn scan_places_player_on_start_and_picks_highest_goal() {
        let mut session = Session::default();
        session.scan(&staircase(), true);
        let sg = session.start_goal().unwrap();
        assert_eq!(sg.start, 0);
        assert_eq!(sg.goal, 2);
        let start = *session.start_block().unwrap();
        assert_eq!(session.player().pos.z, start.top());
        assert!(session.player().is_grounded);
    }

    #[test]
    fn held_jump_fires_once_and_lands_back() {
        let mut session = Session::default();
        session.scan(&page(Vec::new()), true);
        session.keys_mut().press(Control::Jump);

        let mut jumps = 0;
        let mut landings = 0;
        let mut peak_seen = false;
        let mut last_z = session.player().pos.z;
        for _ in 0..180 {
            session.clear_frame_data();
            let outcome = session.step(DT);
            if outcome.jumped {
                jumps += 1;
            }
            if outcome.landed {
                landings += 1;
            }
            let z = session.player().pos.z;
            if peak_seen && !session.player().is_grounded {
                assert!(z < last_z, "rising again after the peak without a new jump");
            }
            if session.player().vel.z < 0.0 && z > 0.0 {
                peak_seen = true;
            }
            last_z = z;
        }
        assert_eq!(jumps, 1);
        assert_eq!(landings, 1);
        assert_eq!(session.player().pos.z, 0.0);
        assert_eq!(session.player().vel.z, 0.0);
        assert!(session.player().is_grounded);
    }

    #[test]
    fn rescan_does_not_teleport_a_moving_player() {
        let mut session = Session::default();
        session.scan(&staircase(), true);
        session.keys_mut().press(Control::Right);
        for _ in 0..10 {
            session.step(DT);
        }
        assert!(session.has_moved());
        let pos = session.player().pos;

        session.scan(&page(Vec::new()), true);
        assert_eq!(session.player().pos, pos);
    }

    #[test]
    fn settling_without_input_keeps_spawn_open() {
        let mut session = Session::default();
        let crowded = page(vec![
            ElementSample::new("main", Rect::new(0.0, 0.0, 400.0, 400.0)),
            // Sits right where the player spawns and lifts it on the first step.
            ElementSample::new("span", Rect::new(190.0, 190.0, 20.0, 20.0)).with_stacking_order("5"),
        ]);
        session.scan(&crowded, true);
        let spawn = session.player().pos;
        session.step(DT);
        assert_ne!(session.player().pos, spawn);
        assert!(!session.has_moved());

        session.scan(&page(Vec::new()), true);
        assert_eq!(session.player().pos, glam::Vec3::new(630.0, 1190.0, 0.0));
    }

    #[test]
    fn rescan_before_moving_reinitializes_spawn() {
        let mut session = Session::default();
        session.scan(&page(Vec::new()), true);
        session.step(DT);
        assert!(!session.has_moved());

        session.scan(&staircase(), true);
        let start = *session.start_block().unwrap();
        assert_eq!(session.player().pos.z, start.top());
    }

    #[test]
    fn scan_without_initialize_leaves_player_alone() {
        let mut session = Session::default();
        session.scan(&staircase(), false);
        assert_eq!(session.player().pos, glam::Vec3::ZERO);
    }

    #[test]
    fn goal_event_fires_on_arrival_only() {
        let mut session = Session::default();
        session.scan(&staircase(), true);
        let goal = *session.goal_block().unwrap();
        session.player.place_on(&goal);

        session.clear_frame_data();
        session.step(DT);
        assert!(session.goal_reached());
        assert!(session.player_frame().is_goal_reached());
        let arrivals = |s: &Session| {
            s.events().iter().filter(|e| e.kind == EVENT_GOAL_REACHED).count()
        };
        assert_eq!(arrivals(&session), 1);

        session.clear_frame_data();
        session.step(DT);
        assert_eq!(arrivals(&session), 0);
    }

    #[test]
    fn respawn_returns_to_start() {
        let mut session = Session::default();
        session.scan(&staircase(), true);
        let spawn = session.player().pos;
        session.keys_mut().press(Control::Down);
        for _ in 0..5 {
            session.step(DT);
        }
        assert_ne!(session.player().pos, spawn);
        session.respawn();
        assert_eq!(session.player().pos, spawn);
        assert!(!session.has_moved());
    }

    #[test]
    fn teardown_stops_everything() {
        let mut session = Session::default();
        session.scan(&staircase(), true);
        session.keys_mut().press(Control::Right);
        session.teardown();
        assert!(!session.is_active());
        assert!(session.blocks().is_empty());
        assert!(session.start_goal().is_none());

        let pos = session.player().pos;
        assert_eq!(session.step(DT), StepOutcome::default());
        assert_eq!(session.player().pos, pos);
        assert_eq!(session.scan(&staircase(), true), ScanStats::default());
        assert!(session.blocks().is_empty());
        assert!(!session.apply_input(&InputEvent::KeyDown { key_code: 72 }));
    }

    #[test]
    fn scan_emits_rescanned_event() {
        let mut session = Session::default();
        session.scan(&staircase(), true);
        let event = session.events().last().copied().unwrap();
        assert_eq!(event.kind, EVENT_RESCANNED);
        assert_eq!(event.a, 4.0);
        assert_eq!(event.b, 0.0);
        assert_eq!(event.c, 2.0);
    }

    #[test]
    fn events_are_capped_per_frame() {
        let mut config = SessionConfig::default();
        config.max_events = 2;
        let mut session = Session::new(config);
        for _ in 0..5 {
            session.emit_event(GameEvent::new(EVENT_LANDED, 0.0, 0.0, 0.0));
        }
        assert_eq!(session.events().len(), 2);
    }

    #[test]
    fn scan_from_geometry_source() {
        let mut source = staircase();
        let mut session = Session::default();
        let stats = session.scan_from(&mut source, true);
        assert_eq!(stats.kept, 3);
        assert_eq!(session.blocks().len(), 4);
    }
}
