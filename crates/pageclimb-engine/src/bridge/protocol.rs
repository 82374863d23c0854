//! Flat buffer layout shared with the page script.
//! Must stay in sync with the TypeScript reader.
//!
//! Layout (all values f32 / 4 bytes):
//! ```text
//! [Header: 16 floats]
//! [Player: 12 floats]
//! [Blocks: max_blocks × 6 floats]
//! [Events: max_events × 4 floats]
//! ```
//!
//! Capacities are written into the header every frame, so the reader can
//! compute offsets without hard-coding them.

use crate::api::config::SessionConfig;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_ACTIVE: usize = 2;
pub const HEADER_MAX_BLOCKS: usize = 3;
pub const HEADER_BLOCK_COUNT: usize = 4;
pub const HEADER_MAX_EVENTS: usize = 5;
pub const HEADER_EVENT_COUNT: usize = 6;
pub const HEADER_START_INDEX: usize = 7;
pub const HEADER_GOAL_INDEX: usize = 8;
pub const HEADER_SCAN_COUNTER: usize = 9;
// 10..16 reserved

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per player frame (fixed wire format).
pub const PLAYER_FLOATS: usize = 12;

/// Floats per block: x, y, z, w, h, d (fixed wire format).
pub const BLOCK_FLOATS: usize = 6;

/// Floats per game event: kind, a, b, c (fixed wire format).
pub const EVENT_FLOATS: usize = 4;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_blocks: usize,
    pub max_events: usize,

    pub block_data_floats: usize,
    pub event_data_floats: usize,

    /// Offset (in floats) where the player frame begins.
    pub player_data_offset: usize,
    /// Offset (in floats) where block data begins.
    pub block_data_offset: usize,
    /// Offset (in floats) where event data begins.
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_blocks: usize, max_events: usize) -> Self {
        let block_data_floats = max_blocks * BLOCK_FLOATS;
        let event_data_floats = max_events * EVENT_FLOATS;

        let player_data_offset = HEADER_FLOATS;
        let block_data_offset = player_data_offset + PLAYER_FLOATS;
        let event_data_offset = block_data_offset + block_data_floats;

        let buffer_total_floats = event_data_offset + event_data_floats;

        Self {
            max_blocks,
            max_events,
            block_data_floats,
            event_data_floats,
            player_data_offset,
            block_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Compute layout from a SessionConfig.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.max_blocks, config.max_events)
    }
}

/// Per-frame values for the header section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameHeader {
    pub frame_counter: u32,
    pub scan_counter: u32,
    pub active: bool,
    pub block_count: usize,
    pub event_count: usize,
    pub start_index: Option<usize>,
    pub goal_index: Option<usize>,
}

impl FrameHeader {
    /// Write into `out`, which must hold at least `HEADER_FLOATS` values.
    /// Counts are clamped to the layout's capacities; missing indices are -1.
    pub fn write(&self, layout: &ProtocolLayout, out: &mut [f32]) {
        let index = |i: Option<usize>| i.map(|v| v as f32).unwrap_or(-1.0);
        out[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        out[HEADER_FRAME_COUNTER] = self.frame_counter as f32;
        out[HEADER_ACTIVE] = if self.active { 1.0 } else { 0.0 };
        out[HEADER_MAX_BLOCKS] = layout.max_blocks as f32;
        out[HEADER_BLOCK_COUNT] = self.block_count.min(layout.max_blocks) as f32;
        out[HEADER_MAX_EVENTS] = layout.max_events as f32;
        out[HEADER_EVENT_COUNT] = self.event_count.min(layout.max_events) as f32;
        out[HEADER_START_INDEX] = index(self.start_index);
        out[HEADER_GOAL_INDEX] = index(self.goal_index);
        out[HEADER_SCAN_COUNTER] = self.scan_counter as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_layout() {
        let layout = ProtocolLayout::from_config(&SessionConfig::default());
        assert_eq!(layout.max_blocks, 4096);
        assert_eq!(layout.max_events, 32);
        assert_eq!(layout.player_data_offset, 16);
        assert_eq!(layout.block_data_offset, 28);
        assert_eq!(layout.event_data_offset, 28 + 4096 * 6);
        assert_eq!(layout.buffer_total_floats, 28 + 4096 * 6 + 32 * 4);
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn offsets_are_contiguous() {
        let layout = ProtocolLayout::new(100, 20);
        assert_eq!(layout.block_data_offset, layout.player_data_offset + PLAYER_FLOATS);
        assert_eq!(layout.event_data_offset, layout.block_data_offset + layout.block_data_floats);
        assert_eq!(layout.buffer_total_floats, layout.event_data_offset + layout.event_data_floats);
    }

    #[test]
    fn header_clamps_counts_and_marks_missing_indices() {
        let layout = ProtocolLayout::new(10, 4);
        let header = FrameHeader {
            frame_counter: 7,
            scan_counter: 2,
            active: true,
            block_count: 25,
            event_count: 3,
            start_index: Some(1),
            goal_index: None,
        };
        let mut out = [0.0f32; HEADER_FLOATS];
        header.write(&layout, &mut out);
        assert_eq!(out[HEADER_PROTOCOL_VERSION], PROTOCOL_VERSION);
        assert_eq!(out[HEADER_FRAME_COUNTER], 7.0);
        assert_eq!(out[HEADER_ACTIVE], 1.0);
        assert_eq!(out[HEADER_BLOCK_COUNT], 10.0);
        assert_eq!(out[HEADER_EVENT_COUNT], 3.0);
        assert_eq!(out[HEADER_START_INDEX], 1.0);
        assert_eq!(out[HEADER_GOAL_INDEX], -1.0);
        assert_eq!(out[HEADER_SCAN_COUNTER], 2.0);
    }
}
