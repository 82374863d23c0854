pub mod block;
pub mod player;
