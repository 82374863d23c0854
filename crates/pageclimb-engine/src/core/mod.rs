pub mod grid;
pub mod physics;
pub mod scanner;
pub mod selector;
pub mod time;
