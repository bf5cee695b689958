pub mod grid_world;
pub mod inverted_pendulum;

pub use grid_world::GridWorld;
pub use inverted_pendulum::InvertedPendulum;
