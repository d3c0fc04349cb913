pub mod geometry;
pub mod scene;
mod util;

pub use scene::{Geometry, Object, Scene, SceneError};
pub use util::Stats;
