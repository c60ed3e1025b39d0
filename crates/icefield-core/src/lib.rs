//! Platform-independent core of icefield.
//!
//! Everything here runs on the host as well as in the browser: the web
//! crate supplies DOM, Web Audio and WebGPU implementations of the traits
//! defined in these modules.

pub mod analyser;
pub mod camera;
pub mod compositor;
pub mod constants;
pub mod controls;
pub mod driver;
pub mod frame_loop;
pub mod light;
pub mod model;
pub mod page;
pub mod scene;
pub mod spectrum;
pub mod viewport;

pub use analyser::*;
pub use camera::*;
pub use compositor::*;
pub use constants::*;
pub use controls::*;
pub use driver::*;
pub use frame_loop::*;
pub use light::*;
pub use model::*;
pub use page::*;
pub use scene::*;
pub use spectrum::*;
pub use viewport::*;
