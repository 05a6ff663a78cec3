pub mod access_points;
pub mod discovery;
pub mod pipeline;
pub mod radios;

pub use access_points::collect_access_points;
pub use discovery::discover_controllers;
pub use pipeline::run_census;
pub use radios::collect_radios;
