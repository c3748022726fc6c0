pub mod config;
pub mod constants;
pub mod errors;
pub mod lcm;
pub mod loader;

pub use config::EngineConfig;
pub use constants::{AssignmentCode, EPSILON};
pub use errors::{InvalidTasksetError, LoadError, SolverError};
pub use lcm::{multiple_gcd, multiple_lcm};
pub use loader::{read_config_file, read_task_file};
