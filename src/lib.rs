pub mod agent;
pub mod diffusion;
pub mod errors;
pub mod field;
pub mod perturbation;
pub mod point2;
pub mod presets;
pub mod rect;
pub mod render;
pub mod settings;
pub mod simulation;
pub mod steering;
pub mod swapper;
pub mod util;

pub use agent::{Agent, AgentPool};
pub use errors::SlimeError;
pub use field::{FieldView, TrailField};
pub use perturbation::{Perturbation, PerturbationHandle, PointerEvent};
pub use point2::Point2;
pub use settings::{Settings, Tunables};
pub use simulation::{Simulation, SimulationState};
pub use swapper::Swapper;
