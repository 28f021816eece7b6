use crate::{
    agent::{Agent, AgentPool},
    diffusion::{diffuse_and_decay, Neighborhood},
    errors::SlimeError,
    field::{FieldView, TrailField},
    perturbation::{Perturbation, PerturbationHandle, PointerEvent},
    rect::Rect,
    settings::{Settings, Tunables},
    steering::{update_agent, AgentDraws, EdgePolicy, SteeringContext},
    util::{agent_frame_seed, mix64},
    Point2,
};
use log::{debug, info, trace};
use rand::prelude::*;
use rand::rngs::{SmallRng, StdRng};

// Keeps the interaction stream apart from the agents' initial placement
const INTERACTION_STREAM: u64 = 0x5eed_0f_1a7e_c0de;

/// Where a simulation is in its frame cycle. A simulation that hasn't been
/// built yet has no state at all; construction is initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
    Ready,
    /// Only observable if a step panicked part way through
    Stepping,
}

/// Owns everything a run needs: the double-buffered field, the agents, the
/// parameters and the perturbation shared with the outside world.
pub struct Simulation {
    field: TrailField,
    agents: AgentPool,
    extent: Rect<f32>,
    tunables: Tunables,
    deposit_value: f32,
    edge_policy: EdgePolicy,
    neighborhood: Neighborhood,
    perturbation: PerturbationHandle,
    perturbation_radius: f32,
    randomize_on_interaction: bool,
    trail_color: [f32; 3],
    seed: u64,
    rng: StdRng,
    frame: u64,
    elapsed: f64,
    state: SimulationState,
}

impl Simulation {
    /// Allocate the field and `settings.agent_count` randomly placed agents.
    pub fn new(settings: &Settings) -> Result<Self, SlimeError> {
        if settings.agent_count == 0 {
            return Err(SlimeError::NoAgents);
        }

        let (width, height) = checked_extent(settings)?;
        let seed = settings.seed.unwrap_or_else(|| StdRng::from_entropy().gen());
        let agents = AgentPool::initialize(settings.agent_count, width, height, Some(seed));

        Self::from_parts(settings, agents, seed)
    }

    /// Start from a hand-placed population instead of a random one.
    pub fn with_agents(settings: &Settings, agents: Vec<Agent>) -> Result<Self, SlimeError> {
        if agents.is_empty() {
            return Err(SlimeError::NoAgents);
        }

        let seed = settings.seed.unwrap_or_else(|| StdRng::from_entropy().gen());

        Self::from_parts(settings, AgentPool::from_agents(agents), seed)
    }

    fn from_parts(settings: &Settings, agents: AgentPool, seed: u64) -> Result<Self, SlimeError> {
        let (width, height) = checked_extent(settings)?;
        let tunables = settings.tunables()?;

        info!("generating {} agents on a {}x{} field", agents.len(), width, height);
        info!(
            r#"
SEED	{:?}
SENSOR_OFFSET	{:?}
SENSOR_ANGLE	{:?}
SENSOR_SIZE	{:?}
TURN_RATE	{:?}
MOVE_SPEED	{:?}
DECAY_FACTOR	{:?}
DEPOSIT_VALUE	{:?}
EDGE_POLICY	{:?}
NEIGHBORHOOD	{:?}
"#,
            seed,
            tunables.sensor_offset,
            tunables.sensor_angle,
            tunables.sensor_size,
            tunables.turn_rate,
            tunables.move_speed,
            tunables.decay_factor,
            settings.deposit_value(),
            settings.edge_policy,
            settings.neighborhood,
        );

        Ok(Self {
            field: TrailField::new(width as usize, height as usize),
            agents,
            extent: Rect::centered(width, height),
            tunables,
            deposit_value: settings.deposit_value(),
            edge_policy: settings.edge_policy,
            neighborhood: settings.neighborhood,
            perturbation: PerturbationHandle::default(),
            perturbation_radius: settings.perturbation_radius,
            randomize_on_interaction: settings.randomize_on_interaction,
            trail_color: settings.trail_color,
            seed,
            rng: StdRng::seed_from_u64(mix64(seed ^ INTERACTION_STREAM)),
            frame: 0,
            elapsed: 0.0,
            state: SimulationState::Ready,
        })
    }

    /// Advance one frame of `dt` seconds: blur and fade the field into the
    /// write buffer, move every agent against that fresh buffer, mark the
    /// cells they started from, then swap so the result becomes readable.
    ///
    /// A negative or non-finite `dt` is treated as zero.
    pub fn step(&mut self, dt: f32) -> Result<(), SlimeError> {
        if self.state != SimulationState::Ready {
            return Err(SlimeError::Busy);
        }
        self.state = SimulationState::Stepping;

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let perturbation = self.perturbation.snapshot();

        diffuse_and_decay(&mut self.field, self.neighborhood, self.tunables.decay_factor);

        let deposits = {
            let ctx = SteeringContext {
                field: self.field.write(),
                extent: self.extent,
                tunables: self.tunables,
                perturbation,
                edge_policy: self.edge_policy,
                dt,
            };
            let (seed, frame, elapsed) = (self.seed, self.frame, self.elapsed);

            self.agents.par_map(|index, agent| {
                let mut rng = SmallRng::seed_from_u64(agent_frame_seed(seed, index, frame, elapsed));
                let draws = AgentDraws::draw(&mut rng);
                update_agent(agent, &ctx, &draws)
            })
        };

        self.field.deposit(deposits, self.deposit_value);
        self.field.swap();

        self.frame += 1;
        self.elapsed += dt as f64;
        self.state = SimulationState::Ready;
        trace!("finished frame {} at t={}", self.frame, self.elapsed);

        Ok(())
    }

    /// The buffer holding the most recent frame.
    pub fn current_field(&self) -> FieldView<'_> {
        self.field.read()
    }

    pub fn agents(&self) -> &[Agent] {
        self.agents.agents()
    }

    pub fn agent_positions(&self) -> impl Iterator<Item = Point2> + '_ {
        self.agents.positions()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Takes effect from the next step.
    pub fn set_perturbation(&mut self, point: Point2, radius: f32) {
        debug!("perturbation set at {} with radius {}", point, radius);
        self.perturbation.set(point, radius)
    }

    pub fn clear_perturbation(&mut self) {
        debug!("perturbation cleared");
        self.perturbation.clear()
    }

    pub fn perturbation(&self) -> Perturbation {
        self.perturbation.snapshot()
    }

    /// A handle other threads can use to move the perturbation while this
    /// simulation steps. Changes land in the next frame that starts.
    pub fn perturbation_handle(&self) -> PerturbationHandle {
        self.perturbation.clone()
    }

    /// React to a click: put the perturbation under the pointer and, if
    /// configured to, re-roll the tunables and the trail color.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.set_perturbation(event.point(), self.perturbation_radius);

        if self.randomize_on_interaction {
            self.tunables = Tunables::random(&mut self.rng);
            let rng = &mut self.rng;
            self.trail_color = [
                rng.gen_range(0.25..=1.0),
                rng.gen_range(0.25..=1.0),
                rng.gen_range(0.25..=1.0),
            ];
            info!(
                "pointer at {} re-rolled tunables to {:?} and trail color to {:?}",
                event.point(),
                self.tunables,
                self.trail_color
            );
        }
    }

    /// Reallocate the field for a new extent. Trail contents are discarded.
    /// Agents keep their positions; any left outside a smaller extent are
    /// pulled back in by the next step's boundary handling.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SlimeError> {
        if self.state != SimulationState::Ready {
            return Err(SlimeError::Busy);
        }
        if width == 0 || height == 0 {
            return Err(SlimeError::InvalidDimensions { width, height });
        }

        self.field = TrailField::new(width as usize, height as usize);
        self.extent = Rect::centered(width, height);
        info!("simulation resized to {}x{}", width, height);

        Ok(())
    }

    /// Clamped into range. Takes effect from the next step.
    pub fn set_tunables(&mut self, tunables: Tunables) {
        self.tunables = tunables.clamped();
        debug!("tunables set to {:?}", self.tunables);
    }

    /// Pick up everything in `settings` that can change mid-run. A changed
    /// extent resizes the field; the agent count and seed are fixed for the
    /// life of the simulation.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<(), SlimeError> {
        let tunables = settings.tunables()?;
        let (width, height) = checked_extent(settings)?;

        if (width as usize, height as usize) != (self.field.width(), self.field.height()) {
            self.resize(width, height)?;
        }

        self.set_tunables(tunables);
        self.deposit_value = settings.deposit_value();
        self.edge_policy = settings.edge_policy;
        self.neighborhood = settings.neighborhood;
        self.perturbation_radius = settings.perturbation_radius;
        self.randomize_on_interaction = settings.randomize_on_interaction;
        self.trail_color = settings.trail_color;

        if settings.agent_count != self.agents.len() {
            info!(
                "ignoring agent count change to {}, the population is fixed at {}",
                settings.agent_count,
                self.agents.len()
            );
        }

        Ok(())
    }

    pub fn tunables(&self) -> Tunables {
        self.tunables
    }

    pub fn deposit_value(&self) -> f32 {
        self.deposit_value
    }

    pub fn trail_color(&self) -> [f32; 3] {
        self.trail_color
    }

    pub fn extent(&self) -> Rect<f32> {
        self.extent
    }

    pub fn width(&self) -> u32 {
        self.field.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.field.height() as u32
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Completed steps.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Sum of every `dt` stepped so far, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }
}

fn checked_extent(settings: &Settings) -> Result<(u32, u32), SlimeError> {
    match settings.field_extent() {
        (0, _) | (_, 0) => Err(SlimeError::InvalidDimensions {
            width: settings.display_width,
            height: settings.display_height,
        }),
        extent => Ok(extent),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn settings(width: u32, height: u32, agent_count: usize) -> Settings {
        Settings {
            display_width: width,
            display_height: height,
            resolution_scale: 1,
            agent_count,
            seed: Some(42),
            ..Settings::default()
        }
    }

    #[test]
    fn zero_sized_fields_are_rejected() {
        assert!(matches!(
            Simulation::new(&settings(0, 10, 64)),
            Err(SlimeError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(matches!(
            Simulation::new(&settings(10, 0, 64)),
            Err(SlimeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn zero_agents_are_rejected() {
        assert!(matches!(
            Simulation::new(&settings(10, 10, 0)),
            Err(SlimeError::NoAgents)
        ));
        assert!(matches!(
            Simulation::with_agents(&settings(10, 10, 1), vec![]),
            Err(SlimeError::NoAgents)
        ));
    }

    #[test]
    fn new_simulation_is_ready_with_an_empty_field() {
        let sim = Simulation::new(&settings(32, 16, 64)).unwrap();
        assert_eq!(sim.state(), SimulationState::Ready);
        assert_eq!(sim.agent_count(), 64);
        assert_eq!((sim.width(), sim.height()), (32, 16));
        assert_eq!(sim.current_field().max(), 0.0);
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn step_advances_the_clock() {
        let mut sim = Simulation::new(&settings(32, 32, 64)).unwrap();
        sim.step(0.5).unwrap();
        sim.step(0.25).unwrap();
        sim.step(f32::NAN).unwrap();
        sim.step(-1.0).unwrap();
        assert_eq!(sim.frame(), 4);
        assert_eq!(sim.elapsed(), 0.75);
    }

    #[test]
    fn step_deposits_where_agents_started() {
        let agents = vec![
            Agent::builder().position(Point2::new(-3.5, 2.5)).build(),
            Agent::builder().position(Point2::new(7.5, -7.5)).build(),
        ];
        let mut sim = Simulation::with_agents(&settings(20, 20, 2), agents).unwrap();

        sim.step(0.1).unwrap();

        let field = sim.current_field();
        assert_eq!(field.get(6, 12), Some(1.0));
        assert_eq!(field.get(17, 2), Some(1.0));
        assert_eq!(field.sum(), 2.0);
    }

    #[test]
    fn resize_discards_the_field_and_keeps_agents() {
        let mut sim = Simulation::new(&settings(64, 64, 128)).unwrap();
        sim.step(0.1).unwrap();
        let before: Vec<_> = sim.agent_positions().collect();

        sim.resize(32, 48).unwrap();

        assert_eq!((sim.width(), sim.height()), (32, 48));
        assert_eq!(sim.current_field().max(), 0.0);
        assert_eq!(sim.agent_positions().collect::<Vec<_>>(), before);
        assert!(matches!(
            sim.resize(0, 5),
            Err(SlimeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn agents_outside_a_shrunk_field_are_pulled_back_in() {
        let mut sim = Simulation::new(&settings(200, 200, 256)).unwrap();
        sim.resize(20, 20).unwrap();
        sim.step(0.0).unwrap();

        let extent = sim.extent();
        assert!(sim.agent_positions().all(|p| extent.contains(&p)));
    }

    #[test]
    fn pointer_sets_perturbation_and_rerolls() {
        let mut sim = Simulation::new(&settings(64, 64, 64)).unwrap();
        let before = sim.tunables();

        sim.handle_pointer(PointerEvent::new(3.0, -4.0));

        let perturbation = sim.perturbation();
        assert_eq!(perturbation.point, Point2::new(3.0, -4.0));
        assert_eq!(perturbation.radius, settings(1, 1, 1).perturbation_radius);
        assert_ne!(sim.tunables(), before);
        assert_eq!(sim.tunables(), sim.tunables().clamped());
        assert!(sim.trail_color().iter().all(|c| (0.25..=1.0).contains(c)));

        sim.clear_perturbation();
        assert!(!sim.perturbation().is_active());
    }

    #[test]
    fn pointer_without_reroll_keeps_tunables() {
        let mut settings = settings(64, 64, 64);
        settings.randomize_on_interaction = false;
        let mut sim = Simulation::new(&settings).unwrap();
        let before = sim.tunables();

        sim.handle_pointer(PointerEvent::new(0.0, 0.0));

        assert_eq!(sim.tunables(), before);
        assert!(sim.perturbation().is_active());
    }

    #[test]
    fn apply_settings_updates_parameters_and_extent() {
        let mut sim = Simulation::new(&settings(64, 64, 64)).unwrap();
        let mut next = settings(80, 40, 999);
        next.turn_rate = 100.0;
        next.deposit_value = 0.5;

        sim.apply_settings(&next).unwrap();

        assert_eq!(sim.tunables().turn_rate, 10.0);
        assert_eq!(sim.deposit_value(), 0.5);
        assert_eq!((sim.width(), sim.height()), (80, 40));
        assert_eq!(sim.agent_count(), 64);
    }
}
