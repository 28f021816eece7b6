use slime_trails::{
    diffusion::{diffuse_and_decay, Neighborhood},
    Agent, Point2, Settings, Simulation, TrailField,
};
use std::f32::consts::PI;

fn settings(width: u32, height: u32) -> Settings {
    Settings {
        display_width: width,
        display_height: height,
        resolution_scale: 1,
        agent_count: 2_000,
        seed: Some(7),
        ..Settings::default()
    }
}

fn field_values(sim: &Simulation) -> Vec<f32> {
    sim.current_field().values().to_vec()
}

#[test]
fn field_stays_between_zero_and_the_deposit_value() {
    let mut settings = settings(64, 48);
    settings.deposit_value = 2.5;
    let mut sim = Simulation::new(&settings).unwrap();

    for _ in 0..60 {
        sim.step(1.0 / 60.0).unwrap();
        assert!(sim
            .current_field()
            .iter()
            .all(|v| v.is_finite() && (0.0..=2.5).contains(v)));
    }
}

#[test]
fn agents_never_leave_the_extent() {
    let mut settings = settings(40, 30);
    settings.move_speed = 30.0;
    let mut sim = Simulation::new(&settings).unwrap();
    let extent = sim.extent();

    for _ in 0..200 {
        sim.step(0.5).unwrap();
        for position in sim.agent_positions() {
            assert!(extent.contains(&position), "{} escaped", position);
        }
    }
}

#[test]
fn population_is_fixed() {
    let mut sim = Simulation::new(&settings(32, 32)).unwrap();
    for _ in 0..25 {
        sim.step(0.1).unwrap();
    }
    assert_eq!(sim.agent_count(), 2_000);
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut sim = Simulation::new(&settings(50, 50)).unwrap();
        for _ in 0..40 {
            sim.step(1.0 / 30.0).unwrap();
        }
        (field_values(&sim), sim.agents().to_vec())
    };

    let (field_a, agents_a) = run();
    let (field_b, agents_b) = run();

    assert!(field_a
        .iter()
        .zip(field_b.iter())
        .all(|(a, b)| a.to_bits() == b.to_bits()));
    assert_eq!(agents_a, agents_b);
}

#[test]
fn different_seeds_diverge() {
    let mut a = Simulation::new(&settings(50, 50)).unwrap();
    let mut other = settings(50, 50);
    other.seed = Some(8);
    let mut b = Simulation::new(&other).unwrap();

    a.step(0.1).unwrap();
    b.step(0.1).unwrap();

    assert_ne!(a.agents(), b.agents());
}

#[test]
fn zero_dt_runs_exactly_one_maintenance_pass() {
    let mut sim = Simulation::new(&settings(48, 36)).unwrap();
    for _ in 0..10 {
        sim.step(0.2).unwrap();
    }

    let before = field_values(&sim);
    let agents_before = sim.agents().to_vec();

    sim.step(0.0).unwrap();

    assert_eq!(sim.agents(), &agents_before[..]);

    // blur and fade the old field once, then mark every agent's cell
    let (width, height) = (sim.width() as usize, sim.height() as usize);
    let mut expected = TrailField::new(width, height);
    for (index, value) in before.iter().enumerate() {
        expected.paint((index % width) as i64, (index / width) as i64, *value);
    }
    let tunables = sim.tunables();
    diffuse_and_decay(&mut expected, Neighborhood::default(), tunables.decay_factor);
    let mut expected = expected.write().values().to_vec();
    for agent in &agents_before {
        let cell = sim.current_field().cell_of(agent.position);
        expected[cell] = sim.deposit_value();
    }

    assert_eq!(field_values(&sim), expected);
}

#[test]
fn lone_agent_walks_straight_and_leaves_a_trail() {
    let mut settings = settings(100, 100);
    settings.move_speed = 10.0;
    settings.decay_factor = 1.0;
    let agents = vec![Agent::builder().position(Point2::new(0.0, 0.0)).build()];
    let mut sim = Simulation::with_agents(&settings, agents).unwrap();

    sim.step(1.0).unwrap();

    let agent = sim.agents()[0];
    assert!((agent.position.x - 10.0).abs() < 1e-4);
    assert!(agent.position.y.abs() < 1e-4);
    assert_eq!(agent.heading, 0.0);

    let field = sim.current_field();
    assert_eq!(field.get(50, 50), Some(1.0));
    for (x, y) in [(49, 50), (51, 50), (50, 49), (50, 51)] {
        assert_eq!(field.get(x, y), Some(0.0));
    }
    assert_eq!(field.sum(), 1.0);

    sim.step(1.0).unwrap();

    let field = sim.current_field();
    for (x, y) in [(49, 50), (51, 50), (50, 49), (50, 51)] {
        assert!(field.get(x, y).unwrap() > 0.0);
    }
    assert_eq!(field.get(60, 50), Some(1.0));
}

#[test]
fn agent_running_into_a_wall_bounces_back() {
    let mut settings = settings(100, 100);
    settings.move_speed = 50.0;
    let agents = vec![Agent::builder().position(Point2::new(49.0, 0.0)).build()];
    let mut sim = Simulation::with_agents(&settings, agents).unwrap();

    sim.step(1.0).unwrap();

    let agent = sim.agents()[0];
    let extent = sim.extent();
    assert!(extent.contains(&agent.position));
    assert_eq!(agent.position.x, 49.5);
    assert!(agent.heading >= PI - 1.0 && agent.heading < PI + 1.0);
}

#[test]
fn cleared_perturbation_is_the_same_as_none() {
    let mut untouched = Simulation::new(&settings(40, 40)).unwrap();
    let mut cleared = Simulation::new(&settings(40, 40)).unwrap();
    cleared.set_perturbation(Point2::new(0.0, 0.0), 6.0);
    cleared.clear_perturbation();

    for _ in 0..20 {
        untouched.step(0.1).unwrap();
        cleared.step(0.1).unwrap();
    }

    assert_eq!(untouched.agents(), cleared.agents());
    assert_eq!(field_values(&untouched), field_values(&cleared));
}

#[test]
fn perturbation_set_from_another_thread_lands_next_step() {
    let mut sim = Simulation::new(&settings(40, 40)).unwrap();
    let handle = sim.perturbation_handle();

    std::thread::spawn(move || handle.set(Point2::new(2.0, -2.0), 4.0))
        .join()
        .unwrap();

    assert_eq!(sim.perturbation().point, Point2::new(2.0, -2.0));
    sim.step(0.1).unwrap();
    assert_eq!(sim.agent_count(), 2_000);
}

#[test]
fn perturbation_clears_a_space_around_it() {
    let mut settings = settings(60, 60);
    settings.randomize_on_interaction = false;
    let mut sim = Simulation::new(&settings).unwrap();
    let center = Point2::new(0.0, 0.0);
    let near = |sim: &Simulation| {
        sim.agent_positions()
            .filter(|p| p.distance_to(&center) < 4.0)
            .count()
    };

    let before = near(&sim);
    sim.set_perturbation(center, 4.0);
    for _ in 0..30 {
        sim.step(0.1).unwrap();
    }

    assert!(near(&sim) < before);
}
