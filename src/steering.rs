//! The per-agent half of a frame: sense, turn, move, get pushed, bounce, and
//! report the cell to mark.

use crate::{
    agent::Agent, field::FieldView, perturbation::Perturbation, rect::Rect,
    settings::Tunables, Point2,
};
use log::trace;
use rand::{rngs::SmallRng, Rng};
use serde::Deserialize;

/// What a sensor reads when its sample square pokes out of the field.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EdgePolicy {
    /// Read the nearest edge cell. Over-weights the boundary.
    Clamp,
    /// Cells outside the field contribute nothing. Under-weights the boundary.
    Zero,
}

impl Default for EdgePolicy {
    fn default() -> Self {
        EdgePolicy::Clamp
    }
}

/// Sensor weights in the order they're sensed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    pub forward: f32,
    pub left: f32,
    pub right: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnDecision {
    NoTurn,
    /// Forward is the weakest direction
    TurnRandom,
    /// Decrease the heading
    TurnRight,
    /// Increase the heading
    TurnLeft,
}

/// Everything an agent reads during its update, borrowed for the whole pass.
pub struct SteeringContext<'a> {
    pub field: FieldView<'a>,
    pub extent: Rect<f32>,
    pub tunables: Tunables,
    pub perturbation: Perturbation,
    pub edge_policy: EdgePolicy,
    pub dt: f32,
}

/// The random values one agent consumes in one frame. They're all drawn before
/// the update runs so that which branches are taken never shifts the stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentDraws {
    /// `[0, 1)`, scales every turn
    pub turn_strength: f32,
    /// Breaks a left/right tie when forward is the weakest direction
    pub turn_left_on_tie: bool,
    /// `[0, 1)`, compared against the push probability
    pub push: f32,
    /// `[-1, 1)`, added to the wall's target angle
    pub bounce_offset: f32,
}

impl AgentDraws {
    pub fn draw(rng: &mut SmallRng) -> Self {
        Self {
            turn_strength: rng.gen(),
            turn_left_on_tie: rng.gen(),
            push: rng.gen(),
            bounce_offset: rng.gen_range(-1.0..1.0),
        }
    }
}

/// The summed field over the square of half-width `sensor_size` centered
/// `sensor_offset` ahead of `position` along `heading + angle_offset`.
pub fn sense_at(
    angle_offset: f32,
    position: Point2,
    heading: f32,
    field: &FieldView<'_>,
    tunables: &Tunables,
    edge_policy: EdgePolicy,
) -> f32 {
    let sensor_position =
        position + Point2::from_angle(heading + angle_offset) * tunables.sensor_offset;
    let (cx, cy) = field.cell_coords(sensor_position);
    let size = tunables.sensor_size as i64;

    let mut sum = 0.0;
    for dy in -size..=size {
        for dx in -size..=size {
            let (x, y) = (cx.saturating_add(dx), cy.saturating_add(dy));
            sum += match edge_policy {
                EdgePolicy::Clamp => field.sample(x, y),
                EdgePolicy::Zero => field.get(x, y).unwrap_or(0.0),
            };
        }
    }

    sum
}

pub fn sense(agent: &Agent, ctx: &SteeringContext<'_>) -> SensorReading {
    let sense = |angle_offset: f32| {
        sense_at(
            angle_offset,
            agent.position,
            agent.heading,
            &ctx.field,
            &ctx.tunables,
            ctx.edge_policy,
        )
    };

    SensorReading {
        forward: sense(0.0),
        left: sense(ctx.tunables.sensor_angle),
        right: sense(-ctx.tunables.sensor_angle),
    }
}

pub fn decide_turn(reading: &SensorReading) -> TurnDecision {
    let SensorReading {
        forward,
        left,
        right,
    } = *reading;

    if forward >= left && forward >= right {
        TurnDecision::NoTurn
    } else if forward < left && forward < right {
        TurnDecision::TurnRandom
    } else if forward < left {
        TurnDecision::TurnLeft
    } else {
        TurnDecision::TurnRight
    }
}

/// The signed change of heading for `decision`. When forward is the weakest
/// direction the agent still leans to the stronger side, picking a side at
/// random only on a tie.
pub fn turn_amount(
    decision: TurnDecision,
    reading: &SensorReading,
    draws: &AgentDraws,
    turn_rate: f32,
    dt: f32,
) -> f32 {
    let magnitude = turn_rate * dt * draws.turn_strength;

    match decision {
        TurnDecision::NoTurn => 0.0,
        TurnDecision::TurnLeft => magnitude,
        TurnDecision::TurnRight => -magnitude,
        TurnDecision::TurnRandom => {
            let turn_left = if reading.left == reading.right {
                draws.turn_left_on_tie
            } else {
                reading.left > reading.right
            };

            if turn_left {
                magnitude
            } else {
                -magnitude
            }
        }
    }
}

/// Run one agent's update for the frame and return the cell it was standing
/// on when the frame began, which is where its deposit goes.
pub fn update_agent(agent: &mut Agent, ctx: &SteeringContext<'_>, draws: &AgentDraws) -> usize {
    let deposit_cell = ctx.field.cell_of(agent.position);

    let reading = sense(agent, ctx);
    let decision = decide_turn(&reading);
    trace!("agent sensed {:?}, decided {:?}", reading, decision);

    let mut heading =
        agent.heading + turn_amount(decision, &reading, draws, ctx.tunables.turn_rate, ctx.dt);

    let step = ctx.tunables.move_speed * ctx.dt;
    let mut position = agent.position + Point2::from_angle(heading) * step;

    if let Some(push) = ctx.perturbation.push_direction(position, heading, draws.push) {
        trace!("agent at {} pushed along {}", position, push);
        position = position + push * step;
    }

    if let Some(target_angle) = ctx.extent.reflect(&mut position) {
        heading = target_angle + draws.bounce_offset;
        trace!("agent hit a wall, leaving at {}", heading);
    }

    agent.position = position;
    agent.heading = heading;

    deposit_cell
}
