use crate::{rect::Rect, Point2};
use log::debug;
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::f32::consts::TAU;
use typed_builder::TypedBuilder;

#[derive(TypedBuilder, Clone, Copy, Debug, PartialEq)]
pub struct Agent {
    // Field-local, origin at the center of the field
    #[builder(default)]
    pub position: Point2,
    // The heading an agent is facing. (In radians, never normalized)
    #[builder(default)]
    pub heading: f32,
    // Carried along for extensions; nothing reads it yet
    #[builder(default)]
    pub reserved: f32,
}

/// A fixed-size population. Agents are never added or removed once the pool
/// exists.
pub struct AgentPool {
    agents: Vec<Agent>,
}

impl AgentPool {
    /// `count` agents placed uniformly within a centered `width` x `height`
    /// extent, facing uniformly random headings in `[0, 2π)`.
    pub fn initialize(count: usize, width: u32, height: u32, rng_seed: Option<u64>) -> Self {
        let mut rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let extent = Rect::centered(width, height);

        let agents: Vec<_> = (0..count)
            .map(|_| {
                let position = Point2::new(
                    extent.x_min() + rng.gen::<f32>() * extent.width,
                    extent.y_min() + rng.gen::<f32>() * extent.height,
                );

                Agent::builder()
                    .position(position)
                    .heading(rng.gen_range(0.0..TAU))
                    .build()
            })
            .collect();

        debug!("generated {} agents", agents.len());

        Self { agents }
    }

    pub fn from_agents(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn positions(&self) -> impl Iterator<Item = Point2> + '_ {
        self.agents.iter().map(|agent| agent.position)
    }

    /// Visit every agent along with its stable index. Agents never read each
    /// other, so the visits run in parallel in no particular order.
    pub fn for_each<F>(&mut self, visitor: F)
    where
        F: Fn(usize, &mut Agent) + Sync + Send,
    {
        self.agents
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, agent)| visitor(index, agent));
    }

    /// Like `for_each`, collecting one result per agent in pool order.
    pub fn par_map<F, T>(&mut self, visitor: F) -> Vec<T>
    where
        F: Fn(usize, &mut Agent) -> T + Sync + Send,
        T: Send,
    {
        self.agents
            .par_iter_mut()
            .enumerate()
            .map(|(index, agent)| visitor(index, agent))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn initialize_places_agents_inside_the_extent() {
        let pool = AgentPool::initialize(1000, 200, 100, Some(1));
        let extent = Rect::centered(200, 100);

        assert_eq!(pool.len(), 1000);
        for agent in pool.agents() {
            assert!(extent.contains(&agent.position), "{}", agent.position);
            assert!((0.0..TAU).contains(&agent.heading));
            assert_eq!(agent.reserved, 0.0);
        }
    }

    #[test]
    fn initialize_spreads_agents_over_the_whole_extent() {
        let pool = AgentPool::initialize(4000, 100, 100, Some(2));
        let quadrants = pool.positions().fold([0usize; 4], |mut q, p| {
            q[(p.x >= 0.0) as usize * 2 + (p.y >= 0.0) as usize] += 1;
            q
        });
        assert!(quadrants.iter().all(|n| *n > 800), "{:?}", quadrants);
    }

    #[test]
    fn same_seed_same_agents() {
        let a = AgentPool::initialize(50, 64, 64, Some(99));
        let b = AgentPool::initialize(50, 64, 64, Some(99));
        let c = AgentPool::initialize(50, 64, 64, Some(100));
        assert_eq!(a.agents(), b.agents());
        assert_ne!(a.agents(), c.agents());
    }

    #[test]
    fn for_each_visits_every_agent_with_its_index() {
        let mut pool = AgentPool::from_agents(vec![Agent::builder().build(); 128]);
        pool.for_each(|index, agent| agent.reserved = index as f32);

        for (index, agent) in pool.agents().iter().enumerate() {
            assert_eq!(agent.reserved, index as f32);
        }
    }

    #[test]
    fn par_map_preserves_pool_order() {
        let mut pool = AgentPool::from_agents(vec![Agent::builder().build(); 300]);
        let indexes = pool.par_map(|index, _| index);
        assert_eq!(indexes, (0..300).collect::<Vec<_>>());
    }
}
