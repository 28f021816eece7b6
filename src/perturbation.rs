use crate::{util::map_range, Point2};
use std::sync::{Arc, PoisonError, RwLock};

/// A point that probabilistically shoves nearby agents away from it.
///
/// The zone of influence reaches out to `radius²` cells from `point`, and the
/// chance of being pushed grows cubically as an agent closes in. A radius of
/// zero or less means there is no perturbation at all.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perturbation {
    pub point: Point2,
    pub radius: f32,
}

impl Default for Perturbation {
    fn default() -> Self {
        Self::inactive()
    }
}

impl Perturbation {
    pub fn new(point: Point2, radius: f32) -> Self {
        Self { point, radius }
    }

    pub fn inactive() -> Self {
        Self {
            point: Point2::default(),
            radius: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.radius > 0.0 && self.point.is_finite()
    }

    /// Distance from `point` at which the push probability drops to zero.
    pub fn reach(&self) -> f32 {
        self.radius * self.radius
    }

    /// Chance that an agent at `position` gets pushed this frame.
    pub fn push_probability(&self, position: Point2) -> f32 {
        if !self.is_active() {
            return 0.0;
        }

        let distance = position.distance_to(&self.point);
        let reach = self.reach();
        if distance < reach {
            (1.0 - distance / reach).powi(3)
        } else {
            0.0
        }
    }

    /// The unit vector to displace an agent along, if `draw` (uniform in
    /// `[0, 1)`) says this agent gets pushed. An agent sitting exactly on the
    /// point is pushed along its own heading.
    pub fn push_direction(&self, position: Point2, heading: f32, draw: f32) -> Option<Point2> {
        if draw >= self.push_probability(position) {
            return None;
        }

        let away = position - self.point;
        let length = away.length();
        if length > 0.0 {
            Some(away * (1.0 / length))
        } else {
            Some(Point2::from_angle(heading))
        }
    }
}

/// A cloneable, thread-safe handle for an external event source (a pointer
/// handler, a script) to update the perturbation while the simulation runs.
///
/// The whole value is replaced on every update so a reader can never observe
/// a point from one update and a radius from another.
#[derive(Clone, Default)]
pub struct PerturbationHandle {
    inner: Arc<RwLock<Perturbation>>,
}

impl PerturbationHandle {
    pub fn set(&self, point: Point2, radius: f32) {
        self.replace(Perturbation::new(point, radius))
    }

    pub fn clear(&self) {
        self.replace(Perturbation::inactive())
    }

    /// A copy of the current value. A poisoned lock still holds a whole value,
    /// so it is read through.
    pub fn snapshot(&self) -> Perturbation {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, perturbation: Perturbation) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = perturbation;
    }
}

/// A pointer click in field-local coordinates (origin at the field center).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Map a click in display pixels (origin top left, y down) onto a field of
    /// `field_width` x `field_height` cells.
    pub fn from_display(
        display_x: f32,
        display_y: f32,
        display_width: u32,
        display_height: u32,
        field_width: u32,
        field_height: u32,
    ) -> Option<Self> {
        let half_width = field_width as f32 / 2.0;
        let half_height = field_height as f32 / 2.0;
        let x = map_range(
            display_x,
            0.0,
            display_width as f32,
            -half_width,
            half_width,
        )?;
        let y = map_range(
            display_y,
            0.0,
            display_height as f32,
            half_height,
            -half_height,
        )?;

        Some(Self { x, y }).filter(|event| event.point().is_finite())
    }

    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}
