use crate::Point2;
use std::f32::consts::{FRAC_PI_2, PI};
use std::ops::Add;

/// How far inside the boundary an agent is placed after it hits a wall.
pub const BOUNDARY_INSET: f32 = 0.5;

/// A Rectangle defined by its bottom left corner, width and height.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect<T> {
    /// The x coordinate of the bottom left corner.
    pub x: T,
    /// The y coordinate of the bottom left corner.
    pub y: T,
    /// The rectangle's width.
    pub width: T,
    /// The rectangle's height.
    pub height: T,
}

impl<T: Copy> Rect<T> {
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl<T> Rect<T>
where
    T: Add<Output = T> + Copy,
{
    pub fn x_min(&self) -> T {
        self.x
    }

    pub fn x_max(&self) -> T {
        self.x + self.width
    }

    pub fn y_min(&self) -> T {
        self.y
    }

    pub fn y_max(&self) -> T {
        self.y + self.height
    }
}

impl Rect<f32> {
    /// The extent of a `width` x `height` field with its origin at the center.
    pub fn centered(width: u32, height: u32) -> Self {
        let (width, height) = (width as f32, height as f32);
        Self::new(-width / 2.0, -height / 2.0, width, height)
    }

    /// Inclusive on both ends.
    pub fn contains(&self, other: &Point2) -> bool {
        other.x >= self.x_min()
            && other.x <= self.x_max()
            && other.y >= self.y_min()
            && other.y <= self.y_max()
    }

    /// Pull `point` back inside on every axis it has left and report the heading
    /// an agent should leave the wall at. When both axes are hit the y wall wins.
    pub fn reflect(&self, point: &mut Point2) -> Option<f32> {
        let mut target_angle = None;

        if point.x > self.x_max() {
            point.x = self.x_max() - BOUNDARY_INSET;
            target_angle = Some(PI);
        } else if point.x < self.x_min() {
            point.x = self.x_min() + BOUNDARY_INSET;
            target_angle = Some(0.0);
        }

        if point.y > self.y_max() {
            point.y = self.y_max() - BOUNDARY_INSET;
            target_angle = Some(-FRAC_PI_2);
        } else if point.y < self.y_min() {
            point.y = self.y_min() + BOUNDARY_INSET;
            target_angle = Some(FRAC_PI_2);
        }

        target_angle
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn centered_rect_is_symmetric_about_the_origin() {
        let rect = Rect::centered(100, 60);
        assert_eq!((rect.x_min(), rect.x_max()), (-50.0, 50.0));
        assert_eq!((rect.y_min(), rect.y_max()), (-30.0, 30.0));
    }

    #[test]
    fn reflect_leaves_inside_points_alone() {
        let rect = Rect::centered(10, 10);
        let mut p = Point2::new(4.9, -5.0);
        assert_eq!(rect.reflect(&mut p), None);
        assert_eq!(p, Point2::new(4.9, -5.0));
    }

    #[test]
    fn reflect_reports_a_target_angle_per_wall() {
        let rect = Rect::centered(10, 10);

        let mut east = Point2::new(7.0, 0.0);
        assert_eq!(rect.reflect(&mut east), Some(PI));
        assert_eq!(east.x, 4.5);

        let mut west = Point2::new(-70.0, 0.0);
        assert_eq!(rect.reflect(&mut west), Some(0.0));
        assert_eq!(west.x, -4.5);

        let mut north = Point2::new(0.0, 5.5);
        assert_eq!(rect.reflect(&mut north), Some(-FRAC_PI_2));
        assert_eq!(north.y, 4.5);

        let mut south = Point2::new(0.0, -5.5);
        assert_eq!(rect.reflect(&mut south), Some(FRAC_PI_2));
        assert_eq!(south.y, -4.5);
    }

    #[test]
    fn reflect_in_a_corner_clamps_both_axes() {
        let rect = Rect::centered(10, 10);
        let mut p = Point2::new(9.0, -9.0);
        assert_eq!(rect.reflect(&mut p), Some(FRAC_PI_2));
        assert!(rect.contains(&p));
    }
}
