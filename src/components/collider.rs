//! Gameplay overlap collider.
//!
//! [`Collider2D`] is not simulated. It keeps a rotated, scaled rectangle in
//! world space, pivoted at its bottom-centre, refreshed on every update, and
//! answers overlap queries with the separating-axis test.
use crate::component::{Component, FrameContext};
use crate::components::sprite::Sprite;
use crate::error::Result;
use crate::gameobject::{GameObjectMut, GameObjectRef};
use crate::math::{Vec2, rotate_around};
use crate::render::{Canvas, Color};

fn project(axis: Vec2, polygon: &[Vec2]) -> (f32, f32) {
    polygon
        .iter()
        .map(|p| axis.dot(p))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}

/// Separating-axis overlap test for convex polygons. Touching edges count as
/// overlapping.
pub fn polygons_intersect(a: &[Vec2], b: &[Vec2]) -> bool {
    for polygon in [a, b] {
        for (i, p1) in polygon.iter().enumerate() {
            let p2 = polygon[(i + 1) % polygon.len()];
            let edge = p2 - p1;
            let axis = Vec2::new(-edge.y, edge.x);
            let (min_a, max_a) = project(axis, a);
            let (min_b, max_b) = project(axis, b);
            if max_a < min_b || max_b < min_a {
                return false;
            }
        }
    }
    true
}

#[derive(Debug, Clone)]
pub struct Collider2D {
    /// Zero width and height are replaced by the sibling sprite's size on
    /// start.
    pub width: f32,
    pub height: f32,
    /// Pivot offset from the world position.
    pub offset: Vec2,
    pub debug: bool,
    points: Option<[Vec2; 4]>,
}

impl Collider2D {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::new(0.0, 0.0),
            debug: false,
            points: None,
        }
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// World-space corners (top-left, top-right, bottom-right, bottom-left
    /// before rotation), once computed.
    pub fn points(&self) -> Option<&[Vec2; 4]> {
        self.points.as_ref()
    }

    /// Recompute the world corners from the owner's transform.
    pub fn refresh(&mut self, obj: &GameObjectRef<'_>) {
        let pivot = obj.world_position() + self.offset;
        let scale = obj.world_scale();
        let theta = obj.world_rotation_radians();
        let (hw, h) = (self.width / 2.0, self.height);
        let local = [
            Vec2::new(-hw, -h),
            Vec2::new(hw, -h),
            Vec2::new(hw, 0.0),
            Vec2::new(-hw, 0.0),
        ];
        self.points = Some(local.map(|c| rotate_around(pivot + c.component_mul(&scale), pivot, theta)));
    }

    pub fn intersects(&self, other: &Collider2D) -> bool {
        match (&self.points, &other.points) {
            (Some(a), Some(b)) => polygons_intersect(a, b),
            _ => false,
        }
    }
}

impl Component for Collider2D {
    fn start(&mut self, obj: &mut GameObjectMut<'_>) -> Result<()> {
        if self.width == 0.0 && self.height == 0.0 {
            if let Some(sprite) = obj.get_component::<Sprite>() {
                self.width = sprite.width;
                self.height = sprite.height;
            }
        }
        self.refresh(&obj.as_readonly());
        Ok(())
    }

    fn update(&mut self, obj: &mut GameObjectMut<'_>, _frame: &FrameContext<'_>) -> Result<()> {
        self.refresh(&obj.as_readonly());
        Ok(())
    }

    fn render(&self, _obj: &GameObjectRef<'_>, canvas: &mut Canvas<'_>) {
        if let (true, Some(points)) = (self.debug, &self.points) {
            canvas.polygon(points, 2.0, Color::RED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    const EPSILON: f32 = 1e-4;

    fn unit_square(at: Vec2) -> [Vec2; 4] {
        [
            at,
            at + Vec2::new(1.0, 0.0),
            at + Vec2::new(1.0, 1.0),
            at + Vec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn sat_detects_overlap_and_separation() {
        let a = unit_square(Vec2::new(0.0, 0.0));
        assert!(polygons_intersect(&a, &unit_square(Vec2::new(0.5, 0.5))));
        assert!(!polygons_intersect(&a, &unit_square(Vec2::new(2.0, 0.0))));
        // touching edges
        assert!(polygons_intersect(&a, &unit_square(Vec2::new(1.0, 0.0))));
    }

    #[test]
    fn sat_separates_rotated_diamond_by_its_own_axis() {
        let diamond = [
            Vec2::new(2.0, 1.0),
            Vec2::new(3.0, 2.0),
            Vec2::new(2.0, 3.0),
            Vec2::new(1.0, 2.0),
        ];
        // bounding boxes overlap, shapes do not
        assert!(!polygons_intersect(&unit_square(Vec2::new(0.05, 0.05)), &diamond));
    }

    #[test]
    fn corners_pivot_at_bottom_centre() {
        let mut scene = Scene::new("col");
        let e = scene.spawn_at("box", 100.0, 50.0);
        let mut obj = scene.object_mut(e).unwrap();
        obj.transform_mut().unwrap().set_local_scale(2.0, 1.0);
        obj.add_component(Collider2D::new(10.0, 20.0)).unwrap();
        scene.add_game_object(e).unwrap();

        let col = scene.object(e).unwrap().get_component::<Collider2D>().unwrap();
        let p = col.points().unwrap();
        assert!((p[0] - Vec2::new(90.0, 30.0)).norm() < EPSILON);
        assert!((p[2] - Vec2::new(110.0, 50.0)).norm() < EPSILON);
    }

    #[test]
    fn rotation_turns_around_pivot() {
        let mut scene = Scene::new("col");
        let e = scene.spawn("box");
        let mut obj = scene.object_mut(e).unwrap();
        obj.transform_mut().unwrap().set_local_rotation(90.0);
        obj.add_component(Collider2D::new(2.0, 4.0)).unwrap();
        scene.add_game_object(e).unwrap();

        let col = scene.object(e).unwrap().get_component::<Collider2D>().unwrap();
        // top-left (-1, -4) rotated a quarter turn lands at (4, -1)
        assert!((col.points().unwrap()[0] - Vec2::new(4.0, -1.0)).norm() < EPSILON);
    }

    #[test]
    fn unrefreshed_colliders_never_intersect() {
        let a = Collider2D::new(5.0, 5.0);
        let b = Collider2D::new(5.0, 5.0);
        assert!(!a.intersects(&b));
    }
}
