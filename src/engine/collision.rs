use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    Rect { center: Vec2, half: Vec2 },
    RoundedRect { center: Vec2, half: Vec2, corner: f32 },
}

impl Shape {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::Circle { center, radius }
    }

    pub fn rect(center: Vec2, width: f32, height: f32) -> Self {
        Self::Rect {
            center,
            half: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn rounded_rect(center: Vec2, width: f32, height: f32, corner: f32) -> Self {
        Self::RoundedRect {
            center,
            half: Vec2::new(width / 2.0, height / 2.0),
            corner,
        }
    }

    fn as_box(&self) -> (Vec2, Vec2, f32) {
        match *self {
            Self::Circle { center, radius } => (center, Vec2::splat(radius), radius),
            Self::Rect { center, half } => (center, half, 0.0),
            Self::RoundedRect {
                center,
                half,
                corner,
            } => (center, half, corner.clamp(0.0, half.min_element())),
        }
    }
}

/// Strict overlap: shapes that only touch at the boundary don't count.
pub fn overlaps(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (
            Shape::Circle {
                center: ca,
                radius: ra,
            },
            Shape::Circle {
                center: cb,
                radius: rb,
            },
        ) => ca.distance_squared(*cb) < (ra + rb) * (ra + rb),
        (Shape::Circle { center, radius }, other) | (other, Shape::Circle { center, radius }) => {
            let (box_center, half, corner) = other.as_box();
            circle_box_overlap(*center, *radius, box_center, half, corner)
        }
        // Corner rounding is ignored between two boxes.
        _ => {
            let (ca, ha, _) = a.as_box();
            let (cb, hb, _) = b.as_box();
            let delta = (ca - cb).abs();
            delta.x < ha.x + hb.x && delta.y < ha.y + hb.y
        }
    }
}

fn circle_box_overlap(center: Vec2, radius: f32, box_center: Vec2, half: Vec2, corner: f32) -> bool {
    let inner = (half - Vec2::splat(corner)).max(Vec2::ZERO);
    let local = center - box_center;
    let closest = local.clamp(-inner, inner);
    let reach = radius + corner;
    local.distance_squared(closest) < reach * reach
}

/// Reports every overlapping `(left, right)` pair exactly once. Pure: the
/// caller decides what a contact means.
pub fn detect_overlaps<A: Copy, B: Copy>(left: &[(A, Shape)], right: &[(B, Shape)]) -> Vec<(A, B)> {
    let mut pairs = Vec::new();
    for (a_key, a_shape) in left {
        for (b_key, b_shape) in right {
            if overlaps(a_shape, b_shape) {
                pairs.push((*a_key, *b_key));
            }
        }
    }
    pairs
}

/// First target touched by a circle moving from `from` to `to`, sampled in
/// steps no longer than its radius so thin targets can't be skipped. Earlier
/// targets in the slice win when several are touched at the same step.
pub fn first_hit_along<B: Copy>(
    from: Vec2,
    to: Vec2,
    radius: f32,
    targets: &[(B, Shape)],
) -> Option<B> {
    let steps = (from.distance(to) / radius.max(1.0)).ceil().max(1.0) as usize;
    (0..=steps).find_map(|step| {
        let swept = Shape::circle(from.lerp(to, step as f32 / steps as f32), radius);
        targets
            .iter()
            .find(|(_, shape)| overlaps(&swept, shape))
            .map(|(key, _)| *key)
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    ProjectileBoss { projectile: u64 },
    ProjectileShield { projectile: u64 },
    PlayerHazard { player: usize, hazard: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circles_touching_at_boundary_do_not_overlap() {
        let a = Shape::circle(Vec2::new(0.0, 0.0), 10.0);
        let touching = Shape::circle(Vec2::new(20.0, 0.0), 10.0);
        let inside = Shape::circle(Vec2::new(19.0, 0.0), 10.0);
        assert!(!overlaps(&a, &touching));
        assert!(overlaps(&a, &inside));
    }

    #[test]
    fn circle_against_rect_uses_closest_point() {
        let boss = Shape::rect(Vec2::new(100.0, 100.0), 20.0, 100.0);
        let beside = Shape::circle(Vec2::new(85.0, 100.0), 10.0);
        let corner_gap = Shape::circle(Vec2::new(82.0, 42.0), 10.0);
        let far = Shape::circle(Vec2::new(60.0, 100.0), 10.0);
        assert!(overlaps(&beside, &boss));
        assert!(overlaps(&boss, &beside));
        assert!(!overlaps(&corner_gap, &boss));
        assert!(!overlaps(&far, &boss));
    }

    #[test]
    fn rounded_corners_let_near_misses_through() {
        let square = Shape::rect(Vec2::ZERO, 50.0, 150.0);
        let rounded = Shape::rounded_rect(Vec2::ZERO, 50.0, 150.0, 20.0);
        // Just off the corner at (25, 75), inside the sharp box's reach.
        let near_corner = Shape::circle(Vec2::new(30.0, 80.0), 8.0);
        assert!(overlaps(&near_corner, &square));
        assert!(!overlaps(&near_corner, &rounded));

        let edge = Shape::circle(Vec2::new(30.0, 0.0), 8.0);
        assert!(overlaps(&edge, &rounded));
    }

    #[test]
    fn box_pairs_use_aabb_overlap() {
        let a = Shape::rect(Vec2::ZERO, 10.0, 10.0);
        let b = Shape::rounded_rect(Vec2::new(9.0, 0.0), 10.0, 10.0, 3.0);
        let c = Shape::rect(Vec2::new(10.0, 0.0), 10.0, 10.0);
        assert!(overlaps(&a, &b));
        assert!(!overlaps(&a, &c));
    }

    #[test]
    fn detect_overlaps_reports_each_pair_once() {
        let projectiles = vec![
            (1u64, Shape::circle(Vec2::new(0.0, 0.0), 5.0)),
            (2u64, Shape::circle(Vec2::new(100.0, 0.0), 5.0)),
            (3u64, Shape::circle(Vec2::new(3.0, 0.0), 5.0)),
        ];
        let targets = vec![("boss", Shape::rect(Vec2::ZERO, 10.0, 10.0))];
        assert_eq!(
            detect_overlaps(&projectiles, &targets),
            vec![(1, "boss"), (3, "boss")]
        );
        assert!(detect_overlaps::<u64, &str>(&projectiles, &[]).is_empty());
    }

    #[test]
    fn sweep_stops_at_the_first_target_on_the_path() {
        let targets = [
            ("boss", Shape::rect(Vec2::new(750.0, 300.0), 20.0, 100.0)),
            ("shield", Shape::rounded_rect(Vec2::new(600.0, 300.0), 50.0, 150.0, 20.0)),
        ];
        // Both endpoints miss the shield; the path between them doesn't.
        let from = Vec2::new(500.0, 300.0);
        let to = Vec2::new(680.0, 300.0);
        assert!(detect_overlaps(&[((), Shape::circle(to, 10.0))], &targets).is_empty());
        assert_eq!(first_hit_along(from, to, 10.0, &targets), Some("shield"));

        let into_boss = first_hit_along(Vec2::new(650.0, 300.0), Vec2::new(750.0, 300.0), 10.0, &targets);
        assert_eq!(into_boss, Some("boss"));
        let clear = first_hit_along(Vec2::new(50.0, 50.0), Vec2::new(300.0, 50.0), 10.0, &targets);
        assert_eq!(clear, None);
        let resting = first_hit_along(Vec2::new(100.0, 100.0), Vec2::new(100.0, 100.0), 10.0, &targets);
        assert_eq!(resting, None);
    }
}
