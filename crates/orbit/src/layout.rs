//! Angular placement of menu items around an anchor.
//!
//! Items fan out symmetrically about the horizontal-right axis. Angles are
//! whole degrees; positive angles sweep towards increasing `y`, i.e. down
//! the screen.

use crate::geom::Point;
use thiserror::Error;

pub const DEFAULT_SPREAD_DEGREES: u32 = 160;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("cannot lay out an empty menu")]
    EmptyLayout,
    #[error("{count} items do not fit a {spread} degree spread")]
    TooManyItems { count: usize, spread: u32 },
}

/// Angles in degrees for `count` items spread over `spread` degrees, in
/// generation order (axis first for odd counts, then alternating
/// below/above the axis moving outwards).
///
/// The step is `spread / (count - 1)` in integer degrees. Even counts shift
/// every point by half a step so none lands on the axis. Counts that would
/// need a step below one degree (two for even counts) are rejected.
pub fn item_angles(count: usize, spread: u32) -> Result<Vec<i32>, LayoutError> {
    if count == 0 {
        return Err(LayoutError::EmptyLayout);
    }

    let mut angles = Vec::with_capacity(count);
    if count == 1 {
        angles.push(0);
        return Ok(angles);
    }

    let odd = count % 2 == 1;
    let step = u32::try_from(count - 1)
        .map(|gaps| spread / gaps)
        .unwrap_or(0) as i32;
    let min_step = if odd { 1 } else { 2 };
    if step < min_step {
        return Err(LayoutError::TooManyItems { count, spread });
    }
    let per_side = count / 2;

    if odd {
        angles.push(0);
    }

    for i in 0..per_side as i32 {
        let angle = if odd {
            step * (i + 1)
        } else {
            step / 2 + step * i
        };
        angles.push(angle);
        angles.push(-angle);
    }

    Ok(angles)
}

/// Points for `count` items at `radius` from `center` using the default
/// 160 degree spread, sorted top to bottom.
pub fn compute_item_points(
    center: Point,
    radius: f64,
    count: usize,
) -> Result<Vec<Point>, LayoutError> {
    compute_item_points_with_spread(center, radius, count, DEFAULT_SPREAD_DEGREES)
}

/// Sorted by ascending `y`; this is the stacking and stagger order, not the
/// provider's item order.
pub fn compute_item_points_with_spread(
    center: Point,
    radius: f64,
    count: usize,
    spread: u32,
) -> Result<Vec<Point>, LayoutError> {
    let mut points: Vec<Point> = item_angles(count, spread)?
        .into_iter()
        .map(|degrees| point_at(center, radius, degrees))
        .collect();

    points.sort_by(|a, b| a.y.total_cmp(&b.y));
    Ok(points)
}

pub fn point_at(center: Point, radius: f64, degrees: i32) -> Point {
    let theta = (degrees as f64).to_radians();
    Point::new(
        center.x + radius * theta.cos(),
        center.y + radius * theta.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_point_count_and_radius() {
        let center = Point::new(40.0, -12.5);
        for count in 1..=12 {
            let points = compute_item_points(center, 80.0, count).unwrap();
            assert_eq!(points.len(), count);
            for p in points {
                assert!((p.distance_to(center) - 80.0).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_crowded_layouts_are_rejected() {
        let widest = item_angles(161, DEFAULT_SPREAD_DEGREES).unwrap();
        let mut distinct = widest.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 161);

        let even = item_angles(80, DEFAULT_SPREAD_DEGREES).unwrap();
        assert!(even.iter().all(|&a| a != 0));

        for count in [82, 100, 162, 170] {
            assert_eq!(
                item_angles(count, DEFAULT_SPREAD_DEGREES),
                Err(LayoutError::TooManyItems {
                    count,
                    spread: DEFAULT_SPREAD_DEGREES
                }),
                "count {count}"
            );
        }
        assert!(compute_item_points(Point::default(), 80.0, 100).is_err());
        assert!(item_angles(2, 0).is_err());
    }

    #[test]
    fn test_axis_point_only_for_odd_counts() {
        for count in 1..=12 {
            let on_axis = item_angles(count, DEFAULT_SPREAD_DEGREES)
                .unwrap()
                .into_iter()
                .filter(|&a| a == 0)
                .count();
            let expected = if count % 2 == 1 { 1 } else { 0 };
            assert_eq!(on_axis, expected, "count {count}");
        }
    }

    #[test]
    fn test_points_sorted_by_y() {
        for count in 1..=12 {
            let points = compute_item_points(Point::default(), 50.0, count).unwrap();
            assert!(points.windows(2).all(|w| w[0].y <= w[1].y));
        }
    }

    #[test]
    fn test_five_items() {
        let angles = item_angles(5, DEFAULT_SPREAD_DEGREES).unwrap();
        assert_eq!(angles, vec![0, 40, -40, 80, -80]);

        let points = compute_item_points(Point::new(100.0, 100.0), 80.0, 5).unwrap();
        let axis = points[2];
        assert!((axis.x - 180.0).abs() < EPS);
        assert!((axis.y - 100.0).abs() < EPS);
        assert!(points[0].y < 100.0 && points[4].y > 100.0);
    }

    #[test]
    fn test_four_items_offset_by_half_step() {
        // step = 160 / 3 = 53, half step = 26
        let angles = item_angles(4, DEFAULT_SPREAD_DEGREES).unwrap();
        assert_eq!(angles, vec![26, -26, 79, -79]);
        assert_eq!(angles.iter().filter(|&&a| a > 0).count(), 2);
        assert_eq!(angles.iter().filter(|&&a| a < 0).count(), 2);

        let points = compute_item_points(Point::new(0.0, 0.0), 10.0, 4).unwrap();
        assert!(points.iter().all(|p| p.y.abs() > EPS));
    }

    #[test]
    fn test_two_items_use_full_spread() {
        assert_eq!(item_angles(2, DEFAULT_SPREAD_DEGREES).unwrap(), vec![80, -80]);
    }

    #[test]
    fn test_single_item_on_axis() {
        let points = compute_item_points(Point::new(5.0, 5.0), 20.0, 1).unwrap();
        assert_eq!(points.len(), 1);
        assert!((points[0].x - 25.0).abs() < EPS);
        assert!((points[0].y - 5.0).abs() < EPS);
    }

    #[test]
    fn test_custom_spread() {
        assert_eq!(item_angles(3, 90).unwrap(), vec![0, 45, -45]);
    }

    #[test]
    fn test_empty_layout_rejected() {
        assert_eq!(
            compute_item_points(Point::default(), 10.0, 0),
            Err(LayoutError::EmptyLayout)
        );
    }
}
