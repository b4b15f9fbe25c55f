use imageproc::point::Point;
use imageproc::rect::Rect;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

/// Computes the bounding rectangle of a set of contour points.
pub fn bounding_rect_of_points(points: &[Point<i32>]) -> Rect {
    let mut min = Point::new(i32::MAX, i32::MAX);
    let mut max = Point::new(i32::MIN, i32::MIN);
    for point in points {
        min = Point::new(min.x.min(point.x), min.y.min(point.y));
        max = Point::new(max.x.max(point.x), max.y.max(point.y));
    }
    Rect::at(min.x, min.y).of_size((max.x - min.x + 1) as u32, (max.y - min.y + 1) as u32)
}

/// Width-to-height ratio of a rect's bounding box.
pub fn aspect_ratio(rect: &Rect) -> f32 {
    rect.width() as f32 / rect.height() as f32
}

pub fn center_of_rect(rect: &Rect) -> Point<f32> {
    Point::new(
        rect.left() as f32 + rect.width() as f32 / 2.0,
        rect.top() as f32 + rect.height() as f32 / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_rect_spans_extreme_points() {
        let points = vec![
            Point::new(5, 10),
            Point::new(24, 12),
            Point::new(14, 29),
            Point::new(7, 11),
        ];
        let rect = bounding_rect_of_points(&points);
        assert_eq!(rect, Rect::at(5, 10).of_size(20, 20));
    }

    #[test]
    fn bounding_rect_of_single_point_is_one_pixel() {
        let rect = bounding_rect_of_points(&[Point::new(3, 4)]);
        assert_eq!(rect, Rect::at(3, 4).of_size(1, 1));
    }

    #[test]
    fn aspect_ratio_is_width_over_height() {
        let rect = Rect::at(0, 0).of_size(24, 20);
        assert!((aspect_ratio(&rect) - 1.2).abs() < f32::EPSILON);
    }

    #[test]
    fn center_of_rect_is_midpoint() {
        let rect = Rect::at(10, 20).of_size(20, 40);
        let center = center_of_rect(&rect);
        assert_eq!(center, Point::new(20.0, 40.0));
    }
}
