use super::FillParams;
use crate::error::FillError;
use crate::geometry::offset::offset_round;
use crate::geometry::{area_rings, is_empty_area};
use crate::types::Toolpath;
use geo::{
    BooleanOps, BoundingRect, Coord, Distance, Euclidean, InteriorPoint, LineString,
    MultiLineString, Point, Polygon,
};
use std::f64::consts::PI;

/// Seed fill: concentric rings grown from a point inside the polygon, clipped to
/// the region the tool centre may reach.
pub fn fill_seed(polygon: &Polygon<f64>, params: &FillParams) -> Result<Toolpath, FillError> {
    let margin = offset_round(polygon, -params.radius(), params.steps_per_circle);
    if is_empty_area(&margin) {
        return Err(FillError::ToolTooLarge {
            diameter: params.tool_diameter,
        });
    }

    let seed = margin
        .interior_point()
        .ok_or_else(|| FillError::Degenerate("no interior point for seed".to_string()))?;
    let bounds = margin
        .bounding_rect()
        .ok_or_else(|| FillError::Degenerate("tool-centre region has no bounds".to_string()))?;

    // Past the farthest bounding-box corner every ring misses the region.
    let reach = [
        bounds.min(),
        bounds.max(),
        Coord {
            x: bounds.min().x,
            y: bounds.max().y,
        },
        Coord {
            x: bounds.max().x,
            y: bounds.min().y,
        },
    ]
    .into_iter()
    .map(|corner| Euclidean.distance(seed, Point::from(corner)))
    .fold(0.0, f64::max);

    let step = params.stepover();
    let mut radius = params.radius() * (1.0 - params.overlap);
    let mut paths = Vec::new();
    while radius <= reach + step {
        let ring = MultiLineString::new(vec![circle(seed, radius, params.steps_per_circle)]);
        let clipped = margin.clip(&ring, false);
        paths.extend(clipped.0.into_iter().filter(|p| p.0.len() >= 2));
        radius += step;
    }

    if params.contour {
        paths.extend(area_rings(&margin));
    }

    Ok(Toolpath::new(paths))
}

fn circle(center: Point<f64>, radius: f64, steps: u32) -> LineString<f64> {
    let steps = steps.max(3);
    let coords: Vec<Coord<f64>> = (0..=steps)
        .map(|i| {
            let angle = 2.0 * PI * f64::from(i % steps) / f64::from(steps);
            Coord {
                x: center.x() + radius * angle.cos(),
                y: center.y() + radius * angle.sin(),
            }
        })
        .collect();
    LineString::new(coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Rect;

    fn params(contour: bool) -> FillParams {
        FillParams {
            tool_diameter: 1.0,
            steps_per_circle: 32,
            overlap: 0.5,
            contour,
            connect: false,
        }
    }

    #[test]
    fn test_circle_is_closed() {
        let ring = circle(Point::new(1.0, 1.0), 2.0, 16);
        assert_eq!(ring.0.len(), 17);
        assert!(ring.is_closed());
    }

    #[test]
    fn test_rings_reach_the_corners() {
        let square = Rect::new((0.0, 0.0), (10.0, 10.0)).to_polygon();
        let toolpath = fill_seed(&square, &params(false)).expect("seed fill");

        let near_corner = toolpath
            .paths
            .iter()
            .flat_map(|p| p.0.iter())
            .any(|c| c.x < 1.5 && c.y < 1.5);
        assert!(near_corner, "outer rings should reach into the corners");
    }

    #[test]
    fn test_contour_adds_outline() {
        let square = Rect::new((0.0, 0.0), (10.0, 10.0)).to_polygon();
        let without = fill_seed(&square, &params(false)).expect("seed fill");
        let with = fill_seed(&square, &params(true)).expect("seed fill");
        assert_eq!(with.paths.len(), without.paths.len() + 1);
    }
}
