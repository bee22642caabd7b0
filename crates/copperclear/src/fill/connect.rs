use super::FillParams;
use crate::geometry::is_empty_area;
use crate::geometry::offset::offset_round;
use crate::types::Toolpath;
use geo::{Contains, Coord, Line, LineString, Polygon};

/// Chain paths into fewer, longer ones.
///
/// Paths are visited greedily by nearest endpoint. Two paths are joined by a
/// straight move only when that move stays inside the tool-centre region;
/// otherwise the tool lifts and a new path starts.
pub fn connect_paths(toolpath: Toolpath, polygon: &Polygon<f64>, params: &FillParams) -> Toolpath {
    let tolerance = params.tool_diameter * 1e-3;
    let region = offset_round(
        polygon,
        -params.radius() + tolerance,
        params.steps_per_circle,
    );
    let mut remaining: Vec<LineString<f64>> = toolpath
        .paths
        .into_iter()
        .filter(|p| p.0.len() >= 2)
        .collect();
    if is_empty_area(&region) || remaining.len() < 2 {
        return Toolpath::new(remaining);
    }

    let mut connected = Vec::new();
    let mut current = remaining.remove(0);
    while !remaining.is_empty() {
        let Some(&end) = current.0.last() else {
            break;
        };

        let (index, reversed) = nearest_path(end, &remaining);
        let mut next = remaining.swap_remove(index);
        if reversed {
            next.0.reverse();
        }

        let start = next.0[0];
        if region.contains(&Line::new(end, start)) {
            let skip = usize::from(start == end);
            current.0.extend(next.0.into_iter().skip(skip));
        } else {
            connected.push(std::mem::replace(&mut current, next));
        }
    }
    connected.push(current);

    Toolpath::new(connected)
}

/// Index of the path with an endpoint closest to `from`, and whether it must be reversed.
fn nearest_path(from: Coord<f64>, paths: &[LineString<f64>]) -> (usize, bool) {
    let mut best = (0, false);
    let mut best_distance = f64::INFINITY;
    for (index, path) in paths.iter().enumerate() {
        let (Some(first), Some(last)) = (path.0.first(), path.0.last()) else {
            continue;
        };
        let to_first = squared_distance(from, *first);
        let to_last = squared_distance(from, *last);
        if to_first < best_distance {
            best = (index, false);
            best_distance = to_first;
        }
        if to_last < best_distance {
            best = (index, true);
            best_distance = to_last;
        }
    }
    best
}

fn squared_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}
