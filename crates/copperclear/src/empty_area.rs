use crate::error::{ClearError, ClearResult};
use crate::geometry::offset::offset_area;
use crate::geometry::{drop_slivers, guarded, is_empty_area};
use crate::progress::{CancelToken, ProgressEvent, ProgressSink};
use geo::{BooleanOps, MultiPolygon};
use tracing::{debug, warn};

/// Compute `boundary - copper`, the area tools may travel through.
///
/// With `offset > 0` the copper is inflated first, keeping tools that far away
/// from it. When the direct difference fails, the copper parts are subtracted
/// one by one instead.
pub fn compute_empty(
    copper: &MultiPolygon<f64>,
    boundary: &MultiPolygon<f64>,
    offset: f64,
    steps_per_circle: u32,
    sink: &dyn ProgressSink,
    cancel: &CancelToken,
) -> ClearResult<MultiPolygon<f64>> {
    let copper = if offset > 0.0 {
        debug!(offset, "inflating copper before subtraction");
        offset_area(copper, offset, steps_per_circle)
    } else {
        copper.clone()
    };

    let empty = match guarded("boundary difference", || boundary.difference(&copper)) {
        Ok(empty) => empty,
        Err(reason) => {
            warn!(%reason, "direct difference failed, subtracting copper part by part");
            sink.report(ProgressEvent::Status(
                "Computing the area to clear part by part".to_string(),
            ));
            incremental_difference(boundary, &copper, sink, cancel)?
        }
    };

    let empty = drop_slivers(empty);
    if is_empty_area(&empty) {
        return Err(ClearError::NoClearingExtent);
    }
    debug!(parts = empty.0.len(), "computed empty area");
    Ok(empty)
}

/// Subtract each copper part from the running boundary.
///
/// Only status text is reported; the clearing pass owns the run percentage.
pub(crate) fn incremental_difference(
    boundary: &MultiPolygon<f64>,
    copper: &MultiPolygon<f64>,
    sink: &dyn ProgressSink,
    cancel: &CancelToken,
) -> ClearResult<MultiPolygon<f64>> {
    let mut running = boundary.clone();
    let parts = copper.0.len();

    for (index, part) in copper.0.iter().enumerate() {
        cancel.check()?;
        running = guarded("incremental difference", || running.difference(part))
            .map_err(|reason| ClearError::EmptyAreaFailed { reason })?;
        sink.report(ProgressEvent::Status(format!(
            "Subtracted copper part {}/{}",
            index + 1,
            parts
        )));
    }
    Ok(running)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use geo::{Area, Contains, Point, Rect};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Rect::new((x0, y0), (x1, y1)).to_polygon()])
    }

    #[test]
    fn test_empty_area_is_boundary_minus_copper() {
        let boundary = square(0.0, 0.0, 10.0, 10.0);
        let copper = square(4.0, 4.0, 6.0, 6.0);
        let empty = compute_empty(&copper, &boundary, 0.0, 64, &NoProgress, &CancelToken::new())
            .expect("empty area");

        assert!((empty.unsigned_area() - 96.0).abs() < 1e-6);
        assert!(!empty.contains(&Point::new(5.0, 5.0)));
        assert!(empty.contains(&Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_offset_inflates_copper() {
        let boundary = square(0.0, 0.0, 10.0, 10.0);
        let copper = square(4.0, 4.0, 6.0, 6.0);
        let empty = compute_empty(&copper, &boundary, 0.5, 64, &NoProgress, &CancelToken::new())
            .expect("empty area");

        assert!(!empty.contains(&Point::new(3.7, 5.0)));
        assert!(empty.unsigned_area() < 96.0 - 3.0);
    }

    #[test]
    fn test_fully_covered_boundary_has_no_extent() {
        let boundary = square(0.0, 0.0, 10.0, 10.0);
        let copper = square(-1.0, -1.0, 11.0, 11.0);
        assert!(matches!(
            compute_empty(&copper, &boundary, 0.0, 64, &NoProgress, &CancelToken::new()),
            Err(ClearError::NoClearingExtent)
        ));
    }

    #[test]
    fn test_incremental_matches_direct() {
        let boundary = square(0.0, 0.0, 10.0, 10.0);
        let copper = MultiPolygon::new(vec![
            Rect::new((1.0, 1.0), (2.0, 2.0)).to_polygon(),
            Rect::new((5.0, 5.0), (7.0, 7.0)).to_polygon(),
        ]);
        let seen = std::sync::Mutex::new(Vec::new());
        let sink = |event: ProgressEvent| seen.lock().expect("lock").push(event);

        let incremental =
            incremental_difference(&boundary, &copper, &sink, &CancelToken::new()).expect("difference");
        let direct = boundary.difference(&copper);

        assert!((incremental.unsigned_area() - direct.unsigned_area()).abs() < 1e-6);
        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 2);
        assert!(
            seen.iter().all(|e| matches!(e, ProgressEvent::Status(_))),
            "fallback must not move the run percentage: {seen:?}"
        );
        assert_eq!(seen[1], ProgressEvent::Status("Subtracted copper part 2/2".to_string()));
    }

    #[test]
    fn test_incremental_honours_cancel() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = incremental_difference(
            &square(0.0, 0.0, 10.0, 10.0),
            &square(1.0, 1.0, 2.0, 2.0),
            &NoProgress,
            &cancel,
        );
        assert!(matches!(result, Err(ClearError::Cancelled)));
    }
}
