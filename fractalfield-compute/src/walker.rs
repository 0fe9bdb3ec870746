//! Resumable parallel row scanner.
//!
//! Workers claim rows from a shared atomic cursor, iterate every unresolved
//! pixel in their row, and hand the finished rows back to the caller, which
//! writes them into the field after all workers have joined. Each pixel is
//! therefore written at most once between invalidations, and no worker ever
//! touches the field mutably.
//!
//! A scan call is timeboxed: after finishing a row each worker checks the
//! elapsed time against the budget and raises a shared timeout flag. Rows
//! already claimed still complete, so the cursor always advances by whole
//! rows and a later call resumes exactly where this one stopped.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use fractalfield_core::{DoubleDouble, EscapeField, PrecisionTier, Real, WorldQuad};

use crate::kernel::{escape_kernel, warped_kernel};

/// Everything a worker needs to compute one pixel.
#[derive(Clone, Copy)]
pub struct ScanParams<'a> {
    pub quad: &'a WorldQuad,
    pub tier: PrecisionTier,
    pub iter_cap: u32,
    pub needs_dist: bool,
    pub warp: Option<&'a fractalfield_core::WarpSettings>,
}

/// Worker pool size: oversubscribe the cores a little so a stalled row does
/// not idle a core.
pub fn default_worker_count() -> usize {
    ((num_cpus::get() as f64 * 1.5) as usize).max(1)
}

/// Bilinear interpolation of the quad corners at normalized `(u, v)`,
/// carried out in the iteration type so deep zooms keep sub-f64 coordinate
/// resolution.
fn quad_point<T: Real>(quad: &WorldQuad, u: f64, v: f64) -> (T, T) {
    let u = T::from_f64(u);
    let v = T::from_f64(v);

    let ax = T::from_f64(quad.a.x);
    let ay = T::from_f64(quad.a.y);
    let bx = T::from_f64(quad.b.x);
    let by = T::from_f64(quad.b.y);
    let cx = T::from_f64(quad.c.x);
    let cy = T::from_f64(quad.c.y);
    let dx = T::from_f64(quad.d.x);
    let dy = T::from_f64(quad.d.y);

    let left_x = ax + (dx - ax) * v;
    let left_y = ay + (dy - ay) * v;
    let right_x = bx + (cx - bx) * v;
    let right_y = by + (cy - by) * v;

    (
        left_x + (right_x - left_x) * u,
        left_y + (right_y - left_y) * u,
    )
}

/// Computed cells of one row: `(x, depth, dist)` for pixels that were
/// unresolved when the scan started.
type RowCells = Vec<(usize, f64, f64)>;

fn scan_row<T: Real>(field: &EscapeField, params: &ScanParams, y: usize) -> RowCells {
    let w = field.width();
    let h = field.height();
    let v = (y as f64 + 0.5) / h as f64;

    let mut cells = Vec::new();
    for x in 0..w {
        if field.at(x, y).is_resolved() {
            continue;
        }
        let u = (x as f64 + 0.5) / w as f64;
        let (wx, wy) = quad_point::<T>(params.quad, u, v);
        let (depth, dist) = if let Some(warp) = params.warp {
            (
                warped_kernel(wx.to_f64(), wy.to_f64(), params.iter_cap, warp),
                0.0,
            )
        } else {
            escape_kernel(wx, wy, params.iter_cap, params.needs_dist)
        };
        cells.push((x, depth, dist));
    }
    cells
}

fn dispatch_row(field: &EscapeField, params: &ScanParams, y: usize) -> RowCells {
    if params.warp.is_some() {
        return scan_row::<f64>(field, params, y);
    }
    match params.tier {
        PrecisionTier::Single => scan_row::<f32>(field, params, y),
        PrecisionTier::Double => scan_row::<f64>(field, params, y),
        PrecisionTier::Extended => scan_row::<DoubleDouble>(field, params, y),
    }
}

/// Resumable scanner over one escape field.
pub struct TileWalker {
    cursor: usize,
    worker_count: usize,
}

impl TileWalker {
    pub fn new(worker_count: usize) -> Self {
        Self {
            cursor: 0,
            worker_count: worker_count.max(1),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Forget scan progress; the next call starts at row 0.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Compute unresolved pixels row by row, resuming from the stored
    /// cursor. Returns true when the bottom row has been processed; the
    /// cursor is reset so the next scan starts over.
    ///
    /// With `budget = None` the call runs to completion in one go.
    pub fn scan(
        &mut self,
        field: &mut EscapeField,
        params: &ScanParams,
        budget: Option<Duration>,
    ) -> bool {
        let h = field.height();
        if h == 0 || field.width() == 0 {
            return true;
        }

        let next_row = AtomicUsize::new(self.cursor);
        let timed_out = AtomicBool::new(false);
        let start = Instant::now();

        let rows: Vec<(usize, RowCells)> = {
            let field_view: &EscapeField = field;
            crossbeam::scope(|spawner| {
                let handles: Vec<_> = (0..self.worker_count)
                    .map(|_| {
                        let next_row = &next_row;
                        let timed_out = &timed_out;
                        spawner.spawn(move |_| {
                            let mut done = Vec::new();
                            loop {
                                if timed_out.load(Ordering::Relaxed) {
                                    break;
                                }
                                let y = next_row.fetch_add(1, Ordering::Relaxed);
                                if y >= h {
                                    break;
                                }
                                done.push((y, dispatch_row(field_view, params, y)));
                                if let Some(budget) = budget {
                                    if start.elapsed() >= budget {
                                        timed_out.store(true, Ordering::Relaxed);
                                    }
                                }
                            }
                            done
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .flat_map(|handle| handle.join().expect("scan worker panicked"))
                    .collect()
            })
            .expect("scan scope panicked")
        };

        for (y, cells) in rows {
            for (x, depth, dist) in cells {
                let pixel = field.at_mut(x, y);
                pixel.depth = depth;
                pixel.dist = dist;
            }
        }

        // Claims past the end overshoot the cursor; clamp back to the row
        // count before deciding completion.
        self.cursor = next_row.load(Ordering::Relaxed).min(h);
        if self.cursor >= h {
            self.cursor = 0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractalfield_core::{Smoothing, INSIDE_SET_SKIPPED, UNCOMPUTED};

    fn test_field(w: usize, h: usize) -> EscapeField {
        let mut field = EscapeField::new(0);
        field.set_dimensions(w, h);
        field
    }

    fn full_view() -> WorldQuad {
        WorldQuad::centered(-0.5, 0.0, 4.0, 4.0, 0.0)
    }

    fn params(quad: &WorldQuad) -> ScanParams<'_> {
        ScanParams {
            quad,
            tier: PrecisionTier::Double,
            iter_cap: 500,
            needs_dist: Smoothing::Iter.needs_dist(),
            warp: None,
        }
    }

    #[test]
    fn unbudgeted_scan_resolves_every_pixel() {
        let quad = full_view();
        let mut field = test_field(9, 9);
        let mut walker = TileWalker::new(4);
        let complete = walker.scan(&mut field, &params(&quad), None);
        assert!(complete);
        assert_eq!(walker.cursor(), 0);
        assert!(field.pixels().iter().all(|p| p.is_resolved()));
        // The view covers the set center, so both classes must appear.
        assert!(field.pixels().iter().any(|p| p.is_interior()));
        assert!(field
            .pixels()
            .iter()
            .any(|p| !p.is_interior() && p.depth >= 0.0));
    }

    #[test]
    fn zero_budget_single_worker_advances_one_row_per_call() {
        let quad = full_view();
        let mut field = test_field(6, 5);
        let mut walker = TileWalker::new(1);
        let p = params(&quad);

        for call in 0..4 {
            let complete = walker.scan(&mut field, &p, Some(Duration::ZERO));
            assert!(!complete, "complete after call {}", call);
            assert_eq!(walker.cursor(), call + 1);
            for y in 0..field.height() {
                let resolved = field.row(y).iter().all(|px| px.is_resolved());
                let untouched = field.row(y).iter().all(|px| !px.is_resolved());
                if y <= call {
                    assert!(resolved, "row {} after call {}", y, call);
                } else {
                    assert!(untouched, "row {} after call {}", y, call);
                }
            }
        }

        // Fifth call finishes the last row and resets the cursor.
        assert!(walker.scan(&mut field, &p, Some(Duration::ZERO)));
        assert_eq!(walker.cursor(), 0);
        assert!(field.pixels().iter().all(|p| p.is_resolved()));
    }

    #[test]
    fn resolved_pixels_are_skipped() {
        let quad = full_view();
        let mut field = test_field(4, 4);
        let marker = 123.456;
        field.at_mut(2, 1).depth = marker;

        let mut walker = TileWalker::new(2);
        walker.scan(&mut field, &params(&quad), None);
        assert_eq!(field.at(2, 1).depth, marker);
    }

    #[test]
    fn scan_is_deterministic_across_worker_counts() {
        let quad = WorldQuad::centered(-0.745, 0.113, 0.01, 0.01, 0.3);
        let mut p = params(&quad);
        p.needs_dist = true;

        let mut field_a = test_field(12, 12);
        TileWalker::new(1).scan(&mut field_a, &p, None);

        let mut field_b = test_field(12, 12);
        TileWalker::new(7).scan(&mut field_b, &p, None);

        for (a, b) in field_a.pixels().iter().zip(field_b.pixels()) {
            assert_eq!(a.depth, b.depth);
            assert_eq!(a.dist, b.dist);
        }
    }

    #[test]
    fn interior_region_uses_shortcut_sentinel() {
        // A tiny view deep inside the cardioid: every pixel skips the loop.
        let quad = WorldQuad::centered(0.0, 0.0, 0.01, 0.01, 0.0);
        let mut field = test_field(3, 3);
        TileWalker::new(2).scan(&mut field, &params(&quad), None);
        assert!(field
            .pixels()
            .iter()
            .all(|p| p.depth == INSIDE_SET_SKIPPED));
    }

    #[test]
    fn empty_field_scan_is_complete() {
        let quad = full_view();
        let mut field = EscapeField::new(0);
        let mut walker = TileWalker::new(2);
        assert!(walker.scan(&mut field, &params(&quad), None));
    }

    #[test]
    fn reset_restarts_from_top() {
        let quad = full_view();
        let mut field = test_field(4, 4);
        let mut walker = TileWalker::new(1);
        walker.scan(&mut field, &params(&quad), Some(Duration::ZERO));
        assert_eq!(walker.cursor(), 1);
        walker.reset();
        assert_eq!(walker.cursor(), 0);
        field.set_all_depth(UNCOMPUTED);
        assert!(walker.scan(&mut field, &params(&quad), None));
    }
}
