//! Smale horseshoes: U, S and G shapes
//!
//! The square is shrunk horizontally, stretched vertically to three (U) or
//! five (S, G) times its height plus exit margins, and the stretched strip
//! is folded back onto the square:
//!
//! ```text
//!     ┌────────┐        U: ╭──╮      S: ╭─╮         G: ╭────╮
//!     │        │   ->      │╭╮│         │ │ │ │        │ ╭╮ │  (middle leg
//!     │        │           ││││         │ │ │ │        │ ││ │   outside)
//!     └────────┘           ┴┴┴┴           ╰─╯          ┴─┴┴─┴
//! ```
//!
//! An optional horizontal offset pushes part of the image out of the square;
//! the exit-set quotient metric is adjusted to match.

use super::Map;
use crate::geometry::{Cube, Point};
use crate::metrics::HorseshoeExitSetQuotientMetric;
use ndarray::{array, ArrayView1};
use std::f64::consts::PI;

/// Number of horizontal pieces the U folds the square into
const U_PIECES: usize = 3;

/// Number of horizontal pieces the S and G fold the square into
const FIVE_PIECES: usize = 5;

/// Shrink in x around the centre, then stretch in y around the centre
#[derive(Debug, Clone)]
struct Squeeze {
    shrink_center: f64,
    shrink_factor: f64,
    shrink_offset: f64,

    stretch_center: f64,
    stretch_factor: f64,
    stretch_offset: f64,
}

impl Squeeze {
    /// `width` and `pieces` give the leg width and the number of pieces;
    /// `shrink_offset` is the first leg's centre as a fraction of the square.
    fn new(cube: &Cube, width: f64, shrink_offset: f64, pieces: usize, exit_margin: f64) -> Self {
        let size_x = cube[0].length();
        let size_y = cube[1].length();
        Self {
            shrink_center: cube[0].center(),
            shrink_factor: width,
            shrink_offset: cube[0].min + size_x * shrink_offset,

            stretch_center: cube[1].center(),
            stretch_factor: pieces as f64 + 2.0 * exit_margin,
            stretch_offset: cube[1].min + size_y * pieces as f64 * 0.5,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.shrink_center) * self.shrink_factor + self.shrink_offset,
            (y - self.stretch_center) * self.stretch_factor + self.stretch_offset,
        )
    }
}

#[derive(Debug, Clone)]
pub struct HorseshoeU {
    cube: Cube,
    metric: HorseshoeExitSetQuotientMetric,
    squeeze: Squeeze,

    piece2_start: f64,
    piece3_start: f64,

    fold_factor: f64,
    fold_center_x: f64,
    fold_center_y: f64,

    offset: f64,
}

impl HorseshoeU {
    pub fn new(exit_margin: f64, enter_margin: f64, cube: &Cube, offset: f64) -> Self {
        assert_eq!(cube.dimension(), 2, "horseshoe needs a planar domain");
        assert!(offset >= 0.0, "horseshoe offset must be non-negative");

        let size_x = cube[0].length();
        let size_y = cube[1].length();

        let mut map = Self {
            cube: cube.clone(),
            metric: HorseshoeExitSetQuotientMetric::new(cube[1], exit_margin, U_PIECES),
            squeeze: Squeeze::new(cube, 0.5 - 2.0 * enter_margin, 0.25, U_PIECES, exit_margin),

            piece2_start: cube[1].max,
            piece3_start: cube[1].max + size_y,

            fold_factor: PI / size_y,
            fold_center_x: cube[0].center(),
            fold_center_y: cube[1].max,

            offset,
        };
        if offset != 0.0 {
            map.setup_offset(enter_margin, size_x);
        }
        map
    }

    /// Quotient metric collapsing the part of the square this map expels
    pub fn exit_set_metric(&self) -> &HorseshoeExitSetQuotientMetric {
        &self.metric
    }

    fn setup_offset(&mut self, enter_margin: f64, size_x: f64) {
        let e = enter_margin * size_x;
        let w = (0.5 - 2.0 * enter_margin) * size_x;
        let offset = self.offset;

        if offset < e {
            return;
        }
        if offset > 3.0 * e + 2.0 * w {
            self.metric.set_trivial(true);
            return;
        }
        // Right leg partially out
        if offset < e + w {
            self.metric.set_x_exit_set(3, (offset - e) / w, true, self.cube[0]);
            return;
        }
        self.metric.add_piece_to_exit_set(3);
        if offset < 3.0 * e + w {
            return;
        }
        // Left leg partially out
        self.metric.set_x_exit_set(1, (offset - 3.0 * e - w) / w, false, self.cube[0]);
    }

    fn fold(&self, x: f64, y: f64) -> (f64, f64) {
        if y > self.piece3_start {
            (
                self.cube[0].max - (x - self.cube[0].min),
                self.cube[1].max - (y - self.piece3_start),
            )
        } else if y > self.piece2_start {
            let angle = (y - self.piece2_start) * self.fold_factor;
            let r = self.fold_center_x - x;
            (
                self.fold_center_x - angle.cos() * r,
                self.fold_center_y + angle.sin() * r,
            )
        } else {
            (x, y)
        }
    }
}

impl Map for HorseshoeU {
    fn dimension(&self) -> usize {
        2
    }

    fn value_at(&self, point: ArrayView1<f64>) -> Point {
        assert_eq!(point.len(), 2, "horseshoe needs a planar point");
        let (x, y) = self.squeeze.apply(point[0], point[1]);
        let (x, y) = self.fold(x, y);
        array![x + self.offset, y]
    }
}

/// Fold of a strip five squares tall into five vertical legs joined by an
/// upper and a lower arc.
///
/// Legs 1 and 5 keep their orientation, leg 3 runs backwards. The lower arc
/// bends below the square (S) or, with the middle leg placed right of the
/// square, above the bottom edge (G).
#[derive(Debug, Clone)]
struct FiveLegFold {
    cube: Cube,

    piece2_start: f64,
    piece3_start: f64,
    piece4_start: f64,
    piece5_start: f64,

    piece1_center: f64,
    piece3_center: f64,
    piece5_center: f64,

    fold_factor: f64,
    up_center_x: f64,
    up_center_y: f64,
    down_center_x: f64,
    down_center_y: f64,
    /// -1 bends the lower arc downwards, +1 upwards
    down_direction: f64,
}

impl FiveLegFold {
    fn new(cube: &Cube, leg_centers: [f64; 3], down_direction: f64) -> Self {
        let size_x = cube[0].length();
        let size_y = cube[1].length();
        let [c1, c3, c5] = leg_centers.map(|c| cube[0].min + size_x * c);
        Self {
            cube: cube.clone(),

            piece2_start: cube[1].max,
            piece3_start: cube[1].max + size_y,
            piece4_start: cube[1].max + 2.0 * size_y,
            piece5_start: cube[1].max + 3.0 * size_y,

            piece1_center: c1,
            piece3_center: c3,
            piece5_center: c5,

            fold_factor: PI / size_y,
            up_center_x: (c1 + c3) * 0.5,
            up_center_y: cube[1].max,
            down_center_x: (c3 + c5) * 0.5,
            down_center_y: cube[1].min,
            down_direction,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        // Position on leg 3, which runs mirrored around its centre
        let reversed = self.piece3_center - (x - self.piece1_center);
        if y > self.piece5_start {
            (
                self.piece5_center + (x - self.piece1_center),
                self.cube[1].min + (y - self.piece5_start),
            )
        } else if y > self.piece4_start {
            let angle = (y - self.piece4_start) * self.fold_factor;
            let r = self.down_center_x - reversed;
            (
                self.down_center_x - angle.cos() * r,
                self.down_center_y + self.down_direction * angle.sin() * r,
            )
        } else if y > self.piece3_start {
            (reversed, self.cube[1].max - (y - self.piece3_start))
        } else if y > self.piece2_start {
            let angle = (y - self.piece2_start) * self.fold_factor;
            let r = self.up_center_x - x;
            (
                self.up_center_x - angle.cos() * r,
                self.up_center_y + angle.sin() * r,
            )
        } else {
            (x, y)
        }
    }
}

/// S-shaped horseshoe: three legs of a third of the width each, all inside
/// the square
#[derive(Debug, Clone)]
pub struct HorseshoeS {
    cube: Cube,
    metric: HorseshoeExitSetQuotientMetric,
    squeeze: Squeeze,
    fold: FiveLegFold,
    offset: f64,
}

impl HorseshoeS {
    pub fn new(exit_margin: f64, enter_margin: f64, cube: &Cube, offset: f64) -> Self {
        assert_eq!(cube.dimension(), 2, "horseshoe needs a planar domain");
        assert!(offset >= 0.0, "horseshoe offset must be non-negative");

        let mut map = Self {
            cube: cube.clone(),
            metric: HorseshoeExitSetQuotientMetric::new(cube[1], exit_margin, FIVE_PIECES),
            squeeze: Squeeze::new(cube, 0.33 - 2.0 * enter_margin, 0.166, FIVE_PIECES, exit_margin),
            fold: FiveLegFold::new(cube, [0.166, 0.5, 1.0 - 0.166], -1.0),
            offset,
        };
        if offset != 0.0 {
            map.setup_offset(enter_margin, cube[0].length());
        }
        map
    }

    pub fn exit_set_metric(&self) -> &HorseshoeExitSetQuotientMetric {
        &self.metric
    }

    fn setup_offset(&mut self, enter_margin: f64, size_x: f64) {
        let e = enter_margin * size_x;
        let w = (0.33 - 2.0 * enter_margin) * size_x;
        let offset = self.offset;

        if offset < e {
            return;
        }
        if offset > 5.0 * e + 3.0 * w {
            self.metric.set_trivial(true);
            return;
        }
        // Right leg partially out
        if offset < e + w {
            self.metric.set_x_exit_set(5, (offset - e) / w, false, self.cube[0]);
            return;
        }
        self.metric.add_piece_to_exit_set(5);
        if offset < 3.0 * e + w {
            return;
        }
        // Middle leg partially out; it runs backwards
        if offset < 3.0 * e + 2.0 * w {
            self.metric.set_x_exit_set(3, (offset - 3.0 * e - w) / w, true, self.cube[0]);
            return;
        }
        self.metric.add_piece_to_exit_set(3);
        if offset < 5.0 * e + 2.0 * w {
            return;
        }
        self.metric.set_x_exit_set(1, (offset - 5.0 * e - 2.0 * w) / w, false, self.cube[0]);
    }
}

impl Map for HorseshoeS {
    fn dimension(&self) -> usize {
        2
    }

    fn value_at(&self, point: ArrayView1<f64>) -> Point {
        assert_eq!(point.len(), 2, "horseshoe needs a planar point");
        let (x, y) = self.squeeze.apply(point[0], point[1]);
        let (x, y) = self.fold.apply(x, y);
        array![x + self.offset, y]
    }
}

/// G-shaped horseshoe: like the U with a third leg folded out to the right
/// of the square, so the middle piece starts in the exit set
#[derive(Debug, Clone)]
pub struct HorseshoeG {
    cube: Cube,
    metric: HorseshoeExitSetQuotientMetric,
    squeeze: Squeeze,
    fold: FiveLegFold,
    offset: f64,
}

impl HorseshoeG {
    pub fn new(exit_margin: f64, enter_margin: f64, cube: &Cube, offset: f64) -> Self {
        assert_eq!(cube.dimension(), 2, "horseshoe needs a planar domain");
        assert!(offset >= 0.0, "horseshoe offset must be non-negative");

        let mut metric = HorseshoeExitSetQuotientMetric::new(cube[1], exit_margin, FIVE_PIECES);
        metric.add_piece_to_exit_set(3);

        let mut map = Self {
            cube: cube.clone(),
            metric,
            squeeze: Squeeze::new(cube, 0.5 - 2.0 * enter_margin, 0.25, FIVE_PIECES, exit_margin),
            fold: FiveLegFold::new(cube, [0.25, 1.25, 0.75], 1.0),
            offset,
        };
        if offset != 0.0 {
            map.setup_offset(enter_margin, cube[0].length());
        }
        map
    }

    pub fn exit_set_metric(&self) -> &HorseshoeExitSetQuotientMetric {
        &self.metric
    }

    fn setup_offset(&mut self, enter_margin: f64, size_x: f64) {
        let e = enter_margin * size_x;
        let w = (0.5 - 2.0 * enter_margin) * size_x;
        let offset = self.offset;

        if offset < e {
            return;
        }
        if offset > 3.0 * e + 2.0 * w {
            self.metric.set_trivial(true);
            return;
        }
        // Right leg partially out
        if offset < e + w {
            self.metric.set_x_exit_set(5, (offset - e) / w, false, self.cube[0]);
            return;
        }
        self.metric.add_piece_to_exit_set(5);
        if offset < 3.0 * e + w {
            return;
        }
        self.metric.set_x_exit_set(1, (offset - 3.0 * e - w) / w, false, self.cube[0]);
    }
}

impl Map for HorseshoeG {
    fn dimension(&self) -> usize {
        2
    }

    fn value_at(&self, point: ArrayView1<f64>) -> Point {
        assert_eq!(point.len(), 2, "horseshoe needs a planar point");
        let (x, y) = self.squeeze.apply(point[0], point[1]);
        let (x, y) = self.fold.apply(x, y);
        array![x + self.offset, y]
    }
}
