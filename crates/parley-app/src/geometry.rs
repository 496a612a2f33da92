//! Panel geometry.
//!
//! Screen layout is a pure function of the terminal size so it can be
//! computed on resize and checked without a terminal:
//!
//! ```text
//! ┌─ width/4 ─┬──────────── remainder ────────────┐
//! │ tabs  1   │ header                         1  │
//! │           ├───────────────────────────────────┤
//! │ list  14  │ transcript                     10 │
//! │           ├───────────────────────────────────┤
//! │           │ input                          4  │
//! └───────────┴───────────────────────────────────┘
//! ```
//!
//! Row weights are fifteenths of the height.

const LEFT_COLUMN_DIVISOR: u16 = 4;
const ROW_WEIGHT_TOTAL: u32 = 15;
const TAB_WEIGHT: u32 = 1;
const HEADER_WEIGHT: u32 = 1;
const TRANSCRIPT_WEIGHT: u32 = 10;

/// Bordered widgets lose one row at the top and one at the bottom.
const BORDER_ROWS: u16 = 2;

/// Rectangle in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Area {
    /// Left column.
    pub x: u16,
    /// Top row.
    pub y: u16,
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Area {
    /// Create an area.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Rows left for content inside a border.
    pub fn inner_rows(self) -> u16 {
        self.height.saturating_sub(BORDER_ROWS)
    }
}

/// Areas of every panel for a given terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelGeometry {
    /// Tab bar above the list.
    pub tabs: Area,
    /// Active list panel.
    pub list: Area,
    /// Key help line.
    pub header: Area,
    /// Message transcript.
    pub transcript: Area,
    /// Input box.
    pub input: Area,
}

impl PanelGeometry {
    /// Lay out panels for a terminal of `cols` x `rows`.
    pub fn compute(cols: u16, rows: u16) -> Self {
        let left = cols / LEFT_COLUMN_DIVISOR;
        let right = cols - left;

        let tabs_h = weighted(rows, TAB_WEIGHT);
        let list_h = rows - tabs_h;

        let header_h = weighted(rows, HEADER_WEIGHT);
        let transcript_h = weighted(rows, TRANSCRIPT_WEIGHT);
        let input_h = rows - header_h - transcript_h;

        Self {
            tabs: Area::new(0, 0, left, tabs_h),
            list: Area::new(0, tabs_h, left, list_h),
            header: Area::new(left, 0, right, header_h),
            transcript: Area::new(left, header_h, right, transcript_h),
            input: Area::new(left, header_h + transcript_h, right, input_h),
        }
    }
}

fn weighted(total: u16, weight: u32) -> u16 {
    (u32::from(total) * weight / ROW_WEIGHT_TOTAL) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_column_is_quarter_width() {
        let g = PanelGeometry::compute(120, 45);

        assert_eq!(g.list.width, 30);
        assert_eq!(g.transcript.x, 30);
        assert_eq!(g.transcript.width, 90);
    }

    #[test]
    fn rows_follow_weights() {
        let g = PanelGeometry::compute(120, 45);

        assert_eq!(g.tabs.height, 3);
        assert_eq!(g.list.height, 42);
        assert_eq!(g.header.height, 3);
        assert_eq!(g.transcript.height, 30);
        assert_eq!(g.input.height, 12);
    }

    #[test]
    fn columns_fill_height() {
        for rows in [0u16, 1, 7, 24, 61] {
            let g = PanelGeometry::compute(80, rows);

            assert_eq!(g.tabs.height + g.list.height, rows);
            assert_eq!(g.header.height + g.transcript.height + g.input.height, rows);
        }
    }

    #[test]
    fn tiny_terminal_does_not_underflow() {
        let g = PanelGeometry::compute(1, 1);

        assert_eq!(g.list.width, 0);
        assert_eq!(g.transcript.width, 1);
        assert_eq!(g.list.inner_rows(), 0);
    }
}
