/// a scrolling window over the process table.
///
/// the length of the table and the height of the window can both change between cycles, so the
/// offset is clamped whenever the window is read, not only when it is scrolled.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScrollWindow {
    /// the index of the first visible row.
    offset: usize,
    /// the number of rows most recently shown.
    total_rows: usize,
    /// the height of the window most recently shown.
    visible_rows: usize,
}

// === impl ScrollWindow ===

impl ScrollWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// the largest valid offset.
    fn max_offset(&self) -> usize {
        let Self {
            total_rows,
            visible_rows,
            ..
        } = *self;

        total_rows.saturating_sub(visible_rows)
    }

    /// records the current table length and window height, clamping the offset to fit them.
    pub fn resize(&mut self, total_rows: usize, visible_rows: usize) {
        self.total_rows = total_rows;
        self.visible_rows = visible_rows;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn scroll_down(&mut self) {
        self.offset = (self.offset + 1).min(self.max_offset());
    }

    pub fn scroll_up(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    /// returns the rows that are visible in a window `visible_rows` tall.
    pub fn visible_slice<'a, T>(&mut self, rows: &'a [T], visible_rows: usize) -> &'a [T] {
        self.resize(rows.len(), visible_rows);
        let start = self.offset;
        let end = (start + visible_rows).min(rows.len());
        &rows[start..end]
    }
}

#[cfg(test)]
mod tests {
    use {super::*, proptest::prelude::*};

    #[test]
    fn short_list_does_not_scroll() {
        let rows = [1, 2, 3];
        let mut window = ScrollWindow::new();
        window.visible_slice(&rows, 10);
        window.scroll_down();
        window.scroll_down();
        assert_eq!(window.offset(), 0);
        assert_eq!(window.visible_slice(&rows, 10), &[1, 2, 3]);
    }

    #[test]
    fn scrolls_to_the_end_and_stops() {
        let rows = (0..10).collect::<Vec<_>>();
        let mut window = ScrollWindow::new();
        window.visible_slice(&rows, 4);
        for _ in 0..20 {
            window.scroll_down();
        }
        assert_eq!(window.offset(), 6);
        assert_eq!(window.visible_slice(&rows, 4), &[6, 7, 8, 9]);
    }

    #[test]
    fn scroll_up_stops_at_zero() {
        let rows = (0..10).collect::<Vec<_>>();
        let mut window = ScrollWindow::new();
        window.visible_slice(&rows, 4);
        window.scroll_down();
        window.scroll_up();
        window.scroll_up();
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn shrinking_list_clamps_on_read() {
        let rows = (0..100).collect::<Vec<_>>();
        let mut window = ScrollWindow::new();
        window.visible_slice(&rows, 10);
        for _ in 0..80 {
            window.scroll_down();
        }
        assert_eq!(window.offset(), 80);

        let fewer = &rows[..30];
        assert_eq!(window.visible_slice(fewer, 10), &rows[20..30]);
        assert_eq!(window.offset(), 20);
    }

    #[test]
    fn taller_window_clamps_on_read() {
        let rows = (0..20).collect::<Vec<_>>();
        let mut window = ScrollWindow::new();
        window.visible_slice(&rows, 5);
        for _ in 0..15 {
            window.scroll_down();
        }
        assert_eq!(window.visible_slice(&rows, 18), &rows[2..20]);
    }

    #[test]
    fn zero_height() {
        let rows = [1, 2, 3];
        let mut window = ScrollWindow::new();
        assert!(window.visible_slice(&rows, 0).is_empty());
        window.scroll_down();
        assert_eq!(window.offset(), 1);
        assert!(window.visible_slice(&rows, 0).is_empty());
    }

    #[test]
    fn empty_list() {
        let rows: [u8; 0] = [];
        let mut window = ScrollWindow::new();
        window.scroll_down();
        assert!(window.visible_slice(&rows, 5).is_empty());
        assert_eq!(window.offset(), 0);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Up,
        Down,
        Show { total: usize, visible: usize },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Up),
            Just(Op::Down),
            (0usize..64, 0usize..32).prop_map(|(total, visible)| Op::Show { total, visible }),
        ]
    }

    proptest! {
        #[test]
        fn offset_stays_in_bounds(ops in prop::collection::vec(op(), 0..200)) {
            let rows = (0..64).collect::<Vec<usize>>();
            let mut window = ScrollWindow::new();
            let (mut total, mut visible) = (0, 0);

            for op in ops {
                match op {
                    Op::Up => window.scroll_up(),
                    Op::Down => window.scroll_down(),
                    Op::Show { total: t, visible: v } => {
                        (total, visible) = (t, v);
                        let slice = window.visible_slice(&rows[..total], visible);
                        prop_assert!(slice.len() <= visible);
                        prop_assert_eq!(slice.len(), visible.min(total));
                    }
                }
                prop_assert!(window.offset() <= total.saturating_sub(visible));
            }
        }
    }
}
