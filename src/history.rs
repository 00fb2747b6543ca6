use crate::grid::Grid;
use crate::statics;

/// Bounded undo/redo stacks of full grid snapshots.
///
/// Snapshots are independent deep copies; pushing one never aliases
/// the live grid. The undo stack holds at most
/// [`statics::HISTORY_CAP`] entries, oldest evicted first.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<Grid>,
    redo: Vec<Grid>,
}

impl History {
    /// Records the pre-mutation state of the grid. Any recorded
    /// mutation invalidates the redo stack.
    pub fn record(&mut self, before: &Grid) {
        self.undo.push(before.clone());
        if self.undo.len() > statics::HISTORY_CAP {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    /// Pops the most recent snapshot, saving `current` for redo.
    /// Returns `None` (a reported no-op, not an error) when empty.
    pub fn undo(&mut self, current: &Grid) -> Option<Grid> {
        let snapshot = self.undo.pop()?;
        self.redo.push(current.clone());
        Some(snapshot)
    }

    pub fn redo(&mut self, current: &Grid) -> Option<Grid> {
        let snapshot = self.redo.pop()?;
        self.undo.push(current.clone());
        Some(snapshot)
    }

    /// Clears both stacks. Called on new-level and on load; history
    /// never survives a grid-identity change.
    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use crate::grid::Grid;
    use crate::statics;

    fn grid_with_mark(mark: &str) -> Grid {
        let mut g = Grid::new(2, 2, "r").unwrap();
        g.cell_mut(0, 0).unwrap().base = mark.to_string();
        g
    }

    #[test]
    fn undo_redo_round_trip() {
        let before = grid_with_mark("g");
        let after = grid_with_mark("b");

        let mut history = History::default();
        history.record(&before);

        let mut live = after.clone();
        live = history.undo(&live).unwrap();
        assert_eq!(live, before);

        live = history.redo(&live).unwrap();
        assert_eq!(live, after);
    }

    #[test]
    fn undo_on_empty_history_is_a_noop() {
        let mut history = History::default();
        let live = grid_with_mark("g");
        assert!(history.undo(&live).is_none());
        assert!(history.redo(&live).is_none());
    }

    #[test]
    fn record_clears_redo() {
        let mut history = History::default();
        let a = grid_with_mark("a1");
        let b = grid_with_mark("b1");

        history.record(&a);
        let _ = history.undo(&b).unwrap();
        assert!(history.can_redo());

        history.record(&a);
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_stack_is_capped_with_oldest_evicted() {
        let mut history = History::default();
        for i in 0..15 {
            history.record(&grid_with_mark(&format!("m{i}")));
        }
        assert_eq!(history.undo_depth(), statics::HISTORY_CAP);

        // The most recent snapshots survive; the first five are gone.
        let live = grid_with_mark("live");
        let top = history.undo(&live).unwrap();
        assert_eq!(top.cell(0, 0).unwrap().base, "m14");

        let mut oldest = None;
        let mut cursor = top;
        while let Some(prev) = history.undo(&cursor) {
            oldest = Some(prev.clone());
            cursor = prev;
        }
        assert_eq!(oldest.unwrap().cell(0, 0).unwrap().base, "m5");
    }
}
