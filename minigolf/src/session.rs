//! Per-session stroke counters and the personal best.

/// Outcome of finishing a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to this level.
    NextLevel(usize),
    /// The last level was finished; play wraps around to level 0.
    CourseComplete {
        total: u32,
        /// True when `total` became the new best.
        new_best: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_level: usize,
    /// Strokes on the current level.
    pub strokes: u32,
    /// Strokes over the whole course so far.
    pub total_strokes: u32,
    /// Lowest completed-course total on record.
    pub best: Option<u32>,
}

impl SessionState {
    pub fn new(best: Option<u32>) -> Self {
        Self {
            best,
            ..Self::default()
        }
    }

    pub fn start_level(&mut self, level: usize) {
        self.current_level = level;
        self.strokes = 0;
    }

    pub fn record_stroke(&mut self) {
        self.strokes += 1;
        self.total_strokes += 1;
    }

    /// Close the course: keep `total_strokes` as best if it beats the record,
    /// then zero the counters and return to level 0.
    ///
    /// Returns whether the best score changed.
    pub fn complete_course(&mut self) -> bool {
        let total = self.total_strokes;
        let new_best = self.best.is_none_or(|best| total < best);
        if new_best {
            self.best = Some(total);
        }
        self.total_strokes = 0;
        self.start_level(0);
        new_best
    }

    /// Finish the current level of a course with `level_count` levels.
    pub fn finish_level(&mut self, level_count: usize) -> Advance {
        let next = self.current_level + 1;
        if next < level_count {
            self.start_level(next);
            Advance::NextLevel(next)
        } else {
            let total = self.total_strokes;
            let new_best = self.complete_course();
            Advance::CourseComplete { total, new_best }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_total(best: Option<u32>, total: u32) -> SessionState {
        let mut s = SessionState::new(best);
        for _ in 0..total {
            s.record_stroke();
        }
        s
    }

    #[test]
    fn better_run_replaces_best() {
        let mut s = with_total(Some(10), 8);
        assert!(s.complete_course());
        assert_eq!(s.best, Some(8));
    }

    #[test]
    fn worse_or_equal_run_keeps_best() {
        let mut s = with_total(Some(10), 12);
        assert!(!s.complete_course());
        assert_eq!(s.best, Some(10));

        let mut s = with_total(Some(10), 10);
        assert!(!s.complete_course());
        assert_eq!(s.best, Some(10));
    }

    #[test]
    fn first_completion_sets_best() {
        let mut s = with_total(None, 23);
        assert!(s.complete_course());
        assert_eq!(s.best, Some(23));
    }

    #[test]
    fn counters_reset_when_levels_start_and_course_ends() {
        let mut s = with_total(None, 3);
        assert_eq!(s.finish_level(5), Advance::NextLevel(1));
        assert_eq!((s.strokes, s.total_strokes), (0, 3));

        s.record_stroke();
        s.current_level = 4;
        assert_eq!(
            s.finish_level(5),
            Advance::CourseComplete {
                total: 4,
                new_best: true
            }
        );
        assert_eq!(s.current_level, 0);
        assert_eq!((s.strokes, s.total_strokes), (0, 0));
        assert_eq!(s.best, Some(4));
    }
}
