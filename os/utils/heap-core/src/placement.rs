//! Free-run searches over a [`PageStateTable`].
//!
//! Both searches return the index of the first page of the chosen run.

use crate::page_state::PageStateTable;

/// Which search a heap uses to place a request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Placement {
    FirstFit,
    BestFit,
}

impl Placement {
    #[must_use]
    pub fn find(self, pages: &PageStateTable, needed: usize) -> Option<usize> {
        match self {
            Self::FirstFit => first_fit(pages, needed),
            Self::BestFit => best_fit(pages, needed),
        }
    }
}

/// Lowest-addressed window of `needed` consecutive free pages.
///
/// The window may be the head of a larger free run; size is not considered
/// beyond reaching `needed`.
#[must_use]
pub fn first_fit(pages: &PageStateTable, needed: usize) -> Option<usize> {
    if needed == 0 {
        return None;
    }
    let mut run = 0;
    for index in 0..pages.len() {
        if pages.is_allocated(index) {
            run = 0;
            continue;
        }
        run += 1;
        if run == needed {
            return Some(index + 1 - needed);
        }
    }
    None
}

/// Smallest free run of at least `needed` pages.
///
/// Only a strictly smaller run replaces the current candidate, so among runs
/// of equal length the lowest-addressed one wins.
#[must_use]
pub fn best_fit(pages: &PageStateTable, needed: usize) -> Option<usize> {
    if needed == 0 {
        return None;
    }
    let mut best: Option<(usize, usize)> = None;
    for run in pages.free_runs() {
        if run.len < needed {
            continue;
        }
        if best.is_none_or(|(_, len)| run.len < len) {
            best = Some((run.start, run.len));
        }
    }
    best.map(|(start, _)| start)
}
