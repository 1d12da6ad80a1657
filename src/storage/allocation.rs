//! Page allocation bitmap shared by the page store implementations.

/// Tracks which page numbers of one file are allocated.
///
/// Allocation is first-fit: a request for `count` contiguous pages reuses
/// the lowest run of freed pages that is long enough, and otherwise extends
/// the file at its end.
#[derive(Debug, Clone, Default)]
pub(crate) struct AllocationMap {
    allocated: Vec<bool>,
}

impl AllocationMap {
    /// A map of `len` pages, all allocated.
    pub(crate) fn full(len: usize) -> Self {
        Self {
            allocated: vec![true; len],
        }
    }

    /// Number of page slots the file spans (allocated or not).
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.allocated.len()
    }

    #[inline]
    pub(crate) fn is_allocated(&self, page: usize) -> bool {
        self.allocated.get(page).copied().unwrap_or(false)
    }

    /// Reserve `count` contiguous pages and return the first page number.
    ///
    /// The file grows when no freed run is long enough; callers must zero
    /// both reused and newly created slots.
    pub(crate) fn allocate(&mut self, count: usize) -> usize {
        debug_assert!(count > 0);

        let mut run_start = 0;
        let mut run_len = 0;
        for (i, &used) in self.allocated.iter().enumerate() {
            if used {
                run_len = 0;
                run_start = i + 1;
                continue;
            }
            run_len += 1;
            if run_len == count {
                self.mark(run_start, count);
                return run_start;
            }
        }

        // A trailing free run can be extended instead of skipped.
        let start = if run_len > 0 { run_start } else { self.allocated.len() };
        if start + count > self.allocated.len() {
            self.allocated.resize(start + count, false);
        }
        self.mark(start, count);
        start
    }

    /// Release one page. Returns false if it was not allocated.
    pub(crate) fn deallocate(&mut self, page: usize) -> bool {
        match self.allocated.get_mut(page) {
            Some(slot) if *slot => {
                *slot = false;
                true
            }
            _ => false,
        }
    }

    fn mark(&mut self, start: usize, count: usize) {
        self.allocated[start..start + count].fill(true);
    }
}
