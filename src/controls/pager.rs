//! Load-more-on-scroll pagination.
//!
//! Pages are requested one at a time. While a request is outstanding no other
//! is started, and once the server returns a short page there is nothing
//! more to fetch. Replies are matched against the request in flight, so a
//! reply to a request made before [`Pager::reset`] is ignored.

/// Ticket for one page request; hand it back with the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct Pager<T> {
    items: Vec<T>,
    page_size: usize,
    next_page: u32,
    in_flight: Option<PageRequest>,
    enable_next: bool,
    /// Bumped by `reset`; stale tickets carry an older value.
    generation: u64,
}

impl<T> Pager<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page_size: page_size.max(1),
            next_page: 1,
            in_flight: None,
            enable_next: true,
            generation: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The request whose reply is awaited, if any.
    pub fn in_flight(&self) -> Option<PageRequest> {
        self.in_flight
    }

    pub fn enable_next(&self) -> bool {
        self.enable_next
    }

    /// Forget everything, e.g. when a filter changes.
    pub fn reset(&mut self) {
        self.items.clear();
        self.next_page = 1;
        self.in_flight = None;
        self.enable_next = true;
        self.generation += 1;
    }

    /// Claim the next page. Returns the request to make, or `None` when a
    /// fetch is in flight or the end was reached.
    pub fn begin_fetch(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.enable_next {
            return None;
        }
        let request = PageRequest {
            page: self.next_page,
            generation: self.generation,
        };
        self.in_flight = Some(request);
        Some(request)
    }

    /// Apply the reply to `request`. Returns false (and changes nothing)
    /// when it is not the request in flight.
    pub fn finish(&mut self, request: PageRequest, page: Vec<T>) -> bool {
        if self.in_flight != Some(request) {
            return false;
        }
        self.enable_next = page.len() >= self.page_size;
        self.items.extend(page);
        self.next_page += 1;
        self.in_flight = None;
        true
    }

    /// A failed fetch leaves the loaded rows and the cursor untouched.
    /// Failures of superseded requests are ignored.
    pub fn fail(&mut self, request: PageRequest) -> bool {
        if self.in_flight != Some(request) {
            return false;
        }
        self.in_flight = None;
        true
    }

    /// Whether scrolling to `visible_end` (exclusive row index) should load more.
    pub fn should_fetch_on_scroll(&self, visible_end: usize) -> bool {
        self.in_flight.is_none() && self.enable_next && visible_end >= self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_page_stops_pagination() {
        let mut pager = Pager::new(20);
        let first = pager.begin_fetch().unwrap();
        assert_eq!(first.page, 1);
        assert!(pager.finish(first, (0..20).collect()));
        assert!(pager.enable_next());
        assert!(pager.should_fetch_on_scroll(20));

        let second = pager.begin_fetch().unwrap();
        assert_eq!(second.page, 2);
        assert!(pager.finish(second, (20..27).collect()));
        assert!(!pager.enable_next());
        assert_eq!(pager.items().len(), 27);
        assert!(!pager.should_fetch_on_scroll(27));
        assert_eq!(pager.begin_fetch(), None);
    }

    #[test]
    fn test_no_overlapping_fetches() {
        let mut pager: Pager<u8> = Pager::new(10);
        let request = pager.begin_fetch().unwrap();
        assert_eq!(pager.begin_fetch(), None);
        assert!(!pager.should_fetch_on_scroll(0));

        assert!(pager.fail(request));
        assert_eq!(pager.begin_fetch().map(|r| r.page), Some(1));
    }

    #[test]
    fn test_reset_restarts() {
        let mut pager = Pager::new(2);
        let request = pager.begin_fetch().unwrap();
        pager.finish(request, vec!['a']);
        assert!(!pager.enable_next());

        pager.reset();
        assert!(pager.items().is_empty());
        assert_eq!(pager.begin_fetch().map(|r| r.page), Some(1));
    }

    #[test]
    fn test_replies_from_before_reset_are_ignored() {
        let mut pager = Pager::new(2);
        let first = pager.begin_fetch().unwrap();
        pager.finish(first, vec!["a", "b"]);
        let old_second = pager.begin_fetch().unwrap();

        pager.reset();
        let fresh_first = pager.begin_fetch().unwrap();
        assert_eq!(fresh_first.page, 1);
        assert_ne!(old_second, fresh_first);

        // neither the late page nor its failure touch the new request
        assert!(!pager.finish(old_second, vec!["old"]));
        assert!(!pager.fail(old_second));
        assert!(pager.is_loading());
        assert!(pager.items().is_empty());

        assert!(pager.finish(fresh_first, vec!["x", "y"]));
        assert_eq!(pager.items(), &["x", "y"]);
        assert!(pager.enable_next());

        // a duplicate reply after completion is dropped too
        assert!(!pager.finish(fresh_first, vec!["dup"]));
        assert_eq!(pager.items().len(), 2);
    }
}
