// Candidate eligibility filters
use crate::Candidate;
use chrono::{DateTime, Utc};

pub trait CandidateFilter {
    fn matches(&self, candidate: &Candidate) -> bool;
}

/// Keeps candidates whose validity window contains the instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveAt(pub DateTime<Utc>);

impl CandidateFilter for ActiveAt {
    #[inline]
    fn matches(&self, candidate: &Candidate) -> bool {
        candidate.is_eligible_at(self.0)
    }
}

impl<F> CandidateFilter for F
where
    F: Fn(&Candidate) -> bool,
{
    fn matches(&self, candidate: &Candidate) -> bool {
        self(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_active_at() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let live = Candidate::new(1u64).with_window(now - Duration::days(1), None);
        let expired = Candidate::new(2u64)
            .with_window(now - Duration::days(2), Some(now - Duration::seconds(1)));
        let upcoming = Candidate::new(3u64).with_window(now + Duration::seconds(1), None);

        let filter = ActiveAt(now);
        assert!(filter.matches(&live));
        assert!(!filter.matches(&expired));
        assert!(!filter.matches(&upcoming));
    }

    #[test]
    fn test_closure_filter() {
        let positive = |c: &Candidate| c.priority > 0;
        assert!(positive.matches(&Candidate::new(1u64).with_priority(5)));
        assert!(!positive.matches(&Candidate::new(1u64)));
    }
}
