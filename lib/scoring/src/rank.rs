//! Ranker for featured candidates
//!
//! Filters candidates to their validity window, scores them with the
//! selected strategy, orders by score (stable, so equal scores keep the
//! order the caller supplied) and truncates to `top_n`.

use crate::config::ScoringConfig;
use crate::scorer::{
    FeaturedScorer, PriorityScorer, ScoreBreakdown, ScoredCandidate, Scorer, ScoringStrategy,
    SimilarityScorer,
};
use chrono::{DateTime, Utc};
use featrank_core::{
    ActiveAt, Candidate, CandidateFilter, Embedding, ItemId, Membership, RankingInput, Result,
    SignalBundle, Subject, VectorStore,
};
use ordered_float::OrderedFloat;

/// Length of the similar-item and recommendation lists.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;

/// Outcome of a ranking call with the counts needed to explain it.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub strategy: ScoringStrategy,
    pub results: Vec<ScoredCandidate>,
    /// Candidates handed in.
    pub considered: usize,
    /// Candidates that passed the eligibility filter.
    pub eligible: usize,
}

/// Everything a strategy-dispatched ranking call reads.
#[derive(Debug, Clone, Copy)]
pub struct RankingQuery<'a> {
    pub subject: &'a Subject,
    pub candidates: &'a [Candidate],
    pub signals: &'a SignalBundle,
    pub query_time: DateTime<Utc>,
    pub top_n: usize,
}

impl<'a> RankingQuery<'a> {
    /// Query over collected input, ranked as of collection time.
    pub fn from_input(input: &'a RankingInput, top_n: usize) -> Self {
        Self {
            subject: &input.subject,
            candidates: &input.candidates,
            signals: &input.signals,
            query_time: input.collected_at,
            top_n,
        }
    }
}

/// Score, order and truncate `candidates`.
///
/// Candidates rejected by `filter` are never scored. The first scorer error
/// aborts the whole call.
pub fn rank_with<S, F>(
    scorer: &S,
    candidates: &[Candidate],
    filter: Option<&F>,
    top_n: usize,
) -> Result<(Vec<ScoredCandidate>, usize)>
where
    S: Scorer + ?Sized,
    F: CandidateFilter + ?Sized,
{
    let scored = candidates
        .iter()
        .filter(|c| filter.map_or(true, |f| f.matches(c)))
        .map(|c| -> Result<_> { Ok((c, scorer.score(c)?)) })
        .collect::<Result<Vec<_>>>()?;

    Ok(order_and_truncate(scored, top_n))
}

/// Stable descending order by total score, cut to `top_n`. Also returns how
/// many candidates were scored.
fn order_and_truncate(
    scored: Vec<(&Candidate, ScoreBreakdown)>,
    top_n: usize,
) -> (Vec<ScoredCandidate>, usize) {
    let eligible = scored.len();
    let mut keyed: Vec<_> = scored
        .into_iter()
        .map(|(candidate, breakdown)| (candidate, OrderedFloat(breakdown.total()), breakdown))
        .collect();

    // sort_by is stable: ties keep input order
    keyed.sort_by(|a, b| b.1.cmp(&a.1));
    keyed.truncate(top_n);

    let results = keyed
        .into_iter()
        .map(|(candidate, _, breakdown)| ScoredCandidate::new(candidate.clone(), breakdown))
        .collect();

    (results, eligible)
}

/// Ranks candidates with a fixed [`ScoringConfig`].
///
/// A `Ranker` is immutable and can be shared across threads; each call
/// receives its own inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranker {
    config: ScoringConfig,
}

impl Ranker {
    /// Build a ranker, rejecting invalid configuration.
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Rank with the four-signal featured blend.
    ///
    /// Uses the bundle's subject vector, falling back to the subject's own
    /// embedding.
    pub fn rank_featured(
        &self,
        subject: &Subject,
        candidates: &[Candidate],
        signals: &SignalBundle,
        query_time: DateTime<Utc>,
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let scorer = self.featured_scorer(subject, signals)?;
        let (results, _) = rank_with(&scorer, candidates, Some(&ActiveAt(query_time)), top_n)?;
        Ok(results)
    }

    /// Like [`rank_featured`](Self::rank_featured), but candidates without
    /// an embedding of their own are looked up in `store`.
    pub fn rank_featured_with_store(
        &self,
        subject: &Subject,
        candidates: &[Candidate],
        signals: &SignalBundle,
        store: &dyn VectorStore,
        query_time: DateTime<Utc>,
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let scorer = self.featured_scorer(subject, signals)?.with_store(store);
        let (results, _) = rank_with(&scorer, candidates, Some(&ActiveAt(query_time)), top_n)?;
        Ok(results)
    }

    /// Rank with the priority-boost blend, taking candidates as given.
    pub fn rank_by_priority<M>(
        &self,
        candidates: &[Candidate],
        membership: &M,
        top_n: usize,
    ) -> Vec<ScoredCandidate>
    where
        M: Membership + ?Sized,
    {
        self.rank_priority(candidates, membership, None, top_n).0
    }

    /// Priority-boost ranking restricted to candidates active at `query_time`.
    pub fn rank_by_priority_at<M>(
        &self,
        candidates: &[Candidate],
        membership: &M,
        query_time: DateTime<Utc>,
        top_n: usize,
    ) -> Vec<ScoredCandidate>
    where
        M: Membership + ?Sized,
    {
        self.rank_priority(candidates, membership, Some(&ActiveAt(query_time)), top_n)
            .0
    }

    /// Items closest to `item` by cosine of their embeddings.
    ///
    /// `item` itself and candidates without an embedding are left out; no
    /// validity window applies. A zero-length vector scores 0.
    pub fn similar_to(
        &self,
        item: &ItemId,
        anchor: &Embedding,
        candidates: &[Candidate],
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let scorer = SimilarityScorer::new(anchor, self.config.embedding_dim)?;
        let others = |c: &Candidate| c.id != *item && c.embedding.is_some();
        let (results, _) = rank_with(&scorer, candidates, Some(&others), top_n)?;
        Ok(results)
    }

    /// Items closest to a subject vector by cosine, over every candidate
    /// carrying an embedding.
    pub fn recommend_for(
        &self,
        subject_vector: &Embedding,
        candidates: &[Candidate],
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let scorer = SimilarityScorer::new(subject_vector, self.config.embedding_dim)?;
        let with_vector = |c: &Candidate| c.embedding.is_some();
        let (results, _) = rank_with(&scorer, candidates, Some(&with_vector), top_n)?;
        Ok(results)
    }

    /// Rank with a named strategy. Both strategies filter by validity
    /// window at `query.query_time`.
    pub fn rank(&self, strategy: ScoringStrategy, query: &RankingQuery<'_>) -> Result<Ranking> {
        let filter = ActiveAt(query.query_time);
        let (results, eligible) = match strategy {
            ScoringStrategy::Featured => {
                let scorer = self.featured_scorer(query.subject, query.signals)?;
                rank_with(&scorer, query.candidates, Some(&filter), query.top_n)?
            }
            ScoringStrategy::PriorityBoost => {
                self.rank_priority(query.candidates, query.signals, Some(&filter), query.top_n)
            }
        };

        Ok(Ranking {
            strategy,
            results,
            considered: query.candidates.len(),
            eligible,
        })
    }

    fn featured_scorer<'a>(
        &'a self,
        subject: &'a Subject,
        signals: &'a SignalBundle,
    ) -> Result<FeaturedScorer<'a>> {
        let subject_vector = signals
            .subject_vector
            .as_ref()
            .or(subject.embedding.as_ref());
        FeaturedScorer::new(
            &self.config.featured,
            self.config.embedding_dim,
            signals,
            subject_vector,
        )
    }

    fn rank_priority<M>(
        &self,
        candidates: &[Candidate],
        membership: &M,
        filter: Option<&ActiveAt>,
        top_n: usize,
    ) -> (Vec<ScoredCandidate>, usize)
    where
        M: Membership + ?Sized,
    {
        let scorer = PriorityScorer::new(&self.config.priority, membership);
        let scored = candidates
            .iter()
            .filter(|c| filter.map_or(true, |f| f.matches(c)))
            .map(|c| (c, scorer.breakdown(c)))
            .collect();
        order_and_truncate(scored, top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeaturedWeights;
    use chrono::{Duration, TimeZone};
    use featrank_core::{Error, EventKind, FastSet};

    const EPS: f64 = 1e-9;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 29, 8, 0, 0).unwrap()
    }

    fn live(id: u64) -> Candidate {
        Candidate::new(id).with_window(now() - Duration::days(1), None)
    }

    fn ids(results: &[ScoredCandidate]) -> Vec<ItemId> {
        results.iter().map(|r| r.candidate.id.clone()).collect()
    }

    fn emb(data: &[f32]) -> Embedding {
        Embedding::new(data.to_vec()).unwrap()
    }

    fn small_ranker() -> Ranker {
        Ranker::new(ScoringConfig::default().with_embedding_dim(3)).unwrap()
    }

    #[test]
    fn test_rank_featured_orders_by_score() {
        let ranker = Ranker::default();
        let signals = SignalBundle::new()
            .with_membership([2u64])
            .with_rating(3u64, 5.0)
            .with_event(1u64, EventKind::View);
        let candidates = vec![live(1), live(2), live(3)];

        let results = ranker
            .rank_featured(&Subject::new(7u64), &candidates, &signals, now(), 10)
            .unwrap();

        assert_eq!(ids(&results), vec![ItemId::from(2u64), ItemId::from(3u64), ItemId::from(1u64)]);
        assert!((results[0].score - 0.4).abs() < EPS);
        assert!((results[1].score - 0.3).abs() < EPS);
        assert!((results[2].score - 0.01).abs() < EPS);
    }

    #[test]
    fn test_expired_candidate_excluded() {
        let ranker = Ranker::default();
        let signals = SignalBundle::new().with_membership([1u64]);
        let expired = Candidate::new(1u64)
            .with_window(now() - Duration::days(7), Some(now() - Duration::seconds(1)));
        let candidates = vec![expired, live(2)];

        let results = ranker
            .rank_featured(&Subject::new(7u64), &candidates, &signals, now(), 10)
            .unwrap();
        assert_eq!(ids(&results), vec![ItemId::from(2u64)]);
    }

    #[test]
    fn test_end_equal_to_query_time_is_eligible() {
        let ranker = Ranker::default();
        let candidates = vec![Candidate::new(1u64).with_window(now() - Duration::days(1), Some(now()))];
        let results = ranker
            .rank_featured(&Subject::anonymous(), &candidates, &SignalBundle::new(), now(), 10)
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let weights = FeaturedWeights {
            wishlist: 0.5,
            ..FeaturedWeights::default()
        };
        let ranker = Ranker::new(ScoringConfig::default().with_featured_weights(weights)).unwrap();
        let signals = SignalBundle::new().with_membership(["a", "b"]);
        let candidates = vec![
            Candidate::new("b").with_window(now(), None),
            Candidate::new("a").with_window(now(), None),
        ];

        let results = ranker
            .rank_featured(&Subject::new(1u64), &candidates, &signals, now(), 10)
            .unwrap();
        assert_eq!(results[0].score, 0.5);
        assert_eq!(results[1].score, 0.5);
        assert_eq!(ids(&results), vec![ItemId::from("b"), ItemId::from("a")]);
    }

    #[test]
    fn test_top_n_truncates() {
        let ranker = Ranker::default();
        let candidates: Vec<Candidate> = (0..30).map(live).collect();
        let results = ranker
            .rank_featured(&Subject::anonymous(), &candidates, &SignalBundle::new(), now(), 20)
            .unwrap();
        assert_eq!(results.len(), 20);

        let results = ranker
            .rank_featured(&Subject::anonymous(), &candidates, &SignalBundle::new(), now(), 0)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_candidates() {
        let ranker = Ranker::default();
        let results = ranker
            .rank_featured(&Subject::anonymous(), &[], &SignalBundle::new(), now(), 10)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_dimension_mismatch_aborts_whole_call() {
        let ranker = small_ranker();
        let signals = SignalBundle::new().with_subject_vector(emb(&[1.0, 0.0, 0.0]));
        let candidates = vec![
            live(1).with_embedding(emb(&[1.0, 0.0, 0.0])),
            live(2).with_embedding(emb(&[1.0, 0.0])),
        ];

        let err = ranker
            .rank_featured(&Subject::new(1u64), &candidates, &signals, now(), 10)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_subject_embedding_fallback() {
        let ranker = small_ranker();
        let subject = Subject::new(1u64).with_embedding(emb(&[0.0, 0.0, 1.0]));
        let candidates = vec![live(1).with_embedding(emb(&[0.0, 0.0, 3.0]))];

        let results = ranker
            .rank_featured(&subject, &candidates, &SignalBundle::new(), now(), 10)
            .unwrap();
        assert!((results[0].score - 0.2).abs() < EPS);

        // the bundle's vector wins over the subject's
        let signals = SignalBundle::new().with_subject_vector(emb(&[1.0, 0.0, 0.0]));
        let results = ranker
            .rank_featured(&subject, &candidates, &signals, now(), 10)
            .unwrap();
        assert!(results[0].score.abs() < EPS);
    }

    #[test]
    fn test_rank_featured_with_store() {
        let ranker = small_ranker();
        let mut store: std::collections::HashMap<ItemId, Embedding> = Default::default();
        store.insert(ItemId::from(2u64), emb(&[1.0, 0.0, 0.0]));
        let signals = SignalBundle::new().with_subject_vector(emb(&[1.0, 0.0, 0.0]));
        let candidates = vec![live(1), live(2)];

        let results = ranker
            .rank_featured_with_store(&Subject::new(9u64), &candidates, &signals, &store, now(), 10)
            .unwrap();
        assert_eq!(ids(&results), vec![ItemId::from(2u64), ItemId::from(1u64)]);
        assert!(results[0].breakdown.embedding.is_some());
        assert!(results[1].breakdown.embedding.is_none());
    }

    #[test]
    fn test_rank_by_priority() {
        let ranker = Ranker::default();
        let mut membership: FastSet<ItemId> = FastSet::default();
        membership.insert(ItemId::from(1u64));
        let candidates = vec![
            Candidate::new(1u64).with_priority(50),
            Candidate::new(2u64).with_priority(50),
            Candidate::new(3u64).with_priority(120),
        ];

        let results = ranker.rank_by_priority(&candidates, &membership, 10);
        assert_eq!(ids(&results), vec![ItemId::from(1u64), ItemId::from(3u64), ItemId::from(2u64)]);
        assert!((results[0].score - 1.5).abs() < EPS);
        assert!((results[1].score - 1.2).abs() < EPS);
        assert!((results[2].score - 0.5).abs() < EPS);
    }

    #[test]
    fn test_rank_by_priority_at_filters_window() {
        let ranker = Ranker::default();
        let membership: FastSet<ItemId> = FastSet::default();
        let candidates = vec![
            Candidate::new(1u64).with_priority(90).with_window(now() + Duration::hours(1), None),
            live(2).with_priority(10),
        ];

        assert_eq!(ranker.rank_by_priority(&candidates, &membership, 10).len(), 2);
        let results = ranker.rank_by_priority_at(&candidates, &membership, now(), 10);
        assert_eq!(ids(&results), vec![ItemId::from(2u64)]);
    }

    #[test]
    fn test_rank_dispatches_strategy() {
        let ranker = Ranker::default();
        let subject = Subject::new(1u64);
        let signals = SignalBundle::new().with_membership([1u64]).with_rating(2u64, 5.0);
        let candidates = vec![
            live(1),
            live(2).with_priority(90),
            Candidate::new(3u64).with_window(now() + Duration::days(1), None),
        ];
        let query = RankingQuery {
            subject: &subject,
            candidates: &candidates,
            signals: &signals,
            query_time: now(),
            top_n: 5,
        };

        let featured = ranker.rank(ScoringStrategy::Featured, &query).unwrap();
        assert_eq!(ids(&featured.results), vec![ItemId::from(1u64), ItemId::from(2u64)]);
        assert_eq!(featured.considered, 3);
        assert_eq!(featured.eligible, 2);

        let priority = ranker.rank(ScoringStrategy::PriorityBoost, &query).unwrap();
        assert_eq!(ids(&priority.results), vec![ItemId::from(1u64), ItemId::from(2u64)]);
        assert!((priority.results[0].score - 1.0).abs() < EPS);
        assert!((priority.results[1].score - 0.9).abs() < EPS);
        assert_eq!(priority.considered, 3);
        assert_eq!(priority.eligible, 2);
    }

    #[test]
    fn test_unused_candidate_vector_of_other_width_is_ignored() {
        let ranker = Ranker::default();
        let candidates = vec![live(1).with_embedding(emb(&[1.0, 0.0, 0.0]))];
        let signals = SignalBundle::new().with_membership([1u64]);

        let results = ranker
            .rank_featured(&Subject::anonymous(), &candidates, &signals, now(), 10)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 0.4).abs() < EPS);
        assert_eq!(results[0].breakdown.embedding, None);
    }

    #[test]
    fn test_similar_to_excludes_the_item_itself() {
        let ranker = small_ranker();
        let anchor = emb(&[1.0, 0.0, 0.0]);
        let candidates = vec![
            Candidate::new(1u64).with_embedding(anchor.clone()),
            Candidate::new(2u64).with_embedding(emb(&[0.0, 1.0, 0.0])),
            Candidate::new(3u64).with_embedding(emb(&[0.9, 0.1, 0.0])),
            Candidate::new(4u64),
            Candidate::new(5u64).with_embedding(emb(&[0.0, 0.0, 0.0])),
            Candidate::new(6u64).with_embedding(emb(&[-1.0, 0.0, 0.0])),
        ];

        let results = ranker
            .similar_to(&ItemId::from(1u64), &anchor, &candidates, DEFAULT_RECOMMENDATION_LIMIT)
            .unwrap();
        assert_eq!(
            ids(&results),
            vec![ItemId::from(3u64), ItemId::from(2u64), ItemId::from(5u64), ItemId::from(6u64)]
        );
        assert!(results[2].score == 0.0 && results[2].breakdown.embedding.is_none());
        assert!((results[3].score + 1.0).abs() < 1e-6);

        let top = ranker
            .similar_to(&ItemId::from(1u64), &anchor, &candidates, 1)
            .unwrap();
        assert_eq!(ids(&top), vec![ItemId::from(3u64)]);
    }

    #[test]
    fn test_recommend_for_subject_vector() {
        let ranker = small_ranker();
        let expired = Candidate::new(3u64)
            .with_window(now() - Duration::days(9), Some(now() - Duration::days(8)))
            .with_embedding(emb(&[0.0, 0.0, 1.0]));
        let candidates = vec![
            Candidate::new(1u64).with_embedding(emb(&[1.0, 0.0, 0.0])),
            Candidate::new(2u64).with_embedding(emb(&[0.0, 1.0, 1.0])),
            expired,
        ];

        let results = ranker
            .recommend_for(&emb(&[0.0, 0.0, 2.0]), &candidates, 10)
            .unwrap();
        assert_eq!(
            ids(&results),
            vec![ItemId::from(3u64), ItemId::from(2u64), ItemId::from(1u64)]
        );

        let zero = ranker
            .recommend_for(&emb(&[0.0, 0.0, 0.0]), &candidates, 10)
            .unwrap();
        assert!(zero.iter().all(|r| r.score == 0.0));
        assert_eq!(
            ids(&zero),
            vec![ItemId::from(1u64), ItemId::from(2u64), ItemId::from(3u64)]
        );

        assert!(matches!(
            ranker.recommend_for(&emb(&[1.0, 0.0]), &candidates, 10),
            Err(Error::InvalidDimension { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ScoringConfig::default().with_embedding_dim(0);
        assert!(matches!(Ranker::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_ranker_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ranker>();
        assert_send_sync::<SignalBundle>();
        assert_send_sync::<Candidate>();
    }
}
