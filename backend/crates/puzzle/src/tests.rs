//! Unit tests for the puzzle crate

#[cfg(test)]
mod support {
    use crate::application::authoring::{CreatePuzzleInput, CreatePuzzleUseCase, DetailsInput};
    use crate::application::config::PuzzleConfig;
    use crate::domain::entities::Puzzle;
    use crate::domain::value_objects::PuzzleType;
    use crate::infra::memory::InMemoryPuzzleRepository;
    use kernel::id::PlayerId;
    use serde_json::{Value, json};
    use std::sync::Arc;

    pub fn repo() -> Arc<InMemoryPuzzleRepository> {
        Arc::new(InMemoryPuzzleRepository::new())
    }

    pub fn config() -> Arc<PuzzleConfig> {
        Arc::new(PuzzleConfig::without_retry_delay())
    }

    pub fn details(title: &str) -> DetailsInput {
        DetailsInput {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub async fn create(
        repo: &Arc<InMemoryPuzzleRepository>,
        puzzle_type: PuzzleType,
        content: Value,
        solution: Option<Value>,
    ) -> Puzzle {
        CreatePuzzleUseCase::new(repo.clone())
            .execute(
                CreatePuzzleInput {
                    puzzle_type,
                    content,
                    solution,
                    details: details("Morning warmup"),
                    is_active: None,
                },
                PlayerId::new(),
            )
            .await
            .unwrap()
    }

    pub async fn word_search(repo: &Arc<InMemoryPuzzleRepository>) -> Puzzle {
        create(repo, PuzzleType::WordSearch, json!(["CAT", "DOG"]), None).await
    }
}

#[cfg(test)]
mod authoring_tests {
    use super::support::*;
    use crate::application::authoring::{
        ActiveChange, CreatePuzzleInput, CreatePuzzleUseCase, DetailsInput, SetPuzzleActiveUseCase,
        UpdatePuzzleInput, UpdatePuzzleUseCase,
    };
    use crate::domain::content::grid::fixtures::*;
    use crate::domain::repository::PuzzleRepository;
    use crate::domain::value_objects::{Difficulty, PuzzleType};
    use crate::error::PuzzleError;
    use kernel::id::{PlayerId, PuzzleId};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_stores_normalized_content() {
        let repo = repo();
        let puzzle = create(
            &repo,
            PuzzleType::WordSearch,
            json!("cat, dog ,owl"),
            None,
        )
        .await;

        let stored = repo.find_puzzle(puzzle.id).await.unwrap().unwrap();
        assert_eq!(stored.content.to_json(), json!({ "words": ["CAT", "DOG", "OWL"] }));
        assert!(stored.is_active);
        assert_eq!(stored.stats.completions_count, 0);
        assert_eq!(stored.stats.average_time, None);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_content() {
        let repo = repo();
        let result = CreatePuzzleUseCase::new(repo.clone())
            .execute(
                CreatePuzzleInput {
                    puzzle_type: PuzzleType::Sudoku,
                    content: json!([[1, 2, 3]]),
                    solution: None,
                    details: details("Broken"),
                    is_active: None,
                },
                PlayerId::new(),
            )
            .await;

        match result {
            Err(PuzzleError::InvalidContent(e)) => {
                assert_eq!(e.to_string(), "Sudoku must have exactly 9 rows. Found 1 rows.");
            }
            other => panic!("expected invalid content, got {other:?}"),
        }
        let (_, total) = repo.list_puzzles(&Default::default()).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let repo = repo();
        let result = CreatePuzzleUseCase::new(repo)
            .execute(
                CreatePuzzleInput {
                    puzzle_type: PuzzleType::WordSearch,
                    content: json!(["CAT"]),
                    solution: None,
                    details: details("   "),
                    is_active: None,
                },
                PlayerId::new(),
            )
            .await;
        assert!(matches!(result, Err(PuzzleError::InvalidMetadata(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_stored_solution_for_new_givens() {
        let repo = repo();
        let puzzle = create(&repo, PuzzleType::Sudoku, givens_json(), Some(solved_json())).await;

        let mut fewer_givens = givens_json();
        fewer_givens[0][0] = json!(0);
        let updated = UpdatePuzzleUseCase::new(repo.clone())
            .execute(
                puzzle.id,
                UpdatePuzzleInput {
                    content: Some(fewer_givens),
                    details: DetailsInput {
                        difficulty: Some(Difficulty::Hard),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                PlayerId::new(),
            )
            .await
            .unwrap();

        assert_eq!(updated.details.difficulty, Difficulty::Hard);
        assert_eq!(updated.content.solution_json(), Some(solved_json()));
        assert_eq!(updated.details.title.as_str(), "Morning warmup");
    }

    #[tokio::test]
    async fn test_update_type_change_requires_content() {
        let repo = repo();
        let puzzle = word_search(&repo).await;

        let result = UpdatePuzzleUseCase::new(repo.clone())
            .execute(
                puzzle.id,
                UpdatePuzzleInput {
                    puzzle_type: Some(PuzzleType::Crossword),
                    ..Default::default()
                },
                PlayerId::new(),
            )
            .await;
        assert!(matches!(result, Err(PuzzleError::InvalidMetadata(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_conflicting_solution() {
        let repo = repo();
        let puzzle = create(&repo, PuzzleType::Sudoku, givens_json(), None).await;

        let mut wrong = solved_json();
        // Swap two cells of a row; still complete but breaks the columns
        wrong[0][0] = json!(3);
        wrong[0][1] = json!(5);
        let result = UpdatePuzzleUseCase::new(repo.clone())
            .execute(
                puzzle.id,
                UpdatePuzzleInput {
                    solution: Some(wrong),
                    ..Default::default()
                },
                PlayerId::new(),
            )
            .await;
        assert!(matches!(result, Err(PuzzleError::InvalidContent(_))));

        let stored = repo.find_puzzle(puzzle.id).await.unwrap().unwrap();
        assert!(!stored.content.has_stored_solution());
    }

    #[tokio::test]
    async fn test_update_unknown_puzzle() {
        let result = UpdatePuzzleUseCase::new(repo())
            .execute(PuzzleId::new(), UpdatePuzzleInput::default(), PlayerId::new())
            .await;
        assert!(matches!(result, Err(PuzzleError::PuzzleNotFound)));
    }

    #[tokio::test]
    async fn test_retire_and_toggle() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let use_case = SetPuzzleActiveUseCase::new(repo.clone());

        let retired = use_case
            .execute(puzzle.id, ActiveChange::Retire, PlayerId::new())
            .await
            .unwrap();
        assert!(!retired.is_active);

        // Retiring twice stays retired
        let again = use_case
            .execute(puzzle.id, ActiveChange::Retire, PlayerId::new())
            .await
            .unwrap();
        assert!(!again.is_active);

        let toggled = use_case
            .execute(puzzle.id, ActiveChange::Toggle, PlayerId::new())
            .await
            .unwrap();
        assert!(toggled.is_active);

        // The record is still there after retirement
        assert!(repo.find_puzzle(puzzle.id).await.unwrap().is_some());
    }
}

#[cfg(test)]
mod submit_tests {
    use super::support::*;
    use crate::application::config::PuzzleConfig;
    use crate::application::submit_attempt::{SubmitAttemptInput, SubmitAttemptUseCase};
    use crate::domain::attempt_state::{AttemptRejection, AttemptState};
    use crate::domain::content::grid::fixtures::*;
    use crate::domain::repository::{AttemptRepository, PuzzleRepository};
    use crate::domain::value_objects::PuzzleType;
    use crate::error::PuzzleError;
    use crate::infra::memory::InMemoryPuzzleRepository;
    use kernel::id::{PlayerId, PuzzleId};
    use serde_json::{Value, json};
    use std::sync::Arc;

    type UseCase = SubmitAttemptUseCase<InMemoryPuzzleRepository, InMemoryPuzzleRepository>;

    fn use_case(repo: &Arc<InMemoryPuzzleRepository>) -> UseCase {
        SubmitAttemptUseCase::new(repo.clone(), repo.clone(), config())
    }

    fn input(puzzle_id: PuzzleId, player_id: PlayerId, solution: Value, secs: i64) -> SubmitAttemptInput {
        SubmitAttemptInput {
            puzzle_id,
            player_id,
            solution,
            duration_secs: secs,
            client_ip: None,
        }
    }

    #[tokio::test]
    async fn test_correct_first_attempt() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let player = PlayerId::new();

        let out = use_case(&repo)
            .execute(input(puzzle.id, player, json!(["dog", "cat"]), 42))
            .await
            .unwrap();

        assert!(out.accepted());
        assert!(out.correct);
        assert_eq!(out.attempt_number, 1);
        assert_eq!(out.attempts_remaining, 2);
        assert_eq!(out.state, AttemptState::Completed { attempts: 1 });
        assert_eq!(out.xp_earned, 100);
        let stats = out.stats.unwrap();
        assert_eq!(stats.completions_count, 1);
        assert_eq!(stats.average_time, Some(42.0));
    }

    #[tokio::test]
    async fn test_three_wrong_then_rejected() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let player = PlayerId::new();
        let use_case = use_case(&repo);

        for n in 1..=3u32 {
            let out = use_case
                .execute(input(puzzle.id, player, json!(["OWL"]), 30))
                .await
                .unwrap();
            assert!(out.accepted());
            assert!(!out.correct);
            assert_eq!(out.attempt_number, n);
            assert_eq!(out.attempts_remaining, 3 - n);
            assert_eq!(out.xp_earned, 0);
            assert!(out.stats.is_none());
        }

        // Even a correct answer is refused once the budget is spent
        let out = use_case
            .execute(input(puzzle.id, player, json!(["CAT", "DOG"]), 30))
            .await
            .unwrap();
        assert_eq!(out.rejection, Some(AttemptRejection::MaxAttemptsReached));
        assert!(!out.correct);
        assert_eq!(out.attempts_remaining, 0);

        let log = repo.list_pair_attempts(puzzle.id, player).await.unwrap();
        assert_eq!(log.len(), 3);
        let stored = repo.find_puzzle(puzzle.id).await.unwrap().unwrap();
        assert_eq!(stored.stats.completions_count, 0);
    }

    #[tokio::test]
    async fn test_wrong_then_correct_then_completed() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let player = PlayerId::new();
        let use_case = use_case(&repo);

        let first = use_case
            .execute(input(puzzle.id, player, json!(["CAT"]), 20))
            .await
            .unwrap();
        assert!(!first.correct);

        let second = use_case
            .execute(input(puzzle.id, player, json!(["CAT", "DOG"]), 25))
            .await
            .unwrap();
        assert!(second.correct);
        assert_eq!(second.attempt_number, 2);

        let third = use_case
            .execute(input(puzzle.id, player, json!(["CAT", "DOG"]), 5))
            .await
            .unwrap();
        assert_eq!(third.rejection, Some(AttemptRejection::AlreadyCompleted));

        let log = repo.list_pair_attempts(puzzle.id, player).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.iter().filter(|a| a.is_correct).count(), 1);
    }

    #[tokio::test]
    async fn test_running_average_across_players() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let use_case = use_case(&repo);

        let mut last = None;
        for secs in [10, 15, 20] {
            let out = use_case
                .execute(input(puzzle.id, PlayerId::new(), json!(["CAT", "DOG"]), secs))
                .await
                .unwrap();
            last = out.stats;
        }

        let stats = last.unwrap();
        assert_eq!(stats.completions_count, 3);
        assert!((stats.average_time.unwrap() - 15.0).abs() < 1e-9);

        let stored = repo.find_puzzle(puzzle.id).await.unwrap().unwrap();
        assert_eq!(stored.stats, stats);
    }

    #[tokio::test]
    async fn test_wrong_attempts_leave_stats_alone() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let use_case = use_case(&repo);

        use_case
            .execute(input(puzzle.id, PlayerId::new(), json!(["CAT", "DOG"]), 12))
            .await
            .unwrap();
        use_case
            .execute(input(puzzle.id, PlayerId::new(), json!(["CAT"]), 1))
            .await
            .unwrap();

        let stored = repo.find_puzzle(puzzle.id).await.unwrap().unwrap();
        assert_eq!(stored.stats.completions_count, 1);
        assert_eq!(stored.stats.average_time, Some(12.0));
    }

    #[tokio::test]
    async fn test_concurrent_correct_submissions_count_once() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let player = PlayerId::new();
        let use_case = use_case(&repo);

        let (a, b) = tokio::join!(
            use_case.execute(input(puzzle.id, player, json!(["CAT", "DOG"]), 10)),
            use_case.execute(input(puzzle.id, player, json!(["CAT", "DOG"]), 11)),
        );
        let outcomes = [a.unwrap(), b.unwrap()];

        assert_eq!(outcomes.iter().filter(|o| o.correct).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| o.rejection == Some(AttemptRejection::AlreadyCompleted))
                .count(),
            1
        );

        let stored = repo.find_puzzle(puzzle.id).await.unwrap().unwrap();
        assert_eq!(stored.stats.completions_count, 1);
        let log = repo.list_pair_attempts(puzzle.id, player).await.unwrap();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_respect_attempt_cap() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let player = PlayerId::new();
        let use_case = use_case(&repo);

        let wrong = || use_case.execute(input(puzzle.id, player, json!(["OWL"]), 3));
        let (a, b, c, d) = tokio::join!(wrong(), wrong(), wrong(), wrong());
        let outcomes = [a.unwrap(), b.unwrap(), c.unwrap(), d.unwrap()];

        assert_eq!(outcomes.iter().filter(|o| o.accepted()).count(), 3);
        let log = repo.list_pair_attempts(puzzle.id, player).await.unwrap();
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_sudoku_mismatches_reported() {
        let repo = repo();
        let puzzle = create(&repo, PuzzleType::Sudoku, givens_json(), Some(solved_json())).await;

        let mut candidate = solved_json();
        candidate[8][8] = json!(1);
        let out = use_case(&repo)
            .execute(input(puzzle.id, PlayerId::new(), candidate, 300))
            .await
            .unwrap();

        assert!(!out.correct);
        assert_eq!(out.mismatch_count, 1);
        assert_eq!((out.mismatches[0].row, out.mismatches[0].col), (8, 8));
    }

    #[tokio::test]
    async fn test_inactive_puzzle_rejected() {
        let repo = repo();
        let mut puzzle = word_search(&repo).await;
        puzzle.set_active(false);
        repo.update_puzzle(&puzzle).await.unwrap();

        let result = use_case(&repo)
            .execute(input(puzzle.id, PlayerId::new(), json!(["CAT", "DOG"]), 10))
            .await;
        assert!(matches!(result, Err(PuzzleError::PuzzleInactive)));
    }

    #[tokio::test]
    async fn test_missing_solution_without_fallback() {
        let repo = repo();
        let puzzle = create(&repo, PuzzleType::Sudoku, givens_json(), None).await;
        let config = PuzzleConfig {
            allow_constraint_fallback: false,
            ..PuzzleConfig::without_retry_delay()
        };
        let strict = SubmitAttemptUseCase::new(repo.clone(), repo.clone(), Arc::new(config));

        let result = strict
            .execute(input(puzzle.id, PlayerId::new(), solved_json(), 10))
            .await;
        assert!(matches!(result, Err(PuzzleError::SolutionMissing)));

        // With fallback the grid rules decide
        let out = use_case(&repo)
            .execute(input(puzzle.id, PlayerId::new(), solved_json(), 10))
            .await
            .unwrap();
        assert!(out.correct);
    }

    #[tokio::test]
    async fn test_invalid_duration_and_unknown_puzzle() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let use_case = use_case(&repo);

        let zero = use_case
            .execute(input(puzzle.id, PlayerId::new(), json!(["CAT", "DOG"]), 0))
            .await;
        assert!(matches!(zero, Err(PuzzleError::InvalidSubmission(_))));

        let missing = use_case
            .execute(input(PuzzleId::new(), PlayerId::new(), json!(["CAT"]), 10))
            .await;
        assert!(matches!(missing, Err(PuzzleError::PuzzleNotFound)));
    }

    #[tokio::test]
    async fn test_duration_beyond_storage_range_is_client_error() {
        let repo = repo();
        let puzzle = word_search(&repo).await;

        let result = use_case(&repo)
            .execute(input(puzzle.id, PlayerId::new(), json!(["CAT", "DOG"]), 3_000_000_000))
            .await;
        match result {
            Err(err @ PuzzleError::InvalidSubmission(_)) => {
                assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
            }
            other => panic!("expected invalid submission, got {other:?}"),
        }
        let stored = repo.find_puzzle(puzzle.id).await.unwrap().unwrap();
        assert_eq!(stored.stats.completions_count, 0);
    }
}

#[cfg(test)]
mod transient_tests {
    use super::support::*;
    use crate::application::submit_attempt::{SubmitAttemptInput, SubmitAttemptUseCase};
    use crate::domain::attempt_state::AttemptPolicy;
    use crate::domain::entities::{Attempt, PlayerSummary};
    use crate::domain::repository::{
        AttemptFilter, AttemptRecord, AttemptRepository, PuzzleRepository,
    };
    use crate::error::{PuzzleError, PuzzleResult};
    use crate::infra::memory::InMemoryPuzzleRepository;
    use kernel::id::{PlayerId, PuzzleId};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails `record_attempt` with a transient error a fixed number of
    /// times, then hands over to the in-memory store
    struct FlakyAttempts {
        inner: Arc<InMemoryPuzzleRepository>,
        failures_left: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FlakyAttempts {
        fn new(inner: Arc<InMemoryPuzzleRepository>, failures: usize) -> Self {
            Self {
                inner,
                failures_left: AtomicUsize::new(failures),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AttemptRepository for FlakyAttempts {
        async fn list_pair_attempts(
            &self,
            puzzle_id: PuzzleId,
            player_id: PlayerId,
        ) -> PuzzleResult<Vec<Attempt>> {
            self.inner.list_pair_attempts(puzzle_id, player_id).await
        }

        async fn record_attempt(
            &self,
            attempt: &Attempt,
            policy: AttemptPolicy,
        ) -> PuzzleResult<AttemptRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let failing = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(PuzzleError::Transient);
            }
            self.inner.record_attempt(attempt, policy).await
        }

        async fn list_player_attempts(
            &self,
            player_id: PlayerId,
            filter: &AttemptFilter,
        ) -> PuzzleResult<(Vec<Attempt>, u64)> {
            self.inner.list_player_attempts(player_id, filter).await
        }

        async fn player_summary(&self, player_id: PlayerId) -> PuzzleResult<PlayerSummary> {
            self.inner.player_summary(player_id).await
        }
    }

    fn submission(puzzle_id: PuzzleId, player_id: PlayerId) -> SubmitAttemptInput {
        SubmitAttemptInput {
            puzzle_id,
            player_id,
            solution: json!(["CAT", "DOG"]),
            duration_secs: 25,
            client_ip: None,
        }
    }

    #[tokio::test]
    async fn test_recovers_within_retry_budget() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let player = PlayerId::new();
        // Budget is three runs; two transient failures leave one to succeed
        let flaky = Arc::new(FlakyAttempts::new(repo.clone(), 2));
        let use_case = SubmitAttemptUseCase::new(repo.clone(), flaky.clone(), config());

        let out = use_case.execute(submission(puzzle.id, player)).await.unwrap();
        assert!(out.correct);
        assert_eq!(out.attempt_number, 1);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);

        let log = repo.list_pair_attempts(puzzle.id, player).await.unwrap();
        assert_eq!(log.len(), 1);
        let stored = repo.find_puzzle(puzzle.id).await.unwrap().unwrap();
        assert_eq!(stored.stats.completions_count, 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_transient() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let player = PlayerId::new();
        let flaky = Arc::new(FlakyAttempts::new(repo.clone(), 3));
        let use_case = SubmitAttemptUseCase::new(repo.clone(), flaky.clone(), config());

        let result = use_case.execute(submission(puzzle.id, player)).await;
        match result {
            Err(err @ PuzzleError::Transient) => {
                assert_eq!(err.status_code(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
            }
            other => panic!("expected transient failure, got {other:?}"),
        }
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);

        let log = repo.list_pair_attempts(puzzle.id, player).await.unwrap();
        assert!(log.is_empty());
        let stored = repo.find_puzzle(puzzle.id).await.unwrap().unwrap();
        assert_eq!(stored.stats.completions_count, 0);
    }
}

#[cfg(test)]
mod query_tests {
    use super::support::*;
    use crate::application::attempt_status::AttemptStatusUseCase;
    use crate::application::check_solution::CheckSolutionUseCase;
    use crate::application::queries::{BrowsePuzzlesUseCase, PlayerAttemptsUseCase, PuzzleStatsUseCase};
    use crate::application::submit_attempt::{SubmitAttemptInput, SubmitAttemptUseCase};
    use crate::domain::attempt_state::AttemptState;
    use crate::domain::repository::{AttemptFilter, Page, PuzzleFilter};
    use crate::domain::value_objects::PuzzleType;
    use crate::error::PuzzleError;
    use crate::infra::memory::InMemoryPuzzleRepository;
    use kernel::id::{PlayerId, PuzzleId};
    use serde_json::{Value, json};
    use std::sync::Arc;

    async fn submit(
        repo: &Arc<InMemoryPuzzleRepository>,
        puzzle_id: PuzzleId,
        player_id: PlayerId,
        solution: Value,
        secs: i64,
    ) {
        SubmitAttemptUseCase::new(repo.clone(), repo.clone(), config())
            .execute(SubmitAttemptInput {
                puzzle_id,
                player_id,
                solution,
                duration_secs: secs,
                client_ip: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_check_does_not_record() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let player = PlayerId::new();

        let out = tokio_test::assert_ok!(
            CheckSolutionUseCase::new(repo.clone(), config())
                .execute(puzzle.id, &json!(["cat", "dog"]))
                .await
        );
        assert!(out.correct);

        let status = AttemptStatusUseCase::new(repo.clone(), repo.clone(), config())
            .execute(puzzle.id, player)
            .await
            .unwrap();
        assert_eq!(status.state, AttemptState::Fresh);
        assert!(status.attempts.is_empty());
    }

    #[tokio::test]
    async fn test_attempt_status_tracks_progress() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        let player = PlayerId::new();
        let status_use_case = AttemptStatusUseCase::new(repo.clone(), repo.clone(), config());

        let fresh = status_use_case.execute(puzzle.id, player).await.unwrap();
        assert_eq!(fresh.attempt_number, 0);
        assert_eq!(fresh.attempts_remaining, 3);
        assert!(fresh.can_attempt());

        for _ in 0..3 {
            submit(&repo, puzzle.id, player, json!(["OWL"]), 9).await;
        }

        let exhausted = status_use_case.execute(puzzle.id, player).await.unwrap();
        assert!(exhausted.max_attempts_reached());
        assert!(!exhausted.completed());
        assert!(!exhausted.can_attempt());
        assert_eq!(exhausted.attempts.len(), 3);
        assert_eq!(exhausted.max_attempts, 3);

        let unknown = status_use_case.execute(PuzzleId::new(), player).await;
        assert!(matches!(unknown, Err(PuzzleError::PuzzleNotFound)));
    }

    #[tokio::test]
    async fn test_browse_filters_and_pages() {
        let repo = repo();
        for _ in 0..3 {
            word_search(&repo).await;
        }
        create(&repo, PuzzleType::Crossword, json!({
            "across": [{ "number": 1, "clue": "Feline", "answer": "CAT" }],
            "down": [{ "number": 2, "clue": "Canine", "answer": "DOG" }]
        }), None)
        .await;

        let browse = BrowsePuzzlesUseCase::new(repo.clone());
        let word_searches = browse
            .list(PuzzleFilter {
                puzzle_type: Some(PuzzleType::WordSearch),
                page: Page::new(Some(2), None),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(word_searches.total, 3);
        assert_eq!(word_searches.items.len(), 2);
        assert_eq!(word_searches.limit, 2);

        let all = browse.list(PuzzleFilter::default()).await.unwrap();
        assert_eq!(all.total, 4);

        let missing = browse.get(PuzzleId::new()).await;
        assert!(matches!(missing, Err(PuzzleError::PuzzleNotFound)));
    }

    #[tokio::test]
    async fn test_puzzle_stats_summary() {
        let repo = repo();
        let puzzle = word_search(&repo).await;
        for secs in [30, 10, 20] {
            submit(&repo, puzzle.id, PlayerId::new(), json!(["CAT", "DOG"]), secs).await;
        }
        submit(&repo, puzzle.id, PlayerId::new(), json!(["CAT"]), 1).await;

        let out = PuzzleStatsUseCase::new(repo.clone(), config())
            .execute(puzzle.id)
            .await
            .unwrap();
        assert_eq!(out.stats.completions_count, 3);
        assert_eq!(out.stats.average_time, Some(20.0));
        assert_eq!(out.completions.fastest.map(|t| t.as_secs()), Some(10));
        assert_eq!(out.completions.slowest.map(|t| t.as_secs()), Some(30));
        assert_eq!(out.completions.recent.len(), 3);
        assert_eq!(out.completions.recent[0].duration.as_secs(), 20);
    }

    #[tokio::test]
    async fn test_player_attempts_and_summary() {
        let repo = repo();
        let first = word_search(&repo).await;
        let second = word_search(&repo).await;
        let player = PlayerId::new();

        submit(&repo, first.id, player, json!(["CAT"]), 30).await;
        submit(&repo, first.id, player, json!(["CAT", "DOG"]), 20).await;
        submit(&repo, second.id, player, json!(["CAT", "DOG"]), 10).await;
        submit(&repo, second.id, PlayerId::new(), json!(["CAT", "DOG"]), 99).await;

        let use_case = PlayerAttemptsUseCase::new(repo.clone());
        let out = use_case.execute(player, AttemptFilter::default()).await.unwrap();
        assert_eq!(out.page.total, 3);
        assert_eq!(out.summary.total_attempts, 3);
        assert_eq!(out.summary.correct_attempts, 2);
        assert_eq!(out.summary.incorrect_attempts(), 1);
        assert_eq!(out.summary.total_xp, 200);
        assert_eq!(out.summary.average_time, Some(20.0));

        let correct_only = use_case
            .execute(
                player,
                AttemptFilter {
                    is_correct: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(correct_only.page.total, 2);
        assert!(correct_only.page.items.iter().all(|a| a.is_correct));
    }
}

#[cfg(test)]
mod router_tests {
    use super::support::*;
    use crate::application::config::PuzzleConfig;
    use crate::domain::content::grid::fixtures::*;
    use crate::domain::value_objects::PuzzleType;
    use crate::infra::memory::InMemoryPuzzleRepository;
    use crate::presentation::router::puzzle_router_generic;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use kernel::id::PlayerId;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(repo: &InMemoryPuzzleRepository) -> Router {
        puzzle_router_generic(repo.clone(), PuzzleConfig::without_retry_delay())
    }

    fn request(method: &str, uri: &str, player: Option<PlayerId>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(player) = player {
            builder = builder.header("x-player-id", player.to_string());
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let repo = InMemoryPuzzleRepository::new();
        let (status, body) = call(app(&repo), request("GET", "/", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_validate_needs_no_identity() {
        let repo = InMemoryPuzzleRepository::new();

        let (status, body) = call(
            app(&repo),
            request("POST", "/validate", None, Some(json!({
                "type": "word_search",
                "content": "cat,dog"
            }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["normalized"], json!({ "words": ["CAT", "DOG"] }));

        let (status, body) = call(
            app(&repo),
            request("POST", "/validate", None, Some(json!({
                "type": "crossword",
                "content": { "across": [] }
            }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        assert_eq!(body["reason"], "Crossword must have a \"down\" array");
    }

    #[tokio::test]
    async fn test_player_view_hides_solution() {
        let repo = InMemoryPuzzleRepository::new();
        let author = PlayerId::new();

        let (status, created) = call(
            app(&repo),
            request("POST", "/", Some(author), Some(json!({
                "title": "Classic",
                "type": "sudoku",
                "difficulty": "hard",
                "content": givens_json(),
                "solution": solved_json()
            }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["solution"], solved_json());
        let id = created["id"].as_str().unwrap().to_string();

        let (status, fetched) = call(
            app(&repo),
            request("GET", &format!("/{id}"), Some(PlayerId::new()), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], "Classic");
        assert!(fetched.get("solution").is_none());
        assert!(fetched["content"].to_string().find("\"answer\"").is_none());
    }

    #[tokio::test]
    async fn test_submit_then_conflict() {
        let repo = InMemoryPuzzleRepository::new();
        let shared = std::sync::Arc::new(repo.clone());
        let puzzle = word_search(&shared).await;
        let player = PlayerId::new();
        let uri = format!("/{}/attempts", puzzle.id);

        let (status, body) = call(
            app(&repo),
            request("POST", &uri, Some(player), Some(json!({
                "solution": ["CAT", "DOG"],
                "timeTaken": 33
            }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["correct"], true);
        assert_eq!(body["xpEarned"], 100);
        assert_eq!(body["stats"]["completionsCount"], 1);

        let (status, body) = call(
            app(&repo),
            request("POST", &uri, Some(player), Some(json!({
                "solution": ["CAT", "DOG"],
                "duration": 12
            }))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["accepted"], false);
        assert_eq!(body["reason"], "already_completed");
        assert_eq!(body["message"], "You have already successfully completed this puzzle!");

        let (status, body) = call(app(&repo), request("GET", &uri, Some(player), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "completed");
        assert_eq!(body["canAttempt"], false);
    }

    #[tokio::test]
    async fn test_retired_puzzle_is_gone_for_attempts() {
        let repo = InMemoryPuzzleRepository::new();
        let shared = std::sync::Arc::new(repo.clone());
        let puzzle = create(&shared, PuzzleType::WordSearch, json!(["OWL"]), None).await;
        let player = PlayerId::new();

        let (status, _) = call(
            app(&repo),
            request("DELETE", &format!("/{}", puzzle.id), Some(player), None),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(
            app(&repo),
            request(
                "POST",
                &format!("/{}/attempts", puzzle.id),
                Some(player),
                Some(json!({ "solution": ["OWL"], "duration": 5 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(body["code"], "puzzle_inactive");
    }

    #[tokio::test]
    async fn test_unknown_puzzle_is_not_found() {
        let repo = InMemoryPuzzleRepository::new();
        let (status, body) = call(
            app(&repo),
            request("GET", &format!("/{}/stats", PlayerId::new()), Some(PlayerId::new()), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "puzzle_not_found");
    }
}

#[cfg(test)]
mod error_tests {
    use crate::domain::content::{ContentError, GridError};
    use crate::error::PuzzleError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_error_into_response_status_codes() {
        let cases = [
            (PuzzleError::PuzzleNotFound, StatusCode::NOT_FOUND),
            (PuzzleError::PuzzleInactive, StatusCode::GONE),
            (PuzzleError::InvalidSubmission("bad".into()), StatusCode::BAD_REQUEST),
            (PuzzleError::InvalidMetadata("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (PuzzleError::SolutionMissing, StatusCode::INTERNAL_SERVER_ERROR),
            (PuzzleError::Transient, StatusCode::SERVICE_UNAVAILABLE),
            (
                PuzzleError::InvalidContent(ContentError::Grid(GridError::IncompleteSolution)),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_error_display() {
        let err = PuzzleError::InvalidContent(ContentError::Grid(GridError::InvalidCell { row: 2, col: 5 }));
        assert_eq!(err.to_string(), "Invalid value at row 2, col 5. Must be 1-9 or empty.");
    }
}
