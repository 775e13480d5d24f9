use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::models::{GameError, GameView, ImageCard};
use crate::services::lexicon::random_search_term;
use crate::services::provider::ImageSource;
use crate::services::round::{Difficulty, GuessOutcome, Round, Session, TickOutcome};

/// Delay between a terminal state and the automatic next round.
pub const RESTART_DELAY: Duration = Duration::from_secs(3);

/// Extra delay on the timeout path, spent on the "time's up" screen before
/// the terminal screen. Timeout forfeits restart after 2s + 3s in total;
/// explicit forfeits and completions after 3s. The asymmetry is intentional.
pub const TIMEOUT_SCREEN_DELAY: Duration = Duration::from_secs(2);

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Coordinates the session: fetches an image for each round, runs the
/// countdown ticker, and schedules auto-restarts after terminal states.
///
/// All round state lives behind one lock and is only touched through the
/// `Session` transition methods. Tickers and restart timers carry the round
/// sequence number they were spawned for and give up as soon as it no longer
/// matches, so a stale timer can never touch a later round.
pub struct Orchestrator<S: ImageSource> {
    source: S,
    session: Arc<Mutex<Session>>,
    restart_tx: mpsc::UnboundedSender<u64>,
}

impl<S: ImageSource> Clone for Orchestrator<S> {
    fn clone(&self) -> Orchestrator<S> {
        Orchestrator {
            source: self.source.clone(),
            session: Arc::clone(&self.session),
            restart_tx: self.restart_tx.clone(),
        }
    }
}

impl<S: ImageSource> Orchestrator<S> {
    /// Build the orchestrator and spawn its restart supervisor. Must be
    /// called from within a tokio runtime.
    pub fn new(source: S) -> Orchestrator<S> {
        let (restart_tx, mut restart_rx) = mpsc::unbounded_channel();
        let orchestrator = Orchestrator {
            source,
            session: Arc::new(Mutex::new(Session::new())),
            restart_tx,
        };

        // Auto-restarts go through this single task; the delay timers only
        // send the sequence number of the round they belong to.
        let this = orchestrator.clone();
        tokio::spawn(async move {
            while let Some(seq) = restart_rx.recv().await {
                let difficulty = this.lock().last_difficulty();
                if let Err(err) = this.run_round(difficulty, Some(seq)).await {
                    warn!("auto-restart failed: {}", err);
                }
            }
        });

        orchestrator
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a round with the given difficulty, replacing whatever round is
    /// in progress. On failure the session is left Idle with score and
    /// difficulty untouched, awaiting a manual retry.
    pub async fn start_round(&self, difficulty: Difficulty) -> Result<(), GameError> {
        self.run_round(difficulty, None).await
    }

    /// Start a round with the last selected difficulty.
    pub async fn new_round(&self) -> Result<(), GameError> {
        let difficulty = self.lock().last_difficulty();
        self.run_round(difficulty, None).await
    }

    async fn run_round(
        &self,
        difficulty: Difficulty,
        expected_seq: Option<u64>,
    ) -> Result<(), GameError> {
        let cleared_seq = {
            let mut session = self.lock();
            if let Some(expected) = expected_seq {
                if session.seq() != expected {
                    debug!("skipping auto-restart for superseded round {}", expected);
                    return Ok(());
                }
            }
            session.clear_round()
        };

        let term = random_search_term();
        info!("starting {:?} round with search term '{}'", difficulty, term);

        let image = self.source.search(term).await?;
        let url = image
            .best_asset_url()
            .ok_or_else(|| GameError::NoUsableAsset(image.id.clone()))?
            .to_string();
        let title = image.title().to_string();
        let card = ImageCard {
            id: image.id.clone(),
            url,
            alt: title.clone(),
            contributor: image.contributor_name().to_string(),
        };
        let round = Round::new(card, title, difficulty);

        let seq = {
            let mut session = self.lock();
            // A manual start during the fetch wins over this round.
            if session.seq() != cleared_seq {
                debug!("round superseded while fetching image {}; discarding", image.id);
                return Ok(());
            }
            let word_count = round.guessable().len();
            let seq = session.begin_round(round);
            info!("round {} started: image {}, {} guessable words", seq, image.id, word_count);
            seq
        };
        self.spawn_ticker(seq);
        Ok(())
    }

    /// Submit one guess against the current round.
    pub fn submit_guess(&self, raw: &str) -> GuessOutcome {
        let (outcome, seq) = {
            let mut session = self.lock();
            let outcome = session.submit_guess(raw);
            (outcome, session.seq())
        };
        if let GuessOutcome::Found {
            word,
            points,
            completed,
            ..
        } = &outcome
        {
            info!("round {}: '{}' found, +{} points", seq, word, points);
            if *completed {
                info!("round {} complete", seq);
                self.schedule_restart(seq, RESTART_DELAY);
            }
        }
        outcome
    }

    /// Explicitly forfeit the current round. Returns false when there is no
    /// active round to forfeit.
    pub fn forfeit(&self) -> bool {
        let (forfeited, seq) = {
            let mut session = self.lock();
            (session.forfeit(), session.seq())
        };
        if forfeited {
            info!("round {} forfeited", seq);
            self.schedule_restart(seq, RESTART_DELAY);
        }
        forfeited
    }

    /// The display failed to render the image URL; drop back to Idle and
    /// wait for a manual new-round trigger.
    pub fn report_image_failure(&self) {
        warn!("{}", GameError::ImageLoadFailure);
        self.lock().clear_round();
    }

    pub fn view(&self) -> GameView {
        GameView::from_session(&self.lock())
    }

    fn spawn_ticker(&self, seq: u64) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let outcome = {
                    let mut session = this.lock();
                    if session.seq() != seq {
                        return;
                    }
                    session.tick()
                };
                match outcome {
                    TickOutcome::Running { .. } => {}
                    TickOutcome::Expired => {
                        info!("round {} timed out", seq);
                        this.schedule_restart(seq, TIMEOUT_SCREEN_DELAY + RESTART_DELAY);
                        return;
                    }
                    TickOutcome::Inactive => return,
                }
            }
        });
    }

    fn schedule_restart(&self, seq: u64, delay: Duration) {
        let restart_tx = self.restart_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The supervisor re-checks the sequence number under the lock,
            // so a manual new round during the delay supersedes this one.
            let _ = restart_tx.send(seq);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use serde_json::json;

    use super::*;
    use crate::services::provider::ImageRecord;

    /// Replays a scripted list of search results, one per call.
    #[derive(Clone)]
    struct FakeSource {
        script: Arc<Mutex<VecDeque<Result<ImageRecord, GameError>>>>,
    }

    impl FakeSource {
        fn new(results: Vec<Result<ImageRecord, GameError>>) -> FakeSource {
            FakeSource {
                script: Arc::new(Mutex::new(results.into_iter().collect())),
            }
        }
    }

    impl ImageSource for FakeSource {
        async fn search(&self, query: &str) -> Result<ImageRecord, GameError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GameError::EmptyResult(query.to_string())))
        }
    }

    fn image(id: &str, description: &str) -> ImageRecord {
        serde_json::from_value(json!({
            "id": id,
            "description": description,
            "contributor": { "display_name": "Jane Doe" },
            "assets": {
                "preview": { "url": format!("https://img.example/{}/preview.jpg", id) },
                "huge": { "url": format!("https://img.example/{}/huge.jpg", id) }
            }
        }))
        .unwrap()
    }

    fn image_without_assets(id: &str) -> ImageRecord {
        serde_json::from_value(json!({ "id": id, "description": "Lonely Cactus" })).unwrap()
    }

    #[tokio::test]
    async fn test_start_round_installs_active_round() {
        let source = FakeSource::new(vec![Ok(image("1", "Beautiful Mountain Sunset View"))]);
        let orchestrator = Orchestrator::new(source);

        orchestrator.start_round(Difficulty::Hard).await.unwrap();

        let view = orchestrator.view();
        assert_eq!(view.state, "active");
        assert_eq!(view.title.as_deref(), Some("_________ ________ ______ ____"));
        assert_eq!(view.time_remaining.as_deref(), Some("1:00"));
        let card = view.image.unwrap();
        assert_eq!(card.url, "https://img.example/1/huge.jpg");
        assert_eq!(card.alt, "Beautiful Mountain Sunset View");
        assert_eq!(card.contributor, "Jane Doe");
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_idle_and_keeps_score() {
        let source = FakeSource::new(vec![
            Ok(image("1", "Ocean waves ocean sky")),
            Err(GameError::EmptyResult("nature".to_string())),
        ]);
        let orchestrator = Orchestrator::new(source);

        orchestrator.start_round(Difficulty::Hard).await.unwrap();
        orchestrator.submit_guess("ocean");
        assert_eq!(orchestrator.view().score, 20);

        let err = orchestrator.start_round(Difficulty::Hard).await.unwrap_err();
        assert!(matches!(err, GameError::EmptyResult(_)));

        let view = orchestrator.view();
        assert_eq!(view.state, "idle");
        assert_eq!(view.score, 20);
    }

    #[tokio::test]
    async fn test_image_without_usable_asset_is_rejected() {
        let source = FakeSource::new(vec![Ok(image_without_assets("9"))]);
        let orchestrator = Orchestrator::new(source);

        let err = orchestrator.start_round(Difficulty::Hard).await.unwrap_err();
        assert!(matches!(err, GameError::NoUsableAsset(ref id) if id == "9"));
        assert_eq!(orchestrator.view().state, "idle");
    }

    #[tokio::test]
    async fn test_guess_flow_to_completion() {
        let source = FakeSource::new(vec![Ok(image("1", "The ocean and the sky"))]);
        let orchestrator = Orchestrator::new(source);
        orchestrator.start_round(Difficulty::Hard).await.unwrap();

        match orchestrator.submit_guess("ocean") {
            GuessOutcome::Found { completed, .. } => assert!(!completed),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(orchestrator.view().title.as_deref(), Some("The ocean and the ___"));

        match orchestrator.submit_guess("sky") {
            GuessOutcome::Found { completed, .. } => assert!(completed),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let view = orchestrator.view();
        assert_eq!(view.state, "complete");
        assert_eq!(view.score, 120);
        assert_eq!(view.final_score, Some(120));
        // Terminal view reveals the full title.
        assert_eq!(view.title.as_deref(), Some("The ocean and the sky"));
    }

    #[tokio::test]
    async fn test_forfeit_reveals_title_without_bonus() {
        let source = FakeSource::new(vec![Ok(image("1", "Beautiful Mountain Sunset View"))]);
        let orchestrator = Orchestrator::new(source);
        orchestrator.start_round(Difficulty::Hard).await.unwrap();
        orchestrator.submit_guess("sunset");

        assert!(orchestrator.forfeit());
        let view = orchestrator.view();
        assert_eq!(view.state, "forfeited");
        assert_eq!(view.score, 10);
        assert_eq!(view.title.as_deref(), Some("Beautiful Mountain Sunset View"));

        // No active round left to forfeit or guess against.
        assert!(!orchestrator.forfeit());
        assert_eq!(orchestrator.submit_guess("mountain"), GuessOutcome::Inactive);
    }

    #[tokio::test]
    async fn test_image_failure_report_drops_to_idle() {
        let source = FakeSource::new(vec![Ok(image("1", "Beautiful Mountain Sunset View"))]);
        let orchestrator = Orchestrator::new(source);
        orchestrator.start_round(Difficulty::Hard).await.unwrap();

        orchestrator.report_image_failure();
        let view = orchestrator.view();
        assert_eq!(view.state, "idle");
        assert_eq!(view.score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_forfeits_and_restarts_after_five_seconds() {
        let source = FakeSource::new(vec![
            Ok(image("1", "The ocean and the sky")),
            Ok(image("2", "Mountain road at dawn")),
        ]);
        let orchestrator = Orchestrator::new(source);
        orchestrator.start_round(Difficulty::Easy).await.unwrap();

        // Let the ticker run the clock down to zero.
        tokio::time::sleep(Duration::from_secs(61)).await;
        let view = orchestrator.view();
        assert_eq!(view.state, "forfeited");
        assert_eq!(view.time_remaining.as_deref(), Some("0:00"));
        assert_eq!(view.final_score, Some(0));

        // Timeout forfeits take the longer 2s + 3s path before restarting;
        // at 4 seconds in, the terminal screen is still up.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(orchestrator.view().state, "forfeited");

        // One more second crosses the 5-second mark and the next round
        // starts by itself, carrying the selected difficulty forward.
        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        let view = orchestrator.view();
        assert_eq!(view.state, "active");
        assert_eq!(view.image.unwrap().id, "2");
        assert_eq!(
            serde_json::to_value(view.difficulty).unwrap(),
            json!("easy")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_start_during_delay_window_cancels_restart() {
        // Only two images are scripted: if the stale restart fired anyway,
        // its fetch would fail and drop the session back to Idle.
        let source = FakeSource::new(vec![
            Ok(image("1", "The ocean and the sky")),
            Ok(image("2", "Mountain road at dawn")),
        ]);
        let orchestrator = Orchestrator::new(source);
        orchestrator.start_round(Difficulty::Hard).await.unwrap();

        // Forfeiting schedules a restart 3 seconds out, but the player
        // starts a new round first.
        assert!(orchestrator.forfeit());
        orchestrator.start_round(Difficulty::Hard).await.unwrap();
        assert_eq!(orchestrator.view().image.unwrap().id, "2");

        // Ride past the scheduled restart; the superseded timer must not
        // touch the round the player started.
        tokio::time::sleep(Duration::from_millis(4500)).await;
        tokio::task::yield_now().await;
        let view = orchestrator.view();
        assert_eq!(view.state, "active");
        assert_eq!(view.image.unwrap().id, "2");
        // The second round's own ticker kept running undisturbed.
        assert_eq!(view.time_remaining.as_deref(), Some("0:56"));
    }

    #[tokio::test]
    async fn test_new_round_reuses_last_difficulty() {
        let source = FakeSource::new(vec![
            Ok(image("1", "The ocean and the sky")),
            Ok(image("2", "Mountain road at dawn")),
        ]);
        let orchestrator = Orchestrator::new(source);
        orchestrator.start_round(Difficulty::Easy).await.unwrap();

        orchestrator.new_round().await.unwrap();
        let view = orchestrator.view();
        assert_eq!(view.state, "active");
        assert_eq!(view.image.unwrap().id, "2");
        assert_eq!(
            serde_json::to_value(view.difficulty).unwrap(),
            json!("easy")
        );
    }
}
