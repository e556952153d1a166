//! Session controller: the top-level game state machine.
//!
//! ```text
//! Idle -> Running -> {Won | Lost}
//!   ^________|______________|      start / restart / change_difficulty
//! ```
//!
//! The controller owns the deck, the reveal engine, both timers and the
//! best-score store. Nothing is shared between controllers; two games are
//! two instances.
//!
//! ## Timers
//!
//! - Clock tick: armed on start, re-armed after each tick, adds one second
//!   to the elapsed counter while `Running`.
//! - Mismatch delay: armed when a pair mismatches; flips the pair back.
//!
//! Both are cancelled on start, restart, difficulty change and game end.
//! Each carries the epoch of the session that armed it, and a callback is
//! only honoured if both its epoch and its token match what is currently
//! armed.
//!
//! ## Example
//!
//! ```
//! use memory_match::core::{Difficulty, GameConfig};
//! use memory_match::session::{SessionController, SessionStatus};
//!
//! let mut game = SessionController::new(GameConfig::default().with_seed(7)).unwrap();
//! game.start(Difficulty::Easy).unwrap();
//! assert_eq!(game.status(), SessionStatus::Running);
//!
//! let first = game.deck().unwrap().at(0).unwrap().instance_id;
//! assert!(game.reveal(first).is_accepted());
//!
//! game.advance(3_000);
//! assert_eq!(game.session().elapsed_seconds, 3);
//! ```

use serde::{Deserialize, Serialize};

use super::event::{EventBus, GameEvent, SubscriptionId};
use super::summary::SessionResult;
use crate::cards::{Deck, InstanceId, InstanceIdAllocator};
use crate::core::{Difficulty, DifficultyProfile, GameConfig, GameError, GameRng, RejectReason};
use crate::engine::{RevealEngine, RevealStep};
use crate::schedule::{ManualScheduler, Scheduler, TimerKind, TimerTask, TimerToken};
use crate::scoring::{self, GameStats};
use crate::store::{BestScoreStore, KeyValueStore, MemoryStore};

/// Session lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Won,
    Lost,
}

impl SessionStatus {
    /// Won or lost.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Won | SessionStatus::Lost)
    }
}

/// Read-only view of the current session counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub difficulty: Option<Difficulty>,
    pub status: SessionStatus,
    pub move_count: u32,
    pub elapsed_seconds: u32,
    pub matched_pairs: u32,
    pub pair_count: u32,
}

/// Result of [`SessionController::reveal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    Accepted(RevealStep),
    Rejected(RejectReason),
}

impl RevealOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, RevealOutcome::Accepted(_))
    }

    #[must_use]
    pub fn rejection(&self) -> Option<RejectReason> {
        match self {
            RevealOutcome::Rejected(reason) => Some(*reason),
            RevealOutcome::Accepted(_) => None,
        }
    }
}

/// Owns one game: deck, reveal engine, timers, scoring and best scores.
pub struct SessionController<S: Scheduler = ManualScheduler, K: KeyValueStore = MemoryStore> {
    config: GameConfig,
    scheduler: S,
    best_scores: BestScoreStore<K>,
    events: EventBus,
    rng: GameRng,
    ids: InstanceIdAllocator,

    difficulty: Option<Difficulty>,
    profile: Option<DifficultyProfile>,
    board: Option<RevealEngine>,
    status: SessionStatus,
    elapsed_seconds: u32,

    epoch: u64,
    tick_timer: Option<TimerToken>,
    hide_timer: Option<TimerToken>,

    last_result: Option<SessionResult>,
}

impl SessionController<ManualScheduler, MemoryStore> {
    /// Controller with a virtual-clock scheduler and in-memory best scores.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::with_collaborators(config, ManualScheduler::new(), MemoryStore::new())
    }
}

impl<S: Scheduler, K: KeyValueStore> SessionController<S, K> {
    /// Controller over host-provided scheduling and storage.
    pub fn with_collaborators(
        config: GameConfig,
        scheduler: S,
        backend: K,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let rng = config.seed.map_or_else(GameRng::from_entropy, GameRng::new);
        log::debug!(
            "session controller created (seed {}, {} scoring)",
            rng.seed(),
            config.scoring_mode
        );

        Ok(Self {
            config,
            scheduler,
            best_scores: BestScoreStore::new(backend),
            events: EventBus::new(),
            rng,
            ids: InstanceIdAllocator::new(),
            difficulty: None,
            profile: None,
            board: None,
            status: SessionStatus::Idle,
            elapsed_seconds: 0,
            epoch: 0,
            tick_timer: None,
            hide_timer: None,
            last_result: None,
        })
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// Profile of the active session.
    #[must_use]
    pub fn profile(&self) -> Option<&DifficultyProfile> {
        self.profile.as_ref()
    }

    /// Current counters.
    #[must_use]
    pub fn session(&self) -> Session {
        Session {
            difficulty: self.difficulty,
            status: self.status,
            move_count: self.board.as_ref().map_or(0, RevealEngine::move_count),
            elapsed_seconds: self.elapsed_seconds,
            matched_pairs: self.board.as_ref().map_or(0, RevealEngine::matched_pairs),
            pair_count: self.board.as_ref().map_or(0, RevealEngine::pair_count),
        }
    }

    /// The dealt deck, once a session has started.
    #[must_use]
    pub fn deck(&self) -> Option<&Deck> {
        self.board.as_ref().map(RevealEngine::deck)
    }

    /// Face-up, unmatched cards.
    #[must_use]
    pub fn revealed(&self) -> &[InstanceId] {
        match &self.board {
            Some(board) => board.revealed(),
            None => &[],
        }
    }

    /// True while a mismatched pair waits to flip back.
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.board.as_ref().is_some_and(RevealEngine::is_resolving)
    }

    /// Whether a reveal could be accepted right now.
    #[must_use]
    pub fn is_accepting_input(&self) -> bool {
        self.status == SessionStatus::Running && !self.is_resolving()
    }

    /// Generation counter, bumped on every (re)start.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Outcome of the most recently finished session.
    #[must_use]
    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn best_scores(&self) -> &BestScoreStore<K> {
        &self.best_scores
    }

    /// Best recorded score for a tier under the configured scoring mode.
    pub fn best_score(&mut self, difficulty: Difficulty) -> Option<u32> {
        self.best_scores.best(difficulty, self.config.scoring_mode)
    }

    /// Register an event listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // === Commands ===

    /// Deal a new deck for `difficulty` and start the clock.
    ///
    /// On error nothing changes: the previous session (if any) keeps
    /// running with its timers intact.
    pub fn start(&mut self, difficulty: Difficulty) -> Result<(), GameError> {
        let profile = self.config.profile(difficulty)?.clone();
        profile.validate()?;
        let deck = Deck::build(&profile.tokens(), &mut self.rng, &mut self.ids)?;

        // Stale callbacks must not reach the new session
        self.cancel_timers();
        self.epoch += 1;

        let pair_count = profile.pair_count;
        self.board = Some(RevealEngine::new(deck));
        self.profile = Some(profile);
        self.difficulty = Some(difficulty);
        self.status = SessionStatus::Running;
        self.elapsed_seconds = 0;
        self.arm_tick();

        let best = match self.best_scores.best_checked(difficulty, self.config.scoring_mode) {
            Ok(best) => best,
            Err(err) => {
                log::warn!("could not read best score for {difficulty}: {err}");
                self.events.emit(GameEvent::StoreWarning(err.to_string()));
                None
            }
        };

        log::debug!("session {} started: {difficulty}, {pair_count} pairs", self.epoch);
        self.events.emit(GameEvent::SessionStarted {
            difficulty,
            pair_count,
            best,
        });
        self.events.emit(GameEvent::MoveCountChanged(0));
        self.events.emit(GameEvent::TimeChanged(0));
        Ok(())
    }

    /// Switch tiers. Same as `start` with the new tier.
    pub fn change_difficulty(&mut self, difficulty: Difficulty) -> Result<(), GameError> {
        if self.difficulty != Some(difficulty) {
            log::debug!("difficulty change: {:?} -> {difficulty}", self.difficulty);
        }
        self.start(difficulty)
    }

    /// Start over at the current tier, or the configured default when idle.
    pub fn restart(&mut self) -> Result<(), GameError> {
        let difficulty = self.difficulty.unwrap_or(self.config.default_difficulty);
        self.start(difficulty)
    }

    /// Reveal a card.
    ///
    /// Rejections never fail the caller; they are returned and reported as
    /// `InputRejected`. Hitting the move limit also ends the session as lost.
    pub fn reveal(&mut self, id: InstanceId) -> RevealOutcome {
        if self.status != SessionStatus::Running {
            return self.reject(id, RejectReason::NotAcceptingInput);
        }
        let move_limit = self.profile.as_ref().and_then(|p| p.move_limit);
        let result = match self.board.as_mut() {
            Some(board) => board.reveal(id, move_limit),
            None => Err(RejectReason::NotAcceptingInput),
        };

        match result {
            Ok(step) => {
                self.apply_step(step);
                RevealOutcome::Accepted(step)
            }
            Err(RejectReason::MoveLimitReached) => {
                let outcome = self.reject(id, RejectReason::MoveLimitReached);
                self.finish(SessionStatus::Lost);
                outcome
            }
            Err(reason) => self.reject(id, reason),
        }
    }

    /// Deliver a fired timer. Stale or cancelled timers are ignored.
    pub fn on_timer(&mut self, token: TimerToken, task: TimerTask) {
        if task.epoch != self.epoch {
            log::trace!(
                "dropping {:?} from epoch {} (current {})",
                task.kind,
                task.epoch,
                self.epoch
            );
            return;
        }

        match task.kind {
            TimerKind::ClockTick => {
                if self.tick_timer != Some(token) {
                    log::trace!("dropping unarmed clock tick {token:?}");
                    return;
                }
                self.tick_timer = None;
                if self.status != SessionStatus::Running {
                    return;
                }
                self.elapsed_seconds += 1;
                self.events.emit(GameEvent::TimeChanged(self.elapsed_seconds));
                self.arm_tick();
            }
            TimerKind::HideMismatch => {
                if self.hide_timer != Some(token) {
                    log::trace!("dropping unarmed mismatch timer {token:?}");
                    return;
                }
                self.hide_timer = None;
                let resolved = self.board.as_mut().and_then(RevealEngine::resolve_mismatch);
                if resolved.is_some() {
                    self.events.emit(GameEvent::MismatchResolved);
                }
            }
        }
    }

    // === Internals ===

    fn reject(&mut self, card: InstanceId, reason: RejectReason) -> RevealOutcome {
        log::trace!("reveal of {card} rejected: {reason}");
        self.events.emit(GameEvent::InputRejected { card, reason });
        RevealOutcome::Rejected(reason)
    }

    fn apply_step(&mut self, step: RevealStep) {
        self.events.emit(GameEvent::CardRevealed(step.revealed()));
        if !step.completes_move() {
            return;
        }

        let (moves, complete) = self
            .board
            .as_ref()
            .map_or((0, false), |b| (b.move_count(), b.is_complete()));
        self.events.emit(GameEvent::MoveCountChanged(moves));

        match step {
            RevealStep::Matched { token, .. } => {
                self.events.emit(GameEvent::MatchFound(token));
                if complete {
                    // A winning move is a win even when it also exhausts the move limit
                    self.finish(SessionStatus::Won);
                }
            }
            RevealStep::Mismatched { first, second } => {
                let delay = self.config.mismatch_delay_ms;
                log::debug!("mismatch {first} / {second}, hiding in {delay}ms");
                let task = TimerTask::new(TimerKind::HideMismatch, self.epoch);
                self.hide_timer = Some(self.scheduler.after(self.config.mismatch_delay_ms, task));
            }
            RevealStep::FirstCard { .. } => {}
        }
    }

    fn arm_tick(&mut self) {
        let task = TimerTask::new(TimerKind::ClockTick, self.epoch);
        self.tick_timer = Some(self.scheduler.after(self.config.tick_interval_ms, task));
    }

    fn cancel_timers(&mut self) {
        if let Some(token) = self.tick_timer.take() {
            self.scheduler.cancel(token);
        }
        if let Some(token) = self.hide_timer.take() {
            self.scheduler.cancel(token);
        }
    }

    fn finish(&mut self, status: SessionStatus) {
        self.cancel_timers();
        self.status = status;

        let (Some(board), Some(profile), Some(difficulty)) =
            (&self.board, &self.profile, self.difficulty)
        else {
            return;
        };
        let mode = self.config.scoring_mode;
        let stats = GameStats {
            won: status == SessionStatus::Won,
            move_count: board.move_count(),
            elapsed_seconds: self.elapsed_seconds,
            matched_pairs: board.matched_pairs(),
        };
        let result = scoring::score(mode, profile, &stats);

        // Only wins compete for the best score
        let is_new_best = if stats.won {
            let outcome = self.best_scores.record_if_better(difficulty, result.score, mode);
            if let Some(warning) = outcome.warning {
                self.events.emit(GameEvent::StoreWarning(warning.to_string()));
            }
            outcome.updated
        } else {
            false
        };

        log::info!(
            "session {} {:?}: {difficulty}, {} moves, {}s, score {} ({})",
            self.epoch,
            status,
            stats.move_count,
            stats.elapsed_seconds,
            result.score,
            result.grade
        );

        self.last_result = Some(SessionResult {
            difficulty,
            status,
            move_count: stats.move_count,
            elapsed_seconds: stats.elapsed_seconds,
            matched_pairs: stats.matched_pairs,
            score: result.score,
            grade: result.grade,
            is_new_best,
        });
        self.events.emit(GameEvent::SessionEnded {
            status,
            score: result.score,
            grade: result.grade,
            is_new_best,
        });
    }
}

impl<K: KeyValueStore> SessionController<ManualScheduler, K> {
    /// Move the virtual clock forward, firing every timer that comes due,
    /// including ticks re-armed along the way.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let target = self.scheduler.now().saturating_add(elapsed_ms);
        while let Some((token, task)) = self.scheduler.pop_due(target) {
            self.on_timer(token, task);
        }
        self.scheduler.set_now(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::SymbolId;

    fn controller() -> SessionController {
        SessionController::new(GameConfig::default().with_seed(42)).unwrap()
    }

    fn pair(game: &SessionController, token: u16) -> (InstanceId, InstanceId) {
        let ids = game.deck().unwrap().instances_of(SymbolId::new(token));
        (ids[0], ids[1])
    }

    #[test]
    fn test_idle_until_started() {
        let mut game = controller();
        assert_eq!(game.status(), SessionStatus::Idle);
        assert!(game.deck().is_none());
        assert_eq!(
            game.reveal(InstanceId(0)),
            RevealOutcome::Rejected(RejectReason::NotAcceptingInput)
        );
    }

    #[test]
    fn test_start_resets_counters() {
        let mut game = controller();
        game.start(Difficulty::Medium).unwrap();

        let session = game.session();
        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(session.pair_count, 4);
        assert_eq!(session.move_count, 0);
        assert_eq!(session.elapsed_seconds, 0);
        assert_eq!(game.deck().unwrap().len(), 8);
        assert_eq!(game.scheduler().pending_len(), 1);
    }

    #[test]
    fn test_clock_ticks_while_running() {
        let mut game = controller();
        game.start(Difficulty::Easy).unwrap();
        game.advance(2_500);
        assert_eq!(game.session().elapsed_seconds, 2);
        game.advance(500);
        assert_eq!(game.session().elapsed_seconds, 3);
    }

    #[test]
    fn test_mismatch_hides_after_delay() {
        let mut game = controller();
        game.start(Difficulty::Easy).unwrap();
        let (a, _) = pair(&game, 1);
        let (c, _) = pair(&game, 2);

        game.reveal(a);
        game.reveal(c);
        assert!(game.is_resolving());
        assert!(!game.is_accepting_input());

        game.advance(999);
        assert!(game.is_resolving());
        game.advance(1);
        assert!(!game.is_resolving());
        assert!(game.deck().unwrap().get(a).unwrap().is_face_down());
    }

    #[test]
    fn test_stale_timer_ignored_after_restart() {
        let mut game = controller();
        game.start(Difficulty::Easy).unwrap();
        let old_epoch = game.epoch();
        let (a, _) = pair(&game, 1);
        let (c, _) = pair(&game, 2);
        game.reveal(a);
        game.reveal(c);

        game.restart().unwrap();
        assert_eq!(game.epoch(), old_epoch + 1);

        // A late callback from the previous session is a no-op
        let (x, _) = pair(&game, 1);
        game.reveal(x);
        game.on_timer(TimerToken(1), TimerTask::new(TimerKind::HideMismatch, old_epoch));
        game.on_timer(TimerToken(0), TimerTask::new(TimerKind::ClockTick, old_epoch));
        assert_eq!(game.revealed(), &[x]);
        assert_eq!(game.session().elapsed_seconds, 0);
    }

    #[test]
    fn test_unarmed_token_ignored() {
        let mut game = controller();
        game.start(Difficulty::Easy).unwrap();
        game.on_timer(TimerToken(999), TimerTask::new(TimerKind::ClockTick, game.epoch()));
        assert_eq!(game.session().elapsed_seconds, 0);
    }

    #[test]
    fn test_restart_from_idle_uses_default() {
        let mut game = controller();
        game.restart().unwrap();
        assert_eq!(game.difficulty(), Some(Difficulty::Medium));
    }

    #[test]
    fn test_failed_start_keeps_previous_session() {
        let config = GameConfig::empty()
            .with_profile(
                Difficulty::Easy,
                GameConfig::default().profiles[&Difficulty::Easy].clone(),
            )
            .with_seed(1);
        let mut game = SessionController::new(config).unwrap();
        game.start(Difficulty::Easy).unwrap();
        let epoch = game.epoch();

        assert_eq!(
            game.change_difficulty(Difficulty::Hard),
            Err(GameError::UnknownDifficulty(Difficulty::Hard))
        );
        assert_eq!(game.epoch(), epoch);
        assert_eq!(game.difficulty(), Some(Difficulty::Easy));
        assert_eq!(game.status(), SessionStatus::Running);
        assert_eq!(game.scheduler().pending_len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        assert!(SessionController::new(GameConfig::empty()).is_err());
    }
}
