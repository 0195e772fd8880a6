//! Round logic for the Square Rush minigame.
//!
//! A [`RoundController`] owns the board state and advances it on every tick
//! delivered by an injected [`TickScheduler`]. Once the player or the miss
//! counter reaches the score threshold, the round is handed to a
//! [`ResultPresenter`] and the board is reset.

use log::{debug, info, warn};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::fmt;

pub mod config;
pub mod scheduler;
pub mod utils;

use config::{
    BOARD_SIZE, DEFAULT_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS,
    SCORE_THRESHOLD,
};

/// Visual status of a single cell. Earlier variants win when a cell
/// qualifies for more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStatus {
    Active,
    Expired,
    Success,
    Default,
}

impl CellStatus {
    /// CSS class used by the board view.
    pub fn css_class(self) -> &'static str {
        match self {
            CellStatus::Active => "cell-active",
            CellStatus::Expired => "cell-expired",
            CellStatus::Success => "cell-success",
            CellStatus::Default => "cell-default",
        }
    }
}

/// Final (or running) tally of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundResult {
    pub player_score: usize,
    pub miss_score: usize,
}

impl RoundResult {
    pub fn total(&self) -> usize {
        self.player_score + self.miss_score
    }

    pub fn player_won(&self) -> bool {
        self.player_score > self.miss_score
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    /// `start` was called while a round is in progress.
    AlreadyRunning,
    /// The tick interval cannot change while a round is in progress.
    IntervalLocked,
    InvalidInterval {
        value: u32,
        min: u32,
        max: u32,
    },
    EmptyBoard,
    ZeroThreshold,
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundError::AlreadyRunning => write!(f, "A round is already running"),
            RoundError::IntervalLocked => {
                write!(f, "Game speed cannot be changed while a round is running")
            }
            RoundError::InvalidInterval { value, min, max } => write!(
                f,
                "Game speed {} ms is out of range ({} to {} ms)",
                value, min, max
            ),
            RoundError::EmptyBoard => write!(f, "The board must have at least one cell"),
            RoundError::ZeroThreshold => write!(f, "The score threshold must be at least 1"),
        }
    }
}

impl std::error::Error for RoundError {}

/// Check that a tick interval lies inside the supported range.
pub fn check_tick_interval(interval_ms: u32) -> Result<u32, RoundError> {
    if (MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&interval_ms) {
        Ok(interval_ms)
    } else {
        Err(RoundError::InvalidInterval {
            value: interval_ms,
            min: MIN_TICK_INTERVAL_MS,
            max: MAX_TICK_INTERVAL_MS,
        })
    }
}

/// Board and round parameters. Only constructible in a valid shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundConfig {
    board_size: usize,
    score_threshold: usize,
    tick_interval_ms: u32,
}

impl RoundConfig {
    pub fn new(
        board_size: usize,
        score_threshold: usize,
        tick_interval_ms: u32,
    ) -> Result<Self, RoundError> {
        if board_size == 0 {
            return Err(RoundError::EmptyBoard);
        }
        if score_threshold == 0 {
            return Err(RoundError::ZeroThreshold);
        }
        let tick_interval_ms = check_tick_interval(tick_interval_ms)?;
        Ok(Self {
            board_size,
            score_threshold,
            tick_interval_ms,
        })
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn score_threshold(&self) -> usize {
        self.score_threshold
    }

    pub fn tick_interval_ms(&self) -> u32 {
        self.tick_interval_ms
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            board_size: BOARD_SIZE,
            score_threshold: SCORE_THRESHOLD,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

/// Periodic tick capability driving a round.
///
/// Implementations call back into [`RoundController::tick`] every
/// `interval_ms` until cancelled. Scheduling again replaces the previous
/// process, and no tick may be delivered after `cancel` returns.
pub trait TickScheduler {
    fn schedule(&mut self, interval_ms: u32);
    fn cancel(&mut self);
    fn is_scheduled(&self) -> bool;
}

/// Receives the tally of every finished round.
pub trait ResultPresenter {
    fn present(&mut self, result: RoundResult);
}

impl<F> ResultPresenter for F
where
    F: FnMut(RoundResult),
{
    fn present(&mut self, result: RoundResult) {
        self(result)
    }
}

/// Mutable state of the board.
///
/// `expired` and `success` keep one entry per miss or hit, so a cell that
/// is missed twice counts twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    active_index: Option<usize>,
    expired: Vec<usize>,
    success: Vec<usize>,
    running: bool,
    tick_interval_ms: u32,
}

impl RoundState {
    fn new(tick_interval_ms: u32) -> Self {
        Self {
            active_index: None,
            expired: Vec::new(),
            success: Vec::new(),
            running: false,
            tick_interval_ms,
        }
    }

    /// Status lookup with the fixed priority active > expired > success.
    pub fn status_of(&self, index: usize) -> CellStatus {
        if self.active_index == Some(index) {
            CellStatus::Active
        } else if self.expired.contains(&index) {
            CellStatus::Expired
        } else if self.success.contains(&index) {
            CellStatus::Success
        } else {
            CellStatus::Default
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn expired(&self) -> &[usize] {
        &self.expired
    }

    pub fn success(&self) -> &[usize] {
        &self.success
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_interval_ms(&self) -> u32 {
        self.tick_interval_ms
    }

    pub fn scores(&self) -> RoundResult {
        RoundResult {
            player_score: self.success.len(),
            miss_score: self.expired.len(),
        }
    }

    fn clear(&mut self) {
        self.active_index = None;
        self.expired.clear();
        self.success.clear();
    }
}

/// Owns a round and moves it between the stopped and running states.
pub struct RoundController<S, P, R = ThreadRng> {
    config: RoundConfig,
    state: RoundState,
    scheduler: S,
    presenter: P,
    rng: R,
}

impl<S, P> RoundController<S, P>
where
    S: TickScheduler,
    P: ResultPresenter,
{
    pub fn new(config: RoundConfig, scheduler: S, presenter: P) -> Self {
        Self::with_rng(config, scheduler, presenter, rand::rng())
    }
}

impl<S, P, R> RoundController<S, P, R>
where
    S: TickScheduler,
    P: ResultPresenter,
    R: Rng,
{
    pub fn with_rng(config: RoundConfig, scheduler: S, presenter: P, rng: R) -> Self {
        Self {
            state: RoundState::new(config.tick_interval_ms()),
            config,
            scheduler,
            presenter,
            rng,
        }
    }

    /// Start a round: highlight a random cell and schedule the ticks.
    pub fn start(&mut self) -> Result<(), RoundError> {
        if self.state.running {
            warn!("Start requested while a round is already running");
            return Err(RoundError::AlreadyRunning);
        }

        self.state.running = true;
        let first = self.random_index();
        self.state.active_index = Some(first);
        self.scheduler.schedule(self.state.tick_interval_ms);

        info!(
            "Round started: tick every {} ms, first active cell {}",
            self.state.tick_interval_ms, first
        );
        Ok(())
    }

    /// Advance the round by one tick.
    ///
    /// Returns the final tally when this tick ended the round. Ticks that
    /// arrive while stopped are ignored.
    pub fn tick(&mut self) -> Option<RoundResult> {
        if !self.state.running {
            debug!("Ignoring tick while no round is running");
            return None;
        }

        if let Some(missed) = self.state.active_index.take() {
            self.state.expired.push(missed);
        }
        let next = self.random_index();
        self.state.active_index = Some(next);

        let scores = self.state.scores();
        debug!(
            "Tick: active cell {}, player {} - misses {}",
            next, scores.player_score, scores.miss_score
        );

        let threshold = self.config.score_threshold();
        if scores.player_score >= threshold || scores.miss_score >= threshold {
            self.finish(scores);
            return Some(scores);
        }
        None
    }

    fn finish(&mut self, result: RoundResult) {
        info!(
            "Round finished: player {} - misses {}",
            result.player_score, result.miss_score
        );
        self.presenter.present(result);
        self.scheduler.cancel();
        self.state.clear();
        self.state.running = false;
    }

    pub fn cell_status(&self, index: usize) -> CellStatus {
        self.state.status_of(index)
    }

    /// Status of every cell in board order.
    pub fn statuses(&self) -> Vec<CellStatus> {
        (0..self.config.board_size())
            .map(|index| self.state.status_of(index))
            .collect()
    }

    /// Register a click. Only the active cell scores; returns whether it did.
    pub fn on_cell_click(&mut self, index: usize) -> bool {
        if self.state.active_index != Some(index) {
            return false;
        }
        self.state.active_index = None;
        self.state.success.push(index);
        debug!("Hit on cell {}", index);
        true
    }

    /// Change the game speed. Rejected while a round is running.
    pub fn set_tick_interval(&mut self, interval_ms: u32) -> Result<(), RoundError> {
        if self.state.running {
            warn!("Ignoring game speed change to {} ms during a round", interval_ms);
            return Err(RoundError::IntervalLocked);
        }
        self.state.tick_interval_ms = check_tick_interval(interval_ms)?;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn tick_interval_ms(&self) -> u32 {
        self.state.tick_interval_ms
    }

    pub fn active_index(&self) -> Option<usize> {
        self.state.active_index
    }

    pub fn player_score(&self) -> usize {
        self.state.success.len()
    }

    pub fn miss_score(&self) -> usize {
        self.state.expired.len()
    }

    pub fn scores(&self) -> RoundResult {
        self.state.scores()
    }

    pub fn board_size(&self) -> usize {
        self.config.board_size()
    }

    pub fn score_threshold(&self) -> usize {
        self.config.score_threshold()
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    fn random_index(&mut self) -> usize {
        self.rng.random_range(0..self.config.board_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct ManualScheduler {
        interval_ms: Option<u32>,
        schedule_calls: usize,
        cancel_calls: usize,
    }

    impl TickScheduler for ManualScheduler {
        fn schedule(&mut self, interval_ms: u32) {
            self.interval_ms = Some(interval_ms);
            self.schedule_calls += 1;
        }

        fn cancel(&mut self) {
            self.interval_ms = None;
            self.cancel_calls += 1;
        }

        fn is_scheduled(&self) -> bool {
            self.interval_ms.is_some()
        }
    }

    type Presented = Rc<RefCell<Vec<RoundResult>>>;
    type TestController = RoundController<ManualScheduler, Box<dyn FnMut(RoundResult)>, StdRng>;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn controller_with(config: RoundConfig, seed: u64) -> (TestController, Presented) {
        init_logging();
        let presented: Presented = Rc::new(RefCell::new(Vec::new()));
        let sink = presented.clone();
        let presenter: Box<dyn FnMut(RoundResult)> =
            Box::new(move |result| sink.borrow_mut().push(result));
        let controller = RoundController::with_rng(
            config,
            ManualScheduler::default(),
            presenter,
            StdRng::seed_from_u64(seed),
        );
        (controller, presented)
    }

    fn controller(seed: u64) -> (TestController, Presented) {
        controller_with(RoundConfig::default(), seed)
    }

    fn count(controller: &TestController, status: CellStatus) -> usize {
        controller
            .statuses()
            .into_iter()
            .filter(|s| *s == status)
            .count()
    }

    #[test]
    fn test_new_controller_is_stopped_and_blank() {
        let (c, _) = controller(1);
        assert!(!c.is_running());
        assert_eq!(c.active_index(), None);
        assert_eq!(c.tick_interval_ms(), DEFAULT_TICK_INTERVAL_MS);
        assert_eq!(count(&c, CellStatus::Default), BOARD_SIZE);
        assert!(!c.scheduler().is_scheduled());
    }

    #[test]
    fn test_start_activates_exactly_one_cell() {
        let (mut c, _) = controller(2);
        c.start().expect("start");

        assert!(c.is_running());
        assert_eq!(count(&c, CellStatus::Active), 1);
        assert_eq!(count(&c, CellStatus::Default), BOARD_SIZE - 1);
        let active = c.active_index().expect("active cell");
        assert!(active < BOARD_SIZE);
        assert_eq!(c.scheduler().interval_ms, Some(DEFAULT_TICK_INTERVAL_MS));
    }

    #[test]
    fn test_double_start_does_not_schedule_twice() {
        let (mut c, _) = controller(3);
        c.start().expect("start");
        let active = c.active_index();

        assert_eq!(c.start(), Err(RoundError::AlreadyRunning));
        assert_eq!(c.scheduler().schedule_calls, 1);
        assert_eq!(c.active_index(), active);
    }

    #[test]
    fn test_click_on_active_cell_scores() {
        let (mut c, _) = controller(4);
        c.start().expect("start");
        let active = c.active_index().expect("active cell");

        assert!(c.on_cell_click(active));
        assert_eq!(c.cell_status(active), CellStatus::Success);
        assert_eq!(c.active_index(), None);
        assert_eq!(c.player_score(), 1);
        assert_eq!(c.miss_score(), 0);

        // Nothing is active until the next tick.
        assert!(!c.on_cell_click(active));
        assert_eq!(c.player_score(), 1);
    }

    #[test]
    fn test_click_on_other_cell_is_ignored() {
        let (mut c, _) = controller(5);
        c.start().expect("start");
        let active = c.active_index().expect("active cell");
        let other = (active + 1) % BOARD_SIZE;

        assert!(!c.on_cell_click(other));
        assert!(!c.on_cell_click(BOARD_SIZE + 7));
        assert_eq!(c.active_index(), Some(active));
        assert_eq!(c.scores(), RoundResult::default());
    }

    #[test]
    fn test_click_before_start_is_ignored() {
        let (mut c, _) = controller(6);
        for index in 0..BOARD_SIZE {
            assert!(!c.on_cell_click(index));
        }
        assert_eq!(c.player_score(), 0);
    }

    #[test]
    fn test_tick_expires_unclicked_cell() {
        let (mut c, _) = controller(7);
        c.start().expect("start");
        let missed = c.active_index().expect("active cell");

        assert_eq!(c.tick(), None);
        assert_eq!(c.miss_score(), 1);
        assert_eq!(c.state().expired(), &[missed]);
        let next = c.active_index().expect("next active cell");
        if next != missed {
            assert_eq!(c.cell_status(missed), CellStatus::Expired);
        }
    }

    #[test]
    fn test_tick_after_click_counts_no_miss() {
        let (mut c, _) = controller(8);
        c.start().expect("start");
        let active = c.active_index().expect("active cell");
        c.on_cell_click(active);

        c.tick();
        assert_eq!(c.miss_score(), 0);
        assert!(c.active_index().is_some());
    }

    #[test]
    fn test_missed_cell_zero_is_counted() {
        let (mut c, _) = controller(9);
        c.start().expect("start");
        c.state.active_index = Some(0);

        c.tick();
        assert_eq!(c.state().expired(), &[0]);
        assert_eq!(c.miss_score(), 1);
    }

    #[test]
    fn test_status_priority() {
        let mut state = RoundState::new(DEFAULT_TICK_INTERVAL_MS);
        state.active_index = Some(3);
        state.expired = vec![3, 4];
        state.success = vec![3, 4, 5];

        assert_eq!(state.status_of(3), CellStatus::Active);
        assert_eq!(state.status_of(4), CellStatus::Expired);
        assert_eq!(state.status_of(5), CellStatus::Success);
        assert_eq!(state.status_of(6), CellStatus::Default);
        assert_eq!(state.status_of(BOARD_SIZE * 2), CellStatus::Default);
    }

    #[test]
    fn test_ten_misses_end_round() {
        let (mut c, presented) = controller(10);
        c.start().expect("start");

        for _ in 0..SCORE_THRESHOLD - 1 {
            assert_eq!(c.tick(), None);
            assert!(c.is_running());
        }
        assert!(presented.borrow().is_empty());

        let expected = RoundResult {
            player_score: 0,
            miss_score: SCORE_THRESHOLD,
        };
        assert_eq!(c.tick(), Some(expected));
        assert_eq!(*presented.borrow(), vec![expected]);
        assert!(!c.is_running());
        assert_eq!(c.scores(), RoundResult::default());
        assert_eq!(c.active_index(), None);
        assert_eq!(count(&c, CellStatus::Default), BOARD_SIZE);
        assert!(!c.scheduler().is_scheduled());
        assert_eq!(c.scheduler().cancel_calls, 1);
    }

    #[test]
    fn test_ten_hits_end_round() {
        let (mut c, presented) = controller(11);
        c.start().expect("start");

        for round in 1..=SCORE_THRESHOLD {
            let active = c.active_index().expect("active cell");
            assert!(c.on_cell_click(active));
            let outcome = c.tick();
            if round < SCORE_THRESHOLD {
                assert_eq!(outcome, None);
            } else {
                assert_eq!(
                    outcome,
                    Some(RoundResult {
                        player_score: SCORE_THRESHOLD,
                        miss_score: 0,
                    })
                );
            }
        }

        let presented = presented.borrow();
        assert_eq!(presented.len(), 1);
        assert!(presented[0].player_won());
        assert!(presented[0].miss_score < SCORE_THRESHOLD);
        assert!(!c.is_running());
        assert!(c.state().success().is_empty());
    }

    #[test]
    fn test_ticks_after_round_end_are_ignored() {
        let (mut c, presented) = controller(12);
        c.start().expect("start");
        while c.tick().is_none() {}

        for _ in 0..5 {
            assert_eq!(c.tick(), None);
        }
        assert_eq!(presented.borrow().len(), 1);
        assert_eq!(c.active_index(), None);
        assert_eq!(c.scores(), RoundResult::default());
    }

    #[test]
    fn test_round_can_restart_after_end() {
        let (mut c, presented) = controller(13);
        c.start().expect("start");
        while c.tick().is_none() {}

        c.start().expect("restart");
        assert!(c.is_running());
        assert_eq!(c.scheduler().schedule_calls, 2);
        assert_eq!(count(&c, CellStatus::Active), 1);
        while c.tick().is_none() {}
        assert_eq!(presented.borrow().len(), 2);
    }

    #[test]
    fn test_score_total_never_decreases_during_round() {
        let (mut c, presented) = controller(14);
        let mut play = StdRng::seed_from_u64(99);
        c.start().expect("start");

        let mut last_total = 0;
        loop {
            if play.random_bool(0.5) {
                if let Some(active) = c.active_index() {
                    c.on_cell_click(active);
                }
            }
            let total = c.scores().total();
            assert!(total >= last_total);
            last_total = total;

            if let Some(result) = c.tick() {
                assert!(
                    result.player_score == SCORE_THRESHOLD
                        || result.miss_score == SCORE_THRESHOLD
                );
                break;
            }
            let total = c.scores().total();
            assert!(total >= last_total);
            last_total = total;
        }
        assert_eq!(presented.borrow().len(), 1);
    }

    #[test]
    fn test_interval_locked_while_running() {
        let (mut c, _) = controller(15);
        c.set_tick_interval(500).expect("stopped round accepts speed");
        c.start().expect("start");
        assert_eq!(c.scheduler().interval_ms, Some(500));

        assert_eq!(c.set_tick_interval(250), Err(RoundError::IntervalLocked));
        assert_eq!(c.tick_interval_ms(), 500);

        while c.tick().is_none() {}
        c.set_tick_interval(250).expect("unlocked after round end");
        assert_eq!(c.tick_interval_ms(), 250);
    }

    #[test]
    fn test_interval_out_of_range_is_rejected() {
        let (mut c, _) = controller(16);
        assert!(matches!(
            c.set_tick_interval(MIN_TICK_INTERVAL_MS - 1),
            Err(RoundError::InvalidInterval { .. })
        ));
        assert!(matches!(
            c.set_tick_interval(MAX_TICK_INTERVAL_MS + 1),
            Err(RoundError::InvalidInterval { .. })
        ));
        assert_eq!(c.tick_interval_ms(), DEFAULT_TICK_INTERVAL_MS);
    }

    #[test]
    fn test_round_config_validation() {
        assert_eq!(RoundConfig::new(0, 10, 1000), Err(RoundError::EmptyBoard));
        assert_eq!(RoundConfig::new(100, 0, 1000), Err(RoundError::ZeroThreshold));
        assert!(matches!(
            RoundConfig::new(100, 10, 5),
            Err(RoundError::InvalidInterval { value: 5, .. })
        ));
        assert_eq!(RoundConfig::new(100, 10, 1000), Ok(RoundConfig::default()));
    }

    #[test]
    fn test_small_board_stays_in_range() {
        let config = RoundConfig::new(4, 2, 200).expect("config");
        let (mut c, presented) = controller_with(config, 17);
        c.start().expect("start");
        assert_eq!(c.statuses().len(), 4);

        while c.tick().is_none() {
            assert!(c.active_index().expect("active cell") < 4);
        }
        assert_eq!(
            *presented.borrow(),
            vec![RoundResult {
                player_score: 0,
                miss_score: 2,
            }]
        );
    }
}
