use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use rand::Rng;
use tokio::sync::watch;
use tracing::debug;

use crate::{config::GuessNumberConfig, observable::StateStore};

use super::service::GuessNumberService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    TooLow,
    TooHigh,
    Correct { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessResult {
    pub guess: u32,
    pub outcome: GuessOutcome,
}

impl GuessResult {
    pub fn message(&self) -> String {
        match self.outcome {
            GuessOutcome::TooLow => format!("{} - Too low! Try again?", self.guess),
            GuessOutcome::TooHigh => format!("{} - Too high! Try again?", self.guess),
            GuessOutcome::Correct { attempts } => format!(
                "Congratulations! You guessed the number in {} attempts.",
                attempts
            ),
        }
    }
}

/// Game logic behind the full-screen controller. Each controller gets its own
/// view-model (own secret number) over the instance's shared service.
pub struct GuessNumberViewModel {
    service: Arc<GuessNumberService>,
    range: GuessNumberConfig,
    target: AtomicU32,
    last_result: StateStore<Option<GuessResult>>,
}

impl GuessNumberViewModel {
    pub fn new(service: Arc<GuessNumberService>, range: GuessNumberConfig) -> Self {
        let target = draw_target(&range);
        Self::with_target(service, range, target)
    }

    pub fn with_target(
        service: Arc<GuessNumberService>,
        range: GuessNumberConfig,
        target: u32,
    ) -> Self {
        Self {
            service,
            range,
            target: AtomicU32::new(target),
            last_result: StateStore::new(None),
        }
    }

    pub fn range(&self) -> &GuessNumberConfig {
        &self.range
    }

    pub fn service(&self) -> &Arc<GuessNumberService> {
        &self.service
    }

    pub fn results(&self) -> watch::Receiver<Option<GuessResult>> {
        self.last_result.subscribe()
    }

    pub fn last_result(&self) -> Option<GuessResult> {
        self.last_result.get()
    }

    pub fn make_guess(&self, guess: u32) -> GuessOutcome {
        let target = self.target.load(Ordering::SeqCst);
        let outcome = if guess < target {
            self.service.add_attempt();
            GuessOutcome::TooLow
        } else if guess > target {
            self.service.add_attempt();
            GuessOutcome::TooHigh
        } else {
            let attempts = self.service.update_game_results();
            // 次のラウンド用に新しい数字を選ぶ
            self.target.store(draw_target(&self.range), Ordering::SeqCst);
            GuessOutcome::Correct { attempts }
        };
        debug!("guess {} -> {:?}", guess, outcome);
        self.last_result.set(Some(GuessResult { guess, outcome }));
        outcome
    }
}

fn draw_target(range: &GuessNumberConfig) -> u32 {
    let (low, high) = if range.min <= range.max {
        (range.min, range.max)
    } else {
        (range.max, range.min)
    };
    rand::thread_rng().gen_range(low..=high)
}
