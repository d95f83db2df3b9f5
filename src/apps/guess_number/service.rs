use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::observable::StateStore;

/// Score keeping for the guessing game.
///
/// One service per mini-app instance, shared by every view of that instance.
/// `best_score` is `None` until a round has been won.
pub struct GuessNumberService {
    attempts: AtomicU32,
    best_score: StateStore<Option<u32>>,
}

impl Default for GuessNumberService {
    fn default() -> Self {
        Self::new()
    }
}

impl GuessNumberService {
    pub fn new() -> Self {
        Self {
            attempts: AtomicU32::new(0),
            best_score: StateStore::new(None),
        }
    }

    pub fn best_score(&self) -> watch::Receiver<Option<u32>> {
        self.best_score.subscribe()
    }

    pub fn current_best_score(&self) -> Option<u32> {
        self.best_score.get()
    }

    pub fn add_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Counts the winning attempt, folds the round into the best score and
    /// starts a new round. Returns the attempts of the finished round.
    pub fn update_game_results(&self) -> u32 {
        self.add_attempt();
        let attempts = self.attempts.swap(0, Ordering::SeqCst);
        self.best_score.update(|best| {
            *best = Some(best.map_or(attempts, |best| best.min(attempts)));
        });
        debug!(
            "Round finished in {} attempts, best {:?}",
            attempts,
            self.best_score.get()
        );
        attempts
    }

    pub fn reset_game_stats(&self) {
        self.attempts.store(0, Ordering::SeqCst);
        self.best_score.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_win_sets_best_score() {
        let service = GuessNumberService::new();
        service.add_attempt();
        service.add_attempt();
        service.add_attempt();

        assert_eq!(service.update_game_results(), 4);
        assert_eq!(service.current_best_score(), Some(4));
        assert_eq!(service.current_attempts(), 0);
    }

    #[test]
    fn test_best_score_keeps_minimum() {
        let service = GuessNumberService::new();
        service.add_attempt();
        service.update_game_results();
        assert_eq!(service.current_best_score(), Some(2));

        for _ in 0..5 {
            service.add_attempt();
        }
        assert_eq!(service.update_game_results(), 6);
        assert_eq!(service.current_best_score(), Some(2));

        assert_eq!(service.update_game_results(), 1);
        assert_eq!(service.current_best_score(), Some(1));
    }

    #[test]
    fn test_reset_clears_stats() {
        let service = GuessNumberService::new();
        service.add_attempt();
        service.update_game_results();
        service.add_attempt();

        service.reset_game_stats();
        assert_eq!(service.current_attempts(), 0);
        assert_eq!(service.current_best_score(), None);
    }

    #[tokio::test]
    async fn test_best_score_is_observable() {
        let service = GuessNumberService::new();
        let mut rx = service.best_score();
        assert_eq!(*rx.borrow_and_update(), None);

        service.update_game_results();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Some(1));
    }
}
