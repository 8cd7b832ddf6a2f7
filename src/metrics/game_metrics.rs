use std::time::{Duration, Instant};

use crate::game::{Phase, ScoreState};

/// Per-session statistics shown next to the board
pub struct GameMetrics {
    last_update: Instant,
    /// Time spent running in the current game; pauses do not count
    pub elapsed_time: Duration,
    pub high_score: i32,
    /// Most rewards eaten in one game
    pub most_eaten: i32,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            elapsed_time: Duration::ZERO,
            high_score: 0,
            most_eaten: 0,
            games_played: 0,
        }
    }

    pub fn update(&mut self, phase: Phase) {
        let now = Instant::now();
        if phase == Phase::Running {
            self.elapsed_time += now - self.last_update;
        }
        self.last_update = now;
    }

    pub fn on_game_start(&mut self) {
        self.last_update = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, final_score: &ScoreState) {
        self.games_played += 1;
        self.high_score = self.high_score.max(final_score.score);
        self.most_eaten = self.most_eaten.max(final_score.fruits_eaten);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_best_results_are_kept() {
        let mut metrics = GameMetrics::new();
        let result = |score, fruits_eaten| ScoreState {
            score,
            fruits_eaten,
            next_reward: 10,
        };

        metrics.on_game_over(&result(300, 4));
        assert_eq!((metrics.high_score, metrics.most_eaten), (300, 4));

        // a lower score with more rewards eaten
        metrics.on_game_over(&result(120, 9));
        assert_eq!((metrics.high_score, metrics.most_eaten), (300, 9));

        metrics.on_game_over(&result(450, 2));
        assert_eq!((metrics.high_score, metrics.most_eaten), (450, 9));
        assert_eq!(metrics.games_played, 3);
    }

    #[test]
    fn test_paused_time_is_not_counted() {
        let mut metrics = GameMetrics::new();
        std::thread::sleep(Duration::from_millis(30));
        metrics.update(Phase::Paused);
        assert_eq!(metrics.elapsed_time, Duration::ZERO);

        std::thread::sleep(Duration::from_millis(30));
        metrics.update(Phase::Running);
        assert!(metrics.elapsed_time.as_millis() >= 30);
    }

    #[test]
    fn test_game_start_resets_time() {
        let mut metrics = GameMetrics::new();
        std::thread::sleep(Duration::from_millis(50));
        metrics.update(Phase::Running);
        assert!(metrics.elapsed_time.as_millis() >= 50);

        metrics.on_game_start();
        metrics.update(Phase::Running);
        assert!(metrics.elapsed_time.as_millis() < 50);
    }
}
