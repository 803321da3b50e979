//! PointStatsListener - per-frame point cloud statistics

use contracts::{ListeningType, MessageListener, PointResult};
use tracing::info;

/// Listener that summarizes every point result: cloud count, total points
/// and the intensity distribution.
///
/// The mask is pinned to `POINT_RESULT`.
pub struct PointStatsListener {
    name: String,
    results_seen: u64,
    total_points: u64,
}

impl PointStatsListener {
    /// Create a new PointStatsListener with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results_seen: 0,
            total_points: 0,
        }
    }

    /// Number of point results seen so far
    pub fn results_seen(&self) -> u64 {
        self.results_seen
    }

    /// Total points across all results seen so far
    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    fn log_stats(&self, result: &PointResult) {
        let mut intensities: Vec<f32> = result
            .clouds
            .iter()
            .flat_map(|cloud| cloud.intensity_values())
            .collect();

        if intensities.is_empty() {
            info!(
                listener = %self.name,
                timestamp = result.timestamp,
                clouds = result.clouds.len(),
                points = result.total_points(),
                "point stats"
            );
            return;
        }

        intensities.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let min = intensities[0];
        let median = intensities[intensities.len() / 2];
        let max = intensities[intensities.len() - 1];

        info!(
            listener = %self.name,
            timestamp = result.timestamp,
            clouds = result.clouds.len(),
            points = result.total_points(),
            intensity_min = min,
            intensity_median = median,
            intensity_max = max,
            "point stats"
        );
    }
}

impl MessageListener for PointStatsListener {
    fn subscriptions(&self) -> ListeningType {
        ListeningType::POINT_RESULT
    }

    fn on_point_result(&mut self, result: &PointResult) {
        self.results_seen += 1;
        self.total_points += result.total_points() as u64;
        self.log_stats(result);
    }
}
