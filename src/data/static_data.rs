//! Bundled talent data catalog.
//!
//! Static stand-in for a national assessment backend. Values are fixed at
//! compile time and identical on every run; the screens treat this source
//! no differently than they would a live one.

use super::{
    Achievement, AssignedTest, LeaderboardEntry, MonthScore, PerformanceAxis, StatCard,
    TalentData, TestStatus,
};

/// The bundled catalog.
pub struct StaticTalentData;

impl TalentData for StaticTalentData {
    fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        vec![
            LeaderboardEntry { rank: 1, previous_rank: 2, name: "Rajesh Kumar", location: "Delhi", sport: "Athletics", score: 98 },
            LeaderboardEntry { rank: 2, previous_rank: 1, name: "Priya Sharma", location: "Mumbai", sport: "Swimming", score: 95 },
            LeaderboardEntry { rank: 3, previous_rank: 4, name: "Arjun Singh", location: "Bangalore", sport: "Athletics", score: 93 },
            LeaderboardEntry { rank: 4, previous_rank: 3, name: "Sneha Patel", location: "Ahmedabad", sport: "Gymnastics", score: 91 },
            LeaderboardEntry { rank: 5, previous_rank: 6, name: "Vikram Reddy", location: "Hyderabad", sport: "Football", score: 89 },
            LeaderboardEntry { rank: 6, previous_rank: 5, name: "Anita Gupta", location: "Pune", sport: "Basketball", score: 87 },
        ]
    }

    fn achievements(&self) -> Vec<Achievement> {
        vec![
            Achievement { title: "First Steps", category: "Beginner", points: 10, earned: true, progress: None },
            Achievement { title: "Consistent Performer", category: "Dedication", points: 25, earned: true, progress: None },
            Achievement { title: "Speed Demon", category: "Performance", points: 50, earned: true, progress: None },
            Achievement { title: "Endurance King", category: "Strength", points: 75, earned: false, progress: Some(87) },
            Achievement { title: "Jump Master", category: "Athletics", points: 60, earned: false, progress: Some(43) },
            Achievement { title: "Perfect Score", category: "Excellence", points: 100, earned: false, progress: Some(12) },
        ]
    }

    fn dashboard_stats(&self) -> Vec<StatCard> {
        vec![
            StatCard { label: "Total Assessments", value: 24, trend: "+12%" },
            StatCard { label: "Average Score", value: 87, trend: "+5%" },
            StatCard { label: "Global Rank", value: 1247, trend: "-23" },
            StatCard { label: "Streak Days", value: 7, trend: "+2" },
        ]
    }

    fn score_trend(&self) -> Vec<MonthScore> {
        vec![
            MonthScore { month: "Jan", score: 65 },
            MonthScore { month: "Feb", score: 72 },
            MonthScore { month: "Mar", score: 78 },
            MonthScore { month: "Apr", score: 85 },
            MonthScore { month: "May", score: 87 },
        ]
    }

    fn performance_profile(&self) -> Vec<PerformanceAxis> {
        vec![
            PerformanceAxis { label: "Push-ups", score: 87 },
            PerformanceAxis { label: "Sit-ups", score: 72 },
            PerformanceAxis { label: "Jump", score: 81 },
            PerformanceAxis { label: "Sprint", score: 92 },
            PerformanceAxis { label: "Pull-ups", score: 83 },
        ]
    }

    fn assigned_tests(&self) -> Vec<AssignedTest> {
        vec![
            AssignedTest { name: "Push-ups Endurance", assigned: Some("2024-09-12"), status: TestStatus::Completed, score: Some(92) },
            AssignedTest { name: "Vertical Jump", assigned: Some("2025-09-12"), status: TestStatus::Pending, score: None },
            AssignedTest { name: "Sit-ups Challenge", assigned: Some("2025-09-12"), status: TestStatus::InProgress, score: None },
            AssignedTest { name: "Push-ups", assigned: Some("2025-09-12"), status: TestStatus::InProgress, score: None },
            AssignedTest { name: "Sprint Analysis", assigned: None, status: TestStatus::Upcoming, score: None },
        ]
    }

    fn quotes(&self) -> Vec<&'static str> {
        vec![
            "Champions keep playing until they get it right!",
            "Your only limit is your mind. Push beyond!",
            "Success starts with self-discipline",
            "Dream big, work hard, stay focused!",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_is_rank_ordered_with_descending_scores() {
        let entries = StaticTalentData.leaderboard();
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.rank, i as u32 + 1);
        }
        for pair in entries.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_rank_movement() {
        let entries = StaticTalentData.leaderboard();
        // Rajesh climbed from 2 to 1, Priya dropped from 1 to 2
        assert_eq!(entries[0].movement(), 1);
        assert_eq!(entries[1].movement(), -1);
    }

    #[test]
    fn test_earned_achievements_carry_no_progress() {
        for achievement in StaticTalentData.achievements() {
            if achievement.earned {
                assert!(achievement.progress.is_none(), "{}", achievement.title);
            } else {
                assert!(achievement.progress.is_some(), "{}", achievement.title);
            }
        }
    }

    #[test]
    fn test_earned_points_total() {
        let total: u32 = StaticTalentData
            .achievements()
            .iter()
            .filter(|a| a.earned)
            .map(|a| a.points)
            .sum();
        assert_eq!(total, 85);
    }

    #[test]
    fn test_stat_trend_direction() {
        let stats = StaticTalentData.dashboard_stats();
        assert!(stats[0].trending_up());
        assert!(!stats[2].trending_up());
    }
}
