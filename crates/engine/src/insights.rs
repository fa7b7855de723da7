//! Summary statistics over a finished recommendation list, for the
//! presentation layer's "why these picks" panel.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use scoring::{Category, Recommendation};
use store::GenreId;

/// Coarse trust band over the whole list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Aggregate view of one recommendation run
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationInsights {
    pub total: usize,
    pub average_match: f32,
    pub average_confidence: f32,
    pub confidence_level: ConfidenceLevel,
    pub category_distribution: HashMap<Category, usize>,
    /// Distinct genres over total genre mentions, 0-1
    pub diversity_score: f32,
    /// Mean novelty of the listed items, 0-100
    pub novelty_balance: f32,
    /// Share of items rated 7.5 or better, 0-1
    pub quality_share: f32,
}

impl RecommendationInsights {
    pub fn from_recommendations(recs: &[Recommendation]) -> Self {
        if recs.is_empty() {
            return Self {
                total: 0,
                average_match: 0.0,
                average_confidence: 0.0,
                confidence_level: ConfidenceLevel::Low,
                category_distribution: HashMap::new(),
                diversity_score: 0.0,
                novelty_balance: 0.0,
                quality_share: 0.0,
            };
        }

        let total = recs.len();
        let average_match =
            recs.iter().map(|r| r.match_score as f32).sum::<f32>() / total as f32;
        let average_confidence = recs.iter().map(|r| r.confidence).sum::<f32>() / total as f32;

        let mut category_distribution: HashMap<Category, usize> = HashMap::new();
        for rec in recs {
            *category_distribution.entry(rec.category).or_insert(0) += 1;
        }

        let mut distinct: HashSet<GenreId> = HashSet::new();
        let mut mentions = 0usize;
        for rec in recs {
            mentions += rec.item.genres.len();
            distinct.extend(&rec.item.genres);
        }
        let diversity_score = if mentions == 0 {
            0.0
        } else {
            distinct.len() as f32 / mentions as f32
        };

        let novelty_balance =
            recs.iter().map(|r| r.metadata.novelty_score).sum::<f32>() / total as f32;
        let quality_share =
            recs.iter().filter(|r| r.item.rating >= 7.5).count() as f32 / total as f32;

        Self {
            total,
            average_match,
            average_confidence,
            confidence_level: match average_confidence {
                c if c >= 0.7 => ConfidenceLevel::High,
                c if c >= 0.4 => ConfidenceLevel::Medium,
                _ => ConfidenceLevel::Low,
            },
            category_distribution,
            diversity_score,
            novelty_balance,
            quality_share,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoring::{FactorBreakdown, RecMetadata, Reasoning};
    use store::{CatalogItem, ContentKind, Credits};

    fn rec(id: u32, match_score: u8, confidence: f32, rating: f32) -> Recommendation {
        let item = CatalogItem {
            id,
            kind: ContentKind::Movie,
            title: format!("Item {id}"),
            genres: vec![id % 3],
            release_year: Some(2020),
            rating,
            credits: Credits::default(),
            companies: vec![],
        };
        Recommendation {
            metadata: RecMetadata::for_item(&item, 2023),
            item,
            match_score,
            confidence,
            factors: FactorBreakdown::default(),
            reasoning: Reasoning::default(),
            category: Category::Discovery,
            priority: 100,
        }
    }

    #[test]
    fn test_empty_list_yields_low_confidence_zeroes() {
        let insights = RecommendationInsights::from_recommendations(&[]);
        assert_eq!(insights.total, 0);
        assert_eq!(insights.confidence_level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_averages_and_distribution() {
        let recs = vec![rec(1, 80, 0.8, 8.0), rec(2, 60, 0.6, 6.0)];
        let insights = RecommendationInsights::from_recommendations(&recs);
        assert_eq!(insights.total, 2);
        assert!((insights.average_match - 70.0).abs() < f32::EPSILON);
        assert_eq!(insights.confidence_level, ConfidenceLevel::High);
        assert_eq!(insights.category_distribution[&Category::Discovery], 2);
        assert!((insights.quality_share - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_diversity_counts_distinct_genres() {
        // genres 1, 2, 0 over three single-genre items
        let recs = vec![rec(1, 80, 0.5, 7.0), rec(2, 80, 0.5, 7.0), rec(3, 80, 0.5, 7.0)];
        let insights = RecommendationInsights::from_recommendations(&recs);
        assert!((insights.diversity_score - 1.0).abs() < f32::EPSILON);
    }
}
