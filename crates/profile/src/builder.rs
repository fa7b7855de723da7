//! The Profile Builder: rating history in, taste profile out.
//!
//! `build` is a pure function of the current rating history, the following
//! state and an explicit `now`; running it twice on the same inputs yields
//! the same output. It never fails: every sub-metric falls back to a
//! documented neutral value when its sample is empty, so an empty history
//! produces the neutral "new user" profile rather than an error.

use std::collections::HashMap;

use tracing::debug;

use store::{CompanyId, ContentKind, GenreId, PersonId, RatingEvent, Timestamp, DAY_SECS};

use crate::types::{
    BehavioralMetrics, CreatorAffinity, CreatorRole, DecadeBucket, FollowingState, GenreAffinity,
    KindSplit, ProfileMetrics, QualityProfile, RatingPattern, SocialMetrics, StudioAffinity,
    Trend, UserTasteProfile,
};

/// Recency boundary for genre trend analysis
const TREND_WINDOW: i64 = 90 * DAY_SECS;

/// Activity window for the rating-frequency metric
const ACTIVITY_WINDOW: i64 = 30 * DAY_SECS;

/// Seconds in an average year, for deriving the calendar year of an event
const YEAR_SECS: i64 = 31_557_600;

/// Build a fresh profile snapshot from the rating history.
///
/// Events are processed in timestamp order regardless of input order, so
/// the incremental genre preferences come out the same for any permutation
/// of the same history.
pub fn build(
    history: &[RatingEvent],
    following: &FollowingState,
    now: Timestamp,
) -> UserTasteProfile {
    let mut events: Vec<&RatingEvent> = history.iter().collect();
    events.sort_by_key(|e| (e.timestamp, e.item_id));

    let genre_affinities = build_genre_affinities(&events, now);
    let quality = build_quality_profile(&events);
    let temporal = build_temporal_preferences(&events);
    let kind_split = build_kind_split(&events);
    let (creators, studios) = build_creator_affinities(&events);
    let behavioral = build_behavioral_metrics(&events, &quality, now);
    let social = build_social_metrics(following, &creators);
    let metrics = build_profile_metrics(&events, &genre_affinities, &creators, following, now);

    debug!(
        ratings = events.len(),
        genres = genre_affinities.len(),
        creators = creators.len(),
        completeness = metrics.completeness,
        "built taste profile"
    );

    UserTasteProfile {
        genre_affinities,
        quality,
        temporal,
        kind_split,
        creators,
        studios,
        behavioral,
        social,
        metrics,
    }
}

/// Fold the history in order, nudging each touched genre's preference
/// toward the extremes. The nudge is damped by the remaining headroom
/// (`1 - |pref - 5| / 5`) so the score approaches the 1-10 bounds
/// continuously instead of clamping.
fn incremental_genre_prefs(events: &[&RatingEvent]) -> HashMap<GenreId, f32> {
    let mut prefs: HashMap<GenreId, f32> = HashMap::new();
    for event in events {
        let score = event.score.simple_equivalent();
        let adjustment = if score >= 8.0 {
            1.5
        } else if score >= 6.0 {
            0.8
        } else if score >= 4.0 {
            0.2
        } else if score >= 2.0 {
            -0.5
        } else {
            -1.0
        };
        for genre in &event.genres {
            let pref = prefs.entry(*genre).or_insert(5.0);
            let damped = adjustment * (1.0 - (*pref - 5.0).abs() / 5.0);
            *pref = (*pref + damped).clamp(1.0, 10.0);
        }
    }
    prefs
}

fn build_genre_affinities(
    events: &[&RatingEvent],
    now: Timestamp,
) -> HashMap<GenreId, GenreAffinity> {
    let prefs = incremental_genre_prefs(events);
    let recency_boundary = now - TREND_WINDOW;

    let mut affinities = HashMap::new();
    for (&genre, &pref) in &prefs {
        let touching: Vec<&&RatingEvent> =
            events.iter().filter(|e| e.genres.contains(&genre)).collect();
        if touching.is_empty() {
            continue;
        }

        let scores: Vec<f32> = touching.iter().map(|e| e.score.percent()).collect();
        let mean_pct = mean(&scores);

        // Compare the last 90 days against everything before; an empty
        // side inherits the overall mean so it reads as stable
        let recent: Vec<f32> = touching
            .iter()
            .filter(|e| e.timestamp > recency_boundary)
            .map(|e| e.score.percent())
            .collect();
        let older: Vec<f32> = touching
            .iter()
            .filter(|e| e.timestamp <= recency_boundary)
            .map(|e| e.score.percent())
            .collect();
        let recent_avg = if recent.is_empty() { mean_pct } else { mean(&recent) };
        let older_avg = if older.is_empty() { mean_pct } else { mean(&older) };

        let trend = if recent_avg > older_avg + 5.0 {
            Trend::Increasing
        } else if recent_avg < older_avg - 5.0 {
            Trend::Decreasing
        } else {
            Trend::Stable
        };

        affinities.insert(
            genre,
            GenreAffinity {
                // Anchor the mean at 5 = neutral and add the accumulated
                // incremental preference rather than replacing it
                score: (pref + (mean_pct - 50.0) / 10.0).clamp(1.0, 10.0),
                confidence: (touching.len() as f32 / 5.0).min(1.0),
                sample_size: touching.len(),
                trend,
                last_touched: touching.iter().map(|e| e.timestamp).max().unwrap_or(now),
            },
        );
    }
    affinities
}

/// Mean and variance need the whole sample, so the quality profile is
/// recomputed fully on each build rather than patched incrementally
fn build_quality_profile(events: &[&RatingEvent]) -> QualityProfile {
    let scores: Vec<f32> = events.iter().map(|e| e.score.percent()).collect();
    if scores.is_empty() {
        return QualityProfile::default();
    }

    let avg = mean(&scores);
    let var = variance(&scores, avg);
    let std_dev = var.sqrt();

    let high = scores.iter().filter(|&&s| s >= 70.0).count() as f32;
    let low = scores.iter().filter(|&&s| s <= 40.0).count() as f32;
    let total = scores.len() as f32;

    let pattern = if high / total > 0.6 {
        RatingPattern::Generous
    } else if low / total > 0.4 {
        RatingPattern::Critical
    } else {
        RatingPattern::Balanced
    };

    QualityProfile {
        average_rating: avg,
        variance: var,
        preferred_range: ((avg - std_dev).max(0.0), (avg + std_dev).min(100.0)),
        pattern,
    }
}

fn build_temporal_preferences(events: &[&RatingEvent]) -> HashMap<u16, DecadeBucket> {
    let mut sums: HashMap<u16, (f32, usize)> = HashMap::new();
    for event in events {
        if let Some(year) = event.release_year {
            let decade = (year / 10) * 10;
            let entry = sums.entry(decade).or_insert((0.0, 0));
            entry.0 += event.score.percent();
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(decade, (sum, count))| {
            let avg = sum / count as f32;
            (
                decade,
                DecadeBucket {
                    score: avg,
                    count,
                    average_rating: avg,
                },
            )
        })
        .collect()
}

fn build_kind_split(events: &[&RatingEvent]) -> KindSplit {
    let movies = events.iter().filter(|e| e.kind == ContentKind::Movie).count();
    let total = events.len();
    if total == 0 {
        return KindSplit::default();
    }
    let movie = movies as f32 / total as f32 * 100.0;
    KindSplit {
        movie,
        series: 100.0 - movie,
    }
}

/// One detailed rating fans out to several affinities at once: top-billed
/// cast get the acting component, directors the direction component,
/// writers the screenplay component and production companies the overall
fn build_creator_affinities(
    events: &[&RatingEvent],
) -> (
    HashMap<PersonId, CreatorAffinity>,
    HashMap<CompanyId, StudioAffinity>,
) {
    let mut creators: HashMap<PersonId, CreatorAffinity> = HashMap::new();
    let mut studios: HashMap<CompanyId, StudioAffinity> = HashMap::new();

    for event in events {
        let (acting, screenplay, direction, overall) = match event.score {
            store::RatingScore::Detailed {
                overall,
                acting,
                screenplay,
                direction,
            } => (acting, screenplay, direction, overall),
            // Simple ratings carry no per-component signal
            store::RatingScore::Simple(_) => continue,
        };

        for (person, role, component) in event
            .credits
            .billed_cast()
            .iter()
            .map(|p| (p, CreatorRole::Actor, acting))
            .chain(
                event
                    .credits
                    .directors
                    .iter()
                    .map(|p| (p, CreatorRole::Director, direction)),
            )
            .chain(
                event
                    .credits
                    .writers
                    .iter()
                    .map(|p| (p, CreatorRole::Writer, screenplay)),
            )
        {
            let affinity = creators.entry(person.id).or_insert_with(|| CreatorAffinity {
                id: person.id,
                name: person.name.clone(),
                role,
                average_rating: 0.0,
                total_ratings: 0,
            });
            let new_total = affinity.total_ratings + 1;
            affinity.average_rating = (affinity.average_rating * affinity.total_ratings as f32
                + component as f32)
                / new_total as f32;
            affinity.total_ratings = new_total;
        }

        for company in &event.companies {
            let affinity = studios.entry(company.id).or_insert_with(|| StudioAffinity {
                id: company.id,
                name: company.name.clone(),
                average_rating: 0.0,
                total_ratings: 0,
            });
            let new_total = affinity.total_ratings + 1;
            affinity.average_rating = (affinity.average_rating * affinity.total_ratings as f32
                + overall as f32)
                / new_total as f32;
            affinity.total_ratings = new_total;
        }
    }

    (creators, studios)
}

fn build_behavioral_metrics(
    events: &[&RatingEvent],
    quality: &QualityProfile,
    now: Timestamp,
) -> BehavioralMetrics {
    if events.is_empty() {
        return BehavioralMetrics::default();
    }

    let recent = events
        .iter()
        .filter(|e| e.timestamp > now - ACTIVITY_WINDOW)
        .count();
    let rating_frequency = recent as f32 / 30.0;

    let detailed = events.iter().filter(|e| e.score.is_detailed()).count();
    let detailed_ratio = detailed as f32 / events.len() as f32 * 100.0;

    let unique_genres: std::collections::HashSet<GenreId> =
        events.iter().flat_map(|e| e.genres.iter().copied()).collect();
    let exploration_tendency = (unique_genres.len() as f32 / 15.0).min(1.0) * 100.0;

    let consistency = (100.0 - quality.variance.sqrt()).max(0.0);

    // Share of ratings given to items at most 2 years old at rating time.
    // No known release years leaves the bias at the neutral 50.
    let with_year: Vec<&&RatingEvent> =
        events.iter().filter(|e| e.release_year.is_some()).collect();
    let recency_bias = if with_year.is_empty() {
        50.0
    } else {
        let fresh = with_year
            .iter()
            .filter(|e| {
                let rated_year = year_of(e.timestamp);
                let release = e.release_year.unwrap_or(rated_year);
                rated_year.saturating_sub(release) <= 2
            })
            .count();
        fresh as f32 / with_year.len() as f32 * 100.0
    };

    BehavioralMetrics {
        rating_frequency,
        detailed_ratio,
        exploration_tendency,
        consistency,
        recency_bias,
    }
}

fn build_social_metrics(
    following: &FollowingState,
    creators: &HashMap<PersonId, CreatorAffinity>,
) -> SocialMetrics {
    let following_count = following.creators.len() + following.studios.len();

    let followed: Vec<&CreatorAffinity> = following
        .creators
        .iter()
        .filter_map(|id| creators.get(id))
        .collect();

    let roles: std::collections::HashSet<CreatorRole> =
        followed.iter().map(|c| c.role).collect();
    let diversity_index = roles.len() as f32 / 3.0 * 100.0;

    let influence_score = if followed.is_empty() {
        0.0
    } else {
        followed.iter().map(|c| c.average_rating).sum::<f32>() / followed.len() as f32
    };

    SocialMetrics {
        following_count,
        diversity_index,
        influence_score,
    }
}

fn build_profile_metrics(
    events: &[&RatingEvent],
    genres: &HashMap<GenreId, GenreAffinity>,
    creators: &HashMap<PersonId, CreatorAffinity>,
    following: &FollowingState,
    now: Timestamp,
) -> ProfileMetrics {
    let ratings = events.len();
    let genre_count = genres.len();
    let creator_count = creators.len();
    let following_count = following.creators.len() + following.studios.len();

    // Each contribution saturates at its cap so one dimension cannot
    // carry the whole score
    let completeness = ((ratings.min(20) as f32 / 20.0) * 0.4
        + (genre_count.min(15) as f32 / 15.0) * 0.3
        + (creator_count.min(10) as f32 / 10.0) * 0.2
        + (following_count.min(5) as f32 / 5.0) * 0.1)
        .min(1.0)
        * 100.0;

    let detailed = events.iter().filter(|e| e.score.is_detailed()).count();
    let detailed_ratio = if ratings > 0 {
        detailed as f32 / ratings as f32
    } else {
        0.0
    };
    let reliability = ((ratings.min(10) as f32 / 10.0) * 0.5
        + detailed_ratio * 0.3
        + (genre_count.min(10) as f32 / 10.0) * 0.2)
        .min(1.0)
        * 100.0;

    ProfileMetrics {
        completeness: completeness.clamp(0.0, 100.0),
        reliability: reliability.clamp(0.0, 100.0),
        data_points: ratings + genre_count + creator_count + following_count,
        last_updated: events.iter().map(|e| e.timestamp).max().unwrap_or(now),
    }
}

fn year_of(timestamp: Timestamp) -> u16 {
    (1970 + timestamp / YEAR_SECS) as u16
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

fn variance(values: &[f32], mean: f32) -> f32 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32
}
