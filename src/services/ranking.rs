use crate::{
    models::{CandidateRow, Prediction, Recommendation, UserPreference},
    services::event_store::EventStore,
};

/// Upper bound on recommendations per response
pub const MAX_RECOMMENDATIONS: usize = 3;

pub const FALLBACK_REASON: &str = "No specific matches found, showing popular events";
const GENERIC_REASON: &str = "This event might interest you based on general popularity.";

const EVENT_TYPE_WEIGHT: f64 = 0.4;
const LOCATION_WEIGHT: f64 = 0.3;
const TIME_OF_DAY_WEIGHT: f64 = 0.2;
const DURATION_WEIGHT: f64 = 0.1;

const SIMILARITY_SHARE: f64 = 0.6;
const PROBABILITY_SHARE: f64 = 0.4;

/// Turns classifier output into the final ordered recommendation list
///
/// Liked candidates (optionally narrowed by the preference thresholds) are
/// cut to the most probable few; when nothing is liked the most popular
/// events from the table are used instead. The selection is then scored
/// against the preference and re-sorted by final score. Both sorts are
/// stable, so ties keep grid order or table order respectively.
pub fn rank(
    preference: &UserPreference,
    candidates: &[CandidateRow],
    predictions: &[Prediction],
    store: &EventStore,
) -> Vec<Recommendation> {
    let mut liked: Vec<Recommendation> = candidates
        .iter()
        .zip(predictions)
        .filter(|(row, prediction)| prediction.liked && within_thresholds(row, preference))
        .map(|(row, prediction)| Recommendation::from_candidate(row, *prediction))
        .collect();

    let selected = if liked.is_empty() {
        tracing::debug!("No liked candidates, falling back to popular events");
        store
            .top_by_popularity(MAX_RECOMMENDATIONS)
            .into_iter()
            .map(|event| {
                let mut rec = Recommendation::from_catalog(event);
                rec.reason = FALLBACK_REASON.to_string();
                rec
            })
            .collect()
    } else {
        liked.sort_by(|a, b| b.like_probability.total_cmp(&a.like_probability));
        liked.truncate(MAX_RECOMMENDATIONS);
        for rec in &mut liked {
            rec.reason = explain(rec, preference);
        }
        liked
    };

    apply_final_scores(selected, preference)
}

/// Scores each recommendation and orders by final score, highest first
pub fn apply_final_scores(
    mut recommendations: Vec<Recommendation>,
    preference: &UserPreference,
) -> Vec<Recommendation> {
    for rec in &mut recommendations {
        let similarity = similarity_score(rec, preference);
        rec.similarity_score = Some(similarity);
        rec.final_score = Some(final_score(similarity, rec.like_probability));
    }

    recommendations.sort_by(|a, b| {
        let a = a.final_score.unwrap_or(0.0);
        let b = b.final_score.unwrap_or(0.0);
        b.total_cmp(&a)
    });

    recommendations
}

/// Weighted match between a recommendation and the preference, in [0, 1]
pub fn similarity_score(rec: &Recommendation, preference: &UserPreference) -> f64 {
    let mut score: f64 = 0.0;

    if rec.event_type.eq_ignore_ascii_case(&preference.event_type) {
        score += EVENT_TYPE_WEIGHT;
    }
    if rec.location.eq_ignore_ascii_case(&preference.location) {
        score += LOCATION_WEIGHT;
    }
    if rec.time_of_day.eq_ignore_ascii_case(preference.time_of_day.as_str()) {
        score += TIME_OF_DAY_WEIGHT;
    }

    let gap = rec.duration.abs_diff(preference.reference_duration());
    if gap <= 60 {
        score += DURATION_WEIGHT;
    } else if gap <= 120 {
        score += DURATION_WEIGHT / 2.0;
    }

    score.clamp(0.0, 1.0)
}

/// Blend of similarity and like probability, in [0, 1] for inputs in [0, 1]
pub fn final_score(similarity: f64, like_probability: f64) -> f64 {
    (SIMILARITY_SHARE * similarity + PROBABILITY_SHARE * like_probability).clamp(0.0, 1.0)
}

/// Human-readable reason listing every condition the recommendation meets
pub fn explain(rec: &Recommendation, preference: &UserPreference) -> String {
    let mut reasons = Vec::new();

    if rec.event_type.eq_ignore_ascii_case(&preference.event_type) {
        reasons.push("matches your preferred event type");
    }
    if rec.location.eq_ignore_ascii_case(&preference.location) {
        reasons.push("is in your preferred location");
    }
    if rec.time_of_day.eq_ignore_ascii_case(preference.time_of_day.as_str()) {
        reasons.push("occurs at your preferred time");
    }
    if rec.popularity_score >= 8.0 {
        reasons.push("is highly popular");
    } else if rec.popularity_score >= 7.0 {
        reasons.push("is quite popular");
    }
    if rec.like_probability >= 0.8 {
        reasons.push("has a high chance you'll enjoy it");
    }

    if reasons.is_empty() {
        GENERIC_REASON.to_string()
    } else {
        format!("This event {}.", reasons.join(" and "))
    }
}

fn within_thresholds(row: &CandidateRow, preference: &UserPreference) -> bool {
    preference
        .min_popularity
        .map_or(true, |min| row.popularity_score >= min)
        && preference.max_duration.map_or(true, |max| row.duration <= max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SpaceEvent, TimeOfDay, CATALOG_SOURCE, MODEL_SOURCE};
    use crate::services::candidates::generate_candidates;

    fn store() -> EventStore {
        let event = |event_type: &str, location: &str, time, duration, popularity| SpaceEvent {
            event_type: event_type.to_string(),
            location: location.to_string(),
            time_of_day: time,
            duration,
            popularity_score: popularity,
        };
        EventStore::from_events(vec![
            event("comet viewing", "Asia", TimeOfDay::Night, 90, 7.2),
            event("solar eclipse", "Europe", TimeOfDay::Day, 150, 9.6),
            event("meteor shower", "USA", TimeOfDay::Night, 240, 9.1),
            event("star party", "Iceland", TimeOfDay::Night, 60, 9.6),
            event("rocket launch", "USA", TimeOfDay::Day, 30, 8.0),
        ])
        .unwrap()
    }

    fn meteor_pref() -> UserPreference {
        UserPreference::new("meteor shower", "USA", TimeOfDay::Night)
    }

    /// Likes every candidate at or above `min_duration`, probability rising with popularity
    fn predict_by_duration(rows: &[CandidateRow], min_duration: u32) -> Vec<Prediction> {
        rows.iter()
            .map(|r| {
                let liked = r.duration >= min_duration;
                Prediction {
                    liked,
                    like_probability: if liked { r.popularity_score / 10.0 } else { 0.1 },
                }
            })
            .collect()
    }

    fn assert_descending(recs: &[Recommendation]) {
        for pair in recs.windows(2) {
            assert!(pair[0].final_score.unwrap() >= pair[1].final_score.unwrap());
        }
    }

    #[test]
    fn test_liked_candidates_above_duration_cut() {
        let pref = meteor_pref();
        let rows = generate_candidates(&pref);
        let predictions = predict_by_duration(&rows, 180);

        let recs = rank(&pref, &rows, &predictions, &store());

        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.duration >= 180));
        assert!(recs.iter().all(|r| r.source == MODEL_SOURCE && r.predicted_like == 1));
        assert!(recs.iter().all(|r| (r.like_probability - 0.9).abs() < 1e-9));
        assert_descending(&recs);
        // Same probability everywhere: the first three grid rows with duration >= 180 win
        let durations: Vec<u32> = recs.iter().map(|r| r.duration).collect();
        assert_eq!(durations, vec![180, 240, 300]);
    }

    #[test]
    fn test_all_disliked_falls_back_to_popular_events() {
        let pref = meteor_pref();
        let rows = generate_candidates(&pref);
        let predictions = vec![
            Prediction {
                liked: false,
                like_probability: 0.2
            };
            rows.len()
        ];

        let recs = rank(&pref, &rows, &predictions, &store());

        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.source == CATALOG_SOURCE));
        assert!(recs.iter().all(|r| r.predicted_like == 0 && r.like_probability == 0.0));
        assert!(recs.iter().all(|r| r.reason == FALLBACK_REASON));

        // Top three by popularity are the two 9.6 rows and the 9.1 row; the
        // meteor shower matches the preference and therefore ranks first.
        let types: Vec<&str> = recs.iter().map(|r| r.event_type.as_str()).collect();
        assert_eq!(types, vec!["meteor shower", "star party", "solar eclipse"]);
        assert_descending(&recs);
    }

    #[test]
    fn test_final_sort_can_reorder_probability_order() {
        let pref = UserPreference {
            max_duration: Some(300),
            ..meteor_pref()
        };
        let rows = generate_candidates(&pref);
        // The short row is most probable but furthest from the 300 minute reference
        let predictions: Vec<Prediction> = rows
            .iter()
            .map(|r| {
                let like_probability = match (r.duration, r.popularity_score) {
                    (60, p) if p == 7.0 => 0.82,
                    (300, p) if p == 9.0 => 0.80,
                    (300, p) if p == 8.5 => 0.79,
                    _ => 0.5,
                };
                Prediction {
                    liked: true,
                    like_probability,
                }
            })
            .collect();

        let recs = rank(&pref, &rows, &predictions, &store());

        let picked: Vec<(u32, f64)> = recs.iter().map(|r| (r.duration, r.popularity_score)).collect();
        assert_eq!(picked, vec![(300, 9.0), (300, 8.5), (60, 7.0)]);
        assert_descending(&recs);
    }

    #[test]
    fn test_duration_cap_limits_liked_rows() {
        let pref = UserPreference {
            max_duration: Some(60),
            ..meteor_pref()
        };
        let rows = generate_candidates(&pref);
        let predictions = predict_by_duration(&rows, 0);

        let recs = rank(&pref, &rows, &predictions, &store());
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.duration == 60));
        assert_eq!(recs[0].popularity_score, 9.0);
    }

    #[test]
    fn test_thresholds_narrow_liked_set() {
        let pref = UserPreference {
            min_popularity: Some(8.5),
            ..meteor_pref()
        };
        let rows = generate_candidates(&pref);
        let predictions = predict_by_duration(&rows, 0);

        let recs = rank(&pref, &rows, &predictions, &store());
        assert!(recs.iter().all(|r| r.popularity_score >= 8.5));
        assert_eq!(recs[0].popularity_score, 9.0);
    }

    #[test]
    fn test_never_more_than_three_and_scores_bounded() {
        let pref = meteor_pref();
        let rows = generate_candidates(&pref);

        for step in 0..=20 {
            let p = f64::from(step) / 20.0;
            let predictions: Vec<Prediction> = rows
                .iter()
                .enumerate()
                .map(|(i, _)| Prediction {
                    liked: i % 3 != 0,
                    like_probability: (p + i as f64 * 0.013) % 1.0,
                })
                .collect();

            let recs = rank(&pref, &rows, &predictions, &store());
            assert!(recs.len() <= MAX_RECOMMENDATIONS);
            assert_descending(&recs);
            for rec in &recs {
                let similarity = rec.similarity_score.unwrap();
                let fin = rec.final_score.unwrap();
                assert!((0.0..=1.0).contains(&similarity));
                assert!((0.0..=1.0).contains(&fin));
            }
        }
    }

    #[test]
    fn test_similarity_weights() {
        let pref = UserPreference {
            max_duration: Some(120),
            ..meteor_pref()
        };
        let row = |event_type: &str, location: &str, time, duration| CandidateRow {
            event_type: event_type.to_string(),
            location: location.to_string(),
            time_of_day: time,
            duration,
            popularity_score: 8.0,
        };
        let prediction = Prediction {
            liked: true,
            like_probability: 0.5,
        };
        let score = |r: CandidateRow| similarity_score(&Recommendation::from_candidate(&r, prediction), &pref);

        assert!((score(row("meteor shower", "USA", TimeOfDay::Night, 120)) - 1.0).abs() < 1e-9);
        assert!((score(row("meteor shower", "usa", TimeOfDay::Night, 180)) - 1.0).abs() < 1e-9);
        assert!((score(row("meteor shower", "USA", TimeOfDay::Night, 240)) - 0.95).abs() < 1e-9);
        assert!((score(row("meteor shower", "USA", TimeOfDay::Night, 300)) - 0.9).abs() < 1e-9);
        assert!((score(row("star party", "USA", TimeOfDay::Day, 300)) - 0.3).abs() < 1e-9);
        assert!(score(row("star party", "Asia", TimeOfDay::Day, 300)).abs() < 1e-9);
    }

    #[test]
    fn test_final_score_blend() {
        assert!((final_score(1.0, 1.0) - 1.0).abs() < 1e-9);
        assert!((final_score(0.5, 0.25) - 0.4).abs() < 1e-9);
        assert_eq!(final_score(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_explain_joins_conditions() {
        let pref = meteor_pref();
        let row = CandidateRow {
            event_type: "meteor shower".to_string(),
            location: "USA".to_string(),
            time_of_day: TimeOfDay::Night,
            duration: 120,
            popularity_score: 8.5,
        };
        let rec = Recommendation::from_candidate(
            &row,
            Prediction {
                liked: true,
                like_probability: 0.85,
            },
        );

        assert_eq!(
            explain(&rec, &pref),
            "This event matches your preferred event type and is in your preferred location \
             and occurs at your preferred time and is highly popular and has a high chance \
             you'll enjoy it."
        );
    }

    #[test]
    fn test_explain_quite_popular_and_generic() {
        let pref = meteor_pref();
        let mut rec = Recommendation::from_candidate(
            &CandidateRow {
                event_type: "lunar eclipse".to_string(),
                location: "Asia".to_string(),
                time_of_day: TimeOfDay::Day,
                duration: 60,
                popularity_score: 7.5,
            },
            Prediction {
                liked: true,
                like_probability: 0.6,
            },
        );
        assert_eq!(explain(&rec, &pref), "This event is quite popular.");

        rec.popularity_score = 5.0;
        assert_eq!(explain(&rec, &pref), GENERIC_REASON);
    }
}
