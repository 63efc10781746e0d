use crate::models::{CandidateRow, UserPreference};

/// Durations (minutes) probed for every preference
pub const CANDIDATE_DURATIONS: [u32; 5] = [60, 120, 180, 240, 300];
/// Popularity scores probed for every preference
pub const CANDIDATE_POPULARITY: [f64; 5] = [7.0, 7.5, 8.0, 8.5, 9.0];

/// Expands a preference into the fixed candidate grid
///
/// One row per (duration, popularity) pair, durations outermost, with the
/// categorical fields copied from the preference. The grid lets the
/// classifier be probed at the user's categorical coordinates without any
/// real rows on file for them.
pub fn generate_candidates(preference: &UserPreference) -> Vec<CandidateRow> {
    CANDIDATE_DURATIONS
        .iter()
        .flat_map(|&duration| {
            CANDIDATE_POPULARITY.iter().map(move |&popularity_score| CandidateRow {
                event_type: preference.event_type.clone(),
                location: preference.location.clone(),
                time_of_day: preference.time_of_day,
                duration,
                popularity_score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeOfDay, VALID_EVENT_TYPES, VALID_LOCATIONS};

    #[test]
    fn test_grid_has_25_rows_with_copied_categoricals() {
        for event_type in VALID_EVENT_TYPES {
            for location in VALID_LOCATIONS {
                for time in TimeOfDay::ALL {
                    let preference = UserPreference::new(event_type, location, time);
                    let rows = generate_candidates(&preference);

                    assert_eq!(rows.len(), 25);
                    assert!(rows.iter().all(|r| r.event_type == event_type
                        && r.location == location
                        && r.time_of_day == time));
                }
            }
        }
    }

    #[test]
    fn test_grid_covers_every_pair_once_in_order() {
        let preference = UserPreference::new("meteor shower", "USA", TimeOfDay::Night);
        let rows = generate_candidates(&preference);

        let pairs: Vec<(u32, f64)> = rows.iter().map(|r| (r.duration, r.popularity_score)).collect();
        let mut expected = Vec::new();
        for d in CANDIDATE_DURATIONS {
            for p in CANDIDATE_POPULARITY {
                expected.push((d, p));
            }
        }
        assert_eq!(pairs, expected);
        assert_eq!(rows[0].duration, 60);
        assert_eq!(rows[0].popularity_score, 7.0);
        assert_eq!(rows[24].duration, 300);
        assert_eq!(rows[24].popularity_score, 9.0);
    }

    #[test]
    fn test_grid_is_deterministic() {
        let preference = UserPreference::new("aurora borealis", "Finland", TimeOfDay::Night);
        assert_eq!(generate_candidates(&preference), generate_candidates(&preference));
    }
}
