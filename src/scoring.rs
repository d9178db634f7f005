//! Risk scoring
//!
//! Applies a fixed, ordered table of independent rules to a feature set.
//! Every rule whose predicate holds adds its weight and its reason; the sum
//! is capped at [`MAX_RISK`]. Rules are not mutually exclusive, so a
//! submission with heavy pasting can trip both the paste-ratio rule and the
//! continuous-writing rule.

use serde::Serialize;

use crate::types::{FeatureSet, ScoreResult};

/// Upper bound of the risk score
pub const MAX_RISK: u32 = 100;

/// A single scoring rule
#[derive(Clone, Copy, Serialize)]
pub struct Rule {
    /// Stable identifier
    pub id: &'static str,
    /// Risk added when the rule triggers
    pub weight: u32,
    /// Human-readable reason reported when the rule triggers
    pub reason: &'static str,
    /// Condition in plain words
    pub condition: &'static str,
    #[serde(skip)]
    predicate: fn(&FeatureSet) -> bool,
}

impl Rule {
    /// Whether the rule triggers for these features
    pub fn matches(&self, features: &FeatureSet) -> bool {
        (self.predicate)(features)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("weight", &self.weight)
            .field("reason", &self.reason)
            .finish()
    }
}

/// Rule table, in evaluation (and reason) order
static RULES: [Rule; 6] = [
    Rule {
        id: "high_paste_ratio",
        weight: 30,
        reason: "High paste ratio",
        condition: "paste_ratio > 0.4",
        predicate: |f| f.paste_ratio > 0.4,
    },
    Rule {
        id: "large_paste_block",
        weight: 25,
        reason: "Large paste block detected",
        condition: "max_paste > 300",
        predicate: |f| f.max_paste > 300,
    },
    Rule {
        id: "short_writing_time",
        weight: 20,
        reason: "Very short writing time",
        condition: "total_time < 600",
        predicate: |f| f.total_time < 600,
    },
    Rule {
        id: "continuous_heavy_pasting",
        weight: 15,
        reason: "Continuous writing with heavy pasting",
        condition: "long_pauses == 0 and paste_ratio > 0.3",
        predicate: |f| f.long_pauses == 0 && f.paste_ratio > 0.3,
    },
    Rule {
        id: "sudden_insertion",
        weight: 25,
        reason: "Sudden large text insertion detected",
        condition: "sudden_inserts > 0",
        predicate: |f| f.sudden_inserts > 0,
    },
    Rule {
        id: "very_large_insertion",
        weight: 30,
        reason: "Very large instant content insertion",
        condition: "max_sudden_insert > 500",
        predicate: |f| f.max_sudden_insert > 500,
    },
];

/// Rule-based risk scorer
pub struct RiskScorer;

impl RiskScorer {
    /// The rule table in evaluation order
    pub fn rules() -> &'static [Rule] {
        &RULES
    }

    /// Score a feature set
    pub fn score(features: &FeatureSet) -> ScoreResult {
        let mut risk = 0u32;
        let mut reasons = Vec::new();

        for rule in RULES.iter().filter(|r| r.matches(features)) {
            risk += rule.weight;
            reasons.push(rule.reason.to_string());
        }

        ScoreResult {
            risk: risk.min(MAX_RISK),
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Features that trigger no rule at all
    fn quiet_features() -> FeatureSet {
        FeatureSet {
            avg_gap: 180.0,
            long_pauses: 1,
            paste_ratio: 0.0,
            max_paste: 0,
            total_time: 1800,
            total_words: 400,
            sudden_inserts: 0,
            max_sudden_insert: 0,
        }
    }

    #[test]
    fn test_no_rules_triggered() {
        let result = RiskScorer::score(&quiet_features());
        assert_eq!(result.risk, 0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_each_rule_in_isolation() {
        let cases: Vec<(FeatureSet, u32, &str)> = vec![
            (
                FeatureSet {
                    paste_ratio: 0.45,
                    ..quiet_features()
                },
                30,
                "High paste ratio",
            ),
            (
                FeatureSet {
                    max_paste: 301,
                    ..quiet_features()
                },
                25,
                "Large paste block detected",
            ),
            (
                FeatureSet {
                    total_time: 599,
                    ..quiet_features()
                },
                20,
                "Very short writing time",
            ),
            (
                FeatureSet {
                    long_pauses: 0,
                    paste_ratio: 0.35,
                    ..quiet_features()
                },
                15,
                "Continuous writing with heavy pasting",
            ),
            (
                FeatureSet {
                    sudden_inserts: 1,
                    ..quiet_features()
                },
                25,
                "Sudden large text insertion detected",
            ),
            (
                FeatureSet {
                    max_sudden_insert: 501,
                    ..quiet_features()
                },
                30,
                "Very large instant content insertion",
            ),
        ];

        for (features, risk, reason) in cases {
            let result = RiskScorer::score(&features);
            assert_eq!(result.risk, risk, "{reason}");
            assert_eq!(result.reasons, vec![reason.to_string()]);
        }
    }

    #[test]
    fn test_thresholds_are_strict() {
        let features = FeatureSet {
            long_pauses: 0,
            paste_ratio: 0.3,
            max_paste: 300,
            total_time: 600,
            max_sudden_insert: 500,
            ..quiet_features()
        };
        let result = RiskScorer::score(&features);
        assert_eq!(result.risk, 0);

        let features = FeatureSet {
            long_pauses: 2,
            paste_ratio: 0.4,
            ..quiet_features()
        };
        assert_eq!(RiskScorer::score(&features).risk, 0);
    }

    #[test]
    fn test_paste_rules_overlap() {
        // Rule 1 and rule 4 both fire on the same heavy paste ratio
        let features = FeatureSet {
            long_pauses: 0,
            paste_ratio: 0.5,
            ..quiet_features()
        };
        let result = RiskScorer::score(&features);
        assert_eq!(result.risk, 45);
        assert_eq!(
            result.reasons,
            vec![
                "High paste ratio".to_string(),
                "Continuous writing with heavy pasting".to_string()
            ]
        );
    }

    #[test]
    fn test_long_pause_suppresses_continuous_rule() {
        let features = FeatureSet {
            long_pauses: 1,
            paste_ratio: 0.5,
            ..quiet_features()
        };
        let result = RiskScorer::score(&features);
        assert_eq!(result.risk, 30);
        assert_eq!(result.reasons, vec!["High paste ratio".to_string()]);
    }

    #[test]
    fn test_large_sudden_insert_triggers_both_insert_rules() {
        let features = FeatureSet {
            sudden_inserts: 1,
            max_sudden_insert: 600,
            ..quiet_features()
        };
        let result = RiskScorer::score(&features);
        assert_eq!(result.risk, 55);
        assert_eq!(
            result.reasons,
            vec![
                "Sudden large text insertion detected".to_string(),
                "Very large instant content insertion".to_string()
            ]
        );
    }

    #[test]
    fn test_risk_is_capped() {
        let features = FeatureSet {
            avg_gap: 0.0,
            long_pauses: 0,
            paste_ratio: 2.0,
            max_paste: 5000,
            total_time: 30,
            total_words: 800,
            sudden_inserts: 3,
            max_sudden_insert: 2000,
        };
        let result = RiskScorer::score(&features);

        // 30 + 25 + 20 + 15 + 25 + 30 = 145, capped
        assert_eq!(result.risk, MAX_RISK);
        assert_eq!(result.reasons.len(), 6);
    }

    #[test]
    fn test_reasons_follow_table_order() {
        let features = FeatureSet {
            avg_gap: 0.0,
            long_pauses: 0,
            paste_ratio: 2.0,
            max_paste: 5000,
            total_time: 30,
            total_words: 800,
            sudden_inserts: 3,
            max_sudden_insert: 2000,
        };
        let result = RiskScorer::score(&features);
        let expected: Vec<String> = RiskScorer::rules()
            .iter()
            .map(|r| r.reason.to_string())
            .collect();
        assert_eq!(result.reasons, expected);
    }

    #[test]
    fn test_monotonic_in_max_paste() {
        let base = FeatureSet {
            max_paste: 100,
            ..quiet_features()
        };
        let bumped = FeatureSet {
            max_paste: 1000,
            ..base.clone()
        };
        assert!(RiskScorer::score(&bumped).risk >= RiskScorer::score(&base).risk);
    }

    #[test]
    fn test_rule_table() {
        let rules = RiskScorer::rules();
        assert_eq!(rules.len(), 6);
        let weights: Vec<u32> = rules.iter().map(|r| r.weight).collect();
        assert_eq!(weights, vec![30, 25, 20, 15, 25, 30]);
    }
}
