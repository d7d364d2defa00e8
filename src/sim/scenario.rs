use rayon::prelude::*;
use tracing::info;

use crate::config::SimConfig;
use crate::dynamics::state::StepResult;
use crate::error::RunError;
use crate::io::errors_table::DisturbanceRecord;
use super::runner::run;

// ---------------------------------------------------------------------------
// Independent scenarios (one per attack/level)
// ---------------------------------------------------------------------------

/// A time-ordered slice of the input table sharing one `(attack, level)`.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub attack: Option<String>,
    pub level: Option<String>,
    pub records: Vec<DisturbanceRecord>,
    label: String,
}

impl Scenario {
    /// Label used in logs and output file names, e.g. `fgsm_2` or `baseline`.
    /// Unique within one `group_scenarios` call and safe as a file-name part.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Keep ASCII letters, digits, `-` and `.`; map everything else to `-`.
/// `_` is reserved as the attack/level separator.
fn sanitize_tag(tag: &str) -> String {
    let clean: String = tag
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '-' })
        .collect();
    // a bare "." or ".." must not survive as a path component
    if clean.chars().all(|c| c == '.') {
        clean.replace('.', "-")
    } else {
        clean
    }
}

fn base_label(attack: Option<&str>, level: Option<&str>) -> String {
    match (attack, level) {
        (None, None) => "baseline".into(),
        (Some(a), None) => sanitize_tag(a),
        (None, Some(l)) => format!("level_{}", sanitize_tag(l)),
        (Some(a), Some(l)) => format!("{}_{}", sanitize_tag(a), sanitize_tag(l)),
    }
}

/// First of `base`, `base_2`, `base_3`, ... not already taken.
fn unique_label(base: String, taken: &[Scenario]) -> String {
    let used = |l: &str| taken.iter().any(|s| s.label == l);
    if !used(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if !used(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Split records into scenarios keyed by `(attack, level)`, in order of first
/// appearance. Row order is kept inside a scenario and step indices restart
/// at 0, because each scenario is its own time series.
pub fn group_scenarios(records: &[DisturbanceRecord]) -> Vec<Scenario> {
    let mut scenarios: Vec<Scenario> = Vec::new();
    for rec in records {
        let attack = &rec.tags.attack;
        let level = &rec.tags.level;
        let idx = match scenarios
            .iter()
            .position(|s| &s.attack == attack && &s.level == level)
        {
            Some(i) => i,
            None => {
                let base = base_label(attack.as_deref(), level.as_deref());
                let label = unique_label(base, &scenarios);
                scenarios.push(Scenario {
                    attack: attack.clone(),
                    level: level.clone(),
                    records: Vec::new(),
                    label,
                });
                scenarios.len() - 1
            }
        };
        let records = &mut scenarios[idx].records;
        let mut rec = rec.clone();
        rec.step_index = records.len();
        records.push(rec);
    }
    scenarios
}

/// Result of running one scenario, tagged with its label.
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub label: String,
    pub result: Result<Vec<StepResult>, RunError>,
}

/// Run every scenario on the rayon pool. Runs share only `config`.
pub fn run_scenarios(scenarios: &[Scenario], config: &SimConfig) -> Vec<ScenarioOutcome> {
    info!(scenarios = scenarios.len(), "running scenarios in parallel");
    scenarios
        .par_iter()
        .map(|s| ScenarioOutcome {
            label: s.label().to_string(),
            result: run(&s.records, config),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(attack: Option<&str>, level: Option<&str>, ra: f64) -> DisturbanceRecord {
        let mut r = DisturbanceRecord::new(0, ra, 0.0, 0.0);
        r.tags.attack = attack.map(String::from);
        r.tags.level = level.map(String::from);
        r
    }

    #[test]
    fn groups_by_attack_and_level_in_first_seen_order() {
        let recs = vec![
            tagged(Some("fgsm"), Some("1"), 0.1),
            tagged(Some("pgd"), Some("1"), 0.2),
            tagged(Some("fgsm"), Some("1"), 0.3),
            tagged(None, None, 0.4),
        ];
        let groups = group_scenarios(&recs);
        let labels: Vec<&str> = groups.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["fgsm_1", "pgd_1", "baseline"]);
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[0].records[1].ra_error, 0.3);
        assert_eq!(groups[0].records[1].step_index, 1);
    }

    #[test]
    fn colliding_keys_get_distinct_labels() {
        let recs = vec![
            tagged(Some("fgsm_2"), None, 0.1),
            tagged(Some("fgsm"), Some("2"), 0.2),
            tagged(None, Some("1"), 0.3),
            tagged(Some("level"), Some("1"), 0.4),
            tagged(Some("fgsm-2"), None, 0.5),
        ];
        let groups = group_scenarios(&recs);
        assert_eq!(groups.len(), 5);
        let labels: Vec<&str> = groups.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["fgsm-2", "fgsm_2", "level_1", "level_1_2", "fgsm-2_2"]);
    }

    #[test]
    fn labels_never_contain_path_separators() {
        let recs = vec![
            tagged(Some("noise/blur"), Some("..\\x"), 0.1),
            tagged(Some(".."), None, 0.2),
            tagged(Some("a b:c"), Some("/"), 0.3),
        ];
        let groups = group_scenarios(&recs);
        let labels: Vec<&str> = groups.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["noise-blur_..-x", "--", "a-b-c_-"]);
        for l in labels {
            assert!(!l.contains('/') && !l.contains('\\'));
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let recs: Vec<DisturbanceRecord> = (0..40)
            .map(|i| {
                let attack = if i % 2 == 0 { "fgsm" } else { "pgd" };
                tagged(Some(attack), Some("2"), (i as f64 * 0.37).sin())
            })
            .collect();
        let groups = group_scenarios(&recs);
        let config = SimConfig::default();
        let outcomes = run_scenarios(&groups, &config);
        assert_eq!(outcomes.len(), groups.len());
        for (g, o) in groups.iter().zip(&outcomes) {
            assert_eq!(o.label, g.label());
            let sequential = run(&g.records, &config).unwrap();
            assert_eq!(o.result.as_ref().unwrap(), &sequential);
        }
    }
}
