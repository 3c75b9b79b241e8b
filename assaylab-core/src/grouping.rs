//! Reduces flat sample and HPLC result lists into per-group statistics for
//! tables and charts.
//!
//! Every reduction keeps groups in the order their first member appears and
//! values in input order. Missing values (`None`, NaN, N/A outcomes) are
//! dropped before grouping, so a group only exists if it has at least one
//! usable value.

use crate::assay::PigmentBreakdown;
use crate::samples::EvaluatedSample;
use crate::stats::{self, BoxPlotStats, Summary};
use assaylab_schemas::{hplc::HplcSampleResult, stats::StatGroup};
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// One record fed to [`aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedValue {
    pub group_key: String,
    pub value: Option<f64>,
}

impl GroupedValue {
    pub fn new(group_key: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            group_key: group_key.into(),
            value,
        }
    }
}

/// Full descriptive statistics for one named group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub name: String,
    pub summary: Summary,
}

/// Box-plot figures for one named group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBoxPlot {
    pub name: String,
    pub stats: BoxPlotStats,
}

/// Groups `items` by `key`, keeping first-seen group order and input order
/// inside each group.
pub fn group_first_seen<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}

fn usable(records: &[GroupedValue]) -> Vec<(&str, f64)> {
    records
        .iter()
        .filter_map(|r| match r.value {
            Some(v) if !v.is_nan() => Some((r.group_key.as_str(), v)),
            _ => None,
        })
        .collect()
}

/// Mean and standard error per group.
pub fn aggregate(records: &[GroupedValue]) -> Vec<StatGroup> {
    group_first_seen(usable(records), |(key, _)| *key)
        .into_iter()
        .map(|(name, members)| {
            let values: Vec<f64> = members.into_iter().map(|(_, v)| v).collect();
            StatGroup {
                name: name.to_string(),
                value: stats::mean(&values),
                error_y: stats::std_err(&values),
                n: values.len(),
                raw_values: values,
            }
        })
        .collect()
}

/// Complete [`Summary`] per group, same grouping rules as [`aggregate`].
pub fn summarize_groups(records: &[GroupedValue]) -> Vec<GroupSummary> {
    group_first_seen(usable(records), |(key, _)| *key)
        .into_iter()
        .filter_map(|(name, members)| {
            let values: Vec<f64> = members.into_iter().map(|(_, v)| v).collect();
            Summary::from_values(&values).map(|summary| GroupSummary {
                name: name.to_string(),
                summary,
            })
        })
        .collect()
}

/// Box-plot figures for each chart group, from its raw values.
pub fn boxplots(groups: &[StatGroup]) -> Vec<GroupBoxPlot> {
    groups
        .iter()
        .filter_map(|g| {
            BoxPlotStats::from_values(&g.raw_values).map(|stats| GroupBoxPlot {
                name: g.name.clone(),
                stats,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    /// One bar per treatment with mean and standard error.
    #[default]
    Grouped,
    /// One bar per sample.
    Individual,
}

fn sample_results(evaluated: &[EvaluatedSample], by_treatment: bool) -> Vec<GroupedValue> {
    evaluated
        .iter()
        .map(|e| {
            let key = if by_treatment {
                &e.sample.treatment_name
            } else {
                &e.sample.sample_name
            };
            let value = e.outcome.is_available().then_some(e.outcome.result);
            GroupedValue::new(key.clone(), value)
        })
        .collect()
}

/// Chart bars for spectrophotometric results. Samples without an
/// available result are left out.
pub fn treatment_chart_data(evaluated: &[EvaluatedSample], mode: ChartMode) -> Vec<StatGroup> {
    match mode {
        ChartMode::Grouped => aggregate(&sample_results(evaluated, true)),
        ChartMode::Individual => sample_results(evaluated, false)
            .into_iter()
            .filter_map(|r| {
                r.value.filter(|v| !v.is_nan()).map(|v| StatGroup {
                    name: r.group_key,
                    value: v,
                    error_y: 0.0,
                    n: 1,
                    raw_values: vec![v],
                })
            })
            .collect(),
    }
}

/// Full statistics of spectrophotometric results per treatment.
pub fn treatment_statistics(evaluated: &[EvaluatedSample]) -> Vec<GroupSummary> {
    summarize_groups(&sample_results(evaluated, true))
}

/// Pigment-wise summaries over every chlorophyll sample with a result.
#[derive(Debug, Clone, PartialEq)]
pub struct ChlorophyllSummary {
    pub chl_a: Summary,
    pub chl_b: Summary,
    pub total: Summary,
    pub carotenoid: Summary,
}

/// `None` when no evaluated sample carries a pigment breakdown.
pub fn chlorophyll_summary(evaluated: &[EvaluatedSample]) -> Option<ChlorophyllSummary> {
    let pigments: Vec<_> = evaluated
        .iter()
        .filter(|e| e.outcome.is_available())
        .filter_map(|e| e.outcome.pigments)
        .collect();

    let summarize = |f: fn(&PigmentBreakdown) -> f64| -> Option<Summary> {
        Summary::from_values(&pigments.iter().map(f).collect::<Vec<_>>())
    };

    Some(ChlorophyllSummary {
        chl_a: summarize(|p| p.chl_a)?,
        chl_b: summarize(|p| p.chl_b)?,
        total: summarize(|p| p.total_chlorophyll())?,
        carotenoid: summarize(|p| p.carotenoid)?,
    })
}

fn concentrations<'a>(
    results: impl IntoIterator<Item = &'a HplcSampleResult>,
) -> Vec<GroupedValue> {
    results
        .into_iter()
        .map(|r| GroupedValue::new(r.treatment.clone(), r.concentration))
        .collect()
}

/// One compound's concentrations, one bar per treatment.
pub fn compound_chart_data(results: &[HplcSampleResult], compound: &str) -> Vec<StatGroup> {
    aggregate(&concentrations(
        results.iter().filter(|r| r.compound == compound),
    ))
}

/// One factor's concentrations over all compounds, one bar per treatment.
pub fn factor_chart_data(results: &[HplcSampleResult], factor: &str) -> Vec<StatGroup> {
    aggregate(&concentrations(results.iter().filter(|r| r.factor == factor)))
}

/// Subset selection for HPLC statistics. Empty sets and `None` match
/// everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HplcFilter {
    pub factors: BTreeSet<String>,
    pub treatments: BTreeSet<String>,
    pub compound: Option<String>,
}

impl HplcFilter {
    pub fn matches(&self, result: &HplcSampleResult) -> bool {
        (self.factors.is_empty() || self.factors.contains(&result.factor))
            && (self.treatments.is_empty() || self.treatments.contains(&result.treatment))
            && self
                .compound
                .as_ref()
                .map_or(true, |c| *c == result.compound)
    }
}

/// Concentration statistics per compound over the filtered results.
/// Compounds with no concentration at all are omitted.
pub fn compound_statistics(results: &[HplcSampleResult], filter: &HplcFilter) -> Vec<GroupSummary> {
    let records: Vec<GroupedValue> = results
        .iter()
        .filter(|r| filter.matches(r))
        .map(|r| GroupedValue::new(r.compound.clone(), r.concentration))
        .collect();
    summarize_groups(&records)
}

/// Distinct values of `field` in first-seen order.
pub fn distinct<'a, F>(results: &'a [HplcSampleResult], field: F) -> Vec<&'a str>
where
    F: Fn(&'a HplcSampleResult) -> &'a str,
{
    group_first_seen(results.iter().map(&field), |v| *v)
        .into_iter()
        .map(|(k, _)| k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_keep_first_seen_order() {
        let groups = group_first_seen(vec!["b1", "a1", "b2", "c1", "a2"], |s| &s[..1]);
        let keys: Vec<_> = groups.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(groups[0].1, vec!["b1", "b2"]);
    }
}
