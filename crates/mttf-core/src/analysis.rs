//! End-to-end analysis of a symbolic state graph.
//!
//! Runs the structural checks, the fault-level search and both MTTFF
//! solvers, then evaluates the results numerically where every variable is
//! bound.

use crate::graph::{GraphSummary, StateGraph, StateId};
use crate::logging::{event_names, Stage};
use crate::models::ModelKind;
use mttf_common::Error;
use mttf_config::AnalysisConfig;
use mttf_math::{Bindings, EvalError, Expr};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::debug_span;

/// When to run the determinant-based solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExactMode {
    /// Only for graphs within the state limit.
    #[default]
    Auto,
    Always,
    Never,
}

/// Numeric comparison of both estimates with scaled fault rates.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeOptions {
    pub fault_rate_scale: f64,
    pub bindings: Bindings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub exact: ExactMode,
    pub asymptotic: bool,
    pub exact_state_limit: usize,
    pub bindings: Bindings,
    pub regime: Option<RegimeOptions>,
    pub show_graph: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            exact: ExactMode::Auto,
            asymptotic: true,
            exact_state_limit: AnalysisConfig::default().exact_state_limit,
            bindings: Bindings::new(),
            regime: None,
            show_graph: false,
        }
    }
}

impl AnalysisOptions {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        AnalysisOptions {
            exact_state_limit: config.exact_state_limit,
            bindings: config.bindings.clone(),
            regime: Some(RegimeOptions {
                fault_rate_scale: config.compare_regime.fault_rate_scale,
                bindings: config.regime_bindings(),
            }),
            ..AnalysisOptions::default()
        }
    }
}

/// One MTTFF result, symbolic and, when fully bound, numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MttfEstimate {
    pub expression: Expr,
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub free_variables: Vec<String>,
}

impl MttfEstimate {
    pub fn new(expression: Expr, bindings: &Bindings) -> Result<Self, Error> {
        let free_variables: Vec<String> = expression
            .variables()
            .into_iter()
            .filter(|v| !bindings.contains_key(v))
            .collect();
        let value = if free_variables.is_empty() {
            Some(evaluate(&expression, bindings)?)
        } else {
            None
        };
        Ok(MttfEstimate {
            expression,
            value,
            free_variables,
        })
    }
}

fn evaluate(expression: &Expr, bindings: &Bindings) -> Result<f64, Error> {
    expression
        .eval(bindings)
        .map_err(|e: EvalError| Error::Evaluation(format!("{} in {}", e, expression)))
}

/// Both estimates evaluated with scaled fault rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeComparison {
    pub fault_rate_scale: f64,
    pub exact: f64,
    pub asymptotic: f64,
    /// `asymptotic / exact`; tends to 1 as faults become rare.
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphAnalysis {
    pub summary: GraphSummary,
    pub exact: Option<MttfEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_skipped: Option<String>,
    pub asymptotic: Option<MttfEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regime: Option<RegimeComparison>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub graph: Vec<String>,
}

/// Analyze any graph over symbolic rates.
pub fn analyze_graph<Id: StateId>(
    graph: &StateGraph<Id, Expr>,
    options: &AnalysisOptions,
) -> Result<GraphAnalysis, Error> {
    let states = graph.len();
    crate::log_event!(
        DEBUG,
        event_names::ANALYSIS_STARTED,
        "analysis started",
        states = states as u64
    );

    stage_span(Stage::Validate).in_scope(|| graph.validate())?;
    let summary = stage_span(Stage::Levels).in_scope(|| graph.summary())?;

    let run_exact = match options.exact {
        ExactMode::Always => Ok(()),
        ExactMode::Never => Err("exact solver disabled".to_string()),
        ExactMode::Auto if states > options.exact_state_limit => {
            Err(Error::StateLimitExceeded {
                states,
                limit: options.exact_state_limit,
            }
            .to_string())
        }
        ExactMode::Auto => Ok(()),
    };
    let (exact, exact_skipped) = match run_exact {
        Ok(()) => {
            let expression = stage_span(Stage::Exact).in_scope(|| graph.mttff_exact())?;
            (Some(MttfEstimate::new(expression, &options.bindings)?), None)
        }
        Err(reason) => {
            crate::log_event!(
                INFO,
                event_names::ANALYSIS_EXACT_SKIPPED,
                reason.as_str(),
                states = states as u64
            );
            (None, Some(reason))
        }
    };

    let asymptotic = if options.asymptotic {
        let expression = stage_span(Stage::Asymptotic).in_scope(|| graph.mttff_asymptotic())?;
        Some(MttfEstimate::new(expression, &options.bindings)?)
    } else {
        None
    };

    let regime = match (&options.regime, &exact, &asymptotic) {
        (Some(regime), Some(exact), Some(asymptotic)) => {
            compare_regime(regime, &exact.expression, &asymptotic.expression)?
        }
        _ => None,
    };

    crate::log_event!(
        DEBUG,
        event_names::ANALYSIS_FINISHED,
        "analysis finished",
        resilience = summary.resilience as u64
    );
    Ok(GraphAnalysis {
        summary,
        exact,
        exact_skipped,
        asymptotic,
        regime,
        graph: if options.show_graph {
            graph.render_lines()
        } else {
            Vec::new()
        },
    })
}

fn stage_span(stage: Stage) -> tracing::Span {
    debug_span!("stage", stage = %stage)
}

/// `None` when the regime bindings leave a variable free.
fn compare_regime(
    regime: &RegimeOptions,
    exact: &Expr,
    asymptotic: &Expr,
) -> Result<Option<RegimeComparison>, Error> {
    let bound = |e: &Expr| e.variables().iter().all(|v| regime.bindings.contains_key(v));
    if !bound(exact) || !bound(asymptotic) {
        return Ok(None);
    }
    let exact = evaluate(exact, &regime.bindings)?;
    let asymptotic = evaluate(asymptotic, &regime.bindings)?;
    Ok(Some(RegimeComparison {
        fault_rate_scale: regime.fault_rate_scale,
        exact,
        asymptotic,
        ratio: asymptotic / exact,
    }))
}

/// Analysis of one built-in model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub model: ModelKind,
    pub redundancy: u32,
    #[serde(flatten)]
    pub analysis: GraphAnalysis,
}

impl AnalysisReport {
    pub fn run(model: ModelKind, redundancy: u32, options: &AnalysisOptions) -> Result<Self, Error> {
        let graph = model.build_symbolic(redundancy)?;
        crate::log_event!(
            INFO,
            event_names::GRAPH_BUILT,
            "model graph built",
            states = graph.len() as u64
        );
        let analysis = graph.analyze(options)?;
        Ok(AnalysisReport {
            model,
            redundancy,
            analysis,
        })
    }

    /// One line for quick checks.
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} R={}: {} states, resilience {}",
            self.model, self.redundancy, self.analysis.summary.states, self.analysis.summary.resilience
        );
        for (name, estimate) in [
            ("exact", &self.analysis.exact),
            ("asymptotic", &self.analysis.asymptotic),
        ] {
            if let Some(estimate) = estimate {
                let _ = write!(line, ", {} {}", name, estimate.expression);
                if let Some(value) = estimate.value {
                    let _ = write!(line, " = {:.6e}", value);
                }
            }
        }
        line
    }

    pub fn to_markdown(&self) -> String {
        let summary = &self.analysis.summary;
        let mut out = String::new();
        let _ = writeln!(out, "# MTTFF analysis: {} (R = {})\n", self.model, self.redundancy);
        let _ = writeln!(out, "{}\n", self.model.description());
        out.push_str("| states | terminals | fault transitions | recovery transitions | resilience |\n");
        out.push_str("|---|---|---|---|---|\n");
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |\n",
            summary.states,
            summary.terminals,
            summary.fault_transitions,
            summary.recovery_transitions,
            summary.resilience
        );

        out.push_str("## Fault levels\n\n| state | level |\n|---|---|\n");
        for entry in &summary.levels {
            let _ = writeln!(
                out,
                "| {} | {} |",
                entry.state.as_deref().unwrap_or("(data loss)"),
                entry.level
            );
        }
        out.push('\n');

        for (title, estimate) in [
            ("Exact MTTFF", &self.analysis.exact),
            ("Asymptotic MTTFF", &self.analysis.asymptotic),
        ] {
            let _ = writeln!(out, "## {}\n", title);
            match estimate {
                Some(estimate) => {
                    let _ = writeln!(out, "`{}`\n", estimate.expression);
                    match estimate.value {
                        Some(value) => {
                            let _ = writeln!(out, "Value: {:.6e}\n", value);
                        }
                        None => {
                            let _ = writeln!(out, "Unbound: {}\n", estimate.free_variables.join(", "));
                        }
                    }
                }
                None => {
                    let reason = match (title, &self.analysis.exact_skipped) {
                        ("Exact MTTFF", Some(reason)) => reason.as_str(),
                        _ => "not computed",
                    };
                    let _ = writeln!(out, "Skipped: {}\n", reason);
                }
            }
        }

        if let Some(regime) = &self.analysis.regime {
            let _ = writeln!(
                out,
                "## Regime comparison\n\nFault rates scaled by {}: exact {:.6e}, asymptotic {:.6e}, ratio {:.6}\n",
                regime.fault_rate_scale, regime.exact, regime.asymptotic, regime.ratio
            );
        }

        if !self.analysis.graph.is_empty() {
            out.push_str("## Graph\n\n```\n");
            for line in &self.analysis.graph {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("```\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::mirrored_disk;

    fn bindings(pairs: &[(&str, f64)]) -> Bindings {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn mirrored_disk_both_estimates() {
        let options = AnalysisOptions {
            bindings: bindings(&[("e", 0.5), ("r", 2.0)]),
            ..AnalysisOptions::default()
        };
        let analysis = analyze_graph(&mirrored_disk(), &options).unwrap();
        assert_eq!(analysis.summary.resilience, 1);

        // (3e + r) / (2e^2) = 3.5 / 0.5
        let exact = analysis.exact.unwrap();
        assert!((exact.value.unwrap() - 7.0).abs() < 1e-12);
        // r / (2e^2) = 2 / 0.5
        let asymptotic = analysis.asymptotic.unwrap();
        assert!((asymptotic.value.unwrap() - 4.0).abs() < 1e-12);
        assert!(analysis.graph.is_empty());
    }

    #[test]
    fn unbound_variables_are_listed() {
        let options = AnalysisOptions {
            bindings: bindings(&[("e", 1.0)]),
            ..AnalysisOptions::default()
        };
        let analysis = analyze_graph(&mirrored_disk(), &options).unwrap();
        let exact = analysis.exact.unwrap();
        assert_eq!(exact.value, None);
        assert_eq!(exact.free_variables, vec!["r".to_string()]);
    }

    #[test]
    fn state_limit_skips_exact_solver() {
        let options = AnalysisOptions {
            exact_state_limit: 1,
            ..AnalysisOptions::default()
        };
        let analysis = analyze_graph(&mirrored_disk(), &options).unwrap();
        assert!(analysis.exact.is_none());
        assert!(analysis.exact_skipped.unwrap().contains("limit is 1"));
        assert!(analysis.asymptotic.is_some());

        let forced = AnalysisOptions {
            exact: ExactMode::Always,
            ..options
        };
        assert!(analyze_graph(&mirrored_disk(), &forced).unwrap().exact.is_some());
    }

    #[test]
    fn regime_ratio_approaches_one_for_rare_faults() {
        let regime = RegimeOptions {
            fault_rate_scale: 1e-6,
            bindings: bindings(&[("e", 1e-6), ("r", 1.0)]),
        };
        let options = AnalysisOptions {
            regime: Some(regime),
            show_graph: true,
            ..AnalysisOptions::default()
        };
        let analysis = analyze_graph(&mirrored_disk(), &options).unwrap();
        let regime = analysis.regime.unwrap();
        assert!((regime.ratio - 1.0).abs() < 1e-5);
        assert_eq!(analysis.graph.len(), 2);
    }

    #[test]
    fn malformed_graph_maps_to_model_error() {
        let g: StateGraph<u32, Expr> = StateGraph::new();
        let err = analyze_graph(&g, &AnalysisOptions::default()).unwrap_err();
        assert_eq!(err.code(), 21);
    }

    #[test]
    fn report_renders_all_formats() {
        let report = AnalysisReport::run(ModelKind::Nk, 1, &AnalysisOptions::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["model"], "nk");
        assert_eq!(json["redundancy"], 1);
        assert_eq!(json["summary"]["resilience"], 1);
        assert!(json["exact"]["expression"].is_string());
        assert!(json["exact"]["value"].is_null());

        let md = report.to_markdown();
        assert!(md.starts_with("# MTTFF analysis: nk (R = 1)"));
        assert!(md.contains("## Asymptotic MTTFF"));
        assert!(report.summary_line().starts_with("nk R=1: 2 states, resilience 1"));
    }
}
