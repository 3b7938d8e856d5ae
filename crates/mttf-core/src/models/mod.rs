//! Built-in storage reliability models.
//!
//! Each builder enumerates the damage states of one redundancy scheme and
//! wires its fault and recovery transitions through the public
//! [`StateGraph`](crate::graph::StateGraph) API. Builders are generic over the
//! rate type; [`ModelKind::build_symbolic`] instantiates them over [`Expr`]
//! with the conventional rate symbols.

mod lrc2;
mod nk;
mod nk_latent;

pub use lrc2::{lrc2_fail_graph, LrcRates, LrcState};
pub use nk::nk_fail_graph;
pub use nk_latent::{nk_le_fail_graph, LatentRates};

use crate::analysis::{analyze_graph, AnalysisOptions, GraphAnalysis};
use crate::graph::{GraphSummary, StateGraph};
use mttf_common::Error;
use mttf_config::validate::MAX_REDUNDANCY;
use mttf_math::Expr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// N-K replication.
    Nk,
    /// N-K replication with latent sector errors.
    NkLatent,
    /// Two-group local reconstruction code.
    Lrc2,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Nk, ModelKind::NkLatent, ModelKind::Lrc2];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Nk => "nk",
            ModelKind::NkLatent => "nk-latent",
            ModelKind::Lrc2 => "lrc2",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelKind::Nk => "N components, any R may fail",
            ModelKind::NkLatent => "N components with latent sector errors, any R may be damaged",
            ModelKind::Lrc2 => "two local groups of data blocks with local and R global parities",
        }
    }

    /// Free symbols of the symbolic model.
    pub fn symbols(&self) -> &'static [&'static str] {
        match self {
            ModelKind::Nk => &["N", "e", "r"],
            ModelKind::NkLatent => &["N", "e", "r", "es", "rs"],
            ModelKind::Lrc2 => &["N", "e", "rl", "rg"],
        }
    }

    /// Faults tolerated by the model at the given redundancy.
    pub fn expected_resilience(&self, redundancy: u32) -> usize {
        match self {
            ModelKind::Nk | ModelKind::NkLatent => redundancy as usize,
            ModelKind::Lrc2 => redundancy as usize + 1,
        }
    }

    /// Build the model over symbolic rates.
    ///
    /// The LRC model is sized from the total block count `N`: with `R` global
    /// parities and one local parity per group, each group holds
    /// `M = (N - R)/2 - 1` data blocks.
    pub fn build_symbolic(&self, redundancy: u32) -> Result<SymbolicModel, Error> {
        if redundancy > MAX_REDUNDANCY {
            return Err(Error::InvalidRedundancy {
                redundancy,
                reason: format!("at most {} is supported", MAX_REDUNDANCY),
            });
        }
        let n = Expr::symbol("N");
        let e = Expr::symbol("e");
        let model = match self {
            ModelKind::Nk => {
                SymbolicModel::Nk(nk_fail_graph(&n, redundancy, &e, &Expr::symbol("r"))?)
            }
            ModelKind::NkLatent => {
                let rates = LatentRates {
                    e,
                    r: Expr::symbol("r"),
                    es: Expr::symbol("es"),
                    rs: Expr::symbol("rs"),
                };
                SymbolicModel::NkLatent(nk_le_fail_graph(&n, redundancy, &rates)?)
            }
            ModelKind::Lrc2 => {
                let r = Expr::integer(i64::from(redundancy));
                let m = (n - r) / Expr::integer(2) - Expr::integer(1);
                let rates = LrcRates {
                    e,
                    rl: Expr::symbol("rl"),
                    rg: Expr::symbol("rg"),
                };
                SymbolicModel::Lrc2(lrc2_fail_graph(&m, redundancy, &rates)?)
            }
        };
        debug!(model = self.name(), redundancy, states = model.len(), "built model graph");
        Ok(model)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nk" => Ok(ModelKind::Nk),
            "nk-latent" | "nk_latent" | "nk-le" => Ok(ModelKind::NkLatent),
            "lrc2" | "lrc" => Ok(ModelKind::Lrc2),
            _ => Err(Error::UnknownModel {
                name: s.to_string(),
            }),
        }
    }
}

/// A built-in model instantiated over symbolic rates.
#[derive(Debug, Clone)]
pub enum SymbolicModel {
    Nk(StateGraph<u32, Expr>),
    NkLatent(StateGraph<(u32, u32), Expr>),
    Lrc2(StateGraph<LrcState, Expr>),
}

macro_rules! with_graph {
    ($model:expr, $g:ident => $body:expr) => {
        match $model {
            SymbolicModel::Nk($g) => $body,
            SymbolicModel::NkLatent($g) => $body,
            SymbolicModel::Lrc2($g) => $body,
        }
    };
}

impl SymbolicModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            SymbolicModel::Nk(_) => ModelKind::Nk,
            SymbolicModel::NkLatent(_) => ModelKind::NkLatent,
            SymbolicModel::Lrc2(_) => ModelKind::Lrc2,
        }
    }

    /// Number of internal states.
    pub fn len(&self) -> usize {
        with_graph!(self, g => g.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> Result<GraphSummary, Error> {
        Ok(with_graph!(self, g => g.summary())?)
    }

    pub fn render_lines(&self) -> Vec<String> {
        with_graph!(self, g => g.render_lines())
    }

    pub fn analyze(&self, options: &AnalysisOptions) -> Result<GraphAnalysis, Error> {
        with_graph!(self, g => analyze_graph(g, options))
    }
}

impl fmt::Display for SymbolicModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_graph!(self, g => write!(f, "{}", g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert_eq!("LRC".parse::<ModelKind>().unwrap(), ModelKind::Lrc2);
    }

    #[test]
    fn unknown_model_is_an_error() {
        let err = "raid5".parse::<ModelKind>().unwrap_err();
        assert_eq!(err.code(), 22);
    }

    #[test]
    fn built_models_have_expected_resilience() {
        for kind in ModelKind::ALL {
            let model = kind.build_symbolic(1).unwrap();
            assert_eq!(model.kind(), kind);
            assert_eq!(
                model.summary().unwrap().resilience,
                kind.expected_resilience(1)
            );
        }
    }

    #[test]
    fn redundancy_is_capped() {
        let err = ModelKind::Nk.build_symbolic(MAX_REDUNDANCY + 1).unwrap_err();
        assert!(matches!(err, Error::InvalidRedundancy { .. }));
    }

    #[test]
    fn lrc_block_count_uses_total_blocks() {
        let model = ModelKind::Lrc2.build_symbolic(2).unwrap();
        let SymbolicModel::Lrc2(graph) = model else {
            panic!("expected lrc2 graph");
        };
        let root = graph.root().unwrap();
        // M = (N - 2)/2 - 1, so N = 8 leaves 2 data blocks per group.
        let bindings = mttf_math::Bindings::from([("N".to_string(), 8.0), ("e".to_string(), 1.0)]);
        let data_rate = root.faults[0].rate.eval(&bindings).unwrap();
        assert!((data_rate - 2.0).abs() < 1e-12);
    }

    #[test]
    fn serde_uses_cli_names() {
        let json = serde_json::to_string(&ModelKind::NkLatent).unwrap();
        assert_eq!(json, "\"nk-latent\"");
    }
}
