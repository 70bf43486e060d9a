//! Reconciliation of graph diagnostics with rule diagnostics
//!
//! The graph validator reports against materialized objects. Its findings are
//! filtered, mapped back to the construction nodes the objects came from and
//! appended after the rule diagnostics.

use super::diagnostics::Diagnostic;
use crate::graph::{GraphCode, GraphDiagnostic, GraphSeverity, MaterializedGraph};
use crate::instance::Document;
use tracing::warn;

/// Map the children of a graph diagnostic to document diagnostics.
///
/// Unresolved-proxy findings are dropped since the reference rules already
/// report them at the reference itself. Informational findings are dropped, as
/// are warnings unless `include_warnings` is set. A finding is anchored at the
/// construction node of its first data object, or at the document root when that
/// object did not come from the document.
pub fn remap(
    graph_diagnostic: &GraphDiagnostic,
    graph: &MaterializedGraph,
    document: &Document,
    include_warnings: bool,
) -> Vec<Diagnostic> {
    graph_diagnostic
        .children
        .iter()
        .filter(|child| child.code != Some(GraphCode::EveryProxyResolves))
        .filter_map(|child| {
            let diagnostic = match child.severity {
                GraphSeverity::Error => Diagnostic::error(child.message.clone()),
                GraphSeverity::Warning if include_warnings => Diagnostic::warning(child.message.clone()),
                _ => return None,
            };
            let origin = child.data.first().and_then(|&object| graph.origin(object));
            if origin.is_none() {
                warn!(message = %child.message, "graph diagnostic has no originating node, anchoring at root");
            }
            Some(diagnostic.on_node(origin.or_else(|| document.root())))
        })
        .collect()
}

/// Rule diagnostics followed by the remapped graph diagnostics
pub fn reconcile(
    local: Vec<Diagnostic>,
    graph_diagnostic: &GraphDiagnostic,
    graph: &MaterializedGraph,
    document: &Document,
    include_warnings: bool,
) -> Vec<Diagnostic> {
    local
        .into_iter()
        .chain(remap(graph_diagnostic, graph, document, include_warnings))
        .collect()
}
