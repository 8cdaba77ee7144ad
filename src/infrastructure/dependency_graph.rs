use crate::domain::graph::Vertex;
use crate::domain::ports::DependencyLookup;
use crate::error::Result;
use crate::interfaces::csv::graph_reader::{GraphReader, GraphRow};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

const BUILTIN_GRAPH: &str = include_str!("../../data/dependency_graph.csv");

/// Directed graph of allowed revenue code, payment type and payment ground
/// transitions.
///
/// Built once at startup and then only read through [`DependencyLookup`].
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<Vertex, ()>,
    index: HashMap<Vertex, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The graph shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_rows(GraphReader::new(BUILTIN_GRAPH.as_bytes()).rows())
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_rows(GraphReader::new(file).rows())
    }

    pub fn from_rows(rows: impl IntoIterator<Item = Result<GraphRow>>) -> Result<Self> {
        let mut graph = Self::new();
        for row in rows {
            let row = row?;
            graph.add_path(&row.revenue_code, &row.payment_type, &row.payment_ground);
        }
        tracing::debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "dependency graph loaded"
        );
        Ok(graph)
    }

    /// Adds the three vertices of a path and its two hops. Existing vertices
    /// and edges are reused.
    pub fn add_path(&mut self, revenue_code: &str, payment_type: &str, payment_ground: &str) {
        let code = self.node(Vertex::revenue_code(revenue_code));
        let pay_type = self.node(Vertex::payment_type(payment_type));
        let ground = self.node(Vertex::payment_ground(payment_ground));
        self.graph.update_edge(code, pay_type, ());
        self.graph.update_edge(pay_type, ground, ());
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn node(&mut self, vertex: Vertex) -> NodeIndex {
        if let Some(index) = self.index.get(&vertex) {
            return *index;
        }
        let index = self.graph.add_node(vertex.clone());
        self.index.insert(vertex, index);
        index
    }
}

impl DependencyLookup for DependencyGraph {
    fn contains_vertex(&self, vertex: &Vertex) -> bool {
        self.index.contains_key(vertex)
    }

    fn contains_edge(&self, from: &Vertex, to: &Vertex) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(from), Some(to)) => self.graph.contains_edge(*from, *to),
            _ => false,
        }
    }
}
