//! Stock cycle state machine: `Available ⇄ Depleted`, driven by successive
//! quantity observations.

/// Phase implied by a single quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockPhase {
    Available,
    Depleted,
}

impl StockPhase {
    #[inline]
    pub fn of(quantity: u32) -> Self {
        if quantity == 0 {
            StockPhase::Depleted
        } else {
            StockPhase::Available
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Quantity went from positive to zero.
    Depletion,
    /// Quantity went from zero to positive.
    Restock,
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Depletion => f.write_str("depletion"),
            Edge::Restock => f.write_str("restock"),
        }
    }
}

/// Result of comparing the previous observation with the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First observation of the process; never an edge.
    Initial(StockPhase),
    Edge(Edge),
    Steady(StockPhase),
}

impl Transition {
    pub fn edge(self) -> Option<Edge> {
        match self {
            Transition::Edge(e) => Some(e),
            _ => None,
        }
    }
}

/// Classify a new quantity against the previously observed one.
pub fn classify(prev: Option<u32>, next: u32) -> Transition {
    match prev {
        None => Transition::Initial(StockPhase::of(next)),
        Some(p) if p > 0 && next == 0 => Transition::Edge(Edge::Depletion),
        Some(0) if next > 0 => Transition::Edge(Edge::Restock),
        Some(_) => Transition::Steady(StockPhase::of(next)),
    }
}
