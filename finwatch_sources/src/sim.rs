//! Deterministic stand-in upstream for dry runs and demos.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use finwatch_traits::{BoxError, Clock, Snapshot, SourceKind, StockSource};

/// Repeating pattern: `in_stock` with `quantity` on the shelf, then `sold_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimCycle {
    pub in_stock: Duration,
    pub sold_out: Duration,
    pub quantity: u32,
    pub cost: i64,
    /// Report the upcoming restock like the primary upstream does.
    pub report_restock: bool,
}

impl Default for SimCycle {
    fn default() -> Self {
        Self {
            in_stock: Duration::minutes(20),
            sold_out: Duration::minutes(150),
            quantity: 1_200,
            cost: 45_000,
            report_restock: true,
        }
    }
}

pub struct SimulatedSource<C> {
    clock: C,
    epoch: DateTime<Utc>,
    cycle: SimCycle,
}

impl<C: Clock> SimulatedSource<C> {
    /// The first period starts at the clock's current instant.
    pub fn new(clock: C, cycle: SimCycle) -> Self {
        let epoch = clock.now();
        Self {
            clock,
            epoch,
            cycle,
        }
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Snapshot {
        let period = (self.cycle.in_stock + self.cycle.sold_out)
            .num_milliseconds()
            .max(1);
        let elapsed = (now - self.epoch).num_milliseconds().rem_euclid(period);
        let period_start = now - Duration::milliseconds(elapsed);
        let in_stock = elapsed < self.cycle.in_stock.num_milliseconds();
        let (quantity, source) = if in_stock {
            // trickle down while on the shelf
            let frac = elapsed as f64 / self.cycle.in_stock.num_milliseconds().max(1) as f64;
            let left = (f64::from(self.cycle.quantity) * (1.0 - frac)).ceil() as u32;
            (left.max(1), SourceKind::Primary)
        } else {
            (0, SourceKind::Primary)
        };
        let authoritative_restock = (self.cycle.report_restock && !in_stock)
            .then(|| period_start + Duration::milliseconds(period));
        Snapshot {
            quantity,
            cost: self.cycle.cost,
            source,
            authoritative_restock,
        }
    }
}

#[async_trait]
impl<C: Clock> StockSource for SimulatedSource<C> {
    async fn fetch(&self) -> Result<Snapshot, BoxError> {
        Ok(self.snapshot_at(self.clock.now()))
    }
}
