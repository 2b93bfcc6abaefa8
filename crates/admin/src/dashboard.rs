//! Admin dashboard: headline counters and the latest orders.

use tracing::{error, instrument};

use cue_shop_core::{DashboardStats, Order};

use crate::client::AdminClient;
use crate::orders::newest_first;

/// Orders shown under "recent orders".
pub const RECENT_ORDERS: usize = 5;

/// Everything the dashboard page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_orders: Vec<Order>,
}

impl AdminClient {
    /// Dashboard counters (`GET /admin/dashboard/stats`).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> crate::Result<DashboardStats> {
        self.get("/admin/dashboard/stats").await
    }

    /// Counters and recent orders, fetched concurrently.
    ///
    /// A failing half is logged and shown empty.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Dashboard {
        let (stats_result, orders_result) = tokio::join!(self.dashboard_stats(), self.orders());

        let stats = stats_result.unwrap_or_else(|e| {
            error!("Failed to fetch dashboard stats: {e}");
            DashboardStats::default()
        });

        let recent_orders = match orders_result {
            Ok(mut orders) => {
                newest_first(&mut orders);
                orders.truncate(RECENT_ORDERS);
                orders
            }
            Err(e) => {
                error!("Failed to fetch orders: {e}");
                Vec::new()
            }
        };

        Dashboard {
            stats,
            recent_orders,
        }
    }
}
