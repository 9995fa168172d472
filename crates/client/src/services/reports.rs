//! Admin reporting endpoints.

use chrono::NaiveDateTime;
use tracing::instrument;

use crate::api::ApiGateway;
use crate::error::Result;
use crate::types::{LowStockProduct, SalesSummary, TopProduct};

/// Client for `/admin/reports`.
#[derive(Debug, Clone)]
pub struct ReportService {
    gateway: ApiGateway,
}

impl ReportService {
    /// Create the service over a gateway.
    #[must_use]
    pub const fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// Sales totals, optionally bounded to a window.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self))]
    pub async fn sales_summary(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<SalesSummary> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(from) = from {
            query.push(("from", from.format("%Y-%m-%dT%H:%M:%S").to_string()));
        }
        if let Some(to) = to {
            query.push(("to", to.format("%Y-%m-%dT%H:%M:%S").to_string()));
        }
        self.gateway.get_query("admin/reports/sales", &query).await
    }

    /// Best-selling products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self))]
    pub async fn top_products(&self, limit: u32) -> Result<Vec<TopProduct>> {
        self.gateway
            .get_query(
                "admin/reports/top-products",
                &[("limit", limit.to_string())],
            )
            .await
    }

    /// Products at or below a stock threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    #[instrument(skip(self))]
    pub async fn low_stock(&self, threshold: u32) -> Result<Vec<LowStockProduct>> {
        self.gateway
            .get_query(
                "admin/reports/low-stock",
                &[("threshold", threshold.to_string())],
            )
            .await
    }
}
