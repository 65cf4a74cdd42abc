//! Dashboard aggregation.

use tienda_core::models::DashboardStats;
use tienda_core::{ApiRequest, Result};

use crate::client::ApiClient;
use crate::endpoints::DASHBOARD;
use crate::envelope::MaybeEnveloped;

#[derive(Clone, Copy)]
pub struct DashboardApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DashboardApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the dashboard counters. Accepts an enveloped or bare body.
    pub async fn stats(self) -> Result<DashboardStats> {
        let body: MaybeEnveloped<DashboardStats> =
            self.client.execute_json(ApiRequest::get(DASHBOARD)).await?;
        Ok(body.into_inner())
    }
}
