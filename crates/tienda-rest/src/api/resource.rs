//! Generic CRUD over a REST collection.

use std::marker::PhantomData;

use tracing::{debug, instrument};

use tienda_core::models::{Resource, Validate};
use tienda_core::{ApiRequest, Result};

use crate::client::ApiClient;
use crate::envelope::{Envelope, ListEnvelope};

/// CRUD operations on the collection at `R::PATH`.
///
/// Single-entity responses are unwrapped from the envelope's `data`.
/// The handle is `Copy`, so calls can be started side by side.
pub struct ResourceApi<'a, R> {
    client: &'a ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceApi<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ResourceApi<'_, R> {}

impl<'a, R: Resource> ResourceApi<'a, R> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn item_path(id: i64) -> String {
        format!("{}/{}", R::PATH, id)
    }

    /// List the collection. A body without `data` is an empty list.
    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn list(self) -> Result<Vec<R>> {
        let body: ListEnvelope<R> = self.client.execute_json(ApiRequest::get(R::PATH)).await?;
        let items = body.into_items();
        debug!(count = items.len(), "listed");
        Ok(items)
    }

    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn get(self, id: i64) -> Result<R> {
        let body: Envelope<R> = self
            .client
            .execute_json(ApiRequest::get(Self::item_path(id)))
            .await?;
        Ok(body.data)
    }

    /// Validate and create. Invalid input never reaches the network.
    #[instrument(skip(self, input), fields(resource = R::NAME))]
    pub async fn create(self, input: &R::Input) -> Result<R> {
        input.validate()?;
        let request = ApiRequest::post(R::PATH).json(input)?;
        let body: Envelope<R> = self.client.execute_json(request).await?;
        Ok(body.data)
    }

    /// Validate and replace the entity with the given id.
    #[instrument(skip(self, input), fields(resource = R::NAME))]
    pub async fn update(self, id: i64, input: &R::Input) -> Result<R> {
        input.validate()?;
        let request = ApiRequest::put(Self::item_path(id)).json(input)?;
        let body: Envelope<R> = self.client.execute_json(request).await?;
        Ok(body.data)
    }

    /// Delete the entity; returns the confirmation text the server sends.
    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn delete(self, id: i64) -> Result<String> {
        let response = self
            .client
            .execute(ApiRequest::delete(Self::item_path(id)))
            .await?;
        Ok(response.text().to_string())
    }
}
