//! Catalog listing: who can cut, what they sell, how customers pay.

use clipper_core::{Barber, PaymentMethod, Service};
use clipper_db::Session;
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct CatalogView {
    pub barbers: Vec<Barber>,
    pub services: Vec<Service>,
    pub payment_methods: Vec<PaymentMethod>,
}

/// Lists the catalog. Inactive rows are hidden unless `include_inactive`.
pub async fn catalog(session: &Session, include_inactive: bool) -> Result<CatalogView, ApiError> {
    let active_only = !include_inactive;

    Ok(CatalogView {
        barbers: session.list_barbers(active_only).await?,
        services: session.list_services(active_only).await?,
        payment_methods: session.list_payment_methods(active_only).await?,
    })
}
