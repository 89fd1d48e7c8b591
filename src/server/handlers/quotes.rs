use axum::extract::{Extension, Json};

use crate::api::{DynAPI, QuoteAPI, QuoteRequest};
use crate::entities::Quote;
use crate::error::Error;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<QuoteRequest>,
) -> Result<Json<Quote>, Error> {
    let quote = api.create_quote(params).await?;

    Ok(quote.into())
}
