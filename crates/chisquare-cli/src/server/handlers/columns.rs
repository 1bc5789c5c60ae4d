//! Column listing handler.

use axum::{body::Bytes, extract::State, Json};
use chisquare::ChiSquareError;
use serde::Serialize;

use super::{blocking, require_body};
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Response for the column listing endpoint.
#[derive(Serialize)]
pub struct ColumnsResponse {
    pub columns: Vec<ColumnInfo>,
    pub row_count: usize,
}

#[derive(Serialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Distinct non-missing values in the column.
    pub distinct_values: usize,
}

/// List the columns of an uploaded CSV.
pub async fn list_columns(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ColumnsResponse>, ApiError> {
    require_body(&body)?;
    let runner = state.runner();
    let dataset = blocking(move || runner.parse_bytes(&body)).await?;

    if dataset.column_count() < 2 {
        return Err(ChiSquareError::TooFewColumns {
            found: dataset.column_count(),
        }
        .into());
    }

    let columns = dataset
        .headers
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnInfo {
            name: name.clone(),
            distinct_values: dataset.distinct_count(i),
        })
        .collect();

    Ok(Json(ColumnsResponse {
        columns,
        row_count: dataset.row_count(),
    }))
}
