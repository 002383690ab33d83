//! Error taxonomy for everything that talks to the CountriesNow API.
//!
//! The core transforms in [`crate::series`] and [`crate::cities`] never fail;
//! every failure mode lives at the fetch/decode boundary and is represented here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or HTTP transport failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status code without an API error envelope.
    #[error("request failed with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The API answered with `"error": true`.
    #[error("countriesnow api error: {0}")]
    Upstream(String),

    /// `data` missing, `null`, or an empty list where rows are required.
    #[error("empty payload: {0}")]
    EmptyPayload(&'static str),

    /// JSON did not match the expected shape.
    #[error("decode json: {0}")]
    Decode(#[from] serde_json::Error),

    /// A `year` or `value` field that is not a non-negative number.
    #[error("field `{field}` is not numeric: {raw:?}")]
    Coercion { field: &'static str, raw: String },

    /// No country with this ISO2 code in the country list.
    #[error("no country with iso2 code {0:?}")]
    CountryNotFound(String),
}
