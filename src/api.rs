//! Synchronous client for the **CountriesNow API (v0.1)**.
//!
//! Three endpoints are used: the flag/country list, a country's population
//! series, and a country's city populations. Responses share an envelope
//! `{ "error": bool, "msg": string, "data": ... }`; every failure mode
//! (transport, `error: true`, missing data, non-numeric fields) surfaces as a
//! [`FetchError`].
//!
//! ### Notes
//! - Population `year`/`value` fields may be strings or numbers; they are
//!   coerced explicitly after decoding (see [`crate::models::NumericText`]).
//! - There is no retry. Network timeouts use a default of 30s and can be set
//!   with [`Client::new`].
//!
//! Typical usage:
//! ```no_run
//! # use popstat_rs::{Client, PopulationSource};
//! let client = Client::default();
//! let germany = client.country_by_iso2("DE")?;
//! let series = client.population(&germany.name)?;
//! # Ok::<(), popstat_rs::FetchError>(())
//! ```
use crate::error::FetchError;
use crate::models::{
    CityRecord, Country, Envelope, PopulationSeries, WireCity, WirePopulation,
};
use log::{debug, warn};
use reqwest::blocking::Client as HttpClient;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://countriesnow.space/api/v0.1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can hand out countries, population series and cities.
///
/// [`Client`] talks to the live API; views and tests only depend on this trait.
pub trait PopulationSource {
    fn countries(&self) -> Result<Vec<Country>, FetchError>;

    /// Population series of the country with this display name.
    fn population(&self, country_name: &str) -> Result<PopulationSeries, FetchError>;

    /// Cities of the country with this display name. Never returns an empty list.
    fn cities(&self, country_name: &str) -> Result<Vec<CityRecord>, FetchError>;

    /// Resolve an ISO2 code (case-insensitive) against the country list.
    fn country_by_iso2(&self, iso2: &str) -> Result<Country, FetchError> {
        let iso2 = iso2.trim();
        self.countries()?
            .into_iter()
            .find(|c| c.iso2.eq_ignore_ascii_case(iso2))
            .ok_or_else(|| FetchError::CountryNotFound(iso2.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT).expect("reqwest client build")
    }
}

impl Client {
    /// Build a client against `base_url` with a total request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .timeout(timeout) // total request timeout
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("popstat_rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url(path);
        debug!("GET {url}");
        let resp = self.http.get(&url).send()?;
        read_json(resp)
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<Value, FetchError> {
        let url = self.url(path);
        debug!("POST {url} {body}");
        let resp = self.http.post(&url).json(body).send()?;
        read_json(resp)
    }
}

/// Read a response body as JSON. Non-success statuses still carry an envelope
/// on this API (`404` with `{"error":true,"msg":...}`), so the body is checked first.
fn read_json(resp: Response) -> Result<Value, FetchError> {
    let status = resp.status();
    let text = resp.text()?;
    let parsed = serde_json::from_str::<Value>(&text);
    if status.is_success() {
        return Ok(parsed?);
    }
    match parsed {
        Ok(v) if v.get("error").and_then(Value::as_bool) == Some(true) => Ok(v),
        _ => Err(FetchError::Status {
            status: status.as_u16(),
            message: text.chars().take(200).collect(),
        }),
    }
}

/// Unwrap the `{error, msg, data}` envelope and decode `data` as `T`.
pub fn decode_envelope<T: DeserializeOwned>(
    v: Value,
    what: &'static str,
) -> Result<T, FetchError> {
    let env: Envelope<Value> = serde_json::from_value(v)?;
    if env.error {
        return Err(FetchError::Upstream(env.msg));
    }
    match env.data {
        None | Some(Value::Null) => Err(FetchError::EmptyPayload(what)),
        Some(data) => Ok(serde_json::from_value(data)?),
    }
}

/// Decode the response of `GET /countries/flag/images`.
pub fn decode_countries(v: Value) -> Result<Vec<Country>, FetchError> {
    decode_envelope(v, "country list")
}

/// Decode the response of `POST /countries/population`, coercing every count.
pub fn decode_population(v: Value) -> Result<PopulationSeries, FetchError> {
    let wire: WirePopulation = decode_envelope(v, "population data")?;
    PopulationSeries::try_from(wire)
}

/// Decode the response of `POST /countries/population/cities/filter`.
pub fn decode_cities(v: Value) -> Result<Vec<CityRecord>, FetchError> {
    let wire: Vec<WireCity> = decode_envelope(v, "city list")?;
    if wire.is_empty() {
        return Err(FetchError::EmptyPayload("city list"));
    }
    wire.into_iter().map(CityRecord::try_from).collect()
}

impl PopulationSource for Client {
    fn countries(&self) -> Result<Vec<Country>, FetchError> {
        let v = self.get_json("countries/flag/images")?;
        decode_countries(v).inspect_err(|e| warn!("country list: {e}"))
    }

    fn population(&self, country_name: &str) -> Result<PopulationSeries, FetchError> {
        let v = self.post_json("countries/population", &json!({ "country": country_name }))?;
        decode_population(v).inspect_err(|e| warn!("population for {country_name}: {e}"))
    }

    fn cities(&self, country_name: &str) -> Result<Vec<CityRecord>, FetchError> {
        let body = json!({
            "order": "asc",
            "orderBy": "name",
            "country": country_name,
        });
        let v = self.post_json("countries/population/cities/filter", &body)?;
        decode_cities(v).inspect_err(|e| warn!("cities for {country_name}: {e}"))
    }
}
