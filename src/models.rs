use crate::error::FetchError;
use serde::{Deserialize, Serialize};

/// Response envelope shared by every CountriesNow endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// A JSON number or numeric string, kept verbatim until it is coerced.
///
/// The API is inconsistent: country population counts arrive as numbers, city
/// counts as strings. Decoding never fails on the *content*; coercion does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NumericText(pub String);

impl<'de> Deserialize<'de> for NumericText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        struct NumericVisitor;

        impl<'de> Visitor<'de> for NumericVisitor {
            type Value = NumericText;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a number or a string holding a number")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(NumericText(v.to_string()))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(NumericText(v.to_string()))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(NumericText(v.to_string()))
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(NumericText(s.to_string()))
            }

            fn visit_string<E>(self, s: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(NumericText(s))
            }
        }

        deserializer.deserialize_any(NumericVisitor)
    }
}

impl NumericText {
    /// Parse as a non-negative count. Decimal text is truncated toward zero.
    pub fn to_count(&self, field: &'static str) -> Result<u64, FetchError> {
        let raw = self.0.trim();
        if let Ok(v) = raw.parse::<u64>() {
            return Ok(v);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 => Ok(f.trunc() as u64),
            _ => Err(self.coercion(field)),
        }
    }

    /// Parse as a calendar year. Decimal text is truncated toward zero.
    pub fn to_year(&self, field: &'static str) -> Result<i32, FetchError> {
        let raw = self.0.trim();
        if let Ok(v) = raw.parse::<i32>() {
            return Ok(v);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= i32::MIN as f64 && f <= i32::MAX as f64 => {
                Ok(f.trunc() as i32)
            }
            _ => Err(self.coercion(field)),
        }
    }

    fn coercion(&self, field: &'static str) -> FetchError {
        FetchError::Coercion {
            field,
            raw: self.0.clone(),
        }
    }
}

/// Raw `{year, value}` pair from the population endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePopulationCount {
    pub year: NumericText,
    pub value: NumericText,
}

/// Raw `data` object of `POST /countries/population`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePopulation {
    pub country: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub iso3: Option<String>,
    #[serde(rename = "populationCounts", default)]
    pub population_counts: Vec<WirePopulationCount>,
}

/// Raw city count. The upstream spells `reliabilty` without the second "i".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireCityCount {
    pub year: NumericText,
    pub value: NumericText,
    #[serde(default)]
    pub sex: String,
    #[serde(rename = "reliabilty", alias = "reliability", default)]
    pub reliability: String,
}

/// Raw row of `POST /countries/population/cities/filter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireCity {
    pub city: String,
    pub country: String,
    #[serde(rename = "populationCounts", default)]
    pub population_counts: Vec<WireCityCount>,
}

/// A country as listed by `GET /countries/flag/images`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Country {
    pub name: String,
    #[serde(default)]
    pub flag: String,
    pub iso2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso3: Option<String>,
}

/// One observation of a country's population.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PopulationPoint {
    pub year: i32,
    pub value: u64,
}

impl PopulationPoint {
    pub fn new(year: i32, value: u64) -> Self {
        Self { year, value }
    }
}

impl TryFrom<WirePopulationCount> for PopulationPoint {
    type Error = FetchError;

    fn try_from(c: WirePopulationCount) -> Result<Self, Self::Error> {
        Ok(Self {
            year: c.year.to_year("year")?,
            value: c.value.to_count("value")?,
        })
    }
}

/// A country's population series. Point order is whatever the caller left it in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulationSeries {
    pub country_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso3: Option<String>,
    pub points: Vec<PopulationPoint>,
}

impl PopulationSeries {
    pub fn new(country_name: impl Into<String>, points: Vec<PopulationPoint>) -> Self {
        Self {
            country_name: country_name.into(),
            code: None,
            iso3: None,
            points,
        }
    }

    /// Same series with points ordered by year ascending.
    pub fn sorted(mut self) -> Self {
        self.points = crate::series::sort_series(&self.points);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<WirePopulation> for PopulationSeries {
    type Error = FetchError;

    fn try_from(w: WirePopulation) -> Result<Self, Self::Error> {
        let points = w
            .population_counts
            .into_iter()
            .map(PopulationPoint::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            country_name: w.country,
            code: w.code,
            iso3: w.iso3,
            points,
        })
    }
}

/// City-level count. `sex` and `reliability` are carried for display only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CityCount {
    pub year: i32,
    pub value: u64,
    pub sex: String,
    pub reliability: String,
}

impl TryFrom<WireCityCount> for CityCount {
    type Error = FetchError;

    fn try_from(c: WireCityCount) -> Result<Self, Self::Error> {
        Ok(Self {
            year: c.year.to_year("year")?,
            value: c.value.to_count("value")?,
            sex: c.sex,
            reliability: c.reliability,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CityRecord {
    pub city_name: String,
    pub country_name: String,
    pub population_counts: Vec<CityCount>,
}

impl CityRecord {
    /// The first listed count. The API gives no recency guarantee; the
    /// dashboard treats the first entry as the latest.
    pub fn latest_count(&self) -> Option<&CityCount> {
        self.population_counts.first()
    }

    /// Ranking value: the first count's value, `0` when there are none.
    pub fn latest_value(&self) -> u64 {
        self.latest_count().map(|c| c.value).unwrap_or(0)
    }
}

impl TryFrom<WireCity> for CityRecord {
    type Error = FetchError;

    fn try_from(w: WireCity) -> Result<Self, Self::Error> {
        let population_counts = w
            .population_counts
            .into_iter()
            .map(CityCount::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            city_name: w.city,
            country_name: w.country,
            population_counts,
        })
    }
}

/// One row of a two-country comparison. `None` means "no observation", never zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergedYearRecord {
    pub year: i32,
    pub value_a: Option<u64>,
    pub value_b: Option<u64>,
}
