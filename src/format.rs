//! Number formatting for tables, tooltips and chart axes.

use num_format::{Locale, ToFormattedString};

/// Map a user-provided locale tag to a `num_format::Locale`.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> &'static Locale {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => &Locale::de,
        "fr" | "fr_fr" => &Locale::fr,
        "es" | "es_es" => &Locale::es,
        "it" | "it_it" => &Locale::it,
        "pt" | "pt_pt" | "pt_br" => &Locale::pt,
        "nl" | "nl_nl" => &Locale::nl,
        _ => &Locale::en,
    }
}

/// Full count with thousands separators, e.g. `83,166,711` or `83.166.711`.
pub fn format_population(value: u64, locale_tag: &str) -> String {
    value.to_formatted_string(map_locale(locale_tag))
}

/// Scaled value with a suffix: `83.2M`, `950.0k`, `12`.
pub fn format_compact(value: u64, decimals: usize) -> String {
    let v = value as f64;
    if v >= 1.0e9 {
        format!("{:.*}B", decimals, v / 1.0e9)
    } else if v >= 1.0e6 {
        format!("{:.*}M", decimals, v / 1.0e6)
    } else if v >= 1.0e3 {
        format!("{:.*}k", decimals, v / 1.0e3)
    } else {
        value.to_string()
    }
}

/// Axis tick label in millions, e.g. `83.2M`.
pub fn format_millions(value: f64, decimals: usize) -> String {
    format!("{:.*}M", decimals, value / 1.0e6)
}

/// Optional count for tables; missing values print as `NA`.
pub fn fmt_opt(v: Option<u64>, locale_tag: &str) -> String {
    match v {
        Some(x) => format_population(x, locale_tag),
        None => "NA".to_string(),
    }
}

/// Pick a single Y-axis scale and its human label based on the overall magnitude.
/// Returns (scale, label), e.g. (1e6, "millions").
pub fn choose_axis_scale(max_abs: f64) -> (f64, &'static str) {
    if max_abs >= 1.0e9 {
        (1.0e9, "billions")
    } else if max_abs >= 1.0e6 {
        (1.0e6, "millions")
    } else if max_abs >= 1.0e3 {
        (1.0e3, "thousands")
    } else {
        (1.0, "")
    }
}
