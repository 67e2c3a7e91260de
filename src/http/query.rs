//! Query string parsing module
//!
//! Extracts layout options for /convert. Every parameter falls back to its
//! documented default when absent or unparseable; an invalid `direction`
//! value is logged and defaulted rather than rejected.

use crate::convert::{
    ConvertOptions, LayoutDirection, DEFAULT_MARGINX, DEFAULT_MARGINY, DEFAULT_NODESEP,
    DEFAULT_RANKSEP,
};
use crate::logger;

/// Parse the /convert layout options from a request query string
pub fn layout_options(query: Option<&str>) -> ConvertOptions {
    let direction = match param(query, "direction") {
        None => LayoutDirection::default(),
        Some(raw) => LayoutDirection::parse(raw).unwrap_or_else(|| {
            logger::log_warning(&format!(
                "Invalid direction '{raw}', falling back to {}",
                LayoutDirection::default()
            ));
            LayoutDirection::default()
        }),
    };

    ConvertOptions {
        direction,
        nodesep: int_param(query, "nodesep", DEFAULT_NODESEP),
        ranksep: int_param(query, "ranksep", DEFAULT_RANKSEP),
        marginx: int_param(query, "marginx", DEFAULT_MARGINX),
        marginy: int_param(query, "marginy", DEFAULT_MARGINY),
    }
}

/// Raw value of a query parameter, first occurrence wins
fn param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Integer parameter with fallback-to-default on absence or parse failure
fn int_param(query: Option<&str>, name: &str, default: u32) -> u32 {
    param(query, name)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
