//! Visitor country lookup against an IP geolocation endpoint.

use log::debug;
use serde::Deserialize;

use crate::error_handling::LookupError;

/// Country resolved for the current visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorCountry {
    /// Code as reported by the endpoint, not yet normalized
    pub code: String,
    /// Country name as reported by the endpoint
    pub name: String,
}

/// The fields we need from the endpoint's JSON; everything else is ignored.
#[derive(Debug, Deserialize)]
struct GeolocationPayload {
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
}

/// Issues one GET to `url` and extracts `{country_code, country_name}`.
///
/// No retry is attempted; the caller treats any error as "visit not recorded".
pub async fn lookup_visitor_country(
    client: &reqwest::Client,
    url: &str,
) -> Result<VisitorCountry, LookupError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Status(status.as_u16()));
    }
    let body = response.text().await?;
    debug!("Geolocation response: {} bytes", body.len());
    parse_payload(&body)
}

/// Parses a geolocation body; anything but a well-formed code/name pair fails.
pub(crate) fn parse_payload(body: &str) -> Result<VisitorCountry, LookupError> {
    let payload: GeolocationPayload =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;

    let code = non_empty(payload.country_code).ok_or(LookupError::MissingField("country_code"))?;
    let name = non_empty(payload.country_name).ok_or(LookupError::MissingField("country_name"))?;
    Ok(VisitorCountry { code, name })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
