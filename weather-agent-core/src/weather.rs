use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::model::WeatherRecord;

/// Source of current weather observations.
///
/// Implementations must be total: any lookup failure (network, HTTP status,
/// malformed payload, unknown location) is absorbed and mapped to a degraded
/// [`WeatherRecord`], never surfaced as an error. `None` is a violation of
/// this contract and the pipeline treats it as fatal for the run.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, location: &str) -> Option<WeatherRecord>;
}

/// Client for the keyless wttr.in JSON API (`?format=j1`).
#[derive(Debug, Clone)]
pub struct WttrClient {
    http: Client,
    base_url: String,
}

impl Default for WttrClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WttrClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            base_url: "https://wttr.in".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn fetch_current(&self, location: &str) -> Result<WeatherRecord> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(location));

        let res = self
            .http
            .get(&url)
            .query(&[("format", "j1")])
            .send()
            .await
            .context("Failed to send request to wttr.in")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read wttr.in response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "wttr.in request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: WttrReport =
            serde_json::from_str(&body).context("Failed to parse wttr.in JSON")?;

        record_from_report(parsed)
    }
}

#[async_trait]
impl WeatherSource for WttrClient {
    async fn current(&self, location: &str) -> Option<WeatherRecord> {
        match self.fetch_current(location).await {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!("weather lookup for {location:?} failed: {err:#}");
                Some(WeatherRecord::unavailable(location))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WttrValue {
    value: String,
}

#[derive(Debug, Deserialize)]
struct WttrCondition {
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "weatherDesc")]
    weather_desc: Vec<WttrValue>,
    #[serde(default)]
    humidity: Option<String>,
    #[serde(rename = "windspeedKmph", default)]
    windspeed_kmph: Option<String>,
    #[serde(rename = "FeelsLikeC", default)]
    feels_like_c: Option<String>,
    #[serde(default)]
    observation_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WttrArea {
    #[serde(rename = "areaName")]
    area_name: Vec<WttrValue>,
}

#[derive(Debug, Deserialize)]
struct WttrReport {
    current_condition: Vec<WttrCondition>,
    nearest_area: Vec<WttrArea>,
}

fn record_from_report(report: WttrReport) -> Result<WeatherRecord> {
    let current = report
        .current_condition
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("wttr.in response contained no current conditions"))?;

    let location = report
        .nearest_area
        .into_iter()
        .next()
        .and_then(|area| area.area_name.into_iter().next())
        .map(|name| name.value)
        .ok_or_else(|| anyhow!("wttr.in response contained no resolved area name"))?;

    let temperature_c = current
        .temp_c
        .parse::<f64>()
        .context("wttr.in temperature was not numeric")?;

    let description = current
        .weather_desc
        .into_iter()
        .next()
        .map(|desc| desc.value)
        .ok_or_else(|| anyhow!("wttr.in response contained no weather description"))?;

    Ok(WeatherRecord {
        location,
        temperature_c,
        description,
        humidity_pct: current.humidity.and_then(|v| v.parse().ok()),
        wind_speed_kph: current.windspeed_kmph.and_then(|v| v.parse().ok()),
        feels_like_c: current.feels_like_c.and_then(|v| v.parse().ok()),
        observed_at: current.observation_time,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        // Back off to a char boundary; provider error bodies can echo
        // non-ASCII input and must never make the degraded path panic.
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
