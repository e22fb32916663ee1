//! Open-Meteo forecast source

use super::Source;
use crate::batch;
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::types::Coordinates;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Timeout for the forecast request. Not configurable per run.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const COLUMN_TIME: &str = "time";
pub const COLUMN_TEMP: &str = "temp";
pub const COLUMN_HUMIDITY: &str = "humidity";

/// Response body of the forecast endpoint. Only the hourly block is read.
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Option<Vec<String>>,
    #[serde(default)]
    temperature_2m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    relativehumidity_2m: Option<Vec<Option<f64>>>,
}

/// Fetches hourly temperature and humidity for one coordinate pair
pub struct OpenMeteoSource {
    client: HttpClient,
    config: SourceConfig,
}

impl OpenMeteoSource {
    /// Create a source. Fails if the endpoint is not a valid http(s) URL.
    pub fn new(config: SourceConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::with_config(HttpClientConfig::with_timeout(REQUEST_TIMEOUT))?;
        Ok(Self { client, config })
    }

    /// Coordinates this source was built for
    pub fn coordinates(&self) -> Coordinates {
        self.config.coordinates()
    }

    fn request_config(&self) -> RequestConfig {
        RequestConfig::new()
            .query("latitude", self.config.latitude.to_string())
            .query("longitude", self.config.longitude.to_string())
            .query("hourly", self.config.hourly_param())
    }
}

#[async_trait]
impl Source for OpenMeteoSource {
    fn name(&self) -> &str {
        "open-meteo"
    }

    async fn extract(&self) -> Result<RecordBatch> {
        info!(
            "Fetching hourly {} for ({}, {})",
            self.config.hourly_param(),
            self.config.latitude,
            self.config.longitude
        );

        let response: ForecastResponse = self
            .client
            .get_json_with_config(&self.config.endpoint, self.request_config())
            .await?;

        let batch = hourly_to_batch(response).inspect_err(|e| {
            error!("Invalid forecast response: {}", e);
        })?;

        debug!("Extracted {} hourly rows", batch.num_rows());
        Ok(batch)
    }
}

/// Build the `time`/`temp`/`humidity` batch from the hourly arrays.
///
/// The arrays are matched by position, so their lengths must agree.
fn hourly_to_batch(response: ForecastResponse) -> Result<RecordBatch> {
    let hourly = response
        .hourly
        .ok_or_else(|| Error::decode("Response has no 'hourly' object"))?;

    let time = hourly
        .time
        .ok_or_else(|| Error::decode("Response has no 'hourly.time' array"))?;
    let temperature = hourly
        .temperature_2m
        .ok_or_else(|| Error::decode("Response has no 'hourly.temperature_2m' array"))?;
    let humidity = hourly
        .relativehumidity_2m
        .ok_or_else(|| Error::decode("Response has no 'hourly.relativehumidity_2m' array"))?;

    if temperature.len() != time.len() || humidity.len() != time.len() {
        return Err(Error::validation(format!(
            "Hourly arrays differ in length: time={}, temperature_2m={}, relativehumidity_2m={}",
            time.len(),
            temperature.len(),
            humidity.len()
        )));
    }

    batch::from_columns(vec![
        (COLUMN_TIME, Arc::new(StringArray::from(time)) as ArrayRef),
        (
            COLUMN_TEMP,
            Arc::new(Float64Array::from(temperature)) as ArrayRef,
        ),
        (
            COLUMN_HUMIDITY,
            Arc::new(Float64Array::from(humidity)) as ArrayRef,
        ),
    ])
}

#[cfg(test)]
pub(super) fn parse_hourly(body: serde_json::Value) -> Result<RecordBatch> {
    let response: ForecastResponse = serde_json::from_value(body)?;
    hourly_to_batch(response)
}
