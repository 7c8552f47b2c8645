use anyhow::Result;
use reqwest::{header::ACCEPT, Client};
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use std::sync::Arc;

use crate::config::Config;
use crate::constants::USER_AGENT;
use crate::error::ForecastError;
use crate::formatters::format_response;
use crate::models::{ForecastRecord, Granularity, WeatherForecastInput};

/// Main weather service that handles MCP requests
#[derive(Clone)]
pub struct Weather {
    client: Arc<Client>,
    config: Arc<Config>,
    tool_router: ToolRouter<Self>,
}

impl Weather {
    /// Creates a new Weather service instance
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        })
    }

    /// Fetches one point forecast from the DataHub
    async fn make_request(
        &self,
        granularity: Granularity,
        request: &WeatherForecastInput,
    ) -> Result<ForecastRecord, ForecastError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ForecastError::MissingApiKey)?;

        let url = self.config.endpoint_url(granularity.endpoint());
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header("apikey", api_key)
            .query(&[("latitude", request.latitude), ("longitude", request.longitude)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::from_status(status.as_u16()));
        }

        Ok(response.json::<ForecastRecord>().await?)
    }

    /// Fetches and renders a forecast. Failures come back as "Error: " text.
    pub async fn forecast_text(
        &self,
        granularity: Granularity,
        request: &WeatherForecastInput,
    ) -> String {
        match self.make_request(granularity, request).await {
            Ok(record) => {
                let output = format_response(&record, granularity, request.response_format);
                if output.truncated {
                    tracing::warn!(
                        endpoint = granularity.endpoint(),
                        chars = output.text.chars().count(),
                        "forecast response truncated to fit character limit"
                    );
                }
                output.text
            }
            Err(err) => {
                tracing::warn!(
                    endpoint = granularity.endpoint(),
                    category = err.category(),
                    "forecast request failed: {}",
                    err
                );
                err.user_message()
            }
        }
    }

    async fn forecast(
        &self,
        granularity: Granularity,
        request: WeatherForecastInput,
    ) -> Result<CallToolResult, McpError> {
        request
            .validate()
            .map_err(|msg| McpError::invalid_params(msg, None))?;

        tracing::info!(
            "Getting {} forecast for coordinates: {}, {} ({:?})",
            granularity.endpoint(),
            request.latitude,
            request.longitude,
            request.response_format
        );

        let text = self.forecast_text(granularity, &request).await;

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for Weather {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Site-specific weather forecasts from the UK Met Office DataHub for any \
                location worldwide. Hourly (48 hours), 3-hourly and daily (7 days) forecasts \
                as markdown or GeoJSON."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Weather {
    /// Gets the hourly forecast for a location
    #[tool(
        name = "uk_weather_get_hourly_forecast",
        description = "Get hourly weather forecast for up to 48 hours ahead for any location worldwide from the UK Met Office. Provide latitude and longitude (e.g., latitude: 51.5074, longitude: -0.1278 for London) and optionally response_format 'markdown' (default) or 'json'. Markdown shows the first 20 hours; use JSON for complete data.",
        annotations(
            title = "Get Hourly Weather Forecast",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn get_hourly_forecast(
        &self,
        Parameters(request): Parameters<WeatherForecastInput>,
    ) -> Result<CallToolResult, McpError> {
        self.forecast(Granularity::Hourly, request).await
    }

    /// Gets the 3-hourly forecast for a location
    #[tool(
        name = "uk_weather_get_three_hourly_forecast",
        description = "Get weather forecast at 3-hour intervals for up to 7 days ahead for any location worldwide from the UK Met Office. Provide latitude and longitude (e.g., latitude: 55.9533, longitude: -3.1883 for Edinburgh) and optionally response_format 'markdown' (default) or 'json'.",
        annotations(
            title = "Get 3-Hourly Weather Forecast",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn get_three_hourly_forecast(
        &self,
        Parameters(request): Parameters<WeatherForecastInput>,
    ) -> Result<CallToolResult, McpError> {
        self.forecast(Granularity::ThreeHourly, request).await
    }

    /// Gets the daily forecast for a location
    #[tool(
        name = "uk_weather_get_daily_forecast",
        description = "Get daily weather forecast summaries for up to 7 days ahead for any location worldwide from the UK Met Office. Provide latitude and longitude (e.g., latitude: 53.4808, longitude: -2.2426 for Manchester) and optionally response_format 'markdown' (default) or 'json'.",
        annotations(
            title = "Get Daily Weather Forecast",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn get_daily_forecast(
        &self,
        Parameters(request): Parameters<WeatherForecastInput>,
    ) -> Result<CallToolResult, McpError> {
        self.forecast(Granularity::Daily, request).await
    }
}
