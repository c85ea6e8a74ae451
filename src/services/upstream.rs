//! Resilient HTTP client for the mailing-list provider.
//!
//! Wraps `reqwest` with the plumbing every provider call shares:
//! - exponential backoff with jitter on retryable statuses
//! - separate read/write timeouts
//! - a per-destination circuit breaker
//! - structured request logging and optional Prometheus metrics
//!
//! The client is `Clone` and takes `&self` everywhere; breaker state lives
//! behind a shared mutex so one instance can serve the whole app.

use prometheus::{CounterVec, HistogramVec, Opts, Registry};
use reqwest::{Client, Method, Response};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_retry::{
    Retry,
    strategy::{ExponentialBackoff, jitter},
};
use tracing::{error, info, warn};

/// Configuration for the upstream HTTP client
#[derive(Debug, Clone)]
pub struct UpstreamClientConfig {
    /// Timeout for read operations (in seconds)
    pub read_timeout_seconds: u64,
    /// Timeout for write operations (in seconds)
    pub write_timeout_seconds: u64,
    /// Connection timeout (in seconds)
    pub connect_timeout_seconds: u64,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Circuit breaker configuration
    pub circuit_breaker: CircuitBreakerConfig,
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_attempts: usize,
    /// Initial retry delay in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum retry delay in milliseconds
    pub max_delay_ms: u64,
    /// Retry on these HTTP status codes
    pub retry_on_status: Vec<u16>,
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failure threshold to open the circuit
    pub failure_threshold: usize,
    /// Success threshold to close the circuit
    pub success_threshold: usize,
    /// Timeout before attempting to close circuit (in seconds)
    pub timeout_seconds: u64,
}

impl Default for UpstreamClientConfig {
    fn default() -> Self {
        Self {
            read_timeout_seconds: 5,
            write_timeout_seconds: 10,
            connect_timeout_seconds: 3,
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5_000,
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            timeout_seconds: 60,
        }
    }
}

/// Circuit breaker state
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Per-destination circuit breaker
#[derive(Debug)]
pub struct CircuitBreaker {
    state: CircuitState,
    failure_count: usize,
    success_count: usize,
    config: CircuitBreakerConfig,
    last_failure_time: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            config,
            last_failure_time: None,
        }
    }

    pub fn call_allowed(&mut self) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let timed_out = self
                    .last_failure_time
                    .is_some_and(|t| t.elapsed() >= Duration::from_secs(self.config.timeout_seconds));
                if timed_out {
                    self.state = CircuitState::HalfOpen;
                    self.success_count = 0;
                }
                timed_out
            }
            CircuitState::HalfOpen => true,
        }
    }

    pub fn on_success(&mut self) {
        self.failure_count = 0;
        if self.state == CircuitState::HalfOpen {
            self.success_count += 1;
            if self.success_count >= self.config.success_threshold {
                self.state = CircuitState::Closed;
            }
        }
    }

    pub fn on_failure(&mut self) {
        self.failure_count += 1;
        self.last_failure_time = Some(Instant::now());
        if self.failure_count >= self.config.failure_threshold {
            self.state = CircuitState::Open;
        }
    }

    pub fn state(&self) -> &CircuitState {
        &self.state
    }
}

/// Prometheus metrics for upstream calls
#[derive(Clone)]
pub struct UpstreamMetrics {
    /// Requests by destination, method, and outcome
    pub requests_total: CounterVec,
    /// Request duration by destination and method
    pub request_duration_seconds: HistogramVec,
    /// Retry attempts by destination and reason
    pub retries_total: CounterVec,
}

impl UpstreamMetrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests_total = CounterVec::new(
            Opts::new(
                "upstream_http_requests_total",
                "Upstream HTTP requests by destination, method, and outcome",
            ),
            &["destination", "method", "outcome"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "upstream_http_request_duration_seconds",
                "Duration of upstream HTTP requests",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["destination", "method"],
        )?;

        let retries_total = CounterVec::new(
            Opts::new(
                "upstream_http_retries_total",
                "Upstream retry attempts by destination and reason",
            ),
            &["destination", "reason"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        registry.register(Box::new(retries_total.clone()))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            retries_total,
        })
    }
}

/// One request, rebuilt from scratch on every retry attempt.
#[derive(Clone)]
struct RequestSpec {
    method: Method,
    url: String,
    basic_auth: Option<(String, String)>,
    form: Option<Vec<(String, String)>>,
}

impl RequestSpec {
    fn is_write(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD)
    }
}

/// Errors that can occur with the upstream client
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("circuit breaker is open")]
    CircuitOpen,

    #[error("retries exhausted, last status {0}")]
    RetryableStatus(u16),
}

impl UpstreamError {
    /// A message safe to put in an API response body.
    pub fn user_message(&self) -> String {
        match self {
            UpstreamError::Network(_) => {
                "Mailing list provider unreachable, please try again later".to_string()
            }
            UpstreamError::Timeout => {
                "Mailing list provider timed out, please try again later".to_string()
            }
            UpstreamError::CircuitOpen => {
                "Mailing list provider temporarily unavailable, please try again later".to_string()
            }
            UpstreamError::RetryableStatus(status) => {
                format!("Mailing list provider returned status {status}, please try again")
            }
        }
    }

    fn metric_outcome(&self) -> &'static str {
        match self {
            UpstreamError::Network(_) => "network_error",
            UpstreamError::Timeout => "timeout",
            UpstreamError::CircuitOpen => "circuit_open",
            UpstreamError::RetryableStatus(_) => "retry_exhausted",
        }
    }
}

/// Resilient HTTP client, shared across requests.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    config: UpstreamClientConfig,
    metrics: Option<UpstreamMetrics>,
    breakers: Arc<Mutex<HashMap<String, CircuitBreaker>>>,
}

impl UpstreamClient {
    pub fn new(
        config: UpstreamClientConfig,
        metrics: Option<UpstreamMetrics>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(
                config.read_timeout_seconds.max(config.write_timeout_seconds),
            ))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            metrics,
            breakers: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub async fn get(
        &self,
        url: &str,
        basic_auth: Option<(&str, &str)>,
    ) -> Result<Response, UpstreamError> {
        self.execute(self.spec(Method::GET, url, basic_auth, None)).await
    }

    pub async fn post_form(
        &self,
        url: &str,
        basic_auth: Option<(&str, &str)>,
        form: Vec<(String, String)>,
    ) -> Result<Response, UpstreamError> {
        self.execute(self.spec(Method::POST, url, basic_auth, Some(form)))
            .await
    }

    pub async fn put_form(
        &self,
        url: &str,
        basic_auth: Option<(&str, &str)>,
        form: Vec<(String, String)>,
    ) -> Result<Response, UpstreamError> {
        self.execute(self.spec(Method::PUT, url, basic_auth, Some(form)))
            .await
    }

    pub async fn delete(
        &self,
        url: &str,
        basic_auth: Option<(&str, &str)>,
    ) -> Result<Response, UpstreamError> {
        self.execute(self.spec(Method::DELETE, url, basic_auth, None))
            .await
    }

    fn spec(
        &self,
        method: Method,
        url: &str,
        basic_auth: Option<(&str, &str)>,
        form: Option<Vec<(String, String)>>,
    ) -> RequestSpec {
        RequestSpec {
            method,
            url: url.to_string(),
            basic_auth: basic_auth.map(|(u, p)| (u.to_string(), p.to_string())),
            form,
        }
    }

    /// Destination label (host) for metrics and breaker grouping.
    fn destination(url: &str) -> String {
        url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "invalid_url".to_string())
    }

    async fn execute(&self, spec: RequestSpec) -> Result<Response, UpstreamError> {
        let destination = Self::destination(&spec.url);
        let method = spec.method.to_string();

        {
            let mut breakers = self.breakers.lock().unwrap();
            let breaker = breakers
                .entry(destination.clone())
                .or_insert_with(|| CircuitBreaker::new(self.config.circuit_breaker.clone()));
            if !breaker.call_allowed() {
                warn!(
                    destination = %destination,
                    url = %spec.url,
                    "Circuit breaker is open, rejecting request"
                );
                if let Some(metrics) = &self.metrics {
                    metrics
                        .requests_total
                        .with_label_values(&[&destination, &method, "circuit_open"])
                        .inc();
                }
                return Err(UpstreamError::CircuitOpen);
            }
        }

        let timeout = if spec.is_write() {
            Duration::from_secs(self.config.write_timeout_seconds)
        } else {
            Duration::from_secs(self.config.read_timeout_seconds)
        };

        let strategy = ExponentialBackoff::from_millis(self.config.retry.initial_delay_ms)
            .max_delay(Duration::from_millis(self.config.retry.max_delay_ms))
            .map(jitter)
            .take(self.config.retry.max_attempts);

        let started = Instant::now();
        let retry_on_status = self.config.retry.retry_on_status.clone();
        let client = self.client.clone();

        let result = Retry::spawn(strategy, || {
            let client = client.clone();
            let spec = spec.clone();
            let retry_on_status = retry_on_status.clone();
            let destination = destination.clone();

            async move {
                let attempt_started = Instant::now();

                let mut builder = client.request(spec.method.clone(), &spec.url);
                if let Some((user, password)) = &spec.basic_auth {
                    builder = builder.basic_auth(user, Some(password));
                }
                if let Some(form) = &spec.form {
                    builder = builder.form(form);
                }

                match tokio::time::timeout(timeout, builder.send()).await {
                    Ok(Ok(response)) => {
                        let status = response.status().as_u16();
                        if retry_on_status.contains(&status) {
                            warn!(
                                destination = %destination,
                                method = %spec.method,
                                url = %spec.url,
                                status,
                                duration_ms = attempt_started.elapsed().as_millis() as u64,
                                "Request failed with retryable status"
                            );
                            Err(UpstreamError::RetryableStatus(status))
                        } else {
                            info!(
                                destination = %destination,
                                method = %spec.method,
                                url = %spec.url,
                                status,
                                duration_ms = attempt_started.elapsed().as_millis() as u64,
                                "Request completed"
                            );
                            Ok(response)
                        }
                    }
                    Ok(Err(e)) => {
                        error!(
                            destination = %destination,
                            method = %spec.method,
                            url = %spec.url,
                            error = %e,
                            "Request failed with network error"
                        );
                        Err(UpstreamError::Network(e))
                    }
                    Err(_) => {
                        warn!(
                            destination = %destination,
                            method = %spec.method,
                            url = %spec.url,
                            timeout_seconds = timeout.as_secs(),
                            "Request timed out"
                        );
                        Err(UpstreamError::Timeout)
                    }
                }
            }
        })
        .await;

        self.finish(&destination, &method, started.elapsed(), &result);
        result
    }

    fn finish(
        &self,
        destination: &str,
        method: &str,
        elapsed: Duration,
        result: &Result<Response, UpstreamError>,
    ) {
        if let Some(metrics) = &self.metrics {
            let outcome = match result {
                Ok(_) => "success",
                Err(e) => e.metric_outcome(),
            };
            metrics
                .requests_total
                .with_label_values(&[destination, method, outcome])
                .inc();
            metrics
                .request_duration_seconds
                .with_label_values(&[destination, method])
                .observe(elapsed.as_secs_f64());
            if let Err(e) = result {
                metrics
                    .retries_total
                    .with_label_values(&[destination, e.metric_outcome()])
                    .inc();
            }
        }

        let mut breakers = self.breakers.lock().unwrap();
        if let Some(breaker) = breakers.get_mut(destination) {
            match result {
                Ok(_) => breaker.on_success(),
                Err(_) => breaker.on_failure(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn config_defaults() {
        let config = UpstreamClientConfig::default();
        assert_eq!(config.read_timeout_seconds, 5);
        assert_eq!(config.write_timeout_seconds, 10);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.retry.retry_on_status.contains(&502));
    }

    #[test]
    fn metrics_register_cleanly() {
        let registry = Registry::new();
        assert!(UpstreamMetrics::new(&registry).is_ok());
    }

    #[test]
    fn destination_extraction() {
        assert_eq!(
            UpstreamClient::destination("https://api.mailgun.net/v3/lists"),
            "api.mailgun.net"
        );
        assert_eq!(UpstreamClient::destination("not a url"), "invalid_url");
    }

    #[test]
    fn circuit_breaker_opens_after_threshold() {
        let mut breaker = CircuitBreaker::new(CircuitBreakerConfig::default());

        assert_eq!(breaker.state(), &CircuitState::Closed);
        assert!(breaker.call_allowed());

        for _ in 0..5 {
            breaker.on_failure();
        }
        assert_eq!(breaker.state(), &CircuitState::Open);
        assert!(!breaker.call_allowed());

        // A success while open resets failures but does not close the circuit.
        breaker.on_success();
        assert_eq!(breaker.state(), &CircuitState::Open);
    }

    #[test]
    fn half_open_closes_after_successes() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 2,
            timeout_seconds: 0,
        };
        let mut breaker = CircuitBreaker::new(config);

        breaker.on_failure();
        assert_eq!(breaker.state(), &CircuitState::Open);

        // Zero timeout lets the breaker probe immediately.
        assert!(breaker.call_allowed());
        assert_eq!(breaker.state(), &CircuitState::HalfOpen);

        breaker.on_success();
        assert_eq!(breaker.state(), &CircuitState::HalfOpen);
        breaker.on_success();
        assert_eq!(breaker.state(), &CircuitState::Closed);
    }

    #[test]
    fn writes_use_write_timeout_classification() {
        let spec = RequestSpec {
            method: Method::POST,
            url: "https://api.example.com".to_string(),
            basic_auth: None,
            form: None,
        };
        assert!(spec.is_write());

        let get = RequestSpec {
            method: Method::GET,
            url: "https://api.example.com".to_string(),
            basic_auth: None,
            form: None,
        };
        assert!(!get.is_write());
    }

    #[test]
    fn user_messages_do_not_leak_detail() {
        assert!(UpstreamError::Timeout.user_message().contains("timed out"));
        assert!(
            UpstreamError::CircuitOpen
                .user_message()
                .contains("try again later")
        );
        assert!(
            UpstreamError::RetryableStatus(503)
                .user_message()
                .contains("503")
        );
    }
}
