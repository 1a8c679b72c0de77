//! Multi-endpoint registry transport.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use reqwest::header::{ACCEPT, CONTENT_TYPE as CONTENT_TYPE_HEADER};
use reqwest::{Method, Response, Url};
use schemabox_core::{
    ClientError, RegistryClient, RegistryError, RegistryResult, SchemaCodec, SchemaId, Version,
};
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, debug_span, warn};

use crate::error::BuildError;
use crate::metrics;
use crate::route::{Call, Route};
use crate::wire::{
    CONTENT_TYPE, IdResponse, SchemaPayload, SchemaResponse, SubjectVersionResponse,
};

/// Configuration shared by all clones of a transport.
struct Inner {
    endpoints: Vec<Url>,
    retries: u32,
    request_timeout: Option<Duration>,
    client: reqwest::Client,
}

/// HTTP transport talking to a set of registry replicas.
///
/// Each logical call starts at a randomly chosen endpoint and walks the
/// endpoint list round-robin on retry. Connection failures and `5xx`
/// responses are retried while the retry budget lasts; the outcome of the
/// last permitted attempt is returned as-is. Any other non-success status is
/// final and surfaces as [`ClientError::Registry`] with the registry's own
/// error code.
///
/// Clones share the endpoint list and the underlying connection pool.
///
/// # Type Parameters
///
/// * `C` - Codec schemas are compiled into (e.g. [`RawSchema`], `AvroCodec`)
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use schemabox_core::RawSchema;
/// use schemabox_reqwest::HttpTransport;
///
/// let transport = HttpTransport::<RawSchema>::builder()
///     .endpoints(["http://registry-a:8081", "http://registry-b:8081"])
///     .retries(3)
///     .request_timeout(Duration::from_secs(2))
///     .deadline(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// ```
///
/// [`RawSchema`]: schemabox_core::RawSchema
pub struct HttpTransport<C> {
    inner: Arc<Inner>,
    deadline: Option<Duration>,
    codec: PhantomData<fn() -> C>,
}

impl<C> Clone for HttpTransport<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            deadline: self.deadline,
            codec: PhantomData,
        }
    }
}

impl<C> fmt::Debug for HttpTransport<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoints", &self.inner.endpoints)
            .field("retries", &self.inner.retries)
            .field("request_timeout", &self.inner.request_timeout)
            .field("deadline", &self.deadline)
            .field("codec", &std::any::type_name::<C>())
            .finish()
    }
}

impl<C> HttpTransport<C> {
    /// Creates a new builder.
    pub fn builder() -> HttpTransportBuilder<C> {
        HttpTransportBuilder::new()
    }

    /// Creates a transport that tries each call once.
    pub fn new<I, S>(endpoints: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder().endpoints(endpoints).build()
    }

    /// Creates a transport that retries connection failures and `5xx`
    /// responses up to `retries` times.
    pub fn with_retries<I, S>(endpoints: I, retries: u32) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder().endpoints(endpoints).retries(retries).build()
    }

    /// Registry endpoints, in configured order.
    pub fn endpoints(&self) -> &[Url] {
        &self.inner.endpoints
    }

    /// Number of retries allowed per call.
    pub fn retries(&self) -> u32 {
        self.inner.retries
    }

    /// Deadline applied to every call made through this handle.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Returns a handle whose calls give up after `deadline`, retries
    /// included.
    ///
    /// The handle shares configuration and connections with `self`, so it is
    /// cheap enough to create per call.
    pub fn with_deadline(&self, deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
            ..self.clone()
        }
    }

    /// Returns a handle whose calls are bounded only by the retry budget.
    pub fn without_deadline(&self) -> Self {
        Self {
            deadline: None,
            ..self.clone()
        }
    }

    /// Performs one logical call and returns the raw success body.
    async fn call(&self, call: Call<'_>, body: Option<Bytes>) -> RegistryResult<Bytes> {
        call.route.validate()?;
        let span = debug_span!(
            "schemabox.call",
            method = %call.method,
            route = call.route.name(),
        );
        let started = Instant::now();
        let result = async {
            match self.deadline {
                Some(deadline) => {
                    match tokio::time::timeout(deadline, self.execute(&call, body)).await {
                        Ok(result) => result,
                        Err(_) => {
                            warn!(?deadline, path = %call.route, "registry call deadline exceeded");
                            Err(ClientError::DeadlineExceeded(deadline))
                        }
                    }
                }
                None => self.execute(&call, body).await,
            }
        }
        .instrument(span)
        .await;
        metrics::record_call(call.route.name(), started.elapsed());
        result
    }

    /// The retry loop.
    async fn execute(&self, call: &Call<'_>, body: Option<Bytes>) -> RegistryResult<Bytes> {
        let endpoints = &self.inner.endpoints;
        let offset = rand::thread_rng().gen_range(0..endpoints.len());
        let mut attempt: u32 = 0;

        loop {
            let endpoint = &endpoints[(offset + attempt as usize) % endpoints.len()];
            let url = call.route.url(endpoint);
            debug!(%url, attempt, "sending registry request");

            let outcome = self.send(call.method.clone(), url, body.clone()).await;
            metrics::record_attempt(endpoint, outcome.label());

            if outcome.is_retriable() && attempt < self.inner.retries {
                warn!(
                    %endpoint,
                    attempt,
                    retries = self.inner.retries,
                    outcome = outcome.label(),
                    "registry request failed, retrying"
                );
                metrics::record_retry();
                attempt += 1;
                continue;
            }

            return outcome.into_result().await;
        }
    }

    async fn send(&self, method: Method, url: Url, body: Option<Bytes>) -> Outcome {
        let mut request = self
            .inner
            .client
            .request(method, url)
            .header(CONTENT_TYPE_HEADER, CONTENT_TYPE)
            .header(ACCEPT, CONTENT_TYPE);
        if let Some(timeout) = self.inner.request_timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        match request.send().await {
            Ok(response) => Outcome::Responded(response),
            Err(err) => Outcome::Failed(err),
        }
    }

    async fn call_json<T>(&self, call: Call<'_>, body: Option<Bytes>) -> RegistryResult<T>
    where
        T: DeserializeOwned,
    {
        let bytes = self.call(call, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Result of a single attempt.
enum Outcome {
    /// No response was received.
    Failed(reqwest::Error),
    /// The endpoint answered, with any status.
    Responded(Response),
}

impl Outcome {
    fn is_retriable(&self) -> bool {
        match self {
            Self::Failed(_) => true,
            Self::Responded(response) => response.status().is_server_error(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Failed(_) => "connection_error",
            Self::Responded(response) => {
                let status = response.status();
                if is_success(status) {
                    "success"
                } else if status.is_server_error() {
                    "server_error"
                } else {
                    "registry_error"
                }
            }
        }
    }

    async fn into_result(self) -> RegistryResult<Bytes> {
        match self {
            Self::Failed(err) => Err(ClientError::transport(err)),
            Self::Responded(response) => {
                let status = response.status();
                if is_success(status) {
                    return response.bytes().await.map_err(ClientError::transport);
                }
                let body = match response.bytes().await {
                    Ok(body) => body,
                    Err(err) => {
                        debug!(%status, error = %err, "failed to read registry error body");
                        Bytes::new()
                    }
                };
                let err = RegistryError::from_body(status.as_u16(), &body);
                debug!(%status, error = %err, "registry returned an error");
                Err(err.into())
            }
        }
    }
}

fn is_success(status: reqwest::StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

fn schema_body(schema: &str) -> RegistryResult<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(&SchemaPayload { schema })?))
}

#[async_trait]
impl<C> RegistryClient for HttpTransport<C>
where
    C: SchemaCodec,
{
    type Codec = C;

    async fn get_schema(&self, id: SchemaId) -> RegistryResult<C> {
        let response: SchemaResponse = self
            .call_json(Call::get(Route::SchemaById(id)), None)
            .await?;
        Ok(C::compile(&response.schema)?)
    }

    async fn get_subjects(&self) -> RegistryResult<Vec<String>> {
        self.call_json(Call::get(Route::Subjects), None).await
    }

    async fn get_versions(&self, subject: &str) -> RegistryResult<Vec<u32>> {
        self.call_json(Call::get(Route::SubjectVersions(subject)), None)
            .await
    }

    async fn get_schema_by_version(&self, subject: &str, version: Version) -> RegistryResult<C> {
        let response: SubjectVersionResponse = self
            .call_json(Call::get(Route::SubjectVersion(subject, version)), None)
            .await?;
        debug!(
            subject = %response.subject,
            version = response.version,
            id = %response.id,
            "fetched subject version"
        );
        Ok(C::compile(&response.schema)?)
    }

    async fn create_subject(&self, subject: &str, schema: &str) -> RegistryResult<SchemaId> {
        let body = schema_body(schema)?;
        let response: IdResponse = self
            .call_json(Call::post(Route::SubjectVersions(subject)), Some(body))
            .await?;
        Ok(response.id)
    }

    async fn is_schema_registered(&self, subject: &str, schema: &str) -> RegistryResult<SchemaId> {
        let body = schema_body(schema)?;
        let response: IdResponse = self
            .call_json(Call::post(Route::Subject(subject)), Some(body))
            .await?;
        Ok(response.id)
    }

    async fn delete_subject(&self, subject: &str) -> RegistryResult<()> {
        self.call(Call::delete(Route::Subject(subject)), None).await?;
        Ok(())
    }

    async fn delete_version(&self, subject: &str, version: Version) -> RegistryResult<()> {
        self.call(Call::delete(Route::SubjectVersion(subject, version)), None)
            .await?;
        Ok(())
    }
}

/// Builder for [`HttpTransport`].
///
/// Use [`HttpTransport::builder()`] to create a new builder. At least one
/// endpoint is required; everything else has a default:
///
/// - `retries`: 0 (each call is tried once)
/// - `request_timeout`: none (the client's own timeout applies)
/// - `deadline`: none (calls are bounded by the retry budget only)
/// - `client`: a fresh `reqwest::Client`
pub struct HttpTransportBuilder<C> {
    endpoints: Vec<String>,
    retries: u32,
    request_timeout: Option<Duration>,
    deadline: Option<Duration>,
    client: Option<reqwest::Client>,
    codec: PhantomData<fn() -> C>,
}

impl<C> Default for HttpTransportBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> HttpTransportBuilder<C> {
    /// Creates a builder with no endpoints.
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            retries: 0,
            request_timeout: None,
            deadline: None,
            client: None,
            codec: PhantomData,
        }
    }

    /// Adds one registry endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.push(endpoint.into());
        self
    }

    /// Adds several registry endpoints.
    pub fn endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints.extend(endpoints.into_iter().map(Into::into));
        self
    }

    /// Sets how many times a retriable failure is retried.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the timeout of a single attempt.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the default deadline of a whole call, retries included.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Uses an existing `reqwest::Client`, e.g. one configured with TLS
    /// roots or a proxy.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Validates the endpoints and builds the transport.
    pub fn build(self) -> Result<HttpTransport<C>, BuildError> {
        if self.endpoints.is_empty() {
            return Err(BuildError::NoEndpoints);
        }
        let endpoints = self
            .endpoints
            .into_iter()
            .map(|endpoint| parse_endpoint(&endpoint))
            .collect::<Result<Vec<_>, _>>()?;
        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder().build()?,
        };
        Ok(HttpTransport {
            inner: Arc::new(Inner {
                endpoints,
                retries: self.retries,
                request_timeout: self.request_timeout,
                client,
            }),
            deadline: self.deadline,
            codec: PhantomData,
        })
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, BuildError> {
    let url = Url::parse(endpoint).map_err(|source| BuildError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(BuildError::NotABase(endpoint.to_owned()));
    }
    Ok(url)
}
