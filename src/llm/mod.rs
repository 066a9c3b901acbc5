//! Model construction and invocation.
//!
//! A [`ClientFactory`] turns a model name into a handle implementing
//! [`ModelService`]. [`create_client`] validates and logs around the factory,
//! [`ask`] runs a single question against a handle, and [`explain`] does both
//! with a fresh handle per question.

pub mod ollama;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::{ClientError, QueryError};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error};

/// Instruction sent with every question.
pub const SYSTEM_MESSAGE: &str =
    "Analyze the text and provide a clear summary in valid JSON format.";

/// Output format requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Configuration carried by a model handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub model: String,
    pub system_message: String,
    pub output_format: OutputFormat,
    /// Enforce the output format at decode time instead of only asking for it.
    pub strict: bool,
}

impl ModelSettings {
    /// Settings for a model asked to summarize its input as JSON.
    pub fn json_summary(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_message: SYSTEM_MESSAGE.to_string(),
            output_format: OutputFormat::Json,
            strict: true,
        }
    }
}

/// A configured model that can answer a question.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Send `question` to the model and return its raw reply.
    async fn invoke(&self, question: &str) -> Result<String>;
}

/// Builds model handles from settings.
pub trait ClientFactory {
    type Handle: ModelService;

    fn build(&self, settings: ModelSettings) -> Result<Self::Handle>;
}

/// Create a handle for `model`.
///
/// Failures are logged here and handed back as values; the caller decides
/// what to show the user.
pub fn create_client<F: ClientFactory>(
    factory: &F,
    model: &str,
) -> Result<F::Handle, ClientError> {
    let model = model.trim();
    let result = if model.is_empty() {
        Err(ClientError::InvalidArgument)
    } else {
        factory
            .build(ModelSettings::json_summary(model))
            .map_err(|e| ClientError::Initialization(format!("{:#}", e)))
    };

    if let Err(e) = &result {
        error!("Error initializing the model: {}", e);
    }
    result
}

/// Ask `question` using `handle`.
///
/// Without a handle nothing is sent and [`QueryError::ModelUnavailable`] is
/// returned. The reply is passed through untouched; it is not checked for JSON.
pub async fn ask<S>(handle: Option<&S>, question: &str) -> Result<String, QueryError>
where
    S: ModelService + ?Sized,
{
    let Some(handle) = handle else {
        return Err(QueryError::ModelUnavailable);
    };

    debug!("Invoking model: {}", question);
    match handle.invoke(question).await {
        Ok(response) => {
            debug!("Model replied with {} bytes", response.len());
            Ok(response)
        }
        Err(e) => {
            error!("Error invoking the model: {:#}", e);
            Err(QueryError::Invocation(format!("{:#}", e)))
        }
    }
}

/// Build a fresh handle for `model` and ask it `question`.
pub async fn explain<F: ClientFactory>(
    factory: &F,
    model: &str,
    question: &str,
) -> Result<String, QueryError> {
    let handle = create_client(factory, model).ok();
    ask(handle.as_ref(), question).await
}
