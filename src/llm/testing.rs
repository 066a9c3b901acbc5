//! Deterministic stand-ins for the model backend.

use super::{ClientFactory, ModelService, ModelSettings};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
enum Reply {
    Answer(String),
    Fail(String),
}

/// Model that replies with a canned answer or error and records questions.
pub struct FakeModel {
    reply: Reply,
    questions: Arc<Mutex<Vec<String>>>,
    pub settings: Option<ModelSettings>,
}

impl FakeModel {
    pub fn answering(answer: &str) -> Self {
        Self::with_reply(Reply::Answer(answer.to_string()))
    }

    pub fn failing(cause: &str) -> Self {
        Self::with_reply(Reply::Fail(cause.to_string()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            questions: Arc::new(Mutex::new(Vec::new())),
            settings: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.questions.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelService for FakeModel {
    async fn invoke(&self, question: &str) -> Result<String> {
        self.questions.lock().unwrap().push(question.to_string());
        match &self.reply {
            Reply::Answer(answer) => Ok(answer.clone()),
            Reply::Fail(cause) => Err(anyhow!("{}", cause)),
        }
    }
}

/// Factory handing out [`FakeModel`]s that share one question log.
pub struct FakeFactory {
    reply: Reply,
    build_error: Option<String>,
    builds: AtomicUsize,
    questions: Arc<Mutex<Vec<String>>>,
}

impl FakeFactory {
    pub fn answering(answer: &str) -> Self {
        Self::new(Reply::Answer(answer.to_string()), None)
    }

    pub fn failing(cause: &str) -> Self {
        Self::new(Reply::Fail(cause.to_string()), None)
    }

    pub fn broken(cause: &str) -> Self {
        Self::new(Reply::Answer(String::new()), Some(cause.to_string()))
    }

    fn new(reply: Reply, build_error: Option<String>) -> Self {
        Self {
            reply,
            build_error,
            builds: AtomicUsize::new(0),
            questions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> usize {
        self.questions.lock().unwrap().len()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl ClientFactory for FakeFactory {
    type Handle = FakeModel;

    fn build(&self, settings: ModelSettings) -> Result<FakeModel> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if let Some(cause) = &self.build_error {
            return Err(anyhow!("{}", cause));
        }
        Ok(FakeModel {
            reply: self.reply.clone(),
            questions: Arc::clone(&self.questions),
            settings: Some(settings),
        })
    }
}

/// Collects formatted log lines written by a scoped `tracing` subscriber.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Subscriber formatting every level the way `main` does, minus colours.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }

    /// Lines logged at ERROR that contain `message`.
    pub fn errors_containing(&self, message: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(" ERROR ") && line.contains(message))
            .map(str::to_string)
            .collect()
    }
}

pub struct LogWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> LogWriter {
        LogWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}
