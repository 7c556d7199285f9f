//! Scripted stand-ins for the completion model and the market data source

use crate::api::{MarketDataSource, RawRecord};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use research_llm::{LLMError, TextCompletion};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

type Responder = Box<dyn Fn(&str) -> research_llm::Result<String> + Send + Sync>;

/// Completion model that answers from a script and records every prompt
pub struct ScriptedCompletion {
    responder: Responder,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    /// Answer with `responses` in order, then fail
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue: Mutex<VecDeque<String>> =
            Mutex::new(responses.into_iter().map(Into::into).collect());
        Self::responding(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LLMError::RequestFailed("no scripted response left".to_string()))
        })
    }

    /// Answer every prompt through `responder`
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&str) -> research_llm::Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with a request error
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::responding(move |_| Err(LLMError::RequestFailed(message.clone())))
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> research_llm::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.responder)(prompt)
    }
}

/// One scripted provider answer
#[derive(Debug, Clone)]
pub enum Reply {
    Record(RawRecord),
    Throttled,
    Failed(String),
}

impl Reply {
    /// Record with the given P/E and PEG, as Yahoo would name them
    pub fn ratios(pe: f64, peg: f64) -> Self {
        Self::record(json!({
            "currentPrice": 100.0,
            "marketCap": 1_000_000_000_u64,
            "trailingPE": pe,
            "pegRatio": peg,
        }))
    }

    pub fn record(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self::Record(map),
            other => panic!("scripted record must be an object, got {other}"),
        }
    }
}

/// Market data source answering from per-symbol scripts
///
/// Each symbol's replies are consumed in order; the last reply repeats.
/// Unknown symbols fail. Calls are recorded with their (virtual) time.
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the replies for `symbol`
    pub fn with(self, symbol: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(symbol.to_string(), replies.into_iter().collect());
        self
    }

    /// Symbols looked up so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    /// Call times relative to the first call
    pub fn call_offsets(&self) -> Vec<std::time::Duration> {
        let calls = self.calls.lock().unwrap();
        let Some((_, first)) = calls.first() else {
            return Vec::new();
        };
        calls.iter().map(|(_, at)| at.duration_since(*first)).collect()
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    async fn fetch_info(&self, symbol: &str) -> Result<RawRecord> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), Instant::now()));

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            let queue = replies.get_mut(symbol);
            match queue {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Record(record)) => Ok(record),
            Some(Reply::Throttled) => Err(StockError::RateLimitExceeded {
                provider: "scripted".to_string(),
            }),
            Some(Reply::Failed(message)) => Err(StockError::ApiError(message)),
            None => Err(StockError::InvalidSymbol(symbol.to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
