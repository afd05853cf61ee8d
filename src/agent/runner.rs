//! Conversation runner - the tool calling loop.
//!
//! Each turn sends the whole transcript to the model, appends its reply,
//! and either finishes, runs a tool, or appends a corrective message. The
//! retry budget bounds how long a misbehaving model is tolerated.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::dispatch::{Dispatch, dispatch};
use super::parser::{ParsedResponse, parse_response};
use super::prompt::{NOT_UNDERSTOOD, render_system_prompt};
use crate::error::{FuncloopError, Result};
use crate::llm::{ChunkSink, GenerateOptions, LlmClient, Message};
use crate::tools::ToolRegistry;

/// Which turns draw from the retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryPolicy {
    /// Every turn that does not finish the conversation, including
    /// successful tool calls
    #[default]
    AllTurns,
    /// Only turns that needed correction; successful tool calls are bounded
    /// by `max_turns` instead
    ErrorsOnly,
}

/// Configuration for a Conversation
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub max_retries: u32,
    pub retry_policy: RetryPolicy,
    /// Hard ceiling on turns under `RetryPolicy::ErrorsOnly`
    pub max_turns: u32,
    /// Deadline covering one model call plus its tool call
    pub turn_timeout: Option<Duration>,
    pub temperature: Option<f32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_policy: RetryPolicy::AllTurns,
            max_turns: 16,
            turn_timeout: None,
            temperature: None,
        }
    }
}

/// Mutable state of one run, owned by the loop
#[derive(Debug, Clone)]
pub struct LoopState {
    pub messages: Vec<Message>,
    pub retries_remaining: u32,
    pub turns: u32,
}

impl LoopState {
    /// Seed the transcript with the system prompt and the user's query
    pub fn new(system_prompt: String, query: String, max_retries: u32) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::human(query)],
            retries_remaining: max_retries,
            turns: 0,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Spend one retry. Returns false once the budget is gone.
    pub fn consume_retry(&mut self) -> bool {
        if self.retries_remaining <= 1 {
            self.retries_remaining = 0;
            false
        } else {
            self.retries_remaining -= 1;
            true
        }
    }
}

/// Successful end of a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    pub answer: String,
    pub messages: Vec<Message>,
    pub turns: u32,
}

/// What a non-final turn appends
enum Step {
    /// Tool result; consumes a retry only under `AllTurns`
    Advance(Message),
    /// Corrective or error reply; always consumes a retry
    Recover(Message),
}

/// Drives a model through tool calls until it produces a final answer.
///
/// A Conversation holds no per-run state, so one value can serve any number
/// of sequential or concurrent runs.
pub struct Conversation<L: LlmClient> {
    llm: Arc<L>,
    registry: Arc<ToolRegistry>,
    config: LoopConfig,
    sink: Option<Arc<dyn ChunkSink>>,
    verbose: bool,
}

impl<L: LlmClient> Conversation<L> {
    pub fn new(llm: Arc<L>, registry: Arc<ToolRegistry>, config: LoopConfig) -> Self {
        Self {
            llm,
            registry,
            config,
            sink: None,
            verbose: false,
        }
    }

    /// Stream model output to `sink` as it is generated
    pub fn with_sink(mut self, sink: Arc<dyn ChunkSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Log raw model output alongside each call
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            temperature: self.config.temperature,
            sink: self.sink.clone(),
        }
    }

    /// Run one conversation to completion.
    ///
    /// Fails with `RetriesExhausted` when the budget runs out, and passes
    /// model transport failures, cancellation and deadlines straight through.
    pub async fn run(&self, query: impl Into<String>, cancel: &CancellationToken) -> Result<LoopOutcome> {
        let system_prompt = render_system_prompt(&self.registry)?;
        let mut state = LoopState::new(system_prompt, query.into(), self.config.max_retries);
        let options = self.generate_options();

        info!(
            "Starting conversation with {} (max retries {}, policy {:?})",
            self.llm.model(),
            self.config.max_retries,
            self.config.retry_policy
        );

        loop {
            if self.config.retry_policy == RetryPolicy::ErrorsOnly && state.turns >= self.config.max_turns {
                warn!("Turn limit of {} reached", self.config.max_turns);
                return Err(FuncloopError::TurnLimit { turns: state.turns });
            }

            state.turns += 1;
            let deadline = self.config.turn_timeout.map(|t| Instant::now() + t);
            debug!(
                "Turn {} ({} messages, {} retries left)",
                state.turns,
                state.messages.len(),
                state.retries_remaining
            );

            let reply = self
                .guarded(cancel, deadline, self.llm.generate(&state.messages, &options))
                .await??;
            state.push(Message::ai(reply.clone()));

            let step = match parse_response(&reply) {
                ParsedResponse::FinalAnswer(answer) => {
                    info!("Final response: {}", answer);
                    return Ok(self.finish(state, answer));
                }
                ParsedResponse::Unparseable => {
                    info!("Not a call: {}", reply);
                    Step::Recover(Message::human(NOT_UNDERSTOOD))
                }
                ParsedResponse::ToolCall(request) => {
                    info!("Call: {}", request.tool_name);
                    if self.verbose {
                        debug!("Call: {} (raw: {})", request.tool_name, reply);
                    }

                    match self.guarded(cancel, deadline, dispatch(&request, &self.registry)).await? {
                        Dispatch::Terminate(answer) => return Ok(self.finish(state, answer)),
                        Dispatch::Reject(message) => Step::Recover(message),
                        Dispatch::Continue { message, is_error: true } => Step::Recover(message),
                        Dispatch::Continue { message, is_error: false } => Step::Advance(message),
                    }
                }
            };

            let consumes = match step {
                Step::Advance(message) => {
                    state.push(message);
                    self.config.retry_policy == RetryPolicy::AllTurns
                }
                Step::Recover(message) => {
                    state.push(message);
                    true
                }
            };

            if consumes && !state.consume_retry() {
                warn!("Retries exhausted after {} turns", state.turns);
                return Err(FuncloopError::RetriesExhausted { turns: state.turns });
            }
        }
    }

    fn finish(&self, state: LoopState, answer: String) -> LoopOutcome {
        LoopOutcome {
            answer,
            messages: state.messages,
            turns: state.turns,
        }
    }

    /// Await `fut` unless the caller cancels or the turn deadline passes
    async fn guarded<F, T>(&self, cancel: &CancellationToken, deadline: Option<Instant>, fut: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        let bounded = async {
            match (deadline, self.config.turn_timeout) {
                (Some(deadline), Some(limit)) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .map_err(|_| FuncloopError::TurnTimeout {
                        ms: limit.as_millis() as u64,
                    }),
                _ => Ok(fut.await),
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FuncloopError::Cancelled),
            result = bounded => result,
        }
    }
}
