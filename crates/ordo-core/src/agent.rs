//! The Ordo agent: the query orchestration pipeline.
//!
//! Every query runs through the same compiled workflow:
//!
//!   parse_query → check_permissions ─┬─ select_tools → execute_tools
//!                                    │    → filter_results → aggregate_results ─┐
//!                                    └──────────────────────────────────────────┴─ generate_response
//!
//! Tool output never reaches the model or the user without passing through
//! the `ContentFilter`. Stages never abort: failures are appended to
//! `AgentState::errors` and reported by `generate_response`.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use ordo_contracts::{
    agent::{AgentState, ChatMessage, QueryContext, QueryResponse},
    audit::AuditEntry,
    error::{OrdoError, OrdoResult},
    permission::Surface,
    policy::FilterFailureMode,
    tool::{Source, ToolResult, ToolResults},
};

use crate::{
    classifier::KeywordClassifier,
    config::AgentSettings,
    prompts,
    traits::{AuditSink, ContentFilter, IntentClassifier, LanguageModel, ToolInvoker},
    workflow::{Route, Stage, Workflow, WorkflowBuilder},
};

/// Builds the language-model client during initialization.
///
/// `Ok(None)` means "no model configured"; the pipeline then degrades to
/// fixed responses instead of failing.
pub type ModelFactory =
    Box<dyn Fn() -> OrdoResult<Option<Arc<dyn LanguageModel>>> + Send + Sync>;

/// State built once by `initialize()` and shared read-only afterwards.
struct Runtime {
    model: Option<Arc<dyn LanguageModel>>,
    workflow: Workflow,
}

/// The query orchestrator.
///
/// Construct one per process and share it: all per-query state lives in the
/// `AgentState` created by `process_query`.
pub struct OrdoAgent {
    filter: Arc<dyn ContentFilter>,
    tools: Arc<dyn ToolInvoker>,
    classifier: Arc<dyn IntentClassifier>,
    audit: Option<Arc<dyn AuditSink>>,
    settings: AgentSettings,
    model_factory: ModelFactory,
    runtime: OnceCell<Runtime>,
}

impl OrdoAgent {
    /// Create an agent with the keyword classifier, default settings, no
    /// audit sink, and no language model.
    pub fn new(filter: Arc<dyn ContentFilter>, tools: Arc<dyn ToolInvoker>) -> Self {
        Self {
            filter,
            tools,
            classifier: Arc::new(KeywordClassifier),
            audit: None,
            settings: AgentSettings::default(),
            model_factory: Box::new(|| Ok(None)),
            runtime: OnceCell::new(),
        }
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Use `model` for every model call.
    pub fn with_model(self, model: Arc<dyn LanguageModel>) -> Self {
        self.with_model_factory(move || Ok(Some(Arc::clone(&model))))
    }

    /// Build the model lazily, during the first `initialize()`.
    pub fn with_model_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> OrdoResult<Option<Arc<dyn LanguageModel>>> + Send + Sync + 'static,
    {
        self.model_factory = Box::new(factory);
        self
    }

    /// Build the model client and compile the workflow.
    ///
    /// Idempotent and safe to call concurrently: exactly one caller runs the
    /// initialization, the others wait for it. A failed initialization is not
    /// cached, so the next call retries.
    pub async fn initialize(&self) -> OrdoResult<()> {
        self.runtime
            .get_or_try_init(|| async {
                let model = (self.model_factory)()?;
                match &model {
                    Some(_) => info!("language model client initialized"),
                    None => warn!("no language model configured; responses will be degraded"),
                }
                let workflow = build_workflow()?;
                info!("workflow compiled");
                Ok::<_, OrdoError>(Runtime { model, workflow })
            })
            .await?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.runtime.initialized()
    }

    fn model(&self) -> Option<&Arc<dyn LanguageModel>> {
        self.runtime.get().and_then(|rt| rt.model.as_ref())
    }

    /// Answer `query` on behalf of the user described by `context`.
    ///
    /// Never fails: any internal error becomes a synthetic response whose
    /// `errors` carries the message.
    pub async fn process_query(&self, query: &str, context: QueryContext) -> QueryResponse {
        let state = AgentState::new(query, context);
        info!(
            request_id = %state.request_id.0,
            user_id = %state.user_id,
            "processing query"
        );

        match self.run(state).await {
            Ok(final_state) => {
                info!(
                    request_id = %final_state.request_id.0,
                    sources = final_state.sources.len(),
                    errors = final_state.errors.len(),
                    "query processing completed"
                );
                final_state.into_response()
            }
            Err(e) => {
                error!(error = %e, "query processing failed");
                QueryResponse {
                    response: format!("I encountered an error processing your query: {}", e),
                    sources: Vec::new(),
                    errors: vec![e.to_string()],
                }
            }
        }
    }

    /// Drive `state` through the workflow and return the final state.
    pub async fn run(&self, mut state: AgentState) -> OrdoResult<AgentState> {
        self.initialize().await?;
        let runtime = self.runtime.get().ok_or_else(|| OrdoError::WorkflowError {
            reason: "runtime missing after initialization".to_string(),
        })?;
        let workflow = &runtime.workflow;

        let mut current = Some(workflow.entry());
        let mut steps = 0;
        while let Some(stage) = current {
            steps += 1;
            if steps > workflow.max_steps() {
                return Err(OrdoError::WorkflowError {
                    reason: format!("workflow did not terminate after {} stages", steps - 1),
                });
            }
            debug!(request_id = %state.request_id.0, stage = %stage, "entering stage");
            state = self.run_stage(stage, state).await;
            current = workflow.next(stage, &state);
        }

        Ok(state)
    }

    async fn run_stage(&self, stage: Stage, state: AgentState) -> AgentState {
        match stage {
            Stage::ParseQuery => self.parse_query(state).await,
            Stage::CheckPermissions => self.check_permissions(state),
            Stage::SelectTools => self.select_tools(state),
            Stage::ExecuteTools => self.execute_tools(state).await,
            Stage::FilterResults => self.filter_results(state).await,
            Stage::AggregateResults => self.aggregate_results(state),
            Stage::GenerateResponse => self.generate_response(state).await,
        }
    }

    // ── Stage 1: parse_query ─────────────────────────────────────────────────

    /// Ask the model for an intent summary of the query.
    pub async fn parse_query(&self, mut state: AgentState) -> AgentState {
        debug!(request_id = %state.request_id.0, query_chars = state.query.chars().count(), "parsing query");

        let Some(model) = self.model() else {
            state.intent = Some("unknown".to_string());
            state.errors.push(prompts::MODEL_NOT_INITIALIZED.to_string());
            return state;
        };

        let prompt = ChatMessage::human(prompts::intent_prompt(&state.query));
        match model.send(prompts::SYSTEM_PROMPT, std::slice::from_ref(&prompt)).await {
            Ok(intent) => {
                debug!(request_id = %state.request_id.0, intent = %intent, "intent extracted");
                state.messages.push(ChatMessage::system(prompts::SYSTEM_PROMPT));
                state.messages.push(prompt);
                state.messages.push(ChatMessage::assistant(intent.clone()));
                state.intent = Some(intent);
            }
            Err(e) => {
                error!(request_id = %state.request_id.0, error = %e, "query parsing failed");
                state.errors.push(format!("Query parsing failed: {}", e));
                state.intent = Some("unknown".to_string());
            }
        }

        state
    }

    // ── Stage 2: check_permissions ───────────────────────────────────────────

    /// Derive the permissions the intent needs and report the missing ones.
    pub fn check_permissions(&self, mut state: AgentState) -> AgentState {
        let required = self.classifier.classify(&state.intent_lower()).permissions;

        let missing: Vec<&str> = required
            .iter()
            .filter(|p| !state.permissions.has(**p))
            .map(|p| p.as_str())
            .collect();

        if missing.is_empty() {
            debug!(request_id = %state.request_id.0, required = ?required, "all required permissions granted");
        } else {
            let message = format!("{}: {}", prompts::MISSING_PERMISSIONS, missing.join(", "));
            warn!(request_id = %state.request_id.0, user_id = %state.user_id, "{}", message);
            state.errors.push(message);
        }

        state.required_permissions = required;
        state
    }

    // ── Stage 3: select_tools ────────────────────────────────────────────────

    /// Choose the tools to run for the intent.
    pub fn select_tools(&self, mut state: AgentState) -> AgentState {
        let mut tools = self.classifier.classify(&state.intent_lower()).tools;

        if self.settings.dedupe_tools {
            let mut seen = HashSet::new();
            tools.retain(|tool| seen.insert(tool.clone()));
        }

        debug!(request_id = %state.request_id.0, tools = ?tools, "tools selected");
        state.required_tools = tools;
        state
    }

    // ── Stage 4: execute_tools ───────────────────────────────────────────────

    /// Run every selected tool. One tool failing never stops the others.
    pub async fn execute_tools(&self, mut state: AgentState) -> AgentState {
        info!(request_id = %state.request_id.0, count = state.required_tools.len(), "executing tools");

        let params = json!({ "query": state.query, "intent": state.intent });
        let outcomes = if self.settings.concurrent_tools {
            self.invoke_concurrently(&state.required_tools, &params, &state.tokens).await
        } else {
            let mut outcomes = Vec::with_capacity(state.required_tools.len());
            for tool in &state.required_tools {
                let outcome = self.tools.invoke(tool, &params, &state.tokens).await;
                outcomes.push((tool.clone(), outcome));
            }
            outcomes
        };

        let mut results = ToolResults::new();
        for (tool, outcome) in outcomes {
            let surface = Surface::from_tool(&tool);
            let result = match outcome {
                Ok(result) if result.success => {
                    debug!(request_id = %state.request_id.0, tool = %tool, "tool succeeded");
                    result
                }
                Ok(result) => {
                    let reason = result.error.clone().unwrap_or_else(|| "unknown error".to_string());
                    warn!(request_id = %state.request_id.0, tool = %tool, reason = %reason, "tool reported failure");
                    state.errors.push(format!("Tool {} failed: {}", tool, reason));
                    ToolResult { success: false, error: Some(reason), ..result }
                }
                Err(e) => {
                    let reason = failure_reason(e);
                    error!(request_id = %state.request_id.0, tool = %tool, reason = %reason, "tool failed");
                    state.errors.push(format!("Tool {} failed: {}", tool, reason));
                    ToolResult::failed(reason)
                }
            };

            self.audit(AuditEntry::tool_invocation(
                state.user_id.clone(),
                surface,
                result.success,
                json!({ "tool": tool, "error": result.error }),
            ));
            results.insert(tool, result);
        }

        state.tool_results = results;
        state
    }

    async fn invoke_concurrently(
        &self,
        tools: &[String],
        params: &Value,
        tokens: &BTreeMap<String, String>,
    ) -> Vec<(String, OrdoResult<ToolResult>)> {
        let mut join_set = JoinSet::new();
        for (idx, tool) in tools.iter().enumerate() {
            let invoker = Arc::clone(&self.tools);
            let tool = tool.clone();
            let params = params.clone();
            let tokens = tokens.clone();
            join_set.spawn(async move {
                let outcome = invoker.invoke(&tool, &params, &tokens).await;
                (idx, outcome)
            });
        }

        let mut slots: Vec<Option<OrdoResult<ToolResult>>> = tools.iter().map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                // The panicking task's slot stays empty and is reported below.
                Err(join_err) => error!(error = %join_err, "tool task panicked"),
            }
        }

        tools
            .iter()
            .zip(slots)
            .map(|(tool, slot)| {
                let outcome = slot.unwrap_or_else(|| {
                    Err(OrdoError::ToolFailed {
                        tool: tool.clone(),
                        reason: "tool task aborted".to_string(),
                    })
                });
                (tool.clone(), outcome)
            })
            .collect()
    }

    // ── Stage 5: filter_results ──────────────────────────────────────────────

    /// Pass every tool result through the content filter.
    pub async fn filter_results(&self, mut state: AgentState) -> AgentState {
        let mut filtered = ToolResults::new();

        for (tool, result) in state.tool_results.iter() {
            let surface = Surface::from_tool(tool);
            match self.filter.filter_content(result.clone(), surface, &state.user_id).await {
                Ok(clean) => {
                    debug!(request_id = %state.request_id.0, tool = %tool, surface = %surface, "result filtered");
                    filtered.insert(tool, clean);
                }
                Err(e) => {
                    let failure = OrdoError::FilterFailed {
                        tool: tool.to_string(),
                        reason: e.to_string(),
                    };
                    match self.settings.filter_failure {
                        FilterFailureMode::FailOpen => {
                            error!(
                                request_id = %state.request_id.0,
                                error = %failure,
                                "passing result through unfiltered"
                            );
                            filtered.insert(tool, result.clone());
                        }
                        FilterFailureMode::FailClosed => {
                            error!(request_id = %state.request_id.0, error = %failure, "withholding result");
                            state.errors.push(failure.to_string());
                            filtered.insert(tool, ToolResult::failed(prompts::WITHHELD_AFTER_FILTER_FAILURE));
                        }
                    }
                }
            }
        }

        state.filtered_results = filtered;
        state
    }

    // ── Stage 6: aggregate_results ───────────────────────────────────────────

    /// Build one citation per successful filtered result.
    pub fn aggregate_results(&self, mut state: AgentState) -> AgentState {
        let preview_chars = self.settings.preview_chars;
        state.sources = state
            .filtered_results
            .iter()
            .filter(|(_, result)| result.success)
            .map(|(tool, result)| Source {
                surface: Surface::from_tool(tool),
                tool: tool.to_string(),
                preview: result.data_text().chars().take(preview_chars).collect(),
            })
            .collect();

        debug!(request_id = %state.request_id.0, sources = state.sources.len(), "results aggregated");
        state
    }

    // ── Stage 7: generate_response ───────────────────────────────────────────

    /// Produce the final answer text.
    pub async fn generate_response(&self, mut state: AgentState) -> AgentState {
        if !state.errors.is_empty() {
            state.response = Some(error_response(&state.errors));
            info!(request_id = %state.request_id.0, "generated error response");
            return state;
        }

        let Some(model) = self.model() else {
            warn!(request_id = %state.request_id.0, "cannot generate response: no language model");
            state.response = Some(prompts::SERVICE_UNAVAILABLE.to_string());
            return state;
        };

        let context = format_context(&state.filtered_results);
        let prompt = ChatMessage::human(prompts::answer_prompt(&context, &state.query));
        match model.send(prompts::SYSTEM_PROMPT, std::slice::from_ref(&prompt)).await {
            Ok(answer) => {
                state.messages.push(prompt);
                state.messages.push(ChatMessage::assistant(answer.clone()));
                state.response = Some(answer);
                info!(request_id = %state.request_id.0, "generated response");
            }
            Err(e) => {
                error!(request_id = %state.request_id.0, error = %e, "response generation failed");
                state.response = Some(format!(
                    "I encountered an error while generating a response: {}",
                    e
                ));
            }
        }

        state
    }

    fn audit(&self, entry: AuditEntry) {
        if let Some(sink) = &self.audit {
            if let Err(e) = sink.record(&entry) {
                warn!(action = %entry.action, error = %e, "audit entry dropped");
            }
        }
    }
}

/// Branch after `check_permissions`: any error skips straight to the answer.
pub fn should_continue_after_permissions(state: &AgentState) -> Route {
    if state.errors.is_empty() {
        Route::Continue
    } else {
        Route::Error
    }
}

/// The standard seven-stage Ordo workflow.
pub fn build_workflow() -> OrdoResult<Workflow> {
    WorkflowBuilder::new()
        .entry(Stage::ParseQuery)
        .edge(Stage::ParseQuery, Stage::CheckPermissions)
        .branch(
            Stage::CheckPermissions,
            should_continue_after_permissions,
            Stage::SelectTools,
            Stage::GenerateResponse,
        )
        .edge(Stage::SelectTools, Stage::ExecuteTools)
        .edge(Stage::ExecuteTools, Stage::FilterResults)
        .edge(Stage::FilterResults, Stage::AggregateResults)
        .edge(Stage::AggregateResults, Stage::GenerateResponse)
        .finish(Stage::GenerateResponse)
        .compile()
}

/// Render successful results as `[tool]: data` blocks for the model.
pub fn format_context(results: &ToolResults) -> String {
    let parts: Vec<String> = results
        .iter()
        .filter(|(_, result)| result.success)
        .map(|(tool, result)| {
            let data = match result.data {
                Some(_) => result.data_text(),
                None => "No data".to_string(),
            };
            format!("[{}]: {}", tool, data)
        })
        .collect();

    if parts.is_empty() {
        prompts::NO_DATA.to_string()
    } else {
        parts.join("\n\n")
    }
}

/// The user-facing sentence for a failed pipeline run.
pub fn error_response(errors: &[String]) -> String {
    match errors.iter().find(|e| e.starts_with(prompts::MISSING_PERMISSIONS)) {
        Some(permission_error) => format!("{} {}", prompts::PERMISSION_REQUEST, permission_error),
        None => format!("I encountered some issues: {}", errors.join("; ")),
    }
}

fn failure_reason(err: OrdoError) -> String {
    match err {
        OrdoError::ToolFailed { reason, .. } => reason,
        other => other.to_string(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
