//! ThinkingEngine - Mode-aware, cached, quality-gated model invocation.
//!
//! Sits between the pipeline and the model port. One `think` call:
//!
//! 1. Resolves the requested mode for the stage
//! 2. Clips context to the mode budget and fingerprints the request
//! 3. Returns a cached result on a hit
//! 4. Otherwise invokes the model under a timeout, up to `1 + quality_retry`
//!    times, feeding each quality shortfall back into the next prompt
//! 5. Caches and returns the first response that passes every gate

use std::sync::Arc;
use std::time::Duration;

use crate::config::ThinkingConfig;
use crate::domain::thinking::{
    clip_tail, evaluate, extract_json_object, FingerprintInput, ModeBudget, QualityGate,
    RequestFingerprint, ResolvedMode, ShotCountGate, Shortfall, ThinkingError, ThinkingMode,
    ThinkingOutcome, ThinkingRequest, ThinkingResult, SHOT_KEYS,
};
use crate::ports::{
    InvocationConfig, ModelInvocationError, ModelPrompt, ModelProvider, ThinkingCache,
};

/// Why one attempt did not produce an accepted result.
#[derive(Debug, Clone)]
enum AttemptFailure {
    Quality(Shortfall),
    Generation(String),
}

/// Settings the engine reads from configuration.
#[derive(Debug, Clone)]
pub struct ThinkingSettings {
    pub default_mode: ThinkingMode,
    pub fast: ModeBudget,
    pub deep: ModeBudget,
    pub max_attempts: u32,
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

impl ThinkingSettings {
    pub fn from_config(config: &ThinkingConfig, temperature: Option<f32>) -> Self {
        Self {
            default_mode: config.default_mode,
            fast: config.fast.budget(),
            deep: config.deep.budget(),
            max_attempts: config.max_attempts(),
            timeout: config.timeout(),
            temperature,
        }
    }

    pub fn budget(&self, mode: ResolvedMode) -> ModeBudget {
        match mode {
            ResolvedMode::Fast => self.fast,
            ResolvedMode::Deep => self.deep,
        }
    }
}

impl Default for ThinkingSettings {
    fn default() -> Self {
        Self::from_config(&ThinkingConfig::default(), None)
    }
}

/// The thinking engine.
///
/// # Usage
///
/// ```rust,ignore
/// let engine = ThinkingEngine::new(model, cache, ThinkingSettings::default());
/// let outcome = engine.think(request, ThinkingMode::Auto).await?;
/// println!("{} shots in {} mode", outcome.result.shot_count, outcome.result.mode_used);
/// ```
pub struct ThinkingEngine {
    model: Arc<dyn ModelProvider>,
    cache: Arc<dyn ThinkingCache>,
    settings: ThinkingSettings,
    gates: Vec<Box<dyn QualityGate>>,
}

impl ThinkingEngine {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        cache: Arc<dyn ThinkingCache>,
        settings: ThinkingSettings,
    ) -> Self {
        Self {
            model,
            cache,
            settings,
            gates: vec![Box::new(ShotCountGate)],
        }
    }

    /// Adds a gate checked after the shot-count gate.
    pub fn with_gate(mut self, gate: impl QualityGate + 'static) -> Self {
        self.gates.push(Box::new(gate));
        self
    }

    /// Deliberates on one request.
    ///
    /// `ThinkingMode::Auto` is resolved per stage. The configured default
    /// mode is used by [`ThinkingEngine::think_default`].
    ///
    /// # Errors
    ///
    /// - `QualityGateFailure` when the last attempt was rejected by a gate
    /// - `GenerationFailure` when the model errored on the last attempt, or
    ///   failed with a non-transient error on any attempt
    pub async fn think(
        &self,
        request: ThinkingRequest,
        mode: ThinkingMode,
    ) -> Result<ThinkingOutcome, ThinkingError> {
        let stage = request.stage;
        let mode = mode.resolve_for(stage);
        let budget = self.settings.budget(mode);

        let previous =
            clip_tail(&request.previous_context, budget.truncation.previous_context_chars);
        let world = clip_tail(&request.world_context, budget.truncation.world_context_chars);

        let fingerprint = RequestFingerprint::compute(FingerprintInput {
            stage,
            mode,
            system_prompt: &request.system_prompt,
            prompt: &request.prompt,
            artifacts: &request.artifacts,
            previous_context: previous,
            world_context: world,
        });

        if request.refresh {
            tracing::debug!(%stage, %mode, %fingerprint, "thinking cache bypassed");
        } else if let Some(result) = self.cache.get(&fingerprint) {
            tracing::debug!(%stage, %mode, %fingerprint, "thinking cache hit");
            return Ok(ThinkingOutcome {
                result,
                cache_hit: true,
            });
        } else {
            tracing::debug!(%stage, %mode, %fingerprint, "thinking cache miss");
        }

        let base_prompt = compose_user_prompt(
            &request.prompt,
            &request.artifacts,
            previous,
            world,
            budget.min_shots,
        );
        let invocation = InvocationConfig {
            mode,
            max_tokens: budget.max_tokens,
            truncation: budget.truncation,
            temperature: self.settings.temperature,
        };

        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_failure: Option<AttemptFailure> = None;
        // Survives transient errors so a later retry still sees it.
        let mut last_shortfall: Option<Shortfall> = None;

        for attempt in 1..=max_attempts {
            let user = match &last_shortfall {
                Some(shortfall) => augment_prompt(&base_prompt, shortfall),
                None => base_prompt.clone(),
            };
            let prompt = ModelPrompt::new(request.system_prompt.clone(), user);

            let response = match self.invoke_with_timeout(prompt, invocation.clone()).await {
                Ok(text) => text,
                Err(err) if err.is_retryable() => {
                    tracing::warn!(%stage, %mode, attempt, error = %err, "transient model failure");
                    if attempt < max_attempts {
                        if let Some(wait) = err.retry_after() {
                            let wait = wait.min(self.settings.timeout);
                            tracing::debug!(%stage, wait_ms = wait.as_millis() as u64, "honouring rate limit");
                            tokio::time::sleep(wait).await;
                        }
                    }
                    last_failure = Some(AttemptFailure::Generation(err.to_string()));
                    continue;
                }
                Err(err) => {
                    tracing::error!(%stage, %mode, attempt, error = %err, "model invocation failed");
                    return Err(ThinkingError::GenerationFailure {
                        stage,
                        attempts: attempt,
                        reason: err.to_string(),
                    });
                }
            };

            match self.validate(&response, budget.min_shots) {
                Ok(shot_count) => {
                    let result = ThinkingResult {
                        content: response,
                        mode_used: mode,
                        shot_count,
                        quality_passed: true,
                        retry_count: attempt - 1,
                    };
                    self.cache.put(fingerprint, result.clone());
                    tracing::debug!(%stage, %mode, attempt, shot_count, "response accepted");
                    return Ok(ThinkingOutcome {
                        result,
                        cache_hit: false,
                    });
                }
                Err(shortfall) => {
                    tracing::warn!(%stage, %mode, attempt, %shortfall, "response failed quality gate");
                    last_shortfall = Some(shortfall.clone());
                    last_failure = Some(AttemptFailure::Quality(shortfall));
                }
            }
        }

        Err(match last_failure {
            Some(AttemptFailure::Quality(shortfall)) => ThinkingError::QualityGateFailure {
                stage,
                attempts: max_attempts,
                shortfall,
            },
            Some(AttemptFailure::Generation(reason)) => ThinkingError::GenerationFailure {
                stage,
                attempts: max_attempts,
                reason,
            },
            None => ThinkingError::GenerationFailure {
                stage,
                attempts: 0,
                reason: "no attempt was made".to_string(),
            },
        })
    }

    /// Deliberates using the configured default mode.
    pub async fn think_default(
        &self,
        request: ThinkingRequest,
    ) -> Result<ThinkingOutcome, ThinkingError> {
        self.think(request, self.settings.default_mode).await
    }

    async fn invoke_with_timeout(
        &self,
        prompt: ModelPrompt,
        invocation: InvocationConfig,
    ) -> Result<String, ModelInvocationError> {
        match tokio::time::timeout(self.settings.timeout, self.model.invoke(prompt, invocation))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ModelInvocationError::Timeout {
                timeout_secs: self.settings.timeout.as_secs(),
            }),
        }
    }

    fn validate(&self, response: &str, min_shots: u32) -> Result<u32, Shortfall> {
        let document =
            extract_json_object(response).map_err(|detail| Shortfall::Unparseable { detail })?;
        evaluate(&document, min_shots, &self.gates)
    }
}

fn compose_user_prompt(
    prompt: &str,
    artifacts: &str,
    previous: &str,
    world: &str,
    min_shots: u32,
) -> String {
    let mut sections = vec![prompt.trim().to_string()];
    if !artifacts.trim().is_empty() {
        sections.push(format!("【前置产物】\n{}", artifacts.trim()));
    }
    if !previous.trim().is_empty() {
        sections.push(format!("【前情参考】\n{}", previous.trim()));
    }
    if !world.trim().is_empty() {
        sections.push(format!("【世界与设定参考】\n{}", world.trim()));
    }
    sections.push(format!(
        "【质量要求】\nJSON 中 {} 字段下的镜头合计不少于 {} 个，每个镜头需可直接执行。",
        SHOT_KEYS.join(" / "),
        min_shots
    ));
    sections.join("\n\n")
}

fn augment_prompt(base: &str, shortfall: &Shortfall) -> String {
    format!(
        "{}\n\n【上一次输出未通过质量检查】\n{}\n请修正上述问题后重新输出完整 JSON。",
        base, shortfall
    )
}
