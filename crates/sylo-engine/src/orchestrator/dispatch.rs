use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde_json::{Map, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sylo_core::errors::{CoreError, SyloError};
use sylo_core::handler::{CommandContext, CommandHandler};
use sylo_core::model::{CallerIdentity, CommandRequest, ErrorBody, ResponseEnvelope, ResponseMetadata};
use sylo_core::{log_op_end, log_op_error, log_op_start};
use sylo_core_types::{RequestContext, RequestId};
use tokio_util::sync::CancellationToken;

use super::{elapsed_ms, panic_message, Orchestrator};

impl Orchestrator {
    /// Dispatch one command on behalf of `identity`
    ///
    /// Always returns an envelope. Failures carry one of the stable error
    /// codes; `metadata.requestId` echoes the caller's id when supplied.
    pub async fn execute(&self, command: &CommandRequest, identity: &CallerIdentity) -> ResponseEnvelope {
        self.execute_with_cancellation(command, identity, CancellationToken::new())
            .await
    }

    /// Like [`Orchestrator::execute`], with a caller-owned cancellation token
    ///
    /// Cancelling `cancel` while the handler runs ends the dispatch with
    /// `EXECUTION_FAILED`. The handler sees a child token through its context.
    pub async fn execute_with_cancellation(
        &self,
        command: &CommandRequest,
        identity: &CallerIdentity,
        cancel: CancellationToken,
    ) -> ResponseEnvelope {
        let started = Instant::now();
        let timestamp = Utc::now();
        let request_id = RequestId::resolve(command.request_id());
        let param_names: Vec<&str> = command.parameters.keys().map(String::as_str).collect();

        log_op_start!(
            "execute",
            request_id = request_id.as_str(),
            action = command.action.as_str(),
            user_id = identity.id.as_str(),
            param_names = ?param_names,
        );

        let outcome = AssertUnwindSafe(self.dispatch(command, identity, &request_id, timestamp, cancel))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(SyloError::Internal {
                    message: panic_message(payload.as_ref()),
                })
            });

        let metadata = ResponseMetadata {
            request_id: request_id.to_string(),
            action: command.action.clone(),
            execution_time: elapsed_ms(started),
            timestamp,
        };

        match outcome {
            Ok(data) => {
                log_op_end!(
                    "execute",
                    duration_ms = metadata.execution_time,
                    request_id = request_id.as_str(),
                    action = command.action.as_str(),
                );
                ResponseEnvelope::success(data, metadata)
            }
            Err(err) => {
                let core = self.to_core_error(err, &command.action, &request_id);
                let body = ErrorBody::from(&core);
                log_op_error!(
                    "execute",
                    core,
                    duration_ms = metadata.execution_time,
                    request_id = request_id.as_str(),
                    action = command.action.as_str(),
                );
                ResponseEnvelope::failure(body, metadata)
            }
        }
    }

    async fn dispatch(
        &self,
        command: &CommandRequest,
        identity: &CallerIdentity,
        request_id: &RequestId,
        timestamp: DateTime<Utc>,
        cancel: CancellationToken,
    ) -> Result<Value, SyloError> {
        let entry = self
            .registry
            .get(&command.action)
            .ok_or_else(|| SyloError::CommandNotFound {
                name: command.action.clone(),
            })?;

        if !entry.is_enabled() {
            return Err(SyloError::CommandDisabled {
                name: command.action.clone(),
            });
        }

        if !entry.permissions().is_empty() && !self.is_permitted(identity, entry.permissions()).await {
            return Err(SyloError::PermissionDenied {
                name: command.action.clone(),
                required: entry.permissions().to_vec(),
            });
        }

        let validation = entry.validate(&command.parameters);
        if !validation.valid {
            return Err(SyloError::ValidationFailed {
                errors: validation.errors,
            });
        }

        let ctx = CommandContext::new(
            identity.clone(),
            RequestContext::with_request_id(request_id.clone()),
            self.persistence.clone(),
        )
        .with_timestamp(timestamp)
        .with_cancellation(cancel.child_token());

        self.run_handler(entry.handler(), &command.parameters, ctx)
            .await
    }

    /// Admins pass without consulting the policy
    pub(super) async fn is_permitted(&self, identity: &CallerIdentity, required: &[String]) -> bool {
        identity.is_admin() || self.policy.check(identity, required).await
    }

    async fn run_handler(
        &self,
        handler: &Arc<dyn CommandHandler>,
        parameters: &Map<String, Value>,
        ctx: CommandContext,
    ) -> Result<Value, SyloError> {
        let token = ctx.cancellation().clone();

        let guarded = async {
            match AssertUnwindSafe(handler.execute(parameters, &ctx))
                .catch_unwind()
                .await
            {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(SyloError::from_handler(&err)),
                Err(payload) => Err(SyloError::HandlerPanicked {
                    payload: panic_message(payload.as_ref()),
                }),
            }
        };

        let bounded = async {
            match self.config.handler_timeout_ms {
                Some(timeout_ms) => {
                    match tokio::time::timeout(Duration::from_millis(timeout_ms), guarded).await {
                        Ok(result) => result,
                        Err(_) => {
                            token.cancel();
                            Err(SyloError::HandlerTimedOut { timeout_ms })
                        }
                    }
                }
                None => guarded.await,
            }
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(SyloError::Cancelled),
            result = bounded => result,
        }
    }

    fn to_core_error(&self, err: SyloError, action: &str, request_id: &RequestId) -> CoreError {
        let chain = match &err {
            SyloError::HandlerFailed { chain, .. } => Some(chain.clone()),
            SyloError::HandlerPanicked { payload } | SyloError::Internal { message: payload } => {
                tracing::error!(
                    component = module_path!(),
                    op = "execute",
                    request_id = request_id.as_str(),
                    action,
                    panic = %payload,
                );
                Some(vec![payload.clone()])
            }
            _ => None,
        };

        let mut core = CoreError::from(err)
            .with_action(action)
            .with_request_id(request_id.clone());

        if let Some(chain) = chain {
            tracing::debug!(
                component = module_path!(),
                op = "execute",
                request_id = request_id.as_str(),
                chain = ?chain,
            );
            if self.config.expose_error_details {
                core = core.with_details(serde_json::json!({ "chain": chain }));
            }
        }
        core
    }
}
