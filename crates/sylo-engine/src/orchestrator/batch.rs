use futures::future::join_all;
use std::time::Instant;
use sylo_core::model::{CallerIdentity, CommandRequest, ResponseEnvelope};
use sylo_core::{log_op_end, log_op_start};

use super::{elapsed_ms, Orchestrator};

impl Orchestrator {
    /// Run `commands` one at a time, stopping after the first failure
    ///
    /// The result has one envelope per dispatched command and ends with the
    /// first failure, inclusive. Commands after it are never dispatched.
    pub async fn execute_sequence(
        &self,
        commands: &[CommandRequest],
        identity: &CallerIdentity,
    ) -> Vec<ResponseEnvelope> {
        let started = Instant::now();
        log_op_start!("execute_sequence", batch_len = commands.len());

        let mut results = Vec::with_capacity(commands.len());
        for (index, command) in commands.iter().enumerate() {
            let response = self.execute(command, identity).await;
            let failed = !response.is_success();
            results.push(response);

            if failed {
                tracing::info!(
                    component = module_path!(),
                    op = "execute_sequence",
                    action = command.action.as_str(),
                    failed_index = index,
                    skipped = commands.len() - index - 1,
                    "sequence stopped at first failure"
                );
                break;
            }
        }

        log_op_end!(
            "execute_sequence",
            duration_ms = elapsed_ms(started),
            batch_len = commands.len(),
            completed = results.len(),
        );
        results
    }

    /// Run every command concurrently; results follow input order
    pub async fn execute_parallel(
        &self,
        commands: &[CommandRequest],
        identity: &CallerIdentity,
    ) -> Vec<ResponseEnvelope> {
        let started = Instant::now();
        log_op_start!("execute_parallel", batch_len = commands.len());

        let results = join_all(commands.iter().map(|command| self.execute(command, identity))).await;

        log_op_end!(
            "execute_parallel",
            duration_ms = elapsed_ms(started),
            batch_len = commands.len(),
            failed = results.iter().filter(|r| !r.is_success()).count(),
        );
        results
    }
}
