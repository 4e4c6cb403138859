use tracing::debug;

use super::prompt::build_corrective_prompt;
use crate::error::TranslationError;

/// Where a translation request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BuildingPrompt,
    AwaitingModel,
    Parsing,
    Validating,
    Retrying,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// What the driver should do after a reply was validated.
#[derive(Debug)]
pub enum Step {
    Done(Vec<String>),
    Retry { observed: usize },
    Failed(TranslationError),
}

/// Count-mismatch retry loop for one request.
///
/// Holds no model handle; the caller feeds it parsed replies and it decides
/// between success, another attempt with a corrective prompt, or giving up.
#[derive(Debug)]
pub struct RetryState {
    phase: Phase,
    attempt: u32,
    max_attempts: u32,
    expected: usize,
    base_prompt: String,
    next_prompt: String,
    last_output: Option<Vec<String>>,
}

impl RetryState {
    pub fn new(base_prompt: String, expected: usize, max_attempts: u32) -> Self {
        Self {
            phase: Phase::BuildingPrompt,
            attempt: 0,
            max_attempts: max_attempts.max(1),
            expected,
            next_prompt: base_prompt.clone(),
            base_prompt,
            last_output: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn last_count(&self) -> Option<usize> {
        self.last_output.as_ref().map(Vec::len)
    }

    fn transition(&mut self, to: Phase) {
        debug!("translation phase {:?} -> {:?} (attempt {})", self.phase, to, self.attempt);
        self.phase = to;
    }

    /// Count a new attempt and hand out the prompt to send.
    pub fn start_attempt(&mut self) -> String {
        debug_assert_eq!(self.phase, Phase::BuildingPrompt);
        self.attempt += 1;
        self.transition(Phase::AwaitingModel);
        self.next_prompt.clone()
    }

    pub fn reply_received(&mut self) {
        self.transition(Phase::Parsing);
    }

    /// Abort on an error that is not retried.
    pub fn fail(&mut self) {
        self.transition(Phase::Failed);
    }

    pub fn validate(&mut self, output: Vec<String>) -> Step {
        self.transition(Phase::Validating);

        if output.len() == self.expected {
            self.transition(Phase::Succeeded);
            return Step::Done(output);
        }

        let observed = output.len();
        if self.attempt >= self.max_attempts {
            self.last_output = Some(output);
            self.transition(Phase::Failed);
            return Step::Failed(TranslationError::RetryBudgetExhausted {
                attempts: self.attempt,
                expected: self.expected,
                last_len: observed,
            });
        }

        self.transition(Phase::Retrying);
        self.next_prompt = build_corrective_prompt(&self.base_prompt, &output, self.expected);
        self.last_output = Some(output);
        self.transition(Phase::BuildingPrompt);
        Step::Retry { observed }
    }
}
