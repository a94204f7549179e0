//! Checkout
//!
//! Checkout is a fixed linear sequence of steps. Moving forward requires the
//! current step to be complete; moving back is always allowed except from the
//! first step.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors moving between checkout steps.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutStepError {
    /// The current step has not been completed.
    #[error("complete the {0} step before continuing")]
    StepIncomplete(CheckoutStep),

    /// Already on the last step.
    #[error("already at the final checkout step")]
    AlreadyAtLastStep,

    /// Already on the first step.
    #[error("already at the first checkout step")]
    AlreadyAtFirstStep,

    /// Target step is ahead of the first incomplete one.
    #[error("the {0} step is not available yet")]
    StepUnavailable(CheckoutStep),
}

impl CheckoutStepError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StepIncomplete(_) => "checkout_step_incomplete",
            Self::AlreadyAtLastStep | Self::AlreadyAtFirstStep | Self::StepUnavailable(_) => {
                "checkout_step_unavailable"
            }
        }
    }
}

/// A checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Choose a shipping address
    Shipping,

    /// Choose a payment method
    Payment,

    /// Confirm and place the order
    Review,
}

impl CheckoutStep {
    /// All steps in order.
    pub const ALL: [Self; 3] = [Self::Shipping, Self::Payment, Self::Review];

    /// Zero-based position.
    pub fn index(self) -> usize {
        match self {
            Self::Shipping => 0,
            Self::Payment => 1,
            Self::Review => 2,
        }
    }

    /// The following step.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Shipping => Some(Self::Payment),
            Self::Payment => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// The preceding step.
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Shipping => None,
            Self::Payment => Some(Self::Shipping),
            Self::Review => Some(Self::Payment),
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Review => "review",
        })
    }
}

/// Where the customer is in checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutProgress {
    current: CheckoutStep,
    completed: FxHashSet<CheckoutStep>,
}

impl Default for CheckoutProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutProgress {
    /// Start at the first step with nothing completed.
    pub fn new() -> Self {
        Self {
            current: CheckoutStep::Shipping,
            completed: FxHashSet::default(),
        }
    }

    /// Current step.
    pub fn current(&self) -> CheckoutStep {
        self.current
    }

    /// Whether a step has been completed.
    pub fn is_completed(&self, step: CheckoutStep) -> bool {
        self.completed.contains(&step)
    }

    /// Mark a step complete.
    pub fn complete(&mut self, step: CheckoutStep) {
        self.completed.insert(step);
    }

    /// Mark a step incomplete again, e.g. after its data changed.
    pub fn invalidate(&mut self, step: CheckoutStep) {
        self.completed.remove(&step);
    }

    /// First step that has not been completed.
    pub fn first_incomplete(&self) -> Option<CheckoutStep> {
        CheckoutStep::ALL
            .into_iter()
            .find(|step| !self.is_completed(*step))
    }

    /// Whether every step before `Review` is complete.
    pub fn ready_for_review(&self) -> bool {
        self.is_completed(CheckoutStep::Shipping) && self.is_completed(CheckoutStep::Payment)
    }

    /// Move to the next step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutStepError`] when the current step is incomplete or is the last one.
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutStepError> {
        let next = self
            .current
            .next()
            .ok_or(CheckoutStepError::AlreadyAtLastStep)?;

        if !self.is_completed(self.current) {
            return Err(CheckoutStepError::StepIncomplete(self.current));
        }

        self.current = next;

        Ok(next)
    }

    /// Move to the previous step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutStepError::AlreadyAtFirstStep`] on the first step.
    pub fn back(&mut self) -> Result<CheckoutStep, CheckoutStepError> {
        let previous = self
            .current
            .previous()
            .ok_or(CheckoutStepError::AlreadyAtFirstStep)?;

        self.current = previous;

        Ok(previous)
    }

    /// Jump to a completed step or the first incomplete one.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutStepError::StepUnavailable`] for steps further ahead.
    pub fn go_to(&mut self, step: CheckoutStep) -> Result<(), CheckoutStepError> {
        let reachable = self.is_completed(step)
            || self
                .first_incomplete()
                .is_none_or(|first| step <= first);

        if !reachable {
            return Err(CheckoutStepError::StepUnavailable(step));
        }

        self.current = step;

        Ok(())
    }

    /// Start over.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn steps_form_a_linear_sequence() {
        assert_eq!(CheckoutStep::Shipping.next(), Some(CheckoutStep::Payment));
        assert_eq!(CheckoutStep::Review.next(), None);
        assert_eq!(CheckoutStep::Shipping.previous(), None);
        assert_eq!(CheckoutStep::Review.previous(), Some(CheckoutStep::Payment));

        for (idx, step) in CheckoutStep::ALL.into_iter().enumerate() {
            assert_eq!(step.index(), idx);
        }
    }

    #[test]
    fn cannot_advance_past_incomplete_step() {
        let mut progress = CheckoutProgress::new();

        assert_eq!(
            progress.advance(),
            Err(CheckoutStepError::StepIncomplete(CheckoutStep::Shipping))
        );
        assert_eq!(progress.current(), CheckoutStep::Shipping);
    }

    #[test]
    fn advances_through_completed_steps() -> TestResult {
        let mut progress = CheckoutProgress::new();

        progress.complete(CheckoutStep::Shipping);
        assert_eq!(progress.advance()?, CheckoutStep::Payment);

        progress.complete(CheckoutStep::Payment);
        assert_eq!(progress.advance()?, CheckoutStep::Review);
        assert!(progress.ready_for_review());

        assert_eq!(progress.advance(), Err(CheckoutStepError::AlreadyAtLastStep));

        Ok(())
    }

    #[test]
    fn back_stops_at_first_step() -> TestResult {
        let mut progress = CheckoutProgress::new();
        progress.complete(CheckoutStep::Shipping);
        progress.advance()?;

        assert_eq!(progress.back()?, CheckoutStep::Shipping);
        assert_eq!(progress.back(), Err(CheckoutStepError::AlreadyAtFirstStep));

        Ok(())
    }

    #[test]
    fn go_to_only_reaches_unlocked_steps() -> TestResult {
        let mut progress = CheckoutProgress::new();

        assert_eq!(
            progress.go_to(CheckoutStep::Review),
            Err(CheckoutStepError::StepUnavailable(CheckoutStep::Review))
        );

        progress.complete(CheckoutStep::Shipping);
        progress.go_to(CheckoutStep::Payment)?;

        assert_eq!(progress.current(), CheckoutStep::Payment);

        Ok(())
    }
}
