// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::error::Error;
use std::fmt;
use tracing::{debug, info, warn};

use crate::{
    CapacityExceptionForm, FormPayload, Notification, NotificationSink, OnboardingRequestForm,
    RecordSink, ResourceAllocationForm, SaveError, ValidationErrors,
};

/// Input that can sit behind a [`MultiStepForm`].
pub trait FormInput: Clone + PartialEq {
    fn title(&self) -> &'static str;
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl FormInput for FormPayload {
    fn title(&self) -> &'static str {
        self.kind().title()
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        FormPayload::validate(self)
    }
}

impl FormInput for ResourceAllocationForm {
    fn title(&self) -> &'static str {
        "Resource allocation"
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        self.to_record().map(|_| ())
    }
}

impl FormInput for OnboardingRequestForm {
    fn title(&self) -> &'static str {
        "Onboarding request"
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        OnboardingRequestForm::validate(self)
    }
}

impl FormInput for CapacityExceptionForm {
    fn title(&self) -> &'static str {
        "Capacity exception"
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        CapacityExceptionForm::validate(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Entry,
    Review,
    Complete,
}

impl FormStep {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Review => "review",
            Self::Complete => "complete",
        }
    }
}

/// Handle for one submission. Only the most recent ticket can finish a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmitTicket(u64);

impl SubmitTicket {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStepError {
    Invalid(ValidationErrors),
    NotAllowed {
        action: &'static str,
        step: FormStep,
    },
    InFlight,
}

impl fmt::Display for FormStepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "form has errors: {errors}"),
            Self::NotAllowed { action, step } => {
                write!(f, "cannot {action} from the {} step", step.label())
            }
            Self::InFlight => f.write_str("a save is already in progress"),
        }
    }
}

impl Error for FormStepError {}

/// Entry -> Review -> Complete, with `add_more` looping back to a blank
/// Entry. Each instance owns its own state.
#[derive(Debug, Clone)]
pub struct MultiStepForm<F> {
    input: F,
    initial: F,
    step: FormStep,
    errors: Option<ValidationErrors>,
    in_flight: Option<SubmitTicket>,
    submitted: Option<F>,
    last_ticket: u64,
}

impl<F: FormInput> MultiStepForm<F> {
    /// `input` is also what `add_more` resets to.
    pub fn new(input: F) -> Self {
        Self {
            initial: input.clone(),
            input,
            step: FormStep::Entry,
            errors: None,
            in_flight: None,
            submitted: None,
            last_ticket: 0,
        }
    }

    /// Continues ticket numbering after `last` so outcomes addressed to an
    /// earlier form can never match this one.
    pub fn with_tickets_after(mut self, last: SubmitTicket) -> Self {
        self.last_ticket = last.0;
        self
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn input(&self) -> &F {
        &self.input
    }

    /// Fields are only editable while in `Entry`.
    pub fn input_mut(&mut self) -> Option<&mut F> {
        (self.step == FormStep::Entry).then_some(&mut self.input)
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors
            .as_ref()
            .and_then(|errors| errors.for_field(field))
            .map(|error| error.message.as_str())
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn pending_ticket(&self) -> Option<SubmitTicket> {
        self.in_flight
    }

    pub fn review(&mut self) -> Result<(), FormStepError> {
        self.require(FormStep::Entry, "review")?;
        match self.input.validate() {
            Ok(()) => {
                self.errors = None;
                self.step = FormStep::Review;
                info!(form = self.input.title(), "form ready for review");
                Ok(())
            }
            Err(errors) => {
                debug!(
                    form = self.input.title(),
                    count = errors.len(),
                    "form review blocked"
                );
                self.errors = Some(errors.clone());
                Err(FormStepError::Invalid(errors))
            }
        }
    }

    /// An outstanding save keeps running; it still blocks `begin_save`
    /// until its outcome arrives.
    pub fn back_to_edit(&mut self) -> Result<(), FormStepError> {
        self.require(FormStep::Review, "go back to edit")?;
        self.step = FormStep::Entry;
        Ok(())
    }

    pub fn begin_save(&mut self) -> Result<SubmitTicket, FormStepError> {
        self.require(FormStep::Review, "save")?;
        if self.in_flight.is_some() {
            return Err(FormStepError::InFlight);
        }
        self.last_ticket = self.last_ticket.wrapping_add(1);
        let ticket = SubmitTicket(self.last_ticket);
        self.in_flight = Some(ticket);
        self.submitted = Some(self.input.clone());
        info!(form = self.input.title(), ticket = ticket.0, "form save started");
        Ok(ticket)
    }

    /// Applies a save outcome. Returns `false` for a ticket that is not the
    /// one currently in flight; those outcomes are dropped. A success only
    /// completes the form if it is in review with the input that was sent.
    pub fn finish_save(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<(), SaveError>,
        notifier: &mut dyn NotificationSink,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            debug!(ticket = ticket.0, "ignoring stale save outcome");
            return false;
        }
        self.in_flight = None;
        let unchanged = self.submitted.take().as_ref() == Some(&self.input);
        let title = self.input.title();
        match outcome {
            Ok(()) => {
                if self.step == FormStep::Review && unchanged {
                    self.step = FormStep::Complete;
                }
                info!(form = title, unchanged, "form saved");
                notifier.notify(Notification::success(
                    "Saved",
                    format!("{title} saved successfully."),
                ));
                if !unchanged {
                    notifier.notify(Notification::info(
                        "Unsaved edits",
                        "The form changed after it was submitted; save again to keep the edits.",
                    ));
                }
            }
            Err(error) => {
                warn!(form = title, %error, "form save rejected");
                notifier.notify(error.notification());
            }
        }
        true
    }

    pub fn save_with(
        &mut self,
        sink: &mut dyn RecordSink<F>,
        notifier: &mut dyn NotificationSink,
    ) -> Result<(), FormStepError> {
        let ticket = self.begin_save()?;
        let outcome = sink.save(&self.input);
        self.finish_save(ticket, outcome, notifier);
        Ok(())
    }

    pub fn add_more(&mut self) -> Result<(), FormStepError> {
        self.require(FormStep::Complete, "add another")?;
        self.input = self.initial.clone();
        self.errors = None;
        self.step = FormStep::Entry;
        Ok(())
    }

    fn require(&self, step: FormStep, action: &'static str) -> Result<(), FormStepError> {
        if self.step == step {
            Ok(())
        } else {
            Err(FormStepError::NotAllowed {
                action,
                step: self.step,
            })
        }
    }
}
