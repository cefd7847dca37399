pub mod engine;
pub mod states;

pub use engine::{MenuWizard, WizardTransitionError};
pub use states::{TransitionOutcome, TypeChoice, WizardAction, WizardContext, WizardEvent};
