//! Application services for task-card intake.

mod creation;
mod interpret;
mod settings;

pub use creation::{
    CreateOptions, CreatedCard, CreationOutcome, SimulatedCreation, TaskCreationError,
    TaskCreationResult, TaskCreationService,
};
pub use interpret::{
    InterpretError, InterpretOptions, InterpretOutcome, InterpretResult, InterpretService,
    Interpretation,
};
pub use settings::{
    DEFAULT_FALLBACK_LIST_NAME, DEFAULT_LABEL_COLOR, DEFAULT_TASK_LIST_NAME, IntakeSettings,
};
