//! # phasesync-engine
//!
//! Reconciles a phase of a project, and the deliverables under it, with a
//! desired state supplied by a client.
//!
//! A run goes through these steps, stopping at the first failure:
//!
//! 1. validate the desired state (no remote call on failure)
//! 2. find the phase by type and project, then update it or create it
//! 3. fetch its current deliverables and diff them against the desired ones
//! 4. delete what must go, as one concurrent batch
//! 5. update and create the rest, as a second concurrent batch
//!
//! There is no transaction across these calls. A run that fails part way
//! leaves earlier writes in place, and running it again converges.
//!
//! ```ignore
//! use phasesync_engine::{Reconciler, ReconcilerOptions};
//! use phasesync_core::{DesiredDeliverable, DesiredPhase, PhaseType};
//!
//! let reconciler = Reconciler::with_options(
//!     api,
//!     ReconcilerOptions::default().with_project_scope("proj-1"),
//! );
//! let desired = DesiredPhase::new("Development", "Build the product")
//!     .with_date_range("2025-02-01", "2025-04-01")
//!     .with_deliverable(DesiredDeliverable::new("Sprint 1 Code").with_due_date("2025-02-15"));
//!
//! let outcome = reconciler.reconcile(PhaseType::Scrum, &desired).await;
//! ```

pub mod diff;
pub mod error;
pub mod executor;
pub mod reconciler;
pub mod resolver;
pub mod validation;

pub use diff::{PlanSummary, ReconcilePlan, UpdatePair, plan_deliverables};
pub use error::{ReconcileError, ReconcileStage, Result};
pub use executor::{ExecutionReport, PlanExecutor};
pub use reconciler::{Preview, ReconcileOutcome, ReconcileReport, Reconciler, ReconcilerOptions};
pub use resolver::{PhaseResolver, ResolvedPhase};
pub use validation::{FieldErrors, validate_desired_phase};
