pub mod deliverable;
pub mod desired;
pub mod error;
pub mod key;
pub mod phase;
pub mod time;

pub use deliverable::{DeliverableChanges, DeliverableStatus, NewDeliverable, PersistedDeliverable};
pub use desired::{DateRange, DesiredDeliverable, DesiredPhase};
pub use error::{CoreError, ErrorCategory, Result};
pub use key::{Keyed, ReconciliationKey, normalize_title};
pub use phase::{NewPhase, PersistedPhase, PhaseChanges, PhaseDetail, PhaseType};
pub use time::{date_only, midnight_utc, parse_calendar_date, to_server_date, to_server_datetime};
