//! Record of every call made against an [`InMemoryTracker`](crate::InMemoryTracker).

use phasesync_api::ApiError;

/// The tracker operations, without arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    ListPhases,
    CreatePhase,
    UpdatePhase,
    GetPhaseDetail,
    CreateDeliverable,
    UpdateDeliverable,
    DeleteDeliverable,
}

impl ApiOperation {
    /// Whether the operation writes a deliverable.
    pub fn is_deliverable_write(&self) -> bool {
        matches!(
            self,
            Self::CreateDeliverable | Self::UpdateDeliverable | Self::DeleteDeliverable
        )
    }
}

/// One call as received, before it succeeded or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: ApiOperation,
    /// Record id, or the title/name for creates. `None` for listing.
    pub target: Option<String>,
}

impl RecordedCall {
    pub(crate) fn new(operation: ApiOperation, target: Option<&str>) -> Self {
        Self {
            operation,
            target: target.map(str::to_string),
        }
    }
}

/// An injected failure: calls matching `operation` (and `target`, when set)
/// return `error` instead of touching the data.
#[derive(Debug, Clone)]
pub(crate) struct Fault {
    pub operation: ApiOperation,
    pub target: Option<String>,
    pub error: ApiError,
}

impl Fault {
    pub fn matches(&self, call: &RecordedCall) -> bool {
        self.operation == call.operation
            && match &self.target {
                Some(target) => call.target.as_deref() == Some(target.as_str()),
                None => true,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_matching() {
        let fault = Fault {
            operation: ApiOperation::DeleteDeliverable,
            target: Some("d-1".into()),
            error: ApiError::status(500, "boom"),
        };
        assert!(fault.matches(&RecordedCall::new(ApiOperation::DeleteDeliverable, Some("d-1"))));
        assert!(!fault.matches(&RecordedCall::new(ApiOperation::DeleteDeliverable, Some("d-2"))));
        assert!(!fault.matches(&RecordedCall::new(ApiOperation::UpdateDeliverable, Some("d-1"))));

        let any = Fault {
            target: None,
            ..fault
        };
        assert!(any.matches(&RecordedCall::new(ApiOperation::DeleteDeliverable, Some("d-9"))));
    }

    #[test]
    fn test_deliverable_write_classification() {
        assert!(ApiOperation::CreateDeliverable.is_deliverable_write());
        assert!(ApiOperation::DeleteDeliverable.is_deliverable_write());
        assert!(!ApiOperation::UpdatePhase.is_deliverable_write());
        assert!(!ApiOperation::GetPhaseDetail.is_deliverable_write());
    }
}
