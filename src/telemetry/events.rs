use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    approvals::ApprovalStatus, collaborations::CollaborationRole, designs::DesignStatus,
};

/// Domain events written to the `business_events` log target. Downstream
/// consumers (notification delivery, analytics) read them from the log
/// stream; nothing here is delivered by the service itself.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type")]
pub enum BusinessEvent {
    DesignCreated {
        design_id: Uuid,
        user_id: Uuid,
        project_id: Option<Uuid>,
    },
    DesignUpdated {
        design_id: Uuid,
        user_id: Uuid,
        fields: Vec<String>,
    },
    DesignVersionPublished {
        design_id: Uuid,
        user_id: Uuid,
        version_number: i32,
        anchors_may_be_misaligned: bool,
    },
    DesignStatusChanged {
        design_id: Uuid,
        from: DesignStatus,
        to: DesignStatus,
    },
    AnnotationCreated {
        annotation_id: Uuid,
        design_id: Uuid,
        actor_id: Uuid,
        notified: u64,
    },
    AnnotationReplied {
        annotation_id: Uuid,
        reply_id: Uuid,
        actor_id: Uuid,
    },
    AnnotationResolved {
        annotation_id: Uuid,
        design_id: Uuid,
        actor_id: Uuid,
        notified: u64,
    },
    AnnotationReopened {
        annotation_id: Uuid,
        design_id: Uuid,
        actor_id: Uuid,
    },
    ApprovalSubmitted {
        design_id: Uuid,
        user_id: Uuid,
        status: ApprovalStatus,
        design_version: i32,
    },
    CollaboratorAdded {
        design_id: Uuid,
        added_by: Uuid,
        user_id: Uuid,
        role: CollaborationRole,
    },
    CollaboratorUpdated {
        design_id: Uuid,
        updated_by: Uuid,
        user_id: Uuid,
        role: CollaborationRole,
        notifications_enabled: bool,
    },
}

impl BusinessEvent {
    pub fn log(&self) {
        let event_json = serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self));
        info!(
            target: "business_events",
            event = %event_json,
            "Business event occurred"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_with_type() {
        let event = BusinessEvent::DesignStatusChanged {
            design_id: Uuid::nil(),
            from: DesignStatus::InReview,
            to: DesignStatus::Approved,
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["event_type"], "DesignStatusChanged");
        assert_eq!(value["from"], "in-review");
        assert_eq!(value["to"], "approved");
    }
}
