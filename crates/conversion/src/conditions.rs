//! Condition derivation
//!
//! Cluster API conditions are recomputed in full from Machine API state on
//! every conversion; nothing is merged with previously written conditions.
//! A machine's conditions depend only on its phase, whether it has a node
//! reference and whether it is being deleted. A machine set's conditions
//! depend only on its replica counters and deletion timestamp.
//!
//! Two shapes are produced for each resource:
//! - legacy (`status.conditions`): sorted by type, severity on non-true
//!   conditions only
//! - current (`status.v1beta2.conditions`): fixed order, no severity
//!
//! `lastTransitionTime` is taken from the Machine API `status.lastUpdated`
//! so that the output is a function of the input alone.

use chrono::{DateTime, Utc};
use machine_crds::capi::conditions::*;
use machine_crds::mapi::{self, machine as mapi_machine};
use machine_crds::{Condition, ConditionSeverity, ConditionStatus, V1Beta2Condition};

/// Machine state the conditions are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineState<'a> {
    /// `status.phase`, empty when unset
    pub phase: &'a str,
    /// A node has been linked to the machine
    pub has_node_ref: bool,
    /// The deletion timestamp is set
    pub deleting: bool,
    /// `status.lastUpdated`, used as the transition time of every condition
    pub last_updated: Option<DateTime<Utc>>,
    /// `metadata.generation`
    pub generation: i64,
}

impl<'a> MachineState<'a> {
    /// Read the state from a Machine API machine.
    pub fn from_machine(machine: &'a mapi::Machine) -> Self {
        let status = machine.status.as_ref();
        MachineState {
            phase: status.and_then(|s| s.phase.as_deref()).unwrap_or_default(),
            has_node_ref: status.is_some_and(|s| s.node_ref.is_some()),
            deleting: machine.metadata.deletion_timestamp.is_some(),
            last_updated: status.and_then(|s| s.last_updated),
            generation: machine.metadata.generation.unwrap_or_default(),
        }
    }

    fn is_running(&self) -> bool {
        self.phase == mapi_machine::PHASE_RUNNING
    }

    /// Bootstrap data has been consumed once the machine runs.
    pub fn bootstrap_ready(&self) -> bool {
        matches!(
            self.phase,
            mapi_machine::PHASE_RUNNING | mapi_machine::PHASE_DELETING
        )
    }

    /// The instance exists once the machine is provisioned.
    pub fn infrastructure_ready(&self) -> bool {
        matches!(
            self.phase,
            mapi_machine::PHASE_PROVISIONED
                | mapi_machine::PHASE_RUNNING
                | mapi_machine::PHASE_DELETING
        )
    }

    fn node_ready(&self) -> bool {
        self.bootstrap_ready() && self.has_node_ref
    }
}

fn legacy_true(condition_type: &str, time: Option<DateTime<Utc>>) -> Condition {
    Condition {
        condition_type: condition_type.to_string(),
        status: ConditionStatus::True,
        severity: None,
        last_transition_time: time,
        reason: String::new(),
        message: String::new(),
    }
}

fn legacy_false(
    condition_type: &str,
    reason: &str,
    severity: ConditionSeverity,
    time: Option<DateTime<Utc>>,
) -> Condition {
    Condition {
        condition_type: condition_type.to_string(),
        status: ConditionStatus::False,
        severity: Some(severity),
        last_transition_time: time,
        reason: reason.to_string(),
        message: String::new(),
    }
}

fn current(
    condition_type: &str,
    value: bool,
    true_reason: &str,
    false_reason: &str,
    generation: i64,
    time: Option<DateTime<Utc>>,
) -> V1Beta2Condition {
    V1Beta2Condition {
        condition_type: condition_type.to_string(),
        status: ConditionStatus::from_bool(value),
        observed_generation: generation,
        last_transition_time: time,
        reason: if value { true_reason } else { false_reason }.to_string(),
        message: String::new(),
    }
}

fn sort_by_type(conditions: &mut [Condition]) {
    conditions.sort_by(|a, b| a.condition_type.cmp(&b.condition_type));
}

/// Legacy machine conditions: `BootstrapReady`, `InfrastructureReady`, `Ready`.
pub fn machine_legacy_conditions(state: &MachineState<'_>) -> Vec<Condition> {
    let time = state.last_updated;
    let mut conditions = Vec::with_capacity(3);

    conditions.push(if state.bootstrap_ready() {
        legacy_true(BOOTSTRAP_READY_CONDITION, time)
    } else {
        legacy_false(
            BOOTSTRAP_READY_CONDITION,
            WAITING_FOR_DATA_SECRET_REASON,
            ConditionSeverity::Info,
            time,
        )
    });

    conditions.push(if state.infrastructure_ready() {
        legacy_true(INFRASTRUCTURE_READY_CONDITION, time)
    } else {
        legacy_false(
            INFRASTRUCTURE_READY_CONDITION,
            WAITING_FOR_INFRASTRUCTURE_REASON,
            ConditionSeverity::Info,
            time,
        )
    });

    conditions.push(if state.is_running() {
        legacy_true(READY_CONDITION, time)
    } else if state.deleting || state.phase == mapi_machine::PHASE_DELETING {
        legacy_false(READY_CONDITION, DELETING_REASON, ConditionSeverity::Info, time)
    } else if state.phase == mapi_machine::PHASE_FAILED {
        legacy_false(
            READY_CONDITION,
            MACHINE_FAILED_REASON,
            ConditionSeverity::Error,
            time,
        )
    } else if !state.infrastructure_ready() {
        legacy_false(
            READY_CONDITION,
            WAITING_FOR_INFRASTRUCTURE_REASON,
            ConditionSeverity::Info,
            time,
        )
    } else {
        legacy_false(
            READY_CONDITION,
            WAITING_FOR_NODE_REF_REASON,
            ConditionSeverity::Info,
            time,
        )
    });

    sort_by_type(&mut conditions);
    conditions
}

/// Current machine conditions, in order: `Available`, `Ready`,
/// `BootstrapConfigReady`, `InfrastructureReady`, `NodeReady`, `Deleting`.
pub fn machine_v1beta2_conditions(state: &MachineState<'_>) -> Vec<V1Beta2Condition> {
    let time = state.last_updated;
    let generation = state.generation;

    let node_false_reason = if state.has_node_ref {
        MACHINE_NODE_NOT_READY_V1BETA2_REASON
    } else {
        MACHINE_NODE_DOES_NOT_EXIST_V1BETA2_REASON
    };

    vec![
        current(
            MACHINE_AVAILABLE_V1BETA2_CONDITION,
            state.is_running(),
            MACHINE_AVAILABLE_V1BETA2_REASON,
            MACHINE_NOT_AVAILABLE_V1BETA2_REASON,
            generation,
            time,
        ),
        current(
            MACHINE_READY_V1BETA2_CONDITION,
            state.is_running(),
            MACHINE_READY_V1BETA2_REASON,
            MACHINE_NOT_READY_V1BETA2_REASON,
            generation,
            time,
        ),
        current(
            MACHINE_BOOTSTRAP_CONFIG_READY_V1BETA2_CONDITION,
            state.bootstrap_ready(),
            MACHINE_BOOTSTRAP_CONFIG_READY_V1BETA2_REASON,
            MACHINE_BOOTSTRAP_CONFIG_NOT_READY_V1BETA2_REASON,
            generation,
            time,
        ),
        current(
            MACHINE_INFRASTRUCTURE_READY_V1BETA2_CONDITION,
            state.infrastructure_ready(),
            MACHINE_INFRASTRUCTURE_READY_V1BETA2_REASON,
            MACHINE_INFRASTRUCTURE_NOT_READY_V1BETA2_REASON,
            generation,
            time,
        ),
        current(
            MACHINE_NODE_READY_V1BETA2_CONDITION,
            state.node_ready(),
            MACHINE_NODE_READY_V1BETA2_REASON,
            node_false_reason,
            generation,
            time,
        ),
        current(
            MACHINE_DELETING_V1BETA2_CONDITION,
            state.deleting,
            MACHINE_DELETING_V1BETA2_REASON,
            MACHINE_NOT_DELETING_V1BETA2_REASON,
            generation,
            time,
        ),
    ]
}

/// Machine set state the conditions are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineSetState {
    /// `spec.replicas`, 1 when unset
    pub desired: i32,
    /// `status.replicas`
    pub replicas: i32,
    /// `status.readyReplicas`
    pub ready_replicas: i32,
    /// `status.fullyLabeledReplicas`
    pub fully_labeled_replicas: i32,
    /// The deletion timestamp is set
    pub deleting: bool,
    /// `metadata.generation`
    pub generation: i64,
}

impl MachineSetState {
    /// Read the state from a Machine API machine set.
    pub fn from_machine_set(machine_set: &mapi::MachineSet) -> Self {
        let status = machine_set.status.clone().unwrap_or_default();
        MachineSetState {
            desired: machine_set.spec.replicas.unwrap_or(1),
            replicas: status.replicas,
            ready_replicas: status.ready_replicas,
            fully_labeled_replicas: status.fully_labeled_replicas,
            deleting: machine_set.metadata.deletion_timestamp.is_some(),
            generation: machine_set.metadata.generation.unwrap_or_default(),
        }
    }

    fn scaling_reason(&self) -> &'static str {
        if self.replicas < self.desired {
            SCALING_UP_REASON
        } else {
            SCALING_DOWN_REASON
        }
    }
}

/// Legacy machine set conditions: `MachinesCreated`, `MachinesReady`,
/// `Ready`, `Resized`.
pub fn machine_set_legacy_conditions(state: &MachineSetState) -> Vec<Condition> {
    let resized = if state.replicas == state.desired {
        legacy_true(RESIZED_CONDITION, None)
    } else {
        legacy_false(
            RESIZED_CONDITION,
            state.scaling_reason(),
            ConditionSeverity::Warning,
            None,
        )
    };

    let created = if state.replicas == state.desired {
        legacy_true(MACHINES_CREATED_CONDITION, None)
    } else {
        legacy_false(
            MACHINES_CREATED_CONDITION,
            state.scaling_reason(),
            ConditionSeverity::Warning,
            None,
        )
    };

    let machines_ready = if state.ready_replicas == state.desired {
        legacy_true(MACHINES_READY_CONDITION, None)
    } else {
        legacy_false(
            MACHINES_READY_CONDITION,
            WAITING_FOR_MACHINES_READY_REASON,
            ConditionSeverity::Info,
            None,
        )
    };

    // Ready mirrors the first non-true condition in this order.
    let ready = [&resized, &created, &machines_ready]
        .into_iter()
        .find(|c| c.status != ConditionStatus::True)
        .map_or_else(
            || legacy_true(READY_CONDITION, None),
            |c| Condition {
                condition_type: READY_CONDITION.to_string(),
                ..c.clone()
            },
        );

    let mut conditions = vec![resized, created, machines_ready, ready];
    sort_by_type(&mut conditions);
    conditions
}

/// Current machine set conditions, in order: `MachinesReady`,
/// `MachinesUpToDate`, `ScalingUp`, `ScalingDown`, `Deleting`.
///
/// `MachinesUpToDate` compares `fullyLabeledReplicas` with the desired
/// count; no per-machine revision is tracked.
pub fn machine_set_v1beta2_conditions(state: &MachineSetState) -> Vec<V1Beta2Condition> {
    let generation = state.generation;

    vec![
        current(
            MACHINE_SET_MACHINES_READY_V1BETA2_CONDITION,
            state.ready_replicas == state.desired,
            MACHINE_SET_MACHINES_READY_V1BETA2_REASON,
            MACHINE_SET_MACHINES_NOT_READY_V1BETA2_REASON,
            generation,
            None,
        ),
        current(
            MACHINE_SET_MACHINES_UP_TO_DATE_V1BETA2_CONDITION,
            state.fully_labeled_replicas == state.desired,
            MACHINE_SET_MACHINES_UP_TO_DATE_V1BETA2_REASON,
            MACHINE_SET_MACHINES_NOT_UP_TO_DATE_V1BETA2_REASON,
            generation,
            None,
        ),
        current(
            MACHINE_SET_SCALING_UP_V1BETA2_CONDITION,
            state.desired > state.replicas,
            MACHINE_SET_SCALING_UP_V1BETA2_REASON,
            MACHINE_SET_NOT_SCALING_UP_V1BETA2_REASON,
            generation,
            None,
        ),
        current(
            MACHINE_SET_SCALING_DOWN_V1BETA2_CONDITION,
            state.desired < state.replicas,
            MACHINE_SET_SCALING_DOWN_V1BETA2_REASON,
            MACHINE_SET_NOT_SCALING_DOWN_V1BETA2_REASON,
            generation,
            None,
        ),
        current(
            MACHINE_SET_DELETING_V1BETA2_CONDITION,
            state.deleting,
            MACHINE_SET_DELETING_V1BETA2_REASON,
            MACHINE_SET_NOT_DELETING_V1BETA2_REASON,
            generation,
            None,
        ),
    ]
}

#[cfg(test)]
#[path = "conditions_test.rs"]
mod tests;
