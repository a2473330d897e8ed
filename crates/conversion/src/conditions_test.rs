//! Unit tests for condition derivation

use super::*;
use crate::test_utils::{deleting, mapi_machine, mapi_machine_set, with_node_ref, with_phase};

const PHASES: [&str; 6] = ["", "Provisioning", "Provisioned", "Running", "Deleting", "Failed"];

fn state_of(phase: &str, node_ref: bool, is_deleting: bool) -> mapi::Machine {
    let mut machine = with_phase(mapi_machine("m"), phase);
    if node_ref {
        machine = with_node_ref(machine, "node-1");
    }
    if is_deleting {
        machine = deleting(machine);
    }
    machine
}

fn legacy<'a>(conditions: &'a [Condition], condition_type: &str) -> &'a Condition {
    conditions
        .iter()
        .find(|c| c.condition_type == condition_type)
        .unwrap_or_else(|| panic!("missing condition {condition_type}"))
}

fn types_v1beta2(conditions: &[V1Beta2Condition]) -> Vec<&str> {
    conditions.iter().map(|c| c.condition_type.as_str()).collect()
}

#[test]
fn test_running_machine_is_ready() {
    let machine = state_of("Running", true, false);
    let state = MachineState::from_machine(&machine);

    let conditions = machine_legacy_conditions(&state);
    let types: Vec<&str> = conditions.iter().map(|c| c.condition_type.as_str()).collect();
    assert_eq!(types, vec!["BootstrapReady", "InfrastructureReady", "Ready"]);
    for condition in &conditions {
        assert_eq!(condition.status, ConditionStatus::True);
        assert_eq!(condition.severity, None, "true conditions carry no severity");
        assert!(condition.reason.is_empty());
    }

    let current = machine_v1beta2_conditions(&state);
    assert!(current.iter().take(5).all(|c| c.status == ConditionStatus::True));
    assert_eq!(current[4].reason, "NodeReady");
    assert_eq!(current[5].status, ConditionStatus::False);
    assert_eq!(current[5].reason, "NotDeleting");
}

#[test]
fn test_v1beta2_machine_condition_order_is_fixed() {
    for phase in PHASES {
        let machine = state_of(phase, false, false);
        let current = machine_v1beta2_conditions(&MachineState::from_machine(&machine));
        assert_eq!(
            types_v1beta2(&current),
            vec![
                "Available",
                "Ready",
                "BootstrapConfigReady",
                "InfrastructureReady",
                "NodeReady",
                "Deleting"
            ],
            "order for phase {phase:?}"
        );
    }
}

#[test]
fn test_provisioning_machine_waits_for_infrastructure() {
    let machine = state_of("Provisioning", false, false);
    let conditions = machine_legacy_conditions(&MachineState::from_machine(&machine));

    let infra = legacy(&conditions, "InfrastructureReady");
    assert_eq!(infra.status, ConditionStatus::False);
    assert_eq!(infra.reason, "WaitingForInfrastructure");
    assert_eq!(infra.severity, Some(ConditionSeverity::Info));

    let bootstrap = legacy(&conditions, "BootstrapReady");
    assert_eq!(bootstrap.reason, "WaitingForDataSecret");

    let ready = legacy(&conditions, "Ready");
    assert_eq!(ready.reason, "WaitingForInfrastructure");
}

#[test]
fn test_provisioned_machine_waits_for_node_ref() {
    let machine = state_of("Provisioned", false, false);
    let conditions = machine_legacy_conditions(&MachineState::from_machine(&machine));
    assert_eq!(legacy(&conditions, "InfrastructureReady").status, ConditionStatus::True);
    assert_eq!(legacy(&conditions, "Ready").reason, "WaitingForNodeRef");
}

#[test]
fn test_failed_machine_has_error_severity() {
    let machine = state_of("Failed", false, false);
    let conditions = machine_legacy_conditions(&MachineState::from_machine(&machine));
    let ready = legacy(&conditions, "Ready");
    assert_eq!(ready.reason, "MachineFailed");
    assert_eq!(ready.severity, Some(ConditionSeverity::Error));
}

#[test]
fn test_deleting_machine() {
    let machine = state_of("Deleting", true, true);
    let state = MachineState::from_machine(&machine);

    let conditions = machine_legacy_conditions(&state);
    assert_eq!(legacy(&conditions, "Ready").reason, "Deleting");
    assert_eq!(legacy(&conditions, "BootstrapReady").status, ConditionStatus::True);
    assert_eq!(legacy(&conditions, "InfrastructureReady").status, ConditionStatus::True);

    let current = machine_v1beta2_conditions(&state);
    assert_eq!(current[5].status, ConditionStatus::True);
    assert_eq!(current[5].reason, "Deleting");
    assert_eq!(current[4].status, ConditionStatus::True, "node still exists while deleting");
}

#[test]
fn test_node_ready_reasons() {
    let without_node = state_of("Provisioned", false, false);
    let current = machine_v1beta2_conditions(&MachineState::from_machine(&without_node));
    assert_eq!(current[4].reason, "NodeDoesNotExist");

    let with_node = state_of("Provisioned", true, false);
    let current = machine_v1beta2_conditions(&MachineState::from_machine(&with_node));
    assert_eq!(current[4].status, ConditionStatus::False);
    assert_eq!(current[4].reason, "NodeNotReady");
}

#[test]
fn test_machine_conditions_are_deterministic() {
    for phase in PHASES {
        for node_ref in [false, true] {
            for is_deleting in [false, true] {
                let machine = state_of(phase, node_ref, is_deleting);
                let state = MachineState::from_machine(&machine);

                let first = serde_json::to_string(&machine_legacy_conditions(&state)).unwrap();
                let second = serde_json::to_string(&machine_legacy_conditions(&state)).unwrap();
                assert_eq!(first, second);

                let first = serde_json::to_string(&machine_v1beta2_conditions(&state)).unwrap();
                let second = serde_json::to_string(&machine_v1beta2_conditions(&state)).unwrap();
                assert_eq!(first, second);

                for condition in machine_legacy_conditions(&state) {
                    assert_eq!(
                        condition.severity.is_some(),
                        condition.status != ConditionStatus::True,
                        "severity only on non-true conditions ({phase:?}, {node_ref}, {is_deleting})"
                    );
                }
            }
        }
    }
}

#[test]
fn test_machine_conditions_never_report_unsupported_types() {
    let machine = state_of("Running", true, false);
    let current = machine_v1beta2_conditions(&MachineState::from_machine(&machine));
    for absent in ["UpToDate", "Paused", "HealthCheckSucceeded", "OwnerRemediated"] {
        assert!(
            !types_v1beta2(&current).contains(&absent),
            "{absent} must not be produced"
        );
    }
}

#[test]
fn test_last_transition_time_from_last_updated() {
    let mut machine = state_of("Running", true, false);
    let updated: DateTime<Utc> = "2024-05-01T10:00:00Z".parse().unwrap();
    if let Some(status) = machine.status.as_mut() {
        status.last_updated = Some(updated);
    }
    let state = MachineState::from_machine(&machine);
    assert!(
        machine_legacy_conditions(&state)
            .iter()
            .all(|c| c.last_transition_time == Some(updated))
    );
    assert!(
        machine_v1beta2_conditions(&state)
            .iter()
            .all(|c| c.last_transition_time == Some(updated))
    );
}

fn set_state(desired: Option<i32>, replicas: i32, ready: i32, labeled: i32) -> MachineSetState {
    let mut machine_set = mapi_machine_set("ms", desired);
    let status = machine_set.status.get_or_insert_with(Default::default);
    status.replicas = replicas;
    status.ready_replicas = ready;
    status.fully_labeled_replicas = labeled;
    MachineSetState::from_machine_set(&machine_set)
}

#[test]
fn test_machine_set_resized_boundary() {
    let conditions = machine_set_legacy_conditions(&set_state(Some(3), 3, 3, 3));
    let types: Vec<&str> = conditions.iter().map(|c| c.condition_type.as_str()).collect();
    assert_eq!(types, vec!["MachinesCreated", "MachinesReady", "Ready", "Resized"]);
    assert!(conditions.iter().all(|c| c.status == ConditionStatus::True));

    let conditions = machine_set_legacy_conditions(&set_state(Some(3), 2, 2, 2));
    let resized = legacy(&conditions, "Resized");
    assert_eq!(resized.status, ConditionStatus::False);
    assert_eq!(resized.reason, "ScalingUp");
    assert_eq!(resized.severity, Some(ConditionSeverity::Warning));
    assert_eq!(legacy(&conditions, "MachinesCreated").status, ConditionStatus::False);
    assert_eq!(legacy(&conditions, "Ready").reason, "ScalingUp");
}

#[test]
fn test_machine_set_scaling_down_reason() {
    let conditions = machine_set_legacy_conditions(&set_state(Some(1), 3, 1, 1));
    assert_eq!(legacy(&conditions, "Resized").reason, "ScalingDown");
    assert_eq!(legacy(&conditions, "MachinesCreated").reason, "ScalingDown");
}

#[test]
fn test_machine_set_waiting_for_machines_ready() {
    let conditions = machine_set_legacy_conditions(&set_state(Some(3), 3, 1, 3));
    let machines_ready = legacy(&conditions, "MachinesReady");
    assert_eq!(machines_ready.reason, "WaitingForMachinesReady");
    assert_eq!(machines_ready.severity, Some(ConditionSeverity::Info));

    let ready = legacy(&conditions, "Ready");
    assert_eq!(ready.status, ConditionStatus::False);
    assert_eq!(ready.reason, "WaitingForMachinesReady");
}

#[test]
fn test_machine_set_default_replicas_is_one() {
    let state = set_state(None, 1, 1, 1);
    assert_eq!(state.desired, 1);
    assert!(
        machine_set_legacy_conditions(&state)
            .iter()
            .all(|c| c.status == ConditionStatus::True)
    );
}

#[test]
fn test_machine_set_zero_counts_are_true() {
    let state = set_state(Some(0), 0, 0, 0);
    assert!(
        machine_set_legacy_conditions(&state)
            .iter()
            .all(|c| c.status == ConditionStatus::True),
        "0 == 0 is a definite true"
    );
    let current = machine_set_v1beta2_conditions(&state);
    assert_eq!(current[0].status, ConditionStatus::True);
    assert_eq!(current[1].status, ConditionStatus::True);
    assert_eq!(current[2].status, ConditionStatus::False);
    assert_eq!(current[3].status, ConditionStatus::False);
}

#[test]
fn test_machine_set_v1beta2_conditions() {
    let current = machine_set_v1beta2_conditions(&set_state(Some(3), 2, 1, 2));
    assert_eq!(
        types_v1beta2(&current),
        vec!["MachinesReady", "MachinesUpToDate", "ScalingUp", "ScalingDown", "Deleting"]
    );
    assert_eq!(current[0].reason, "NotReady");
    assert_eq!(current[1].reason, "NotUpToDate");
    assert_eq!(current[2].status, ConditionStatus::True);
    assert_eq!(current[2].reason, "ScalingUp");
    assert_eq!(current[3].reason, "NotScalingDown");
    assert_eq!(current[4].reason, "NotDeleting");

    for absent in ["Remediating", "Paused"] {
        assert!(!types_v1beta2(&current).contains(&absent));
    }
}

#[test]
fn test_machines_up_to_date_uses_fully_labeled_replicas() {
    let current = machine_set_v1beta2_conditions(&set_state(Some(3), 3, 3, 2));
    assert_eq!(current[1].status, ConditionStatus::False);

    let current = machine_set_v1beta2_conditions(&set_state(Some(3), 3, 0, 3));
    assert_eq!(current[1].status, ConditionStatus::True);
    assert_eq!(current[1].reason, "UpToDate");
}
