//! Cluster API condition types and reasons
//!
//! String constants are part of the API contract: tooling matches on them
//! verbatim.

// Legacy (v1beta1) condition types.
pub const READY_CONDITION: &str = "Ready";
pub const BOOTSTRAP_READY_CONDITION: &str = "BootstrapReady";
pub const INFRASTRUCTURE_READY_CONDITION: &str = "InfrastructureReady";
pub const RESIZED_CONDITION: &str = "Resized";
pub const MACHINES_CREATED_CONDITION: &str = "MachinesCreated";
pub const MACHINES_READY_CONDITION: &str = "MachinesReady";

// Legacy (v1beta1) reasons.
pub const WAITING_FOR_DATA_SECRET_REASON: &str = "WaitingForDataSecret";
pub const WAITING_FOR_INFRASTRUCTURE_REASON: &str = "WaitingForInfrastructure";
pub const WAITING_FOR_NODE_REF_REASON: &str = "WaitingForNodeRef";
pub const DELETING_REASON: &str = "Deleting";
pub const MACHINE_FAILED_REASON: &str = "MachineFailed";
pub const SCALING_UP_REASON: &str = "ScalingUp";
pub const SCALING_DOWN_REASON: &str = "ScalingDown";
pub const WAITING_FOR_MACHINES_READY_REASON: &str = "WaitingForMachinesReady";

// Machine v1beta2 condition types.
pub const MACHINE_AVAILABLE_V1BETA2_CONDITION: &str = "Available";
pub const MACHINE_READY_V1BETA2_CONDITION: &str = "Ready";
pub const MACHINE_BOOTSTRAP_CONFIG_READY_V1BETA2_CONDITION: &str = "BootstrapConfigReady";
pub const MACHINE_INFRASTRUCTURE_READY_V1BETA2_CONDITION: &str = "InfrastructureReady";
pub const MACHINE_NODE_READY_V1BETA2_CONDITION: &str = "NodeReady";
pub const MACHINE_DELETING_V1BETA2_CONDITION: &str = "Deleting";

// Machine v1beta2 reasons.
pub const MACHINE_AVAILABLE_V1BETA2_REASON: &str = "Available";
pub const MACHINE_NOT_AVAILABLE_V1BETA2_REASON: &str = "NotAvailable";
pub const MACHINE_READY_V1BETA2_REASON: &str = "Ready";
pub const MACHINE_NOT_READY_V1BETA2_REASON: &str = "NotReady";
pub const MACHINE_BOOTSTRAP_CONFIG_READY_V1BETA2_REASON: &str = "Ready";
pub const MACHINE_BOOTSTRAP_CONFIG_NOT_READY_V1BETA2_REASON: &str = "NotReady";
pub const MACHINE_INFRASTRUCTURE_READY_V1BETA2_REASON: &str = "Ready";
pub const MACHINE_INFRASTRUCTURE_NOT_READY_V1BETA2_REASON: &str = "NotReady";
pub const MACHINE_NODE_READY_V1BETA2_REASON: &str = "NodeReady";
pub const MACHINE_NODE_NOT_READY_V1BETA2_REASON: &str = "NodeNotReady";
pub const MACHINE_NODE_DOES_NOT_EXIST_V1BETA2_REASON: &str = "NodeDoesNotExist";
pub const MACHINE_DELETING_V1BETA2_REASON: &str = "Deleting";
pub const MACHINE_NOT_DELETING_V1BETA2_REASON: &str = "NotDeleting";

// MachineSet v1beta2 condition types.
pub const MACHINE_SET_MACHINES_READY_V1BETA2_CONDITION: &str = "MachinesReady";
pub const MACHINE_SET_MACHINES_UP_TO_DATE_V1BETA2_CONDITION: &str = "MachinesUpToDate";
pub const MACHINE_SET_SCALING_UP_V1BETA2_CONDITION: &str = "ScalingUp";
pub const MACHINE_SET_SCALING_DOWN_V1BETA2_CONDITION: &str = "ScalingDown";
pub const MACHINE_SET_REMEDIATING_V1BETA2_CONDITION: &str = "Remediating";
pub const MACHINE_SET_DELETING_V1BETA2_CONDITION: &str = "Deleting";
pub const PAUSED_V1BETA2_CONDITION: &str = "Paused";

// MachineSet v1beta2 reasons.
pub const MACHINE_SET_MACHINES_READY_V1BETA2_REASON: &str = "Ready";
pub const MACHINE_SET_MACHINES_NOT_READY_V1BETA2_REASON: &str = "NotReady";
pub const MACHINE_SET_MACHINES_UP_TO_DATE_V1BETA2_REASON: &str = "UpToDate";
pub const MACHINE_SET_MACHINES_NOT_UP_TO_DATE_V1BETA2_REASON: &str = "NotUpToDate";
pub const MACHINE_SET_SCALING_UP_V1BETA2_REASON: &str = "ScalingUp";
pub const MACHINE_SET_NOT_SCALING_UP_V1BETA2_REASON: &str = "NotScalingUp";
pub const MACHINE_SET_SCALING_DOWN_V1BETA2_REASON: &str = "ScalingDown";
pub const MACHINE_SET_NOT_SCALING_DOWN_V1BETA2_REASON: &str = "NotScalingDown";
pub const MACHINE_SET_DELETING_V1BETA2_REASON: &str = "Deleting";
pub const MACHINE_SET_NOT_DELETING_V1BETA2_REASON: &str = "NotDeleting";
