//! The fixed lifecycle-hook table: source method name -> target export name
//! and parameter export names.
//!
//! This table is intentionally static data, not something derived from user
//! input — every entry class synthesizes its `_start` and any hook body it
//! defines using exactly these names, so independently compiled assemblies
//! agree on the wire names without ever communicating.

/// One row of the lifecycle-hook table.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleHook {
    /// The method name as written in source, e.g. `"OnPlayerJoined"`.
    pub source_name: &'static str,
    /// The fixed export name, e.g. `"_onPlayerJoined"`.
    pub export_name: &'static str,
    /// Export names for each parameter, in declaration order.
    pub param_export_names: &'static [&'static str],
}

/// The reserved entry-point export every entry class synthesizes, even if
/// no `Start` method is user-defined.
pub const START_EXPORT: &str = "_start";

const HOOKS: &[LifecycleHook] = &[
    LifecycleHook {
        source_name: "Start",
        export_name: "_start",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "Update",
        export_name: "_update",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "LateUpdate",
        export_name: "_lateUpdate",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "FixedUpdate",
        export_name: "_fixedUpdate",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "OnEnable",
        export_name: "_onEnable",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "OnDisable",
        export_name: "_onDisable",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "OnDestroy",
        export_name: "_onDestroy",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "Interact",
        export_name: "_interact",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "OnPlayerJoined",
        export_name: "_onPlayerJoined",
        param_export_names: &["player"],
    },
    LifecycleHook {
        source_name: "OnPlayerLeft",
        export_name: "_onPlayerLeft",
        param_export_names: &["player"],
    },
    LifecycleHook {
        source_name: "OnPlayerRespawn",
        export_name: "_onPlayerRespawn",
        param_export_names: &["player"],
    },
    LifecycleHook {
        source_name: "OnAvatarEyeHeightChanged",
        export_name: "_onAvatarEyeHeightChanged",
        param_export_names: &["player", "eyeHeightAsMeters"],
    },
    LifecycleHook {
        source_name: "OnOwnershipTransferred",
        export_name: "_onOwnershipTransferred",
        param_export_names: &["player"],
    },
    LifecycleHook {
        source_name: "OnPickup",
        export_name: "_onPickup",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "OnDrop",
        export_name: "_onDrop",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "OnPickupUseDown",
        export_name: "_onPickupUseDown",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "OnPickupUseUp",
        export_name: "_onPickupUseUp",
        param_export_names: &[],
    },
    LifecycleHook {
        source_name: "OnTriggerEnter",
        export_name: "_onTriggerEnter",
        param_export_names: &["other"],
    },
    LifecycleHook {
        source_name: "OnTriggerExit",
        export_name: "_onTriggerExit",
        param_export_names: &["other"],
    },
    LifecycleHook {
        source_name: "OnCollisionEnter",
        export_name: "_onCollisionEnter",
        param_export_names: &["other"],
    },
    LifecycleHook {
        source_name: "OnStationEntered",
        export_name: "_onStationEntered",
        param_export_names: &["player"],
    },
    LifecycleHook {
        source_name: "OnStationExited",
        export_name: "_onStationExited",
        param_export_names: &["player"],
    },
];

/// Look up a hook by its source method name.
pub fn lookup(source_name: &str) -> Option<&'static LifecycleHook> {
    HOOKS.iter().find(|h| h.source_name == source_name)
}

/// The bare source names, for `ClassMetadata::from_decl`'s entry-point test.
pub fn hook_names() -> Vec<&'static str> {
    HOOKS.iter().map(|h| h.source_name).collect()
}

pub fn all_hooks() -> &'static [LifecycleHook] {
    HOOKS
}
