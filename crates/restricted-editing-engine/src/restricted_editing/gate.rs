use std::ops::Range;

use crate::capabilities::CommandRegistry;
use crate::editing::MarkerStore;

/// Disable reason the gate puts on commands
pub const RESTRICTED_MODE_REASON: &str = "RestrictedMode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    /// Focus is outside every exception zone
    #[default]
    Restricted,
    /// Focus is inside (or on the boundary of) an exception zone
    Unrestricted,
}

impl GateState {
    /// Decide from the focus position and the current markers alone.
    ///
    /// Any marker of `group` touching `focus` unrestricts; overlapping zones
    /// need no special handling.
    pub fn for_focus(focus: usize, markers: &MarkerStore, group: &str) -> Self {
        if markers.any_in_group_at(group, focus) {
            GateState::Unrestricted
        } else {
            GateState::Restricted
        }
    }
}

/// Clip `range` to an exception zone touching `focus`.
///
/// The gate only looks at the focus, so a caret on a zone boundary unlocks
/// edits that would reach past it. Callers removing text clip the range here
/// first. Of the zones touching `focus`, the one overlapping `range` most
/// wins. Returns `None` when no part of `range` lies in such a zone.
pub fn clip_to_zone(
    markers: &MarkerStore,
    group: &str,
    focus: usize,
    range: Range<usize>,
) -> Option<Range<usize>> {
    markers
        .in_group(group)
        .filter(|zone| zone.range.start <= focus && focus <= zone.range.end)
        .map(|zone| range.start.max(zone.range.start)..range.end.min(zone.range.end))
        .filter(|clipped| clipped.start < clipped.end)
        .max_by_key(|clipped| clipped.end - clipped.start)
}

/// Set or clear [`RESTRICTED_MODE_REASON`] on every command not in
/// `always_enabled`. Running it again with the same state changes nothing.
pub fn apply_gate(state: GateState, commands: &mut CommandRegistry, always_enabled: &[String]) {
    for command in commands.iter_mut() {
        if always_enabled.iter().any(|name| name == command.name()) {
            continue;
        }
        match state {
            GateState::Restricted => command.force_disable(RESTRICTED_MODE_REASON),
            GateState::Unrestricted => command.clear_force_disabled(RESTRICTED_MODE_REASON),
        }
    }
}
