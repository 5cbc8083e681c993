//! Sub-goal navigator trait

use crate::error::{Result, RoutingError};
use wayfinder_core::{NodeId, World};

/// Produces the ordered nodes a route should pass through
///
/// Every sequence starts at the origin and ends at the destination.
pub trait SubGoalNavigator {
    fn sub_goals(&self, origin: NodeId, destination: NodeId) -> Result<Vec<NodeId>>;
}

/// Reject trips a navigator cannot plan: unknown nodes or origin == destination
pub fn check_trip(world: &World, origin: NodeId, destination: NodeId) -> Result<()> {
    for node in [origin, destination] {
        if !world.primal().contains_node(node) {
            return Err(RoutingError::UnknownNode(node));
        }
    }
    if origin == destination {
        return Err(RoutingError::DegenerateTrip(origin));
    }
    Ok(())
}

/// Drop consecutive repeats, e.g. a gateway exit that is also the origin
pub(crate) fn dedup_sequence(mut sequence: Vec<NodeId>) -> Vec<NodeId> {
    sequence.dedup();
    sequence
}
