//! Precomputed message routes

use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::Arc;

use crate::identity::NodeAddress;

/// Set of node addresses a message is authorized to travel through
///
/// Routes are computed offline and never change, so the set is shared by
/// reference between the route table and every message that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route(Arc<BTreeSet<NodeAddress>>);

impl Route {
    /// Create a route from a set of addresses
    pub fn new(nodes: BTreeSet<NodeAddress>) -> Self {
        Self(Arc::new(nodes))
    }

    /// Check if a node is authorized to carry the message
    pub fn contains(&self, node: NodeAddress) -> bool {
        self.0.contains(&node)
    }

    /// Number of authorized nodes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no node is authorized
    ///
    /// An empty route is legal: the message can then only leave its holder
    /// by direct delivery.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate authorized nodes in address order
    pub fn iter(&self) -> impl Iterator<Item = NodeAddress> + '_ {
        self.0.iter().copied()
    }

    /// Check if two routes share the same underlying set
    pub fn ptr_eq(&self, other: &Route) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<NodeAddress> for Route {
    fn from_iter<T: IntoIterator<Item = NodeAddress>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[u32; N]> for Route {
    fn from(addresses: [u32; N]) -> Self {
        addresses.into_iter().map(NodeAddress).collect()
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, node) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", node.0)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let route = Route::from([2, 3]);
        assert!(route.contains(NodeAddress(2)));
        assert!(route.contains(NodeAddress(3)));
        assert!(!route.contains(NodeAddress(4)));
        assert_eq!(route.len(), 2);
        assert_eq!(
            route.iter().collect::<Vec<_>>(),
            vec![NodeAddress(2), NodeAddress(3)]
        );
    }

    #[test]
    fn test_empty_route() {
        let route = Route::default();
        assert!(route.is_empty());
        assert!(!route.contains(NodeAddress(0)));
    }

    #[test]
    fn test_clone_shares_set() {
        let route = Route::from([1]);
        let copy = route.clone();
        assert!(route.ptr_eq(&copy));

        let equal = Route::from([1]);
        assert_eq!(route, equal);
        assert!(!route.ptr_eq(&equal));
    }

    #[test]
    fn test_display() {
        let route = Route::from([5, 1, 3]);
        assert_eq!(route.to_string(), "{1,3,5}");
        assert_eq!(Route::default().to_string(), "{}");
    }
}
