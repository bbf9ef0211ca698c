//! Buffered messages and their attached routes
//!
//! A [`Message`] is created by the substrate and handed to the forwarding
//! policy's creation hook, which attaches the message's [`Route`] exactly
//! once before the message enters a buffer. Relayed copies share the same
//! route.

use crate::error::{CoreError, CoreResult};
use crate::identity::{MessageId, NodeAddress};
use crate::route::Route;

/// Route attachment state of a message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RouteAttachment {
    /// Not yet seen by the creation hook
    #[default]
    Pending,
    /// The route table had no entry for this message
    Undefined,
    /// Route found in the table
    Defined(Route),
}

/// A message held in a node's buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message name, doubling as its route table key
    pub id: MessageId,
    /// Node that created the message
    pub from: NodeAddress,
    /// Final recipient
    pub to: NodeAddress,
    /// Size in bytes
    pub size: u64,
    /// Creation time in simulation ticks
    pub created_at: u64,
    route: RouteAttachment,
}

impl Message {
    /// Create a message with no route attached yet
    pub fn new(
        id: impl Into<MessageId>,
        from: NodeAddress,
        to: NodeAddress,
        size: u64,
        created_at: u64,
    ) -> Self {
        Self {
            id: id.into(),
            from,
            to,
            size,
            created_at,
            route: RouteAttachment::Pending,
        }
    }

    /// Attach the route looked up for this message
    ///
    /// `None` records that no route is defined; such a message is never
    /// relayed. Fails if a route was already attached.
    pub fn attach_route(&mut self, route: Option<Route>) -> CoreResult<()> {
        if self.route != RouteAttachment::Pending {
            return Err(CoreError::RouteAlreadyAttached(self.id.to_string()));
        }
        self.route = match route {
            Some(route) => RouteAttachment::Defined(route),
            None => RouteAttachment::Undefined,
        };
        Ok(())
    }

    /// The attached route, if one is defined
    pub fn route(&self) -> Option<&Route> {
        match &self.route {
            RouteAttachment::Defined(route) => Some(route),
            _ => None,
        }
    }

    /// The full attachment state
    pub fn route_attachment(&self) -> &RouteAttachment {
        &self.route
    }

    /// Check if the creation hook has processed this message
    pub fn has_route_attached(&self) -> bool {
        self.route != RouteAttachment::Pending
    }

    /// Check if `node` may relay this message
    ///
    /// Fails closed: a message without a defined route authorizes nobody.
    pub fn authorizes(&self, node: NodeAddress) -> bool {
        self.route().is_some_and(|route| route.contains(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_message(id: &str) -> Message {
        Message::new(id, NodeAddress(0), NodeAddress(9), 100, 0)
    }

    #[test]
    fn test_new_message_is_pending() {
        let message = make_message("1");
        assert!(!message.has_route_attached());
        assert_eq!(message.route(), None);
        assert!(!message.authorizes(NodeAddress(2)));
    }

    #[test]
    fn test_attach_defined_route() {
        let mut message = make_message("1");
        message.attach_route(Some(Route::from([2, 3]))).unwrap();

        assert!(message.has_route_attached());
        assert_eq!(message.route(), Some(&Route::from([2, 3])));
        assert!(message.authorizes(NodeAddress(2)));
        assert!(!message.authorizes(NodeAddress(4)));
    }

    #[test]
    fn test_attach_undefined_route_fails_closed() {
        let mut message = make_message("99");
        message.attach_route(None).unwrap();

        assert!(message.has_route_attached());
        assert_eq!(message.route_attachment(), &RouteAttachment::Undefined);
        assert!(!message.authorizes(NodeAddress(0)));
    }

    #[test]
    fn test_route_attached_once() {
        let mut message = make_message("1");
        message.attach_route(None).unwrap();

        let result = message.attach_route(Some(Route::from([2])));
        assert_eq!(
            result,
            Err(CoreError::RouteAlreadyAttached("1".to_string()))
        );
        assert_eq!(message.route(), None);
    }

    #[test]
    fn test_relayed_copy_shares_route() {
        let mut message = make_message("1");
        message.attach_route(Some(Route::from([4]))).unwrap();
        let copy = message.clone();
        assert!(message.route().unwrap().ptr_eq(copy.route().unwrap()));
    }
}
