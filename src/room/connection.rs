use axum::extract::ws::Message;
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use uuid::Uuid;

use crate::websocket::message::ClientRole;

/// Maximum number of simultaneous connections
pub const MAX_CONNECTION_COUNT: usize = 100;

/// Outcome of queueing a message for one peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Peer's outbound queue is full; this message is dropped for it
    Dropped,
    /// Peer's writer task is gone
    Closed,
}

#[derive(Debug)]
pub struct Connection {
    sender: Sender<Message>,
}

impl Connection {
    pub fn new(sender: Sender<Message>) -> Self {
        Self { sender }
    }

    /// Queue a message without waiting on a slow peer
    pub fn send(&self, message: Message) -> Delivery {
        match self.sender.try_send(message) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => Delivery::Dropped,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Who receives a server event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    All,
    Drawers,
    Guessers,
    Only(Uuid),
}

/// All live connections plus the two role sets.
///
/// `drawers` and `guessers` are always disjoint subsets of `all`.
#[derive(Debug, Default)]
pub struct ConnectionSet {
    all: HashMap<Uuid, Connection>,
    drawers: HashSet<Uuid>,
    guessers: HashSet<Uuid>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection with no role yet
    pub fn add(&mut self, id: Uuid, connection: Connection) -> bool {
        if self.is_full() {
            return false;
        }
        self.all.insert(id, connection);
        true
    }

    /// Give a connection a role, moving it out of the other role's set
    pub fn assign_role(&mut self, id: Uuid, role: ClientRole) -> bool {
        if !self.all.contains_key(&id) {
            return false;
        }
        match role {
            ClientRole::Drawer => {
                self.guessers.remove(&id);
                self.drawers.insert(id);
            }
            ClientRole::Guesser => {
                self.drawers.remove(&id);
                self.guessers.insert(id);
            }
        }
        true
    }

    /// Remove a connection from every set
    pub fn remove(&mut self, id: &Uuid) -> Option<Connection> {
        self.drawers.remove(id);
        self.guessers.remove(id);
        self.all.remove(id)
    }

    pub fn role_of(&self, id: &Uuid) -> Option<ClientRole> {
        if self.drawers.contains(id) {
            Some(ClientRole::Drawer)
        } else if self.guessers.contains(id) {
            Some(ClientRole::Guesser)
        } else {
            None
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&Connection> {
        self.all.get(id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.all.contains_key(id)
    }

    /// Snapshot of the ids in an audience
    pub fn recipients(&self, audience: Audience) -> Vec<Uuid> {
        match audience {
            Audience::All => self.all.keys().copied().collect(),
            Audience::Drawers => self.drawers.iter().copied().collect(),
            Audience::Guessers => self.guessers.iter().copied().collect(),
            Audience::Only(id) => self.all.contains_key(&id).then_some(id).into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.all.len() >= MAX_CONNECTION_COUNT
    }

    pub fn drawer_count(&self) -> usize {
        self.drawers.len()
    }

    pub fn guesser_count(&self) -> usize {
        self.guessers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn connection() -> (Connection, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(4);
        (Connection::new(tx), rx)
    }

    #[test]
    fn test_role_exclusivity() {
        let mut set = ConnectionSet::new();
        let id = Uuid::new_v4();
        let (conn, _rx) = connection();
        set.add(id, conn);
        assert_eq!(set.role_of(&id), None);

        set.assign_role(id, ClientRole::Drawer);
        assert_eq!(set.role_of(&id), Some(ClientRole::Drawer));
        assert_eq!((set.drawer_count(), set.guesser_count()), (1, 0));

        set.assign_role(id, ClientRole::Guesser);
        assert_eq!(set.role_of(&id), Some(ClientRole::Guesser));
        assert_eq!((set.drawer_count(), set.guesser_count()), (0, 1));

        set.assign_role(id, ClientRole::Guesser);
        assert_eq!(set.guesser_count(), 1);
    }

    #[test]
    fn test_assign_role_requires_connection() {
        let mut set = ConnectionSet::new();
        assert!(!set.assign_role(Uuid::new_v4(), ClientRole::Drawer));
        assert_eq!(set.drawer_count(), 0);
    }

    #[test]
    fn test_remove_clears_every_set() {
        let mut set = ConnectionSet::new();
        let id = Uuid::new_v4();
        let (conn, _rx) = connection();
        set.add(id, conn);
        set.assign_role(id, ClientRole::Drawer);

        assert!(set.remove(&id).is_some());
        assert!(set.is_empty());
        assert_eq!(set.role_of(&id), None);
        assert!(set.recipients(Audience::Drawers).is_empty());
    }

    #[test]
    fn test_recipients() {
        let mut set = ConnectionSet::new();
        let drawer = Uuid::new_v4();
        let guesser = Uuid::new_v4();
        let idle = Uuid::new_v4();
        let mut receivers = Vec::new();
        for id in [drawer, guesser, idle] {
            let (conn, rx) = connection();
            set.add(id, conn);
            receivers.push(rx);
        }
        set.assign_role(drawer, ClientRole::Drawer);
        set.assign_role(guesser, ClientRole::Guesser);

        assert_eq!(set.recipients(Audience::All).len(), 3);
        assert_eq!(set.recipients(Audience::Drawers), vec![drawer]);
        assert_eq!(set.recipients(Audience::Guessers), vec![guesser]);
        assert_eq!(set.recipients(Audience::Only(idle)), vec![idle]);
        assert!(set.recipients(Audience::Only(Uuid::new_v4())).is_empty());
    }

    #[test]
    fn test_send_reports_full_and_closed() {
        let (tx, rx) = mpsc::channel(1);
        let conn = Connection::new(tx);

        assert_eq!(conn.send(Message::Text("a".into())), Delivery::Sent);
        assert_eq!(conn.send(Message::Text("b".into())), Delivery::Dropped);

        drop(rx);
        assert_eq!(conn.send(Message::Text("c".into())), Delivery::Closed);
    }

    #[test]
    fn test_capacity_limit() {
        let mut set = ConnectionSet::new();
        let mut receivers = Vec::new();
        for _ in 0..MAX_CONNECTION_COUNT {
            let (conn, rx) = connection();
            assert!(set.add(Uuid::new_v4(), conn));
            receivers.push(rx);
        }
        let (conn, _rx) = connection();
        assert!(!set.add(Uuid::new_v4(), conn));
    }
}
