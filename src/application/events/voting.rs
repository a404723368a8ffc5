//! Two-phase vote-then-notify events
//!
//! A parent aggregate asks its voters whether a mutation (e.g. adding a
//! charging station) may happen, commits it only on approval, and then
//! notifies its notification subscribers. Both phases run synchronously
//! on the caller's thread, in registration order.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::domain::ids::EventTrackingId;
use crate::support::subscription::SubscriptionCounter;
use crate::support::{HandlerResult, SubscriptionId};

/// A single voter's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Approve,
    Veto,
}

impl From<bool> for Vote {
    fn from(approve: bool) -> Self {
        if approve {
            Vote::Approve
        } else {
            Vote::Veto
        }
    }
}

/// Combines the votes of one voting round into a verdict
pub trait VoteAggregator: Default {
    fn record(&mut self, vote: Vote);
    fn approved(&self) -> bool;
}

/// Approves unless at least one voter vetoes. No voters means approval.
#[derive(Debug, Default)]
pub struct VetoVote {
    vetoes: usize,
}

impl VoteAggregator for VetoVote {
    fn record(&mut self, vote: Vote) {
        if vote == Vote::Veto {
            self.vetoes += 1;
        }
    }

    fn approved(&self) -> bool {
        self.vetoes == 0
    }
}

/// Result of [`VotingNotificator::vote_and_notify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotingOutcome {
    Approved,
    Vetoed,
}

pub type Voter<S, A> = Arc<dyn Fn(&EventTrackingId, &S, &A) -> HandlerResult<Vote> + Send + Sync>;
pub type Notifier<S, A> = Arc<dyn Fn(&EventTrackingId, &S, &A) -> HandlerResult<()> + Send + Sync>;

/// Voters and notification subscribers of one event, e.g. "station added
/// to group". `S` is the sender, `A` the event argument.
pub struct VotingNotificator<S, A, G = VetoVote> {
    name: String,
    voters: RwLock<BTreeMap<SubscriptionId, Voter<S, A>>>,
    notifiers: RwLock<BTreeMap<SubscriptionId, Notifier<S, A>>>,
    subscriptions: SubscriptionCounter,
    aggregator: PhantomData<fn() -> G>,
}

impl<S, A, G: VoteAggregator> VotingNotificator<S, A, G> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            voters: RwLock::new(BTreeMap::new()),
            notifiers: RwLock::new(BTreeMap::new()),
            subscriptions: SubscriptionCounter::default(),
            aggregator: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn on_vote<F>(&self, voter: F) -> SubscriptionId
    where
        F: Fn(&EventTrackingId, &S, &A) -> HandlerResult<Vote> + Send + Sync + 'static,
    {
        let id = self.subscriptions.next();
        self.voters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(voter));
        debug!(event = %self.name, subscription = %id, "Voter registered");
        id
    }

    pub fn on_notification<F>(&self, notifier: F) -> SubscriptionId
    where
        F: Fn(&EventTrackingId, &S, &A) -> HandlerResult<()> + Send + Sync + 'static,
    {
        let id = self.subscriptions.next();
        self.notifiers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(notifier));
        debug!(event = %self.name, subscription = %id, "Notification subscriber registered");
        id
    }

    /// Remove a voter or notification subscriber. Returns false for
    /// unknown handles.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed_voter = self
            .voters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        let removed_notifier = self
            .notifiers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        removed_voter || removed_notifier
    }

    pub fn voter_count(&self) -> usize {
        self.voters.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn notifier_count(&self) -> usize {
        self.notifiers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Ask every voter. All voters are polled even after a veto, since
    /// voters may record the attempt. A failing voter aborts the round
    /// and its error is returned.
    pub fn send_voting(&self, event_tracking_id: &EventTrackingId, sender: &S, arg: &A) -> HandlerResult<bool> {
        let voters: Vec<Voter<S, A>> = self
            .voters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut aggregator = G::default();
        for voter in &voters {
            aggregator.record(voter(event_tracking_id, sender, arg)?);
        }

        let approved = aggregator.approved();
        debug!(
            event = %self.name,
            %event_tracking_id,
            voters = voters.len(),
            approved,
            "Voting finished"
        );
        Ok(approved)
    }

    /// Notify every subscriber in registration order. Meant to be called
    /// only after [`send_voting`](Self::send_voting) approved. The first
    /// failing subscriber aborts the remaining ones.
    pub fn send_notification(&self, event_tracking_id: &EventTrackingId, sender: &S, arg: &A) -> HandlerResult<()> {
        let notifiers: Vec<Notifier<S, A>> = self
            .notifiers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for notifier in &notifiers {
            notifier(event_tracking_id, sender, arg)?;
        }

        debug!(
            event = %self.name,
            %event_tracking_id,
            subscribers = notifiers.len(),
            "Notification sent"
        );
        Ok(())
    }

    /// Run both phases: vote, and notify only if approved.
    pub fn vote_and_notify(
        &self,
        event_tracking_id: &EventTrackingId,
        sender: &S,
        arg: &A,
    ) -> HandlerResult<VotingOutcome> {
        if !self.send_voting(event_tracking_id, sender, arg)? {
            info!(event = %self.name, %event_tracking_id, "Vetoed");
            return Ok(VotingOutcome::Vetoed);
        }
        self.send_notification(event_tracking_id, sender, arg)?;
        Ok(VotingOutcome::Approved)
    }
}

impl<S, A, G> fmt::Debug for VotingNotificator<S, A, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VotingNotificator")
            .field("name", &self.name)
            .field(
                "voters",
                &self.voters.read().unwrap_or_else(PoisonError::into_inner).len(),
            )
            .field(
                "notifiers",
                &self.notifiers.read().unwrap_or_else(PoisonError::into_inner).len(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::HandlerError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type Bus = VotingNotificator<&'static str, u32>;

    #[test]
    fn no_voters_approves() {
        let bus = Bus::new("test");
        assert!(bus.send_voting(&EventTrackingId::new(), &"group", &1).unwrap());
    }

    #[test]
    fn single_veto_rejects_but_every_voter_is_polled() {
        let bus = Bus::new("station_addition");
        let polled = Arc::new(AtomicUsize::new(0));

        for approve in [true, false, true] {
            let polled = polled.clone();
            bus.on_vote(move |_, _, _| {
                polled.fetch_add(1, Ordering::SeqCst);
                Ok(Vote::from(approve))
            });
        }

        assert!(!bus.send_voting(&EventTrackingId::new(), &"group", &7).unwrap());
        assert_eq!(polled.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn vetoed_event_does_not_notify() {
        let bus = Bus::new("station_addition");
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        bus.on_vote(|_, _, station| Ok(Vote::from(*station != 13)));
        bus.on_notification(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let etid = EventTrackingId::new();
        assert_eq!(bus.vote_and_notify(&etid, &"group", &13).unwrap(), VotingOutcome::Vetoed);
        assert_eq!(notified.load(Ordering::SeqCst), 0);

        assert_eq!(bus.vote_and_notify(&etid, &"group", &12).unwrap(), VotingOutcome::Approved);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn notifications_run_in_registration_order_and_stop_on_error() {
        let bus = Bus::new("station_removal");
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        bus.on_notification(move |_, sender, arg| {
            first.lock().unwrap().push(format!("first:{}:{}", sender, arg));
            Ok(())
        });
        bus.on_notification(|_, _, _| Err(HandlerError::new("index out of sync")));
        let third = order.clone();
        bus.on_notification(move |_, _, _| {
            third.lock().unwrap().push("third".to_string());
            Ok(())
        });

        let err = bus
            .send_notification(&EventTrackingId::new(), &"group", &5)
            .unwrap_err();
        assert_eq!(err.message(), "index out of sync");
        assert_eq!(*order.lock().unwrap(), vec!["first:group:5".to_string()]);
    }

    #[test]
    fn voter_error_propagates() {
        let bus = Bus::new("test");
        bus.on_vote(|_, _, _| Err(HandlerError::new("voter crashed")));
        assert!(bus.send_voting(&EventTrackingId::new(), &"g", &1).is_err());
    }

    #[test]
    fn unsubscribe_removes_exactly_one_callback() {
        let bus = Bus::new("test");
        let veto = bus.on_vote(|_, _, _| Ok(Vote::Veto));
        let notifier = bus.on_notification(|_, _, _| Ok(()));
        assert_eq!(bus.voter_count(), 1);
        assert_eq!(bus.notifier_count(), 1);

        assert!(bus.unsubscribe(veto));
        assert!(!bus.unsubscribe(veto));
        assert_eq!(bus.notifier_count(), 1);
        assert!(bus.send_voting(&EventTrackingId::new(), &"g", &1).unwrap());

        assert!(bus.unsubscribe(notifier));
        assert_eq!(bus.notifier_count(), 0);
    }

    #[test]
    fn callbacks_may_subscribe_during_dispatch() {
        let bus = Arc::new(Bus::new("test"));
        let inner = bus.clone();
        bus.on_notification(move |_, _, _| {
            inner.on_notification(|_, _, _| Ok(()));
            Ok(())
        });

        bus.send_notification(&EventTrackingId::new(), &"g", &1).unwrap();
        assert_eq!(bus.notifier_count(), 2);
    }
}
