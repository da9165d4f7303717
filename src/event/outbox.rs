use std::time::Duration;

use super::events::ServerEvent;

/// One outbound event and the connections it is addressed to
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub recipients: Vec<String>,
    pub event: ServerEvent,
}

/// What the room wants done with its phase timer after this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Replace any pending timer with one firing after the given delay
    Schedule(Duration),
    /// Drop any pending timer
    Cancel,
}

/// Collects everything a room step produces.
///
/// Rooms never talk to connections directly: they address events to player ids
/// here and request timer changes, and the manager carries both out once the
/// step has completed.
#[derive(Debug, Default)]
pub struct Outbox {
    deliveries: Vec<Delivery>,
    timer: Option<TimerCommand>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_to(&mut self, player_id: &str, event: ServerEvent) {
        self.deliveries.push(Delivery {
            recipients: vec![player_id.to_string()],
            event,
        });
    }

    pub fn send_to_many(&mut self, recipients: Vec<String>, event: ServerEvent) {
        if recipients.is_empty() {
            return;
        }
        self.deliveries.push(Delivery { recipients, event });
    }

    /// Later requests within the same step win.
    pub fn schedule(&mut self, after: Duration) {
        self.timer = Some(TimerCommand::Schedule(after));
    }

    pub fn cancel_timer(&mut self) {
        self.timer = Some(TimerCommand::Cancel);
    }

    pub fn timer(&self) -> Option<TimerCommand> {
        self.timer
    }

    pub fn take_timer(&mut self) -> Option<TimerCommand> {
        self.timer.take()
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn take_deliveries(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.deliveries)
    }

    /// Events addressed to one player, in emission order
    pub fn events_for(&self, player_id: &str) -> Vec<&ServerEvent> {
        self.deliveries
            .iter()
            .filter(|d| d.recipients.iter().any(|r| r == player_id))
            .map(|d| &d.event)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty() && self.timer.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_timer_request_wins() {
        let mut out = Outbox::new();
        out.schedule(Duration::from_secs(3));
        out.cancel_timer();
        assert_eq!(out.take_timer(), Some(TimerCommand::Cancel));
        assert_eq!(out.take_timer(), None);
    }

    #[test]
    fn test_events_for_filters_by_recipient() {
        let mut out = Outbox::new();
        out.send_to(
            "a",
            ServerEvent::Connected {
                session_id: "a".to_string(),
            },
        );
        out.send_to_many(
            vec!["a".to_string(), "b".to_string()],
            ServerEvent::TimeSkipped {
                phase: crate::mafia::Phase::Day,
            },
        );
        out.send_to_many(vec![], ServerEvent::TimeSkipped {
            phase: crate::mafia::Phase::Night,
        });
        assert_eq!(out.events_for("a").len(), 2);
        assert_eq!(out.events_for("b").len(), 1);
        assert_eq!(out.deliveries().len(), 2);
    }
}
