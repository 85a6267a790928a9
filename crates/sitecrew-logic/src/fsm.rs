//! Declarative per-role worker state machines.
//!
//! The transition table is a pure function (role, state, event) → next
//! state. Events not present for the current state return `None` and leave
//! the machine untouched — illegal order sequencing is a no-op, never a
//! panic. Every applied transition is reported so the engine can log it.

use serde::{Deserialize, Serialize};

/// Worker occupation. Determines which job cycle the FSM runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Builder,
    Delivery,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Builder => "builder",
            Role::Delivery => "delivery",
        }
    }
}

/// Auditable projection of what a worker is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    Idle,
    HeadingToSite,
    Building,
    HeadingToDepot,
    Loading,
    Delivering,
    HeadingToDorm,
    Resting,
}

impl WorkerState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkerState::Idle => "idle",
            WorkerState::HeadingToSite => "headingToSite",
            WorkerState::Building => "building",
            WorkerState::HeadingToDepot => "headingToDepot",
            WorkerState::Loading => "loading",
            WorkerState::Delivering => "delivering",
            WorkerState::HeadingToDorm => "headingToDorm",
            WorkerState::Resting => "resting",
        }
    }
}

/// Events that drive the job cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerEvent {
    /// Builder ordered to the construction site.
    Build,
    /// Delivery worker ordered to start the fetch loop.
    Fetch,
    /// Any active worker interrupted toward the dorm.
    Rest,
    /// Active order revoked; back to idle. Not accepted during the dorm cycle.
    Cancel,
    ArriveWork,
    ArriveSource,
    ArriveSite,
    LoadComplete,
    DropComplete,
    Complete,
    ArriveRest,
    Recovered,
}

impl WorkerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkerEvent::Build => "build",
            WorkerEvent::Fetch => "fetch",
            WorkerEvent::Rest => "rest",
            WorkerEvent::Cancel => "cancel",
            WorkerEvent::ArriveWork => "arriveWork",
            WorkerEvent::ArriveSource => "arriveSource",
            WorkerEvent::ArriveSite => "arriveSite",
            WorkerEvent::LoadComplete => "loadComplete",
            WorkerEvent::DropComplete => "dropComplete",
            WorkerEvent::Complete => "complete",
            WorkerEvent::ArriveRest => "arriveRest",
            WorkerEvent::Recovered => "recovered",
        }
    }
}

/// The transition table. `None` means the event is not recognized in this
/// state for this role.
pub fn next_state(role: Role, state: WorkerState, event: WorkerEvent) -> Option<WorkerState> {
    use WorkerEvent as E;
    use WorkerState as S;

    match role {
        Role::Builder => match (state, event) {
            (S::Idle, E::Build) => Some(S::HeadingToSite),
            (S::Idle, E::Rest) => Some(S::HeadingToDorm),
            (S::Idle, E::Cancel) => Some(S::Idle),
            (S::HeadingToSite, E::ArriveWork) => Some(S::Building),
            (S::HeadingToSite, E::Rest) => Some(S::HeadingToDorm),
            (S::HeadingToSite, E::Cancel) => Some(S::Idle),
            (S::Building, E::Complete) => Some(S::Idle),
            (S::Building, E::Rest) => Some(S::HeadingToDorm),
            (S::Building, E::Cancel) => Some(S::Idle),
            (S::HeadingToDorm, E::ArriveRest) => Some(S::Resting),
            (S::Resting, E::Recovered) => Some(S::Idle),
            _ => None,
        },
        Role::Delivery => match (state, event) {
            (S::Idle, E::Fetch) => Some(S::HeadingToDepot),
            (S::Idle, E::Rest) => Some(S::HeadingToDorm),
            (S::Idle, E::Cancel) => Some(S::Idle),
            (S::HeadingToDepot, E::ArriveSource) => Some(S::Loading),
            (S::HeadingToDepot, E::Rest) => Some(S::HeadingToDorm),
            (S::HeadingToDepot, E::Cancel) => Some(S::Idle),
            (S::Loading, E::LoadComplete) => Some(S::HeadingToSite),
            (S::Loading, E::Rest) => Some(S::HeadingToDorm),
            (S::Loading, E::Cancel) => Some(S::Idle),
            (S::HeadingToSite, E::ArriveSite) => Some(S::Delivering),
            (S::HeadingToSite, E::Rest) => Some(S::HeadingToDorm),
            (S::HeadingToSite, E::Cancel) => Some(S::Idle),
            (S::Delivering, E::DropComplete) => Some(S::HeadingToDepot),
            (S::Delivering, E::Rest) => Some(S::HeadingToDorm),
            (S::Delivering, E::Cancel) => Some(S::Idle),
            (S::HeadingToDorm, E::ArriveRest) => Some(S::Resting),
            (S::Resting, E::Recovered) => Some(S::Idle),
            _ => None,
        },
    }
}

/// A transition that was actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub event: WorkerEvent,
    pub from: WorkerState,
    pub to: WorkerState,
}

/// Stateful wrapper around the transition table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMachine {
    pub role: Role,
    pub state: WorkerState,
}

impl StateMachine {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            state: WorkerState::Idle,
        }
    }

    /// Apply an event. Returns the transition if the event was legal in the
    /// current state; otherwise `None` and the state is unchanged.
    pub fn apply(&mut self, event: WorkerEvent) -> Option<Transition> {
        let next = next_state(self.role, self.state, event)?;
        let transition = Transition {
            event,
            from: self.state,
            to: next,
        };
        self.state = next;
        Some(transition)
    }

    pub fn reset(&mut self) {
        self.state = WorkerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkerEvent as E;
    use WorkerState as S;

    const ALL_STATES: [WorkerState; 8] = [
        S::Idle,
        S::HeadingToSite,
        S::Building,
        S::HeadingToDepot,
        S::Loading,
        S::Delivering,
        S::HeadingToDorm,
        S::Resting,
    ];

    const ALL_EVENTS: [WorkerEvent; 12] = [
        E::Build,
        E::Fetch,
        E::Rest,
        E::Cancel,
        E::ArriveWork,
        E::ArriveSource,
        E::ArriveSite,
        E::LoadComplete,
        E::DropComplete,
        E::Complete,
        E::ArriveRest,
        E::Recovered,
    ];

    #[test]
    fn builder_job_cycle() {
        let mut fsm = StateMachine::new(Role::Builder);
        assert!(fsm.apply(E::Build).is_some());
        assert_eq!(fsm.state, S::HeadingToSite);
        assert!(fsm.apply(E::ArriveWork).is_some());
        assert_eq!(fsm.state, S::Building);
        assert!(fsm.apply(E::Complete).is_some());
        assert_eq!(fsm.state, S::Idle);
    }

    #[test]
    fn delivery_loop_returns_to_depot() {
        let mut fsm = StateMachine::new(Role::Delivery);
        for event in [E::Fetch, E::ArriveSource, E::LoadComplete, E::ArriveSite] {
            assert!(fsm.apply(event).is_some(), "{:?} rejected", event);
        }
        assert_eq!(fsm.state, S::Delivering);
        assert!(fsm.apply(E::DropComplete).is_some());
        assert_eq!(fsm.state, S::HeadingToDepot);
    }

    #[test]
    fn rest_interrupts_any_active_state() {
        for role in [Role::Builder, Role::Delivery] {
            for state in ALL_STATES {
                if next_state(role, state, E::Rest).is_none() {
                    // Only the dorm cycle itself refuses the rest interrupt.
                    assert!(
                        matches!(state, S::HeadingToDorm | S::Resting)
                            || next_state(role, state, E::ArriveWork).is_none()
                                && next_state(role, state, E::ArriveSource).is_none()
                                && state != S::Idle
                    );
                }
            }
        }
    }

    #[test]
    fn cancel_not_accepted_in_dorm_cycle() {
        for role in [Role::Builder, Role::Delivery] {
            assert!(next_state(role, S::HeadingToDorm, E::Cancel).is_none());
            assert!(next_state(role, S::Resting, E::Cancel).is_none());
        }
    }

    #[test]
    fn unknown_event_is_noop_for_every_state() {
        for role in [Role::Builder, Role::Delivery] {
            for state in ALL_STATES {
                for event in ALL_EVENTS {
                    let mut fsm = StateMachine { role, state };
                    let before = fsm.state;
                    if fsm.apply(event).is_none() {
                        assert_eq!(fsm.state, before, "{:?}/{:?}/{:?}", role, state, event);
                    }
                }
            }
        }
    }

    #[test]
    fn builder_never_enters_delivery_states() {
        // No builder transition targets the depot/loading/delivering states.
        for state in ALL_STATES {
            for event in ALL_EVENTS {
                if let Some(next) = next_state(Role::Builder, state, event) {
                    assert!(!matches!(
                        next,
                        S::HeadingToDepot | S::Loading | S::Delivering
                    ));
                }
            }
        }
    }

    #[test]
    fn transition_reports_endpoints() {
        let mut fsm = StateMachine::new(Role::Builder);
        let t = fsm.apply(E::Build).unwrap();
        assert_eq!(t.from, S::Idle);
        assert_eq!(t.to, S::HeadingToSite);
        assert_eq!(t.event, E::Build);
    }
}
