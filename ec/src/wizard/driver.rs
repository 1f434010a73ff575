//! Wizard driver: runs the state machine's effects
//!
//! Owns the machine together with its collaborators (reasoning controller,
//! storage, grounding timers). Every event goes through [`Wizard::dispatch`],
//! which applies it and then executes the queued effects until none remain,
//! awaiting each reasoning call before returning.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::controller::ConversationController;
use super::grounding::{BreathingExercise, GroundingTick, GroundingTiming};
use super::machine::{Effect, SessionMachine};
use super::phase::{Event, Phase};
use crate::reasoning::ReasoningService;
use crate::store::Storage;

pub struct Wizard {
    machine: SessionMachine,
    controller: ConversationController,
    storage: Storage,
    timing: GroundingTiming,
    exercise: Option<(BreathingExercise, mpsc::UnboundedReceiver<GroundingTick>)>,
}

impl Wizard {
    /// Read the stored slots once and start the machine at its initial phase
    pub fn new(storage: Storage, service: Arc<dyn ReasoningService>, timing: GroundingTiming) -> Self {
        let machine = SessionMachine::new(storage.load_state());
        Self {
            machine,
            controller: ConversationController::new(service),
            storage,
            timing,
            exercise: None,
        }
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// Apply an event and carry out everything it set in motion
    pub async fn dispatch(&mut self, event: Event) -> Phase {
        self.machine.transition(event);
        self.run_effects().await;
        self.machine.phase()
    }

    /// Next tick of the running grounding exercise
    ///
    /// Returns `None` when no exercise is running or its timers have all
    /// stopped. A `Finished` tick is turned into the elapsed event here.
    pub async fn next_grounding_tick(&mut self) -> Option<GroundingTick> {
        let (_, rx) = self.exercise.as_mut()?;
        let tick = rx.recv().await;
        if tick == Some(GroundingTick::Finished) {
            self.dispatch(Event::GroundingElapsed).await;
        }
        tick
    }

    pub fn grounding_active(&self) -> bool {
        self.exercise.is_some()
    }

    async fn run_effects(&mut self) {
        loop {
            let effects = self.machine.take_effects();
            if effects.is_empty() {
                break;
            }
            for effect in effects {
                self.apply(effect).await;
            }
        }
    }

    async fn apply(&mut self, effect: Effect) {
        debug!(?effect, "Wizard::apply: called");
        match effect {
            Effect::PersistLanguage(language) => {
                if let Err(e) = self.storage.save_language(language) {
                    warn!(error = %e, "Failed to persist language, continuing in memory");
                }
            }
            Effect::PersistPreferredName(name) => {
                if let Err(e) = self.storage.save_preferred_name(&name) {
                    warn!(error = %e, "Failed to persist preferred name, continuing in memory");
                }
            }
            Effect::PersistJournal => {
                if let Err(e) = self.storage.save_journal(self.machine.journal()) {
                    warn!(error = %e, "Failed to persist journal, continuing in memory");
                }
            }
            Effect::Request(request) => {
                let reply = self.controller.fulfil(request).await;
                self.machine.settle(reply);
            }
            Effect::StartGrounding => {
                self.stop_grounding();
                self.exercise = Some(BreathingExercise::start(self.timing));
            }
            Effect::StopGrounding => self.stop_grounding(),
        }
    }

    fn stop_grounding(&mut self) {
        if let Some((mut exercise, _)) = self.exercise.take() {
            exercise.stop();
        }
    }
}
