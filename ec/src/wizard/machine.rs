//! Session state machine
//!
//! Pure and synchronous: [`SessionMachine::transition`] applies one event,
//! mutates the in-progress session and queues [`Effect`]s for the driver to
//! carry out. Reasoning results come back through [`SessionMachine::settle`].
//! Events that do not apply to the current phase leave the machine untouched.

use tracing::{debug, info};

use super::controller::{ServiceReply, ServiceRequest, is_complete};
use super::phase::{Event, Phase};
use crate::domain::{Conversation, Descriptor, JournalEntry, MAX_INTENSITY, MIN_INTENSITY, Session};
use crate::i18n::{Language, Phrase, translate};
use crate::reasoning::MentorshipContext;
use crate::store::StoredState;

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PersistLanguage(Language),
    PersistPreferredName(String),
    /// The cached journal changed and should be written whole
    PersistJournal,
    Request(ServiceRequest),
    StartGrounding,
    StopGrounding,
}

/// Which kind of reply the outstanding request will produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Question,
    Mentorship,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMachine {
    phase: Phase,
    session: Session,
    language: Language,
    preferred_name: Option<String>,
    name_draft: String,
    /// Newest first
    journal: Vec<JournalEntry>,
    pending: Option<Pending>,
    effects: Vec<Effect>,
}

impl SessionMachine {
    /// Build the machine from the slots read at startup
    pub fn new(stored: StoredState) -> Self {
        let phase = Phase::initial(&stored);
        info!(%phase, "Starting wizard");
        Self {
            phase,
            session: Session::default(),
            language: stored.language.unwrap_or_default(),
            name_draft: stored.preferred_name.clone().unwrap_or_default(),
            preferred_name: stored.preferred_name,
            journal: stored.journal,
            pending: None,
            effects: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn preferred_name(&self) -> Option<&str> {
        self.preferred_name.as_deref()
    }

    pub fn name_draft(&self) -> &str {
        &self.name_draft
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    pub fn is_awaiting(&self) -> bool {
        self.session.awaiting_service
    }

    /// Drain the effects queued since the last call
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Apply one event and return the resulting phase
    pub fn transition(&mut self, event: Event) -> Phase {
        debug!(phase = %self.phase, ?event, "transition: called");
        if self.session.awaiting_service && !matches!(event, Event::Back | Event::Home) {
            debug!("transition: awaiting service, event dropped");
            return self.phase;
        }

        match (self.phase, event) {
            (_, Event::Back) => self.back(),
            (_, Event::Home) => self.home(),

            (Phase::ChoosingLanguage, Event::PickLanguage(language)) => {
                self.language = language;
                self.effects.push(Effect::PersistLanguage(language));
                self.enter(Phase::ChoosingName);
            }

            (Phase::ChoosingName, Event::EditName(name)) => self.name_draft = name,
            (Phase::ChoosingName, Event::Continue) => {
                let name = self.name_draft.trim().to_string();
                self.name_draft = name.clone();
                self.preferred_name = Some(name.clone());
                self.effects.push(Effect::PersistPreferredName(name));
                self.session = Session::default();
                self.enter(Phase::SelectingEmotion);
            }

            (Phase::SelectingEmotion, Event::PickEmotion(emotion)) => {
                self.session.descriptor = Some(Descriptor::Named { emotion });
                self.enter(Phase::AdjustingIntensity);
            }
            (Phase::SelectingEmotion, Event::ChooseUnsure) => {
                if !matches!(self.session.descriptor, Some(Descriptor::Unsure { .. })) {
                    self.session.descriptor = Some(Descriptor::unsure());
                }
                self.enter(Phase::SelectingUnsureSignals);
            }

            (Phase::AdjustingIntensity, Event::SetIntensity(level))
                if (MIN_INTENSITY..=MAX_INTENSITY).contains(&level) =>
            {
                self.session.intensity = level;
            }
            (Phase::AdjustingIntensity, Event::Continue) if self.session.selected_emotion().is_some() => {
                let opening = translate(Phrase::InitialQuestion, self.language);
                self.session.conversation = Conversation::opened_with(opening);
                self.session.final_response = None;
                self.enter(Phase::Reflecting);
            }

            (Phase::SelectingUnsureSignals, Event::ToggleSignal(signal)) => {
                self.session.toggle_signal(signal);
            }
            (Phase::SelectingUnsureSignals, Event::EditFreeText(text)) => {
                self.session.set_free_text(&text);
            }
            (Phase::SelectingUnsureSignals, Event::Continue) if self.session.unsure_ready() => {
                self.session.conversation = Conversation::new();
                self.session.final_response = None;
                self.request(
                    Pending::Question,
                    ServiceRequest::OpeningQuestion {
                        signals: self.session.unsure_signals().to_vec(),
                        free_text: self.session.free_text().to_string(),
                    },
                );
                self.enter(Phase::Reflecting);
            }

            (Phase::Reflecting, Event::SubmitAnswer(answer)) => self.submit_answer(&answer),

            (Phase::Reframing, Event::BeginGrounding) => {
                self.effects.push(Effect::StartGrounding);
                self.enter(Phase::Grounding);
            }

            (Phase::Grounding, Event::GroundingElapsed | Event::SkipGrounding) => {
                self.effects.push(Effect::StopGrounding);
                self.enter(Phase::Journaling);
            }

            (Phase::Journaling, Event::StartNew) => {
                self.session = Session::default();
                self.enter(Phase::SelectingEmotion);
            }

            (phase, event) => {
                debug!(%phase, ?event, "transition: out-of-contract event ignored");
            }
        }
        self.phase
    }

    /// Resolve the outstanding reasoning request
    ///
    /// A reply with no matching request is ignored. A mentorship reply always
    /// commits a journal entry, even if the user has navigated away.
    pub fn settle(&mut self, reply: ServiceReply) -> Phase {
        debug!(phase = %self.phase, pending = ?self.pending, "settle: called");
        match (self.pending, reply) {
            (Some(Pending::Question), ServiceReply::Question(question)) => {
                let text = question.get(self.language).to_string();
                if !self.session.conversation.ask(text) {
                    debug!("settle: conversation already has an open question");
                }
            }
            (Some(Pending::Mentorship), ServiceReply::Mentorship(result)) => {
                let entry = JournalEntry::assemble(&self.session, result.clone(), self.language);
                info!(id = %entry.id, label = %entry.emotion_label, "Journal entry committed");
                self.session.final_response = Some(result);
                self.journal.insert(0, entry);
                self.effects.push(Effect::PersistJournal);
                if matches!(self.phase, Phase::Analyzing | Phase::Reflecting) {
                    self.enter(Phase::Reframing);
                }
            }
            (pending, reply) => {
                debug!(?pending, ?reply, "settle: unexpected reply ignored");
                return self.phase;
            }
        }
        self.pending = None;
        self.session.awaiting_service = false;
        self.phase
    }

    fn submit_answer(&mut self, answer: &str) {
        if !self.session.conversation.answer_open(answer) {
            debug!("submit_answer: rejected");
            return;
        }

        if is_complete(&self.session.conversation) {
            let context = MentorshipContext {
                emotion_label: self
                    .session
                    .selected_emotion()
                    .map(|emotion| emotion.label(self.language).to_string()),
                intensity: self.session.intensity,
                unsure_signals: self.session.unsure_signals().to_vec(),
                conversation: self.session.conversation.turns().to_vec(),
            };
            self.request(
                Pending::Mentorship,
                ServiceRequest::Mentorship {
                    context,
                    preferred_name: self.preferred_name.clone().filter(|n| !n.trim().is_empty()),
                },
            );
            self.enter(Phase::Analyzing);
        } else {
            self.request(
                Pending::Question,
                ServiceRequest::FollowUpQuestion {
                    turns: self.session.conversation.turns().to_vec(),
                    language: self.language,
                },
            );
        }
    }

    fn back(&mut self) {
        let named = self.session.selected_emotion().is_some();
        let Some(target) = self.phase.back_target(named) else {
            debug!(phase = %self.phase, "back: no back target");
            return;
        };
        if self.phase == Phase::Grounding {
            self.effects.push(Effect::StopGrounding);
        }
        if self.phase == Phase::ChoosingName {
            self.name_draft = self.preferred_name.clone().unwrap_or_default();
        }
        self.enter(target);
    }

    fn home(&mut self) {
        if !self.phase.has_home() {
            debug!(phase = %self.phase, "home: not available");
            return;
        }
        if self.phase == Phase::Grounding {
            self.effects.push(Effect::StopGrounding);
        }
        self.enter(Phase::Journaling);
    }

    fn request(&mut self, pending: Pending, request: ServiceRequest) {
        debug!(kind = request.kind(), "request: called");
        self.pending = Some(pending);
        self.session.awaiting_service = true;
        self.effects.push(Effect::Request(request));
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "enter: called");
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bilingual, Emotion, MentorshipResult, Signal, follow_up_fallback, opening_fallback};
    use proptest::prelude::*;

    fn onboarded(language: Language) -> SessionMachine {
        SessionMachine::new(StoredState {
            language: Some(language),
            preferred_name: Some("Yui".to_string()),
            journal: vec![],
        })
    }

    fn question(text: &str) -> ServiceReply {
        ServiceReply::Question(Bilingual::new(text, format!("{text} (ja)")))
    }

    /// Settle the pending request with a canned reply, as the driver would
    fn settle_pending(machine: &mut SessionMachine) {
        for effect in machine.take_effects() {
            if let Effect::Request(request) = effect {
                let reply = match request {
                    ServiceRequest::Mentorship { .. } => ServiceReply::Mentorship(MentorshipResult::fallback()),
                    _ => question("Next?"),
                };
                machine.settle(reply);
            }
        }
    }

    fn at_reflecting_named(intensity: u8) -> SessionMachine {
        let mut m = onboarded(Language::En);
        m.transition(Event::PickEmotion(Emotion::Anxiety));
        m.transition(Event::SetIntensity(intensity));
        m.transition(Event::Continue);
        m
    }

    #[test]
    fn test_onboarding_flow() {
        let mut m = SessionMachine::new(StoredState::default());
        assert_eq!(m.phase(), Phase::ChoosingLanguage);

        assert_eq!(m.transition(Event::PickLanguage(Language::Ja)), Phase::ChoosingName);
        m.transition(Event::EditName("  Yui ".to_string()));
        assert_eq!(m.transition(Event::Continue), Phase::SelectingEmotion);

        assert_eq!(m.language(), Language::Ja);
        assert_eq!(m.preferred_name(), Some("Yui"));
        assert_eq!(
            m.take_effects(),
            vec![
                Effect::PersistLanguage(Language::Ja),
                Effect::PersistPreferredName("Yui".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_name_is_persisted() {
        let mut m = SessionMachine::new(StoredState {
            language: Some(Language::En),
            ..Default::default()
        });
        assert_eq!(m.phase(), Phase::ChoosingName);
        m.transition(Event::Continue);
        assert_eq!(m.preferred_name(), Some(""));
        assert_eq!(m.take_effects(), vec![Effect::PersistPreferredName(String::new())]);
    }

    #[test]
    fn test_named_path_seeds_opening_question() {
        let m = at_reflecting_named(7);
        assert_eq!(m.phase(), Phase::Reflecting);
        assert_eq!(m.session().intensity, 7);
        assert_eq!(
            m.session().conversation.open_question(),
            Some(translate(Phrase::InitialQuestion, Language::En))
        );
        assert!(!m.is_awaiting());
    }

    #[test]
    fn test_out_of_range_intensity_is_ignored() {
        let mut m = onboarded(Language::En);
        m.transition(Event::PickEmotion(Emotion::Joy));
        let before = m.clone();
        m.transition(Event::SetIntensity(0));
        m.transition(Event::SetIntensity(11));
        assert_eq!(m, before);
    }

    #[test]
    fn test_unsure_continue_requires_input() {
        let mut m = onboarded(Language::En);
        m.transition(Event::ChooseUnsure);
        let before = m.clone();
        m.transition(Event::Continue);
        assert_eq!(m, before);

        m.transition(Event::EditFreeText("tight chest at work".to_string()));
        assert_eq!(m.transition(Event::Continue), Phase::Reflecting);
        assert!(m.is_awaiting());
        assert!(m.session().conversation.is_empty());
    }

    #[test]
    fn test_unsure_opening_request_and_fallback() {
        let mut m = onboarded(Language::Ja);
        m.transition(Event::ChooseUnsure);
        m.transition(Event::ToggleSignal(Signal::Restless));
        m.transition(Event::ToggleSignal(Signal::Exhausted));
        m.transition(Event::Continue);

        let effects = m.take_effects();
        assert_eq!(
            effects,
            vec![Effect::Request(ServiceRequest::OpeningQuestion {
                signals: vec![Signal::Restless, Signal::Exhausted],
                free_text: String::new(),
            })]
        );

        m.settle(ServiceReply::Question(opening_fallback()));
        assert_eq!(m.session().conversation.open_question(), Some(opening_fallback().ja.as_str()));
        assert!(!m.is_awaiting());
    }

    #[test]
    fn test_blank_answer_rejected() {
        let mut m = at_reflecting_named(5);
        let before = m.clone();
        m.transition(Event::SubmitAnswer("   \n\t".to_string()));
        assert_eq!(m, before);
    }

    #[test]
    fn test_submissions_dropped_while_awaiting() {
        let mut m = at_reflecting_named(5);
        m.transition(Event::SubmitAnswer("first".to_string()));
        assert!(m.is_awaiting());

        let before = m.clone();
        m.transition(Event::SubmitAnswer("second".to_string()));
        m.transition(Event::Continue);
        assert_eq!(m, before);
    }

    #[test]
    fn test_three_answers_reach_analyzing_then_reframing() {
        let mut m = at_reflecting_named(7);
        for answer in ["one", "two"] {
            m.transition(Event::SubmitAnswer(answer.to_string()));
            assert_eq!(m.phase(), Phase::Reflecting);
            settle_pending(&mut m);
        }
        assert_eq!(m.transition(Event::SubmitAnswer("three".to_string())), Phase::Analyzing);
        assert!(m.is_awaiting());

        settle_pending(&mut m);
        assert_eq!(m.phase(), Phase::Reframing);
        assert_eq!(m.journal().len(), 1);
        assert_eq!(m.journal()[0].conversation.len(), 3);
        assert_eq!(m.journal()[0].intensity, 7);
        assert_eq!(m.session().final_response, Some(MentorshipResult::fallback()));
    }

    #[test]
    fn test_follow_up_request_carries_history_and_language() {
        let mut m = at_reflecting_named(5);
        m.take_effects();
        m.transition(Event::SubmitAnswer(" got yelled at ".to_string()));
        match m.take_effects().as_slice() {
            [Effect::Request(ServiceRequest::FollowUpQuestion { turns, language })] => {
                assert_eq!(turns.len(), 1);
                assert_eq!(turns[0].answer.as_deref(), Some("got yelled at"));
                assert_eq!(*language, Language::En);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
        m.settle(ServiceReply::Question(follow_up_fallback()));
        assert_eq!(m.session().conversation.open_question(), Some(follow_up_fallback().en.as_str()));
    }

    #[test]
    fn test_mentorship_request_omits_blank_name() {
        let mut m = SessionMachine::new(StoredState {
            language: Some(Language::En),
            preferred_name: Some(String::new()),
            journal: vec![],
        });
        m.transition(Event::PickEmotion(Emotion::Sadness));
        m.transition(Event::Continue);
        for answer in ["a", "b"] {
            m.transition(Event::SubmitAnswer(answer.to_string()));
            settle_pending(&mut m);
        }
        m.transition(Event::SubmitAnswer("c".to_string()));
        match m.take_effects().as_slice() {
            [Effect::Request(ServiceRequest::Mentorship { context, preferred_name })] => {
                assert_eq!(context.emotion_label.as_deref(), Some("Sadness"));
                assert_eq!(context.conversation.len(), 3);
                assert!(preferred_name.is_none());
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_mentorship_after_home_commits_but_keeps_phase() {
        let mut m = at_reflecting_named(5);
        for answer in ["a", "b"] {
            m.transition(Event::SubmitAnswer(answer.to_string()));
            settle_pending(&mut m);
        }
        m.transition(Event::SubmitAnswer("c".to_string()));
        let effects = m.take_effects();

        assert_eq!(m.transition(Event::Home), Phase::Journaling);
        for effect in effects {
            if let Effect::Request(_) = effect {
                m.settle(ServiceReply::Mentorship(MentorshipResult::fallback()));
            }
        }
        assert_eq!(m.phase(), Phase::Journaling);
        assert_eq!(m.journal().len(), 1);
        assert!(!m.is_awaiting());
    }

    #[test]
    fn test_back_from_reflecting_depends_on_path() {
        let mut m = at_reflecting_named(5);
        assert_eq!(m.transition(Event::Back), Phase::AdjustingIntensity);

        let mut m = onboarded(Language::En);
        m.transition(Event::ChooseUnsure);
        m.transition(Event::ToggleSignal(Signal::WantToCry));
        m.transition(Event::Continue);
        settle_pending(&mut m);
        assert_eq!(m.transition(Event::Back), Phase::SelectingUnsureSignals);
        // Unsure data survives the round trip
        m.transition(Event::Back);
        assert_eq!(m.transition(Event::ChooseUnsure), Phase::SelectingUnsureSignals);
        assert_eq!(m.session().unsure_signals(), &[Signal::WantToCry]);
    }

    #[test]
    fn test_grounding_stops_timers_on_every_exit() {
        for exit in [Event::GroundingElapsed, Event::SkipGrounding, Event::Back, Event::Home] {
            let mut m = at_reflecting_named(5);
            for answer in ["a", "b", "c"] {
                m.transition(Event::SubmitAnswer(answer.to_string()));
                settle_pending(&mut m);
            }
            m.take_effects();
            assert_eq!(m.transition(Event::BeginGrounding), Phase::Grounding);
            assert_eq!(m.take_effects(), vec![Effect::StartGrounding]);

            m.transition(exit.clone());
            assert_eq!(m.take_effects(), vec![Effect::StopGrounding], "exit via {exit:?}");
        }
    }

    #[test]
    fn test_start_new_resets_session() {
        let mut m = at_reflecting_named(8);
        m.transition(Event::Home);
        assert_eq!(m.transition(Event::StartNew), Phase::SelectingEmotion);
        assert_eq!(m.session(), &Session::default());
    }

    #[test]
    fn test_no_back_or_home_where_unavailable() {
        let mut m = SessionMachine::new(StoredState::default());
        let before = m.clone();
        m.transition(Event::Back);
        m.transition(Event::Home);
        assert_eq!(m, before);

        let mut m = onboarded(Language::En);
        m.transition(Event::PickEmotion(Emotion::Anger));
        m.transition(Event::Home);
        let before = m.clone();
        m.transition(Event::Back);
        m.transition(Event::Home);
        assert_eq!(m, before);
    }

    #[test]
    fn test_settle_without_request_is_ignored() {
        let mut m = at_reflecting_named(5);
        let before = m.clone();
        m.settle(question("stray"));
        m.settle(ServiceReply::Mentorship(MentorshipResult::fallback()));
        assert_eq!(m, before);
    }

    fn any_event() -> impl Strategy<Value = Event> {
        let input = prop_oneof![
            prop_oneof![Just(Language::En), Just(Language::Ja)].prop_map(Event::PickLanguage),
            "[a-zA-Z ]{0,8}".prop_map(Event::EditName),
            (0..Emotion::ALL.len()).prop_map(|i| Event::PickEmotion(Emotion::ALL[i])),
            (0u8..=12).prop_map(Event::SetIntensity),
            (0..Signal::ALL.len()).prop_map(|i| Event::ToggleSignal(Signal::ALL[i])),
            "[a-z ]{0,8}".prop_map(Event::EditFreeText),
            "[a-z ]{0,6}".prop_map(Event::SubmitAnswer),
        ];
        let control = prop_oneof![
            Just(Event::Continue),
            Just(Event::ChooseUnsure),
            Just(Event::BeginGrounding),
            Just(Event::GroundingElapsed),
            Just(Event::SkipGrounding),
            Just(Event::StartNew),
            Just(Event::Back),
            Just(Event::Home),
        ];
        prop_oneof![input, control]
    }

    /// Whether `event` is defined for `phase` at all, ignoring guards
    fn in_contract(phase: Phase, event: &Event) -> bool {
        match event {
            Event::Back => phase.back_target(true).is_some(),
            Event::Home => phase.has_home(),
            Event::PickLanguage(_) => phase == Phase::ChoosingLanguage,
            Event::EditName(_) => phase == Phase::ChoosingName,
            Event::Continue => matches!(
                phase,
                Phase::ChoosingName | Phase::AdjustingIntensity | Phase::SelectingUnsureSignals
            ),
            Event::PickEmotion(_) | Event::ChooseUnsure => phase == Phase::SelectingEmotion,
            Event::SetIntensity(_) => phase == Phase::AdjustingIntensity,
            Event::ToggleSignal(_) | Event::EditFreeText(_) => phase == Phase::SelectingUnsureSignals,
            Event::SubmitAnswer(_) => phase == Phase::Reflecting,
            Event::BeginGrounding => phase == Phase::Reframing,
            Event::GroundingElapsed | Event::SkipGrounding => phase == Phase::Grounding,
            Event::StartNew => phase == Phase::Journaling,
        }
    }

    proptest! {
        #[test]
        fn prop_out_of_contract_events_are_noops(
            events in proptest::collection::vec(any_event(), 0..40),
            probe in any_event(),
            settle_each in any::<bool>(),
        ) {
            let mut m = SessionMachine::new(StoredState::default());
            for event in events {
                m.transition(event);
                if settle_each {
                    settle_pending(&mut m);
                }
            }
            m.take_effects();

            if !in_contract(m.phase(), &probe) {
                let before = m.clone();
                m.transition(probe);
                prop_assert_eq!(m, before);
            }
        }

        #[test]
        fn prop_session_invariants_hold(
            events in proptest::collection::vec(any_event(), 0..60),
        ) {
            let mut m = SessionMachine::new(StoredState::default());
            for event in events {
                m.transition(event);
                settle_pending(&mut m);

                let session = m.session();
                prop_assert!(session.conversation.is_well_formed());
                prop_assert!((MIN_INTENSITY..=MAX_INTENSITY).contains(&session.intensity));
                prop_assert!(!m.is_awaiting());
                let signals = session.unsure_signals();
                for (i, s) in signals.iter().enumerate() {
                    prop_assert!(!signals[i + 1..].contains(s));
                }
            }
        }

        #[test]
        fn prop_back_follows_table(events in proptest::collection::vec(any_event(), 0..40)) {
            let mut m = SessionMachine::new(StoredState::default());
            for event in events {
                m.transition(event);
                settle_pending(&mut m);
            }
            let named = m.session().selected_emotion().is_some();
            let expected = m.phase().back_target(named).unwrap_or(m.phase());
            prop_assert_eq!(m.transition(Event::Back), expected);
        }
    }
}
