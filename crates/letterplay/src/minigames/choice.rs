use crate::api::game::{GameContext, MiniGame, Services};
use crate::api::types::{event_kind, ActivityKind, GameEvent, Letter};
use crate::attempt::record::AttemptKey;
use crate::attempt::scope::UniquenessScope;
use crate::attempt::session::AttemptSession;
use crate::input::queue::{InputEvent, InputQueue};
use crate::widgets::{CheckState, ToggleGroup};
use super::{forward_attempt_events, CUSTOM_CARD_TAP, CUSTOM_RETRY};

/// `ROUND_ERROR` reason code for a rejected answer.
pub const WRONG_ANSWER: f32 = 4.0;

/// How a free-text answer is judged. Both sides are compared after
/// lowercasing, trimming and dropping punctuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    /// The whole answer must equal the target.
    Exact(String),
    /// The target's words must appear, in order and adjacent, somewhere in the answer.
    ContainsWord(String),
}

impl MatchRule {
    pub fn matches(&self, answer: &str) -> bool {
        match self {
            MatchRule::Exact(target) => {
                let target = normalize(target);
                !target.is_empty() && normalize(answer) == target
            }
            MatchRule::ContainsWord(target) => {
                let target = normalize(target);
                let needle: Vec<&str> = target.split_whitespace().collect();
                if needle.is_empty() {
                    return false;
                }
                let answer = normalize(answer);
                let words: Vec<&str> = answer.split_whitespace().collect();
                words.windows(needle.len()).any(|w| w == needle.as_slice())
            }
        }
    }

    pub fn target(&self) -> &str {
        match self {
            MatchRule::Exact(t) | MatchRule::ContainsWord(t) => t,
        }
    }
}

fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Answer-checking mini-games: card picking, camera detection and speech.
pub struct ChoiceGame {
    services: Services,
    session: AttemptSession,
    activity: ActivityKind,
    letter: Letter,
    rule: MatchRule,
    cards: Vec<String>,
    selection: ToggleGroup<CheckState>,
    finished: bool,
}

impl ChoiceGame {
    /// Tap the card showing `letter`.
    pub fn cards(services: Services, letter: Letter, cards: Vec<String>) -> Self {
        let rule = MatchRule::Exact(letter.as_str().to_string());
        let mut game = Self::new(services, ActivityKind::Cards, letter, rule);
        game.selection = ToggleGroup::new(vec![CheckState::default(); cards.len()]);
        game.cards = cards;
        game
    }

    /// Point the camera at an object labelled `label`.
    pub fn detect(services: Services, letter: Letter, label: impl Into<String>) -> Self {
        Self::new(services, ActivityKind::Detect, letter, MatchRule::Exact(label.into()))
    }

    /// Say a sentence containing `word`.
    pub fn speech(services: Services, letter: Letter, word: impl Into<String>) -> Self {
        Self::new(services, ActivityKind::Speech, letter, MatchRule::ContainsWord(word.into()))
    }

    fn new(services: Services, activity: ActivityKind, letter: Letter, rule: MatchRule) -> Self {
        let session = services.attempt_session();
        Self {
            services,
            session,
            activity,
            letter,
            rule,
            cards: Vec::new(),
            selection: ToggleGroup::new(Vec::new()),
            finished: false,
        }
    }

    pub fn activity(&self) -> ActivityKind {
        self.activity
    }

    pub fn rule(&self) -> &MatchRule {
        &self.rule
    }

    pub fn session(&self) -> &AttemptSession {
        &self.session
    }

    pub fn selected_card(&self) -> Option<usize> {
        self.selection.selected()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn begin_round(&mut self) {
        self.finished = false;
        self.selection.clear();
        let key = AttemptKey::new(self.letter.clone(), self.activity);
        let scope = UniquenessScope::for_activity(&self.services.config, self.activity);
        self.session.start(key, scope);
    }

    fn tap_card(&mut self, ctx: &mut GameContext, index: usize) {
        let Some(card) = self.cards.get(index).cloned() else {
            log::warn!("Tap on missing card {} of {}", index, self.cards.len());
            return;
        };
        self.selection.select(index);
        ctx.emit_event(GameEvent::new(event_kind::CARD_SELECTED, index as f32, 1.0, 0.0));
        self.judge(ctx, &card);
    }

    fn judge(&mut self, ctx: &mut GameContext, answer: &str) {
        if self.finished {
            return;
        }
        if self.rule.matches(answer) {
            self.finished = true;
            self.session.record_finished();
            log::info!("{} {}: accepted {:?}", self.activity, self.letter, answer);
            ctx.emit_event(GameEvent::new(event_kind::ROUND_COMPLETE, 0.0, 0.0, 0.0));
        } else {
            self.session.record_error();
            log::debug!("{} {}: rejected {:?}", self.activity, self.letter, answer);
            ctx.emit_event(GameEvent::new(event_kind::ROUND_ERROR, WRONG_ANSWER, 0.0, 0.0));
        }
    }
}

impl MiniGame for ChoiceGame {
    fn init(&mut self, _ctx: &mut GameContext) {
        log::info!("{} round for {} ({:?})", self.activity, self.letter, self.rule);
        self.begin_round();
    }

    fn update(&mut self, ctx: &mut GameContext, input: &InputQueue) {
        for event in input.iter() {
            match *event {
                InputEvent::Custom { kind: CUSTOM_CARD_TAP, a, .. } if a >= 0.0 => {
                    self.tap_card(ctx, a as usize)
                }
                InputEvent::Custom { kind: CUSTOM_RETRY, .. } => self.begin_round(),
                _ => {}
            }
        }
        forward_attempt_events(&self.session, ctx);
    }

    fn answer(&mut self, ctx: &mut GameContext, answer: &str) {
        self.judge(ctx, answer);
    }

    fn teardown(&mut self, _ctx: &mut GameContext) {
        self.session.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::record::AttemptRecord;
    use crate::attempt::store::StorePath;
    use crate::identity::Identity;
    use crate::testing::{services, RecordingStore};
    use futures::executor::{block_on, LocalPool};
    use std::rc::Rc;

    fn stored(store: &RecordingStore, letter: char, activity: ActivityKind) -> Option<AttemptRecord> {
        let node = StorePath::record(&Identity::new("acct", "kid"), &AttemptKey::new(letter, activity));
        block_on(AttemptRecord::load(store, &node)).unwrap()
    }

    fn tap(index: usize) -> InputQueue {
        let mut input = InputQueue::new();
        input.push(InputEvent::Custom {
            kind: CUSTOM_CARD_TAP,
            a: index as f32,
            b: 0.0,
            c: 0.0,
        });
        input
    }

    #[test]
    fn exact_ignores_case_and_punctuation() {
        let rule = MatchRule::Exact("Apple".into());
        assert!(rule.matches("  apple! "));
        assert!(!rule.matches("apples"));
        assert!(!MatchRule::Exact(String::new()).matches(""));
    }

    #[test]
    fn contains_word_needs_whole_words() {
        let rule = MatchRule::ContainsWord("bear".into());
        assert!(rule.matches("I saw a BEAR, really."));
        assert!(!rule.matches("a bearded man"));

        let phrase = MatchRule::ContainsWord("ice cream".into());
        assert!(phrase.matches("I like ice cream"));
        assert!(!phrase.matches("cream and ice"));
    }

    #[test]
    fn wrong_card_then_right_card() {
        let mut pool = LocalPool::new();
        let store = Rc::new(RecordingStore::new());
        let cards = vec!["B".to_string(), "A".to_string(), "C".to_string()];
        let mut game = ChoiceGame::cards(services(&pool, store.clone()), Letter::from('A'), cards);
        let mut ctx = GameContext::default();
        game.init(&mut ctx);

        ctx.begin_frame(0.016);
        game.update(&mut ctx, &tap(0));
        assert_eq!(game.selected_card(), Some(0));
        let error = ctx.events.iter().find(|e| e.kind == event_kind::ROUND_ERROR).unwrap();
        assert_eq!(error.a, WRONG_ANSWER);

        ctx.begin_frame(0.016);
        game.update(&mut ctx, &tap(1));
        assert_eq!(game.selected_card(), Some(1));
        assert!(ctx.events.iter().any(|e| e.kind == event_kind::ROUND_COMPLETE));
        assert!(game.is_finished());

        pool.run_until_stalled();
        assert_eq!(stored(&store, 'A', ActivityKind::Cards), Some(AttemptRecord::new(1, true)));
    }

    #[test]
    fn answers_after_finish_are_ignored() {
        let pool = LocalPool::new();
        let store = Rc::new(RecordingStore::new());
        let mut game = ChoiceGame::speech(services(&pool, store), Letter::from('B'), "bear");
        let mut ctx = GameContext::default();
        game.init(&mut ctx);

        game.answer(&mut ctx, "that is a bear");
        game.answer(&mut ctx, "cat");
        assert_eq!(game.session().record(), Some(AttemptRecord::new(0, true)));
    }

    #[test]
    fn detect_clears_siblings_in_shared_scope() {
        let mut pool = LocalPool::new();
        let store = Rc::new(RecordingStore::new());
        let cards_node = StorePath::record(
            &Identity::new("acct", "kid"),
            &AttemptKey::new('A', ActivityKind::Cards),
        );
        block_on(AttemptRecord::new(2, true).save(&*store, &cards_node)).unwrap();

        let mut game = ChoiceGame::detect(services(&pool, store.clone()), Letter::from('A'), "ant");
        let mut ctx = GameContext::default();
        game.init(&mut ctx);
        game.answer(&mut ctx, "Ant");
        pool.run_until_stalled();

        assert_eq!(stored(&store, 'A', ActivityKind::Cards), None);
        assert_eq!(stored(&store, 'A', ActivityKind::Detect), Some(AttemptRecord::new(0, true)));
    }

    #[test]
    fn tap_outside_the_deck_is_ignored() {
        let pool = LocalPool::new();
        let store = Rc::new(RecordingStore::new());
        let mut game = ChoiceGame::cards(services(&pool, store), Letter::from('A'), vec!["A".into()]);
        let mut ctx = GameContext::default();
        game.init(&mut ctx);

        ctx.begin_frame(0.016);
        game.update(&mut ctx, &tap(5));
        assert!(ctx.events.is_empty());
        assert_eq!(game.selected_card(), None);
    }
}
