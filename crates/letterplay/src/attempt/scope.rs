use crate::api::types::{ActivityKind, Letter};
use crate::config::LetterplayConfig;
use super::record::AttemptKey;

/// The set of attempt keys among which at most one may be active.
///
/// Every (letter, activity) combination of the two lists is a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniquenessScope {
    letters: Vec<Letter>,
    activities: Vec<ActivityKind>,
}

impl UniquenessScope {
    pub fn new(letters: Vec<Letter>, activities: Vec<ActivityKind>) -> Self {
        Self { letters, activities }
    }

    /// The configured scope for one activity kind, spanning the whole alphabet.
    pub fn for_activity(config: &LetterplayConfig, activity: ActivityKind) -> Self {
        Self {
            letters: config.alphabet.clone(),
            activities: config.scopes.group_for(activity).to_vec(),
        }
    }

    /// This scope widened with extra letters, such as ones found in the store
    /// that the configured alphabet does not list.
    pub fn covering(&self, extra: impl IntoIterator<Item = Letter>) -> Self {
        let mut letters = self.letters.clone();
        for letter in extra {
            if !letters.contains(&letter) {
                letters.push(letter);
            }
        }
        Self {
            letters,
            activities: self.activities.clone(),
        }
    }

    pub fn contains(&self, key: &AttemptKey) -> bool {
        self.activities.contains(&key.activity) && self.letters.contains(&key.letter)
    }

    pub fn members(&self) -> impl Iterator<Item = AttemptKey> + '_ {
        self.letters.iter().flat_map(move |letter| {
            self.activities
                .iter()
                .map(move |&activity| AttemptKey::new(letter.clone(), activity))
        })
    }

    /// Every member except `keep`.
    pub fn siblings<'a>(&'a self, keep: &'a AttemptKey) -> impl Iterator<Item = AttemptKey> + 'a {
        self.members().filter(move |k| k != keep)
    }

    pub fn len(&self) -> usize {
        self.letters.len() * self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
