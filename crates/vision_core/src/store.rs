//! Conversation store
//!
//! Holds every conversation of the session, the active selection and the active
//! dialogue context. The context is always the replay of the active conversation's
//! turns: it is rebuilt on select, extended on append and cleared when the active
//! conversation goes away.

use chrono::{DateTime, Utc};

use crate::conversation::{Conversation, ConversationId, ConversationSummary, Speaker, Turn};
use crate::error::{Result, StoreError};
use crate::image::ImageAttachment;
use crate::message::DialogueMessage;

/// What `append_turn` does when no conversation is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppendPolicy {
    /// Drop the turn and report [`AppendOutcome::Ignored`].
    #[default]
    Ignore,
    /// Fail with [`StoreError::NoActiveConversation`].
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    Ignored,
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    /// Insertion order; listing sorts a copy.
    conversations: Vec<Conversation>,
    active: Option<ConversationId>,
    context: Vec<DialogueMessage>,
    next_id: u64,
    append_policy: AppendPolicy,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_append_policy(policy: AppendPolicy) -> Self {
        Self {
            append_policy: policy,
            ..Self::default()
        }
    }

    pub fn append_policy(&self) -> AppendPolicy {
        self.append_policy
    }

    pub fn create_conversation(&mut self, image: ImageAttachment) -> ConversationId {
        self.create_conversation_at(image, Utc::now())
    }

    /// Create with an explicit creation time. Ids are never reused.
    pub fn create_conversation_at(
        &mut self,
        image: ImageAttachment,
        created_at: DateTime<Utc>,
    ) -> ConversationId {
        self.next_id += 1;
        let id = ConversationId::new(self.next_id);
        log::info!("Created conversation {} for {}", id, image.name());
        self.conversations.push(Conversation::new(id, image, created_at));
        id
    }

    /// Make `id` active and rebuild the dialogue context from its turns.
    pub fn select_conversation(&mut self, id: ConversationId) -> Result<()> {
        let conversation = self.get(id).ok_or(StoreError::NotFound(id))?;
        let context = replay(conversation.turns());
        self.active = Some(id);
        self.context = context;
        log::debug!(
            "Selected conversation {} ({} messages replayed)",
            id,
            self.context.len()
        );
        Ok(())
    }

    /// Append a turn to the active conversation and to the dialogue context.
    pub fn append_turn(
        &mut self,
        speaker: Speaker,
        text: impl Into<String>,
    ) -> Result<AppendOutcome> {
        let Some(id) = self.active else {
            return match self.append_policy {
                AppendPolicy::Ignore => {
                    log::debug!("Ignoring {:?} turn: no active conversation", speaker);
                    Ok(AppendOutcome::Ignored)
                }
                AppendPolicy::Reject => Err(StoreError::NoActiveConversation),
            };
        };

        let turn = match speaker {
            Speaker::User => Turn::user(text),
            Speaker::Assistant => Turn::assistant(text),
        };
        let message = DialogueMessage::from(&turn);
        let conversation = self.get_mut(id).ok_or(StoreError::NotFound(id))?;
        conversation.push_turn(turn);
        self.context.push(message);
        Ok(AppendOutcome::Appended)
    }

    /// Remove a conversation. Deleting the active one clears the selection and context.
    pub fn delete_conversation(&mut self, id: ConversationId) -> Result<()> {
        let index = self
            .conversations
            .iter()
            .position(|c| c.id() == id)
            .ok_or(StoreError::NotFound(id))?;
        self.conversations.remove(index);
        if self.active == Some(id) {
            self.active = None;
            self.context.clear();
        }
        log::info!("Deleted conversation {}", id);
        Ok(())
    }

    /// Summaries, newest first. Equal timestamps keep creation order.
    pub fn list_conversations(&self) -> Vec<ConversationSummary> {
        let mut ordered: Vec<&Conversation> = self.conversations.iter().collect();
        ordered.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        ordered
            .into_iter()
            .map(|c| c.summary(self.active == Some(c.id())))
            .collect()
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == id)
    }

    fn get_mut(&mut self, id: ConversationId) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id() == id)
    }

    pub fn active_id(&self) -> Option<ConversationId> {
        self.active
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active.and_then(|id| self.get(id))
    }

    /// The active dialogue context, empty when nothing is selected.
    pub fn active_context(&self) -> &[DialogueMessage] {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

/// Project stored turns into dialogue messages, one per turn, order preserved.
pub fn replay(turns: &[Turn]) -> Vec<DialogueMessage> {
    turns.iter().map(DialogueMessage::from).collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::conversation::Role;
    use crate::image::test_support::png_bytes;

    fn image(name: &str) -> ImageAttachment {
        ImageAttachment::from_upload(&png_bytes([1, 2, 3]), name).unwrap()
    }

    fn store_with_dialogue() -> (ConversationStore, ConversationId) {
        let mut store = ConversationStore::new();
        let id = store.create_conversation(image("cat.png"));
        store.select_conversation(id).unwrap();
        store.append_turn(Speaker::User, "what is this").unwrap();
        store.append_turn(Speaker::Assistant, "A cat.").unwrap();
        store.append_turn(Speaker::User, "what color?").unwrap();
        (store, id)
    }

    #[test]
    fn create_uses_image_name_as_title_and_never_reuses_ids() {
        let mut store = ConversationStore::new();
        let first = store.create_conversation(image("cat.png"));
        store.delete_conversation(first).unwrap();
        let second = store.create_conversation(image("dog.png"));

        assert_ne!(first, second);
        let conversation = store.get(second).unwrap();
        assert_eq!(conversation.title(), "dog.png");
        assert!(conversation.turns().is_empty());
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn select_unknown_conversation_is_not_found() {
        let mut store = ConversationStore::new();
        let missing = ConversationId::new(42);
        assert_eq!(
            store.select_conversation(missing),
            Err(StoreError::NotFound(missing))
        );
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn replay_matches_turns_pairwise() {
        let (store, id) = store_with_dialogue();
        let turns = store.get(id).unwrap().turns();
        let context = replay(turns);

        assert_eq!(context.len(), turns.len());
        for (message, turn) in context.iter().zip(turns) {
            assert_eq!(message.role, Role::from(turn.speaker));
            assert_eq!(message.content, turn.content);
        }
        assert_eq!(store.active_context(), context.as_slice());
    }

    #[test]
    fn switching_away_and_back_rebuilds_identical_context() {
        let (mut store, a) = store_with_dialogue();
        let before = store.active_context().to_vec();

        let b = store.create_conversation(image("dog.png"));
        store.select_conversation(b).unwrap();
        assert!(store.active_context().is_empty());
        store.append_turn(Speaker::User, "is this a dog?").unwrap();

        store.select_conversation(a).unwrap();
        assert_eq!(store.active_context(), before.as_slice());
        assert_eq!(store.get(a).unwrap().turns().len(), 3);
        assert_eq!(store.get(b).unwrap().turns().len(), 1);
    }

    #[test]
    fn select_does_not_modify_stored_turns() {
        let (mut store, id) = store_with_dialogue();
        let before = store.get(id).unwrap().turns().to_vec();
        store.select_conversation(id).unwrap();
        store.select_conversation(id).unwrap();
        assert_eq!(store.get(id).unwrap().turns(), before.as_slice());
    }

    #[test]
    fn append_without_active_conversation_is_ignored_by_default() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation(image("cat.png"));

        let outcome = store.append_turn(Speaker::User, "orphan").unwrap();
        assert_eq!(outcome, AppendOutcome::Ignored);
        assert!(store.get(id).unwrap().turns().is_empty());
        assert!(store.active_context().is_empty());
    }

    #[test]
    fn append_without_active_conversation_can_be_rejected() {
        let mut store = ConversationStore::with_append_policy(AppendPolicy::Reject);
        store.create_conversation(image("cat.png"));
        assert_eq!(
            store.append_turn(Speaker::Assistant, "orphan"),
            Err(StoreError::NoActiveConversation)
        );
    }

    #[test]
    fn first_user_turn_sets_title() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation(image("car.png"));
        store.select_conversation(id).unwrap();

        store
            .append_turn(Speaker::User, "What color is the car in this photograph?")
            .unwrap();
        assert_eq!(store.get(id).unwrap().title(), "What color is the car in th...");

        store.append_turn(Speaker::Assistant, "Red.").unwrap();
        store.append_turn(Speaker::User, "and the wheels?").unwrap();
        assert_eq!(store.get(id).unwrap().title(), "What color is the car in th...");
    }

    #[test]
    fn short_first_user_turn_is_title_unchanged() {
        let (store, id) = store_with_dialogue();
        assert_eq!(store.get(id).unwrap().title(), "what is this");
    }

    #[test]
    fn deleting_active_conversation_clears_selection_and_context() {
        let (mut store, id) = store_with_dialogue();
        store.delete_conversation(id).unwrap();

        assert_eq!(store.active_id(), None);
        assert!(store.active_context().is_empty());
        assert!(store.get(id).is_none());
        assert_eq!(
            store.append_turn(Speaker::User, "late").unwrap(),
            AppendOutcome::Ignored
        );
    }

    #[test]
    fn deleting_other_conversation_keeps_active_context() {
        let (mut store, active) = store_with_dialogue();
        let other = store.create_conversation(image("dog.png"));
        let before = store.active_context().to_vec();

        store.delete_conversation(other).unwrap();

        assert_eq!(store.active_id(), Some(active));
        assert_eq!(store.active_context(), before.as_slice());
    }

    #[test]
    fn deleting_unknown_conversation_is_not_found() {
        let (mut store, active) = store_with_dialogue();
        let missing = ConversationId::new(99);
        assert_eq!(
            store.delete_conversation(missing),
            Err(StoreError::NotFound(missing))
        );
        assert_eq!(store.active_id(), Some(active));
    }

    #[test]
    fn listing_is_newest_first_with_stable_ties() {
        let mut store = ConversationStore::new();
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 5).unwrap();

        let older = store.create_conversation_at(image("a.png"), t1);
        let newer = store.create_conversation_at(image("b.png"), t2);
        let same_second_1 = store.create_conversation_at(image("c.png"), t1);
        store.select_conversation(newer).unwrap();

        let listing = store.list_conversations();
        let ids: Vec<_> = listing.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newer, older, same_second_1]);
        assert!(listing[0].is_active);
        assert!(!listing[1].is_active);
        assert_eq!(listing[2].image_name, "c.png");
    }
}
