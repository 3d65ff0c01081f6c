//! The session controller: one stateful object for the whole reader.
//!
//! A session composes the repository, the playback engine, the
//! relationship ledger, and the state store. There is no ambient
//! reactivity: every mutating operation ends with an explicit call to the
//! persist hook, and persist failures never abort the transition that
//! triggered them (both records are best-effort and re-derivable).

use std::collections::HashMap;

use vn_core::{Character, Story, StorySummary};

use crate::config::SessionConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::notify::{Notification, NotificationQueue};
use crate::persistence::{ReadingProgress, SavedState, StateStore};
use crate::playback::{Phase, Playback, PlaybackEvent};
use crate::relationship::{IntimacyState, RelationshipLedger, RelationshipView};
use crate::repository::StoryRepository;
use crate::transcript::Transcript;

/// Which screen the frontend should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// The story shelf.
    #[default]
    Library,
    /// The reading view for the open story.
    Reader,
}

/// A reading session: the single stateful object a frontend drives.
pub struct Session {
    repository: Box<dyn StoryRepository>,
    store: Box<dyn StateStore>,
    config: SessionConfig,
    view: View,
    library: Vec<StorySummary>,
    story: Option<Story>,
    playback: Playback,
    ledger: RelationshipLedger,
    progress: HashMap<String, ReadingProgress>,
    notifications: NotificationQueue,
    selected_character: Option<String>,
    profile_open: bool,
}

impl Session {
    /// Create a session, loading whatever state the store has persisted.
    pub fn new(
        repository: Box<dyn StoryRepository>,
        store: Box<dyn StateStore>,
        config: SessionConfig,
    ) -> Self {
        let saved = store.load();
        let mut ledger = RelationshipLedger::new();
        ledger.restore(saved.relationships);

        Self {
            repository,
            store,
            playback: Playback::new(config.pacing.clone()),
            config,
            view: View::default(),
            library: Vec::new(),
            story: None,
            ledger,
            progress: saved.progress,
            notifications: NotificationQueue::new(),
            selected_character: None,
            profile_open: false,
        }
    }

    // -----------------------------------------------------------------------
    // Library and story loading
    // -----------------------------------------------------------------------

    /// Fetch the library index. On failure the previous index is kept.
    pub fn load_library(&mut self) -> RuntimeResult<()> {
        let summaries = self.repository.load_library()?;
        self.library = summaries;
        Ok(())
    }

    /// Open a story: load it, seed relationship state, resume saved
    /// progress (exact paragraph) or start at chapter zero, and switch to
    /// the reader view. On any load failure the prior session state is
    /// untouched.
    pub fn open_story(&mut self, id: &str) -> RuntimeResult<()> {
        let story = self.repository.load_story(id)?;
        self.ledger.seed_story(&story);

        let events = match self.progress.get(id) {
            Some(saved) => {
                let chapter_index = story.chapter_index(&saved.chapter_id).unwrap_or(0);
                self.playback
                    .resume(&story, chapter_index, &saved.paragraph_id)
            }
            None => self.playback.start_chapter(&story, 0),
        };

        self.story = Some(story);
        self.view = View::Reader;
        self.apply_events(events);
        self.persist();
        Ok(())
    }

    /// Restart playback at a chapter of the open story. An out-of-range
    /// index is a silent no-op, matching the playback engine.
    pub fn start_chapter(&mut self, index: usize) -> RuntimeResult<()> {
        let story = self.story.as_ref().ok_or(RuntimeError::NoStoryLoaded)?;
        let events = self.playback.start_chapter(story, index);
        self.apply_events(events);
        self.persist();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    /// Resolve a surfaced choice by id: echo it, run the relationship
    /// engine, and schedule the successor paragraph.
    pub fn choose(&mut self, choice_id: &str) -> RuntimeResult<()> {
        if self.story.is_none() {
            return Err(RuntimeError::NoStoryLoaded);
        }
        let events = self.playback.choose(choice_id, &self.config.protagonist)?;
        self.apply_events(events);

        if let Some(story) = &self.story {
            for update in self.ledger.apply_choice(story, choice_id) {
                self.notifications.push(Notification::Toast(update.toast));
            }
        }
        self.persist();
        Ok(())
    }

    /// Report elapsed time to the playback engine.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let events = self.playback.tick(elapsed_ms);
        if self.apply_events(events) {
            self.persist();
        }
    }

    /// Run playback forward until it blocks on input or a dead end.
    pub fn run_until_blocked(&mut self) {
        while let Some(due) = self.playback.next_due_in() {
            self.advance(due);
        }
    }

    /// Milliseconds until the next scheduled playback step.
    pub fn next_due_in(&self) -> Option<u64> {
        self.playback.next_due_in()
    }

    // -----------------------------------------------------------------------
    // Character profiles and speaker resolution
    // -----------------------------------------------------------------------

    /// Open the profile modal for a character. Returns `false` (and does
    /// nothing) if the id is not in the open story's cast.
    pub fn show_character_profile(&mut self, character_id: &str) -> bool {
        let known = self
            .story
            .as_ref()
            .is_some_and(|s| s.character_by_id(character_id).is_some());
        if known {
            self.selected_character = Some(character_id.to_string());
            self.profile_open = true;
        }
        known
    }

    /// Close the profile modal.
    pub fn close_character_profile(&mut self) {
        self.profile_open = false;
        self.selected_character = None;
    }

    /// The character whose profile is selected, if the modal is open.
    pub fn selected_character(&self) -> Option<&Character> {
        let id = self.selected_character.as_deref()?;
        self.story.as_ref()?.character_by_id(id)
    }

    /// Whether the profile modal is open.
    pub fn is_profile_open(&self) -> bool {
        self.profile_open
    }

    /// Resolve a dialogue speaker name to an avatar reference.
    pub fn avatar_for(&self, speaker: &str) -> Option<&str> {
        self.story
            .as_ref()?
            .character_by_name(speaker)?
            .avatar
            .as_deref()
    }

    /// Resolve a dialogue speaker name to a character id.
    pub fn character_id_for(&self, speaker: &str) -> Option<&str> {
        Some(self.story.as_ref()?.character_by_name(speaker)?.id.as_str())
    }

    /// A character's merged relationship standing, for profile display.
    pub fn relationship_view(&self, character_id: &str) -> Option<RelationshipView> {
        self.ledger.view(self.story.as_ref()?, character_id)
    }

    /// A character's derived intimacy state.
    pub fn intimacy(&self, character_id: &str) -> Option<&IntimacyState> {
        self.ledger.intimacy(&self.story.as_ref()?.id, character_id)
    }

    // -----------------------------------------------------------------------
    // State access
    // -----------------------------------------------------------------------

    /// Which screen the frontend should show.
    pub fn view(&self) -> View {
        self.view
    }

    /// The loaded library index.
    pub fn library(&self) -> &[StorySummary] {
        &self.library
    }

    /// The open story, if any.
    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// Current playback phase.
    pub fn phase(&self) -> Phase {
        self.playback.phase()
    }

    /// The revealed message log.
    pub fn transcript(&self) -> &Transcript {
        self.playback.transcript()
    }

    /// Choices currently awaiting input.
    pub fn current_choices(&self) -> &[vn_core::Choice] {
        self.playback.current_choices()
    }

    /// Whether a part is mid-reveal.
    pub fn is_typing(&self) -> bool {
        self.playback.is_typing()
    }

    /// The chapter being played, if any.
    pub fn chapter(&self) -> Option<&vn_core::Chapter> {
        self.playback.chapter()
    }

    /// Index of the chapter being played.
    pub fn chapter_index(&self) -> Option<usize> {
        self.playback.chapter_index()
    }

    /// Reading progress for every story this session knows about.
    pub fn reading_progress(&self) -> &HashMap<String, ReadingProgress> {
        &self.progress
    }

    /// Take every buffered frontend notification.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Force a checkpoint and surface any write error. The internal hooks
    /// after each transition are best-effort; call this where a failure
    /// must be seen (for example on exit).
    pub fn persist_now(&self) -> RuntimeResult<()> {
        self.store.persist(&self.snapshot())?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Fold playback events into session state. Returns whether durable
    /// state changed.
    fn apply_events(&mut self, events: Vec<PlaybackEvent>) -> bool {
        let mut dirty = false;
        for event in events {
            match event {
                PlaybackEvent::ParagraphEntered {
                    chapter_id,
                    paragraph_id,
                } => {
                    if let Some(story) = &self.story {
                        self.progress.insert(
                            story.id.clone(),
                            ReadingProgress {
                                chapter_id,
                                paragraph_id,
                            },
                        );
                        dirty = true;
                    }
                }
                PlaybackEvent::MessageRevealed | PlaybackEvent::ChoicesPresented { .. } => {
                    self.notifications.push(Notification::ScrollToLatest);
                }
                PlaybackEvent::DeadEnd => {}
            }
        }
        dirty
    }

    fn snapshot(&self) -> SavedState {
        SavedState {
            progress: self.progress.clone(),
            relationships: self.ledger.logs_snapshot(),
        }
    }

    /// The explicit persist hook run after every state-changing
    /// transition. Failures are reported, never propagated.
    fn persist(&self) {
        if let Err(err) = self.store.persist(&self.snapshot()) {
            tracing::warn!(error = %err, "failed to persist session state");
        }
    }
}
