//! The playback engine: paragraph traversal and incremental reveal.
//!
//! An explicit state machine replaces the timer-callback chain a naive
//! implementation would use: `Idle → Revealing → AwaitingChoice` (or back
//! to `Idle` at a dead end), with every delayed step held by the
//! [`Scheduler`] so that switching chapter or story cancels the pending
//! chain deterministically. Parts of one paragraph reveal strictly in
//! order; each step schedules the next only after completing, so no two
//! reveal timers ever overlap.

use std::collections::VecDeque;

use vn_core::{Chapter, Choice, Paragraph, Part, Story};

use crate::config::PacingConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::scheduler::Scheduler;
use crate::transcript::{Message, Transcript};

/// Where the playback state machine currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing is pending: either no chapter is loaded or playback sits
    /// at a dead end.
    Idle,
    /// Parts are being revealed on a timer.
    Revealing,
    /// All parts are out and choices are surfaced, waiting for input.
    AwaitingChoice,
}

/// Something observable that happened while the engine ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback entered a paragraph; reading progress should be recorded.
    ParagraphEntered {
        /// The chapter being played.
        chapter_id: String,
        /// The paragraph just entered.
        paragraph_id: String,
    },
    /// A message was appended to the transcript.
    MessageRevealed,
    /// Choices are surfaced and input is awaited.
    ChoicesPresented {
        /// How many choices are offered.
        count: usize,
    },
    /// Playback reached a paragraph with no choices and no successor.
    DeadEnd,
}

/// A delayed step of the reveal chain.
#[derive(Debug)]
enum Task {
    /// Append the part to the transcript after its reveal delay.
    Reveal(Part),
    /// Pull the next part from the queue after the inter-part gap.
    Pump,
    /// Enter the successor paragraph after the post-choice pause.
    Enter(Paragraph),
}

/// The paragraph → parts → choices traversal engine for one session.
#[derive(Debug)]
pub struct Playback {
    pacing: PacingConfig,
    phase: Phase,
    chapter: Option<Chapter>,
    chapter_index: Option<usize>,
    queue: VecDeque<Part>,
    staged_choices: Vec<Choice>,
    current_choices: Vec<Choice>,
    transcript: Transcript,
    is_typing: bool,
    scheduler: Scheduler<Task>,
}

impl Playback {
    /// Create an idle engine with the given pacing.
    pub fn new(pacing: PacingConfig) -> Self {
        Self {
            pacing,
            phase: Phase::Idle,
            chapter: None,
            chapter_index: None,
            queue: VecDeque::new(),
            staged_choices: Vec::new(),
            current_choices: Vec::new(),
            transcript: Transcript::new(),
            is_typing: false,
            scheduler: Scheduler::new(),
        }
    }

    /// Current state-machine phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The revealed message log.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Choices currently awaiting input (empty outside `AwaitingChoice`).
    pub fn current_choices(&self) -> &[Choice] {
        &self.current_choices
    }

    /// Whether a part is mid-reveal (the typing indicator).
    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    /// The chapter being played, if any.
    pub fn chapter(&self) -> Option<&Chapter> {
        self.chapter.as_ref()
    }

    /// Index of the chapter being played, if any.
    pub fn chapter_index(&self) -> Option<usize> {
        self.chapter_index
    }

    /// Milliseconds until the next scheduled step, if one is pending.
    pub fn next_due_in(&self) -> Option<u64> {
        self.scheduler.due_in()
    }

    /// Begin playback of `story.chapters[index]` from its first
    /// paragraph, discarding the previous transcript and any pending
    /// reveal chain. An out-of-range index is a silent no-op.
    pub fn start_chapter(&mut self, story: &Story, index: usize) -> Vec<PlaybackEvent> {
        let Some(chapter) = story.chapter(index) else {
            tracing::debug!(index, story = %story.id, "chapter index out of range, ignoring");
            return Vec::new();
        };
        self.reset_to(chapter.clone(), index);

        let mut events = Vec::new();
        let first = self
            .chapter
            .as_ref()
            .and_then(Chapter::first_paragraph)
            .cloned();
        if let Some(paragraph) = first {
            self.enter_paragraph(paragraph, &mut events);
        }
        events
    }

    /// Begin playback at a specific paragraph of a chapter. This is how
    /// saved progress is re-entered. Falls back to the chapter's first
    /// paragraph if the saved id no longer exists; out-of-range chapter
    /// indexes are a silent no-op like [`Playback::start_chapter`].
    pub fn resume(
        &mut self,
        story: &Story,
        chapter_index: usize,
        paragraph_id: &str,
    ) -> Vec<PlaybackEvent> {
        let Some(chapter) = story.chapter(chapter_index) else {
            tracing::debug!(
                index = chapter_index,
                story = %story.id,
                "saved chapter out of range, ignoring"
            );
            return Vec::new();
        };
        let paragraph = chapter
            .paragraph(paragraph_id)
            .or_else(|| chapter.first_paragraph())
            .cloned();
        self.reset_to(chapter.clone(), chapter_index);

        let mut events = Vec::new();
        if let Some(paragraph) = paragraph {
            self.enter_paragraph(paragraph, &mut events);
        }
        events
    }

    /// Resolve a surfaced choice: echo it into the transcript as the
    /// protagonist's line and schedule the successor paragraph.
    ///
    /// Valid only in [`Phase::AwaitingChoice`]. A successor id that does
    /// not resolve is not an error — playback simply stays put at a dead
    /// end.
    pub fn choose(
        &mut self,
        choice_id: &str,
        protagonist: &str,
    ) -> RuntimeResult<Vec<PlaybackEvent>> {
        if self.phase != Phase::AwaitingChoice {
            return Err(RuntimeError::NotAwaitingChoice);
        }
        let Some(position) = self.current_choices.iter().position(|c| c.id == choice_id) else {
            return Err(RuntimeError::UnknownChoice(choice_id.to_string()));
        };
        let choice = self.current_choices.swap_remove(position);
        self.current_choices.clear();

        let mut events = Vec::new();
        self.transcript
            .append(Message::player(choice.text.clone(), protagonist));
        events.push(PlaybackEvent::MessageRevealed);

        let successor = choice
            .successor()
            .and_then(|id| self.chapter.as_ref().and_then(|c| c.paragraph(id)))
            .cloned();
        match successor {
            Some(paragraph) => {
                self.phase = Phase::Revealing;
                self.scheduler
                    .schedule(self.pacing.choice_delay_ms, Task::Enter(paragraph));
            }
            None => {
                self.phase = Phase::Idle;
                events.push(PlaybackEvent::DeadEnd);
            }
        }
        Ok(events)
    }

    /// Report `elapsed_ms` of time. Due steps run in order at their exact
    /// due times, so one large tick behaves like many small ones.
    pub fn tick(&mut self, elapsed_ms: u64) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        let target = self.scheduler.now_ms() + elapsed_ms;
        loop {
            let Some(due) = self.scheduler.next_due_at() else {
                break;
            };
            if due > target {
                break;
            }
            for task in self.scheduler.advance_to(due) {
                self.run_task(task, &mut events);
            }
        }
        self.scheduler.advance_to(target);
        events
    }

    fn reset_to(&mut self, chapter: Chapter, index: usize) {
        let cancelled = self.scheduler.cancel_all();
        if cancelled > 0 {
            tracing::debug!(cancelled, "dropped pending reveal steps");
        }
        self.transcript.clear();
        self.queue.clear();
        self.staged_choices.clear();
        self.current_choices.clear();
        self.is_typing = false;
        self.phase = Phase::Idle;
        self.chapter = Some(chapter);
        self.chapter_index = Some(index);
    }

    fn enter_paragraph(&mut self, paragraph: Paragraph, events: &mut Vec<PlaybackEvent>) {
        let chapter_id = self
            .chapter
            .as_ref()
            .map(|c| c.id.clone())
            .unwrap_or_default();
        events.push(PlaybackEvent::ParagraphEntered {
            chapter_id,
            paragraph_id: paragraph.id.clone(),
        });

        self.queue = paragraph.parts.into();
        self.staged_choices = paragraph.choices;
        self.phase = Phase::Revealing;
        self.pump(events);
    }

    fn pump(&mut self, events: &mut Vec<PlaybackEvent>) {
        match self.queue.pop_front() {
            Some(part) => {
                self.is_typing = true;
                let delay = self.pacing.reveal_delay_ms(part.text.chars().count());
                self.scheduler.schedule(delay, Task::Reveal(part));
            }
            None => self.finish_paragraph(events),
        }
    }

    fn finish_paragraph(&mut self, events: &mut Vec<PlaybackEvent>) {
        if self.staged_choices.is_empty() {
            self.phase = Phase::Idle;
            events.push(PlaybackEvent::DeadEnd);
        } else {
            self.current_choices = std::mem::take(&mut self.staged_choices);
            self.phase = Phase::AwaitingChoice;
            events.push(PlaybackEvent::ChoicesPresented {
                count: self.current_choices.len(),
            });
        }
    }

    fn run_task(&mut self, task: Task, events: &mut Vec<PlaybackEvent>) {
        match task {
            Task::Reveal(part) => {
                self.is_typing = false;
                self.transcript.append(Message::from_part(&part));
                events.push(PlaybackEvent::MessageRevealed);
                self.scheduler.schedule(self.pacing.part_gap_ms, Task::Pump);
            }
            Task::Pump => self.pump(events),
            Task::Enter(paragraph) => self.enter_paragraph(paragraph, events),
        }
    }
}
