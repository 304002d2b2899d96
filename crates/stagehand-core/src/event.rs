//! Messages and the UI-thread work queue.
//!
//! Controllers turn key presses into [`Message`]s that the application
//! executes. Background workers never touch UI state directly; they post
//! closures to a [`UiQueue`], which the UI thread drains between frames.

use crossterm::event::{KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::context::ContextKey;
use crate::error::CoreError;

/// Directions in the panel navigation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    PrevBlock,
    NextBlock,
    NextItem,
}

/// Position of a click inside a view's content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickPoint {
    /// Zero-based column, counted in characters.
    pub column: usize,
    /// Visible row, before adding the view's scroll origin.
    pub row: usize,
}

/// Messages that can be sent through the application.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Message {
    // === Focus ===
    /// Push a context onto the focus stack.
    Focus(ContextKey),
    /// Follow an edge of the navigation graph from the focused context.
    Navigate(Direction),
    /// Jump to the n-th side window.
    JumpToBlock(usize),

    // === File panel ===
    CursorUp,
    CursorDown,
    /// Toggle a directory, or unstage the selection.
    Select,
    /// Unstage the selection.
    Remove,
    /// Toggle the directory under the cursor.
    GoInto,
    ToggleTreeView,
    CollapseAll,
    ExpandAll,
    ToggleRangeSelect,
    TogglePick,
    /// Click on the staged-files panel while it has focus.
    ActionButtonClick(ClickPoint),

    // === Commit panel ===
    Commit,
    /// Amend the last commit with the message in the commit input.
    AmendCommit,
    PushRemote,
    GenerateCommitMessage,

    // === Global ===
    Refresh,
    Quit,

    // === Input ===
    /// Keyboard input event
    Key(KeyEvent),
    /// Mouse input event
    Mouse(MouseEvent),
    /// Bracketed paste
    Paste(String),
    /// Terminal resize event
    Resize(u16, u16),

    // === Batch ===
    /// Multiple messages to process in sequence
    Batch(Vec<Message>),

    // === No-op ===
    /// No operation (used for optional returns)
    #[default]
    None,
}

impl Message {
    /// Creates a batch of messages
    ///
    /// # Example
    ///
    /// ```
    /// use stagehand_core::event::Message;
    ///
    /// let batch = Message::batch(vec![Message::Refresh, Message::Quit]);
    /// ```
    pub fn batch(messages: Vec<Message>) -> Self {
        Message::Batch(messages)
    }

    /// Returns true if this is a no-op message
    ///
    /// # Example
    ///
    /// ```
    /// use stagehand_core::event::Message;
    ///
    /// assert!(Message::None.is_none());
    /// assert!(!Message::Quit.is_none());
    /// ```
    pub fn is_none(&self) -> bool {
        matches!(self, Message::None)
    }

    /// Flattens nested batch messages into a single level
    ///
    /// This method recursively flattens any nested `Message::Batch` variants
    /// and removes `Message::None` entries.
    ///
    /// # Example
    ///
    /// ```
    /// use stagehand_core::event::Message;
    ///
    /// let nested = Message::Batch(vec![
    ///     Message::Quit,
    ///     Message::Batch(vec![Message::Select, Message::Refresh]),
    /// ]);
    /// let flat = nested.flatten();
    /// assert_eq!(flat.len(), 3);
    /// ```
    pub fn flatten(self) -> Vec<Message> {
        match self {
            Message::Batch(msgs) => msgs.into_iter().flat_map(|m| m.flatten()).collect(),
            Message::None => vec![],
            other => vec![other],
        }
    }
}

/// Input events from the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Keyboard input
    Key(KeyEvent),
    /// Mouse input
    Mouse(MouseEvent),
    /// Bracketed paste
    Paste(String),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick event for periodic updates
    Tick,
}

impl From<crossterm::event::Event> for InputEvent {
    fn from(event: crossterm::event::Event) -> Self {
        match event {
            crossterm::event::Event::Key(key) => InputEvent::Key(key),
            crossterm::event::Event::Mouse(mouse) => InputEvent::Mouse(mouse),
            crossterm::event::Event::Paste(text) => InputEvent::Paste(text),
            crossterm::event::Event::Resize(w, h) => InputEvent::Resize(w, h),
            _ => InputEvent::Tick,
        }
    }
}

impl From<InputEvent> for Message {
    fn from(event: InputEvent) -> Self {
        match event {
            InputEvent::Key(key) => Message::Key(key),
            InputEvent::Mouse(mouse) => Message::Mouse(mouse),
            InputEvent::Paste(text) => Message::Paste(text),
            InputEvent::Resize(w, h) => Message::Resize(w, h),
            InputEvent::Tick => Message::None,
        }
    }
}

/// A unit of work to run on the UI thread against state `S`.
pub type UiJob<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Single-consumer queue of closures applied on the UI thread.
///
/// Jobs run in the order they were posted.
pub struct UiQueue<S> {
    sender: mpsc::UnboundedSender<UiJob<S>>,
    receiver: mpsc::UnboundedReceiver<UiJob<S>>,
}

impl<S> UiQueue<S> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        UiQueue { sender, receiver }
    }

    /// Returns a handle workers use to post jobs.
    pub fn sender(&self) -> UiSender<S> {
        UiSender {
            sender: self.sender.clone(),
        }
    }

    /// Takes the next pending job without waiting.
    pub fn try_next(&mut self) -> Option<UiJob<S>> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next job.
    pub async fn next(&mut self) -> Option<UiJob<S>> {
        self.receiver.recv().await
    }

    /// Runs every pending job against `state`, returning how many ran.
    pub fn drain(&mut self, state: &mut S) -> usize {
        let mut ran = 0;
        while let Some(job) = self.try_next() {
            job(state);
            ran += 1;
        }
        ran
    }
}

impl<S> Default for UiQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for UiQueue<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiQueue").finish_non_exhaustive()
    }
}

/// Posting side of a [`UiQueue`]; cheap to clone and `Send`.
pub struct UiSender<S> {
    sender: mpsc::UnboundedSender<UiJob<S>>,
}

impl<S> UiSender<S> {
    /// Queues `job` for the UI thread.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EventError` if the queue has been dropped.
    pub fn post<F>(&self, job: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.sender
            .send(Box::new(job))
            .map_err(|_| CoreError::EventError("ui queue closed".to_string()))
    }
}

impl<S> Clone for UiSender<S> {
    fn clone(&self) -> Self {
        UiSender {
            sender: self.sender.clone(),
        }
    }
}

impl<S> std::fmt::Debug for UiSender<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiSender").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_none_is_default() {
        assert!(matches!(Message::default(), Message::None));
    }

    #[test]
    fn test_message_flatten_nested_batch() {
        let msg = Message::Batch(vec![
            Message::Quit,
            Message::Batch(vec![Message::Select, Message::None, Message::Remove]),
        ]);
        assert_eq!(
            msg.flatten(),
            vec![Message::Quit, Message::Select, Message::Remove]
        );
    }

    #[test]
    fn test_input_event_from_paste() {
        let event = crossterm::event::Event::Paste("hello".to_string());
        let input: InputEvent = event.into();
        assert_eq!(input, InputEvent::Paste("hello".into()));
        assert_eq!(Message::from(input), Message::Paste("hello".into()));
    }

    #[test]
    fn test_input_event_from_resize() {
        let input: InputEvent = crossterm::event::Event::Resize(80, 24).into();
        assert!(matches!(input, InputEvent::Resize(80, 24)));
    }

    #[test]
    fn test_tick_maps_to_none() {
        assert!(Message::from(InputEvent::Tick).is_none());
    }

    #[test]
    fn test_queue_runs_jobs_in_post_order() {
        let mut queue: UiQueue<Vec<u32>> = UiQueue::new();
        let sender = queue.sender();
        for i in 0..5 {
            sender.post(move |log: &mut Vec<u32>| log.push(i)).expect("post");
        }

        let mut log = Vec::new();
        assert_eq!(queue.drain(&mut log), 5);
        assert_eq!(log, vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.drain(&mut log), 0);
    }

    #[tokio::test]
    async fn test_jobs_posted_from_other_threads_arrive() {
        let mut queue: UiQueue<String> = UiQueue::new();
        let sender = queue.sender();
        std::thread::spawn(move || {
            sender.post(|s: &mut String| s.push_str("done")).expect("post");
        });

        let job = queue.next().await.expect("job arrives");
        let mut state = String::new();
        job(&mut state);
        assert_eq!(state, "done");
    }

    #[test]
    fn test_post_after_queue_dropped_fails() {
        let queue: UiQueue<()> = UiQueue::new();
        let sender = queue.sender();
        drop(queue);
        assert!(sender.post(|_| {}).is_err());
    }
}
