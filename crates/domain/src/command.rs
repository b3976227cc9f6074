//! Composable IR command trees.
//!
//! A [`Command`] is either a leaf action (key press, press-and-hold, delay) or
//! a named [`CommandGroup`] of further commands. Trees are immutable once
//! built; [`Command::flatten`] walks them without touching the tree, so the
//! same tree can be sent any number of times.

use std::time::Duration;

/// How a press-and-hold is expressed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    /// Repeat the signal `n` times.
    Repeats(u32),
    /// Hold the signal for `n` seconds.
    Seconds(u32),
}

impl Hold {
    /// Repeat mode, negative counts clamped to zero.
    #[must_use]
    pub fn repeats(count: i64) -> Self {
        Self::Repeats(clamp_to_u32(count))
    }

    /// Duration mode, negative durations clamped to zero.
    #[must_use]
    pub fn seconds(seconds: i64) -> Self {
        Self::Seconds(clamp_to_u32(seconds))
    }
}

/// A node in a command tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send one key once.
    PressKey { key: String, keyset: String },
    /// Send one key repeatedly or for a duration.
    PressAndHold {
        key: String,
        keyset: String,
        hold: Hold,
    },
    /// Pause between two leaves.
    Delay(Duration),
    /// Ordered, named list of child commands.
    Group(CommandGroup),
}

/// A named, ordered list of commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandGroup {
    name: String,
    children: Vec<Command>,
}

impl CommandGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Append a child; chainable.
    pub fn add(&mut self, child: impl Into<Command>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    /// Builder-style variant of [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, child: impl Into<Command>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn children(&self) -> &[Command] {
        &self.children
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl From<CommandGroup> for Command {
    fn from(group: CommandGroup) -> Self {
        Self::Group(group)
    }
}

impl Command {
    /// A single key press.
    pub fn press(key: impl Into<String>, keyset: impl Into<String>) -> Self {
        Self::PressKey {
            key: key.into(),
            keyset: keyset.into(),
        }
    }

    /// A press-and-hold.
    pub fn hold(key: impl Into<String>, keyset: impl Into<String>, hold: Hold) -> Self {
        Self::PressAndHold {
            key: key.into(),
            keyset: keyset.into(),
            hold,
        }
    }

    /// A delay in milliseconds; negative values become zero.
    #[must_use]
    pub fn delay_ms(millis: i64) -> Self {
        Self::Delay(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }

    /// Start an empty named group.
    #[must_use]
    pub fn group(name: impl Into<String>) -> CommandGroup {
        CommandGroup::new(name)
    }

    /// Short label used in logs and errors.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::PressKey { .. } => "press_key",
            Self::PressAndHold { .. } => "press_and_hold",
            Self::Delay(_) => "delay",
            Self::Group(_) => "group",
        }
    }

    /// Display name: the key for presses, the group name for groups.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::PressKey { key, .. } | Self::PressAndHold { key, .. } => key,
            Self::Delay(_) => "delay",
            Self::Group(group) => group.name(),
        }
    }

    /// Pre-order, depth-first walk yielding leaves only.
    ///
    /// The iterator borrows the tree and keeps its own cursor, so calling
    /// `flatten` again starts a fresh, identical pass. An empty group yields
    /// nothing; a bare leaf yields itself.
    #[must_use]
    pub fn flatten(&self) -> Flatten<'_> {
        Flatten {
            pending: Some(self),
            stack: Vec::new(),
        }
    }
}

/// Iterator returned by [`Command::flatten`].
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    pending: Option<&'a Command>,
    stack: Vec<std::slice::Iter<'a, Command>>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a Command;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = match self.pending.take() {
                Some(node) => node,
                None => {
                    let siblings = self.stack.last_mut()?;
                    if let Some(node) = siblings.next() {
                        node
                    } else {
                        self.stack.pop();
                        continue;
                    }
                }
            };
            match node {
                Command::Group(group) => self.stack.push(group.children.iter()),
                leaf => return Some(leaf),
            }
        }
    }
}

impl std::iter::FusedIterator for Flatten<'_> {}

fn clamp_to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
