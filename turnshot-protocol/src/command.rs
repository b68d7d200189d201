//! Command table and dispatcher for the operator console.
//!
//! A command line is split on spaces; the first token names the command and
//! the rest are positional arguments. The table is a static slice of
//! [`CommandDescriptor`]s searched in order, first match wins. Each
//! descriptor carries a command tag `K` that the caller maps to its handler,
//! so this crate never needs to know what the commands do.
//!
//! ```ignore
//! static TABLE: CommandTable<Cmd> = CommandTable::new(&[
//!     CommandDescriptor { name: "arm-rotate", command: Cmd::ArmRotate,
//!                         usage: "<angle>", help: "rotate arm", min_args: 1, max_args: 1 },
//! ]);
//!
//! let invocation = TABLE.dispatch("arm-rotate 90")?;
//! match invocation.command() { Cmd::ArmRotate => { /* ... */ } }
//! ```

use heapless::Vec;

/// Maximum number of arguments any command may take
pub const MAX_ARGS: usize = 4;

/// Token separator
const TOKEN_DELIMITER: char = ' ';

/// Errors produced while matching a line against the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Line contained no tokens
    Empty,
    /// First token matches no descriptor
    UnknownCommand,
    /// Fewer arguments than the descriptor's minimum
    TooFewArgs,
    /// More arguments than the descriptor's maximum
    TooManyArgs,
}

impl DispatchError {
    /// Diagnostic text reported on the operator console
    pub fn message(&self) -> &'static str {
        match self {
            DispatchError::Empty => "empty command",
            DispatchError::UnknownCommand => "unknown command",
            DispatchError::TooFewArgs => "too few args",
            DispatchError::TooManyArgs => "too many args",
        }
    }
}

/// Inconsistencies in a command table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// Entry at this index reuses an earlier name
    DuplicateName(usize),
    /// Entry at this index has `min_args > max_args` or `max_args > MAX_ARGS`
    InvalidArity(usize),
}

/// Static description of one console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandDescriptor<K> {
    /// Command name (first token of the line)
    pub name: &'static str,
    /// Tag the caller maps to a handler
    pub command: K,
    /// Argument synopsis shown by help
    pub usage: &'static str,
    /// One-line description shown by help
    pub help: &'static str,
    /// Minimum number of arguments
    pub min_args: u8,
    /// Maximum number of arguments
    pub max_args: u8,
}

/// Positional arguments of one invocation
///
/// Borrowed from the line being dispatched and dropped with it, so no
/// token can survive into the next command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args<'a> {
    tokens: Vec<&'a str, MAX_ARGS>,
}

impl<'a> Args<'a> {
    /// Number of arguments
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if there are no arguments
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Get an argument by position
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    /// Parse an argument as an unsigned number (see [`parse_number`])
    pub fn number(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(parse_number)
    }

    /// Iterate over the arguments in order
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.iter().copied()
    }
}

/// Parse an unsigned number in decimal or `0x`-prefixed hexadecimal
pub fn parse_number(token: &str) -> Option<u32> {
    match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}

/// A matched command with its arity-checked arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a, K: 'static> {
    /// Matched table entry
    pub descriptor: &'static CommandDescriptor<K>,
    /// Arguments following the command name
    pub args: Args<'a>,
}

impl<'a, K: Copy + 'static> Invocation<'a, K> {
    /// Tag of the matched command
    pub fn command(&self) -> K {
        self.descriptor.command
    }
}

/// Ordered, immutable set of command descriptors
#[derive(Debug, Clone, Copy)]
pub struct CommandTable<K: 'static> {
    entries: &'static [CommandDescriptor<K>],
}

impl<K: 'static> CommandTable<K> {
    /// Create a table over a static slice of descriptors
    pub const fn new(entries: &'static [CommandDescriptor<K>]) -> Self {
        Self { entries }
    }

    /// All descriptors in table order
    pub fn entries(&self) -> &'static [CommandDescriptor<K>] {
        self.entries
    }

    /// Find the first descriptor with the given name
    pub fn find(&self, name: &str) -> Option<&'static CommandDescriptor<K>> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Check that names are unique and arities are consistent
    pub fn validate(&self) -> Result<(), TableError> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.min_args > entry.max_args || entry.max_args as usize > MAX_ARGS {
                return Err(TableError::InvalidArity(index));
            }
            if self.entries[..index].iter().any(|e| e.name == entry.name) {
                return Err(TableError::DuplicateName(index));
            }
        }
        Ok(())
    }

    /// Tokenize a line, look up its command and check the argument count
    pub fn dispatch<'a>(&self, line: &'a str) -> Result<Invocation<'a, K>, DispatchError> {
        let mut tokens = line.split(TOKEN_DELIMITER).filter(|t| !t.is_empty());

        let name = tokens.next().ok_or(DispatchError::Empty)?;
        let descriptor = self.find(name).ok_or(DispatchError::UnknownCommand)?;

        let mut args = Args::default();
        let mut count = 0usize;
        for token in tokens {
            // Tokens past capacity are only counted; the arity check rejects them
            let _ = args.tokens.push(token);
            count += 1;
        }

        if count < descriptor.min_args as usize {
            return Err(DispatchError::TooFewArgs);
        }
        if count > descriptor.max_args as usize || count > MAX_ARGS {
            return Err(DispatchError::TooManyArgs);
        }

        Ok(Invocation { descriptor, args })
    }
}
