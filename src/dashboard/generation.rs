/// Captured when a guild-scoped fetch starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    guild_id: String,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }
}

/// Monotonic counter bumped whenever the active guild changes. A response
/// whose ticket is behind the counter belongs to a guild that is no longer
/// being edited.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    current: u64,
}

impl RequestGeneration {
    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn bump(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    pub fn issue(&self, guild_id: &str) -> Ticket {
        Ticket {
            generation: self.current,
            guild_id: guild_id.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.current
    }
}
