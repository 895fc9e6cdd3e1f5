//! Runtime configuration for a [`TaskQueue`](crate::TaskQueue).

/// Configuration for a task queue.
///
/// The arena size is fixed at compile time by the queue's `N` parameter;
/// `max_tasks` can only lower it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    pub name: &'static str,
    pub max_tasks: usize,
    pub gate_until_active: bool,
}

impl QueueConfig {
    /// Unnamed queue using the whole arena and accepting work immediately.
    pub const DEFAULT: Self = Self {
        name: "tickq",
        max_tasks: usize::MAX,
        gate_until_active: false,
    };

    /// Creates a new configuration builder.
    pub fn builder() -> QueueConfigBuilder {
        QueueConfigBuilder::default()
    }

    /// Number of pending tasks allowed in an arena of `slots` entries.
    pub const fn capacity(&self, slots: usize) -> usize {
        if self.max_tasks < slots {
            self.max_tasks
        } else {
            slots
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Builder for ergonomic queue configuration construction.
#[derive(Debug, Clone, Default)]
pub struct QueueConfigBuilder {
    config: QueueConfig,
}

impl QueueConfigBuilder {
    /// Sets the queue name used in log records.
    pub fn name(mut self, name: &'static str) -> Self {
        self.config.name = name;
        self
    }

    /// Caps the number of pending tasks below the arena size.
    pub fn max_tasks(mut self, max: usize) -> Self {
        self.config.max_tasks = max;
        self
    }

    /// Rejects `schedule` with `NotActive` until dispatch has run once.
    pub fn gate_until_active(mut self, gate: bool) -> Self {
        self.config.gate_until_active = gate;
        self
    }

    /// Builds the queue configuration.
    pub fn build(self) -> QueueConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_clamped_to_arena() {
        let config = QueueConfig::builder().max_tasks(4).build();
        assert_eq!(config.capacity(8), 4);
        assert_eq!(config.capacity(2), 2);
        assert_eq!(QueueConfig::DEFAULT.capacity(16), 16);
    }
}
