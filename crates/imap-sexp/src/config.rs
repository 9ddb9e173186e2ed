//! Parser configuration types.

/// Default capacity of the buffer wrapped around plain readers.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Default maximum line length, terminator included.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Default number of bytes scanned for the closing brace of a literal prefix.
pub const DEFAULT_LITERAL_SCAN_LIMIT: usize = 4096;

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum bytes `read_to_end_of_line` scans before giving up.
    pub max_line_length: usize,
    /// Maximum bytes scanned between `{` and `}` of a literal prefix.
    pub literal_scan_limit: usize,
    /// Largest literal payload accepted. `None` accepts any size.
    pub max_literal_size: Option<usize>,
    /// Deepest list nesting accepted. `None` means unbounded.
    pub max_depth: Option<usize>,
}

impl Config {
    /// Creates a configuration with default limits and no size or depth caps.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            literal_scan_limit: DEFAULT_LITERAL_SCAN_LIMIT,
            max_literal_size: None,
            max_depth: None,
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for parser configuration.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder with default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    /// Sets the maximum line length.
    #[must_use]
    pub const fn max_line_length(mut self, limit: usize) -> Self {
        self.config.max_line_length = limit;
        self
    }

    /// Sets how far to scan for the end of a literal length field.
    #[must_use]
    pub const fn literal_scan_limit(mut self, limit: usize) -> Self {
        self.config.literal_scan_limit = limit;
        self
    }

    /// Caps the size of literal payloads.
    #[must_use]
    pub const fn max_literal_size(mut self, limit: usize) -> Self {
        self.config.max_literal_size = Some(limit);
        self
    }

    /// Caps list nesting depth.
    #[must_use]
    pub const fn max_depth(mut self, limit: usize) -> Self {
        self.config.max_depth = Some(limit);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub const fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
