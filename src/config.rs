//! Configuration for MetadataCatalog
//!
//! Provides a builder pattern for configuring how the catalog binds values
//! and renders statements.

/// Configuration for statement commands issued through a catalog
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Fail when an input key or property has no matching column (default: false)
    pub strict_mode: bool,
    /// Let key properties on bound objects replace the table's primary key (default: false)
    pub use_object_defined_keys: bool,
    /// Text appended to every generated statement (default: ";")
    pub statement_terminator: String,
    /// Whether table and procedure names are quoted by the dialect (default: true)
    pub quote_object_names: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfigBuilder::new().build()
    }
}

impl BuilderConfig {
    /// Create a new configuration builder
    pub fn builder() -> BuilderConfigBuilder {
        BuilderConfigBuilder::new()
    }
}

/// Builder for BuilderConfig
#[derive(Debug)]
pub struct BuilderConfigBuilder {
    strict_mode: bool,
    use_object_defined_keys: bool,
    statement_terminator: String,
    quote_object_names: bool,
}

impl Default for BuilderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BuilderConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            strict_mode: false,
            use_object_defined_keys: false,
            statement_terminator: ";".to_string(),
            quote_object_names: true,
        }
    }

    /// Enable or disable strict mode (default: false)
    pub fn strict_mode(mut self, enabled: bool) -> Self {
        self.strict_mode = enabled;
        self
    }

    /// Enable or disable object defined keys (default: false)
    pub fn use_object_defined_keys(mut self, enabled: bool) -> Self {
        self.use_object_defined_keys = enabled;
        self
    }

    /// Set the statement terminator (default: ";")
    pub fn statement_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.statement_terminator = terminator.into();
        self
    }

    /// Emit statements without a terminator
    pub fn without_terminator(mut self) -> Self {
        self.statement_terminator = String::new();
        self
    }

    /// Enable or disable quoting of table and procedure names (default: true)
    pub fn quote_object_names(mut self, enabled: bool) -> Self {
        self.quote_object_names = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> BuilderConfig {
        BuilderConfig {
            strict_mode: self.strict_mode,
            use_object_defined_keys: self.use_object_defined_keys,
            statement_terminator: self.statement_terminator,
            quote_object_names: self.quote_object_names,
        }
    }
}
