//! Delivery options.

/// Configuration bundle for one delivery.
#[derive(Debug, Clone)]
pub struct DeliveryOptions {
    /// Copy an existing destination to a timestamped path before overwrite.
    pub backup: bool,
    /// Command run against the staged file before commit. Must contain a
    /// `%s` placeholder for the staged path; non-zero exit aborts delivery.
    pub validate: Option<String>,
    /// Skip the write when destination content already matches.
    pub checksum_compare: bool,
    /// Report the would-be change without writing anything.
    pub check_mode: bool,
    /// Include a line-based diff in the result.
    pub diff_mode: bool,
    /// Permission bits to apply to the committed file.
    pub mode: Option<u32>,
    /// Numeric uid to apply to the committed file.
    pub owner: Option<u32>,
    /// Numeric gid to apply to the committed file.
    pub group: Option<u32>,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            backup: false,
            validate: None,
            checksum_compare: true,
            check_mode: false,
            diff_mode: false,
            mode: None,
            owner: None,
            group: None,
        }
    }
}

impl DeliveryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backup(mut self, enabled: bool) -> Self {
        self.backup = enabled;
        self
    }

    pub fn validate(mut self, command: impl Into<String>) -> Self {
        self.validate = Some(command.into());
        self
    }

    pub fn checksum_compare(mut self, enabled: bool) -> Self {
        self.checksum_compare = enabled;
        self
    }

    pub fn check_mode(mut self, enabled: bool) -> Self {
        self.check_mode = enabled;
        self
    }

    pub fn diff_mode(mut self, enabled: bool) -> Self {
        self.diff_mode = enabled;
        self
    }

    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn owner(mut self, uid: u32) -> Self {
        self.owner = Some(uid);
        self
    }

    pub fn group(mut self, gid: u32) -> Self {
        self.group = Some(gid);
        self
    }
}
