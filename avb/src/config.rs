// Runtime configuration for the operations table

/// Storage logical unit a lookup is confined to.
///
/// UFS/eMMC parts expose several hardware partitions; the boot images and
/// their GPT live on the user area.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogicalUnit {
    User,
    Boot,
}

impl LogicalUnit {
    pub const COUNT: usize = 2;

    pub fn index(self) -> usize {
        match self {
            LogicalUnit::User => 0,
            LogicalUnit::Boot => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LogicalUnit::User => "user",
            LogicalUnit::Boot => "boot",
        }
    }
}

/// Settings fixed when the operations table is built
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpsConfig {
    /// Unit holding the root disk and every partition the engine names
    pub logical_unit: LogicalUnit,
}

impl OpsConfig {
    pub const fn new(logical_unit: LogicalUnit) -> Self {
        Self { logical_unit }
    }
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self::new(LogicalUnit::User)
    }
}
