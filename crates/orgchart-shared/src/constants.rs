//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Zero-padded width of the sequence suffix in derived position codes.
pub const POSITION_CODE_PAD: usize = 3;

/// How often a colliding code derivation is retried with fresh counts
/// before the operation fails.
pub const MAX_CODE_RETRIES: u32 = 3;

/// Display title for an unfilled appointment row.
pub const VACANT_TITLE: &str = "Vacant";

/// Title prefix of the position auto-created with every department.
pub const HEAD_POSITION_PREFIX: &str = "Head of";

/// Currency assigned to the zero salary band of auto-created positions.
pub const DEFAULT_SALARY_CURRENCY: &str = "USD";
