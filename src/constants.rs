/// Application constants

// API version
pub const API_VERSION: &str = "v1";

// Query service
pub const DEFAULT_TORII_SQL_URL: &str = "https://api.cartridge.gg/x/eternum-game-mainnet-27/torii/sql";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REALM_CACHE_SIZE: usize = 10;
pub const DEFAULT_REALM_LIST_LIMIT: u32 = 20;
pub const MAX_REALM_LIST_LIMIT: u32 = 500;

// Torii tables
pub const TABLE_SETTLE_REALM_DATA: &str = "s1_eternum-SettleRealmData";
pub const TABLE_STRUCTURE: &str = "s1_eternum-Structure";
pub const TABLE_RESOURCE: &str = "s1_eternum-Resource";

// Resource field naming
pub const BALANCE_SUFFIX: &str = "_BALANCE";
pub const PRODUCTION_INFIX: &str = "_PRODUCTION.";
pub const PRODUCTION_RATE_FIELD: &str = "production_rate";
pub const PENDING_AMOUNT_FIELD: &str = "output_amount_left";
pub const CAPACITY_FIELD: &str = "weight.capacity";

// Zero sentinels
pub const ZERO_ADDRESS: &str = "0x0";
pub const ZERO_WORD: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

// Fixed-point encoding
pub const BASE_FACTOR: u64 = 4_000_000_000_000;
pub const DISPLAY_MULTIPLIER: u64 = 1_000_000;
pub const HIGH_LEVEL_COMMON_ADJUSTMENT: u64 = 63; // common/uncommon balances on level 2+ realms
pub const DEFAULT_CAPACITY_DIVISOR: u64 = 250_000_000;

// Decimal materialisation
pub const DISPLAY_SCALE: u32 = 6;
pub const MAX_SIGNIFICANT_DIGITS: u32 = 28;

pub const SECONDS_PER_HOUR: u32 = 3_600;

pub const UNKNOWN_REALM: &str = "Unknown Realm";
