/// Constants used throughout the semcache codebase
// Model endpoint
pub const DEFAULT_MODEL_NAME: &str = "phi3:mini";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const GENERATE_PATH: &str = "/api/generate";
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 300;

// Cache budget and backend
pub const DEFAULT_BYTE_BUDGET: u64 = 16 * 1024;
pub const DEFAULT_SIMILARITY_MAX_DISTANCE: f64 = 0.85;

// Cost-aware scoring
pub const RECENCY_HALF_LIFE_SECS: f64 = 300.0;
pub const HIT_BONUS_PER_HIT: f64 = 0.25;

// Synthetic model
pub const DEFAULT_SYNTHETIC_SIZES: &[usize] = &[2048, 4096, 8192];
pub const DEFAULT_SYNTHETIC_LATENCY_MS: &[(usize, u64)] = &[(2048, 60), (4096, 110), (8192, 220)];
pub const DEFAULT_SYNTHETIC_SLEEP_MS: u64 = 100;

// Prompt stream
pub const DEFAULT_PROMPT_FILE: &str = "prompt_stream.json";
pub const DEFAULT_NUMBER_OF_PROMPTS: usize = 100;

// Environment variable names
pub const SEMCACHE_BYTE_BUDGET_VAR: &str = "SEMCACHE_BYTE_BUDGET";
pub const SEMCACHE_MODEL_VAR: &str = "SEMCACHE_MODEL";
pub const SEMCACHE_ENDPOINT_VAR: &str = "SEMCACHE_ENDPOINT";
pub const SEMCACHE_SYNTHETIC_VAR: &str = "SEMCACHE_SYNTHETIC";
pub const SEMCACHE_PROMPTS_VAR: &str = "SEMCACHE_PROMPTS";
pub const SEMCACHE_OUTPUT_DIR_VAR: &str = "SEMCACHE_OUTPUT_DIR";

// Report
pub const CSV_HEADER: &[&str] = &[
    "ts",
    "prompt",
    "hit",
    "lookup_ms",
    "model_ms",
    "e2e_ms",
    "path",
    "policy",
];
