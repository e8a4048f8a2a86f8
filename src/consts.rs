pub const DEFAULT_VERIFIER_EXECUTABLE: &str = "stainless-smart";
pub const DEFAULT_COMPILER_EXECUTABLE: &str = "solcjs";

pub const DEFAULT_REPORT_NAME: &str = "report.json";
pub const DEFAULT_CACHE_DIR_NAME: &str = "stainless-cache-dir";
pub const DEFAULT_TRANSPILED_EXTENSION: &str = "sol";

pub const DEFAULT_COMPILER_OUTPUT_DIR: &str = "out";
pub const DEFAULT_ARTIFACT_INFIX: &str = "_sol";
pub const DEFAULT_BINARY_SUFFIX: &str = "bin";
pub const DEFAULT_INTERFACE_SUFFIX: &str = "abi";

pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 60;

/// Verifier flag selecting the structured `report.json` output.
pub const VERIFIER_JSON_FLAG: &str = "--json";
/// Verifier flag switching it into transpilation mode.
pub const VERIFIER_TRANSPILE_FLAG: &str = "--solidity";
pub const VERIFIER_CACHE_DIR_FLAG: &str = "--cache-dir";

pub const COMPILER_BINARY_FLAG: &str = "--bin";
pub const COMPILER_INTERFACE_FLAG: &str = "--abi";
pub const COMPILER_OUTPUT_DIR_FLAG: &str = "--output-dir";

pub const STAGING_DIR_PREFIX: &str = "stainless-";
