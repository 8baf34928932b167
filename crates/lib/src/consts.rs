//! Repository layout constants shared across the build flow.

/// Directory holding vendored submodule checkouts.
pub const THIRD_PARTY_DIR: &str = "third_party";

/// Source tree of the native core (CMake project root).
pub const NATIVE_DIR: &str = "native";

/// CMake build tree.
pub const BUILD_DIR: &str = "build";

/// Staged package output tree.
pub const DIST_DIR: &str = "dist";

/// Submodule manifest at the repo root.
pub const GITMODULES_FILE: &str = ".gitmodules";

/// Base version file at the repo root.
pub const VERSION_FILE: &str = "version.txt";
