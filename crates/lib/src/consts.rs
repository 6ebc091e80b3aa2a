//! Names and fixed values shared across the crate.

/// Application name, used for config directories.
pub const APP_NAME: &str = "cf-brooklyn";

/// Default manifest file consulted by `push`.
pub const DEFAULT_MANIFEST: &str = "manifest.yml";

/// Default management CLI binary.
pub const DEFAULT_CF_BINARY: &str = "cf";

/// Version registered for every catalog item produced from a blueprint.
pub const CATALOG_ITEM_VERSION: &str = "1.0";

/// Description attached to catalog items produced from a blueprint.
pub const CATALOG_ITEM_DESCRIPTION: &str = "A user defined blueprint";

/// Entity type wrapping the children of a blueprint.
pub const BASIC_APPLICATION_TYPE: &str = "brooklyn.entity.basic.BasicApplication";

/// Environment variable overriding the profile path.
pub const ENV_CONFIG: &str = "CF_BROOKLYN_CONFIG";
pub const ENV_BROKER: &str = "CF_BROOKLYN_BROKER";
pub const ENV_USERNAME: &str = "CF_BROOKLYN_USERNAME";
pub const ENV_PASSWORD: &str = "CF_BROOKLYN_PASSWORD";
pub const ENV_CF_BINARY: &str = "CF_BROOKLYN_CF";
