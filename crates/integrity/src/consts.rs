/// Name of the user who uploaded the file.
pub const UPLOADER: &str = "Uploader";
/// Free-form version string given at upload time.
pub const VERSION: &str = "Version";
/// Key the server expects the target path under in a save payload.
pub const FILE_PATH: &str = "FilePath";

/// Prefix of every recorded (attested) field.
pub const RDS_PREFIX: &str = "RDS ";
/// Canonical key of the RDS reference number. New values are always written here.
pub const RDS_NUMBER: &str = "RDS Number";
/// Keys the reference number has been stored under by older server revisions,
/// in lookup order after [`RDS_NUMBER`]. `"RDS RDS"` comes from README imports
/// (which prefix every key) and the bare `"RDS"` from HTML report imports.
pub const RDS_NUMBER_ALIASES: [&str; 2] = ["RDS RDS", "RDS"];

/// Extensions that are never attested and get a hidden placeholder instead of
/// a status icon.
pub const DEFAULT_EXCLUDED_EXTENSIONS: [&str; 3] = ["md", "html", "txt"];
