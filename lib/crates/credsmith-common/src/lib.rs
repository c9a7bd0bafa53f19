pub mod envfmt;
pub mod record;
pub mod report;

pub use envfmt::{EnvFormatError, env_prefix, parse_env_block, render_env_block, render_record};
pub use record::{CredentialRecord, FailureKind, SecretKind, VerificationStatus, mask, sentinel};
pub use report::RunReport;
