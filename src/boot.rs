use log::{error, info, warn};

use crate::config::Config;

/// Outcome of the pre-run checks.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BootReport {
    pub errors: u32,
    pub warnings: u32,
}

impl BootReport {
    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

/// Run all boot checks against the process environment.
/// Returns false when the digest should not run.
pub fn run(config: &Config) -> bool {
    info!("[boot] flight-digest boot check starting...");

    let password_set = !config.email.password().is_empty();
    let report = check(config, password_set);

    if !report.passed() {
        error!(
            "[boot] Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            report.errors, report.warnings
        );
        return false;
    }

    if report.warnings > 0 {
        warn!(
            "[boot] Boot check passed with {} warning(s). The email may not be delivered.",
            report.warnings
        );
    } else {
        info!("[boot] Boot check passed.");
    }
    true
}

/// The checks themselves, with the environment lookups passed in.
pub fn check(config: &Config, password_set: bool) -> BootReport {
    let mut report = BootReport::default();

    // ── 1. Spreadsheet ─────────────────────────────────
    let sheet = &config.spreadsheet_path;
    if !sheet.exists() {
        error!("[boot]   MISSING spreadsheet: {}", sheet.display());
        report.errors += 1;
    } else if !sheet.is_file() {
        error!("[boot]   Spreadsheet path is not a file: {}", sheet.display());
        report.errors += 1;
    }

    // ── 2. Mail credentials ────────────────────────────
    if !password_set {
        warn!(
            "[boot]   {} is not set (SMTP authentication will fail)",
            config.email.password_env
        );
        report.warnings += 1;
    }
    if config.email.recipient.is_empty() {
        error!("[boot]   No recipient address configured");
        report.errors += 1;
    }

    // ── 3. TLS ─────────────────────────────────────────
    if config.email.accept_invalid_certs {
        warn!(
            "[boot]   Certificate verification DISABLED for {}:{}",
            config.email.smtp_host, config.email.smtp_port
        );
        report.warnings += 1;
    }

    report
}
