mod boot;
mod config;
mod dates;
mod digest;
mod email;
mod error;
mod report;
mod sheet;
mod status;


use config::Config;
use email::SmtpMailer;
use status::HttpStatusSource;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            log::error!("[config] {}", e);
            return;
        }
    };

    // Boot check: spreadsheet present, credentials and TLS settings sane
    if !boot::run(&config) {
        return;
    }

    let source = match HttpStatusSource::new(&config.status) {
        Ok(s) => s,
        Err(e) => {
            log::error!("[status] {}", e);
            return;
        }
    };
    let mailer = SmtpMailer::from_config(&config.email);

    let tomorrow = dates::tomorrow();
    log::info!("[digest] Collecting flights for {}", dates::sheet_date(tomorrow));

    if let Err(e) = digest::run(&config, tomorrow, &source, &mailer) {
        log::error!("[digest] {}", e);
    }
}
