use std::error::Error;

use tera::{Context, Tera};

use crate::error::DigestError;
use crate::status::FlightStatus;

const BUILTIN: &str = "builtin.txt";
const CUSTOM: &str = "custom.txt";

const BUILTIN_TEMPLATE: &str = "Flight Status Update:
{% for flight in flights %}Flight {{ flight.flight_number }} Status: {{ flight.status_text }}
{% endfor %}";

/// Renders the plain-text email body from collected statuses.
pub struct ReportRenderer {
    tera: Tera,
    has_custom: bool,
}

impl ReportRenderer {
    /// Compile the built-in template and, if given, a custom one.
    /// A custom template that does not compile is rejected up front.
    pub fn new(custom: Option<&str>) -> Result<Self, DigestError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(BUILTIN, BUILTIN_TEMPLATE)
            .map_err(|e| DigestError::Config(error_chain(&e)))?;

        let has_custom = match custom {
            Some(source) => {
                tera.add_raw_template(CUSTOM, source).map_err(|e| {
                    DigestError::Config(format!("report template: {}", error_chain(&e)))
                })?;
                true
            }
            None => false,
        };

        Ok(ReportRenderer { tera, has_custom })
    }

    /// Render `statuses` in order. A custom template that fails at render
    /// time is logged and the built-in layout is used instead.
    pub fn render(&self, statuses: &[FlightStatus]) -> String {
        let mut ctx = Context::new();
        ctx.insert("flights", statuses);
        ctx.insert("count", &statuses.len());

        if self.has_custom {
            match self.render_named(CUSTOM, &ctx) {
                Ok(out) => return out,
                Err(e) => log::error!("[report] {} (falling back to built-in layout)", e),
            }
        }

        match self.render_named(BUILTIN, &ctx) {
            Ok(out) => out,
            Err(e) => {
                log::error!("[report] {}", e);
                String::new()
            }
        }
    }

    fn render_named(&self, name: &str, ctx: &Context) -> Result<String, DigestError> {
        self.tera
            .render(name, ctx)
            .map_err(|e| DigestError::TemplateRender(error_chain(&e)))
    }
}

/// Tera nests the useful message in the source chain.
fn error_chain(e: &tera::Error) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        msg.push_str(": ");
        msg.push_str(&inner.to_string());
        source = inner.source();
    }
    msg
}
