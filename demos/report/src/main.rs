use std::sync::Mutex;

use bindery::{
    Abstract, Application, Arguments, Container, Error, Injectable, Parameters, ServiceProvider,
    Shared, Signature,
};
use tracing::info;

trait Mailer: Send + Sync {
    fn send(&self, to: &str, body: &str) -> String;
}

#[derive(Default)]
struct SmtpMailer;

bindery::injectable!(SmtpMailer);

impl Mailer for SmtpMailer {
    fn send(&self, to: &str, body: &str) -> String {
        format!("smtp -> {to}: {body}")
    }
}

trait Logger: Send + Sync {
    fn log(&self, line: String);
    fn count(&self) -> usize;
}

#[derive(Default)]
struct FileLogger {
    lines: Mutex<Vec<String>>,
}

bindery::injectable!(FileLogger);

impl Logger for FileLogger {
    fn log(&self, line: String) {
        info!(target: "report::log", "{}", line);
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }

    fn count(&self) -> usize {
        self.lines.lock().map(|lines| lines.len()).unwrap_or_default()
    }
}

struct ReportService {
    mailer: Shared<dyn Mailer>,
    logger: Shared<dyn Logger>,
}

impl Injectable for ReportService {
    fn signature() -> Signature {
        Signature::new()
            .service::<dyn Mailer>("mailer")
            .service::<dyn Logger>("logger")
    }

    fn construct(args: &Arguments) -> Result<Self, Error> {
        Ok(Self {
            mailer: args.service("mailer")?,
            logger: args.service("logger")?,
        })
    }
}

impl ReportService {
    fn send(&self, args: &Arguments) -> Result<String, Error> {
        let to = args.value::<String>("to")?;
        let title = args.value::<String>("title")?;
        let receipt = self.mailer.send(&to, &title);
        self.logger.log(receipt.clone());
        Ok(receipt)
    }
}

struct MailProvider;

impl ServiceProvider for MailProvider {
    fn register(&self, container: &Container) -> Result<(), Error> {
        container.bind_as::<dyn Mailer, SmtpMailer>(|mailer| mailer as Shared<dyn Mailer>)
    }
}

struct LogProvider;

impl ServiceProvider for LogProvider {
    fn register(&self, container: &Container) -> Result<(), Error> {
        container.singleton_as::<dyn Logger, FileLogger>(|logger| logger as Shared<dyn Logger>)
    }

    fn boot(&self, container: &Container) -> Result<(), Error> {
        container.make::<dyn Logger>()?.log("logger ready".to_string());
        Ok(())
    }
}

/// Loaded on first use of `ReportService`.
struct ReportProvider;

impl ServiceProvider for ReportProvider {
    fn imports(&self) -> Vec<Box<dyn ServiceProvider>> {
        vec![Box::new(MailProvider), Box::new(LogProvider)]
    }

    fn register(&self, container: &Container) -> Result<(), Error> {
        container.bind_self::<ReportService>()?;
        container.method(
            "reports",
            "send",
            Signature::new()
                .value::<String>("to")
                .value_or("title", "Monthly report".to_string()),
            ReportService::send,
        );
        Ok(())
    }

    fn provides(&self) -> Vec<Abstract> {
        vec![Abstract::of::<ReportService>()]
    }

    fn is_deferred(&self) -> bool {
        true
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("info,bindery=debug")
        .with_target(false)
        .without_time()
        .init();

    let mut app = Application::new();
    app.register(ReportProvider)?;
    app.boot()?;
    info!("Deferred: {}", app.is_deferred(Abstract::of::<ReportService>()));

    let first = app.make::<ReportService>()?;
    let second = app.make::<ReportService>()?;
    info!(
        "Fresh mailer per report: {}, shared logger: {}",
        !Shared::ptr_eq(&first.mailer, &second.mailer),
        Shared::ptr_eq(&first.logger, &second.logger)
    );

    let container = app.container();
    let receipt: String = container.call(
        "reports@send",
        Parameters::new().with("to", "ada@example.com".to_string()),
        None,
    )?;
    info!("Receipt: {}", receipt);

    let receipt: String = container.call(
        "reports",
        Parameters::new()
            .push("grace@example.com".to_string())
            .push("Quarterly report".to_string()),
        Some("send"),
    )?;
    info!("Receipt: {}", receipt);

    info!("Log lines: {}", container.make::<dyn Logger>()?.count());
    info!("{:?}", app);

    Ok(())
}
