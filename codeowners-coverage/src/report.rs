//! Output of a coverage run. The reconciler never prints anything itself;
//! everything it has to say goes through a [`Reporter`].

use std::io::Write;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
}

/// Where an annotation should be attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub title: Option<String>,
    pub file: Option<String>,
}

impl Annotation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

pub trait Reporter {
    fn report(&mut self, level: Level, message: &str, annotation: &Annotation);

    /// A titled block of related output, e.g. a file listing.
    fn group(&mut self, title: &str, body: &str) {
        self.report(Level::Info, title, &Annotation::default());
        self.report(Level::Info, body, &Annotation::default());
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, level: Level, message: &str, annotation: &Annotation) {
        (**self).report(level, message, annotation)
    }

    fn group(&mut self, title: &str, body: &str) {
        (**self).group(title, body)
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, level: Level, message: &str, annotation: &Annotation) {
        (**self).report(level, message, annotation)
    }

    fn group(&mut self, title: &str, body: &str) {
        (**self).group(title, body)
    }
}

/// Writes GitHub Actions workflow commands, so notices and errors show up as
/// annotations on the run and the pull request.
pub struct WorkflowCommands<W> {
    out: W,
}

impl<W: Write> WorkflowCommands<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{}", line) {
            warn!(error = %err, "failed to write workflow command");
        }
    }
}

impl<W: Write> Reporter for WorkflowCommands<W> {
    fn report(&mut self, level: Level, message: &str, annotation: &Annotation) {
        let command = match level {
            Level::Info => return self.write_line(message),
            Level::Debug => "debug",
            Level::Notice => "notice",
            Level::Warning => "warning",
            Level::Error => "error",
        };

        let properties = [("title", &annotation.title), ("file", &annotation.file)]
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .map(|value| format!("{}={}", key, escape_property(value)))
            })
            .collect::<Vec<_>>();

        let line = if properties.is_empty() {
            format!("::{}::{}", command, escape_data(message))
        } else {
            format!(
                "::{} {}::{}",
                command,
                properties.join(","),
                escape_data(message)
            )
        };
        self.write_line(&line);
    }

    fn group(&mut self, title: &str, body: &str) {
        self.write_line(&format!("::group::{}", escape_data(title)));
        self.write_line(body);
        self.write_line("::endgroup::");
    }
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Sends reports to `tracing`, for runs outside of CI.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, level: Level, message: &str, annotation: &Annotation) {
        let file = annotation.file.as_deref().unwrap_or_default();
        match level {
            Level::Debug => tracing::debug!(file, "{}", message),
            Level::Info | Level::Notice => tracing::info!(file, "{}", message),
            Level::Warning => tracing::warn!(file, "{}", message),
            Level::Error => tracing::error!(file, "{}", message),
        }
    }

    fn group(&mut self, title: &str, body: &str) {
        tracing::info!("{}", title);
        tracing::debug!("{}", body);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub annotation: Annotation,
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct Recorder {
    pub records: Vec<Record>,
    pub groups: Vec<(String, String)>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self, level: Level) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.as_str())
            .collect()
    }

    pub fn group_titles(&self) -> Vec<&str> {
        self.groups.iter().map(|(title, _)| title.as_str()).collect()
    }
}

impl Reporter for Recorder {
    fn report(&mut self, level: Level, message: &str, annotation: &Annotation) {
        self.records.push(Record {
            level,
            message: message.to_owned(),
            annotation: annotation.clone(),
        });
    }

    fn group(&mut self, title: &str, body: &str) {
        self.groups.push((title.to_owned(), body.to_owned()));
    }
}
