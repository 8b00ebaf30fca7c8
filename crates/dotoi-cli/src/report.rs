//! Writes the events an operator cares about to stdout.

use std::io::{self, Write};
use std::sync::Mutex;

use dotoi_events::{Subscriber, SubscriberError};
use dotoi_models::DataEvent;
use tracing::{info, warn};

use crate::cli::OutputFormat;

/// Bus subscriber reporting overdue tasks, fetched snapshots and updates.
pub struct EventReporter<W: Write + Send> {
    format: OutputFormat,
    out: Mutex<W>,
}

impl EventReporter<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, io::stdout())
    }
}

impl<W: Write + Send> EventReporter<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self {
            format,
            out: Mutex::new(out),
        }
    }

    /// Consumes the reporter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Renders a reported event, or `None` for events that are not reported.
pub fn render(event: &DataEvent, format: OutputFormat) -> Result<Option<String>, SubscriberError> {
    if !matches!(
        event,
        DataEvent::TaskOverdue(_) | DataEvent::TasksFetched(_) | DataEvent::TaskUpdate(_)
    ) {
        return Ok(None);
    }

    let line = match format {
        OutputFormat::Json => {
            serde_json::to_string(event).map_err(|e| SubscriberError::Failed(e.to_string()))?
        }
        OutputFormat::Text => match event {
            DataEvent::TaskOverdue(task) => match task.deadline() {
                Some(deadline) => format!("overdue: {} (due {})", task, deadline),
                None => format!("overdue: {}", task),
            },
            DataEvent::TasksFetched(tasks) => {
                let mut line = format!("{} task(s)", tasks.len());
                for task in tasks {
                    line.push_str(&format!("\n  [{}] {}", task.state(), task));
                }
                line
            }
            DataEvent::TaskUpdate(task) => format!("updated: {} [{}]", task, task.state()),
            _ => return Ok(None),
        },
    };

    Ok(Some(line))
}

impl<W: Write + Send> Subscriber for EventReporter<W> {
    fn on_event(&self, event: &DataEvent) -> Result<(), SubscriberError> {
        let Some(line) = render(event, self.format)? else {
            return Ok(());
        };

        if let DataEvent::TaskOverdue(task) = event {
            info!(task_id = %task.id(), "reporting overdue task");
        }

        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(out, "{}", line).map_err(|e| {
            warn!(error = %e, "failed to write event report");
            SubscriberError::Failed(e.to_string())
        })
    }

    fn name(&self) -> &str {
        "reporter"
    }
}
