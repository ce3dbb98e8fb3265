//! Message templates for the notifications the shop floor emits.

use super::{NotificationDomainError, NotificationKind};
use minijinja::Environment;
use serde::Serialize;

/// Title and body templates for one notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTemplate {
    /// Category of the rendered notification.
    pub kind: NotificationKind,
    /// `minijinja` template for the title.
    pub title: &'static str,
    /// `minijinja` template for the body.
    pub message: &'static str,
}

/// Sent when a job reaches `done`.
///
/// Context: `job_id`, `operator` (may be empty) and `total_minutes`.
pub const JOB_COMPLETED: NotificationTemplate = NotificationTemplate {
    kind: NotificationKind::JobCompleted,
    title: "Завдання №{{ job_id }} завершено",
    message: "Різку завдання №{{ job_id }} завершено оператором \
              {{ operator if operator else 'невідомо' }}. \
              Загальний час: {{ total_minutes }} хв",
};

/// Sent when a job is submitted.
///
/// Context: `job_id`, `due_date` (may be empty) and `line_count`.
pub const NEW_JOB: NotificationTemplate = NotificationTemplate {
    kind: NotificationKind::NewJob,
    title: "Нове завдання №{{ job_id }}",
    message: "Створено завдання №{{ job_id }}\
              {% if due_date %} з терміном {{ due_date }}{% endif %}. \
              Позицій: {{ line_count }}",
};

/// Rendered title and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotification {
    /// Category.
    pub kind: NotificationKind,
    /// Title text.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl NotificationTemplate {
    /// Renders both templates with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::TemplateRender`] when a template
    /// fails to render.
    pub fn render(
        &self,
        context: impl Serialize,
    ) -> Result<RenderedNotification, NotificationDomainError> {
        let environment = Environment::new();
        let value = minijinja::Value::from_serialize(&context);
        let render = |template: &str| {
            environment
                .render_str(template, &value)
                .map_err(|error| NotificationDomainError::TemplateRender {
                    kind: self.kind,
                    reason: error.to_string(),
                })
        };
        Ok(RenderedNotification {
            kind: self.kind,
            title: render(self.title)?,
            message: render(self.message)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn completion_names_operator_and_total_time() {
        let rendered = JOB_COMPLETED
            .render(context! { job_id => 7, operator => "Ivan", total_minutes => 45 })
            .expect("render");
        assert_eq!(rendered.title, "Завдання №7 завершено");
        assert!(rendered.message.contains("оператором Ivan"));
        assert!(rendered.message.contains("45 хв"));
    }

    #[test]
    fn completion_without_operator_says_unknown() {
        let rendered = JOB_COMPLETED
            .render(context! { job_id => 7, operator => "", total_minutes => 0 })
            .expect("render");
        assert!(rendered.message.contains("невідомо"));
    }

    #[test]
    fn new_job_mentions_due_date_only_when_set() {
        let with_date = NEW_JOB
            .render(context! { job_id => 1, due_date => "2025-01-01", line_count => 2 })
            .expect("render");
        let without_date = NEW_JOB
            .render(context! { job_id => 1, due_date => "", line_count => 2 })
            .expect("render");
        assert!(with_date.message.contains("2025-01-01"));
        assert!(!without_date.message.contains("терміном"));
    }
}
