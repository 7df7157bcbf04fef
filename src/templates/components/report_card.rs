use maud::{html, Markup};

use crate::domain::report::{Priority, Report, UiStatus};

pub fn priority_badge(priority: Priority) -> Markup {
    html! {
        span class=(format!("badge priority-{}", priority.as_str())) {
            (priority.as_str())
        }
    }
}

/// One report in a panel list. `show_progress` switches between the
/// citizen view (their own photos) and the worker view (progress photos).
pub fn report_card(report: &Report, show_progress: bool) -> Markup {
    let photos = if show_progress {
        &report.progress_images
    } else {
        &report.images
    };

    html! {
        section class="card report-card" {
            h3 {
                a href=(format!("/reports/{}", report.id)) { (report.title) }
            }
            p class="location" { (report.location) }
            p {
                (priority_badge(report.priority))
                " "
                span class=(format!("badge status-{}", report.status.as_str())) {
                    (report.status.label())
                }
                " "
                span class="category" { (report.category) }
            }
            @if let Some(created) = report.created_at {
                p class="created" { "Reported " (created.format("%Y-%m-%d %H:%M")) }
            }
            @if !photos.is_empty() {
                div class="photo-row" {
                    @for url in photos {
                        img src=(url) alt="report photo" loading="lazy";
                    }
                }
            }
        }
    }
}

/// Status transition form for the worker panel. Only transitions a field
/// worker can take; "assigned" is not an option because the server would
/// never accept it back.
pub fn status_form(report: &Report) -> Markup {
    let options = [UiStatus::InProgress, UiStatus::Paused, UiStatus::Completed];

    html! {
        form
            class="status-form"
            action=(format!("/worker/reports/{}/status", report.id))
            method="post"
        {
            label { "Status" }
            select name="status" {
                @for option in options {
                    option
                        value=(option.as_str())
                        selected[report.status == option]
                    {
                        (option.label())
                    }
                }
            }
            input type="text" name="comment" placeholder="Optional note";
            button type="submit" { "Update" }
        }
    }
}
